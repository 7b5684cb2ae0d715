//! Archive rewriter: streams a package entry by entry, recompressing
//! media payloads and passing everything else through byte-identical.

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use crate::profile::QualityProfile;
use crate::transcode::transcode;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Read, Seek, Write};
use std::path::Path;
use zip::read::ZipArchive;
use zip::write::{SimpleFileOptions, ZipWriter};

/// Directory prefix under which raster media lives in a PPTX package.
pub const MEDIA_PREFIX: &str = "ppt/media/";

/// Extensions eligible for recompression (matched case-insensitively).
const RASTER_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "tiff", "bmp"];

/// Counters from a completed run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// Total entries in the source package.
    pub entries_total: usize,
    /// Entries that matched the media-candidate filter.
    pub media_candidates: usize,
    /// Media entries actually replaced with a smaller encoding.
    pub media_recompressed: usize,
}

/// Terminal state of a pipeline invocation that did not error.
///
/// The third terminal state of a run, failure, is the `Err` arm of
/// [`Result`]; exactly one of the three is produced per invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Every entry was written; the output package is complete.
    Completed(RunStats),
    /// The run was cancelled between entries; the partial output has
    /// been removed.
    Cancelled,
}

/// Size comparison for a finished run, computed from filesystem
/// metadata by the convenience layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompressionReport {
    /// Path the compressed package was written to.
    pub output_path: std::path::PathBuf,
    /// Source package size in bytes.
    pub input_bytes: u64,
    /// Output package size in bytes.
    pub output_bytes: u64,
    /// Entry counters from the run.
    pub stats: RunStats,
}

impl CompressionReport {
    /// Size reduction as a percentage of the input, e.g. `37.5`.
    pub fn reduction_percent(&self) -> f64 {
        if self.input_bytes == 0 {
            return 0.0;
        }
        (1.0 - self.output_bytes as f64 / self.input_bytes as f64) * 100.0
    }
}

/// Whether an entry name is eligible for image recompression: it must
/// live under `ppt/media/` and carry a raster extension.
pub fn is_media_candidate(name: &str) -> bool {
    if !name.starts_with(MEDIA_PREFIX) {
        return false;
    }
    match name.rsplit_once('.') {
        Some((_, ext)) => RASTER_EXTENSIONS
            .iter()
            .any(|e| ext.eq_ignore_ascii_case(e)),
        None => false,
    }
}

/// Rewrite `input` into `output`, recompressing media entries under
/// `profile`.
///
/// Entries are processed strictly sequentially, in source order, and
/// the output preserves that order along with each entry's name,
/// timestamp and compression method. Untouched entries are copied as
/// raw compressed streams, so their bytes are identical to the source.
///
/// `on_progress` fires once per entry, after it has been written, with
/// `(entries done, entries total, entry name)`; `done` counts up from 1
/// to `total` with no gaps or repeats. The cancellation token is
/// checked once per entry boundary, never mid-transcode.
///
/// On cancellation or error the partially written output file is
/// removed before returning; only a `Completed` run leaves a file at
/// `output`.
///
/// # Example
///
/// ```no_run
/// use pptslim::{rewrite_package, CancelToken, RunOutcome, Tier};
///
/// let outcome = rewrite_package(
///     "deck.pptx",
///     "deck_small.pptx",
///     &Tier::Strong.profile(),
///     &CancelToken::new(),
///     |done, total, name| eprintln!("[{}/{}] {}", done, total, name),
/// )?;
/// if let RunOutcome::Completed(stats) = outcome {
///     println!("recompressed {} images", stats.media_recompressed);
/// }
/// # Ok::<(), pptslim::Error>(())
/// ```
pub fn rewrite_package<F>(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    profile: &QualityProfile,
    cancel: &CancelToken,
    mut on_progress: F,
) -> Result<RunOutcome>
where
    F: FnMut(usize, usize, &str),
{
    let input = input.as_ref();
    let output = output.as_ref();

    // Open the source before touching the output path, so an invalid
    // input never creates a file.
    let file = File::open(input)?;
    let mut archive = ZipArchive::new(BufReader::new(file))
        .map_err(|e| Error::NotAPackage(format!("{}: {}", input.display(), e)))?;

    let out_file = File::create(output)?;
    let writer = ZipWriter::new(BufWriter::new(out_file));

    let result = copy_entries(&mut archive, writer, profile, cancel, &mut on_progress);

    match &result {
        Ok(RunOutcome::Completed(_)) => {}
        Ok(RunOutcome::Cancelled) | Err(_) => {
            // The writer has been dropped by now; nothing valid-looking
            // may remain at the output path.
            let _ = fs::remove_file(output);
        }
    }

    result
}

fn copy_entries<R, W, F>(
    archive: &mut ZipArchive<R>,
    mut writer: ZipWriter<W>,
    profile: &QualityProfile,
    cancel: &CancelToken,
    on_progress: &mut F,
) -> Result<RunOutcome>
where
    R: Read + Seek,
    W: Write + Seek,
    F: FnMut(usize, usize, &str),
{
    let total = archive.len();
    let mut stats = RunStats {
        entries_total: total,
        ..RunStats::default()
    };

    for index in 0..total {
        if cancel.is_cancelled() {
            return Ok(RunOutcome::Cancelled);
        }

        let raw_entry = archive.by_index_raw(index)?;
        let name = raw_entry.name().to_string();
        let candidate = !raw_entry.is_dir() && is_media_candidate(&name);

        if candidate {
            stats.media_candidates += 1;
            drop(raw_entry);

            // Reopen decompressing to materialize the payload.
            let mut entry = archive.by_index(index)?;
            let mut raw = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut raw)?;

            let mut options =
                SimpleFileOptions::default().compression_method(entry.compression());
            if let Some(mtime) = entry.last_modified() {
                options = options.last_modified_time(mtime);
            }
            if let Some(mode) = entry.unix_mode() {
                options = options.unix_permissions(mode);
            }
            drop(entry);

            let payload = transcode(&raw, profile);
            if matches!(payload, Cow::Owned(_)) {
                stats.media_recompressed += 1;
            }

            writer.start_file(name.as_str(), options)?;
            writer.write_all(&payload)?;
        } else {
            // Raw stream copy: no decompress/recompress round trip, and
            // per-entry metadata carries over wholesale.
            writer.raw_copy_file(raw_entry)?;
        }

        on_progress(index + 1, total, &name);
    }

    writer.finish()?.flush()?;
    Ok(RunOutcome::Completed(stats))
}
