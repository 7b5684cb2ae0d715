//! # pptslim
//!
//! Lossy size optimizer for PowerPoint presentations.
//!
//! pptslim rewrites a PPTX package entry by entry, re-encoding the
//! raster images under `ppt/media/` at a chosen quality tier while
//! copying every other part through byte-identical. Images never grow:
//! a re-encoding that fails to beat the original is discarded.
//!
//! ## Quick Start
//!
//! ```no_run
//! use pptslim::{compress_file, Tier};
//!
//! let report = compress_file("deck.pptx", &Tier::Strong.profile())?;
//! println!(
//!     "{} -> {} bytes ({:.1}% smaller)",
//!     report.input_bytes,
//!     report.output_bytes,
//!     report.reduction_percent()
//! );
//! # Ok::<(), pptslim::Error>(())
//! ```
//!
//! ## Progress and cancellation
//!
//! ```no_run
//! use pptslim::{rewrite_package, CancelToken, Tier};
//!
//! let cancel = CancelToken::new();
//! let handle = cancel.clone();
//! // hand `handle` to another thread; calling handle.cancel() stops
//! // the run at the next entry boundary and removes the partial output
//!
//! let outcome = rewrite_package(
//!     "deck.pptx",
//!     "deck_small.pptx",
//!     &Tier::Extreme.profile(),
//!     &cancel,
//!     |done, total, name| eprintln!("[{}/{}] {}", done, total, name),
//! )?;
//! # drop(handle);
//! # Ok::<(), pptslim::Error>(())
//! ```
//!
//! ## Features
//!
//! - `async`: Tokio wrapper running the pipeline on a blocking thread

pub mod cancel;
pub mod detect;
pub mod error;
pub mod profile;
pub mod rewrite;
pub mod transcode;

// Re-exports
pub use cancel::CancelToken;
pub use detect::{is_presentation_package, package_summary, PackageSummary};
pub use error::{Error, Result};
pub use profile::{default_output_path, QualityProfile, Tier};
pub use rewrite::{
    is_media_candidate, rewrite_package, CompressionReport, RunOutcome, RunStats, MEDIA_PREFIX,
};
pub use transcode::transcode;

use std::io;
use std::path::Path;

/// Compress a presentation into the conventionally named sibling file
/// (`{stem}_{tag}压缩.{ext}`), without progress reporting.
///
/// # Example
///
/// ```no_run
/// use pptslim::{compress_file, Tier};
///
/// let report = compress_file("deck.pptx", &Tier::Extreme.profile())?;
/// println!("wrote {}", report.output_path.display());
/// # Ok::<(), pptslim::Error>(())
/// ```
pub fn compress_file(
    input: impl AsRef<Path>,
    profile: &QualityProfile,
) -> Result<CompressionReport> {
    let input = input.as_ref();
    let output = default_output_path(input, profile);
    compress_file_to(input, output, profile)
}

/// Compress a presentation to an explicit output path, without
/// progress reporting.
pub fn compress_file_to(
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    profile: &QualityProfile,
) -> Result<CompressionReport> {
    let input = input.as_ref();
    let output = output.as_ref();

    let outcome = rewrite_package(input, output, profile, &CancelToken::new(), |_, _, _| {})?;
    match outcome {
        RunOutcome::Completed(stats) => {
            let input_bytes = std::fs::metadata(input)?.len();
            let output_bytes = std::fs::metadata(output)?.len();
            Ok(CompressionReport {
                output_path: output.to_path_buf(),
                input_bytes,
                output_bytes,
                stats,
            })
        }
        // The fresh token above is never signalled; this arm is
        // unreachable in practice but kept total.
        RunOutcome::Cancelled => Err(Error::Io(io::Error::new(
            io::ErrorKind::Interrupted,
            "compression cancelled",
        ))),
    }
}

/// Async wrapper around [`compress_file`], running the pipeline on a
/// Tokio blocking thread.
#[cfg(feature = "async")]
pub async fn compress_file_async(
    input: impl AsRef<Path>,
    profile: &QualityProfile,
) -> Result<CompressionReport> {
    let input = input.as_ref().to_path_buf();
    let profile = *profile;
    tokio::task::spawn_blocking(move || compress_file(&input, &profile))
        .await
        .map_err(|e| Error::Io(io::Error::other(e)))?
}
