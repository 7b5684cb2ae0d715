//! Lightweight package detection for presentation containers.
//!
//! Used by front-ends for friendly diagnostics before a run; the
//! pipeline itself never validates container structure beyond being
//! able to open it as a ZIP archive.

use crate::error::{Error, Result};
use crate::rewrite::is_media_candidate;
use serde::Serialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}

/// Inspect a file and report whether it looks like a PowerPoint
/// package (a ZIP archive with a `ppt/` part tree).
///
/// Returns `Ok(false)` for valid ZIP archives that are not
/// presentations (e.g. DOCX or plain archives), and `Err` when the
/// file cannot be opened as a ZIP container at all.
///
/// # Example
///
/// ```no_run
/// use pptslim::detect::is_presentation_package;
///
/// if !is_presentation_package("deck.pptx")? {
///     eprintln!("warning: input does not look like a presentation");
/// }
/// # Ok::<(), pptslim::Error>(())
/// ```
pub fn is_presentation_package(path: impl AsRef<Path>) -> Result<bool> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let archive = zip::ZipArchive::new(reader)
        .map_err(|e| Error::NotAPackage(format!("{}: {}", path.display(), e)))?;

    let is_presentation = archive.file_names().any(|n| n.starts_with("ppt/"));
    Ok(is_presentation)
}

/// What a package looks like from the central directory alone, without
/// materializing any payloads.
#[derive(Debug, Clone, Serialize)]
pub struct PackageSummary {
    /// Package file size in bytes.
    pub package_bytes: u64,
    /// Total entries in the container.
    pub entries_total: usize,
    /// Entries matching the media-candidate filter.
    pub media_candidates: usize,
    /// Combined uncompressed size of media candidates, in bytes.
    pub media_bytes: u64,
    /// Whether the container carries a `ppt/` part tree.
    pub is_presentation: bool,
}

/// Summarize a package for display: entry counts and how much of it is
/// recompressible media.
pub fn package_summary(path: impl AsRef<Path>) -> Result<PackageSummary> {
    let path = path.as_ref();
    let package_bytes = std::fs::metadata(path)?.len();
    let file = File::open(path)?;
    let mut archive = zip::ZipArchive::new(BufReader::new(file))
        .map_err(|e| Error::NotAPackage(format!("{}: {}", path.display(), e)))?;

    let mut summary = PackageSummary {
        package_bytes,
        entries_total: archive.len(),
        media_candidates: 0,
        media_bytes: 0,
        is_presentation: false,
    };

    for index in 0..archive.len() {
        let entry = archive.by_index_raw(index)?;
        let name = entry.name();
        if name.starts_with("ppt/") {
            summary.is_presentation = true;
        }
        if !entry.is_dir() && is_media_candidate(name) {
            summary.media_candidates += 1;
            summary.media_bytes += entry.size();
        }
    }

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn zip_with_entries(names: &[&str]) -> Vec<u8> {
        let mut buffer = Vec::new();
        let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
        let options = SimpleFileOptions::default();
        for name in names {
            zip.start_file(*name, options).unwrap();
            zip.write_all(b"<x/>").unwrap();
        }
        zip.finish().unwrap();
        buffer
    }

    #[test]
    fn test_is_zip_file() {
        assert!(is_zip_file(&[0x50, 0x4B, 0x03, 0x04, 0x00]));
        assert!(!is_zip_file(&[0x00, 0x00, 0x00, 0x00]));
        assert!(!is_zip_file(&[0x50, 0x4B])); // Too short
    }

    #[test]
    fn test_detect_presentation() {
        let dir = tempfile::tempdir().unwrap();

        let pptx = dir.path().join("deck.pptx");
        std::fs::write(&pptx, zip_with_entries(&["ppt/presentation.xml"])).unwrap();
        assert!(is_presentation_package(&pptx).unwrap());

        let docx = dir.path().join("doc.docx");
        std::fs::write(&docx, zip_with_entries(&["word/document.xml"])).unwrap();
        assert!(!is_presentation_package(&docx).unwrap());
    }

    #[test]
    fn test_package_summary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deck.pptx");
        std::fs::write(
            &path,
            zip_with_entries(&[
                "ppt/presentation.xml",
                "ppt/media/image1.png",
                "ppt/media/movie.mp4",
            ]),
        )
        .unwrap();

        let summary = package_summary(&path).unwrap();
        assert_eq!(summary.entries_total, 3);
        assert_eq!(summary.media_candidates, 1);
        assert!(summary.is_presentation);
        assert!(summary.package_bytes > 0);
        assert_eq!(summary.media_bytes, 4); // the "<x/>" payload
    }

    #[test]
    fn test_detect_rejects_non_zip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.pptx");
        std::fs::write(&path, b"this is not a zip archive").unwrap();
        assert!(matches!(
            is_presentation_package(&path),
            Err(Error::NotAPackage(_))
        ));
    }
}
