//! Error types for the pptslim library.

use std::io;
use thiserror::Error;

/// Result type alias for pptslim operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can abort a compression run.
///
/// Per-image transcode failures are deliberately absent: they degrade
/// to passing the original bytes through and never surface here.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The input is not a readable ZIP container.
    #[error("Not a presentation package: {0}")]
    NotAPackage(String),

    /// Error reading or writing the ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// A quality profile field is out of range.
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}
