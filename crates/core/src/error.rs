//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("no files to archive")]
    NoFiles,

    #[error("failed to build zip archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("failed to write zip archive: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid file link: '{0}'")]
    InvalidFileLink(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
