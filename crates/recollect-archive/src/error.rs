//! Archive errors.

use recollect_core::error::DomainError;
use recollect_core::generation::GenerationError;
use thiserror::Error;

/// Errors raised while writing an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The zip writer failed.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Writing an entry failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Metadata could not be serialized.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A stored image could not be decoded.
    #[error("image error: {0}")]
    Image(#[from] GenerationError),
}

impl From<ArchiveError> for DomainError {
    fn from(error: ArchiveError) -> Self {
        DomainError::Infrastructure(error.to_string())
    }
}
