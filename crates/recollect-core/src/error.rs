//! Domain error types.

use thiserror::Error;

use crate::generation::GenerationError;

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Required input was missing or malformed; nothing was mutated.
    #[error("validation error: {0}")]
    Validation(String),

    /// The operation needs a committed scene and none exists yet.
    #[error("no scene has been committed yet")]
    NoSceneCommitted,

    /// No scene record carries the given id.
    #[error("scene not found: {0}")]
    SceneNotFound(u64),

    /// The generation backend failed or returned unusable content.
    #[error("generation failed: {0}")]
    Generation(#[from] GenerationError),

    /// Export was requested before any scene was committed.
    #[error("there are no scenes to export")]
    EmptyHistory,

    /// Another evolution step is still in flight for this session.
    #[error("another operation is already in progress")]
    Busy,

    /// An infrastructure error (archive writing, serialization).
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_error_converts_into_domain_error() {
        // Arrange
        let source = GenerationError::MissingField("key_emotions");

        // Act
        let err: DomainError = source.into();

        // Assert
        assert!(matches!(err, DomainError::Generation(_)));
        assert_eq!(
            err.to_string(),
            "generation failed: response is missing required field `key_emotions`"
        );
    }
}
