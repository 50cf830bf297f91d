//! Core error types for `FieldSync`.

use thiserror::Error;

/// Core error type for `FieldSync` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An AND/OR combinator was built without children.
    #[error("{0} combinator requires at least one child constraint")]
    EmptyCombinator(&'static str),

    /// Entity kind name not recognized.
    #[error("Unknown entity kind: {0}")]
    UnknownEntityKind(String),

    /// Invalid timestamp.
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
