//! Error types for the document store.

use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in the document store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] intranet_embeddings::EmbeddingError),

    /// Document embedding does not match the store dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
