//! Error types for the retrieval engine.

use thiserror::Error;

/// Result type alias for retrieval operations.
pub type Result<T> = std::result::Result<T, RetrievalError>;

/// Errors that can occur in the retrieval engine.
#[derive(Error, Debug)]
pub enum RetrievalError {
    /// Document store error.
    #[error("store error: {0}")]
    Store(#[from] intranet_document_store::StoreError),

    /// Embedding error.
    #[error("embedding error: {0}")]
    Embedding(#[from] intranet_embeddings::EmbeddingError),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
