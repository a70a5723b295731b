//! # Embeddings
//!
//! This crate provides deterministic embedding generation and similarity
//! ranking for the intranet retrieval system.
//!
//! ## Features
//!
//! - **Hash Embeddings**: Convert text to fixed-length vectors without any
//!   model calls — pure, deterministic arithmetic
//! - **Domain Vocabulary**: Curated organization terms receive a fixed boost
//! - **Similarity Ranking**: Cosine similarity with stable top-k selection
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Embeddings System                           │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  HashEmbedder ──► Embedding ──► cosine_similarity / find_top_k  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The hash scheme is intentionally non-semantic: two lexically different
//! but semantically similar sentences will not score as similar. Callers
//! that need true semantic retrieval must swap in a learned model, which
//! changes retrieval behavior and is out of scope here.

pub mod embedder;
pub mod error;
pub mod similarity;

pub use embedder::HashEmbedder;
pub use error::{EmbeddingError, Result};
pub use similarity::{SimilarityResult, cosine_similarity, find_top_k, normalize};

/// A dense vector embedding.
pub type Embedding = Vec<f32>;

/// Default dimension of hash embeddings.
pub const DEFAULT_DIMENSION: usize = 384;
