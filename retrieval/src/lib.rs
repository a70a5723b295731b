//! # Retrieval Orchestrator
//!
//! This crate is the entry point of the intranet retrieval core. It combines:
//!
//! - **Query Classification**: Keyword mapping to per-category thresholds
//! - **Hash Embeddings**: Deterministic query vectors
//! - **Document Store**: Typed, similarity-ranked document lookups
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Retrieval Engine                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │                                                                 │
//! │  query ──► QueryClassifier ──► QueryTypeConfig                  │
//! │    │                                 │                          │
//! │    ▼                                 ▼                          │
//! │  HashEmbedder ──► internal search (boosted) ──► sufficient?     │
//! │                                 │                    │ no       │
//! │                                 │ yes                ▼          │
//! │                                 │              web fallback     │
//! │                                 ▼                    │          │
//! │                       truncate & format ◄────────────┘          │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use intranet_retrieval::RetrievalEngine;
//!
//! let engine = RetrievalEngine::builder().build();
//! engine.initialize().await?;
//!
//! let outcome = engine.retrieve("qual o ramal do João").await?;
//! for context in &outcome.contexts {
//!     println!("{} ({:.2})", context.content, context.similarity);
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;

pub use classifier::{QueryCategory, QueryClassifier};
pub use config::{EngineConfig, QueryTypeConfig, RetrievalMode};
pub use engine::{RetrievalEngine, RetrievalOutcome, RetrievedContext, SearchOptions};
pub use error::{Result, RetrievalError};

// Re-export from dependencies for convenience
pub use intranet_document_store::{
    Document, DocumentInput, DocumentMetadata, DocumentStore, DocumentType, SourceFilter,
    StoreStats,
};
pub use intranet_embeddings::HashEmbedder;
