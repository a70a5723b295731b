//! # Document Store
//!
//! This crate implements the indexed-document layer of the intranet
//! retrieval system. It provides:
//!
//! - **Typed Documents**: Web pages, employee records, and announcements,
//!   each carrying only its own metadata
//! - **Chunking**: Boundary-aware splitting of long content before indexing
//! - **Similarity Search**: Cosine-ranked lookups partitioned by source type
//! - **Persistence**: JSON snapshot of the store for reload across restarts
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       Document Store                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  DocumentInput ──► TextChunker ──► HashEmbedder ──► Document    │
//! │                                                        │        │
//! │                                                        ▼        │
//! │  SearchMatch ◄── find_top_k ◄── SourceFilter ◄── DocumentStore  │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is a plain owned value: multiple stores coexist with no shared
//! state, and callers decide how to share one (the retrieval engine wraps it
//! in an `RwLock`). It is a best-effort cache, not a transactional store.

pub mod chunker;
pub mod document;
pub mod error;
pub mod store;

pub use chunker::{Chunk, ChunkerConfig, TextChunker};
pub use document::{Document, DocumentInput, DocumentMetadata, DocumentType};
pub use error::{Result, StoreError};
pub use store::{DocumentStore, SearchMatch, SourceFilter, StoreStats};
