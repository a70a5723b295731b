//! Retrieval engine implementation.
//!
//! One orchestrator covers all three operating modes (internal-only,
//! web-only, hybrid); the mode is configuration, not a separate code path.
//! Retrieval itself is pure in-memory computation — classification,
//! embedding, and ranking never touch the network. Only persistence and the
//! caller-owned web indexing step perform I/O.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use intranet_document_store::{
    DocumentInput, DocumentStore, DocumentType, SearchMatch, SourceFilter, StoreStats,
};
use intranet_embeddings::HashEmbedder;

use crate::classifier::{QueryCategory, QueryClassifier};
use crate::config::{EngineConfig, QueryTypeConfig, RetrievalMode};
use crate::error::Result;

/// One retrieved context record, ready for prompt injection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedContext {
    /// Document content, truncated at a word boundary when it exceeds the
    /// configured maximum.
    pub content: String,

    /// Source label (URL for web documents, type name otherwise).
    pub source: String,

    /// Title when one is known.
    pub title: Option<String>,

    /// Similarity score, boosted for internal sources.
    pub similarity: f32,
}

/// The result of a retrieval pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalOutcome {
    /// Ranked context records, internal sources first.
    pub contexts: Vec<RetrievedContext>,

    /// Category assigned to the query.
    pub category: QueryCategory,

    /// Whether the web partition was searched.
    pub used_web_fallback: bool,

    /// Number of internal matches found before any fallback.
    pub internal_matches: usize,

    /// Wall-clock time spent retrieving, for observability.
    pub elapsed_ms: u64,
}

impl RetrievalOutcome {
    fn empty(category: QueryCategory, elapsed_ms: u64) -> Self {
        Self {
            contexts: Vec::new(),
            category,
            used_web_fallback: false,
            internal_matches: 0,
            elapsed_ms,
        }
    }
}

/// Options for a direct (non-orchestrated) search.
#[derive(Debug, Clone, Copy, Default)]
pub struct SearchOptions {
    /// Maximum results; defaults to the engine's global search limit.
    pub limit: Option<usize>,

    /// Similarity floor; defaults to the general category's floor.
    pub min_similarity: Option<f32>,

    /// Partition filter; defaults to searching everything.
    pub filter: Option<SourceFilter>,
}

/// The retrieval engine.
///
/// Owns the document store behind an `RwLock`: a search during an in-flight
/// indexing batch simply observes the store as it is, which is acceptable
/// for a best-effort cache. Independent engines share nothing.
pub struct RetrievalEngine {
    config: EngineConfig,
    store: Arc<RwLock<DocumentStore>>,
    classifier: QueryClassifier,
    initialized: AtomicBool,
}

impl RetrievalEngine {
    /// Create an engine with the default embedder.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_embedder(config, HashEmbedder::new())
    }

    /// Create an engine around a specific embedder.
    pub fn with_embedder(config: EngineConfig, embedder: HashEmbedder) -> Self {
        Self {
            config,
            store: Arc::new(RwLock::new(DocumentStore::new(embedder))),
            classifier: QueryClassifier::new(),
            initialized: AtomicBool::new(false),
        }
    }

    /// Create a new engine builder.
    pub fn builder() -> RetrievalEngineBuilder {
        RetrievalEngineBuilder::new()
    }

    /// Prepare the engine. Idempotent.
    ///
    /// When persistence is configured and a snapshot exists, previously
    /// indexed documents are loaded back into the store. Calling this again
    /// is a no-op.
    pub async fn initialize(&self) -> Result<()> {
        if self.initialized.swap(true, Ordering::SeqCst) {
            debug!("engine already initialized");
            return Ok(());
        }

        if let Some(path) = &self.config.persist_path {
            if path.exists() {
                // A missing, unreadable, or corrupt snapshot degrades to an
                // empty store; initialize must not leave the engine marked
                // ready while a retry would still have work to do.
                match tokio::fs::read_to_string(path).await {
                    Ok(json) => {
                        let embedder = self.store.read().await.embedder().clone();
                        match DocumentStore::from_json(&json, embedder) {
                            Ok(loaded) => {
                                let count = loaded.len();
                                *self.store.write().await = loaded;
                                info!("restored {count} documents from {}", path.display());
                            }
                            Err(error) => {
                                warn!("ignoring corrupt snapshot {}: {error}", path.display());
                            }
                        }
                    }
                    Err(error) => {
                        warn!("ignoring unreadable snapshot {}: {error}", path.display());
                    }
                }
            }
        }

        info!("retrieval engine initialized");
        Ok(())
    }

    /// Index a batch of items of the given type.
    ///
    /// Bad items are logged and skipped by the store; the batch itself never
    /// fails. Returns the number of documents appended. Writes through to the
    /// persistence snapshot when configured.
    pub async fn add_documents(
        &self,
        doc_type: DocumentType,
        items: &[DocumentInput],
    ) -> Result<usize> {
        let added = {
            let mut store = self.store.write().await;
            store.add_documents(doc_type, items)
        };

        if added > 0 {
            self.persist().await?;
        }
        Ok(added)
    }

    /// Classify a query. Always returns a category.
    pub fn classify_query(&self, query: &str) -> QueryCategory {
        self.classifier.classify(query)
    }

    /// The threshold configuration the orchestrator would use for a query.
    pub fn config_for_query(&self, query: &str) -> QueryTypeConfig {
        self.config.config_for(self.classifier.classify(query))
    }

    /// Direct similarity search without orchestration.
    pub async fn search(
        &self,
        query: &str,
        options: SearchOptions,
    ) -> Result<Vec<RetrievedContext>> {
        let limit = options.limit.unwrap_or(self.config.search_limit);
        let min_similarity = options
            .min_similarity
            .unwrap_or(self.config.general.min_similarity);
        let filter = options.filter.unwrap_or(SourceFilter::All);

        let store = self.store.read().await;
        let embedding = store.embed(query);
        let matches = store.search(&embedding, limit, min_similarity, filter)?;

        Ok(matches
            .into_iter()
            .map(|m| self.format_context(m))
            .collect())
    }

    /// Run the full retrieval pipeline for a query.
    ///
    /// Classify, embed, search internal data with the category's boost,
    /// check sufficiency, fall back to indexed web content when allowed by
    /// the mode, then truncate and format for presentation.
    pub async fn retrieve(&self, query: &str) -> Result<RetrievalOutcome> {
        let start = Instant::now();
        let category = self.classifier.classify(query);
        let cfg = self.config.config_for(category);

        let store = self.store.read().await;
        let query_embedding = store.embed(query);

        // Degenerate query: nothing to rank against.
        if query_embedding.iter().all(|x| *x == 0.0) {
            debug!("degenerate query, returning empty outcome");
            return Ok(RetrievalOutcome::empty(category, elapsed_ms(start)));
        }

        let mut internal = if self.config.mode == RetrievalMode::WebOnly {
            Vec::new()
        } else {
            // The boost is applied before the similarity floor: a raw score
            // just under the floor can still qualify once boosted. The boost
            // is monotonic, so ranking inside the pass is unaffected.
            let mut matches = store.search(
                &query_embedding,
                cfg.internal_search_limit,
                0.0,
                SourceFilter::InternalOnly,
            )?;
            for m in &mut matches {
                m.similarity = (m.similarity * cfg.internal_data_boost).min(1.0);
            }
            matches.retain(|m| m.similarity >= cfg.min_similarity);
            matches
        };

        let internal_matches = internal.len();
        let sufficient = internal_matches >= cfg.min_internal_results
            && internal
                .iter()
                .any(|m| m.similarity > cfg.internal_data_threshold);

        let used_web_fallback = match self.config.mode {
            RetrievalMode::InternalOnly => false,
            RetrievalMode::WebOnly => true,
            RetrievalMode::Hybrid => !sufficient,
        };

        if used_web_fallback {
            let web = store.search(
                &query_embedding,
                cfg.web_search_limit,
                cfg.min_similarity,
                SourceFilter::WebOnly,
            )?;
            internal.extend(web);
        }

        drop(store);

        internal.truncate(self.config.search_limit);
        let contexts: Vec<RetrievedContext> = internal
            .into_iter()
            .map(|m| self.format_context(m))
            .collect();

        let elapsed = elapsed_ms(start);
        debug!(
            "retrieved {} contexts ({category}, fallback: {used_web_fallback}) in {elapsed}ms",
            contexts.len()
        );

        Ok(RetrievalOutcome {
            contexts,
            category,
            used_web_fallback,
            internal_matches,
            elapsed_ms: elapsed,
        })
    }

    /// Current store statistics.
    pub async fn stats(&self) -> StoreStats {
        self.store.read().await.stats()
    }

    /// Remove every indexed document.
    pub async fn clear(&self) -> Result<()> {
        self.store.write().await.clear();
        self.persist().await
    }

    /// Whether indexed web content is stale per the configured interval.
    pub async fn needs_web_refresh(&self) -> bool {
        self.store
            .read()
            .await
            .needs_web_refresh(Duration::hours(self.config.web_refresh_hours))
    }

    /// Convert a raw match into a presentation record.
    fn format_context(&self, m: SearchMatch) -> RetrievedContext {
        RetrievedContext {
            content: truncate_on_word_boundary(&m.content, self.config.max_context_chars),
            source: m.source,
            title: m.title,
            similarity: m.similarity,
        }
    }

    /// Write the store snapshot when persistence is configured.
    async fn persist(&self) -> Result<()> {
        if let Some(path) = &self.config.persist_path {
            let json = self.store.read().await.to_json()?;
            if let Some(parent) = path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, json).await?;
            debug!("persisted store snapshot to {}", path.display());
        }
        Ok(())
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    start.elapsed().as_millis() as u64
}

/// Truncate text to at most `max_chars` characters without cutting a word.
///
/// When truncation happens an ellipsis marker is appended. A single token
/// longer than the whole budget is hard-cut; there is no word boundary to
/// respect in that case.
fn truncate_on_word_boundary(text: &str, max_chars: usize) -> String {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    if chars.len() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::from("...");
    }

    let cut = chars[max_chars].0;
    let prefix = &text[..cut];

    let kept = if chars[max_chars].1.is_whitespace() {
        prefix
    } else {
        match prefix.rfind(char::is_whitespace) {
            Some(boundary) => &prefix[..boundary],
            None => prefix,
        }
    };

    format!("{}...", kept.trim_end())
}

/// Builder for the retrieval engine.
pub struct RetrievalEngineBuilder {
    config: EngineConfig,
    embedder: Option<HashEmbedder>,
}

impl RetrievalEngineBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self {
            config: EngineConfig::default(),
            embedder: None,
        }
    }

    /// Set the orchestration mode.
    pub fn with_mode(mut self, mode: RetrievalMode) -> Self {
        self.config.mode = mode;
        self
    }

    /// Set the global result cap.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.config.search_limit = limit;
        self
    }

    /// Set the per-result content cap.
    pub fn with_max_context_chars(mut self, chars: usize) -> Self {
        self.config.max_context_chars = chars;
        self
    }

    /// Enable JSON persistence at the given path.
    pub fn with_persist_path(mut self, path: impl Into<std::path::PathBuf>) -> Self {
        self.config.persist_path = Some(path.into());
        self
    }

    /// Use a specific embedder.
    pub fn with_embedder(mut self, embedder: HashEmbedder) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// Override one category's threshold configuration.
    pub fn with_category_config(
        mut self,
        category: QueryCategory,
        config: QueryTypeConfig,
    ) -> Self {
        self.config = self.config.with_category_config(category, config);
        self
    }

    /// Build the engine.
    pub fn build(self) -> RetrievalEngine {
        match self.embedder {
            Some(embedder) => RetrievalEngine::with_embedder(self.config, embedder),
            None => RetrievalEngine::new(self.config),
        }
    }
}

impl Default for RetrievalEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_truncation_never_cuts_words() {
        assert_eq!(truncate_on_word_boundary("hello beautiful world", 10), "hello...");
        assert_eq!(
            truncate_on_word_boundary("hello beautiful world", 16),
            "hello beautiful..."
        );
    }

    #[test]
    fn test_truncation_noop_when_short() {
        assert_eq!(truncate_on_word_boundary("short", 10), "short");
        assert_eq!(truncate_on_word_boundary("exactly ten", 11), "exactly ten");
    }

    #[test]
    fn test_truncation_boundary_on_whitespace() {
        // The cut lands exactly on the space after "hello".
        assert_eq!(truncate_on_word_boundary("hello beautiful", 5), "hello...");
    }

    #[test]
    fn test_truncation_oversized_token_hard_cuts() {
        assert_eq!(truncate_on_word_boundary("abcdefghij", 4), "abcd...");
    }

    #[test]
    fn test_truncation_multibyte_safe() {
        let truncated = truncate_on_word_boundary("coração união decisão", 10);
        assert!(truncated.ends_with("..."));
        assert!(!truncated.contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_degenerate_query_returns_empty() {
        let engine = RetrievalEngine::builder().build();
        engine.initialize().await.unwrap();

        let outcome = engine.retrieve("   ").await.unwrap();
        assert!(outcome.contexts.is_empty());
        assert!(!outcome.used_web_fallback);
        assert_eq!(outcome.internal_matches, 0);
    }

    #[tokio::test]
    async fn test_initialize_is_idempotent() {
        let engine = RetrievalEngine::builder().build();
        engine.initialize().await.unwrap();
        engine.initialize().await.unwrap();
        assert_eq!(engine.stats().await.total_documents, 0);
    }

    #[tokio::test]
    async fn test_initialize_survives_unreadable_snapshot() {
        // The persist path exists but is a directory, so reading the
        // snapshot fails at the I/O layer rather than at JSON parsing.
        let dir = tempfile::tempdir().unwrap();
        let engine = RetrievalEngine::builder()
            .with_persist_path(dir.path())
            .build();

        engine.initialize().await.unwrap();
        assert_eq!(engine.stats().await.total_documents, 0);
    }

    #[tokio::test]
    async fn test_builder_configuration() {
        let engine = RetrievalEngine::builder()
            .with_mode(RetrievalMode::InternalOnly)
            .with_search_limit(3)
            .with_embedder(HashEmbedder::with_dimension(64))
            .build();

        assert_eq!(engine.config.mode, RetrievalMode::InternalOnly);
        assert_eq!(engine.config.search_limit, 3);
    }
}
