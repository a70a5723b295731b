//! In-memory document store with similarity search.
//!
//! The store keeps every indexed document in insertion order, partitioned by
//! source type at query time. It is a best-effort cache: batches that hit a
//! bad item log and skip it, searches over an empty store return nothing, and
//! there is no eviction — documents live until `clear` or process exit.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use intranet_embeddings::{Embedding, HashEmbedder, find_top_k};

use crate::chunker::{ChunkerConfig, TextChunker};
use crate::document::{Document, DocumentInput, DocumentType};
use crate::error::{Result, StoreError};

/// Filter applied to a search pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFilter {
    /// Search every document.
    All,
    /// Only internally indexed data (employees and announcements).
    InternalOnly,
    /// Only indexed web content.
    WebOnly,
}

impl SourceFilter {
    fn matches(self, document_type: DocumentType) -> bool {
        match self {
            SourceFilter::All => true,
            SourceFilter::InternalOnly => document_type.is_internal(),
            SourceFilter::WebOnly => document_type == DocumentType::Web,
        }
    }
}

/// A search hit: document fields plus its similarity to the query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMatch {
    /// Id of the matched document.
    pub document_id: String,

    /// The matched content.
    pub content: String,

    /// Source label (URL for web documents, type name otherwise).
    pub source: String,

    /// Title when one is known.
    pub title: Option<String>,

    /// Source type of the matched document.
    pub document_type: DocumentType,

    /// Cosine similarity to the query, possibly boosted by the caller.
    pub similarity: f32,
}

/// Counts describing the current store contents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreStats {
    /// Total number of indexed documents.
    pub total_documents: usize,

    /// Indexed web documents.
    pub web_documents: usize,

    /// Indexed employee documents.
    pub employee_documents: usize,

    /// Indexed announcement documents.
    pub announcement_documents: usize,

    /// When the store was last modified.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Snapshot format for persistence.
#[derive(Serialize, Deserialize)]
struct StoreSnapshot {
    dimension: usize,
    documents: Vec<Document>,
    last_updated: Option<DateTime<Utc>>,
    last_web_indexed: Option<DateTime<Utc>>,
}

/// The in-memory document store.
///
/// A plain owned value: construct as many independent stores as needed and
/// share one behind a lock if concurrent access is required.
pub struct DocumentStore {
    documents: Vec<Document>,
    embedder: HashEmbedder,
    chunker: TextChunker,
    last_updated: Option<DateTime<Utc>>,
    last_web_indexed: Option<DateTime<Utc>>,
}

impl DocumentStore {
    /// Create a store around the given embedder.
    pub fn new(embedder: HashEmbedder) -> Self {
        Self::with_chunker(embedder, ChunkerConfig::default())
    }

    /// Create a store with a custom chunking configuration.
    pub fn with_chunker(embedder: HashEmbedder, chunker: ChunkerConfig) -> Self {
        Self {
            documents: Vec::new(),
            embedder,
            chunker: TextChunker::with_config(chunker),
            last_updated: None,
            last_web_indexed: None,
        }
    }

    /// The embedding dimension of this store.
    pub fn dimension(&self) -> usize {
        self.embedder.dimension()
    }

    /// Embed text with this store's embedder.
    pub fn embed(&self, text: &str) -> Embedding {
        self.embedder.embed(text)
    }

    /// The embedder this store indexes with.
    pub fn embedder(&self) -> &HashEmbedder {
        &self.embedder
    }

    /// Insert a pre-embedded document.
    ///
    /// Used by persistence reload; batch indexing goes through
    /// [`DocumentStore::add_documents`].
    pub fn insert(&mut self, document: Document) -> Result<()> {
        if document.embedding.len() != self.dimension() {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension(),
                actual: document.embedding.len(),
            });
        }

        if document.document_type() == DocumentType::Web {
            self.last_web_indexed = Some(document.indexed_at);
        }
        self.last_updated = Some(Utc::now());
        self.documents.push(document);
        Ok(())
    }

    /// Index a batch of items of the given type.
    ///
    /// Long content is chunked before embedding, so one item may produce
    /// several documents. Bad items (empty content, metadata whose type does
    /// not match `doc_type`) are logged and skipped; one bad record never
    /// aborts a reindex. Returns the number of documents appended.
    pub fn add_documents(&mut self, doc_type: DocumentType, items: &[DocumentInput]) -> usize {
        let mut added = 0;

        for item in items {
            if item.content.trim().is_empty() {
                warn!("skipping {doc_type} item with empty content");
                continue;
            }
            if item.metadata.document_type() != doc_type {
                warn!(
                    "skipping item: metadata type {} does not match batch type {doc_type}",
                    item.metadata.document_type()
                );
                continue;
            }

            for chunk in self.chunker.chunk(&item.content) {
                let embedding = self.embedder.embed(&chunk.content);
                self.documents.push(Document::new(
                    chunk.content,
                    embedding,
                    item.metadata.clone(),
                ));
                added += 1;
            }
        }

        if added > 0 {
            let now = Utc::now();
            self.last_updated = Some(now);
            if doc_type == DocumentType::Web {
                self.last_web_indexed = Some(now);
            }
        }

        debug!("indexed {added} documents from {} {doc_type} items", items.len());
        added
    }

    /// Search for documents similar to the query embedding.
    ///
    /// Results are sorted descending by similarity; equal scores keep
    /// insertion order. Every returned match has similarity at or above
    /// `min_similarity`, and at most `limit` matches come back. Searching an
    /// empty store returns an empty vec.
    pub fn search(
        &self,
        query_embedding: &Embedding,
        limit: usize,
        min_similarity: f32,
        filter: SourceFilter,
    ) -> Result<Vec<SearchMatch>> {
        if self.documents.is_empty() {
            return Ok(Vec::new());
        }

        if query_embedding.len() != self.dimension() {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension(),
                actual: query_embedding.len(),
            });
        }

        let candidates: Vec<(String, Embedding)> = self
            .documents
            .iter()
            .filter(|d| filter.matches(d.document_type()))
            .map(|d| (d.id.clone(), d.embedding.clone()))
            .collect();

        let ranked = find_top_k(query_embedding, &candidates, limit, min_similarity)?;

        let matches = ranked
            .into_iter()
            .filter_map(|result| {
                self.documents
                    .iter()
                    .find(|d| d.id == result.id)
                    .map(|document| SearchMatch {
                        document_id: document.id.clone(),
                        content: document.content.clone(),
                        source: document.metadata.source(),
                        title: document.metadata.title().map(String::from),
                        document_type: document.document_type(),
                        similarity: result.score,
                    })
            })
            .collect();

        Ok(matches)
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Whether the store holds no documents.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Remove every document.
    ///
    /// Used when re-indexing a changed data source.
    pub fn clear(&mut self) {
        self.documents.clear();
        self.last_updated = Some(Utc::now());
        self.last_web_indexed = None;
        info!("cleared document store");
    }

    /// Current store statistics.
    pub fn stats(&self) -> StoreStats {
        let count = |t: DocumentType| {
            self.documents
                .iter()
                .filter(|d| d.document_type() == t)
                .count()
        };

        StoreStats {
            total_documents: self.documents.len(),
            web_documents: count(DocumentType::Web),
            employee_documents: count(DocumentType::Employee),
            announcement_documents: count(DocumentType::Announcement),
            last_updated: self.last_updated,
        }
    }

    /// Whether web content needs re-indexing.
    ///
    /// True when no web content was ever indexed, or the last web indexing
    /// pass is older than `max_age`.
    pub fn needs_web_refresh(&self, max_age: Duration) -> bool {
        match self.last_web_indexed {
            Some(indexed_at) => Utc::now() - indexed_at > max_age,
            None => true,
        }
    }

    /// Serialize the store contents to JSON.
    pub fn to_json(&self) -> Result<String> {
        let snapshot = StoreSnapshot {
            dimension: self.dimension(),
            documents: self.documents.clone(),
            last_updated: self.last_updated,
            last_web_indexed: self.last_web_indexed,
        };
        Ok(serde_json::to_string(&snapshot)?)
    }

    /// Load store contents from JSON produced by [`DocumentStore::to_json`].
    ///
    /// The snapshot dimension must match the embedder's.
    pub fn from_json(json: &str, embedder: HashEmbedder) -> Result<Self> {
        let snapshot: StoreSnapshot = serde_json::from_str(json)?;

        if snapshot.dimension != embedder.dimension() {
            return Err(StoreError::DimensionMismatch {
                expected: embedder.dimension(),
                actual: snapshot.dimension,
            });
        }

        let mut store = Self::new(embedder);
        for document in snapshot.documents {
            store.insert(document)?;
        }
        store.last_updated = snapshot.last_updated;
        store.last_web_indexed = snapshot.last_web_indexed;

        info!("loaded {} documents into store", store.len());
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentMetadata;
    use pretty_assertions::assert_eq;

    fn employee_metadata(name: &str) -> DocumentMetadata {
        DocumentMetadata::Employee {
            employee_id: Some(format!("emp-{name}")),
            name: Some(name.to_string()),
        }
    }

    fn web_metadata(url: &str) -> DocumentMetadata {
        DocumentMetadata::Web {
            url: Some(url.to_string()),
            title: None,
        }
    }

    fn store() -> DocumentStore {
        DocumentStore::new(HashEmbedder::with_dimension(64))
    }

    #[test]
    fn test_add_and_stats() {
        let mut store = store();
        let added = store.add_documents(
            DocumentType::Employee,
            &[
                DocumentInput::new("João Silva ramal 4321", employee_metadata("João Silva")),
                DocumentInput::new("Maria Souza ramal 1188", employee_metadata("Maria Souza")),
            ],
        );
        assert_eq!(added, 2);

        let stats = store.stats();
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.employee_documents, 2);
        assert_eq!(stats.web_documents, 0);
        assert!(stats.last_updated.is_some());
    }

    #[test]
    fn test_bad_items_are_skipped_not_fatal() {
        let mut store = store();
        let added = store.add_documents(
            DocumentType::Employee,
            &[
                DocumentInput::new("   ", employee_metadata("Vazio")),
                DocumentInput::new("page content", web_metadata("https://x.test")),
                DocumentInput::new("Ana Lima ramal 2210", employee_metadata("Ana Lima")),
            ],
        );

        // Empty content and mismatched metadata are skipped, the batch goes on.
        assert_eq!(added, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_search_exact_content_ranks_first() {
        let mut store = store();
        store.add_documents(
            DocumentType::Employee,
            &[
                DocumentInput::new("João Silva ramal 4321", employee_metadata("João Silva")),
                DocumentInput::new("Maria Souza ramal 1188", employee_metadata("Maria Souza")),
            ],
        );

        let query = store.embed("João Silva ramal 4321");
        let results = store
            .search(&query, 10, 0.0, SourceFilter::InternalOnly)
            .unwrap();

        assert!(!results.is_empty());
        assert_eq!(results[0].title.as_deref(), Some("João Silva"));
        assert!((results[0].similarity - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_search_respects_limit_and_threshold() {
        let mut store = store();
        store.add_documents(
            DocumentType::Announcement,
            &(0..5)
                .map(|i| {
                    DocumentInput::new(
                        format!("comunicado numero {i}"),
                        DocumentMetadata::Announcement {
                            announcement_id: Some(format!("ann-{i}")),
                            title: None,
                        },
                    )
                })
                .collect::<Vec<_>>(),
        );

        let query = store.embed("comunicado numero 0");
        let results = store.search(&query, 3, 0.2, SourceFilter::All).unwrap();

        assert!(results.len() <= 3);
        for result in &results {
            assert!(result.similarity >= 0.2);
        }
        // Descending order.
        for pair in results.windows(2) {
            assert!(pair[0].similarity >= pair[1].similarity);
        }
    }

    #[test]
    fn test_equal_scores_keep_insertion_order() {
        let mut store = store();
        // Identical content embeds identically, so both hits tie exactly.
        store.add_documents(
            DocumentType::Employee,
            &[
                DocumentInput::new("Carlos Pereira ramal 7000", employee_metadata("first")),
                DocumentInput::new("Carlos Pereira ramal 7000", employee_metadata("second")),
            ],
        );

        let query = store.embed("Carlos Pereira ramal 7000");
        let results = store
            .search(&query, 10, 0.0, SourceFilter::InternalOnly)
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title.as_deref(), Some("first"));
        assert_eq!(results[1].title.as_deref(), Some("second"));
    }

    #[test]
    fn test_type_filter_partitions_results() {
        let mut store = store();
        store.add_documents(
            DocumentType::Employee,
            &[DocumentInput::new(
                "horário de atendimento interno",
                employee_metadata("RH"),
            )],
        );
        store.add_documents(
            DocumentType::Web,
            &[DocumentInput::new(
                "horário de atendimento interno",
                web_metadata("https://intranet.test/horarios"),
            )],
        );

        let query = store.embed("horário de atendimento interno");

        let internal = store
            .search(&query, 10, 0.0, SourceFilter::InternalOnly)
            .unwrap();
        assert_eq!(internal.len(), 1);
        assert_eq!(internal[0].document_type, DocumentType::Employee);

        let web = store.search(&query, 10, 0.0, SourceFilter::WebOnly).unwrap();
        assert_eq!(web.len(), 1);
        assert_eq!(web[0].source, "https://intranet.test/horarios");
    }

    #[test]
    fn test_empty_store_returns_empty() {
        let store = store();
        let query = store.embed("anything");
        let results = store.search(&query, 5, 0.0, SourceFilter::All).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_clear_then_stats_is_zero() {
        let mut store = store();
        store.add_documents(
            DocumentType::Web,
            &[DocumentInput::new("page", web_metadata("https://x.test"))],
        );
        assert_eq!(store.stats().total_documents, 1);

        store.clear();
        assert_eq!(store.stats().total_documents, 0);
        assert!(store.is_empty());
        assert!(store.needs_web_refresh(Duration::hours(24)));
    }

    #[test]
    fn test_long_content_is_chunked() {
        let mut store = DocumentStore::with_chunker(
            HashEmbedder::with_dimension(64),
            ChunkerConfig {
                target_chars: 50,
                overlap_chars: 10,
            },
        );

        let long = "Primeira frase do documento. Segunda frase do documento. \
                    Terceira frase do documento. Quarta frase do documento.";
        let added = store.add_documents(
            DocumentType::Web,
            &[DocumentInput::new(long, web_metadata("https://x.test/doc"))],
        );

        assert!(added > 1);
        assert_eq!(store.len(), added);
    }

    #[test]
    fn test_web_refresh_gate() {
        let mut store = store();
        assert!(store.needs_web_refresh(Duration::hours(24)));

        store.add_documents(
            DocumentType::Web,
            &[DocumentInput::new("page", web_metadata("https://x.test"))],
        );
        assert!(!store.needs_web_refresh(Duration::hours(24)));
        assert!(store.needs_web_refresh(Duration::seconds(-1)));
    }

    #[test]
    fn test_json_round_trip() {
        let mut store = store();
        store.add_documents(
            DocumentType::Announcement,
            &[DocumentInput::new(
                "festa de fim de ano confirmada",
                DocumentMetadata::Announcement {
                    announcement_id: Some("ann-1".into()),
                    title: Some("Festa".into()),
                },
            )],
        );

        let json = store.to_json().unwrap();
        let reloaded =
            DocumentStore::from_json(&json, HashEmbedder::with_dimension(64)).unwrap();

        assert_eq!(reloaded.len(), store.len());
        let query = reloaded.embed("festa de fim de ano confirmada");
        let results = reloaded.search(&query, 5, 0.5, SourceFilter::All).unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_from_json_rejects_dimension_mismatch() {
        let store = store();
        let json = store.to_json().unwrap();
        let result = DocumentStore::from_json(&json, HashEmbedder::with_dimension(32));
        assert!(result.is_err());
    }

    #[test]
    fn test_query_dimension_mismatch_is_error() {
        let mut store = store();
        store.add_documents(
            DocumentType::Web,
            &[DocumentInput::new("page", web_metadata("https://x.test"))],
        );
        let bad_query = vec![0.5; 8];
        assert!(store.search(&bad_query, 5, 0.0, SourceFilter::All).is_err());
    }
}
