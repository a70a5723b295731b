//! Typed documents for the intranet index.
//!
//! Each document carries a tagged metadata variant keyed by its source type,
//! so read sites resolve fields by exhaustive matching instead of probing a
//! loose map. The type is fixed at creation and drives search partitioning
//! (internal directory data versus indexed web content).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use intranet_embeddings::Embedding;

/// The source type of an indexed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    /// Scraped web page content.
    Web,
    /// Employee directory record.
    Employee,
    /// Announcement board entry.
    Announcement,
}

impl DocumentType {
    /// Whether this type comes from internally indexed data (directory or
    /// announcements) rather than scraped web content.
    pub fn is_internal(self) -> bool {
        matches!(self, DocumentType::Employee | DocumentType::Announcement)
    }
}

impl std::fmt::Display for DocumentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DocumentType::Web => write!(f, "web"),
            DocumentType::Employee => write!(f, "employee"),
            DocumentType::Announcement => write!(f, "announcement"),
        }
    }
}

/// Metadata for a document, keyed by source type.
///
/// Back-references to originating records are weak: ids only, no ownership.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DocumentMetadata {
    /// Scraped web page.
    Web {
        /// Page URL.
        url: Option<String>,
        /// Page title.
        title: Option<String>,
    },
    /// Employee directory record.
    Employee {
        /// Id of the originating employee record.
        employee_id: Option<String>,
        /// Employee display name.
        name: Option<String>,
    },
    /// Announcement board entry.
    Announcement {
        /// Id of the originating announcement.
        announcement_id: Option<String>,
        /// Announcement title.
        title: Option<String>,
    },
}

impl DocumentMetadata {
    /// The document type this metadata belongs to.
    pub fn document_type(&self) -> DocumentType {
        match self {
            DocumentMetadata::Web { .. } => DocumentType::Web,
            DocumentMetadata::Employee { .. } => DocumentType::Employee,
            DocumentMetadata::Announcement { .. } => DocumentType::Announcement,
        }
    }

    /// Human-readable title, when one is known.
    pub fn title(&self) -> Option<&str> {
        match self {
            DocumentMetadata::Web { title, .. } => title.as_deref(),
            DocumentMetadata::Employee { name, .. } => name.as_deref(),
            DocumentMetadata::Announcement { title, .. } => title.as_deref(),
        }
    }

    /// Source label used when presenting results.
    ///
    /// Web documents are identified by URL when available; internal documents
    /// by their type name.
    pub fn source(&self) -> String {
        match self {
            DocumentMetadata::Web { url, .. } => url
                .clone()
                .unwrap_or_else(|| DocumentType::Web.to_string()),
            DocumentMetadata::Employee { .. } => DocumentType::Employee.to_string(),
            DocumentMetadata::Announcement { .. } => DocumentType::Announcement.to_string(),
        }
    }
}

/// An indexed document: one unit of retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Unique identifier, generated at indexing time.
    pub id: String,

    /// Plain-text content.
    pub content: String,

    /// Fixed-length embedding of the content.
    pub embedding: Embedding,

    /// Source metadata.
    pub metadata: DocumentMetadata,

    /// When the document was indexed.
    pub indexed_at: DateTime<Utc>,
}

impl Document {
    /// Create a new document with a fresh id and the current timestamp.
    pub fn new(
        content: impl Into<String>,
        embedding: Embedding,
        metadata: DocumentMetadata,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            embedding,
            metadata,
            indexed_at: Utc::now(),
        }
    }

    /// The source type of this document.
    pub fn document_type(&self) -> DocumentType {
        self.metadata.document_type()
    }
}

/// A raw item submitted for indexing: content plus its metadata.
///
/// Long content is chunked and embedded by the store; one input may become
/// several documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    /// Plain-text content to index.
    pub content: String,

    /// Source metadata for every document produced from this item.
    pub metadata: DocumentMetadata,
}

impl DocumentInput {
    /// Create a new input item.
    pub fn new(content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_internal_partition() {
        assert!(DocumentType::Employee.is_internal());
        assert!(DocumentType::Announcement.is_internal());
        assert!(!DocumentType::Web.is_internal());
    }

    #[test]
    fn test_metadata_type_is_fixed() {
        let metadata = DocumentMetadata::Employee {
            employee_id: Some("emp-42".into()),
            name: Some("João Silva".into()),
        };
        assert_eq!(metadata.document_type(), DocumentType::Employee);
        assert_eq!(metadata.title(), Some("João Silva"));
        assert_eq!(metadata.source(), "employee");
    }

    #[test]
    fn test_web_source_prefers_url() {
        let with_url = DocumentMetadata::Web {
            url: Some("https://intranet.example.com/sobre".into()),
            title: Some("Sobre".into()),
        };
        assert_eq!(with_url.source(), "https://intranet.example.com/sobre");

        let without_url = DocumentMetadata::Web {
            url: None,
            title: None,
        };
        assert_eq!(without_url.source(), "web");
    }

    #[test]
    fn test_metadata_tagged_serialization() {
        let metadata = DocumentMetadata::Announcement {
            announcement_id: Some("ann-7".into()),
            title: Some("Reunião geral".into()),
        };
        let json = serde_json::to_string(&metadata).unwrap();
        assert!(json.contains("\"type\":\"announcement\""));

        let back: DocumentMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(back.document_type(), DocumentType::Announcement);
    }

    #[test]
    fn test_document_ids_are_unique() {
        let metadata = DocumentMetadata::Web {
            url: None,
            title: None,
        };
        let a = Document::new("a", vec![0.0; 3], metadata.clone());
        let b = Document::new("a", vec![0.0; 3], metadata);
        assert_ne!(a.id, b.id);
    }
}
