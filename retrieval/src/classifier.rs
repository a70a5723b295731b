//! Keyword-based query classification.
//!
//! Maps a free-text query to one of three categories, each of which carries
//! its own threshold and boost configuration. Matching is plain substring
//! membership over the lowercased query against fixed keyword lists, checked
//! in priority order: employee terms first, then announcement terms, else
//! general. Employee queries are the higher-value class to get right, which
//! is why that list wins ties.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// The category assigned to a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryCategory {
    /// Directory lookup: who someone is, their extension, department, role.
    Employee,
    /// Announcement board lookup: notices, memos, events.
    Announcement,
    /// Anything else.
    General,
}

impl std::fmt::Display for QueryCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryCategory::Employee => write!(f, "employee"),
            QueryCategory::Announcement => write!(f, "announcement"),
            QueryCategory::General => write!(f, "general"),
        }
    }
}

/// Employee-directory terms (pt-BR and English).
const EMPLOYEE_TERMS: &[&str] = &[
    "funcionário",
    "funcionario",
    "colaborador",
    "colaboradora",
    "employee",
    "ramal",
    "extension",
    "departamento",
    "department",
    "cargo",
    "setor",
    "equipe",
    "quem é",
    "quem e",
    "quem trabalha",
    "contato de",
    "e-mail de",
    "email de",
    "telefone de",
];

/// Announcement-board terms (pt-BR and English).
const ANNOUNCEMENT_TERMS: &[&str] = &[
    "comunicado",
    "announcement",
    "aviso",
    "avisos",
    "notícia",
    "noticia",
    "notícias",
    "noticias",
    "memorando",
    "evento",
    "eventos",
    "reunião",
    "reuniao",
    "meeting",
    "novidade",
    "novidades",
];

/// Fixed-priority keyword classifier.
///
/// Always returns a category; an unmatched query is `General`. There is no
/// scoring and no model — first matching list wins.
#[derive(Debug, Clone, Default)]
pub struct QueryClassifier;

impl QueryClassifier {
    /// Create a classifier with the built-in keyword lists.
    pub fn new() -> Self {
        Self
    }

    /// Classify a query.
    pub fn classify(&self, query: &str) -> QueryCategory {
        let lowered = query.to_lowercase();

        let category = if EMPLOYEE_TERMS.iter().any(|term| lowered.contains(term)) {
            QueryCategory::Employee
        } else if ANNOUNCEMENT_TERMS.iter().any(|term| lowered.contains(term)) {
            QueryCategory::Announcement
        } else {
            QueryCategory::General
        };

        debug!("classified query as {category}");
        category
    }
}
