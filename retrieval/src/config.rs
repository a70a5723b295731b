//! Configuration for the retrieval engine.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::classifier::QueryCategory;

/// Per-category thresholds and boosts.
///
/// The numeric defaults were tuned empirically against the intranet corpus;
/// they are starting points, not correctness constraints, and every field is
/// public so callers can adjust them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct QueryTypeConfig {
    /// Minimum (boosted) similarity for an internal result to count as
    /// "good enough" to skip the web fallback.
    pub internal_data_threshold: f32,

    /// Minimum number of internal matches required to skip the web fallback.
    pub min_internal_results: usize,

    /// Multiplicative boost applied to internal-source similarities, capped
    /// at 1.0 after application.
    pub internal_data_boost: f32,

    /// Maximum candidates considered in the internal search pass.
    pub internal_search_limit: usize,

    /// Maximum candidates considered in the web search pass.
    pub web_search_limit: usize,

    /// Floor below which a match is discarded regardless of source.
    pub min_similarity: f32,
}

impl QueryTypeConfig {
    /// Defaults for employee-directory queries.
    pub fn employee() -> Self {
        Self {
            internal_data_threshold: 0.4,
            min_internal_results: 1,
            internal_data_boost: 1.5,
            internal_search_limit: 10,
            web_search_limit: 5,
            min_similarity: 0.1,
        }
    }

    /// Defaults for announcement-board queries.
    pub fn announcement() -> Self {
        Self {
            internal_data_threshold: 0.35,
            min_internal_results: 1,
            internal_data_boost: 1.4,
            internal_search_limit: 10,
            web_search_limit: 5,
            min_similarity: 0.1,
        }
    }

    /// Defaults for general queries.
    pub fn general() -> Self {
        Self {
            internal_data_threshold: 0.3,
            min_internal_results: 2,
            internal_data_boost: 1.2,
            internal_search_limit: 8,
            web_search_limit: 8,
            min_similarity: 0.1,
        }
    }
}

/// Which document partitions a retrieval pass may touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    /// Search only internally indexed data; never fall back to the web.
    InternalOnly,
    /// Search only indexed web content.
    WebOnly,
    /// Internal first, web fallback when internal results are insufficient.
    Hybrid,
}

/// Configuration for the retrieval engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Orchestration mode.
    pub mode: RetrievalMode,

    /// Global cap on returned results, applied after the per-pass limits.
    pub search_limit: usize,

    /// Maximum characters of content per returned result; longer content is
    /// truncated at a word boundary with an ellipsis marker.
    pub max_context_chars: usize,

    /// Age in hours after which indexed web content counts as stale.
    pub web_refresh_hours: i64,

    /// Optional path for JSON persistence of the store.
    pub persist_path: Option<PathBuf>,

    /// Thresholds for employee queries.
    pub employee: QueryTypeConfig,

    /// Thresholds for announcement queries.
    pub announcement: QueryTypeConfig,

    /// Thresholds for general queries.
    pub general: QueryTypeConfig,
}

impl EngineConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self {
            mode: RetrievalMode::Hybrid,
            search_limit: 5,
            max_context_chars: 500,
            web_refresh_hours: 24,
            persist_path: None,
            employee: QueryTypeConfig::employee(),
            announcement: QueryTypeConfig::announcement(),
            general: QueryTypeConfig::general(),
        }
    }

    /// Set the orchestration mode.
    pub fn with_mode(mut self, mode: RetrievalMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the global result cap.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }

    /// Set the per-result content cap.
    pub fn with_max_context_chars(mut self, chars: usize) -> Self {
        self.max_context_chars = chars;
        self
    }

    /// Enable JSON persistence at the given path.
    pub fn with_persist_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.persist_path = Some(path.into());
        self
    }

    /// Override the configuration for one query category.
    pub fn with_category_config(mut self, category: QueryCategory, config: QueryTypeConfig) -> Self {
        match category {
            QueryCategory::Employee => self.employee = config,
            QueryCategory::Announcement => self.announcement = config,
            QueryCategory::General => self.general = config,
        }
        self
    }

    /// The threshold configuration for a query category.
    pub fn config_for(&self, category: QueryCategory) -> QueryTypeConfig {
        match category {
            QueryCategory::Employee => self.employee,
            QueryCategory::Announcement => self.announcement,
            QueryCategory::General => self.general,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.mode, RetrievalMode::Hybrid);
        assert_eq!(config.search_limit, 5);
        assert_eq!(config.web_refresh_hours, 24);
        assert!(config.persist_path.is_none());
    }

    #[test]
    fn test_config_for_category() {
        let config = EngineConfig::default();
        assert_eq!(config.config_for(QueryCategory::Employee).internal_data_boost, 1.5);
        assert_eq!(config.config_for(QueryCategory::General).min_internal_results, 2);
    }

    #[test]
    fn test_category_override() {
        let custom = QueryTypeConfig {
            internal_data_threshold: 0.9,
            ..QueryTypeConfig::employee()
        };
        let config = EngineConfig::new().with_category_config(QueryCategory::Employee, custom);
        assert_eq!(config.config_for(QueryCategory::Employee).internal_data_threshold, 0.9);
    }
}
