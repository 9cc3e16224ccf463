//! Document search over the external index.
//!
//! The [`SearchClient`] trait is the seam between the RAG pipeline and the
//! search service. Results come back in the service's ranking order and are
//! never re-sorted here.

pub mod azure;

pub use azure::AzureSearchClient;

use ragchat_core::config::SearchConfig;
use ragchat_core::AppResult;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Display name used when a document carries none.
pub const UNKNOWN_SOURCE: &str = "unknown";

/// One candidate returned by the search service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchDocument {
    /// Relevance score; `None` when the field was missing or not numeric
    pub score: Option<f64>,

    /// Body text, possibly empty
    pub content: String,

    /// Display name of the originating document
    pub name: String,
}

impl SearchDocument {
    /// Create a document with a known score.
    pub fn new(score: f64, content: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            score: Some(score),
            content: content.into(),
            name: name.into(),
        }
    }

    /// Score used for gating: an unparseable score counts as zero.
    pub fn effective_score(&self) -> f64 {
        self.score.unwrap_or(0.0)
    }

    /// Build a document from one raw search hit.
    ///
    /// Absent fields are tolerated: score becomes `None`, body becomes empty,
    /// name falls back to [`UNKNOWN_SOURCE`].
    pub fn from_hit(hit: &serde_json::Value, content_field: &str, name_field: &str) -> Self {
        let score = hit.get("@search.score").and_then(parse_score);
        if score.is_none() {
            tracing::debug!("Search hit has no usable score: {:?}", hit.get("@search.score"));
        }

        let content = hit
            .get(content_field)
            .and_then(|v| v.as_str())
            .unwrap_or_default()
            .to_string();

        let name = hit
            .get(name_field)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or(UNKNOWN_SOURCE)
            .to_string();

        Self {
            score,
            content,
            name,
        }
    }
}

/// Scores may arrive as JSON numbers or, from some proxies, numeric strings.
fn parse_score(value: &serde_json::Value) -> Option<f64> {
    let score = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    score.filter(|score| score.is_finite())
}

/// Trait for document search providers.
#[async_trait::async_trait]
pub trait SearchClient: Send + Sync {
    /// Get the provider name (e.g., "azure-search").
    fn provider_name(&self) -> &str;

    /// Run one lexical search and return at most `top` candidates in ranking order.
    ///
    /// A single attempt; failures surface as `SearchError`.
    async fn search(&self, query: &str, top: u32) -> AppResult<Vec<SearchDocument>>;
}

/// Create the search client for the configured service.
pub fn create_search_client(config: &SearchConfig) -> AppResult<Arc<dyn SearchClient>> {
    Ok(Arc::new(AzureSearchClient::from_config(config)?))
}
