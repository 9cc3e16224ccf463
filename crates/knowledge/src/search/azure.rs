//! Azure Cognitive Search provider.
//!
//! API: `POST {endpoint}/indexes/{index}/docs/search?api-version=...`
//! with an `api-key` header and a `{"search", "top"}` body.

use super::{SearchClient, SearchDocument};
use ragchat_core::config::{require, SearchConfig};
use ragchat_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Azure search request format.
#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    search: &'a str,
    top: u32,
}

/// Azure search response format. Hits are kept as raw JSON because field
/// presence varies per index.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    value: Vec<serde_json::Value>,
}

/// Azure Cognitive Search client.
pub struct AzureSearchClient {
    endpoint: Option<String>,
    api_key: Option<String>,
    index_name: Option<String>,
    api_version: String,
    content_field: String,
    name_field: String,
    timeout: Duration,

    /// HTTP client
    client: reqwest::Client,
}

impl AzureSearchClient {
    /// Create a client from search settings.
    ///
    /// Missing endpoint, key or index are reported when a search is attempted.
    pub fn from_config(config: &SearchConfig) -> AppResult<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            index_name: config.index_name.clone(),
            api_version: config.api_version.clone(),
            content_field: config.content_field.clone(),
            name_field: config.name_field.clone(),
            timeout,
            client,
        })
    }

    fn search_url(&self, endpoint: &str, index: &str) -> String {
        format!(
            "{}/indexes/{}/docs/search?api-version={}",
            endpoint.trim_end_matches('/'),
            index,
            self.api_version
        )
    }
}

#[async_trait::async_trait]
impl SearchClient for AzureSearchClient {
    fn provider_name(&self) -> &str {
        "azure-search"
    }

    async fn search(&self, query: &str, top: u32) -> AppResult<Vec<SearchDocument>> {
        let endpoint = require(&self.endpoint, "AZURE_SEARCH_ENDPOINT")?;
        let api_key = require(&self.api_key, "AZURE_SEARCH_KEY")?;
        let index = require(&self.index_name, "AZURE_SEARCH_INDEX_NAME")?;

        tracing::info!("Searching index '{}' (top {})", index, top);

        let response = self
            .client
            .post(self.search_url(endpoint, index))
            .header("api-key", api_key)
            .json(&SearchRequest { search: query, top })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AppError::Search(format!("timed out after {}s", self.timeout.as_secs()))
                } else {
                    AppError::Search(format!("unreachable ({})", e))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Search service returned {}", status);
            return Err(AppError::Search(status.as_u16().to_string()));
        }

        let body: SearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::Search(format!("malformed response ({})", e)))?;

        let documents: Vec<SearchDocument> = body
            .value
            .iter()
            .map(|hit| SearchDocument::from_hit(hit, &self.content_field, &self.name_field))
            .collect();

        tracing::debug!("Search returned {} candidates", documents.len());
        Ok(documents)
    }
}
