//! HTTP fetch adapter for the Clinical Table Search Service
//!
//! One best-effort GET per lookup: no retries, no caching, no auth, and no
//! timeout beyond the transport default. The adapter asserts only the
//! top-level envelope shape; per-element validation belongs to the response
//! mapper.

use reqwest::header;
use serde_json::Value;
use tracing::debug;

use crate::search::error::SearchError;
use crate::search::query::SearchQuery;
use crate::search::vocabulary::Vocabulary;

/// Identifying header sent with every outbound request
pub const USER_AGENT: &str = concat!("clinical-tables-mcp/", env!("CARGO_PKG_VERSION"));

/// Default upstream base URL
pub const DEFAULT_BASE_URL: &str = "https://clinicaltables.nlm.nih.gov";

/// Thin client over the terminology search API
#[derive(Debug, Clone)]
pub struct ClinicalTablesClient {
    http: reqwest::Client,
    base_url: String,
}

impl ClinicalTablesClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue the single outbound GET and assert the envelope shape
    pub async fn fetch(
        &self,
        vocabulary: Vocabulary,
        query: &SearchQuery,
    ) -> Result<Value, SearchError> {
        let url = query.url(&self.base_url);
        debug!(vocabulary = vocabulary.as_str(), %url, "fetching upstream search");

        let response = self
            .http
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await
            .map_err(SearchError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::UpstreamHttp {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or("unknown").to_string(),
            });
        }

        let body: Value = response.json().await.map_err(|e| {
            SearchError::format(
                vocabulary.as_str(),
                format!("response body is not valid JSON: {e}"),
            )
        })?;

        match body.as_array() {
            Some(elements) if elements.len() >= 4 => Ok(body),
            Some(elements) => Err(SearchError::format(
                vocabulary.as_str(),
                format!(
                    "expected at least 4 response elements, got {}",
                    elements.len()
                ),
            )),
            None => Err(SearchError::format(
                vocabulary.as_str(),
                "expected a JSON array response from the API",
            )),
        }
    }
}
