//! SerpApi-shaped search client.
//!
//! Sends `POST {endpoint}` with `{"query": "..."}` and hands back the JSON
//! body untouched. The endpoint is usually a host-side proxy that holds the
//! real SerpApi key; when a key is configured here it is sent as a bearer
//! token as well.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};
use websearch_config::SearchConfig;
use websearch_core::error::SearchError;
use websearch_core::search::SearchClient;

/// HTTP client for a SerpApi-compatible search endpoint.
pub struct SerpApiClient {
    endpoint: String,
    api_key: Option<String>,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl SerpApiClient {
    /// Create a client for `endpoint` with a per-request timeout.
    pub fn new(
        endpoint: impl Into<String>,
        api_key: Option<String>,
        timeout_secs: u64,
    ) -> Result<Self, SearchError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| SearchError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            timeout_secs,
            client,
        })
    }

    /// Create a client from the `[search]` config section.
    pub fn from_config(config: &SearchConfig) -> Result<Self, SearchError> {
        Self::new(
            config.endpoint.clone(),
            config.api_key.clone(),
            config.timeout_secs,
        )
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl SearchClient for SerpApiClient {
    fn name(&self) -> &str {
        "serpapi"
    }

    async fn search(&self, query: &str) -> Result<serde_json::Value, SearchError> {
        debug!(endpoint = %self.endpoint, query, "Sending search request");

        let mut request = self
            .client
            .post(&self.endpoint)
            .json(&serde_json::json!({ "query": query }));

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                SearchError::Timeout {
                    timeout_secs: self.timeout_secs,
                }
            } else {
                SearchError::Network(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), body = %body, "Search request failed");
            return Err(SearchError::Status {
                status_code: status.as_u16(),
                message: status
                    .canonical_reason()
                    .map(|r| format!("{r}: {body}"))
                    .unwrap_or(body),
            });
        }

        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))
    }
}
