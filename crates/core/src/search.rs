//! The search provider call.
//!
//! The payload is returned as loosely-typed JSON: the extractor decides what
//! is usable, so a client never rejects a response for missing fields.

use async_trait::async_trait;
use crate::error::SearchError;

#[async_trait]
pub trait SearchClient: Send + Sync {
    /// The client name (e.g., "serpapi").
    fn name(&self) -> &str;

    /// Run one search and return the provider's JSON body.
    async fn search(&self, query: &str) -> std::result::Result<serde_json::Value, SearchError>;
}
