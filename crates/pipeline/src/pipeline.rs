//! The per-turn web search pipeline.

use crate::extract::extract;
use crate::inject::{SLOT_ID, render_template};
use crate::normalize::normalize;
use crate::trigger::detect_query;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use websearch_cache::ResultCache;
use websearch_config::WebSearchSettings;
use websearch_core::credentials::{Credentials, SERPAPI_SECRET};
use websearch_core::error::{CacheError, PipelineError};
use websearch_core::message::{ChatTurn, latest_user_turn};
use websearch_core::prompt::{MacroExpander, NoMacros, PromptSlot};
use websearch_core::search::SearchClient;

/// Default deadline for one search call.
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(20);

/// What a successful run wrote into the prompt slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    /// The query sent to (or looked up for) the search provider
    pub query: String,

    /// Extracted search text, before templating
    pub text: String,

    /// Final slot content
    pub content: String,

    /// Whether `text` came from the cache
    pub cached: bool,
}

/// Detects search-worthy chat turns and injects search results into the prompt.
pub struct WebSearchPipeline {
    /// Expiring result cache
    cache: Arc<ResultCache>,

    /// Search provider
    client: Arc<dyn SearchClient>,

    /// API key presence check
    credentials: Arc<dyn Credentials>,

    /// Host prompt slot
    slot: Arc<dyn PromptSlot>,

    /// Host macro pass
    macros: Arc<dyn MacroExpander>,

    /// Deadline for one search call
    search_timeout: Duration,
}

impl WebSearchPipeline {
    /// Create a new pipeline with no macro expansion and the default search deadline.
    pub fn new(
        cache: Arc<ResultCache>,
        client: Arc<dyn SearchClient>,
        credentials: Arc<dyn Credentials>,
        slot: Arc<dyn PromptSlot>,
    ) -> Self {
        Self {
            cache,
            client,
            credentials,
            slot,
            macros: Arc::new(NoMacros),
            search_timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }

    /// Set the macro pass applied to the filled template.
    pub fn with_macros(mut self, macros: Arc<dyn MacroExpander>) -> Self {
        self.macros = macros;
        self
    }

    /// Set the deadline for one search call.
    pub fn with_search_timeout(mut self, timeout: Duration) -> Self {
        self.search_timeout = timeout;
        self
    }

    /// Run the pipeline for a new chat turn.
    ///
    /// Never fails: every abort reason is logged and the slot is left cleared.
    pub async fn on_chat_turn(
        &self,
        chat: &[ChatTurn],
        settings: &WebSearchSettings,
    ) -> Option<Injection> {
        let started = Instant::now();
        let outcome = self.run(chat, settings).await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(injection) => {
                info!(
                    query = %injection.query,
                    cached = injection.cached,
                    elapsed_ms,
                    "Web search injected"
                );
                Some(injection)
            }
            Err(PipelineError::NetworkFailure(reason)) => {
                warn!(%reason, elapsed_ms, "Web search failed");
                None
            }
            Err(e) => {
                debug!(reason = %e, elapsed_ms, "Web search skipped");
                None
            }
        }
    }

    /// Run the pipeline, reporting why it stopped.
    ///
    /// The slot is cleared before anything else, so every error leaves it empty.
    pub async fn run(
        &self,
        chat: &[ChatTurn],
        settings: &WebSearchSettings,
    ) -> Result<Injection, PipelineError> {
        self.slot
            .set_slot(SLOT_ID, "", settings.position, settings.depth)
            .await;

        if !settings.enabled {
            return Err(PipelineError::Disabled);
        }

        if chat.is_empty() {
            return Err(PipelineError::NoInput("chat is empty".into()));
        }

        if !self.credentials.has_secret(SERPAPI_SECRET) {
            return Err(PipelineError::NoCredential);
        }

        let message = latest_user_turn(chat)
            .map(|turn| turn.text.as_str())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| PipelineError::NoInput("no user message found".into()))?;

        let normalized = normalize(message);
        if normalized.is_empty() {
            return Err(PipelineError::NoInput("processed message is empty".into()));
        }
        debug!(message = %normalized, "Processed message");

        let query = detect_query(&normalized, &settings.trigger_phrases, settings.max_words)
            .ok_or(PipelineError::NoTrigger)?;
        info!(query = %query, "Extracted query");

        let (text, cached) = self.search_cached(&query, settings).await?;

        let filled = render_template(&settings.insertion_template, &query, &text);
        let content = self.macros.expand(&filled);
        self.slot
            .set_slot(SLOT_ID, &content, settings.position, settings.depth)
            .await;
        debug!(
            position = %settings.position,
            depth = settings.depth,
            length = content.len(),
            "Prompt slot updated"
        );

        Ok(Injection {
            query,
            text,
            content,
            cached,
        })
    }

    /// Search `sample_text` as-is and return the extracted text.
    ///
    /// Bypasses normalization, trigger detection and the cache. Errors are
    /// returned to the caller.
    pub async fn test_query(
        &self,
        sample_text: &str,
        settings: &WebSearchSettings,
    ) -> Result<String, PipelineError> {
        if sample_text.trim().is_empty() {
            return Err(PipelineError::NoInput("sample text is empty".into()));
        }

        if !self.credentials.has_secret(SERPAPI_SECRET) {
            return Err(PipelineError::NoCredential);
        }

        self.fetch(sample_text, settings.budget_chars).await
    }

    /// Remove every cached result.
    pub async fn clear_cache(&self) -> Result<(), CacheError> {
        self.cache.clear().await?;
        info!(store = self.cache.store_name(), "Web search cache cleared");
        Ok(())
    }

    /// Serve `query` from the cache, or fetch and cache it.
    ///
    /// The per-key lock is held across the fetch, so concurrent identical
    /// queries produce one network call. Cache I/O errors never abort the run.
    async fn search_cached(
        &self,
        query: &str,
        settings: &WebSearchSettings,
    ) -> Result<(String, bool), PipelineError> {
        let lock = self.cache.lock(query).await;

        match lock.get(settings.cache_lifetime_ms()).await {
            Ok(Some(entry)) => {
                debug!(key = lock.key(), "Using cached result");
                return Ok((entry.text, true));
            }
            Ok(None) => {}
            Err(e) => warn!(key = lock.key(), error = %e, "Cache read failed, searching instead"),
        }

        let text = self.fetch(query, settings.budget_chars).await?;

        if let Err(e) = lock.put(&text).await {
            warn!(key = lock.key(), error = %e, "Failed to cache search result");
        }

        Ok((text, false))
    }

    async fn fetch(&self, query: &str, budget_chars: usize) -> Result<String, PipelineError> {
        debug!(client = self.client.name(), query, "Searching");

        let payload = tokio::time::timeout(self.search_timeout, self.client.search(query))
            .await
            .map_err(|_| {
                PipelineError::NetworkFailure(format!(
                    "search timed out after {}ms",
                    self.search_timeout.as_millis()
                ))
            })??;

        extract(&payload, budget_chars).ok_or(PipelineError::EmptyExtraction)
    }
}
