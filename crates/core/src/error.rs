//! Error types for the websearch domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// Why a pipeline run produced no prompt content.
///
/// Every variant is a per-turn outcome, not a crash: the per-turn entry point
/// logs it and leaves the prompt slot cleared. Administrative calls surface
/// it to the caller instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Web search is disabled")]
    Disabled,

    #[error("No input: {0}")]
    NoInput(String),

    #[error("No trigger phrase matched")]
    NoTrigger,

    #[error("No search API key configured")]
    NoCredential,

    #[error("Search request failed: {0}")]
    NetworkFailure(String),

    #[error("Search produced no usable text")]
    EmptyExtraction,
}

impl From<SearchError> for PipelineError {
    fn from(err: SearchError) -> Self {
        Self::NetworkFailure(err.to_string())
    }
}

// --- Bounded context errors ---

#[derive(Debug, Clone, Error)]
pub enum SearchError {
    #[error("Search API returned {status_code}: {message}")]
    Status { status_code: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Search timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Invalid search response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),
}
