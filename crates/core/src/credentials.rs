//! Credential lookup. The only thing the pipeline needs to know about secrets
//! is whether one exists.

/// Secret name for the search provider API key.
pub const SERPAPI_SECRET: &str = "api_key_serpapi";

/// Answers "is a secret configured under this name?".
pub trait Credentials: Send + Sync {
    fn has_secret(&self, name: &str) -> bool;
}

impl Credentials for bool {
    fn has_secret(&self, _name: &str) -> bool {
        *self
    }
}
