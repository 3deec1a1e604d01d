//! Durable key/value persistence for extracted text.
//!
//! A `CacheStore` is deliberately dumb: it loads, saves, and removes entries
//! by key. Key derivation, expiry, and locking live one layer up in the
//! cache crate, so every backend behaves identically.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::CacheError;

/// A cached extraction result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The extracted, budget-capped text
    pub text: String,

    /// When the entry was written (Unix epoch milliseconds)
    pub timestamp: i64,
}

impl CacheEntry {
    /// Whether this entry is older than `ttl_ms` at time `now_ms`.
    ///
    /// An entry exactly `ttl_ms` old is still fresh.
    pub fn is_expired(&self, now_ms: i64, ttl_ms: i64) -> bool {
        now_ms.saturating_sub(self.timestamp) > ttl_ms
    }
}

/// The core CacheStore trait.
///
/// Implementations: SQLite, JSON-lines file, in-memory (for testing).
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// The backend name (e.g., "sqlite", "file", "memory").
    fn name(&self) -> &str;

    /// Load the entry stored under `key`.
    async fn load(&self, key: &str) -> std::result::Result<Option<CacheEntry>, CacheError>;

    /// Store `entry` under `key`, replacing any previous value.
    async fn save(&self, key: &str, entry: &CacheEntry) -> std::result::Result<(), CacheError>;

    /// Remove the entry under `key`. Returns whether anything was removed.
    async fn remove(&self, key: &str) -> std::result::Result<bool, CacheError>;

    /// Get total entry count.
    async fn count(&self) -> std::result::Result<usize, CacheError>;

    /// Remove every entry.
    async fn clear(&self) -> std::result::Result<(), CacheError>;
}
