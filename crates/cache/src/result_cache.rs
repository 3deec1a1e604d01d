//! The expiring result cache.
//!
//! Entries are keyed by `"query_" + query`, where `query` is exactly what the
//! trigger detector produced (already normalized and word-limited). Expiry is
//! lazy: nothing sweeps the store, an expired entry is deleted when a lookup
//! finds it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};
use tracing::debug;
use websearch_core::cache::{CacheEntry, CacheStore};
use websearch_core::clock::{Clock, SystemClock};
use websearch_core::error::CacheError;

/// Namespace prefix for every cache key.
pub const KEY_PREFIX: &str = "query_";

/// Lock table size above which idle per-key locks are pruned.
const LOCK_PRUNE_THRESHOLD: usize = 64;

/// Derive the store key for a query.
pub fn cache_key(query: &str) -> String {
    format!("{KEY_PREFIX}{query}")
}

/// Query-keyed cache with lazy TTL expiry and per-key mutual exclusion.
pub struct ResultCache {
    store: Arc<dyn CacheStore>,
    clock: Arc<dyn Clock>,
    locks: Mutex<HashMap<String, Arc<AsyncMutex<()>>>>,
}

impl ResultCache {
    /// Create a cache over `store` using the system clock.
    pub fn new(store: Arc<dyn CacheStore>) -> Self {
        Self {
            store,
            clock: Arc::new(SystemClock),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Replace the clock (tests use a `ManualClock`).
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Name of the underlying store.
    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Look up `query`. Entries older than `ttl_ms` are deleted and reported as a miss.
    pub async fn get(&self, query: &str, ttl_ms: i64) -> Result<Option<CacheEntry>, CacheError> {
        self.load_fresh(&cache_key(query), ttl_ms).await
    }

    /// Store `text` for `query` stamped with the current time.
    pub async fn put(&self, query: &str, text: &str) -> Result<(), CacheError> {
        let lock = self.lock(query).await;
        lock.put(text).await
    }

    /// Remove every entry.
    pub async fn clear(&self) -> Result<(), CacheError> {
        self.store.clear().await?;
        debug!(store = self.store.name(), "Cache cleared");
        Ok(())
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> Result<usize, CacheError> {
        self.store.count().await
    }

    /// Take the per-key lock for `query`.
    ///
    /// While the returned guard lives, no other caller can read-then-write the
    /// same key, so identical concurrent queries trigger one fetch.
    pub async fn lock(&self, query: &str) -> KeyLock<'_> {
        let key = cache_key(query);
        let mutex = {
            let mut locks = self.locks.lock().unwrap_or_else(|p| p.into_inner());
            if locks.len() > LOCK_PRUNE_THRESHOLD {
                locks.retain(|_, m| Arc::strong_count(m) > 1);
            }
            locks
                .entry(key.clone())
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let guard = mutex.lock_owned().await;
        KeyLock {
            cache: self,
            key,
            _guard: guard,
        }
    }

    async fn load_fresh(&self, key: &str, ttl_ms: i64) -> Result<Option<CacheEntry>, CacheError> {
        let Some(entry) = self.store.load(key).await? else {
            return Ok(None);
        };

        if entry.is_expired(self.clock.now_ms(), ttl_ms) {
            debug!(key, "Cached result expired, removing");
            self.store.remove(key).await?;
            return Ok(None);
        }

        debug!(key, "Cached result is valid");
        Ok(Some(entry))
    }

    async fn save(&self, key: &str, text: &str) -> Result<(), CacheError> {
        let entry = CacheEntry {
            text: text.to_string(),
            timestamp: self.clock.now_ms(),
        };
        self.store.save(key, &entry).await
    }
}

/// Exclusive access to one cache key.
pub struct KeyLock<'a> {
    cache: &'a ResultCache,
    key: String,
    _guard: OwnedMutexGuard<()>,
}

impl KeyLock<'_> {
    /// The store key this lock guards.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Same as [`ResultCache::get`], under the held lock.
    pub async fn get(&self, ttl_ms: i64) -> Result<Option<CacheEntry>, CacheError> {
        self.cache.load_fresh(&self.key, ttl_ms).await
    }

    /// Same as [`ResultCache::put`], under the held lock.
    pub async fn put(&self, text: &str) -> Result<(), CacheError> {
        self.cache.save(&self.key, text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InMemoryStore;
    use std::time::Duration;
    use websearch_core::clock::ManualClock;

    const TTL_MS: i64 = 60_000;

    fn cache_with_clock() -> (ResultCache, Arc<InMemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(ManualClock::new(1_000_000));
        let cache = ResultCache::new(store.clone()).with_clock(clock.clone());
        (cache, store, clock)
    }

    #[test]
    fn key_is_namespaced_query() {
        assert_eq!(cache_key("how to bake"), "query_how to bake");
        assert_ne!(cache_key("how to bake"), cache_key("how to bake bread"));
    }

    #[tokio::test]
    async fn put_then_get_within_ttl() {
        let (cache, _, clock) = cache_with_clock();
        cache.put("q", "text").await.unwrap();

        clock.advance(TTL_MS);
        let entry = cache.get("q", TTL_MS).await.unwrap().unwrap();
        assert_eq!(entry.text, "text");
        assert_eq!(entry.timestamp, 1_000_000);
    }

    #[tokio::test]
    async fn expired_entry_is_removed_on_read() {
        let (cache, store, clock) = cache_with_clock();
        cache.put("q", "text").await.unwrap();
        assert_eq!(store.count().await.unwrap(), 1);

        clock.advance(TTL_MS + 1);
        assert!(cache.get("q", TTL_MS).await.unwrap().is_none());
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn expiry_is_not_swept_proactively() {
        let (cache, store, clock) = cache_with_clock();
        cache.put("a", "1").await.unwrap();
        cache.put("b", "2").await.unwrap();

        clock.advance(TTL_MS * 10);
        assert!(cache.get("a", TTL_MS).await.unwrap().is_none());
        // "b" was never read, so it is still stored.
        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn put_overwrites_and_restamps() {
        let (cache, _, clock) = cache_with_clock();
        cache.put("q", "old").await.unwrap();
        clock.advance(5);
        cache.put("q", "new").await.unwrap();

        let entry = cache.get("q", TTL_MS).await.unwrap().unwrap();
        assert_eq!(entry.text, "new");
        assert_eq!(entry.timestamp, 1_000_005);
    }

    #[tokio::test]
    async fn ttl_is_read_at_lookup_time() {
        let (cache, _, clock) = cache_with_clock();
        cache.put("q", "text").await.unwrap();
        clock.advance(30_000);

        assert!(cache.get("q", 60_000).await.unwrap().is_some());
        assert!(cache.get("q", 10_000).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_removes_everything() {
        let (cache, _, _) = cache_with_clock();
        cache.put("a", "1").await.unwrap();
        cache.put("b", "2").await.unwrap();
        cache.clear().await.unwrap();
        assert_eq!(cache.len().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn key_lock_serializes_same_query() {
        let (cache, _, _) = cache_with_clock();
        let cache = Arc::new(cache);

        let held = cache.lock("q").await;
        assert_eq!(held.key(), "query_q");

        let contender = {
            let cache = cache.clone();
            tokio::spawn(async move {
                let lock = cache.lock("q").await;
                lock.get(TTL_MS).await.unwrap().map(|e| e.text)
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        held.put("filled by first caller").await.unwrap();
        drop(held);

        let seen = contender.await.unwrap();
        assert_eq!(seen.as_deref(), Some("filled by first caller"));
    }

    #[tokio::test]
    async fn different_keys_do_not_block() {
        let (cache, _, _) = cache_with_clock();
        let _a = cache.lock("a").await;
        let b = cache.lock("b").await;
        b.put("independent").await.unwrap();
        assert!(cache.get("b", TTL_MS).await.unwrap().is_some());
    }
}
