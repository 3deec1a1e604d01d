//! Search-result cache for websearch.
//!
//! [`ResultCache`] owns the cache semantics (key derivation, lazy expiry,
//! per-key locking); the stores below only persist entries.

pub mod file_store;
pub mod in_memory;
pub mod result_cache;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file_store::FileStore;
pub use in_memory::InMemoryStore;
pub use result_cache::{KEY_PREFIX, KeyLock, ResultCache, cache_key};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use std::path::Path;
use std::sync::Arc;
use websearch_core::cache::CacheStore;
use websearch_core::error::CacheError;

/// Open the store named by `backend` ("sqlite", "file" or "memory") at `path`.
pub async fn open_store(backend: &str, path: &Path) -> Result<Arc<dyn CacheStore>, CacheError> {
    match backend {
        #[cfg(feature = "sqlite")]
        "sqlite" => Ok(Arc::new(SqliteStore::open(path).await?)),
        "file" => Ok(Arc::new(FileStore::new(path.to_path_buf()))),
        "memory" => Ok(Arc::new(InMemoryStore::new())),
        other => Err(CacheError::Storage(format!("Unsupported cache backend: {other}"))),
    }
}
