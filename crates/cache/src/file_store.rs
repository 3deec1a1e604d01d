//! Persistent JSON-lines store.
//!
//! Each line is one JSON object: `{"key": ..., "text": ..., "timestamp": ...}`.
//!
//! Storage location: `~/.websearch/cache.jsonl`
//!
//! Simple, portable, human-inspectable, and needs no database.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use websearch_core::cache::{CacheEntry, CacheStore};
use websearch_core::error::CacheError;

/// One line of the cache file.
#[derive(Serialize, Deserialize)]
struct FileRecord {
    key: String,
    #[serde(flatten)]
    entry: CacheEntry,
}

/// A file-backed store using JSONL (one JSON object per line).
///
/// Entries are loaded into memory on creation and flushed to disk on every
/// mutation (save, remove, clear). This gives fast reads with durable writes.
pub struct FileStore {
    path: PathBuf,
    entries: Arc<RwLock<BTreeMap<String, CacheEntry>>>,
}

impl FileStore {
    /// Create a new file-based store at the given path.
    ///
    /// If the file exists, entries are loaded from it.
    /// If the file does not exist, starts empty (file created on first write).
    pub fn new(path: PathBuf) -> Self {
        let entries = Self::load_from_disk(&path);
        debug!(path = %path.display(), count = entries.len(), "File cache store loaded");
        Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    /// Load entries from a JSONL file. Later lines win on duplicate keys.
    fn load_from_disk(path: &Path) -> BTreeMap<String, CacheEntry> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return BTreeMap::new(), // File doesn't exist yet
        };

        content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str::<FileRecord>(line) {
                Ok(record) => Some((record.key, record.entry)),
                Err(e) => {
                    warn!(error = %e, "Skipping corrupted cache line");
                    None
                }
            })
            .collect()
    }

    /// Flush all entries to disk as JSONL.
    async fn flush(&self) -> Result<(), CacheError> {
        let entries = self.entries.read().await;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                CacheError::Storage(format!("Failed to create cache directory: {e}"))
            })?;
        }

        let mut content = String::new();
        for (key, entry) in entries.iter() {
            let record = FileRecord {
                key: key.clone(),
                entry: entry.clone(),
            };
            let line = serde_json::to_string(&record).map_err(|e| {
                CacheError::Storage(format!("Failed to serialize cache entry: {e}"))
            })?;
            content.push_str(&line);
            content.push('\n');
        }

        std::fs::write(&self.path, &content)
            .map_err(|e| CacheError::Storage(format!("Failed to write cache file: {e}")))?;

        Ok(())
    }
}

#[async_trait]
impl CacheStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn save(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), entry.clone());
        self.flush().await
    }

    async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let removed = self.entries.write().await.remove(key).is_some();
        if removed {
            self.flush().await?;
        }
        Ok(removed)
    }

    async fn count(&self) -> Result<usize, CacheError> {
        Ok(self.entries.read().await.len())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        self.entries.write().await.clear();
        self.flush().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn entry(text: &str) -> CacheEntry {
        CacheEntry {
            text: text.into(),
            timestamp: 1_700_000_000_000,
        }
    }

    fn temp_path() -> PathBuf {
        let tmp = NamedTempFile::new().unwrap();
        let path = tmp.path().to_path_buf();
        drop(tmp); // Close file so the store can use it
        path
    }

    #[tokio::test]
    async fn save_persists_across_reload() {
        let path = temp_path();

        let store = FileStore::new(path.clone());
        store
            .save("query_what is rust", &entry("Rust is great\n"))
            .await
            .unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("query_what is rust"));

        let reloaded = FileStore::new(path);
        let loaded = reloaded.load("query_what is rust").await.unwrap();
        assert_eq!(loaded, Some(entry("Rust is great\n")));
    }

    #[tokio::test]
    async fn remove_persists() {
        let path = temp_path();

        let store = FileStore::new(path.clone());
        store.save("k", &entry("x")).await.unwrap();
        assert!(store.remove("k").await.unwrap());

        let reloaded = FileStore::new(path);
        assert!(reloaded.load("k").await.unwrap().is_none());
        assert_eq!(reloaded.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn clear_persists() {
        let path = temp_path();

        let store = FileStore::new(path.clone());
        store.save("a", &entry("1")).await.unwrap();
        store.save("b", &entry("2")).await.unwrap();
        store.clear().await.unwrap();

        let reloaded = FileStore::new(path);
        assert_eq!(reloaded.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("cache.jsonl");

        let store = FileStore::new(path.clone());
        store.save("k", &entry("x")).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn handles_missing_file_gracefully() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("absent.jsonl"));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn handles_corrupted_lines() {
        let mut tmp = NamedTempFile::new().unwrap();
        writeln!(tmp, r#"{{"key":"query_a","text":"a\n","timestamp":1}}"#).unwrap();
        writeln!(tmp, "this is not json").unwrap();
        writeln!(tmp, r#"{{"key":"query_b","text":"b\n","timestamp":2}}"#).unwrap();

        let store = FileStore::new(tmp.path().to_path_buf());
        assert_eq!(store.count().await.unwrap(), 2);
        assert_eq!(store.load("query_b").await.unwrap().unwrap().timestamp, 2);
    }
}
