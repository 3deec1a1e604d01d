//! SQLite store.
//!
//! One table, `search_cache`, keyed by the namespaced cache key. The database
//! file survives restarts, which is the point: a week-long cache lifetime
//! only saves paid search calls if it outlives the process.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info};
use websearch_core::cache::{CacheEntry, CacheStore};
use websearch_core::error::CacheError;

/// A SQLite-backed cache store.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (or create) the database file at `path`, creating parent directories.
    pub async fn open(path: &Path) -> Result<Self, CacheError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CacheError::Storage(format!("Failed to create cache directory: {e}"))
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal);

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(|e| CacheError::Storage(format!("Failed to open SQLite: {e}")))?;

        let store = Self { pool };
        store.run_migrations().await?;
        info!("SQLite cache store initialized at {}", path.display());
        Ok(store)
    }

    /// An ephemeral in-process database.
    ///
    /// Limited to a single connection: every `:memory:` connection is its own
    /// database.
    pub async fn in_memory() -> Result<Self, CacheError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| CacheError::Storage(format!("Invalid SQLite path: {e}")))?;

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| CacheError::Storage(format!("Failed to open SQLite: {e}")))?;

        Self::from_pool(pool).await
    }

    /// Create from an existing pool.
    pub async fn from_pool(pool: SqlitePool) -> Result<Self, CacheError> {
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), CacheError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS search_cache (
                key        TEXT PRIMARY KEY NOT NULL,
                text       TEXT NOT NULL,
                timestamp  INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| CacheError::MigrationFailed(format!("search_cache table: {e}")))?;

        debug!("SQLite migrations complete");
        Ok(())
    }
}

#[async_trait]
impl CacheStore for SqliteStore {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn load(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let row = sqlx::query("SELECT text, timestamp FROM search_cache WHERE key = ?1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| CacheError::QueryFailed(format!("GET by key: {e}")))?;

        let Some(row) = row else {
            return Ok(None);
        };

        let text: String = row
            .try_get("text")
            .map_err(|e| CacheError::QueryFailed(format!("text column: {e}")))?;
        let timestamp: i64 = row
            .try_get("timestamp")
            .map_err(|e| CacheError::QueryFailed(format!("timestamp column: {e}")))?;

        Ok(Some(CacheEntry { text, timestamp }))
    }

    async fn save(&self, key: &str, entry: &CacheEntry) -> Result<(), CacheError> {
        sqlx::query(
            r#"
            INSERT INTO search_cache (key, text, timestamp)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                text = excluded.text,
                timestamp = excluded.timestamp
            "#,
        )
        .bind(key)
        .bind(&entry.text)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await
        .map_err(|e| CacheError::Storage(format!("INSERT failed: {e}")))?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool, CacheError> {
        let result = sqlx::query("DELETE FROM search_cache WHERE key = ?1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| CacheError::Storage(format!("DELETE failed: {e}")))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<usize, CacheError> {
        let row = sqlx::query("SELECT COUNT(*) AS cnt FROM search_cache")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| CacheError::QueryFailed(format!("COUNT: {e}")))?;

        let cnt: i64 = row
            .try_get("cnt")
            .map_err(|e| CacheError::QueryFailed(format!("cnt column: {e}")))?;

        Ok(cnt as usize)
    }

    async fn clear(&self) -> Result<(), CacheError> {
        sqlx::query("DELETE FROM search_cache")
            .execute(&self.pool)
            .await
            .map_err(|e| CacheError::Storage(format!("CLEAR failed: {e}")))?;

        Ok(())
    }
}
