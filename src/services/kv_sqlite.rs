//! SQLite-backed key-value store.
//!
//! Values live in a single `kv` table. Blocking SQLite calls run on tokio's
//! blocking pool.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::{debug, info, instrument, trace};

use super::{KeyValueStore, ServiceFuture};
use crate::error::{GalleryError, Result};

const SCHEMA_SQL: &str = r"
CREATE TABLE IF NOT EXISTS kv (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL
);
";

/// Key-value store persisted in a SQLite database.
#[derive(Clone)]
pub struct SqliteKvStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteKvStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteKvStore").finish_non_exhaustive()
    }
}

impl SqliteKvStore {
    /// Opens or creates a database at the given path.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                GalleryError::KeyValue(format!(
                    "Failed to create directory {}: {e}",
                    parent.display()
                ))
            })?;
        }

        debug!(path = %path.display(), "Opening key-value database");
        let conn = Connection::open(path)
            .map_err(|e| GalleryError::KeyValue(format!("Failed to open database: {e}")))?;

        let store = Self::from_connection(conn)?;
        info!(path = %path.display(), "Key-value database ready");
        Ok(store)
    }

    /// Creates an in-memory database.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|e| {
            GalleryError::KeyValue(format!("Failed to create in-memory database: {e}"))
        })?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| GalleryError::KeyValue(format!("Failed to initialize schema: {e}")))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn
                .lock()
                .map_err(|_| GalleryError::KeyValue("database lock poisoned".to_string()))?;
            f(&*guard).map_err(|e| GalleryError::KeyValue(e.to_string()))
        })
        .await
        .map_err(|e| GalleryError::KeyValue(format!("database task failed: {e}")))?
    }
}

impl KeyValueStore for SqliteKvStore {
    fn get<'a>(&'a self, key: &'a str) -> ServiceFuture<'a, Option<String>> {
        Box::pin(async move {
            let owned = key.to_string();
            let value = self
                .with_conn(move |conn| {
                    conn.query_row("SELECT value FROM kv WHERE key = ?1", params![owned], |row| {
                        row.get::<_, String>(0)
                    })
                    .optional()
                })
                .await?;
            trace!(key, found = value.is_some(), "kv get");
            Ok(value)
        })
    }

    fn set<'a>(&'a self, key: &'a str, value: &'a str) -> ServiceFuture<'a, ()> {
        Box::pin(async move {
            let (k, v) = (key.to_string(), value.to_string());
            let now = Utc::now().to_rfc3339();
            self.with_conn(move |conn| {
                conn.execute(
                    "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                     ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                    updated_at = excluded.updated_at",
                    params![k, v, now],
                )
            })
            .await?;
            debug!(key, bytes = value.len(), "kv set");
            Ok(())
        })
    }

    fn remove<'a>(&'a self, key: &'a str) -> ServiceFuture<'a, ()> {
        Box::pin(async move {
            let owned = key.to_string();
            self.with_conn(move |conn| conn.execute("DELETE FROM kv WHERE key = ?1", params![owned]))
                .await?;
            debug!(key, "kv remove");
            Ok(())
        })
    }
}
