//! SQLite-backed entry store.
//!
//! One table per namespace holds `{key, payload, timestamp}` rows keyed by
//! `key`. The connection is opened lazily on first use, shared behind a mutex,
//! and every statement runs on the blocking pool.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tokio::sync::OnceCell;
use tracing::{debug, info};

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};
use crate::store::{is_valid_namespace, EntryStore};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// == Location ==
/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqliteLocation {
    /// Durable database file; parent directory must exist
    File(PathBuf),
    /// Private in-memory database, gone when the store is dropped
    Memory,
}

// == SQLite Store ==
/// Durable [`EntryStore`] over a single SQLite table.
#[derive(Debug)]
pub struct SqliteStore {
    location: SqliteLocation,
    namespace: String,
    conn: OnceCell<Arc<Mutex<Connection>>>,
}

impl SqliteStore {
    // == Constructors ==
    /// Creates a store for `namespace` at `location` without touching storage.
    ///
    /// Fails with [`CacheError::InvalidConfig`] if the namespace is not a plain
    /// identifier (letters, digits, underscores; not starting with a digit).
    pub fn new(location: SqliteLocation, namespace: impl Into<String>) -> Result<Self> {
        let namespace = namespace.into();
        if !is_valid_namespace(&namespace) {
            return Err(CacheError::InvalidConfig(format!(
                "namespace '{}' is not a valid table name",
                namespace
            )));
        }

        Ok(Self {
            location,
            namespace,
            conn: OnceCell::new(),
        })
    }

    /// File-backed store.
    pub fn file(path: impl Into<PathBuf>, namespace: impl Into<String>) -> Result<Self> {
        Self::new(SqliteLocation::File(path.into()), namespace)
    }

    /// In-memory store (for testing).
    pub fn in_memory(namespace: impl Into<String>) -> Result<Self> {
        Self::new(SqliteLocation::Memory, namespace)
    }

    // == Connection ==
    /// Opens the database once; concurrent first callers share the same attempt.
    ///
    /// A failed open is not cached, so a later call tries again.
    async fn connection(&self) -> Result<Arc<Mutex<Connection>>> {
        self.conn
            .get_or_try_init(|| async {
                let location = self.location.clone();
                let namespace = self.namespace.clone();
                let conn = tokio::task::spawn_blocking(move || {
                    open_connection(&location, &namespace)
                })
                .await
                .map_err(|e| CacheError::StoreUnavailable(e.to_string()))??;

                info!(namespace = %self.namespace, location = ?self.location, "Opened thumbnail store");
                Ok::<_, CacheError>(Arc::new(Mutex::new(conn)))
            })
            .await
            .cloned()
    }

    /// Runs `op` against the open connection on the blocking pool.
    async fn with_conn<T, F>(&self, op: F) -> Result<T>
    where
        F: FnOnce(&mut Connection, &str) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.connection().await?;
        let namespace = self.namespace.clone();

        tokio::task::spawn_blocking(move || {
            let mut guard = conn
                .lock()
                .map_err(|_| CacheError::Transaction("connection lock poisoned".to_string()))?;
            op(&mut *guard, &namespace)
        })
        .await
        .map_err(|e| CacheError::Transaction(e.to_string()))?
    }
}

fn open_connection(location: &SqliteLocation, namespace: &str) -> Result<Connection> {
    let unavailable = |e: rusqlite::Error| CacheError::StoreUnavailable(e.to_string());

    let conn = match location {
        SqliteLocation::File(path) => Connection::open(path).map_err(unavailable)?,
        SqliteLocation::Memory => Connection::open_in_memory().map_err(unavailable)?,
    };

    // WAL is a no-op for in-memory databases
    let _ = conn.execute("PRAGMA journal_mode = WAL", []);
    conn.busy_timeout(BUSY_TIMEOUT).map_err(unavailable)?;
    conn.execute_batch(&schema(namespace)).map_err(unavailable)?;

    debug!(namespace, "Thumbnail store schema ready");
    Ok(conn)
}

fn schema(namespace: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS \"{ns}\" (
            key       TEXT PRIMARY KEY NOT NULL,
            payload   TEXT NOT NULL,
            timestamp INTEGER NOT NULL
        );
        CREATE INDEX IF NOT EXISTS \"{ns}_timestamp\" ON \"{ns}\" (timestamp);",
        ns = namespace
    )
}

fn row_to_entry(row: &rusqlite::Row<'_>) -> rusqlite::Result<CacheEntry> {
    Ok(CacheEntry {
        key: row.get(0)?,
        payload: row.get(1)?,
        timestamp: row.get(2)?,
    })
}

#[async_trait]
impl EntryStore for SqliteStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn open(&self) -> Result<()> {
        self.connection().await.map(|_| ())
    }

    async fn count(&self) -> Result<usize> {
        self.with_conn(|conn, ns| {
            let sql = format!("SELECT COUNT(*) FROM \"{}\"", ns);
            let count: i64 = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(count as usize)
        })
        .await
    }

    async fn newest_timestamp(&self) -> Result<Option<i64>> {
        self.with_conn(|conn, ns| {
            let sql = format!("SELECT MAX(timestamp) FROM \"{}\"", ns);
            let newest: Option<i64> = conn.query_row(&sql, [], |row| row.get(0))?;
            Ok(newest)
        })
        .await
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let key = key.to_string();
        self.with_conn(move |conn, ns| {
            let sql = format!(
                "SELECT key, payload, timestamp FROM \"{}\" WHERE key = ?1",
                ns
            );
            let entry = conn
                .query_row(&sql, params![key], row_to_entry)
                .optional()?;
            Ok(entry)
        })
        .await
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.with_conn(move |conn, ns| {
            let sql = format!(
                "INSERT INTO \"{}\" (key, payload, timestamp) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET
                    payload = excluded.payload,
                    timestamp = excluded.timestamp",
                ns
            );
            conn.execute(&sql, params![entry.key, entry.payload, entry.timestamp])?;
            Ok(())
        })
        .await
    }

    async fn get_all(&self) -> Result<Vec<CacheEntry>> {
        self.with_conn(|conn, ns| {
            let sql = format!("SELECT key, payload, timestamp FROM \"{}\"", ns);
            let mut stmt = conn.prepare(&sql)?;
            let entries = stmt
                .query_map([], row_to_entry)?
                .collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(entries)
        })
        .await
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.with_conn(move |conn, ns| {
            let sql = format!("DELETE FROM \"{}\" WHERE key = ?1", ns);
            conn.execute(&sql, params![key])?;
            Ok(())
        })
        .await
    }

    async fn delete_many(&self, keys: &[String]) -> Result<()> {
        if keys.is_empty() {
            return Ok(());
        }

        let keys = keys.to_vec();
        self.with_conn(move |conn, ns| {
            let tx = conn.transaction()?;
            {
                let sql = format!("DELETE FROM \"{}\" WHERE key = ?1", ns);
                let mut stmt = tx.prepare(&sql)?;
                for key in &keys {
                    stmt.execute(params![key])?;
                }
            }
            tx.commit()?;
            Ok(())
        })
        .await
    }

    async fn clear(&self) -> Result<()> {
        self.with_conn(|conn, ns| {
            conn.execute(&format!("DELETE FROM \"{}\"", ns), [])?;
            Ok(())
        })
        .await
    }
}
