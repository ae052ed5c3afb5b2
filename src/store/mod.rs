//! Persistent Store Module
//!
//! Minimal async key/value contract the cache runs on, with a SQLite adapter for
//! durable storage and an in-memory adapter for tests and ephemeral caches.
//!
//! Every operation is one implicit transaction: a reader never observes a
//! half-written entry.

mod memory;
mod sqlite;

use async_trait::async_trait;

use crate::cache::CacheEntry;
use crate::error::Result;

pub use memory::MemoryStore;
pub use sqlite::{SqliteLocation, SqliteStore};

/// Longest accepted namespace, in bytes
pub const MAX_NAMESPACE_LENGTH: usize = 64;

// == Entry Store ==
/// Storage backend for cache entries.
///
/// `open` is idempotent and every other operation opens the store lazily, so
/// callers never have to sequence initialization themselves.
#[async_trait]
pub trait EntryStore: Send + Sync + 'static {
    /// Storage location identifier this store writes to.
    fn namespace(&self) -> &str;

    /// Creates the backing namespace if absent.
    async fn open(&self) -> Result<()>;

    /// Fetches an entry; absence is `Ok(None)`.
    async fn get(&self, key: &str) -> Result<Option<CacheEntry>>;

    /// Inserts or replaces the entry with the same key.
    async fn put(&self, entry: CacheEntry) -> Result<()>;

    /// Returns every entry, in no particular order.
    async fn get_all(&self) -> Result<Vec<CacheEntry>>;

    /// Number of stored entries.
    async fn count(&self) -> Result<usize> {
        Ok(self.get_all().await?.len())
    }

    /// Largest write timestamp held, `None` when empty.
    async fn newest_timestamp(&self) -> Result<Option<i64>> {
        Ok(self.get_all().await?.iter().map(|e| e.timestamp).max())
    }

    /// Removes an entry; absent keys are a no-op.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Removes a batch of entries in one transaction; absent keys are skipped.
    async fn delete_many(&self, keys: &[String]) -> Result<()> {
        for key in keys {
            self.delete(key).await?;
        }
        Ok(())
    }

    /// Removes every entry.
    async fn clear(&self) -> Result<()>;
}

// == Namespace Validation ==
/// Checks that a namespace is usable as a table name.
pub(crate) fn is_valid_namespace(namespace: &str) -> bool {
    let mut chars = namespace.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    namespace.len() <= MAX_NAMESPACE_LENGTH
        && (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_namespaces() {
        assert!(is_valid_namespace("thumbnails"));
        assert!(is_valid_namespace("_thumbs_256"));
        assert!(is_valid_namespace("T"));
    }

    #[test]
    fn test_invalid_namespaces() {
        assert!(!is_valid_namespace(""));
        assert!(!is_valid_namespace("256_thumbs"));
        assert!(!is_valid_namespace("thumbs; DROP TABLE x"));
        assert!(!is_valid_namespace("inchbox-thumbnails"));
        assert!(!is_valid_namespace(&"x".repeat(MAX_NAMESPACE_LENGTH + 1)));
    }
}
