//! In-memory entry store backed by a HashMap.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::{CacheEntry, DEFAULT_NAMESPACE};
use crate::error::Result;
use crate::store::EntryStore;

// == Memory Store ==
/// Non-durable [`EntryStore`]; contents are lost when dropped.
#[derive(Debug)]
pub struct MemoryStore {
    namespace: String,
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_namespace(DEFAULT_NAMESPACE)
    }
}

impl MemoryStore {
    /// Creates an empty store in the default namespace.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Returns the current number of entries.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    fn namespace(&self) -> &str {
        &self.namespace
    }

    async fn open(&self) -> Result<()> {
        Ok(())
    }

    async fn count(&self) -> Result<usize> {
        Ok(self.entries.read().await.len())
    }

    async fn newest_timestamp(&self) -> Result<Option<i64>> {
        Ok(self.entries.read().await.values().map(|e| e.timestamp).max())
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, entry: CacheEntry) -> Result<()> {
        self.entries.write().await.insert(entry.key.clone(), entry);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<CacheEntry>> {
        Ok(self.entries.read().await.values().cloned().collect())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }

    async fn delete_many(&self, keys: &[String]) -> Result<()> {
        let mut entries = self.entries.write().await;
        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.entries.write().await.clear();
        Ok(())
    }
}
