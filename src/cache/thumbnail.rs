//! Thumbnail Cache Module
//!
//! Best-effort orchestrator over an [`EntryStore`]: derives keys, reads and
//! writes entries, and enforces capacity after every write. Store failures are
//! logged and counted, never returned; a failed lookup is just a miss.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::cache::{
    derive_key, CacheEntry, CacheStats, Evictor, StatsRecorder, WriteClock, DEFAULT_CAPACITY,
    DEFAULT_NAMESPACE,
};
use crate::error::{CacheError, Result};
use crate::store::EntryStore;

// == Cache Config ==
/// Construction-time parameters of a cache instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of retained entries
    pub capacity: usize,
    /// Storage location identifier; must match the namespace of the store
    pub namespace: String,
}

impl CacheConfig {
    pub fn new(capacity: usize, namespace: impl Into<String>) -> Self {
        Self {
            capacity,
            namespace: namespace.into(),
        }
    }

    /// Rejects configurations the evictor cannot honor.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(CacheError::InvalidConfig(
                "capacity must be at least 1".to_string(),
            ));
        }
        if self.namespace.is_empty() {
            return Err(CacheError::InvalidConfig(
                "namespace cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, DEFAULT_NAMESPACE)
    }
}

// == Thumbnail Cache ==
/// Capacity-bounded thumbnail cache keyed by (path, size, modified time).
///
/// Cheap to clone; clones share the store, clock and statistics.
#[derive(Clone)]
pub struct ThumbnailCache {
    store: Arc<dyn EntryStore>,
    evictor: Evictor,
    namespace: Arc<str>,
    clock: Arc<WriteClock>,
    stats: Arc<StatsRecorder>,
}

impl std::fmt::Debug for ThumbnailCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThumbnailCache")
            .field("namespace", &self.namespace)
            .field("capacity", &self.evictor.capacity())
            .finish_non_exhaustive()
    }
}

impl ThumbnailCache {
    // == Constructor ==
    /// Creates a cache over `store`.
    ///
    /// The store is not touched here; it opens on first use. Fails with
    /// `InvalidConfig` when the store writes to a different namespace than
    /// `config` names.
    pub fn new(store: Arc<dyn EntryStore>, config: CacheConfig) -> Result<Self> {
        config.validate()?;
        if store.namespace() != config.namespace {
            return Err(CacheError::InvalidConfig(format!(
                "namespace '{}' does not match store namespace '{}'",
                config.namespace,
                store.namespace()
            )));
        }

        Ok(Self {
            store,
            evictor: Evictor::new(config.capacity),
            namespace: Arc::from(config.namespace),
            clock: Arc::new(WriteClock::new()),
            stats: Arc::new(StatsRecorder::new()),
        })
    }

    pub fn capacity(&self) -> usize {
        self.evictor.capacity()
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    // == Derive Key ==
    /// Returns the key a thumbnail with this identity is stored under.
    pub fn derive_key(&self, path: &str, size: u32, modified_time: i64) -> String {
        derive_key(path, size, modified_time)
    }

    // == Get ==
    /// Looks up a cached payload. Store failures resolve to `None`.
    pub async fn get(&self, path: &str, size: u32, modified_time: i64) -> Option<String> {
        let key = derive_key(path, size, modified_time);

        match self.store.get(&key).await {
            Ok(Some(entry)) => {
                self.stats.record_hit();
                debug!(namespace = %self.namespace, path, size, "Thumbnail cache hit");
                Some(entry.payload)
            }
            Ok(None) => {
                self.stats.record_miss();
                debug!(namespace = %self.namespace, path, size, "Thumbnail cache miss");
                None
            }
            Err(e) => {
                self.stats.record_miss();
                self.report_failure("get", &e);
                None
            }
        }
    }

    // == Put ==
    /// Stores a payload, then runs an eviction pass before returning.
    ///
    /// The write is stamped after every timestamp already in the store, and
    /// the eviction pass never removes it. Failures are logged and swallowed.
    pub async fn put(&self, path: &str, size: u32, modified_time: i64, payload: impl Into<String>) {
        let key = derive_key(path, size, modified_time);

        // Stored stamps may be ahead of wall time after a clock step back
        match self.store.newest_timestamp().await {
            Ok(Some(newest)) => self.clock.observe(newest),
            Ok(None) => {}
            Err(e) => self.report_failure("put", &e),
        }

        let entry = CacheEntry::new(key.clone(), payload, self.clock.next());
        if let Err(e) = self.store.put(entry).await {
            self.report_failure("put", &e);
            return;
        }
        self.stats.record_write();

        self.evict(Some(&key)).await;
    }

    // == Invalidate ==
    /// Drops the entry for one identity, if present.
    pub async fn invalidate(&self, path: &str, size: u32, modified_time: i64) {
        let key = derive_key(path, size, modified_time);
        if let Err(e) = self.store.delete(&key).await {
            self.report_failure("invalidate", &e);
        }
    }

    // == Clear All ==
    /// Empties the store. Best-effort.
    pub async fn clear_all(&self) {
        match self.store.clear().await {
            Ok(()) => debug!(namespace = %self.namespace, "Thumbnail cache cleared"),
            Err(e) => self.report_failure("clear", &e),
        }
    }

    // == Enforce Capacity ==
    /// Runs an eviction pass and returns how many entries were removed.
    pub async fn enforce_capacity(&self) -> usize {
        self.evict(None).await
    }

    async fn evict(&self, protected: Option<&str>) -> usize {
        match self.evictor.enforce(self.store.as_ref(), protected).await {
            Ok(evicted) => {
                self.stats.record_evictions(evicted);
                evicted
            }
            Err(e) => {
                self.report_failure("evict", &e);
                0
            }
        }
    }

    // == Stats ==
    /// Returns current statistics; the entry count is 0 if the store cannot be read.
    pub async fn stats(&self) -> CacheStats {
        let total_entries = match self.store.count().await {
            Ok(count) => count,
            Err(e) => {
                self.report_failure("stats", &e);
                0
            }
        };
        self.stats.snapshot(total_entries)
    }

    fn report_failure(&self, operation: &str, error: &CacheError) {
        self.stats.record_failure();
        warn!(
            namespace = %self.namespace,
            operation,
            error = %error,
            "Thumbnail cache operation failed"
        );
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use async_trait::async_trait;

    /// Store whose every operation fails as if it could not be opened.
    struct UnavailableStore;

    #[async_trait]
    impl EntryStore for UnavailableStore {
        fn namespace(&self) -> &str {
            DEFAULT_NAMESPACE
        }

        async fn open(&self) -> Result<()> {
            Err(CacheError::StoreUnavailable("disk gone".to_string()))
        }

        async fn get(&self, _key: &str) -> Result<Option<CacheEntry>> {
            self.open().await.map(|_| None)
        }

        async fn put(&self, _entry: CacheEntry) -> Result<()> {
            self.open().await
        }

        async fn get_all(&self) -> Result<Vec<CacheEntry>> {
            self.open().await.map(|_| Vec::new())
        }

        async fn delete(&self, _key: &str) -> Result<()> {
            self.open().await
        }

        async fn clear(&self) -> Result<()> {
            self.open().await
        }
    }

    fn memory_cache(capacity: usize) -> (Arc<MemoryStore>, ThumbnailCache) {
        let store = Arc::new(MemoryStore::new());
        let cache = ThumbnailCache::new(store.clone(), CacheConfig::new(capacity, "thumbnails"))
            .unwrap();
        (store, cache)
    }

    #[test]
    fn test_rejects_zero_capacity() {
        let result = ThumbnailCache::new(Arc::new(MemoryStore::new()), CacheConfig::new(0, "t"));
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_rejects_empty_namespace() {
        let result = ThumbnailCache::new(Arc::new(MemoryStore::new()), CacheConfig::new(5, ""));
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.capacity, 50);
        assert_eq!(config.namespace, "thumbnails");
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (_, cache) = memory_cache(50);
        cache.put("a", 10, 100, "X").await;
        assert_eq!(cache.get("a", 10, 100).await, Some("X".to_string()));
    }

    #[tokio::test]
    async fn test_miss() {
        let (_, cache) = memory_cache(50);
        assert_eq!(cache.get("never-put", 1, 1).await, None);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_count() {
        let (store, cache) = memory_cache(50);
        cache.put("a", 10, 100, "X").await;
        let count = store.len().await;
        cache.put("a", 10, 100, "Y").await;

        assert_eq!(cache.get("a", 10, 100).await, Some("Y".to_string()));
        assert_eq!(store.len().await, count);
    }

    #[tokio::test]
    async fn test_overwrite_refreshes_timestamp() {
        let (store, cache) = memory_cache(50);
        cache.put("a", 10, 100, "X").await;
        let key = cache.derive_key("a", 10, 100);
        let first = store.get(&key).await.unwrap().unwrap().timestamp;

        cache.put("a", 10, 100, "Y").await;
        let second = store.get(&key).await.unwrap().unwrap().timestamp;
        assert!(second > first);
    }

    #[tokio::test]
    async fn test_capacity_bound_keeps_latest() {
        let (store, cache) = memory_cache(50);
        for i in 0..55 {
            cache.put(&format!("/photos/{}.jpg", i), 256, 1, "data").await;
        }

        assert_eq!(store.get_all().await.unwrap().len(), 50);
        for i in 0..5 {
            assert_eq!(cache.get(&format!("/photos/{}.jpg", i), 256, 1).await, None);
        }
        for i in 5..55 {
            assert!(cache.get(&format!("/photos/{}.jpg", i), 256, 1).await.is_some());
        }
    }

    #[tokio::test]
    async fn test_refreshed_entry_survives_eviction() {
        let (_, cache) = memory_cache(3);
        cache.put("a", 1, 1, "a").await;
        cache.put("b", 1, 1, "b").await;
        cache.put("c", 1, 1, "c").await;

        // Rewriting "a" makes "b" the oldest
        cache.put("a", 1, 1, "a2").await;
        cache.put("d", 1, 1, "d").await;

        assert_eq!(cache.get("a", 1, 1).await, Some("a2".to_string()));
        assert_eq!(cache.get("b", 1, 1).await, None);
    }

    #[tokio::test]
    async fn test_put_survives_future_stamped_entries() {
        let (store, cache) = memory_cache(3);
        // Written by a run whose clock was a minute ahead
        let ahead = crate::cache::current_timestamp_ms() + 60_000;
        for i in 0..3 {
            store
                .put(CacheEntry::new(format!("stale{}", i), "old", ahead + i))
                .await
                .unwrap();
        }

        cache.put("/new.png", 64, 1, "fresh").await;

        assert_eq!(cache.get("/new.png", 64, 1).await, Some("fresh".to_string()));
        assert_eq!(store.len().await, 3);
        // The oldest future-stamped entry made room
        assert!(store.get("stale0").await.unwrap().is_none());

        let key = cache.derive_key("/new.png", 64, 1);
        let stamp = store.get(&key).await.unwrap().unwrap().timestamp;
        assert!(stamp > ahead + 2);
    }

    #[tokio::test]
    async fn test_rejects_store_namespace_mismatch() {
        let store = Arc::new(MemoryStore::with_namespace("small"));
        let result = ThumbnailCache::new(store, CacheConfig::new(3, "large"));
        assert!(matches!(result, Err(CacheError::InvalidConfig(_))));
    }

    #[tokio::test]
    async fn test_clear_all() {
        let (store, cache) = memory_cache(50);
        cache.put("a", 10, 100, "X").await;
        cache.put("b", 10, 100, "Y").await;
        cache.clear_all().await;

        assert!(store.get_all().await.unwrap().is_empty());
        assert_eq!(cache.get("a", 10, 100).await, None);
    }

    #[tokio::test]
    async fn test_invalidate() {
        let (_, cache) = memory_cache(50);
        cache.put("a", 10, 100, "X").await;
        cache.put("a", 20, 100, "big").await;
        cache.invalidate("a", 10, 100).await;

        assert_eq!(cache.get("a", 10, 100).await, None);
        assert_eq!(cache.get("a", 20, 100).await, Some("big".to_string()));
    }

    #[tokio::test]
    async fn test_enforce_capacity_on_demand() {
        let store = Arc::new(MemoryStore::new());
        for i in 0..10 {
            store
                .put(CacheEntry::new(format!("k{}", i), "v", i))
                .await
                .unwrap();
        }
        let cache = ThumbnailCache::new(store.clone(), CacheConfig::new(4, "thumbnails")).unwrap();

        assert_eq!(cache.enforce_capacity().await, 6);
        assert_eq!(store.len().await, 4);
        assert_eq!(cache.stats().await.evictions, 6);
    }

    #[tokio::test]
    async fn test_stats_track_hits_and_misses() {
        let (_, cache) = memory_cache(50);
        cache.put("a", 10, 100, "X").await;
        cache.get("a", 10, 100).await;
        cache.get("b", 10, 100).await;

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.writes, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[tokio::test]
    async fn test_unavailable_store_degrades_to_misses() {
        let cache =
            ThumbnailCache::new(Arc::new(UnavailableStore), CacheConfig::default()).unwrap();

        cache.put("a", 10, 100, "X").await;
        assert_eq!(cache.get("a", 10, 100).await, None);
        cache.invalidate("a", 10, 100).await;
        cache.clear_all().await;
        assert_eq!(cache.enforce_capacity().await, 0);

        let stats = cache.stats().await;
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.writes, 0);
        assert!(stats.store_failures >= 5);
    }

    #[tokio::test]
    async fn test_concurrent_puts_respect_capacity() {
        let (store, cache) = memory_cache(10);

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let cache = cache.clone();
                tokio::spawn(async move {
                    cache.put(&format!("/img/{}.png", i), 128, 7, "data").await;
                })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.len().await, 10);
    }
}
