//! Evictor Module
//!
//! Keeps a store within capacity by removing the oldest-written entries.

use tracing::debug;

use crate::cache::CacheEntry;
use crate::error::Result;
use crate::store::EntryStore;

// == Evictor ==
/// Oldest-first capacity enforcement.
///
/// Each pass re-reads the live store contents, so concurrent passes never act
/// on a stale snapshot; deleting an already-deleted key is a no-op.
#[derive(Debug, Clone, Copy)]
pub struct Evictor {
    capacity: usize,
}

impl Evictor {
    pub fn new(capacity: usize) -> Self {
        Self { capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // == Select Victims ==
    /// Returns the keys to delete so that at most `capacity` entries remain.
    ///
    /// Entries are ordered by `(timestamp, key)`; the surplus at the front of
    /// that order is selected. The `protected` key is never selected.
    pub fn select_victims(
        &self,
        mut entries: Vec<CacheEntry>,
        protected: Option<&str>,
    ) -> Vec<String> {
        if entries.len() <= self.capacity {
            return Vec::new();
        }

        let surplus = entries.len() - self.capacity;
        if let Some(protected) = protected {
            entries.retain(|entry| entry.key != protected);
        }
        entries.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.key.cmp(&b.key)));
        entries.truncate(surplus.min(entries.len()));
        entries.into_iter().map(|entry| entry.key).collect()
    }

    // == Enforce ==
    /// Runs one eviction pass and returns how many entries were removed.
    ///
    /// `protected` names an entry that must survive the pass, typically the
    /// one just written.
    pub async fn enforce(
        &self,
        store: &dyn EntryStore,
        protected: Option<&str>,
    ) -> Result<usize> {
        let entries = store.get_all().await?;
        let count = entries.len();
        let victims = self.select_victims(entries, protected);

        if victims.is_empty() {
            return Ok(0);
        }

        store.delete_many(&victims).await?;
        debug!(
            "Evicted {} of {} entries (capacity {})",
            victims.len(),
            count,
            self.capacity
        );
        Ok(victims.len())
    }
}
