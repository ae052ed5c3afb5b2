//! Cache Entry Module
//!
//! Defines the stored record and the clock that stamps writes.

use std::sync::atomic::{AtomicI64, Ordering};

// == Cache Entry ==
/// A single cached thumbnail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Content-addressed key derived from the source identity
    pub key: String,
    /// Opaque encoded artifact, never interpreted by the cache
    pub payload: String,
    /// Time of the most recent write (Unix milliseconds)
    pub timestamp: i64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates an entry stamped with the given write time.
    pub fn new(key: impl Into<String>, payload: impl Into<String>, timestamp: i64) -> Self {
        Self {
            key: key.into(),
            payload: payload.into(),
            timestamp,
        }
    }
}

// == Write Clock ==
/// Issues strictly increasing write timestamps for one cache instance.
///
/// Follows wall-clock milliseconds, but two writes inside the same millisecond
/// (or across a backwards clock step) get `last + 1` so the latest write always
/// sorts last during eviction.
#[derive(Debug, Default)]
pub struct WriteClock {
    last: AtomicI64,
}

impl WriteClock {
    /// Creates a clock that has not issued any timestamp yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ensures every later timestamp is greater than `timestamp`.
    ///
    /// Used to step past stamps already persisted by an earlier run or another
    /// writer whose clock was ahead.
    pub fn observe(&self, timestamp: i64) {
        self.last.fetch_max(timestamp, Ordering::AcqRel);
    }

    /// Returns the next write timestamp.
    pub fn next(&self) -> i64 {
        let now = current_timestamp_ms();
        let mut prev = self.last.load(Ordering::Relaxed);
        loop {
            let candidate = now.max(prev + 1);
            match self.last.compare_exchange_weak(
                prev,
                candidate,
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(_) => return candidate,
                Err(actual) => prev = actual,
            }
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
