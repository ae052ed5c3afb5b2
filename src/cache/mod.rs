//! Cache Module
//!
//! Content-addressed thumbnail caching with oldest-first capacity enforcement.

mod entry;
mod evictor;
mod key;
mod stats;
mod thumbnail;


// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry, WriteClock};
pub use evictor::Evictor;
pub use key::derive_key;
pub use stats::{CacheStats, StatsRecorder};
pub use thumbnail::{CacheConfig, ThumbnailCache};

// == Public Constants ==
/// Default number of retained thumbnails
pub const DEFAULT_CAPACITY: usize = 50;

/// Default storage namespace
pub const DEFAULT_NAMESPACE: &str = "thumbnails";
