//! Thumbcache - A persistent, capacity-bounded thumbnail cache
//!
//! Caches rendered thumbnails keyed by (path, size, modification time) in
//! SQLite, evicting the oldest writes once capacity is exceeded. Cache failures
//! never reach callers; the worst outcome is a re-render.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod store;

pub use api::AppState;
pub use cache::{CacheConfig, ThumbnailCache};
pub use config::Config;
pub use store::{EntryStore, MemoryStore, SqliteStore};
