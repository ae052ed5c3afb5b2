//! Configuration Module
//!
//! Handles loading the cache and server configuration from environment variables.

use std::env;
use std::path::PathBuf;

use crate::cache::{CacheConfig, DEFAULT_CAPACITY, DEFAULT_NAMESPACE};

/// Default SQLite database file for the server binary
pub const DEFAULT_DB_PATH: &str = "thumbcache.db";

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of thumbnails retained
    pub capacity: usize,
    /// Table name inside the database
    pub namespace: String,
    /// SQLite database file
    pub database_path: PathBuf,
    /// HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `THUMB_CACHE_CAPACITY` - Maximum retained entries (default: 50)
    /// - `THUMB_CACHE_NAMESPACE` - Table name (default: "thumbnails")
    /// - `THUMB_CACHE_DB` - Database file (default: "thumbcache.db")
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            capacity: env::var("THUMB_CACHE_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.capacity),
            namespace: env::var("THUMB_CACHE_NAMESPACE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.namespace),
            database_path: env::var("THUMB_CACHE_DB")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.server_port),
        }
    }

    /// Cache parameters for the orchestrator.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::new(self.capacity, self.namespace.clone())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            namespace: DEFAULT_NAMESPACE.to_string(),
            database_path: PathBuf::from(DEFAULT_DB_PATH),
            server_port: 3000,
        }
    }
}
