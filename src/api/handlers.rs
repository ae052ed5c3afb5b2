//! API Handlers
//!
//! HTTP request handlers for each thumbnail cache endpoint.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};

use crate::cache::{CacheConfig, ThumbnailCache};
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, HealthResponse, InvalidateResponse, PutResponse, PutThumbnailRequest,
    StatsResponse, ThumbnailQuery, ThumbnailResponse,
};
use crate::store::{EntryStore, SqliteStore};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    /// Shared thumbnail cache
    pub cache: ThumbnailCache,
}

impl AppState {
    /// Creates a new AppState around an existing cache.
    pub fn new(cache: ThumbnailCache) -> Self {
        Self { cache }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Builds a SQLite store at the configured path; the database is opened on
    /// the first request.
    pub fn from_config(config: &crate::config::Config) -> Result<Self> {
        let store: Arc<dyn EntryStore> =
            Arc::new(SqliteStore::file(&config.database_path, &config.namespace)?);
        Self::with_store(store, config.cache_config())
    }

    /// Creates a new AppState over any store.
    pub fn with_store(store: Arc<dyn EntryStore>, config: CacheConfig) -> Result<Self> {
        Ok(Self::new(ThumbnailCache::new(store, config)?))
    }
}

/// Handler for GET /thumbnail
///
/// Returns the cached payload, or 404 on a miss.
pub async fn get_handler(
    State(state): State<AppState>,
    Query(query): Query<ThumbnailQuery>,
) -> Result<Json<ThumbnailResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = state
        .cache
        .derive_key(&query.path, query.size, query.modified_time);
    let payload = state
        .cache
        .get(&query.path, query.size, query.modified_time)
        .await
        .ok_or_else(|| CacheError::NotFound(key.clone()))?;

    Ok(Json(ThumbnailResponse::new(key, payload)))
}

/// Handler for PUT /thumbnail
///
/// Stores a rendered thumbnail. Always succeeds for valid input; write
/// failures are absorbed by the cache.
pub async fn put_handler(
    State(state): State<AppState>,
    Json(req): Json<PutThumbnailRequest>,
) -> Result<Json<PutResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = state.cache.derive_key(&req.path, req.size, req.modified_time);
    state
        .cache
        .put(&req.path, req.size, req.modified_time, req.payload)
        .await;

    Ok(Json(PutResponse::new(key)))
}

/// Handler for DELETE /thumbnail
///
/// Drops the thumbnail for one identity.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Query(query): Query<ThumbnailQuery>,
) -> Result<Json<InvalidateResponse>> {
    if let Some(error_msg) = query.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    let key = state
        .cache
        .derive_key(&query.path, query.size, query.modified_time);
    state
        .cache
        .invalidate(&query.path, query.size, query.modified_time)
        .await;

    Ok(Json(InvalidateResponse::new(key)))
}

/// Handler for DELETE /thumbnails
///
/// Empties the cache.
pub async fn clear_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.cache.clear_all().await;
    Json(ClearResponse::new(state.cache.namespace()))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;
    Json(StatsResponse::new(&stats, state.cache.capacity()))
}

/// Handler for GET /health
///
/// Returns health status of the server.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
