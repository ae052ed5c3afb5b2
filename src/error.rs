//! Error types for the thumbnail cache
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the thumbnail cache.
///
/// Store-level variants never escape [`crate::cache::ThumbnailCache`]; they are
/// logged there and turned into misses or no-ops.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Backing storage could not be opened
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// A single get/put/delete/scan failed
    #[error("Transaction failed: {0}")]
    Transaction(String),

    /// Rejected construction parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// No cached thumbnail for the requested identity
    #[error("Thumbnail not cached: {0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<rusqlite::Error> for CacheError {
    fn from(e: rusqlite::Error) -> Self {
        CacheError::Transaction(e.to_string())
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            CacheError::Transaction(_) | CacheError::InvalidConfig(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the thumbnail cache.
pub type Result<T> = std::result::Result<T, CacheError>;
