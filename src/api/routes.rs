//! API Routes
//!
//! Configures the Axum router with all thumbnail cache endpoints.

use axum::{
    routing::{delete, get},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, get_handler, health_handler, invalidate_handler, put_handler, stats_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /thumbnail?path=&size=&modified_time=` - Look up a thumbnail
/// - `PUT /thumbnail` - Store a rendered thumbnail
/// - `DELETE /thumbnail?path=&size=&modified_time=` - Drop one thumbnail
/// - `DELETE /thumbnails` - Clear the cache
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin, so a local UI process can call the sidecar
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/thumbnail",
            get(get_handler).put(put_handler).delete(invalidate_handler),
        )
        .route("/thumbnails", delete(clear_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
