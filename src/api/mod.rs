//! API Module
//!
//! HTTP handlers and routing for the thumbnail cache sidecar.
//!
//! # Endpoints
//! - `GET /thumbnail` - Look up a cached thumbnail
//! - `PUT /thumbnail` - Store a rendered thumbnail
//! - `DELETE /thumbnail` - Drop one thumbnail
//! - `DELETE /thumbnails` - Clear the cache
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
