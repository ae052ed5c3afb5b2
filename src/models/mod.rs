//! Request and Response models for the thumbnail cache API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{PutThumbnailRequest, ThumbnailQuery};
pub use responses::{
    ClearResponse, ErrorResponse, HealthResponse, InvalidateResponse, PutResponse, StatsResponse,
    ThumbnailResponse,
};
