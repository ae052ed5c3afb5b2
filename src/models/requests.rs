//! Request DTOs for the thumbnail cache API
//!
//! Defines the structure of incoming query strings and request bodies.

use serde::Deserialize;

fn validate_path(path: &str) -> Option<String> {
    if path.is_empty() {
        return Some("Path cannot be empty".to_string());
    }
    None
}

/// Thumbnail identity passed as a query string
/// (GET and DELETE /thumbnail)
#[derive(Debug, Clone, Deserialize)]
pub struct ThumbnailQuery {
    /// Source file path
    pub path: String,
    /// Requested thumbnail size in pixels
    pub size: u32,
    /// Source modification time (Unix milliseconds)
    pub modified_time: i64,
}

impl ThumbnailQuery {
    /// Validates the query
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_path(&self.path)
    }
}

/// Request body for storing a rendered thumbnail (PUT /thumbnail)
#[derive(Debug, Clone, Deserialize)]
pub struct PutThumbnailRequest {
    /// Source file path
    pub path: String,
    /// Requested thumbnail size in pixels
    pub size: u32,
    /// Source modification time (Unix milliseconds)
    pub modified_time: i64,
    /// Encoded thumbnail, e.g. a data URL
    pub payload: String,
}

impl PutThumbnailRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_path(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_request_deserialize() {
        let json = r#"{"path": "/a.pdf", "size": 256, "modified_time": 1700000000000, "payload": "data:image/png;base64,AA"}"#;
        let req: PutThumbnailRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.path, "/a.pdf");
        assert_eq!(req.size, 256);
        assert_eq!(req.modified_time, 1_700_000_000_000);
        assert!(req.payload.starts_with("data:"));
    }

    #[test]
    fn test_put_request_requires_payload() {
        let json = r#"{"path": "/a.pdf", "size": 256, "modified_time": 1}"#;
        assert!(serde_json::from_str::<PutThumbnailRequest>(json).is_err());
    }

    #[test]
    fn test_validate_empty_path() {
        let req = ThumbnailQuery {
            path: "".to_string(),
            size: 64,
            modified_time: 0,
        };
        assert!(req.validate().is_some());
    }

    #[test]
    fn test_validate_valid_request() {
        let req = PutThumbnailRequest {
            path: "/photos/cat.jpg".to_string(),
            size: 64,
            modified_time: 5,
            payload: "x".to_string(),
        };
        assert!(req.validate().is_none());
    }
}
