//! Error types for the Confluence integration.

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed or returned an error status.
    #[error("HTTP error: {status} - {body}")]
    HttpResponse { status: u16, body: String },

    /// The configured space key does not exist.
    #[error("space not found: {key}")]
    SpaceNotFound { key: String },

    /// IO error reading an attachment file.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),
}

impl From<serde_json::Error> for ConfluenceError {
    fn from(e: serde_json::Error) -> Self {
        ConfluenceError::Json(e.to_string())
    }
}

impl From<ureq::Error> for ConfluenceError {
    fn from(e: ureq::Error) -> Self {
        ConfluenceError::HttpResponse {
            status: 0,
            body: e.to_string(),
        }
    }
}
