//! Failure taxonomy for the discovery and validation endpoints.
//!
//! Every variant is recovered by the coordinator into user-visible
//! feedback; none of them escapes an operation.

use thiserror::Error;

/// Maximum number of characters of a response body carried in an error.
const MAX_BODY_CHARS: usize = 500;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Network or transport failure before a response was received.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// A 2xx response carrying an `error` field.
    #[error("{0}")]
    Application(String),

    /// The response body did not match the expected shape.
    #[error("invalid response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL cannot carry path segments.
    #[error("invalid endpoint url: {0}")]
    InvalidUrl(String),

    /// A provider or model id that would be collapsed by URL path
    /// normalisation (`.` or `..`).
    #[error("{0:?} is not a valid path segment")]
    InvalidSegment(String),
}

impl ApiError {
    /// Build a `Status` error from a raw body, preferring an embedded
    /// `{"error": "..."}` message over the body text.
    pub fn from_status(status: u16, body: &str) -> Self {
        let parsed: serde_json::Value = serde_json::from_str(body).unwrap_or_default();
        let message = match parsed["error"].as_str() {
            Some(msg) => msg.to_string(),
            None if body.trim().is_empty() => "empty response".to_string(),
            None => body.chars().take(MAX_BODY_CHARS).collect(),
        };
        Self::Status { status, message }
    }
}
