//! HTTP client error types.

use thiserror::Error;

/// Errors that can occur when talking to the backend.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The request could not be sent (connection refused, DNS, TLS...).
    #[error("Request failed: {0}")]
    RequestError(String),

    /// The URL could not be parsed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The backend answered with a non-2xx status.
    #[error("HTTP {status}: {message}")]
    HttpError { status: u16, message: String },

    /// The response body didn't match the expected shape.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// The request exceeded the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request body could not be serialized.
    #[error("JSON error: {0}")]
    JsonError(String),
}

impl FetchError {
    /// Whether the backend was reachable but refused the request.
    pub fn is_http_status(&self) -> bool {
        matches!(self, FetchError::HttpError { .. })
    }

    /// The HTTP status, if the failure carried one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::HttpError { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(e: serde_json::Error) -> Self {
        FetchError::JsonError(e.to_string())
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_builder() {
            FetchError::InvalidUrl(e.to_string())
        } else {
            FetchError::RequestError(e.to_string())
        }
    }
}
