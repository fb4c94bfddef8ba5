//! Error types for the Reloader client

use reloader_core::dto::ErrorResponse;
use thiserror::Error;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Errors that can occur when using the Reloader client
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    /// Server answered with a non-success status code
    #[error("API error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the server
        message: String,
    },

    /// Failed to parse response
    #[error("Failed to parse response: {0}")]
    ParseError(String),
}

impl ClientError {
    /// Create an API error from a status code and a response body
    ///
    /// Uses the `error` field when the body is a JSON error response,
    /// otherwise the raw body.
    pub fn api_error(status: u16, body: &str) -> Self {
        let message = serde_json::from_str::<ErrorResponse>(body)
            .map(|response| response.error)
            .unwrap_or_else(|_| body.trim().to_string());

        Self::Api { status, message }
    }

    /// Check if the server rejected the token
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Api { status: 401, .. })
    }

    /// Check if this error is a client error (4xx status)
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 400 && *status < 500)
    }

    /// Check if this error is a server error (5xx status)
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }
}
