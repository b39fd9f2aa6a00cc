//! Error types for management API calls.

use thiserror::Error;

/// Errors that can occur when querying the management API.
#[derive(Debug, Clone, Error)]
pub enum ClientError {
    /// HTTP request failed or returned an unexpected status.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Authentication failed.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Connection failed.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// The requested resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl ClientError {
    /// Returns true for failures that may succeed if the call is repeated
    /// later (network trouble, timeouts, server-side errors).
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ClientError::Connection(_) | ClientError::Timeout | ClientError::Http(_)
        )
    }
}

#[cfg(feature = "rabbitmq")]
impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::Timeout
        } else if err.is_connect() {
            ClientError::Connection(err.to_string())
        } else if err.is_decode() {
            ClientError::Parse(err.to_string())
        } else {
            ClientError::Http(err.to_string())
        }
    }
}
