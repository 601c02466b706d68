//! Error types for the relay client

use thiserror::Error;

/// Result type alias for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;

/// Errors raised while obtaining or refreshing a bearer token
#[derive(Debug, Error)]
pub enum AuthError {
    /// The login request itself failed (network error, timeout)
    #[error("login request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The relay rejected the login
    #[error("login rejected (status {status}): {message}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Error message from the relay
        message: String,
    },

    /// The grant response could not be parsed
    #[error("malformed login response: {0}")]
    Parse(String),
}

/// Errors that can occur when talking to the relay
#[derive(Debug, Error)]
pub enum TransportError {
    /// Authentication failed while preparing the request
    #[error("authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// HTTP request failed before a response was received
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The relay returned an error status code
    #[error("relay error (status {status}): {message}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Error message from the relay
        message: String,
    },

    /// Failed to parse a relay response
    #[error("failed to parse relay response: {0}")]
    Parse(String),
}

impl TransportError {
    /// Create an API error from status code and message
    pub fn api_error(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Check if this error carries an HTTP 401
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
