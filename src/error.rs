//! Error types for the StreamCast client SDK

use thiserror::Error;

use crate::auth::credential::ParseCredentialError;

/// Main error type for StreamCast client operations
#[derive(Error, Debug)]
pub enum ApiError {
    /// The service answered with a non-success HTTP status
    #[error("request failed with status {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Message extracted from the response body, or the status reason
        message: String,
    },

    /// The request never produced a status (connect failure, timeout, DNS)
    #[error("network error: {0}")]
    Network(String),

    /// Session renewal failed, or succeeded without a usable credential
    #[error("session refresh failed: {0}")]
    RefreshFailed(String),

    /// Authentication flow error (login response missing a credential)
    #[error("authentication error: {0}")]
    Auth(String),

    /// A credential value could not be parsed
    #[error("invalid credential: {0}")]
    InvalidCredential(#[from] ParseCredentialError),

    /// JSON serialization error when building a request body
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid client configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for StreamCast client operations
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Create a status error
    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self::Status {
            status,
            message: message.into(),
        }
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Create a refresh-failed error
    pub fn refresh_failed(msg: impl Into<String>) -> Self {
        Self::RefreshFailed(msg.into())
    }

    /// Create an authentication error
    pub fn auth(msg: impl Into<String>) -> Self {
        Self::Auth(msg.into())
    }

    /// Create an invalid configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// HTTP status carried by this error, if any
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether this failure signals an expired credential.
    ///
    /// An unauthorized status and a no-status network failure are treated
    /// the same way: both make the request a candidate for session renewal.
    #[must_use]
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Status { status: 401, .. } | Self::Network(_))
    }
}
