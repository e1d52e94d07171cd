//! API-specific error types
//!
//! Provides error classification for API operations with retry metadata.

use cirrus_core::SessionError;
use cirrus_domain::CirrusError;
use reqwest::StatusCode;
use thiserror::Error;

use crate::http::TransportError;

/// Categories of API errors for retry logic
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiErrorCategory {
    /// Authentication errors (401, 403) - retry after logging in again
    Authentication,
    /// Rate limiting errors (429) - retry with backoff
    RateLimit,
    /// Server errors (5xx) - retryable
    Server,
    /// Client errors (4xx except auth) - non-retryable
    Client,
    /// Network/connection errors - retryable
    Network,
    /// Configuration and local state errors - non-retryable
    Config,
}

/// API operation errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),

    #[error("Server error: {0}")]
    Server(String),

    #[error("Client error: {0}")]
    Client(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ApiError {
    /// Map a non-success status to an error
    #[must_use]
    pub fn from_status(status: StatusCode, url: &str, body: &str) -> Self {
        let message = if body.is_empty() {
            format!("{url} returned status {status}")
        } else {
            format!("{url} returned status {status}: {body}")
        };

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            Self::Auth(message)
        } else if status == StatusCode::NOT_FOUND {
            Self::NotFound(message)
        } else if status == StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimit(message)
        } else if status.is_server_error() {
            Self::Server(message)
        } else {
            Self::Client(message)
        }
    }

    /// Get the error category for this error
    #[must_use]
    pub fn category(&self) -> ApiErrorCategory {
        match self {
            Self::Auth(_) => ApiErrorCategory::Authentication,
            Self::RateLimit(_) => ApiErrorCategory::RateLimit,
            Self::Server(_) => ApiErrorCategory::Server,
            Self::NotFound(_) | Self::Client(_) | Self::Decode(_) => ApiErrorCategory::Client,
            Self::Transport(_) => ApiErrorCategory::Network,
            Self::Config(_) | Self::Session(_) => ApiErrorCategory::Config,
        }
    }

    /// Check if this error should be retried
    #[must_use]
    pub fn should_retry(&self) -> bool {
        matches!(
            self.category(),
            ApiErrorCategory::RateLimit | ApiErrorCategory::Server | ApiErrorCategory::Network
        )
    }
}

impl From<ApiError> for CirrusError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Auth(msg) => Self::Auth(msg),
            ApiError::NotFound(msg) => Self::NotFound(msg),
            ApiError::Client(msg) => Self::InvalidInput(msg),
            ApiError::Decode(msg) => Self::Serialization(msg),
            ApiError::Config(msg) => Self::Config(msg),
            ApiError::Session(e) => e.into(),
            other @ (ApiError::RateLimit(_) | ApiError::Server(_) | ApiError::Transport(_)) => {
                Self::Network(other.to_string())
            }
        }
    }
}
