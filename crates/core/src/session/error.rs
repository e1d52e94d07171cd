//! Errors surfaced by the session manager

use cirrus_domain::CirrusError;
use thiserror::Error;

/// Failures the session manager cannot recover from locally
///
/// Malformed persisted data and expired tokens are handled internally and
/// never show up here.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The storage backend failed to read, write or remove the slot
    #[error("session storage failure: {0}")]
    Storage(String),

    /// A session could not be serialized for persistence
    #[error("session serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),

    /// No tokio runtime was supplied and none is current
    #[error("no tokio runtime available for session timers")]
    NoRuntime,
}

impl From<SessionError> for CirrusError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Storage(msg) => Self::Storage(msg),
            SessionError::Serialization(e) => Self::Serialization(e.to_string()),
            SessionError::NoRuntime => {
                Self::Internal("no tokio runtime available for session timers".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_to_domain_error() {
        let err: CirrusError = SessionError::Storage("disk full".into()).into();
        assert_eq!(err, CirrusError::Storage("disk full".into()));

        let err: CirrusError = SessionError::NoRuntime.into();
        assert_eq!(err.label(), "internal");
    }
}
