//! Session model and its persisted representation

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::token::AuthToken;

/// Authenticated-user snapshot held by the session manager
///
/// A session is *authenticated* only while it carries a token whose
/// expiration lies in the future. A user payload without a token is
/// treated as unauthenticated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Session {
    /// Opaque user payload as returned by the API
    #[serde(default)]
    pub user: Option<Value>,

    /// Credential attached to the user
    #[serde(default)]
    pub token: Option<AuthToken>,
}

impl Session {
    #[must_use]
    pub fn new(user: Option<Value>, token: Option<AuthToken>) -> Self {
        Self { user, token }
    }

    /// The absent-session marker
    #[must_use]
    pub fn unauthenticated() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_authenticated_at(&self, now: DateTime<Utc>) -> bool {
        self.token.as_ref().is_some_and(|token| !token.is_expired_at(now))
    }

    /// `true` when neither a user nor a token is held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.user.is_none() && self.token.is_none()
    }

    /// Typed view of the user payload
    ///
    /// # Errors
    ///
    /// Returns the deserialization error if the payload does not match `T`.
    pub fn user_as<T: DeserializeOwned>(&self) -> Result<Option<T>, serde_json::Error> {
        self.user.clone().map(serde_json::from_value).transpose()
    }

    /// Serialize into the persisted slot format
    ///
    /// # Errors
    ///
    /// Fails only if the user payload cannot be represented as JSON.
    pub fn to_persisted(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse the persisted slot format
    ///
    /// # Errors
    ///
    /// Returns the parse error for malformed data; callers treat it as an
    /// absent session.
    pub fn from_persisted(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}
