//! Authentication token types
//!
//! [`AuthToken`] is the in-memory and persisted form of a credential;
//! [`TokenResponse`] is the wire shape returned by login-type endpoints.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Longest lifetime honoured from a server response (100 years)
const MAX_LIFETIME_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// Bearer credential with an absolute expiration instant
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    /// Opaque token string sent in the `Authorization` header
    pub value: String,

    /// Token type discriminator (e.g. `"bearer"`)
    #[serde(rename = "type")]
    pub token_type: String,

    /// Absolute expiration timestamp (UTC)
    pub expires_at: DateTime<Utc>,

    /// Whether the server renews the token on activity
    ///
    /// Carried through only; renewal is performed by the server.
    #[serde(default)]
    pub sliding_window: bool,

    /// URL for obtaining a renewed token, when the server provides one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_url: Option<String>,
}

impl AuthToken {
    /// Create a token with an explicit expiration instant
    #[must_use]
    pub fn new(
        value: impl Into<String>,
        token_type: impl Into<String>,
        expires_at: DateTime<Utc>,
    ) -> Self {
        Self {
            value: value.into(),
            token_type: token_type.into(),
            expires_at,
            sliding_window: false,
            refresh_url: None,
        }
    }

    /// Create a token from a lifetime relative to `issued_at`
    ///
    /// The lifetime is clamped to `0..=100 years`; a negative value yields
    /// a token that is already expired.
    #[must_use]
    pub fn from_expires_in(
        value: impl Into<String>,
        token_type: impl Into<String>,
        expires_in_secs: i64,
        issued_at: DateTime<Utc>,
    ) -> Self {
        let lifetime = TimeDelta::try_seconds(expires_in_secs.clamp(0, MAX_LIFETIME_SECS))
            .unwrap_or(TimeDelta::zero());
        let expires_at = issued_at.checked_add_signed(lifetime).unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self::new(value, token_type, expires_at)
    }

    #[must_use]
    pub fn with_sliding_window(mut self, sliding_window: bool) -> Self {
        self.sliding_window = sliding_window;
        self
    }

    #[must_use]
    pub fn with_refresh_url(mut self, url: impl Into<String>) -> Self {
        self.refresh_url = Some(url.into());
        self
    }

    /// `true` once `now` has reached the expiration instant
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Time left before expiry, or `None` if already expired
    #[must_use]
    pub fn remaining_at(&self, now: DateTime<Utc>) -> Option<Duration> {
        (self.expires_at - now).to_std().ok().filter(|remaining| !remaining.is_zero())
    }

    /// Value for the `Authorization` header: `"<type> <value>"`
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.value)
    }
}

/// Token payload returned by login-type endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    /// Either a boolean or a window length; any truthy value enables it
    #[serde(default)]
    pub sliding_window: Option<Value>,
    #[serde(default)]
    pub access_url_token: Option<String>,
}

impl TokenResponse {
    /// Convert into an [`AuthToken`] anchored at `issued_at`
    #[must_use]
    pub fn into_token(self, issued_at: DateTime<Utc>) -> AuthToken {
        let sliding_window = match &self.sliding_window {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v > 0.0),
            Some(Value::String(s)) => matches!(s.to_ascii_lowercase().as_str(), "true" | "1"),
            _ => false,
        };

        let mut token =
            AuthToken::from_expires_in(self.access_token, self.token_type, self.expires_in, issued_at)
                .with_sliding_window(sliding_window);
        token.refresh_url = self.access_url_token;
        token
    }
}
