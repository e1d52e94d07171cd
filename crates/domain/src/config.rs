//! Client configuration

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_API_ROOT_URL, DEFAULT_API_VERSION, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_REQUEST_TIMEOUT_SECS, SESSION_SLOT_PREFIX,
};
use crate::errors::{CirrusError, Result};

/// Options for connecting to the hosted API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientOptions {
    /// API host without scheme, e.g. `api.cirrus.dev`
    #[serde(default = "default_api_root_url")]
    pub api_root_url: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Application key embedded in every request path
    pub api_key: String,

    #[serde(default = "default_use_ssl")]
    pub use_ssl: bool,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,

    /// Persisted session slot; derived from the API key when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_slot: Option<String>,
}

impl ClientOptions {
    /// Options with defaults for everything except the API key
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_root_url: default_api_root_url(),
            api_version: default_api_version(),
            api_key: api_key.into(),
            use_ssl: default_use_ssl(),
            request_timeout_secs: default_request_timeout_secs(),
            max_attempts: default_max_attempts(),
            session_slot: None,
        }
    }

    #[must_use]
    pub fn with_api_root_url(mut self, api_root_url: impl Into<String>) -> Self {
        self.api_root_url = api_root_url.into();
        self
    }

    #[must_use]
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    #[must_use]
    pub fn with_ssl(mut self, use_ssl: bool) -> Self {
        self.use_ssl = use_ssl;
        self
    }

    #[must_use]
    pub fn with_session_slot(mut self, slot: impl Into<String>) -> Self {
        self.session_slot = Some(slot.into());
        self
    }

    /// `{scheme}://{api_root_url}/{api_version}/{api_key}/`
    #[must_use]
    pub fn base_url(&self) -> String {
        let scheme = if self.use_ssl { "https" } else { "http" };
        format!(
            "{scheme}://{}/{}/{}/",
            self.api_root_url.trim_end_matches('/'),
            self.api_version.trim_matches('/'),
            self.api_key
        )
    }

    /// Slot name under which the session is persisted
    #[must_use]
    pub fn session_slot(&self) -> String {
        self.session_slot
            .clone()
            .unwrap_or_else(|| format!("{SESSION_SLOT_PREFIX}.{}", self.api_key))
    }

    /// Reject options that cannot produce a usable base URL
    ///
    /// # Errors
    ///
    /// Returns `CirrusError::Config` for an empty key, host or version, or
    /// a zero attempt count.
    pub fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(CirrusError::Config("api_key must not be empty".to_string()));
        }
        if self.api_root_url.trim().is_empty() {
            return Err(CirrusError::Config("api_root_url must not be empty".to_string()));
        }
        if self.api_version.trim().is_empty() {
            return Err(CirrusError::Config("api_version must not be empty".to_string()));
        }
        if self.max_attempts == 0 {
            return Err(CirrusError::Config("max_attempts must be at least 1".to_string()));
        }
        Ok(())
    }
}

fn default_api_root_url() -> String {
    DEFAULT_API_ROOT_URL.to_string()
}

fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}

const fn default_use_ssl() -> bool {
    true
}

const fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

const fn default_max_attempts() -> usize {
    DEFAULT_MAX_ATTEMPTS
}
