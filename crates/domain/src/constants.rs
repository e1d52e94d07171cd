//! SDK-wide constants

/// Default API host (without scheme)
pub const DEFAULT_API_ROOT_URL: &str = "api.cirrus.dev";

/// Default API version path segment
pub const DEFAULT_API_VERSION: &str = "v1";

/// Prefix of the persisted session slot; the API key is appended
pub const SESSION_SLOT_PREFIX: &str = "cirrus.session";

/// Default request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default number of HTTP attempts (1 = no retries)
pub const DEFAULT_MAX_ATTEMPTS: usize = 1;

/// Name of the local session change notification
pub const EVENT_SESSION_CHANGED: &str = "session-changed";
