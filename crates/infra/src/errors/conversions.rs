//! Conversions from external infrastructure errors into SDK errors.

use cirrus_core::SessionError;
use keyring::Error as KeyringError;
use reqwest::Error as HttpError;

use crate::http::TransportError;

/// Extension trait for errors the storage adapters surface as
/// [`SessionError::Storage`]. `SessionError` lives in `cirrus-core`, so a
/// plain `From` impl is not possible here.
pub(crate) trait IntoSessionError {
    fn into_session_error(self) -> SessionError;
}

/* -------------------------------------------------------------------------- */
/* keyring::Error → SessionError */
/* -------------------------------------------------------------------------- */

impl IntoSessionError for KeyringError {
    fn into_session_error(self) -> SessionError {
        use KeyringError::{Ambiguous, BadEncoding, Invalid, NoEntry, NoStorageAccess, PlatformFailure, TooLong};

        let description = self.to_string();

        let message = match self {
            NoEntry => "keychain entry not found".to_string(),
            BadEncoding(_) => "credential in keychain is not valid UTF-8".to_string(),
            TooLong(name, limit) => {
                format!("keychain attribute '{name}' exceeds platform limit ({limit})")
            }
            Invalid(attr, reason) => format!("keychain attribute '{attr}' is invalid: {reason}"),
            Ambiguous(entries) => {
                format!("multiple keychain entries matched request ({} results)", entries.len())
            }
            PlatformFailure(err) => format!("keychain platform error: {err}"),
            NoStorageAccess(err) => format!("unable to access secure storage: {err}"),
            _ => description,
        };

        SessionError::Storage(message)
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → SessionError */
/* -------------------------------------------------------------------------- */

impl IntoSessionError for std::io::Error {
    fn into_session_error(self) -> SessionError {
        SessionError::Storage(format!("session file I/O failed ({:?}): {self}", self.kind()))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportError */
/* -------------------------------------------------------------------------- */

impl From<HttpError> for TransportError {
    fn from(err: HttpError) -> Self {
        #[cfg(not(target_arch = "wasm32"))]
        if err.is_connect() {
            return Self::Network("HTTP connection failure".into());
        }

        if err.is_builder() {
            return Self::InvalidRequest(err.to_string());
        }

        Self::Network(err.to_string())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
