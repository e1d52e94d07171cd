//! Session persistence in the platform keychain

use cirrus_core::{SessionError, SessionStorage};
use keyring::Entry;
use tracing::debug;

use crate::errors::IntoSessionError;

/// Stores each slot as a keychain secret (`service` + slot as account)
///
/// Backed by the macOS keychain, the Windows credential manager or the
/// Linux kernel keyring. On Linux, keyutils entries live for the login
/// session rather than across reboots.
#[derive(Debug, Clone)]
pub struct KeychainStorage {
    service: String,
}

impl KeychainStorage {
    pub fn new(service: impl Into<String>) -> Self {
        Self { service: service.into() }
    }

    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    fn entry(&self, key: &str) -> Result<Entry, SessionError> {
        Entry::new(&self.service, key).map_err(IntoSessionError::into_session_error)
    }
}

impl SessionStorage for KeychainStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        match self.entry(key)?.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into_session_error()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.entry(key)?.set_password(value).map_err(IntoSessionError::into_session_error)?;
        debug!(service = %self.service, key, "session stored in keychain");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        match self.entry(key)?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into_session_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mock_keychain() -> KeychainStorage {
        keyring::set_default_credential_builder(keyring::mock::default_credential_builder());
        KeychainStorage::new("cirrus-test")
    }

    #[test]
    fn test_missing_entry_reads_as_absent() {
        let storage = mock_keychain();
        assert_eq!(storage.read("cirrus.session").unwrap(), None);
    }

    #[test]
    fn test_remove_missing_entry_is_ok() {
        let storage = mock_keychain();
        assert!(storage.remove("cirrus.session").is_ok());
        assert_eq!(storage.service(), "cirrus-test");
    }
}
