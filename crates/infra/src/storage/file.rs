//! Session persistence in a directory of JSON files

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use cirrus_core::{SessionError, SessionStorage};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::errors::IntoSessionError;

/// One file per slot inside `dir`, replaced atomically on write
///
/// Has no change feed: other processes sharing the directory are not
/// observed until the next [`initialize`](cirrus_core::SessionManager::initialize).
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir`, creating it if needed
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the directory cannot be created.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, SessionError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(IntoSessionError::into_session_error)?;
        Ok(Self { dir })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File backing `key`; characters outside `[A-Za-z0-9._-]` become `_`
    #[must_use]
    pub fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl SessionStorage for FileStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into_session_error()),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let path = self.path_for(key);
        let mut file = NamedTempFile::new_in(&self.dir).map_err(IntoSessionError::into_session_error)?;
        file.write_all(value.as_bytes()).map_err(IntoSessionError::into_session_error)?;
        file.as_file().sync_all().map_err(IntoSessionError::into_session_error)?;
        file.persist(&path).map_err(|e| e.error.into_session_error())?;
        debug!(path = %path.display(), "session file written");
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let path = self.path_for(key);
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "session file removed");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into_session_error()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_write_read_remove() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        assert_eq!(storage.read("cirrus.session").unwrap(), None);

        storage.write("cirrus.session", "{\"user\":null}").unwrap();
        assert_eq!(storage.read("cirrus.session").unwrap().as_deref(), Some("{\"user\":null}"));

        storage.write("cirrus.session", "{}").unwrap();
        assert_eq!(storage.read("cirrus.session").unwrap().as_deref(), Some("{}"));

        storage.remove("cirrus.session").unwrap();
        assert_eq!(storage.read("cirrus.session").unwrap(), None);
        storage.remove("cirrus.session").unwrap();
    }

    #[test]
    fn test_path_sanitizes_key() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();

        let path = storage.path_for("../cirrus session/key");
        assert_eq!(path, dir.path().join(".._cirrus_session_key.json"));
    }

    #[test]
    fn test_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a/b");

        let storage = FileStorage::new(&nested).unwrap();

        assert!(storage.dir().is_dir());
    }

    #[test]
    fn test_no_change_feed() {
        let dir = TempDir::new().unwrap();
        let storage = FileStorage::new(dir.path()).unwrap();
        assert!(storage.subscribe().is_none());
    }
}
