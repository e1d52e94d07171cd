//! Storage port for the persisted session slot
//!
//! Adapters live in `cirrus-infra`; the manager only sees this trait.

use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;

use super::error::SessionError;

/// Identity of one execution context sharing a storage backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    /// Allocate an identifier unique within this process
    #[must_use]
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    #[must_use]
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// A change to one key, as observed by other contexts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    /// Context that performed the write
    pub origin: ContextId,
}

/// Change feed of a storage backend, seen from one context
///
/// Events produced by `local` are skipped, so a context never reacts to its
/// own writes.
#[derive(Debug)]
pub struct StorageEvents {
    receiver: broadcast::Receiver<StorageEvent>,
    local: ContextId,
}

impl StorageEvents {
    #[must_use]
    pub fn new(receiver: broadcast::Receiver<StorageEvent>, local: ContextId) -> Self {
        Self { receiver, local }
    }

    /// Wait for the next event written by another context
    ///
    /// # Errors
    ///
    /// `RecvError::Lagged` when events were dropped; `RecvError::Closed`
    /// once the backend is gone.
    pub async fn recv(&mut self) -> Result<StorageEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if event.origin != self.local {
                return Ok(event);
            }
        }
    }
}

/// Key-value store holding the serialized session
///
/// Calls are synchronous; implementations backed by slow media should keep
/// values small (one session per slot).
pub trait SessionStorage: Send + Sync {
    /// Read the raw value under `key`
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the backend is unavailable.
    fn read(&self, key: &str) -> Result<Option<String>, SessionError>;

    /// Replace the value under `key`
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the write fails.
    fn write(&self, key: &str, value: &str) -> Result<(), SessionError>;

    /// Delete `key`; removing a missing key is not an error
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Storage` when the removal fails.
    fn remove(&self, key: &str) -> Result<(), SessionError>;

    /// Change feed for writes made by other contexts, if the backend has one
    fn subscribe(&self) -> Option<StorageEvents> {
        None
    }
}
