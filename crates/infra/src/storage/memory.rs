//! In-process storage shared between execution contexts

use std::collections::HashMap;
use std::sync::Arc;

use cirrus_core::{ContextId, SessionError, SessionStorage, StorageEvent, StorageEvents};
use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::trace;

const EVENT_CAPACITY: usize = 64;

/// Shared key-value map with a change feed
///
/// Each value returned by [`new_context`](Self::new_context) plays the role
/// of another browser tab: it sees the same data and receives change events
/// for writes made by the others, never for its own.
#[derive(Clone)]
pub struct MemoryStorage {
    shared: Arc<Shared>,
    context: ContextId,
}

struct Shared {
    values: Mutex<HashMap<String, String>>,
    events: broadcast::Sender<StorageEvent>,
}

impl MemoryStorage {
    /// New, empty backend with a single context
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            shared: Arc::new(Shared { values: Mutex::new(HashMap::new()), events }),
            context: ContextId::next(),
        }
    }

    /// Another context over the same backend
    #[must_use]
    pub fn new_context(&self) -> Self {
        Self { shared: Arc::clone(&self.shared), context: ContextId::next() }
    }

    #[must_use]
    pub fn context_id(&self) -> ContextId {
        self.context
    }

    fn publish(&self, key: &str, old_value: Option<String>, new_value: Option<String>) {
        let event = StorageEvent { key: key.to_string(), old_value, new_value, origin: self.context };
        // No subscribers is fine
        let receivers = self.shared.events.send(event).unwrap_or(0);
        trace!(key, receivers, "published storage event");
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage").field("context", &self.context).finish_non_exhaustive()
    }
}

impl SessionStorage for MemoryStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        Ok(self.shared.values.lock().get(key).cloned())
    }

    // Events are sent under the values lock so their order matches the
    // order in which writes landed.
    fn write(&self, key: &str, value: &str) -> Result<(), SessionError> {
        let mut values = self.shared.values.lock();
        let old_value = values.insert(key.to_string(), value.to_string());
        self.publish(key, old_value, Some(value.to_string()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        let mut values = self.shared.values.lock();
        if let Some(old_value) = values.remove(key) {
            self.publish(key, Some(old_value), None);
        }
        Ok(())
    }

    fn subscribe(&self) -> Option<StorageEvents> {
        Some(StorageEvents::new(self.shared.events.subscribe(), self.context))
    }
}
