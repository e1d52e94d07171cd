//! Shared test helpers for `cirrus-core` integration tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use cirrus_common::testing::MockClock;
use cirrus_core::{ContextId, SessionError, SessionManager, SessionStorage, StorageEvent, StorageEvents};
use cirrus_domain::Session;
use parking_lot::Mutex;
use tokio::sync::broadcast;

pub const SLOT: &str = "cirrus.session.test";

/// Storage operation observed by [`RecordingStorage`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Write(String),
    Remove,
}

/// In-memory storage that records every mutation and can inject events as
/// if another context had written to it.
pub struct RecordingStorage {
    values: Mutex<HashMap<String, String>>,
    ops: Mutex<Vec<Op>>,
    failing_reads: AtomicBool,
    events: broadcast::Sender<StorageEvent>,
    local: ContextId,
    remote: ContextId,
}

impl RecordingStorage {
    pub fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            values: Mutex::new(HashMap::new()),
            ops: Mutex::new(Vec::new()),
            failing_reads: AtomicBool::new(false),
            events,
            local: ContextId::next(),
            remote: ContextId::next(),
        })
    }

    /// Seed the slot without recording an operation.
    pub fn seed(&self, value: &str) {
        self.values.lock().insert(SLOT.to_string(), value.to_string());
    }

    pub fn raw(&self) -> Option<String> {
        self.values.lock().get(SLOT).cloned()
    }

    pub fn ops(&self) -> Vec<Op> {
        self.ops.lock().clone()
    }

    /// Make every subsequent read fail with a storage error.
    pub fn fail_reads(&self) {
        self.failing_reads.store(true, Ordering::SeqCst);
    }

    pub fn clear_ops(&self) {
        self.ops.lock().clear();
    }

    /// Simulate another context changing the slot.
    pub fn remote_change(&self, new_value: Option<&str>) {
        let old_value = match new_value {
            Some(value) => self.values.lock().insert(SLOT.to_string(), value.to_string()),
            None => self.values.lock().remove(SLOT),
        };
        let _ = self.events.send(StorageEvent {
            key: SLOT.to_string(),
            old_value,
            new_value: new_value.map(str::to_string),
            origin: self.remote,
        });
    }
}

impl SessionStorage for RecordingStorage {
    fn read(&self, key: &str) -> Result<Option<String>, SessionError> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(SessionError::Storage("disk unavailable".into()));
        }
        Ok(self.values.lock().get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), SessionError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        self.ops.lock().push(Op::Write(value.to_string()));
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), SessionError> {
        self.values.lock().remove(key);
        self.ops.lock().push(Op::Remove);
        Ok(())
    }

    fn subscribe(&self) -> Option<StorageEvents> {
        Some(StorageEvents::new(self.events.subscribe(), self.local))
    }
}

pub fn build_manager(storage: &Arc<RecordingStorage>, clock: &MockClock) -> SessionManager {
    SessionManager::builder(Arc::clone(storage) as Arc<dyn SessionStorage>)
        .clock(Arc::new(clock.clone()))
        .slot(SLOT)
        .build()
        .expect("runtime available")
}

/// Collects every session delivered to an observer.
pub fn record_notifications(manager: &SessionManager) -> Arc<Mutex<Vec<Session>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _subscription = manager.on_session_changed(move |session| sink.lock().push(session.clone()));
    seen
}

/// Advance both tokio's paused clock and the mock wall clock.
pub async fn advance(clock: &MockClock, millis: u64) {
    clock.advance_millis(millis);
    tokio::time::sleep(Duration::from_millis(millis)).await;
}

/// Let spawned tasks drain pending events.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
