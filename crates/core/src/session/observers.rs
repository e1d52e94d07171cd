//! Local `session-changed` observers

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use cirrus_domain::Session;
use parking_lot::Mutex;

type Observer = Arc<dyn Fn(&Session) + Send + Sync>;

/// Registry of session observers, invoked in registration order
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: AtomicU64,
    observers: Mutex<Vec<(u64, Observer)>>,
}

impl ObserverRegistry {
    pub(crate) fn register(
        self: &Arc<Self>,
        observer: impl Fn(&Session) + Send + Sync + 'static,
    ) -> SessionSubscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.observers.lock().push((id, Arc::new(observer)));
        SessionSubscription { id, registry: Arc::downgrade(self) }
    }

    fn unregister(&self, id: u64) {
        self.observers.lock().retain(|(observer_id, _)| *observer_id != id);
    }

    /// Call every observer with `session`
    ///
    /// The list is snapshotted first so observers may subscribe,
    /// unsubscribe or trigger further transitions.
    pub(crate) fn notify(&self, session: &Session) {
        let snapshot: Vec<Observer> =
            self.observers.lock().iter().map(|(_, observer)| Arc::clone(observer)).collect();

        for observer in snapshot {
            observer(session);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.lock().len()
    }
}

/// Handle returned by `SessionManager::on_session_changed`
///
/// Dropping the handle keeps the observer registered; call
/// [`unsubscribe`](Self::unsubscribe) to remove it.
#[derive(Debug)]
pub struct SessionSubscription {
    id: u64,
    registry: Weak<ObserverRegistry>,
}

impl SessionSubscription {
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.unregister(self.id);
        }
    }
}

impl std::fmt::Debug for ObserverRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObserverRegistry").field("observers", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::AtomicUsize;

    use super::*;

    #[test]
    fn test_notify_in_registration_order() {
        let registry = Arc::new(ObserverRegistry::default());
        let calls = Arc::new(Mutex::new(Vec::new()));

        let first = Arc::clone(&calls);
        let _a = registry.register(move |_| first.lock().push("first"));
        let second = Arc::clone(&calls);
        let _b = registry.register(move |_| second.lock().push("second"));

        registry.notify(&Session::unauthenticated());

        assert_eq!(*calls.lock(), vec!["first", "second"]);
    }

    #[test]
    fn test_unsubscribe_removes_observer() {
        let registry = Arc::new(ObserverRegistry::default());
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let subscription = registry.register(move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        registry.notify(&Session::unauthenticated());
        subscription.unsubscribe();
        registry.notify(&Session::unauthenticated());

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn test_observer_may_register_during_notify() {
        let registry = Arc::new(ObserverRegistry::default());
        let inner = Arc::clone(&registry);
        let _sub = registry.register(move |_| {
            let _nested = inner.register(|_| {});
        });

        registry.notify(&Session::unauthenticated());
        assert_eq!(registry.len(), 2);
    }
}
