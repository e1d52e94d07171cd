//! Session/token manager
//!
//! Owns the authoritative [`Session`] of one execution context:
//! - Persists every transition into a storage slot
//! - Expires the session when its token runs out (one-shot timer)
//! - Adopts changes other contexts make to the same slot
//! - Notifies local observers after each committed transition
//!
//! State machine:
//!
//! ```text
//! Unauthenticated --set_user(user, token)----------> Authenticated
//! Authenticated   --set_user(None, _) / expiry-----> Unauthenticated
//! Authenticated   --update_access_token(token)-----> Authenticated (timer re-armed)
//! any             --remote write of a session------> Authenticated
//! any             --remote removal-----------------> Unauthenticated
//! ```

use std::sync::{Arc, Weak};

use cirrus_common::{Clock, SystemClock};
use cirrus_domain::constants::{EVENT_SESSION_CHANGED, SESSION_SLOT_PREFIX};
use cirrus_domain::{AuthToken, Session};
use parking_lot::Mutex;
use serde_json::Value;
use tokio::runtime::Handle;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use super::error::SessionError;
use super::observers::{ObserverRegistry, SessionSubscription};
use super::ports::{SessionStorage, StorageEvents};
use super::timer::ExpiryTimer;

/// Handle to the session of one execution context
///
/// Cloning is cheap; clones share the same state, timer and observers.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

struct Inner {
    storage: Arc<dyn SessionStorage>,
    clock: Arc<dyn Clock>,
    slot: String,
    runtime: Handle,
    /// Serializes transitions so the persisted slot and memory never diverge
    transitions: Mutex<()>,
    state: Mutex<State>,
    observers: Arc<ObserverRegistry>,
    listener: Mutex<Option<JoinHandle<()>>>,
}

#[derive(Default)]
struct State {
    session: Session,
    timer: ExpiryTimer,
}

/// How a transition treats the persisted slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persistence {
    /// Local change: write or remove the slot
    Write,
    /// Change adopted from another context: the slot already reflects it
    Skip,
}

/// Builder for [`SessionManager`]
pub struct SessionManagerBuilder {
    storage: Arc<dyn SessionStorage>,
    clock: Option<Arc<dyn Clock>>,
    slot: Option<String>,
    runtime: Option<Handle>,
}

impl SessionManagerBuilder {
    /// Time source for expiry decisions (default: [`SystemClock`])
    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Persisted slot name (default: `cirrus.session`)
    #[must_use]
    pub fn slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Runtime that runs the expiry timer and the change listener
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the manager in the `Unauthenticated` state
    ///
    /// Call [`SessionManager::initialize`] to load the persisted session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NoRuntime` when no runtime handle was given and
    /// the caller is not inside a tokio runtime.
    pub fn build(self) -> Result<SessionManager, SessionError> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|_| SessionError::NoRuntime)?,
        };

        Ok(SessionManager {
            inner: Arc::new(Inner {
                storage: self.storage,
                clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
                slot: self.slot.unwrap_or_else(|| SESSION_SLOT_PREFIX.to_string()),
                runtime,
                transitions: Mutex::new(()),
                state: Mutex::new(State::default()),
                observers: Arc::new(ObserverRegistry::default()),
                listener: Mutex::new(None),
            }),
        })
    }
}

impl SessionManager {
    /// Start building a manager over `storage`
    #[must_use]
    pub fn builder(storage: Arc<dyn SessionStorage>) -> SessionManagerBuilder {
        SessionManagerBuilder { storage, clock: None, slot: None, runtime: None }
    }

    /// Load the persisted session and start following remote changes
    ///
    /// - Absent or malformed slot: stays `Unauthenticated` (malformed data is
    ///   logged and left in place)
    /// - Expired token: cleared as if by `set_user(None, None)`
    /// - Valid session: adopted and the expiry timer armed
    ///
    /// # Errors
    ///
    /// Storage read failures propagate unchanged, as do failures to remove an
    /// expired session.
    pub fn initialize(&self) -> Result<Session, SessionError> {
        let raw = self.inner.storage.read(&self.inner.slot)?;
        let persisted = raw.as_deref().and_then(|raw| self.inner.parse(raw));

        let session = match persisted {
            Some(Session { user: Some(user), token: Some(token) }) => {
                if token.is_expired_at(self.inner.clock.now()) {
                    info!(slot = %self.inner.slot, "Persisted session expired, clearing");
                    self.inner.transition(None, None, Persistence::Write)?
                } else {
                    let _guard = self.inner.transitions.lock();
                    let session = Session::new(Some(user), Some(token));
                    self.inner.commit(session.clone());
                    info!(slot = %self.inner.slot, "Session restored from storage");
                    session
                }
            }
            Some(Session { token: Some(_), user: None }) => {
                debug!(slot = %self.inner.slot, "Persisted token has no user, ignoring");
                Session::unauthenticated()
            }
            _ => {
                debug!(slot = %self.inner.slot, "No persisted session");
                Session::unauthenticated()
            }
        };

        self.inner.start_listener();
        Ok(session)
    }

    /// Current session snapshot
    #[must_use]
    pub fn get_user(&self) -> Session {
        self.inner.state.lock().session.clone()
    }

    #[must_use]
    pub fn get_access_token(&self) -> Option<AuthToken> {
        self.inner.state.lock().session.token.clone()
    }

    /// `true` while a token is held and unexpired per the injected clock
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        let now = self.inner.clock.now();
        self.inner.state.lock().session.is_authenticated_at(now)
    }

    /// The single state transition entry point
    ///
    /// A missing (or JSON `null`) user or a missing token logs out: the timer is cancelled and the slot
    /// removed. Otherwise the session is persisted and an expiry timer armed
    /// for the token's remaining lifetime; a token that is already expired
    /// logs out instead. Each call notifies observers exactly once.
    ///
    /// # Errors
    ///
    /// Storage failures propagate; memory and timer are left as they were.
    pub fn set_user(
        &self,
        user: Option<Value>,
        token: Option<AuthToken>,
    ) -> Result<Session, SessionError> {
        self.inner.transition(user, token, Persistence::Write)
    }

    /// Rotate the token while keeping the current user
    ///
    /// Without a current user this degrades to a logout.
    ///
    /// # Errors
    ///
    /// See [`set_user`](Self::set_user).
    pub fn update_access_token(&self, token: AuthToken) -> Result<Session, SessionError> {
        let user = self.inner.state.lock().session.user.clone();
        self.set_user(user, Some(token))
    }

    /// Equivalent to `set_user(None, None)`
    ///
    /// # Errors
    ///
    /// See [`set_user`](Self::set_user).
    pub fn logout(&self) -> Result<Session, SessionError> {
        self.set_user(None, None)
    }

    /// Register a `session-changed` observer
    ///
    /// Observers run synchronously after each committed transition, outside
    /// the manager's locks.
    pub fn on_session_changed(
        &self,
        observer: impl Fn(&Session) + Send + Sync + 'static,
    ) -> SessionSubscription {
        self.inner.observers.register(observer)
    }

    /// `true` while an expiry callback is scheduled
    #[must_use]
    pub fn has_pending_expiry(&self) -> bool {
        self.inner.state.lock().timer.is_pending()
    }

    /// Name of the persisted slot
    #[must_use]
    pub fn slot(&self) -> &str {
        &self.inner.slot
    }

    /// Clock used for expiry decisions
    #[must_use]
    pub fn clock(&self) -> Arc<dyn Clock> {
        Arc::clone(&self.inner.clock)
    }

    /// Stop the expiry timer and the remote change listener
    ///
    /// The in-memory session is kept.
    pub fn shutdown(&self) {
        self.inner.state.lock().timer.cancel();
        if let Some(listener) = self.inner.listener.lock().take() {
            listener.abort();
        }
        debug!(slot = %self.inner.slot, "Session manager shut down");
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("slot", &self.inner.slot)
            .field("authenticated", &self.is_authenticated())
            .finish_non_exhaustive()
    }
}

impl Inner {
    fn parse(&self, raw: &str) -> Option<Session> {
        if raw.trim().is_empty() {
            return None;
        }
        match Session::from_persisted(raw) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(slot = %self.slot, error = %e, "Malformed persisted session, treating as absent");
                None
            }
        }
    }

    /// Apply a transition, then notify observers
    fn transition(
        self: &Arc<Self>,
        user: Option<Value>,
        token: Option<AuthToken>,
        persistence: Persistence,
    ) -> Result<Session, SessionError> {
        let session = {
            let _guard = self.transitions.lock();
            self.apply(user, token, persistence)?
        };
        self.notify(&session);
        Ok(session)
    }

    /// Persist (when asked) and commit; caller holds `transitions`
    fn apply(
        self: &Arc<Self>,
        user: Option<Value>,
        token: Option<AuthToken>,
        persistence: Persistence,
    ) -> Result<Session, SessionError> {
        let next = match (user, token) {
            // A JSON null user persists as an absent one
            (Some(user), Some(token)) if !user.is_null() => {
                if token.is_expired_at(self.clock.now()) {
                    info!(slot = %self.slot, "Token expired on arrival, logging out");
                    Session::unauthenticated()
                } else {
                    Session::new(Some(user), Some(token))
                }
            }
            _ => Session::unauthenticated(),
        };

        if persistence == Persistence::Write {
            if next.token.is_some() {
                let raw = next.to_persisted()?;
                self.storage.write(&self.slot, &raw)?;
                debug!(slot = %self.slot, "Session persisted");
            } else {
                self.storage.remove(&self.slot)?;
                debug!(slot = %self.slot, "Session slot removed");
            }
        }

        self.commit(next.clone());
        Ok(next)
    }

    /// Cancel the old timer, store `session`, arm a new timer if needed
    fn commit(self: &Arc<Self>, session: Session) {
        let mut state = self.state.lock();
        state.timer.cancel();

        let remaining =
            session.token.as_ref().and_then(|token| token.remaining_at(self.clock.now()));
        if let Some(delay) = remaining {
            let weak = Arc::downgrade(self);
            state.timer.arm(&self.runtime, delay, move |generation| expire(&weak, generation));
            debug!(slot = %self.slot, delay_ms = delay.as_millis(), "Expiry timer armed");
        }

        if session.token.is_some() {
            info!(slot = %self.slot, "Session authenticated");
        } else {
            info!(slot = %self.slot, "Session cleared");
        }
        state.session = session;
    }

    fn notify(&self, session: &Session) {
        debug!(event = EVENT_SESSION_CHANGED, authenticated = session.token.is_some(), "Notifying observers");
        self.observers.notify(session);
    }

    /// Timer callback: log out if the callback is still current
    ///
    /// The slot is only removed while it still holds the expiring token.
    /// When another context has already replaced it, that session is
    /// adopted instead.
    fn on_expired(self: &Arc<Self>, generation: u64) {
        let session = {
            let _guard = self.transitions.lock();
            let expiring = {
                let mut state = self.state.lock();
                if !state.timer.claim(generation) {
                    debug!(slot = %self.slot, "Ignoring stale expiry callback");
                    return;
                }
                state.session.token.clone()
            };

            let stored = match self.storage.read(&self.slot) {
                Ok(raw) => raw.as_deref().and_then(|raw| self.parse(raw)),
                Err(e) => {
                    warn!(slot = %self.slot, error = %e, "Failed to read slot before expiry");
                    None
                }
            };

            match stored {
                Some(replacement) if replacement.token.is_some() && replacement.token != expiring => {
                    info!(slot = %self.slot, "Token expired locally, adopting newer stored session");
                    match self.apply(replacement.user, replacement.token, Persistence::Skip) {
                        Ok(session) => session,
                        Err(e) => {
                            error!(slot = %self.slot, error = %e, "Failed to adopt stored session");
                            return;
                        }
                    }
                }
                _ => {
                    info!(slot = %self.slot, "Session token expired");
                    if let Err(e) = self.storage.remove(&self.slot) {
                        error!(slot = %self.slot, error = %e, "Failed to remove expired session");
                    }
                    let session = Session::unauthenticated();
                    self.commit(session.clone());
                    session
                }
            }
        };
        self.notify(&session);
    }

    /// Adopt a value another context wrote to the slot
    ///
    /// Nothing is written back. An adopted token gets a local expiry timer;
    /// one that is already expired reconciles to `Unauthenticated`.
    fn reconcile(self: &Arc<Self>, new_value: Option<&str>) {
        let adopted = new_value.and_then(|raw| self.parse(raw)).unwrap_or_default();
        debug!(slot = %self.slot, present = adopted.token.is_some(), "Reconciling with remote change");

        let session = {
            let _guard = self.transitions.lock();
            match self.apply(adopted.user, adopted.token, Persistence::Skip) {
                Ok(session) => session,
                Err(e) => {
                    error!(slot = %self.slot, error = %e, "Failed to reconcile remote session");
                    return;
                }
            }
        };
        self.notify(&session);
    }

    /// Re-read the slot after missing change events
    fn resync(self: &Arc<Self>) {
        match self.storage.read(&self.slot) {
            Ok(raw) => self.reconcile(raw.as_deref()),
            Err(e) => error!(slot = %self.slot, error = %e, "Failed to re-read session slot"),
        }
    }

    fn start_listener(self: &Arc<Self>) {
        let Some(events) = self.storage.subscribe() else {
            debug!(slot = %self.slot, "Storage has no change feed");
            return;
        };

        let task = self.runtime.spawn(listen(Arc::downgrade(self), events));
        if let Some(previous) = self.listener.lock().replace(task) {
            previous.abort();
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        if let Some(listener) = self.listener.get_mut().take() {
            listener.abort();
        }
    }
}

fn expire(inner: &Weak<Inner>, generation: u64) {
    if let Some(inner) = inner.upgrade() {
        inner.on_expired(generation);
    }
}

async fn listen(inner: Weak<Inner>, mut events: StorageEvents) {
    loop {
        match events.recv().await {
            Ok(event) => {
                let Some(inner) = inner.upgrade() else { break };
                if event.key == inner.slot {
                    inner.reconcile(event.new_value.as_deref());
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                let Some(inner) = inner.upgrade() else { break };
                warn!(slot = %inner.slot, skipped, "Missed storage events, re-reading slot");
                inner.resync();
            }
            Err(RecvError::Closed) => break,
        }
    }
}
