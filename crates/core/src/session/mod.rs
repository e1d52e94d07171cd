//! Session/token management
//!
//! [`SessionManager`] holds the one authoritative [`Session`] of an execution
//! context, mirrors it into a persisted slot, expires it on schedule and
//! reconciles with changes made by other contexts sharing the same storage.
//!
//! [`Session`]: cirrus_domain::Session

pub mod error;
pub mod manager;
pub mod observers;
pub mod ports;
mod timer;

pub use error::SessionError;
pub use manager::{SessionManager, SessionManagerBuilder};
pub use observers::SessionSubscription;
pub use ports::{ContextId, SessionStorage, StorageEvent, StorageEvents};
