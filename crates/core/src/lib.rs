//! # Cirrus Core
//!
//! Session lifecycle logic - no network or filesystem access.
//!
//! This crate contains:
//! - The session/token manager and its state machine
//! - The storage port the manager persists through
//! - The expiry timer and the local observer registry
//!
//! ## Architecture Principles
//! - Only depends on `cirrus-common` and `cirrus-domain`
//! - Persistence and change events arrive through [`SessionStorage`]
//! - Time comes from an injected [`cirrus_common::Clock`]

pub mod session;

pub use session::{
    ContextId, SessionError, SessionManager, SessionManagerBuilder, SessionStorage,
    SessionSubscription, StorageEvent, StorageEvents,
};
