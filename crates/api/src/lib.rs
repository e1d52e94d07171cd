//! # Cirrus SDK
//!
//! Client for the Cirrus hosted backend: login, a persisted session that
//! expires on its own and follows other contexts sharing the same storage,
//! and typed access to every REST resource family.
//!
//! The session lives in memory unless a persistent storage is supplied.
//! Pass a [`FileStorage`] or [`KeychainStorage`] so that a new process
//! picks up the session left by the previous one:
//!
//! ```no_run
//! # async fn run() -> cirrus::Result<()> {
//! use std::sync::Arc;
//!
//! use cirrus::{Cirrus, ClientOptions, FileStorage, FindOptions, LoginRequest};
//!
//! let storage = Arc::new(FileStorage::new("/var/lib/my-app/session")?);
//! let cirrus = Cirrus::builder(ClientOptions::new("my-app-key")).storage(storage).build()?;
//! cirrus.start()?;
//!
//! cirrus.login().login(&LoginRequest::new("ada", "secret")).await?;
//! let page = cirrus.articles().find(&FindOptions::new().page(1, 10)).await?;
//! # let _ = page;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//! - `cirrus-domain`: options, tokens, session values
//! - `cirrus-core`: the session manager and its storage port
//! - `cirrus-infra`: HTTP, storage adapters, API clients
//! - this crate: wiring ([`Cirrus`])

pub mod context;

pub use cirrus_common::observability::{init_tracing, LogFormat, TracingInitError};
pub use cirrus_common::time::{Clock, SystemClock};
pub use cirrus_core::{
    SessionError, SessionManager, SessionStorage, SessionSubscription, StorageEvent, StorageEvents,
};
pub use cirrus_domain::{
    AuthToken, CirrusError, ClientOptions, GrantType, OrderDirection, Result, Session,
};
pub use cirrus_infra::{
    ApiClient, ApiError, CollectionPage, FileStorage, FindOptions, GetOptions, HttpClient,
    HttpTransport, KeychainStorage, LoginClient, LoginRequest, MemoryStorage, Params, ResourceClient,
    SocialLoginRequest,
};
pub use context::{Cirrus, CirrusBuilder};
