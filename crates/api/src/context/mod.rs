//! Client context - wires transport, storage and session together

use std::sync::Arc;

use cirrus_common::time::Clock;
use cirrus_core::{SessionManager, SessionStorage};
use cirrus_domain::{ClientOptions, CirrusError, Result, Session};
use cirrus_infra::api::catalog::{
    self, ARTICLES, COMMERCE_PRODUCTS, FILES, KEY_VALUES, NOTIFICATION_SUBSCRIPTIONS, ROLES, USERS,
    VALUE_SETS,
};
use cirrus_infra::{
    config, ApiClient, ApiError, HttpClient, HttpTransport, LoginClient, MemoryStorage, ResourceClient,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::info;

/// Entry point of the SDK
///
/// Cloning is cheap; clones share the session and transport.
#[derive(Debug, Clone)]
pub struct Cirrus {
    options: ClientOptions,
    session: SessionManager,
    api: ApiClient,
    login: LoginClient,
}

/// Builder for [`Cirrus`]
///
/// Defaults: reqwest transport configured from the options, in-memory
/// session storage, system clock, current tokio runtime.
///
/// With the default storage the session does not outlive the process; set
/// [`storage`](Self::storage) to a `FileStorage` or `KeychainStorage` for a
/// session that is restored on the next [`Cirrus::start`].
pub struct CirrusBuilder {
    options: ClientOptions,
    transport: Option<Arc<dyn HttpTransport>>,
    storage: Option<Arc<dyn SessionStorage>>,
    clock: Option<Arc<dyn Clock>>,
    slot: Option<String>,
    runtime: Option<Handle>,
}

impl CirrusBuilder {
    /// Replace the HTTP transport (tests, proxies, custom TLS)
    #[must_use]
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Where the session is persisted
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn SessionStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    #[must_use]
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Override the persisted slot name from the options
    #[must_use]
    pub fn slot(mut self, slot: impl Into<String>) -> Self {
        self.slot = Some(slot.into());
        self
    }

    /// Runtime used for expiry timers and storage listeners
    #[must_use]
    pub fn runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Assemble the client
    ///
    /// The persisted session is not loaded yet; call [`Cirrus::start`].
    ///
    /// # Errors
    ///
    /// `CirrusError::Config` for invalid options, `CirrusError::Network` if
    /// the HTTP client cannot be built, `CirrusError::Internal` when no tokio
    /// runtime is available.
    pub fn build(self) -> Result<Cirrus> {
        self.options.validate()?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(HttpClient::from_options(&self.options).map_err(ApiError::from)?),
        };
        let storage = self.storage.unwrap_or_else(|| Arc::new(MemoryStorage::new()));

        let slot = self.slot.unwrap_or_else(|| self.options.session_slot());
        let mut session = SessionManager::builder(storage).slot(slot);
        if let Some(clock) = self.clock {
            session = session.clock(clock);
        }
        if let Some(runtime) = self.runtime {
            session = session.runtime(runtime);
        }
        let session = session.build()?;

        let api = ApiClient::new(&self.options, transport, session.clone());
        let login = LoginClient::new(api.clone());

        info!(base_url = %api.base_url(), slot = %session.slot(), "Cirrus client created");
        Ok(Cirrus { options: self.options, session, api, login })
    }
}

impl Cirrus {
    #[must_use]
    pub fn builder(options: ClientOptions) -> CirrusBuilder {
        CirrusBuilder {
            options,
            transport: None,
            storage: None,
            clock: None,
            slot: None,
            runtime: None,
        }
    }

    /// Build from `CIRRUS_*` environment variables or a config file
    ///
    /// # Errors
    ///
    /// See [`config::load`] and [`CirrusBuilder::build`].
    pub fn from_env() -> Result<CirrusBuilder> {
        Ok(Self::builder(config::load()?))
    }

    /// Restore the persisted session and start following other contexts
    ///
    /// # Errors
    ///
    /// Storage read failures, or failure to clear an expired session.
    pub fn start(&self) -> Result<Session> {
        Ok(self.session.initialize()?)
    }

    #[must_use]
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    #[must_use]
    pub fn login(&self) -> &LoginClient {
        &self.login
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Client for any catalog entry by name
    ///
    /// # Errors
    ///
    /// `CirrusError::Config` for names missing from the catalog.
    pub fn resource<T: DeserializeOwned>(&self, name: &str) -> Result<ResourceClient<T>> {
        let def = catalog::lookup(name).map_err(CirrusError::from)?;
        Ok(ResourceClient::new(self.api.clone(), def))
    }

    /// Records of a dynamic schema (`resources/{schemaName}`)
    #[must_use]
    pub fn dynamic<T: DeserializeOwned>(&self, schema_name: &str) -> ResourceClient<T> {
        ResourceClient::new(self.api.clone(), &catalog::DYNAMIC_RESOURCES)
            .with_param("schemaName", schema_name)
    }

    #[must_use]
    pub fn articles(&self) -> ResourceClient<Value> {
        ResourceClient::new(self.api.clone(), &ARTICLES)
    }

    #[must_use]
    pub fn users(&self) -> ResourceClient<Value> {
        ResourceClient::new(self.api.clone(), &USERS)
    }

    #[must_use]
    pub fn roles(&self) -> ResourceClient<Value> {
        ResourceClient::new(self.api.clone(), &ROLES)
    }

    #[must_use]
    pub fn key_values(&self) -> ResourceClient<Value> {
        ResourceClient::new(self.api.clone(), &KEY_VALUES)
    }

    #[must_use]
    pub fn value_sets(&self) -> ResourceClient<Value> {
        ResourceClient::new(self.api.clone(), &VALUE_SETS)
    }

    #[must_use]
    pub fn files(&self) -> ResourceClient<Value> {
        ResourceClient::new(self.api.clone(), &FILES)
    }

    #[must_use]
    pub fn notification_subscriptions(&self) -> ResourceClient<Value> {
        ResourceClient::new(self.api.clone(), &NOTIFICATION_SUBSCRIPTIONS)
    }

    #[must_use]
    pub fn commerce_products(&self) -> ResourceClient<Value> {
        ResourceClient::new(self.api.clone(), &COMMERCE_PRODUCTS)
    }
}

impl std::fmt::Debug for CirrusBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CirrusBuilder")
            .field("options", &self.options)
            .field("custom_transport", &self.transport.is_some())
            .field("custom_storage", &self.storage.is_some())
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_build_rejects_invalid_options() {
        let result = Cirrus::builder(ClientOptions::new("")).build();
        assert!(matches!(result, Err(CirrusError::Config(_))));
    }

    #[test]
    fn test_build_outside_runtime_fails() {
        let result = Cirrus::builder(ClientOptions::new("app")).build();
        assert!(matches!(result, Err(CirrusError::Internal(_))));
    }

    #[test]
    fn test_build_with_explicit_runtime() {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
        let cirrus =
            Cirrus::builder(ClientOptions::new("app")).runtime(runtime.handle().clone()).build().unwrap();

        assert_eq!(cirrus.session().slot(), "cirrus.session.app");
        assert_eq!(cirrus.api().base_url(), "https://api.cirrus.dev/v1/app/");
    }

    #[tokio::test]
    async fn test_shortcuts_resolve_catalog_routes() {
        let cirrus = Cirrus::builder(ClientOptions::new("app")).build().unwrap();

        assert_eq!(cirrus.roles().route().base_path, "lookups/roles");
        assert_eq!(cirrus.commerce_products().route().base_path, "commerce/products");
        assert_eq!(cirrus.dynamic::<Value>("cars").route().name, "dynamic-resources");
        assert!(matches!(cirrus.resource::<Value>("widgets"), Err(CirrusError::Config(_))));
    }

    #[tokio::test]
    async fn test_default_storage_is_not_shared_between_clients() {
        let first = Cirrus::builder(ClientOptions::new("app")).build().unwrap();
        first.start().unwrap();
        let token = cirrus_domain::AuthToken::from_expires_in(
            "t0k3n",
            "bearer",
            3600,
            first.session().clock().now(),
        );
        first.session().set_user(Some(serde_json::json!({"id": "u1"})), Some(token)).unwrap();

        let second = Cirrus::builder(ClientOptions::new("app")).build().unwrap();

        assert!(second.start().unwrap().is_empty());
        assert!(first.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_slot_override() {
        let cirrus = Cirrus::builder(ClientOptions::new("app").with_session_slot("from.options"))
            .slot("from.builder")
            .build()
            .unwrap();

        assert_eq!(cirrus.session().slot(), "from.builder");
    }
}
