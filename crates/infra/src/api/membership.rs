//! Login endpoints
//!
//! [`LoginClient`] exchanges credentials for a token, loads the user the
//! token belongs to, and hands both to the [`SessionManager`].

use cirrus_common::Clock;
use cirrus_core::SessionManager;
use cirrus_domain::{AuthToken, GrantType, Session, TokenResponse};
use reqwest::Method;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use super::client::{ApiClient, Credential};
use super::errors::ApiError;
use super::uri::{GetOptions, Params, RouteTemplate};
use crate::http::RequestBody;

const LOGIN_TEMPLATE: &str = "login/{?embed,fields}";
const SOCIAL_LOGIN_TEMPLATE: &str = "login/social/{provider}/{?embed,fields}";
const LOGOUT_ROUTE: &str = "login";

/// Username/password credentials
#[derive(Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    /// Projection applied to the user loaded after login
    pub options: GetOptions,
}

impl LoginRequest {
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into(), options: GetOptions::default() }
    }

    /// Embed/field projection for the user returned after login
    #[must_use]
    pub fn with_options(mut self, options: GetOptions) -> Self {
        self.options = options;
        self
    }
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("options", &self.options)
            .finish()
    }
}

/// Payload returned by a social provider's redirect
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialLoginRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oauth_verifier: Option<String>,
    pub redirect_uri: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub activation_url: Option<String>,
    #[serde(skip)]
    pub options: GetOptions,
}

/// Login, logout and user reload against the hosted API
#[derive(Debug, Clone)]
pub struct LoginClient {
    api: ApiClient,
}

impl LoginClient {
    #[must_use]
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn session(&self) -> &SessionManager {
        self.api.session()
    }

    /// Password login
    ///
    /// # Errors
    ///
    /// `ApiError::Auth` for rejected credentials, any other [`ApiError`] from
    /// the token or user request, or `ApiError::Session` if the session
    /// cannot be persisted.
    pub async fn login(&self, request: &LoginRequest) -> Result<Session, ApiError> {
        let route = RouteTemplate::new(LOGIN_TEMPLATE).expand(&request.options.to_params());
        let form = vec![
            ("grant_type".to_string(), GrantType::Password.to_string()),
            ("username".to_string(), request.username.clone()),
            ("password".to_string(), request.password.clone()),
        ];

        let response: TokenResponse = self
            .api
            .execute(Method::POST, &route, Some(RequestBody::Form(form)), Credential::Anonymous)
            .await?;

        self.complete_login(response, &request.options).await
    }

    /// Login through a social provider (`facebook`, `google`, ...)
    ///
    /// # Errors
    ///
    /// See [`login`](Self::login).
    pub async fn social_login(
        &self,
        provider: &str,
        request: &SocialLoginRequest,
    ) -> Result<Session, ApiError> {
        let route = RouteTemplate::new(SOCIAL_LOGIN_TEMPLATE)
            .expand(&social_login_params(provider, &request.options));
        let body = serde_json::to_value(request)
            .map_err(|e| ApiError::Client(format!("Failed to serialize body: {e}")))?;

        let response: TokenResponse = self
            .api
            .execute(Method::POST, &route, Some(RequestBody::Json(body)), Credential::Anonymous)
            .await?;

        self.complete_login(response, &request.options).await
    }

    async fn complete_login(
        &self,
        response: TokenResponse,
        options: &GetOptions,
    ) -> Result<Session, ApiError> {
        let token = response.into_token(self.session().clock().now());
        let user = self.fetch_user(options, Credential::Token(&token)).await?;
        let session = self.session().set_user(Some(user), Some(token))?;
        info!("Login completed");
        Ok(session)
    }

    /// Fetch the user for the current session token
    ///
    /// # Errors
    ///
    /// `ApiError::Auth` when there is no usable token.
    pub async fn load_user(&self, options: &GetOptions) -> Result<Value, ApiError> {
        if !self.session().is_authenticated() {
            return Err(ApiError::Auth("no active session".to_string()));
        }
        self.fetch_user(options, Credential::Session).await
    }

    /// Reload the user and store it with the current token
    ///
    /// # Errors
    ///
    /// See [`load_user`](Self::load_user).
    pub async fn refresh_user(&self, options: &GetOptions) -> Result<Session, ApiError> {
        let token: AuthToken = self
            .session()
            .get_access_token()
            .ok_or_else(|| ApiError::Auth("no active session".to_string()))?;
        let user = self.load_user(options).await?;
        Ok(self.session().set_user(Some(user), Some(token))?)
    }

    /// End the session on the server and locally
    ///
    /// The local session is cleared even when the server call fails; that
    /// failure is still returned.
    ///
    /// # Errors
    ///
    /// The server call's [`ApiError`], or `ApiError::Session` if the slot
    /// cannot be removed.
    pub async fn logout(&self) -> Result<(), ApiError> {
        let remote = match self.session().get_access_token() {
            Some(token) => {
                let body = json!({ "token": token.value, "type": token.token_type });
                self.api
                    .execute::<Option<Value>>(
                        Method::DELETE,
                        LOGOUT_ROUTE,
                        Some(RequestBody::Json(body)),
                        Credential::Session,
                    )
                    .await
                    .map(|_| ())
            }
            None => Ok(()),
        };

        if let Err(e) = &remote {
            warn!(error = %e, "Server logout failed, clearing local session anyway");
        }

        self.session().logout()?;
        remote
    }

    async fn fetch_user(&self, options: &GetOptions, credential: Credential<'_>) -> Result<Value, ApiError> {
        let route = RouteTemplate::new(LOGIN_TEMPLATE).expand(&options.to_params());
        self.api.execute(Method::GET, &route, None, credential).await
    }
}

fn social_login_params(provider: &str, options: &GetOptions) -> Params {
    options.to_params().with("provider", provider)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use cirrus_core::SessionStorage;
    use cirrus_domain::ClientOptions;
    use serde_json::json;
    use wiremock::matchers::{body_string_contains, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::http::HttpClient;
    use crate::storage::MemoryStorage;

    const SLOT: &str = "cirrus.session.app";

    async fn login_client(server: &MockServer) -> (LoginClient, Arc<MemoryStorage>) {
        let options = ClientOptions::new("app")
            .with_api_root_url(server.address().to_string())
            .with_api_version("v1")
            .with_ssl(false);
        let storage = Arc::new(MemoryStorage::new());
        let session = SessionManager::builder(storage.clone()).slot(SLOT).build().unwrap();
        let transport = Arc::new(HttpClient::new().unwrap());
        (LoginClient::new(ApiClient::new(&options, transport, session)), storage)
    }

    async fn mount_login(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/v1/app/login/"))
            .and(body_string_contains("grant_type=password"))
            .and(body_string_contains("username=ada"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "abc",
                "token_type": "Bearer",
                "expires_in": 3600
            })))
            .expect(1)
            .mount(server)
            .await;

        Mock::given(method("GET"))
            .and(path("/v1/app/login/"))
            .and(header("Authorization", "Bearer abc"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1", "userName": "ada" })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_login_stores_user_and_token() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        let (client, storage) = login_client(&server).await;

        let session = client.login(&LoginRequest::new("ada", "secret")).await.unwrap();

        assert_eq!(session.user, Some(json!({ "id": "u1", "userName": "ada" })));
        assert_eq!(session.token.as_ref().map(|t| t.value.as_str()), Some("abc"));
        assert!(client.session().is_authenticated());
        assert!(client.session().has_pending_expiry());
        assert!(storage.read(SLOT).unwrap().is_some());
    }

    #[tokio::test]
    async fn test_login_forwards_projection_to_user_request() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("GET"))
            .and(path("/v1/app/login/"))
            .and(query_param("embed", "roles"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u1", "roles": ["admin"] })))
            .with_priority(1)
            .mount(&server)
            .await;
        let (client, _) = login_client(&server).await;

        let request = LoginRequest::new("ada", "secret").with_options(GetOptions::embed("roles"));
        let session = client.login(&request).await.unwrap();

        assert_eq!(session.user, Some(json!({ "id": "u1", "roles": ["admin"] })));
    }

    #[tokio::test]
    async fn test_rejected_credentials_leave_session_empty() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/app/login/"))
            .respond_with(ResponseTemplate::new(401).set_body_string(r#"{"error":"invalid_grant"}"#))
            .mount(&server)
            .await;
        let (client, storage) = login_client(&server).await;

        let result = client.login(&LoginRequest::new("ada", "wrong")).await;

        assert!(matches!(result, Err(ApiError::Auth(_))));
        assert!(!client.session().is_authenticated());
        assert!(storage.read(SLOT).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_social_login_posts_provider_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/app/login/social/google/"))
            .and(body_string_contains("\"redirectUri\":\"https://app.example/cb\""))
            .and(body_string_contains("\"code\":\"xyz\""))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "g1",
                "token_type": "Bearer",
                "expires_in": 600
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v1/app/login/"))
            .and(header("Authorization", "Bearer g1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "u2" })))
            .mount(&server)
            .await;
        let (client, _) = login_client(&server).await;

        let request = SocialLoginRequest {
            code: Some("xyz".into()),
            redirect_uri: "https://app.example/cb".into(),
            ..SocialLoginRequest::default()
        };
        let session = client.social_login("google", &request).await.unwrap();

        assert_eq!(session.user, Some(json!({ "id": "u2" })));
    }

    #[tokio::test]
    async fn test_logout_clears_local_session_when_server_fails() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        Mock::given(method("DELETE"))
            .and(path("/v1/app/login"))
            .and(body_string_contains("\"token\":\"abc\""))
            .respond_with(ResponseTemplate::new(500))
            .expect(1)
            .mount(&server)
            .await;
        let (client, storage) = login_client(&server).await;
        client.login(&LoginRequest::new("ada", "secret")).await.unwrap();

        let result = client.logout().await;

        assert!(matches!(result, Err(ApiError::Server(_))));
        assert!(!client.session().is_authenticated());
        assert!(storage.read(SLOT).unwrap().is_none());
    }

    #[tokio::test]
    async fn test_logout_without_session_skips_server() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE")).respond_with(ResponseTemplate::new(204)).expect(0).mount(&server).await;
        let (client, _) = login_client(&server).await;

        client.logout().await.unwrap();
    }

    #[tokio::test]
    async fn test_refresh_user_requires_session() {
        let server = MockServer::start().await;
        let (client, _) = login_client(&server).await;

        let result = client.refresh_user(&GetOptions::default()).await;
        assert!(matches!(result, Err(ApiError::Auth(_))));
    }

    #[tokio::test]
    async fn test_refresh_user_keeps_token() {
        let server = MockServer::start().await;
        mount_login(&server).await;
        let (client, _) = login_client(&server).await;
        client.login(&LoginRequest::new("ada", "secret")).await.unwrap();

        let session = client.refresh_user(&GetOptions::default()).await.unwrap();

        assert_eq!(session.token.map(|t| t.value), Some("abc".to_string()));
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let debug = format!("{:?}", LoginRequest::new("ada", "hunter2"));
        assert!(!debug.contains("hunter2"));
    }
}
