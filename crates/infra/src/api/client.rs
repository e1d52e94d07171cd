//! API client
//!
//! Resolves routes against the application's base URL, attaches the session
//! token, and maps responses to typed results or [`ApiError`].

use std::sync::Arc;

use cirrus_common::Clock;
use cirrus_core::SessionManager;
use cirrus_domain::{AuthToken, ClientOptions};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::errors::ApiError;
use crate::http::{ApiRequest, HttpTransport, RequestBody};

/// Which credential a request carries
#[derive(Debug, Clone, Copy)]
pub(crate) enum Credential<'a> {
    /// The session's token, when present and unexpired
    Session,
    /// A token not yet committed to the session (login follow-up calls)
    Token(&'a AuthToken),
    Anonymous,
}

/// Sends requests relative to `{scheme}://{root}/{version}/{key}/`
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn HttpTransport>,
    session: SessionManager,
    base_url: String,
}

impl ApiClient {
    /// Create a client for the application described by `options`
    #[must_use]
    pub fn new(options: &ClientOptions, transport: Arc<dyn HttpTransport>, session: SessionManager) -> Self {
        Self { transport, session, base_url: options.base_url() }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn session(&self) -> &SessionManager {
        &self.session
    }

    /// Absolute URL for an expanded route
    #[must_use]
    pub fn url_for(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route.trim_start_matches('/'))
    }

    /// # Errors
    /// Returns an [`ApiError`] for transport failures, non-2xx statuses and
    /// undecodable bodies.
    pub async fn get<R: DeserializeOwned>(&self, route: &str) -> Result<R, ApiError> {
        self.execute(Method::GET, route, None, Credential::Session).await
    }

    /// # Errors
    /// See [`get`](Self::get); also fails if `body` cannot be serialized.
    pub async fn post<B, R>(&self, route: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = to_json(body)?;
        self.execute(Method::POST, route, Some(RequestBody::Json(body)), Credential::Session).await
    }

    /// # Errors
    /// See [`post`](Self::post).
    pub async fn put<B, R>(&self, route: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = to_json(body)?;
        self.execute(Method::PUT, route, Some(RequestBody::Json(body)), Credential::Session).await
    }

    /// # Errors
    /// See [`get`](Self::get).
    pub async fn delete<R: DeserializeOwned>(&self, route: &str) -> Result<R, ApiError> {
        self.execute(Method::DELETE, route, None, Credential::Session).await
    }

    /// Send a form-encoded body with any method
    ///
    /// # Errors
    /// See [`get`](Self::get).
    pub async fn send_form<R: DeserializeOwned>(
        &self,
        method: Method,
        route: &str,
        form: Vec<(String, String)>,
    ) -> Result<R, ApiError> {
        self.execute(method, route, Some(RequestBody::Form(form)), Credential::Session).await
    }

    /// Send a JSON body with any method (e.g. `DELETE` with a payload)
    ///
    /// # Errors
    /// See [`post`](Self::post).
    pub async fn send_json<B, R>(&self, method: Method, route: &str, body: &B) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let body = to_json(body)?;
        self.execute(method, route, Some(RequestBody::Json(body)), Credential::Session).await
    }

    #[instrument(skip_all, fields(%method, %route))]
    pub(crate) async fn execute<R: DeserializeOwned>(
        &self,
        method: Method,
        route: &str,
        body: Option<RequestBody>,
        credential: Credential<'_>,
    ) -> Result<R, ApiError> {
        let url = self.url_for(route);
        let mut request = ApiRequest::new(method.clone(), url.clone());

        if let Some(header) = self.authorization(credential) {
            request = request.header("Authorization", header);
        }
        if let Some(body) = body {
            request = request.body(body);
        }

        debug!(url = %route, authenticated = request.header_value("Authorization").is_some(), "API request");
        let response = self.transport.send(request).await?;

        let status = response.status;
        if !status.is_success() {
            return Err(ApiError::from_status(status, &url, &response.body));
        }

        let result = decode(status, &response.body)?;
        info!(%method, route = %route, %status, "API request successful");
        Ok(result)
    }

    fn authorization(&self, credential: Credential<'_>) -> Option<String> {
        let now = self.session.clock().now();
        match credential {
            Credential::Session => self
                .session
                .get_access_token()
                .filter(|token| !token.is_expired_at(now))
                .map(|token| token.authorization_header()),
            Credential::Token(token) => Some(token.authorization_header()),
            Credential::Anonymous => None,
        }
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").field("base_url", &self.base_url).finish_non_exhaustive()
    }
}

fn to_json<B: Serialize + ?Sized>(body: &B) -> Result<Value, ApiError> {
    serde_json::to_value(body).map_err(|e| ApiError::Client(format!("Failed to serialize body: {e}")))
}

/// Decode a success body; 204/205 and empty bodies decode from `null`
fn decode<R: DeserializeOwned>(status: StatusCode, body: &str) -> Result<R, ApiError> {
    if status == StatusCode::NO_CONTENT || status == StatusCode::RESET_CONTENT || body.trim().is_empty() {
        return serde_json::from_value(Value::Null).map_err(|_| {
            ApiError::Decode(format!(
                "No content response ({}), but response type cannot be deserialized from empty body",
                status.as_u16()
            ))
        });
    }

    serde_json::from_str(body).map_err(|e| ApiError::Decode(format!("Failed to parse response: {e}")))
}
