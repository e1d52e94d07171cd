//! Transport-neutral request/response types

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use thiserror::Error;

/// Body of an outgoing request
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// Sent as `application/json`
    Json(Value),
    /// Sent as `application/x-www-form-urlencoded`
    Form(Vec<(String, String)>),
}

/// Fully resolved request handed to a transport
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self { method, url: url.into(), headers: Vec::new(), body: None }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = Some(body);
        self
    }

    /// Value of the first header named `name` (case-insensitive)
    #[must_use]
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Response as seen by the API layer; any status is a successful transport
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Failures that prevented a response from being received
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP connection failure: {0}")]
    Network(String),

    #[error("HTTP request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid HTTP request: {0}")]
    InvalidRequest(String),
}

/// Sends requests to the hosted API
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Execute `request` and return the raw response
    ///
    /// # Errors
    ///
    /// Returns a [`TransportError`] when no response was received.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_ignores_case() {
        let request = ApiRequest::new(Method::GET, "https://example.com")
            .header("Authorization", "bearer abc");

        assert_eq!(request.header_value("authorization"), Some("bearer abc"));
        assert_eq!(request.header_value("accept"), None);
    }
}
