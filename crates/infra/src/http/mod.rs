//! HTTP transport
//!
//! [`HttpTransport`] is the seam the API clients send through;
//! [`HttpClient`] implements it on top of reqwest.

pub mod client;
pub mod transport;

pub use client::{HttpClient, HttpClientBuilder};
pub use transport::{ApiRequest, ApiResponse, HttpTransport, RequestBody, TransportError};
