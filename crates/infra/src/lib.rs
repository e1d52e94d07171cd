//! # Cirrus Infrastructure
//!
//! Implementations of the ports defined in `cirrus-core`, plus the HTTP side
//! of the SDK.
//!
//! This crate contains:
//! - The HTTP transport (reqwest) and its retry policy
//! - Session storage adapters (memory, file, keychain)
//! - Configuration loading
//! - URI templates, the resource catalog and the API/login clients
//!
//! ## Architecture
//! - Implements traits defined in `cirrus-core`
//! - Contains all "impure" code (network, filesystem, keychain)

pub mod api;
pub mod config;
pub mod errors;
pub mod http;
pub mod storage;

// Re-export commonly used items
pub use api::{
    ApiClient, ApiError, ApiErrorCategory, CollectionPage, FindOptions, GetOptions, LoginClient,
    LoginRequest, Params, ResourceClient, RouteTemplate, SocialLoginRequest,
};
pub use http::{ApiRequest, ApiResponse, HttpClient, HttpTransport, RequestBody, TransportError};
pub use storage::{FileStorage, KeychainStorage, MemoryStorage};
