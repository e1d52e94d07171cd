//! REST surface of the hosted API
//!
//! - [`client`]: base URL resolution, auth header, response decoding
//! - [`catalog`]: the table of resource families and their routes
//! - [`resource`]: generic CRUD over one catalog entry
//! - [`membership`]: login, social login, logout
//! - [`uri`]: RFC 6570 route templates and query options

pub mod catalog;
pub mod client;
pub mod errors;
pub mod membership;
pub mod resource;
pub mod uri;

pub use catalog::{lookup, ResourceDef, Route, SubresourceDef, RESOURCES};
pub use client::ApiClient;
pub use errors::{ApiError, ApiErrorCategory};
pub use membership::{LoginClient, LoginRequest, SocialLoginRequest};
pub use resource::{CollectionPage, ResourceClient};
pub use uri::{FindOptions, GetOptions, Params, RouteTemplate};
