//! Session, token and query types

pub mod query;
pub mod session;
pub mod token;

pub use query::{GrantType, OrderDirection};
pub use session::Session;
pub use token::{AuthToken, TokenResponse};
