//! # Cirrus Domain
//!
//! Data model shared by every Cirrus crate.
//!
//! This crate contains:
//! - Session and token types plus their persisted form
//! - Error types and the `Result` alias
//! - Client options
//! - SDK constants
//!
//! ## Architecture
//! - No dependencies on other Cirrus crates
//! - Only external dependencies allowed

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
