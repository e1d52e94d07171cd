//! Shared utilities for the Cirrus SDK crates.
//!
//! # Feature Tiers
//!
//! - default: the [`time::Clock`] abstraction
//! - `observability`: tracing subscriber bootstrap ([`observability`])
//! - `test-utils`: deterministic clocks for downstream tests ([`testing`])

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod time;

#[cfg(feature = "observability")]
pub mod observability;

#[cfg(any(feature = "test-utils", test))]
pub mod testing;

pub use time::{Clock, SystemClock};
