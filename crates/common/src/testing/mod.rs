//! Testing utilities and helpers
//!
//! - **[`time`]**: a controllable [`MockClock`] for expiry-sensitive tests
//!
//! ## Usage
//!
//! ```rust
//! # #[cfg(feature = "test-utils")]
//! # {
//! use std::time::Duration;
//!
//! use cirrus_common::testing::MockClock;
//! use cirrus_common::time::Clock;
//!
//! let clock = MockClock::new();
//! let start = clock.now();
//! clock.advance(Duration::from_secs(5));
//! assert_eq!((clock.now() - start).num_seconds(), 5);
//! # }
//! ```

pub mod time;

pub use time::MockClock;
