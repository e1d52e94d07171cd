//! Time abstractions
//!
//! Session expiry is computed against wall-clock instants, so every component
//! that needs "now" receives a [`Clock`] instead of calling `Utc::now()`
//! directly. Production code uses [`SystemClock`]; tests use
//! [`MockClock`](crate::testing::MockClock) to move time without waiting.
//!
//! ## Usage
//!
//! ```rust
//! use cirrus_common::time::{Clock, SystemClock};
//!
//! let clock = SystemClock;
//! let now = clock.now();
//! assert!(now.timestamp() > 0);
//! ```

mod clock;

pub use clock::{Clock, SystemClock};
