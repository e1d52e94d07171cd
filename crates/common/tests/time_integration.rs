//! Integration tests for the `time` and `testing` modules.
//!
//! A `MockClock` handed out as `Arc<dyn Clock>` must observe advances made
//! through any of its clones.

#![cfg(feature = "test-utils")]

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use cirrus_common::testing::MockClock;
use cirrus_common::time::Clock;

#[test]
fn test_shared_clock_sees_advances() {
    let clock = MockClock::new();
    let shared: Arc<dyn Clock> = Arc::new(clock.clone());
    let start = shared.now();

    clock.advance(Duration::from_secs(90));

    assert_eq!((shared.now() - start).num_seconds(), 90);
    assert_eq!(shared.millis_since_epoch() - start.timestamp_millis(), 90_000);
}

#[test]
fn test_custom_start_and_reset() {
    let start = Utc.with_ymd_and_hms(2030, 6, 1, 12, 0, 0).single().unwrap();
    let clock = MockClock::starting_at(start);

    clock.advance_millis(2_500);
    assert_eq!(clock.elapsed(), Duration::from_millis(2_500));

    clock.set_elapsed(Duration::ZERO);
    assert_eq!(clock.now(), start);
}
