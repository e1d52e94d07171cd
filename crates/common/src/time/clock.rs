use std::sync::Arc;

use chrono::{DateTime, Utc};

/// Trait for wall-clock reads to enable deterministic testing
///
/// Token lifetimes are absolute UTC instants, so the clock exposes a
/// `DateTime<Utc>` rather than a monotonic `Instant`.
pub trait Clock: Send + Sync + 'static {
    /// Current wall-clock time (UTC)
    fn now(&self) -> DateTime<Utc>;

    /// Milliseconds since the UNIX epoch
    fn millis_since_epoch(&self) -> i64 {
        self.now().timestamp_millis()
    }
}

/// Real system clock implementation for production use
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Implement Clock for Arc<T> where T: Clock for convenient sharing
impl<T: Clock> Clock for Arc<T> {
    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}
