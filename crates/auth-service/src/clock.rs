//! Time source for token timestamps and TTL bookkeeping.
//!
//! Production code uses [`SystemClock`]. Tests that need to move time forward
//! (token expiry, throttle windows) use [`ManualClock`], available under
//! `cfg(test)` or the `test-utils` feature.

use chrono::{DateTime, Utc};
use std::fmt;

pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Utc>;

    /// Current time as Unix seconds, the unit JWT claims use.
    fn now_timestamp(&self) -> i64 {
        self.now().timestamp()
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(any(test, feature = "test-utils"))]
pub use manual::ManualClock;

#[cfg(any(test, feature = "test-utils"))]
mod manual {
    use super::Clock;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use std::sync::atomic::{AtomicI64, Ordering};

    /// Clock that only moves when told to.
    ///
    /// Stores milliseconds since the epoch in an atomic so it can be shared
    /// across tasks without a lock.
    #[derive(Debug)]
    pub struct ManualClock {
        millis: AtomicI64,
    }

    impl ManualClock {
        pub fn new(start: DateTime<Utc>) -> Self {
            Self {
                millis: AtomicI64::new(start.timestamp_millis()),
            }
        }

        /// Start at the current wall-clock time.
        pub fn starting_now() -> Self {
            Self::new(Utc::now())
        }

        pub fn advance(&self, by: Duration) {
            self.millis
                .fetch_add(by.num_milliseconds(), Ordering::SeqCst);
        }

        pub fn set(&self, to: DateTime<Utc>) {
            self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            let millis = self.millis.load(Ordering::SeqCst);
            Utc.timestamp_millis_opt(millis)
                .single()
                .unwrap_or(DateTime::<Utc>::MIN_UTC)
        }
    }
}
