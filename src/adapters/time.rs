//! Wall-clock time adapter.
//!
//! Implements [`Clock`] over `std::time::Instant` for `now()` and an
//! `async-io-mini` reactor timer for `sleep()`, so a sleeping control loop
//! parks its executor instead of spinning.

use core::time::Duration;
use std::time::Instant;

use crate::app::ports::Clock;

/// Monotonic clock whose epoch is its construction time.
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Whole seconds since the clock was created.
    pub fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    async fn sleep(&self, duration: Duration) {
        async_io_mini::Timer::after(duration).await;
    }
}
