//! Request pacing.
//!
//! One [`RateLimiter`] is shared by every request a client makes, retries
//! included. It keeps the time of the last granted dispatch behind a fair
//! async mutex, so concurrent callers queue in arrival order and each one
//! computes its wait against the previous grant.
//!
//! Spacing is measured between dispatch starts: a slot is stamped when it is
//! granted, so a slow exchange does not push back the next one.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{Instant, sleep_until};
use tracing::debug;

/// Default spacing between dispatched requests.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(500);

/// Enforces a minimum interval between dispatches.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_dispatch: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum interval.
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: Mutex::new(None),
        }
    }

    /// Returns the configured minimum interval.
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits until a dispatch is allowed, then claims the slot.
    ///
    /// The slot is recorded as taken at the moment this returns. If the
    /// future is dropped while waiting, no slot is recorded.
    pub async fn wait_for_slot(&self) {
        let mut last = self.last_dispatch.lock().await;

        if let Some(previous) = *last {
            let ready_at = previous + self.min_interval;
            let now = Instant::now();
            if ready_at > now {
                debug!(
                    wait_ms = (ready_at - now).as_millis(),
                    "Pacing request"
                );
                sleep_until(ready_at).await;
            }
        }

        *last = Some(Instant::now());
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}
