use std::time::Duration;

use tracing::debug;

/// Alpha Vantage's free-tier quota.
pub const REQUESTS_PER_MINUTE: u64 = 5;

/// Called once after every provider request.
pub trait Throttle {
    fn pause(&mut self);
}

/// Blocks the thread for the same interval every time, whatever happened.
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay {
    interval: Duration,
}

impl FixedDelay {
    pub fn new(interval: Duration) -> Self {
        FixedDelay { interval }
    }

    /// Evenly spaces `requests` calls over one minute.
    pub fn per_minute(requests: u64) -> Self {
        FixedDelay::new(Duration::from_secs(60 / requests.max(1)))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedDelay {
    fn default() -> Self {
        FixedDelay::per_minute(REQUESTS_PER_MINUTE)
    }
}

impl Throttle for FixedDelay {
    fn pause(&mut self) {
        debug!("Sleeping {}s to respect the provider rate limit", self.interval.as_secs());
        std::thread::sleep(self.interval);
    }
}
