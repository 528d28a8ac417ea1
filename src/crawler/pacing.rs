//! Randomized politeness delays between requests

use rand::Rng;
use std::time::Duration;

/// Waits `base + uniform(0..=jitter)` between units of work
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacer {
    base: Duration,
    jitter: Duration,
}

impl Pacer {
    pub fn new(base: Duration, jitter: Duration) -> Self {
        Self { base, jitter }
    }

    /// Pacer built from millisecond settings
    pub fn from_millis(base_ms: u64, jitter_ms: u64) -> Self {
        Self::new(Duration::from_millis(base_ms), Duration::from_millis(jitter_ms))
    }

    /// A pacer that never sleeps
    pub fn none() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO)
    }

    /// Picks the next delay
    pub fn next_delay(&self) -> Duration {
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return self.base;
        }
        let mut rng = rand::thread_rng();
        self.base + Duration::from_millis(rng.gen_range(0..=jitter_ms))
    }

    /// Sleeps for the next delay
    pub async fn pause(&self) {
        let delay = self.next_delay();
        if delay.is_zero() {
            return;
        }
        tracing::debug!("Waiting {:?} before the next request", delay);
        tokio::time::sleep(delay).await;
    }
}
