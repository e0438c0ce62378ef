use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::error::TaxochemError;

pub trait RateLimiter: Send + Sync {
    /// Blocks until the next request may be issued.
    fn wait(&self);
}

#[derive(Debug)]
pub struct FixedIntervalLimiter {
    interval: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl FixedIntervalLimiter {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_request: Mutex::new(None),
        }
    }

    pub fn per_minute(requests_per_minute: u32) -> Result<Self, TaxochemError> {
        if requests_per_minute == 0 {
            return Err(TaxochemError::InvalidRate(requests_per_minute));
        }
        Ok(Self::new(Duration::from_secs(60) / requests_per_minute))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl RateLimiter for FixedIntervalLimiter {
    fn wait(&self) {
        let mut last = self
            .last_request
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < self.interval {
                let remaining = self.interval - elapsed;
                debug!(wait_ms = remaining.as_millis() as u64, "rate limit");
                std::thread::sleep(remaining);
            }
        }
        *last = Some(Instant::now());
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopLimiter;

impl RateLimiter for NoopLimiter {
    fn wait(&self) {}
}
