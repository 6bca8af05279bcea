//! Call-site retry with exponential backoff.
//!
//! The service never retries on its own. Callers wrap whole operations with
//! a [`RetryPolicy`], which only re-runs them while the error reports itself
//! as retryable.

use std::future::Future;
use std::time::Duration;

use rand::random;

use crate::config::RetryConfig;
use crate::search::errors::SearchError;

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_jitter: Duration,
}

impl RetryPolicy {
    /// `max_attempts` counts the first call; zero is treated as one.
    pub fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_jitter: Duration::ZERO,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, Duration::from_millis(config.base_delay_ms))
            .with_jitter(Duration::from_millis(config.max_jitter_ms))
    }

    /// A policy that makes exactly one attempt.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn with_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(16);
        let delay = self.base_delay.saturating_mul(1u32 << exp);
        delay + self.jitter()
    }

    fn jitter(&self) -> Duration {
        let max_ms = self.max_jitter.as_millis() as u64;
        if max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(random::<u64>() % (max_ms + 1))
    }

    /// Run `op`, retrying retryable failures until attempts run out.
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T, SearchError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, SearchError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.backoff(attempt);
                    log::warn!(
                        "{}: retrying (attempt {}/{}) after error: {}, backoff {}ms",
                        operation,
                        attempt + 1,
                        self.max_attempts,
                        err,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                result => return result,
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
