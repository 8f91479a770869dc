use crate::error::{is_transient, retry_after};
use alchemist_config::RetryConfig;
use anyhow::Result;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff with jitter for remote calls
///
/// Delay before attempt `n + 1` is `min(max_delay, base_delay * 2^(n-1))`
/// plus a uniform random jitter. A server-supplied retry-after replaces the
/// computed delay, still capped at `max_delay`.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
    pub jitter: Duration,
    pub retry_if: fn(&anyhow::Error) -> bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms),
            jitter: Duration::from_millis(config.jitter_ms),
            retry_if: is_transient,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no waiting
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: Duration::ZERO,
            retry_if: is_transient,
        }
    }

    pub fn with_retry_if(mut self, retry_if: fn(&anyhow::Error) -> bool) -> Self {
        self.retry_if = retry_if;
        self
    }

    /// Backoff before the next attempt, excluding jitter
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay.saturating_mul(factor).min(self.max_delay)
    }

    fn delay_for(&self, attempt: u32, err: &anyhow::Error) -> Duration {
        if let Some(server) = retry_after(err) {
            return server.min(self.max_delay);
        }
        let jitter = self.jitter.mul_f64(rand::random::<f64>());
        self.backoff(attempt) + jitter
    }

    /// Run `op` until it succeeds, fails permanently or attempts run out
    ///
    /// The last error is returned unchanged so callers can still downcast it.
    pub async fn run<T, F, Fut>(&self, label: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(label, attempt, "succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if attempt < self.max_attempts && (self.retry_if)(&err) => {
                    let delay = self.delay_for(attempt, &err);
                    warn!(
                        label,
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
