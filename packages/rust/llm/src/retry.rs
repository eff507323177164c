//! Capped exponential backoff for rate-limited upstream calls.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use bidiq_shared::{AnalysisConfig, Result};

/// Default number of retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Default delay before the first retry.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(1000);

/// How many times to retry a rate-limited call and how long to wait first.
///
/// The delay doubles after every retry. There is no jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry.
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_INITIAL_DELAY)
    }
}

impl From<&AnalysisConfig> for RetryPolicy {
    fn from(config: &AnalysisConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_millis(config.initial_delay_ms),
        )
    }
}

/// Run `operation`, retrying while it fails with a rate-limit error.
///
/// Only [`BidIqError::RateLimited`](bidiq_shared::BidIqError::RateLimited)
/// is retried. Any other error, or the last rate-limit error once retries
/// are exhausted, is returned unchanged.
pub async fn retry<T, F, Fut>(mut operation: F, policy: RetryPolicy) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut delay = policy.initial_delay;
    let mut retries = 0;

    loop {
        match operation().await {
            Err(e) if e.is_rate_limited() && retries < policy.max_retries => {
                retries += 1;
                warn!(
                    retry = retries,
                    max_retries = policy.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                delay = delay.saturating_mul(2);
            }
            outcome => return outcome,
        }
    }
}
