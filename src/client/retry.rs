//! Retry loop with exponential backoff
//!
//! One logical call moves through `Pending -> Attempting`, then either
//! finishes (`Succeeded` or `FailedFatal`) or sleeps in `Backoff` and attempts
//! again. Backoff is only entered when the failure is retryable and attempts
//! remain.

use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::config::ClientConfig;
use crate::error::FetchError;

/// Result of a single attempt, as seen by the retry loop
#[derive(Debug)]
pub enum AttemptOutcome<T> {
    /// The attempt produced a value
    Success(T),
    /// The attempt failed but may succeed if tried again
    RetryableFailure(FetchError),
    /// The attempt failed and the call must stop
    FatalFailure(FetchError),
}

impl<T> AttemptOutcome<T> {
    /// Sorts an attempt result by whether it can be retried
    pub fn classify(result: Result<T, FetchError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(e) if e.is_retryable() => Self::RetryableFailure(e),
            Err(e) => Self::FatalFailure(e),
        }
    }
}

/// Attempt budget and backoff schedule for one logical call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Zero is treated as one.
    pub max_attempts: u32,
    /// Wait after the first failed attempt
    pub backoff_base: Duration,
}

impl RetryPolicy {
    /// Creates a policy allowing `max_attempts` attempts
    pub fn new(max_attempts: u32, backoff_base: Duration) -> Self {
        Self {
            max_attempts,
            backoff_base,
        }
    }

    /// Delay after failed attempt `attempt` (0-indexed): `base * 2^attempt`
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        self.backoff_base.saturating_mul(2u32.saturating_pow(attempt))
    }
}

impl From<&ClientConfig> for RetryPolicy {
    fn from(config: &ClientConfig) -> Self {
        Self::new(config.max_retries, config.backoff_base)
    }
}

/// Runs `op` until it succeeds, fails fatally, or the budget is spent
///
/// `op` receives the 0-indexed attempt number. When every attempt fails the
/// error from the last one is returned.
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    mut op: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        match AttemptOutcome::classify(op(attempt).await) {
            AttemptOutcome::Success(value) => return Ok(value),
            AttemptOutcome::FatalFailure(e) => return Err(e),
            AttemptOutcome::RetryableFailure(e) => {
                if attempt + 1 >= attempts {
                    return Err(e);
                }
                let delay = policy.delay_for_attempt(attempt);
                warn!(
                    attempt = attempt + 1,
                    max_attempts = attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %e,
                    "retrying after transient error"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
