// src/error_recovery.rs
//! Retry with exponential backoff for API operations.

use crate::constants::{
    BACKOFF_BASE_DELAY, BACKOFF_FACTOR, BACKOFF_JITTER, BACKOFF_MAX_ATTEMPTS,
};
use rand::Rng;
use std::time::Duration;

/// Schedule for retrying transient failures.
#[derive(Debug, Clone, PartialEq)]
pub struct BackoffPolicy {
    pub base_delay: Duration,
    pub factor: u32,
    /// Total attempts, the first one included.
    pub max_attempts: u32,
    /// Relative jitter applied to every delay, 0.2 meaning ±20%.
    pub jitter: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base_delay: BACKOFF_BASE_DELAY,
            factor: BACKOFF_FACTOR,
            max_attempts: BACKOFF_MAX_ATTEMPTS,
            jitter: BACKOFF_JITTER,
        }
    }
}

impl BackoffPolicy {
    /// Delay before retry number `retry` (1-based), before jitter.
    pub fn nominal_delay(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(self.factor.saturating_pow(exponent))
    }

    /// Delay before retry number `retry` with jitter applied.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let nominal = self.nominal_delay(retry);
        if self.jitter <= 0.0 {
            return nominal;
        }
        let spread = self.jitter.min(1.0);
        let scale = rand::rng().random_range((1.0 - spread)..=(1.0 + spread));
        nominal.mul_f64(scale)
    }
}

/// Outcome of a single failed attempt.
#[derive(Debug)]
pub enum Attempt<E> {
    /// Worth trying again.
    Transient(E),
    /// Retrying cannot help.
    Fatal(E),
}

/// Why `retry_with_backoff` gave up.
#[derive(Debug)]
pub struct RetryFailure<E> {
    pub error: E,
    pub attempts: u32,
    /// False when the last error was fatal rather than a run-out budget.
    pub exhausted: bool,
}

/// Retries an async operation with exponential backoff.
///
/// Transient failures are retried until `policy.max_attempts` is reached;
/// a fatal failure stops immediately.
pub async fn retry_with_backoff<F, T, E, Fut>(
    policy: &BackoffPolicy,
    mut operation: F,
) -> Result<T, RetryFailure<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: std::future::Future<Output = Result<T, Attempt<E>>>,
    E: std::fmt::Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation(attempt).await {
            Ok(result) => return Ok(result),
            Err(Attempt::Fatal(error)) => {
                return Err(RetryFailure {
                    error,
                    attempts: attempt,
                    exhausted: false,
                })
            }
            Err(Attempt::Transient(error)) => {
                if attempt >= max_attempts {
                    return Err(RetryFailure {
                        error,
                        attempts: attempt,
                        exhausted: true,
                    });
                }
                let delay = policy.delay_for(attempt);
                log::warn!(
                    "Attempt {} failed ({}), retrying after {:?}",
                    attempt,
                    error,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
    }
}
