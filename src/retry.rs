//! Retrying-call helper shared by the model client and the lookup adapter.
//!
//! The schedule is plain exponential backoff: the wait after attempt `n`
//! (1-based) is `initial_backoff * 2^(n-1)`, capped at `max_backoff`. No jitter.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub initial_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    /// 3 attempts, waiting 0.5s then 1s, never more than 4s.
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(4),
        }
    }
}

impl RetryPolicy {
    /// Same attempt budget with no waiting between attempts.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_backoff: Duration::ZERO,
            max_backoff: Duration::ZERO,
        }
    }

    /// Wait before the attempt following `attempt` (1-based).
    pub fn backoff_after(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        self.initial_backoff
            .saturating_mul(1u32 << exponent)
            .min(self.max_backoff)
    }
}

/// Runs `op` until it succeeds, `should_retry` rejects the error, or the
/// attempt budget is spent. The last error is returned unchanged.
///
/// `op` receives the 1-based attempt number.
pub async fn retry_async<T, E, F, Fut, P>(
    policy: &RetryPolicy,
    label: &str,
    mut should_retry: P,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: FnMut(&E) -> bool,
    E: Display,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && should_retry(&err) => {
                let wait = policy.backoff_after(attempt);
                tracing::warn!(
                    call = label,
                    attempt,
                    max_attempts,
                    backoff_ms = wait.as_millis() as u64,
                    "Attempt failed, retrying: {}",
                    err
                );
                if !wait.is_zero() {
                    tokio::time::sleep(wait).await;
                }
                attempt += 1;
            }
            Err(err) => {
                tracing::debug!(call = label, attempt, "Giving up: {}", err);
                return Err(err);
            }
        }
    }
}
