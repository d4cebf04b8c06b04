//! Retry policy with exponential backoff.
//!
//! Every database round trip in this crate funnels through
//! [`RetryPolicy::execute`]. Only error classes flagged transient by
//! [`AdapterError::is_transient`](crate::error::AdapterError::is_transient)
//! are retried; validation and constraint failures propagate on the first
//! occurrence.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::error::Result;

/// Retry policy with exponential backoff.
///
/// Backoff doubles per attempt and is capped at `max_backoff_ms`. The
/// total number of calls made is bounded by `max_attempts`, so a
/// permanently failing dependency surfaces a connection error instead of
/// hanging.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Must be at least 1.
    pub max_attempts: u32,
    /// Backoff before the second attempt, in milliseconds.
    pub initial_backoff_ms: u64,
    /// Backoff ceiling, in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 5_000,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with explicit bounds.
    pub fn new(max_attempts: u32, initial_backoff_ms: u64, max_backoff_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff_ms,
            max_backoff_ms,
        }
    }

    /// Run `operation`, retrying transient failures with backoff.
    pub async fn execute<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!(attempt, "operation succeeded after retry");
                    }
                    return Ok(value);
                }
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let backoff = self.backoff_for(attempt - 1);
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %err,
                        "transient database error, retrying"
                    );
                    sleep(backoff).await;
                }
                Err(err) => {
                    if err.is_transient() {
                        warn!(attempt, error = %err, "retries exhausted");
                    }
                    return Err(err);
                }
            }
        }
    }

    /// Backoff for a 0-indexed completed attempt: `initial * 2^n`, capped.
    fn backoff_for(&self, completed: u32) -> Duration {
        let ms = self
            .initial_backoff_ms
            .saturating_mul(2_u64.saturating_pow(completed))
            .min(self.max_backoff_ms);
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AdapterError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn backoff_doubles_and_caps() {
        let policy = RetryPolicy::new(5, 100, 1_000);
        assert_eq!(policy.backoff_for(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_for(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_for(2), Duration::from_millis(400));
        assert_eq!(policy.backoff_for(3), Duration::from_millis(800));
        assert_eq!(policy.backoff_for(4), Duration::from_millis(1_000));
        assert_eq!(policy.backoff_for(10), Duration::from_millis(1_000));
    }

    #[tokio::test]
    async fn succeeds_without_retry() {
        let policy = RetryPolicy::new(3, 1, 10);
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                }
            })
            .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_transient_then_succeeds() {
        let policy = RetryPolicy::new(3, 1, 10);
        let calls = Arc::new(AtomicU32::new(0));

        let result = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(AdapterError::Connection("reset".into()))
                    } else {
                        Ok(42)
                    }
                }
            })
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn makes_exactly_max_attempts_on_permanent_transient_failure() {
        let policy = RetryPolicy::new(3, 1, 10);
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<()> = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(AdapterError::Connection("unreachable".into()))
                }
            })
            .await;

        assert!(matches!(result, Err(AdapterError::Connection(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn does_not_retry_permanent_errors() {
        let policy = RetryPolicy::new(5, 1, 10);
        let calls = Arc::new(AtomicU32::new(0));

        let result: Result<()> = policy
            .execute(|| {
                let calls = Arc::clone(&calls);
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Err(AdapterError::Constraint("duplicate key".into()))
                }
            })
            .await;

        assert!(matches!(result, Err(AdapterError::Constraint(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
