//! Bounded retries for transient infrastructure failures.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use report::{HasRetryPolicy, RetryPolicy};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// How many times, and how far apart, a retryable operation is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrySchedule {
    /// Total attempts including the first. `1` disables retries.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubles for every further attempt.
    pub base_delay: Duration,
    /// Upper bound on any single delay, including server-provided hints.
    pub max_delay: Duration,
}

impl Default for RetrySchedule {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

impl RetrySchedule {
    /// Returns the pause that follows failed attempt number `attempt` (1-based).
    ///
    /// A server hint takes precedence over the exponential schedule. Either
    /// way the result never exceeds `max_delay`.
    pub fn delay_after(&self, attempt: u32, hint: Option<Duration>) -> Duration {
        let delay = hint.unwrap_or_else(|| {
            let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
            self.base_delay.saturating_mul(factor)
        });
        delay.min(self.max_delay)
    }
}

/// Runs `operation` until it succeeds, fails with a non-retryable error, or
/// `schedule.max_attempts` is used up. The last error is returned.
pub async fn with_retry<T, E, F, Fut>(
    schedule: &RetrySchedule,
    operation: &'static str,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: HasRetryPolicy + Display,
{
    let mut attempt = 1;
    loop {
        let err = match f().await {
            Ok(value) => return Ok(value),
            Err(err) => err,
        };

        match err.retry_policy() {
            RetryPolicy::Retryable { after } if attempt < schedule.max_attempts => {
                let delay = schedule.delay_after(attempt, after);
                warn!(
                    operation,
                    attempt,
                    max_attempts = schedule.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient failure, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            _ => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("fake failure (retryable: {0})")]
    struct FakeError(bool);

    impl HasRetryPolicy for FakeError {
        fn retry_policy(&self) -> RetryPolicy {
            if self.0 {
                RetryPolicy::Retryable { after: None }
            } else {
                RetryPolicy::NonRetryable
            }
        }
    }

    fn instant(max_attempts: u32) -> RetrySchedule {
        RetrySchedule {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    #[test]
    fn delays_double_and_are_capped() {
        let schedule = RetrySchedule {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(3),
        };
        assert_eq!(schedule.delay_after(1, None), Duration::from_millis(500));
        assert_eq!(schedule.delay_after(2, None), Duration::from_secs(1));
        assert_eq!(schedule.delay_after(3, None), Duration::from_secs(2));
        assert_eq!(schedule.delay_after(4, None), Duration::from_secs(3));
    }

    #[test]
    fn server_hint_wins_but_is_capped() {
        let schedule = RetrySchedule::default();
        assert_eq!(
            schedule.delay_after(1, Some(Duration::from_secs(4))),
            Duration::from_secs(4)
        );
        assert_eq!(
            schedule.delay_after(1, Some(Duration::from_secs(600))),
            schedule.max_delay
        );
    }

    #[tokio::test]
    async fn retries_transient_errors_until_success() {
        let calls = AtomicU32::new(0);
        let result = with_retry(&instant(3), "test", || async {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(FakeError(true))
            } else {
                Ok("done")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&instant(2), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FakeError(true))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_retryable_errors_return_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<(), _> = with_retry(&instant(5), "test", || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(FakeError(false))
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
