//! Retries for provider calls
//!
//! Hosted vision models regularly answer with 429/503 under load. Those
//! failures (and timeouts) are retried with exponential backoff plus random
//! jitter; anything else is returned on the first attempt.

use crate::{LLMError, Result};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

/// Exponential backoff with jitter
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Attempts including the first one
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_backoff: Duration,
    /// Cap on the exponential part of the delay
    pub max_backoff: Duration,
    pub backoff_multiplier: f64,
    /// Upper bound of the random delay added to every backoff
    pub jitter: Duration,
}

impl Default for RetryPolicy {
    /// 5 attempts, 1s doubling up to 60s, up to 1s of jitter
    fn default() -> Self {
        Self::new(5, Duration::from_secs(1), Duration::from_secs(60), 2.0)
            .with_jitter(Duration::from_secs(1))
    }
}

impl RetryPolicy {
    pub fn new(
        max_attempts: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
        backoff_multiplier: f64,
    ) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            max_backoff,
            backoff_multiplier,
            jitter: Duration::ZERO,
        }
    }

    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Single attempt
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO, 1.0)
    }

    /// Three attempts with millisecond delays, for tests
    pub fn fast() -> Self {
        Self::new(3, Duration::from_millis(10), Duration::from_millis(100), 2.0)
    }

    /// Exponential part of the delay before retry number `retry` (1-based)
    fn backoff_duration(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(retry - 1).unwrap_or(i32::MAX);
        let millis = self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        Duration::from_millis(millis as u64).min(self.max_backoff)
    }

    fn jitter_duration(&self) -> Duration {
        let max_ms = self.jitter.as_millis() as u64;
        if max_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(rand::thread_rng().gen_range(0..=max_ms))
        }
    }

    /// Run `operation` until it succeeds, fails permanently, or runs out of attempts
    ///
    /// `operation_name` only appears in log lines. The last error is returned
    /// when every attempt fails.
    pub async fn execute<F, Fut, T>(&self, operation_name: &str, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.max_attempts == 0 {
            return Err(LLMError::ConfigurationError(
                "retry policy allows zero attempts".to_string(),
            ));
        }

        let mut attempt = 1;
        loop {
            debug!("{}: attempt {}/{}", operation_name, attempt, self.max_attempts);

            let error = match operation().await {
                Ok(value) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}", operation_name, attempt);
                    }
                    return Ok(value);
                }
                Err(e) => e,
            };

            if !error.is_retryable() {
                debug!("{} failed permanently: {}", operation_name, error);
                return Err(error);
            }
            if attempt >= self.max_attempts {
                warn!("{} failed after {} attempts: {}", operation_name, attempt, error);
                return Err(error);
            }

            let delay = self.backoff_duration(attempt) + self.jitter_duration();
            warn!(
                "{} failed (attempt {}/{}): {}. Retrying in {:?}",
                operation_name, attempt, self.max_attempts, error, delay
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn counted<T>(
        calls: &Arc<AtomicU32>,
        outcome: impl Fn(u32) -> Result<T>,
    ) -> impl FnMut() -> std::future::Ready<Result<T>> {
        let calls = Arc::clone(calls);
        move || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            std::future::ready(outcome(n))
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.initial_backoff, Duration::from_secs(1));
        assert_eq!(policy.max_backoff, Duration::from_secs(60));
        assert_eq!(policy.jitter, Duration::from_secs(1));
        assert_eq!(RetryPolicy::no_retry().max_attempts, 1);
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff_duration(0), Duration::ZERO);
        assert_eq!(policy.backoff_duration(1), Duration::from_secs(1));
        assert_eq!(policy.backoff_duration(3), Duration::from_secs(4));

        let capped = RetryPolicy::new(10, Duration::from_secs(1), Duration::from_secs(5), 2.0);
        assert_eq!(capped.backoff_duration(10), Duration::from_secs(5));
    }

    #[test]
    fn test_jitter_bounded() {
        let policy = RetryPolicy::fast().with_jitter(Duration::from_millis(50));
        for _ in 0..100 {
            assert!(policy.jitter_duration() <= Duration::from_millis(50));
        }
        assert_eq!(RetryPolicy::fast().jitter_duration(), Duration::ZERO);
    }

    #[tokio::test]
    async fn test_first_attempt_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = RetryPolicy::fast()
            .execute("chart analysis", counted(&calls, |_| Ok(42)))
            .await;

        assert_eq!(tokio_test::assert_ok!(result), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_then_success() {
        let calls = Arc::new(AtomicU32::new(0));
        let result = RetryPolicy::fast()
            .execute(
                "chart analysis",
                counted(&calls, |n| {
                    if n < 3 {
                        Err(LLMError::RateLimitExceeded("429".into()))
                    } else {
                        Ok("analysis")
                    }
                }),
            )
            .await;

        assert_eq!(result.unwrap(), "analysis");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<()> = RetryPolicy::fast()
            .execute(
                "chart analysis",
                counted(&calls, |_| Err(LLMError::ServiceUnavailable("overloaded".into()))),
            )
            .await;

        assert!(matches!(result, Err(LLMError::ServiceUnavailable(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_error_not_retried() {
        let calls = Arc::new(AtomicU32::new(0));
        let result: Result<()> = RetryPolicy::fast()
            .execute("chart analysis", counted(&calls, |_| Err(LLMError::AuthenticationFailed)))
            .await;

        let err = tokio_test::assert_err!(result);
        assert!(matches!(err, LLMError::AuthenticationFailed));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_attempts_is_configuration_error() {
        let policy = RetryPolicy::new(0, Duration::ZERO, Duration::ZERO, 1.0);
        let result: Result<()> = policy.execute("noop", || async { Ok(()) }).await;
        assert!(matches!(result, Err(LLMError::ConfigurationError(_))));
    }
}
