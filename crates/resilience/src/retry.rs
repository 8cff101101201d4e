//! Bounded retry with exponential backoff.

use std::error::Error;
use std::fmt;
use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::retryable::Retryable;

/// Jitter applied to each computed backoff delay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JitterPolicy {
    /// Use the computed delay exactly.
    #[default]
    None,
    /// random(0, delay)
    Full,
    /// delay/2 + random(0, delay/2)
    Equal,
}

impl JitterPolicy {
    /// Apply jitter to a delay.
    #[must_use]
    pub fn apply(self, delay: Duration) -> Duration {
        let millis = delay.as_millis() as u64;
        match self {
            Self::None => delay,
            Self::Full if millis == 0 => delay,
            Self::Full => Duration::from_millis(fastrand::u64(0..=millis)),
            Self::Equal => {
                let half = millis / 2;
                let jitter = if half > 0 { fastrand::u64(0..=half) } else { 0 };
                Duration::from_millis(half + jitter)
            }
        }
    }
}

/// How many times to try and how long to wait in between.
///
/// Delay before retry `n` (0-indexed) is
/// `initial_backoff * multiplier^n`, capped at `max_backoff`, then jittered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Clamped to at least 1.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_backoff: Duration,
    /// Growth factor between consecutive delays.
    pub multiplier: f64,
    /// Upper bound on any single delay.
    pub max_backoff: Duration,
    /// Jitter mode.
    pub jitter: JitterPolicy,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// Exponential policy with factor 2, a 30s cap and no jitter.
    pub fn new(max_attempts: u32, initial_backoff: Duration) -> Self {
        Self {
            max_attempts,
            initial_backoff,
            multiplier: 2.0,
            max_backoff: Duration::from_secs(30),
            jitter: JitterPolicy::None,
        }
    }

    /// Policy that never retries.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Set the growth factor.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Set the delay cap.
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Set the jitter mode.
    pub fn with_jitter(mut self, jitter: JitterPolicy) -> Self {
        self.jitter = jitter;
        self
    }

    /// Effective attempt budget.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Un-jittered delay before retry `retry_index` (0 is the first retry).
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        let exp = self.multiplier.max(1.0).powi(retry_index as i32);
        let millis = (self.initial_backoff.as_millis() as f64 * exp)
            .min(self.max_backoff.as_millis() as f64);
        Duration::from_millis(millis as u64)
    }
}

/// The final error of a retried operation and how many attempts were made.
#[derive(Debug)]
pub struct RetryError<E> {
    /// Error returned by the last attempt.
    pub error: E,
    /// Attempts made, including the first.
    pub attempts: u32,
}

impl<E> RetryError<E> {
    /// Discard the attempt count.
    pub fn into_inner(self) -> E {
        self.error
    }
}

impl<E: fmt::Display> fmt::Display for RetryError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed after {} attempt(s): {}", self.attempts, self.error)
    }
}

impl<E: Error + 'static> Error for RetryError<E> {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(&self.error)
    }
}

/// Run `operation` until it succeeds, `should_retry` rejects the error, or the
/// attempt budget is spent.
///
/// `operation` receives the 1-based attempt number.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use weave_resilience::{RetryPolicy, retry};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let policy = RetryPolicy::new(3, Duration::from_millis(1));
/// let out = retry(&policy, |_: &&str| true, |attempt| async move {
///     if attempt < 2 { Err("flaky") } else { Ok(attempt) }
/// })
/// .await
/// .unwrap();
/// assert_eq!(out, 2);
/// # }
/// ```
pub async fn retry<T, E, P, F, Fut>(
    policy: &RetryPolicy,
    should_retry: P,
    mut operation: F,
) -> Result<T, RetryError<E>>
where
    P: Fn(&E) -> bool,
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: fmt::Display,
{
    let max_attempts = policy.attempts();
    let mut attempt = 1;
    loop {
        match operation(attempt).await {
            Ok(value) => {
                if attempt > 1 {
                    debug!(attempt, "operation succeeded after retry");
                }
                return Ok(value);
            }
            Err(error) => {
                if attempt >= max_attempts || !should_retry(&error) {
                    return Err(RetryError {
                        error,
                        attempts: attempt,
                    });
                }
                let delay = policy.jitter.apply(policy.delay_for(attempt - 1));
                warn!(
                    attempt,
                    max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "attempt failed, retrying"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

/// [`retry`] using the error's own [`Retryable`] classification.
pub async fn retry_retryable<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: F,
) -> Result<T, RetryError<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable,
{
    retry(policy, E::is_retryable, operation).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    #[derive(Debug, thiserror::Error)]
    enum TestError {
        #[error("transient")]
        Transient,
        #[error("permanent")]
        Permanent,
    }

    impl Retryable for TestError {
        fn is_retryable(&self) -> bool {
            matches!(self, Self::Transient)
        }
    }

    #[rstest]
    #[case(0, 1_000)]
    #[case(1, 2_000)]
    #[case(2, 4_000)]
    #[case(10, 30_000)]
    fn exponential_delays_are_capped(#[case] index: u32, #[case] millis: u64) {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(index), Duration::from_millis(millis));
    }

    #[test]
    fn jitter_stays_within_bounds() {
        let delay = Duration::from_millis(1_000);
        assert_eq!(JitterPolicy::None.apply(delay), delay);
        for _ in 0..50 {
            assert!(JitterPolicy::Full.apply(delay) <= delay);
            let equal = JitterPolicy::Equal.apply(delay);
            assert!(equal >= Duration::from_millis(500) && equal <= delay);
        }
    }

    #[test]
    fn zero_attempts_still_runs_once() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).attempts(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let start = Instant::now();

        let result = retry_retryable(&RetryPolicy::default(), move |_| async move {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(TestError::Transient)
            } else {
                Ok("registered")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "registered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 1s before the second attempt, 2s before the third.
        assert!(start.elapsed() >= Duration::from_secs(3));
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_error_stops_immediately() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let err = retry_retryable(&RetryPolicy::default(), move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err::<(), _>(TestError::Permanent)
        })
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 1);
        assert!(matches!(err.error, TestError::Permanent));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_attempt_budget() {
        let err = retry(
            &RetryPolicy::new(3, Duration::from_millis(10)),
            |_: &TestError| true,
            |_| async { Err::<(), _>(TestError::Transient) },
        )
        .await
        .unwrap_err();

        assert_eq!(err.attempts, 3);
        assert_eq!(err.to_string(), "failed after 3 attempt(s): transient");
    }

    #[tokio::test(start_paused = true)]
    async fn operation_sees_attempt_number() {
        let mut seen = Vec::new();
        let _ = retry(
            &RetryPolicy::new(3, Duration::from_millis(1)),
            |_: &TestError| true,
            |attempt| {
                seen.push(attempt);
                async { Err::<(), _>(TestError::Transient) }
            },
        )
        .await;
        assert_eq!(seen, vec![1, 2, 3]);
    }
}
