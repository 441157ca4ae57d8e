use crate::error::{ResolverError, Result};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Upper bound for the random jitter added to each backoff delay.
pub const DEFAULT_MAX_JITTER: Duration = Duration::from_millis(200);

/// Retry, timeout and spacing rules shared by every outbound request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    #[serde(with = "humantime_serde")]
    pub base_delay: Duration,
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    #[serde(with = "humantime_serde")]
    pub min_interval: Duration,
    #[serde(with = "humantime_serde", default = "default_max_jitter")]
    pub max_jitter: Duration,
}

fn default_max_jitter() -> Duration {
    DEFAULT_MAX_JITTER
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            timeout: Duration::from_secs(10),
            min_interval: Duration::from_secs(1),
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, timeout: Duration, min_interval: Duration) -> Self {
        Self {
            max_attempts,
            base_delay,
            timeout,
            min_interval,
            max_jitter: DEFAULT_MAX_JITTER,
        }
    }

    pub fn with_max_jitter(mut self, max_jitter: Duration) -> Self {
        self.max_jitter = max_jitter;
        self
    }

    /// Total attempts, never fewer than one.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Deterministic part of the wait after failed attempt `attempt` (1-based).
    pub fn base_backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(1u32 << exponent)
    }

    /// Wait after failed attempt `attempt`: `base * 2^(attempt-1) + jitter`.
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        let jitter_ms = self.max_jitter.as_millis() as u64;
        let jitter = if jitter_ms == 0 {
            Duration::ZERO
        } else {
            Duration::from_millis(fastrand::u64(0..=jitter_ms))
        };
        self.base_backoff(attempt).saturating_add(jitter)
    }

    /// Validate policy parameters
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.max_attempts == 0 {
            return Err("Max attempts must be at least 1".to_string());
        }
        if self.timeout.is_zero() {
            return Err("Request timeout must be greater than 0".to_string());
        }
        Ok(())
    }
}

/// Runs `op` until it succeeds, fails with a non-retryable error, or the
/// policy's attempts are exhausted. The closure receives the 1-based attempt
/// number. The last error is returned on exhaustion.
pub async fn retry_with_backoff<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Result<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let attempts = policy.attempts();
    let mut attempt = 1;

    loop {
        match op(attempt).await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < attempts => {
                let delay = policy.backoff_delay(attempt);
                warn!(attempt, max_attempts = attempts, ?delay, error = %err, "Request failed, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

/// Applies the policy's per-attempt timeout to a request future.
pub async fn with_timeout<T, Fut>(timeout: Duration, fut: Fut) -> Result<T>
where
    Fut: Future<Output = Result<T>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| ResolverError::Timeout(timeout))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(
            max_attempts,
            Duration::from_millis(100),
            Duration::from_secs(1),
            Duration::ZERO,
        )
    }

    #[test]
    fn test_base_backoff_doubles() {
        let p = policy(5);
        assert_eq!(p.base_backoff(1), Duration::from_millis(100));
        assert_eq!(p.base_backoff(2), Duration::from_millis(200));
        assert_eq!(p.base_backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_jitter_is_bounded() {
        let p = policy(3);
        for _ in 0..100 {
            let d = p.backoff_delay(2);
            assert!(d >= Duration::from_millis(200));
            assert!(d <= Duration::from_millis(400));
        }
        let p = p.with_max_jitter(Duration::ZERO);
        assert_eq!(p.backoff_delay(1), Duration::from_millis(100));
    }

    #[test]
    fn test_policy_serde_humantime() {
        let json = r#"{"max_attempts":4,"base_delay":"250ms","timeout":"5s","min_interval":"1s"}"#;
        let p: RetryPolicy = serde_json::from_str(json).unwrap();
        assert_eq!(p.max_attempts, 4);
        assert_eq!(p.base_delay, Duration::from_millis(250));
        assert_eq!(p.timeout, Duration::from_secs(5));
        assert_eq!(p.max_jitter, DEFAULT_MAX_JITTER);
    }

    #[test]
    fn test_validate() {
        assert!(RetryPolicy::default().validate().is_ok());
        assert!(policy(0).validate().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let p = policy(4);
        let calls = AtomicU32::new(0);
        let start = Instant::now();

        let value = retry_with_backoff(&p, |_| {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            async move {
                if n < 4 {
                    Err(ResolverError::Network("connection reset".into()))
                } else {
                    Ok(n)
                }
            }
        })
        .await
        .unwrap();

        assert_eq!(value, 4);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        // three waits: 100 + 200 + 400 ms, each plus jitter
        assert!(start.elapsed() >= Duration::from_millis(700));
        assert!(start.elapsed() <= Duration::from_millis(700 + 3 * 200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_error() {
        let p = policy(3);
        let calls = AtomicU32::new(0);

        let err = retry_with_backoff(&p, |attempt| {
            calls.fetch_add(1, Ordering::SeqCst);
            async move { Err::<(), _>(ResolverError::Network(format!("attempt {attempt}"))) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(matches!(err, ResolverError::Network(ref m) if m == "attempt 3"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_parse_error_is_not_retried() {
        let p = policy(5);
        let calls = AtomicU32::new(0);

        let err = retry_with_backoff(&p, |_| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err::<(), _>(ResolverError::Parse("expected value".into())) }
        })
        .await
        .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, ResolverError::Parse(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_timeout_surfaces_timeout() {
        let err = with_timeout(Duration::from_millis(50), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(())
        })
        .await
        .unwrap_err();

        assert!(matches!(err, ResolverError::Timeout(d) if d == Duration::from_millis(50)));
    }
}
