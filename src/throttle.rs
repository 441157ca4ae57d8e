use std::time::Duration;
use tokio::sync::{Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::debug;

/// Process-wide request spacing state
#[derive(Debug, Default)]
pub struct ThrottleState {
    last_call_at: Option<Instant>,
}

impl ThrottleState {
    pub fn last_call_at(&self) -> Option<Instant> {
        self.last_call_at
    }
}

/// Enforces a minimum interval between outbound requests.
///
/// The state sits behind an async mutex held for the whole request, so
/// concurrent callers queue up and are released one at a time.
#[derive(Debug)]
pub struct Throttle {
    min_interval: Duration,
    state: Mutex<ThrottleState>,
}

/// Exclusive right to dispatch one request. Dropping it stamps `last_call_at`.
pub struct ThrottlePermit<'a> {
    guard: MutexGuard<'a, ThrottleState>,
}

impl Throttle {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            state: Mutex::new(ThrottleState::default()),
        }
    }

    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Time still to wait before the next dispatch, if any
    pub fn time_until_available(&self, state: &ThrottleState) -> Option<Duration> {
        let last = state.last_call_at?;
        let elapsed = last.elapsed();
        if elapsed >= self.min_interval {
            None
        } else {
            Some(self.min_interval - elapsed)
        }
    }

    /// Waits for the lock and then for the remaining interval.
    pub async fn acquire(&self) -> ThrottlePermit<'_> {
        let guard = self.state.lock().await;

        if let Some(wait) = self.time_until_available(&guard) {
            debug!(?wait, "Throttling outbound request");
            tokio::time::sleep(wait).await;
        }

        ThrottlePermit { guard }
    }

    pub async fn last_call_at(&self) -> Option<Instant> {
        self.state.lock().await.last_call_at
    }
}

impl Drop for ThrottlePermit<'_> {
    fn drop(&mut self) {
        self.guard.last_call_at = Some(Instant::now());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_not_delayed() {
        let throttle = Throttle::new(Duration::from_secs(1));
        let start = Instant::now();
        drop(throttle.acquire().await);
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert!(throttle.last_call_at().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_sequential_requests_are_spaced() {
        let throttle = Throttle::new(Duration::from_millis(500));

        let permit = throttle.acquire().await;
        let first = Instant::now();
        drop(permit);

        let permit = throttle.acquire().await;
        let second = Instant::now();
        drop(permit);

        assert!(second.duration_since(first) >= Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_wait_once_interval_has_passed() {
        let throttle = Throttle::new(Duration::from_millis(100));
        drop(throttle.acquire().await);

        tokio::time::sleep(Duration::from_millis(250)).await;

        let start = Instant::now();
        drop(throttle.acquire().await);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_are_serialized() {
        let throttle = Arc::new(Throttle::new(Duration::from_millis(200)));
        let mut handles = Vec::new();

        for _ in 0..3 {
            let throttle = throttle.clone();
            handles.push(tokio::spawn(async move {
                let _permit = throttle.acquire().await;
                Instant::now()
            }));
        }

        let mut dispatched = Vec::new();
        for handle in handles {
            dispatched.push(handle.await.unwrap());
        }
        dispatched.sort();

        for pair in dispatched.windows(2) {
            assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(200));
        }
    }
}
