//! Sliding-window request rate limiter.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Length of the sliding window.
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Caps calls to one provider per [`RATE_WINDOW`].
///
/// Call instants are kept in arrival order; entries expire once they are a
/// full window old.
#[derive(Debug)]
pub struct RateLimiter {
    requests_per_minute: usize,
    requests: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    pub fn new(requests_per_minute: u32) -> Self {
        Self {
            requests_per_minute: requests_per_minute.max(1) as usize,
            requests: Mutex::new(VecDeque::new()),
        }
    }

    pub fn requests_per_minute(&self) -> usize {
        self.requests_per_minute
    }

    /// Wait until a call is allowed, then record it.
    pub async fn acquire(&self) {
        loop {
            let wait = {
                let mut requests = self.requests.lock().await;
                let now = Instant::now();
                expire(&mut requests, now);

                if requests.len() < self.requests_per_minute {
                    requests.push_back(now);
                    return;
                }

                requests
                    .front()
                    .map(|&oldest| RATE_WINDOW.saturating_sub(now.duration_since(oldest)))
                    .unwrap_or_default()
            };

            tracing::warn!(
                limit = self.requests_per_minute,
                wait = ?wait,
                "Rate limit reached, waiting"
            );
            tokio::time::sleep(wait).await;
        }
    }

    /// Calls recorded in the current window.
    pub async fn in_window(&self) -> usize {
        let mut requests = self.requests.lock().await;
        expire(&mut requests, Instant::now());
        requests.len()
    }
}

fn expire(requests: &mut VecDeque<Instant>, now: Instant) {
    while let Some(&front) = requests.front() {
        if now.duration_since(front) >= RATE_WINDOW {
            requests.pop_front();
        } else {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_under_limit_does_not_wait() {
        let limiter = RateLimiter::new(5);
        let start = Instant::now();

        for _ in 0..5 {
            limiter.acquire().await;
        }

        assert!(start.elapsed() < Duration::from_secs(1));
        assert_eq!(limiter.in_window().await, 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_saturated_window_waits_for_oldest() {
        let limiter = RateLimiter::new(2);
        let start = Instant::now();

        limiter.acquire().await;
        tokio::time::sleep(Duration::from_secs(10)).await;
        limiter.acquire().await;

        // Third call waits until the first is a full window old
        limiter.acquire().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= RATE_WINDOW, "waited only {:?}", elapsed);
        assert!(elapsed < RATE_WINDOW + Duration::from_secs(1));
        assert_eq!(limiter.in_window().await, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire() {
        let limiter = RateLimiter::new(3);
        limiter.acquire().await;
        limiter.acquire().await;
        tokio::time::sleep(RATE_WINDOW).await;
        assert_eq!(limiter.in_window().await, 0);
    }

    #[test]
    fn test_zero_limit_clamped() {
        assert_eq!(RateLimiter::new(0).requests_per_minute(), 1);
    }

    proptest! {
        #[test]
        fn prop_window_never_exceeds_limit(
            rpm in 1u32..6,
            gaps in prop::collection::vec(0u64..30_000, 1..20),
        ) {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_time()
                .start_paused(true)
                .build()
                .unwrap();

            let granted = runtime.block_on(async {
                let limiter = RateLimiter::new(rpm);
                let mut granted = Vec::with_capacity(gaps.len());
                for gap in &gaps {
                    tokio::time::sleep(Duration::from_millis(*gap)).await;
                    limiter.acquire().await;
                    granted.push(Instant::now());
                }
                granted
            });

            for (i, &start) in granted.iter().enumerate() {
                let in_window = granted[i..]
                    .iter()
                    .take_while(|&&t| t.duration_since(start) < RATE_WINDOW)
                    .count();
                prop_assert!(in_window <= rpm as usize);
            }
        }
    }
}
