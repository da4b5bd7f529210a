//! Retry with exponential backoff.

use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use std::time::Duration;

use crate::providers::ProviderError;

/// Backoff schedule for provider calls: 500ms doubling up to 8s.
pub fn backoff_policy(max_retries: usize) -> ExponentialBuilder {
    ExponentialBuilder::default()
        .with_min_delay(Duration::from_millis(500))
        .with_max_delay(Duration::from_secs(8))
        .with_max_times(max_retries)
}

/// Run `operation`, retrying transient failures up to `max_retries` times.
pub async fn with_retries<T, F, Fut>(
    provider: &str,
    max_retries: usize,
    operation: F,
) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    operation
        .retry(backoff_policy(max_retries))
        .when(ProviderError::is_transient)
        .notify(|error: &ProviderError, delay: Duration| {
            tracing::warn!(provider, error = %error, delay = ?delay, "Transient provider failure, retrying");
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn overloaded() -> ProviderError {
        ProviderError::ApiError {
            status: 503,
            message: "overloaded".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failures_are_retried() {
        let calls = &AtomicUsize::new(0);
        let result = with_retries("p", 2, move || async move {
            if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(overloaded())
            } else {
                Ok("ok")
            }
        })
        .await;

        assert_eq!(result.unwrap(), "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_are_bounded() {
        let calls = &AtomicUsize::new(0);
        let result: Result<(), _> = with_retries("p", 2, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(overloaded())
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let calls = &AtomicUsize::new(0);
        let result: Result<(), _> = with_retries("p", 5, move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Err(ProviderError::ApiError {
                status: 401,
                message: "bad key".to_string(),
            })
        })
        .await;

        assert!(matches!(result, Err(ProviderError::ApiError { status: 401, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
