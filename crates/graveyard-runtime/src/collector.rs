//! Concurrent response collection.
//!
//! Every provider answers the same prompt at the same time. A failed call
//! becomes a [`ResponseRecord`] carrying the error, so the metrics step sees
//! it as invalid instead of the whole collection failing.

use futures::future::join_all;
use graveyard_core::ResponseRecord;
use indexmap::IndexMap;
use std::sync::Arc;
use tokio::time::Instant;

use crate::config::RuntimeConfig;
use crate::providers::{LlmProvider, ProviderError};
use crate::resilience::{with_retries, RateLimiter, UsageTracker};

/// A provider together with its rate limit and retry budget.
pub struct ProviderHandle {
    provider: Arc<dyn LlmProvider>,
    limiter: RateLimiter,
    max_retries: usize,
}

impl std::fmt::Debug for ProviderHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderHandle")
            .field("provider", &self.provider.name())
            .field("limiter", &self.limiter)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl ProviderHandle {
    pub fn new(provider: Arc<dyn LlmProvider>, requests_per_minute: u32, max_retries: usize) -> Self {
        Self {
            provider,
            limiter: RateLimiter::new(requests_per_minute),
            max_retries,
        }
    }

    pub fn name(&self) -> &str {
        self.provider.name()
    }

    /// Query the provider once (plus retries) and record the outcome.
    async fn call(&self, prompt: &str, usage: &UsageTracker) -> ResponseRecord {
        let provider = self.provider.as_ref();
        let limiter = &self.limiter;
        let started = Instant::now();

        let result = with_retries(provider.name(), self.max_retries, move || async move {
            limiter.acquire().await;
            let attempt = Instant::now();
            let text = provider.respond(prompt).await?;
            Ok::<_, ProviderError>((text, attempt.elapsed().as_secs_f64() * 1000.0))
        })
        .await;

        let timestamp = chrono::Utc::now().to_rfc3339();
        match result {
            Ok((text, latency_ms)) => {
                let cost = provider.estimate_cost(prompt, &text);
                usage.record_success(provider.name(), cost, latency_ms);
                tracing::debug!(
                    provider = provider.name(),
                    latency_ms,
                    cost,
                    "Provider responded"
                );
                ResponseRecord::success(text, latency_ms, cost, provider.model())
                    .with_timestamp(timestamp)
            }
            Err(error) => {
                let latency_ms = started.elapsed().as_secs_f64() * 1000.0;
                usage.record_failure(provider.name(), latency_ms);
                tracing::warn!(provider = provider.name(), error = %error, "Provider call failed");
                ResponseRecord::failure(error.to_string(), latency_ms, provider.model())
                    .with_timestamp(timestamp)
            }
        }
    }
}

/// Fans a prompt out to every provider.
#[derive(Debug, Default)]
pub struct ResponseCollector {
    handles: Vec<ProviderHandle>,
    usage: Arc<UsageTracker>,
}

impl ResponseCollector {
    pub fn new(handles: Vec<ProviderHandle>) -> Self {
        Self {
            handles,
            usage: Arc::new(UsageTracker::new()),
        }
    }

    /// Wrap built providers with the limits from their configuration.
    pub fn from_config(providers: Vec<Arc<dyn LlmProvider>>, config: &RuntimeConfig) -> Self {
        let handles = providers
            .into_iter()
            .map(|provider| {
                let (rpm, retries) = config
                    .llm_providers
                    .get(provider.name())
                    .map(|c| (c.requests_per_minute, c.max_retries))
                    .unwrap_or((60, 2));
                ProviderHandle::new(provider, rpm, retries)
            })
            .collect();
        Self::new(handles)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn usage(&self) -> Arc<UsageTracker> {
        Arc::clone(&self.usage)
    }

    /// Responses keyed by provider id, in provider order.
    pub async fn collect(&self, prompt: &str) -> IndexMap<String, ResponseRecord> {
        let usage = self.usage.as_ref();
        let records = join_all(self.handles.iter().map(|h| h.call(prompt, usage))).await;

        self.handles
            .iter()
            .map(|h| h.name().to_string())
            .zip(records)
            .collect()
    }
}
