//! Per-provider usage accounting.

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Accumulated usage for one provider.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderUsage {
    /// Calls that produced a response
    pub calls: u32,

    /// Calls that failed after retries
    pub failures: u32,

    /// Estimated cost in USD
    pub estimated_cost: f64,

    /// Sum of call latencies
    pub total_latency_ms: f64,
}

impl ProviderUsage {
    fn merge(&mut self, other: &ProviderUsage) {
        self.calls += other.calls;
        self.failures += other.failures;
        self.estimated_cost += other.estimated_cost;
        self.total_latency_ms += other.total_latency_ms;
    }

    pub fn attempts(&self) -> u32 {
        self.calls + self.failures
    }
}

/// Usage across a run, shared between concurrent provider calls.
#[derive(Debug, Default)]
pub struct UsageTracker {
    usage: RwLock<IndexMap<String, ProviderUsage>>,
}

impl UsageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self, provider: &str, cost: f64, latency_ms: f64) {
        let mut usage = self.usage.write();
        let entry = usage.entry(provider.to_string()).or_default();
        entry.calls += 1;
        entry.estimated_cost += cost;
        entry.total_latency_ms += latency_ms;
    }

    pub fn record_failure(&self, provider: &str, latency_ms: f64) {
        let mut usage = self.usage.write();
        let entry = usage.entry(provider.to_string()).or_default();
        entry.failures += 1;
        entry.total_latency_ms += latency_ms;
    }

    /// Copy of the per-provider numbers, in first-seen order.
    pub fn snapshot(&self) -> IndexMap<String, ProviderUsage> {
        self.usage.read().clone()
    }

    /// Totals over every provider.
    pub fn total(&self) -> ProviderUsage {
        let mut total = ProviderUsage::default();
        for usage in self.usage.read().values() {
            total.merge(usage);
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_per_provider() {
        let tracker = UsageTracker::new();
        tracker.record_success("openai", 0.002, 800.0);
        tracker.record_success("openai", 0.001, 600.0);
        tracker.record_failure("groq", 30000.0);

        let snapshot = tracker.snapshot();
        assert_eq!(snapshot.keys().collect::<Vec<_>>(), vec!["openai", "groq"]);
        assert_eq!(snapshot["openai"].calls, 2);
        assert!((snapshot["openai"].estimated_cost - 0.003).abs() < 1e-12);
        assert_eq!(snapshot["groq"].failures, 1);
        assert_eq!(snapshot["groq"].calls, 0);

        let total = tracker.total();
        assert_eq!(total.attempts(), 3);
        assert!((total.total_latency_ms - 31400.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_total() {
        assert_eq!(UsageTracker::new().total(), ProviderUsage::default());
    }
}
