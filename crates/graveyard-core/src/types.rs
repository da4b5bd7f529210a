//! Core data types for prompt evaluation.
//!
//! These types are the wire format of persisted evaluation records, so their
//! serde shapes are part of the public contract.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One provider's answer to a prompt.
///
/// A record with an `error`, or without text, is invalid and never scored.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ResponseRecord {
    /// Generated text
    #[serde(rename = "response", default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// Wall-clock latency of the provider call
    #[serde(default)]
    pub latency_ms: f64,

    /// Estimated cost of the call in USD
    #[serde(default)]
    pub cost_usd: f64,

    /// Model that produced the response
    #[serde(default)]
    pub model: String,

    /// Failure description, if the call failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// RFC 3339 time the response was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl ResponseRecord {
    /// A successful response.
    pub fn success(
        text: impl Into<String>,
        latency_ms: f64,
        cost_usd: f64,
        model: impl Into<String>,
    ) -> Self {
        Self {
            text: Some(text.into()),
            latency_ms,
            cost_usd,
            model: model.into(),
            error: None,
            timestamp: None,
        }
    }

    /// A failed provider call.
    pub fn failure(error: impl Into<String>, latency_ms: f64, model: impl Into<String>) -> Self {
        Self {
            text: None,
            latency_ms,
            cost_usd: 0.0,
            model: model.into(),
            error: Some(error.into()),
            timestamp: None,
        }
    }

    /// Attach a receive timestamp.
    pub fn with_timestamp(mut self, timestamp: impl Into<String>) -> Self {
        self.timestamp = Some(timestamp.into());
        self
    }

    /// Valid records carry text and no error.
    pub fn is_valid(&self) -> bool {
        self.text.is_some() && self.error.is_none()
    }

    /// Text of a valid record.
    pub fn valid_text(&self) -> Option<&str> {
        if self.error.is_some() {
            return None;
        }
        self.text.as_deref()
    }
}

/// The quality dimensions the engine can score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    SemanticAccuracy,
    Coherence,
    Latency,
    CostEfficiency,
    Creativity,
}

impl MetricKind {
    /// All dimensions in canonical evaluation order.
    pub const ALL: [MetricKind; 5] = [
        MetricKind::Latency,
        MetricKind::CostEfficiency,
        MetricKind::SemanticAccuracy,
        MetricKind::Coherence,
        MetricKind::Creativity,
    ];

    /// Configuration key for this dimension.
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricKind::SemanticAccuracy => "semantic_accuracy",
            MetricKind::Coherence => "coherence",
            MetricKind::Latency => "latency",
            MetricKind::CostEfficiency => "cost_efficiency",
            MetricKind::Creativity => "creativity",
        }
    }

    /// Parse a configuration key.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == name)
    }
}

impl fmt::Display for MetricKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative band a metric value falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricCategory {
    Excellent,
    Good,
    Acceptable,
    Poor,
    Zombie,
}

impl MetricCategory {
    /// Categories that mark a dimension as a problem worth reviving.
    pub fn is_problem(&self) -> bool {
        matches!(self, MetricCategory::Poor | MetricCategory::Zombie)
    }
}

impl fmt::Display for MetricCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MetricCategory::Excellent => "excellent",
            MetricCategory::Good => "good",
            MetricCategory::Acceptable => "acceptable",
            MetricCategory::Poor => "poor",
            MetricCategory::Zombie => "zombie",
        };
        f.write_str(s)
    }
}

/// Score for a single dimension.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricScore {
    /// Raw measured value (ms, USD, or heuristic score)
    pub value: f64,

    /// Score in [0, 1] assigned by the threshold table
    pub normalized_score: f64,

    /// Band the value fell into
    pub category: MetricCategory,

    /// Weight of the dimension in the aggregate
    pub weight: f64,
}

/// Aggregate numbers over one response set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSummary {
    pub overall_score: f64,
    pub total_responses: usize,
    pub failed_responses: usize,
    pub avg_latency_ms: f64,
    pub total_cost_usd: f64,
}

/// Scored dimensions plus summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsReport {
    /// Per-dimension scores in evaluation order
    #[serde(flatten)]
    pub scores: IndexMap<MetricKind, MetricScore>,

    pub summary: MetricsSummary,
}

impl MetricsReport {
    pub fn get(&self, kind: MetricKind) -> Option<&MetricScore> {
        self.scores.get(&kind)
    }

    pub fn overall_score(&self) -> f64 {
        self.summary.overall_score
    }
}

/// Degenerate result when nothing could be scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsFailure {
    pub error: String,
    pub total_responses: usize,
    pub failed_responses: usize,
}

/// Output of the metrics calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricsResult {
    /// Nothing to score. Listed first so a record with an `error` key
    /// never deserializes as an empty report.
    Failed(MetricsFailure),
    Scored(MetricsReport),
}

impl MetricsResult {
    pub fn report(&self) -> Option<&MetricsReport> {
        match self {
            MetricsResult::Scored(report) => Some(report),
            MetricsResult::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, MetricsResult::Failed(_))
    }
}

/// Urgency of fixing a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevivalPriority {
    None,
    Low,
    Medium,
    High,
}

impl fmt::Display for RevivalPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RevivalPriority::None => "none",
            RevivalPriority::Low => "low",
            RevivalPriority::Medium => "medium",
            RevivalPriority::High => "high",
        };
        f.write_str(s)
    }
}

/// Health verdict for a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZombieStatus {
    pub is_zombie: bool,
    pub overall_score: f64,
    pub severity: String,
    pub visual_theme: String,
    pub revival_priority: RevivalPriority,
    pub failed_critical_metrics: Vec<MetricKind>,
    pub reason: String,
}

/// A proposed rewrite of a prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevivalSuggestion {
    pub improved_prompt: String,
    pub strategy: String,
    pub technique: String,
    pub reasoning: String,
    pub confidence_score: f64,
    pub expected_improvements: IndexMap<MetricKind, f64>,
}
