//! Scoring primitives: threshold lookup and weighted aggregation.

use indexmap::IndexMap;

use crate::config::Threshold;
use crate::types::{MetricCategory, MetricKind, MetricScore};

/// Normalized score used when no threshold row covers a value.
pub const UNMATCHED_SCORE: f64 = 0.2;

/// Map a raw value to `(normalized_score, category)`.
///
/// Rows are checked in configuration order and the first inclusive match
/// wins. Values outside every row fall back to a low zombie score.
pub fn score_against_thresholds(
    value: f64,
    scoring: &IndexMap<MetricCategory, Threshold>,
) -> (f64, MetricCategory) {
    for (category, threshold) in scoring {
        if threshold.contains(value) {
            return (threshold.score, *category);
        }
    }

    tracing::warn!(value, "No threshold matched, defaulting to zombie");
    (UNMATCHED_SCORE, MetricCategory::Zombie)
}

/// Weighted mean of normalized scores; 0.0 when the total weight is zero.
pub fn weighted_score(scores: &IndexMap<MetricKind, MetricScore>) -> f64 {
    let (weighted_sum, total_weight) = scores
        .values()
        .fold((0.0, 0.0), |(sum, total), s| {
            (sum + s.normalized_score * s.weight, total + s.weight)
        });

    if total_weight > 0.0 {
        weighted_sum / total_weight
    } else {
        0.0
    }
}

pub(crate) fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample (n - 1) standard deviation.
pub(crate) fn sample_stdev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance =
        values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}
