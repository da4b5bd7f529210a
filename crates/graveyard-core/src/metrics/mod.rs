//! Multi-dimensional response scoring.
//!
//! The calculator scores every configured dimension over the valid responses
//! in a set, maps each raw value through its threshold table, and folds the
//! normalized scores into a weighted overall score.

mod heuristics;
mod patterns;
mod scoring;

pub use heuristics::{
    scorer_for, CoherenceScorer, CreativityScorer, ResponseScorer, SemanticAccuracyScorer,
};
pub use scoring::{score_against_thresholds, weighted_score, UNMATCHED_SCORE};

use indexmap::IndexMap;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use sha2::{Digest, Sha256};

use crate::config::{GraveyardConfig, JudgeNoise, MetricConfig};
use crate::types::{
    MetricKind, MetricScore, MetricsFailure, MetricsReport, MetricsResult, MetricsSummary,
    ResponseRecord,
};
use patterns::is_too_short;
use scoring::mean;

/// Error text of the degenerate result.
pub const NO_VALID_RESPONSES: &str = "No valid responses to evaluate";

/// Substituted for a response whose heuristic score is unusable.
pub const NEUTRAL_SCORE: f64 = 0.5;

/// Half-width of simulated judge noise.
pub const JUDGE_NOISE_AMPLITUDE: f64 = 0.1;

/// Scores response sets against the configured metric dimensions.
#[derive(Debug, Clone)]
pub struct MetricsCalculator {
    metrics: IndexMap<MetricKind, MetricConfig>,
}

impl MetricsCalculator {
    pub fn new(metrics: IndexMap<MetricKind, MetricConfig>) -> Self {
        Self { metrics }
    }

    pub fn from_config(config: &GraveyardConfig) -> Self {
        Self::new(config.evaluation_metrics.clone())
    }

    /// Score one prompt's response set.
    ///
    /// Records with an error or without text are excluded. If none remain,
    /// the degenerate failure result is returned and no dimension is scored.
    pub fn calculate_all_metrics<R: Rng + ?Sized>(
        &self,
        prompt: &str,
        responses: &IndexMap<String, ResponseRecord>,
        rng: &mut R,
    ) -> MetricsResult {
        let valid: Vec<(&str, &ResponseRecord, &str)> = responses
            .iter()
            .filter_map(|(provider, record)| {
                record
                    .valid_text()
                    .map(|text| (provider.as_str(), record, text))
            })
            .collect();

        if valid.is_empty() {
            tracing::warn!(total = responses.len(), "No valid responses to score");
            return MetricsResult::Failed(MetricsFailure {
                error: NO_VALID_RESPONSES.to_string(),
                total_responses: responses.len(),
                failed_responses: responses.len(),
            });
        }

        let latencies: Vec<f64> = valid.iter().map(|(_, r, _)| r.latency_ms).collect();
        let total_cost: f64 = valid.iter().map(|(_, r, _)| r.cost_usd).sum();

        let mut scores = IndexMap::new();
        for kind in MetricKind::ALL {
            let Some(config) = self.metrics.get(&kind) else {
                continue;
            };

            if !config.applies_to(prompt) {
                tracing::debug!(metric = %kind, "Metric not enabled for this prompt, skipping");
                continue;
            }

            let value = match kind {
                MetricKind::Latency => mean(&latencies),
                MetricKind::CostEfficiency => total_cost,
                _ => self.text_metric(kind, config, prompt, &valid, rng),
            };

            let (normalized_score, category) = score_against_thresholds(value, &config.scoring);
            tracing::debug!(metric = %kind, value, normalized_score, category = %category, "Metric scored");

            scores.insert(
                kind,
                MetricScore {
                    value,
                    normalized_score,
                    category,
                    weight: config.weight,
                },
            );
        }

        let overall_score = weighted_score(&scores);

        MetricsResult::Scored(MetricsReport {
            scores,
            summary: MetricsSummary {
                overall_score,
                total_responses: valid.len(),
                failed_responses: responses.len() - valid.len(),
                avg_latency_ms: mean(&latencies),
                total_cost_usd: total_cost,
            },
        })
    }

    /// Mean heuristic score for a text dimension.
    fn text_metric<R: Rng + ?Sized>(
        &self,
        kind: MetricKind,
        config: &MetricConfig,
        prompt: &str,
        valid: &[(&str, &ResponseRecord, &str)],
        rng: &mut R,
    ) -> f64 {
        let Some(scorer) = scorer_for(kind) else {
            return 0.0;
        };

        if config.scoring_method.as_deref() == Some("llm_judge") {
            tracing::debug!(metric = %kind, "LLM judge requested, scoring heuristically");
        }

        let texts: Vec<(&str, &str)> = valid.iter().map(|(p, _, t)| (*p, *t)).collect();
        score_responses(scorer.as_ref(), config.judge_noise, prompt, &texts, rng)
    }
}

/// Mean of one scorer over `(provider, text)` pairs.
///
/// An unusable score counts as [`NEUTRAL_SCORE`] for that response only.
/// Judge noise is not applied to the short-response floor.
pub fn score_responses<R: Rng + ?Sized>(
    scorer: &dyn ResponseScorer,
    noise: JudgeNoise,
    prompt: &str,
    texts: &[(&str, &str)],
    rng: &mut R,
) -> f64 {
    let per_response: Vec<f64> = texts
        .iter()
        .map(|(provider, text)| {
            let raw = scorer.score(prompt, text);
            if !raw.is_finite() {
                tracing::warn!(
                    metric = %scorer.kind(),
                    provider = %provider,
                    "Heuristic score unusable, using neutral score"
                );
                return NEUTRAL_SCORE;
            }
            if scorer.simulates_judge() && !is_too_short(text) {
                (raw + judge_noise(noise, prompt, text, &mut *rng)).clamp(0.0, 1.0)
            } else {
                raw
            }
        })
        .collect();

    mean(&per_response)
}

/// Noise in `[-0.1, 0.1)` imitating the variance of a sampled judge.
pub fn judge_noise<R: Rng + ?Sized>(
    mode: JudgeNoise,
    prompt: &str,
    response: &str,
    rng: &mut R,
) -> f64 {
    match mode {
        JudgeNoise::Random => rng.random_range(-JUDGE_NOISE_AMPLITUDE..JUDGE_NOISE_AMPLITUDE),
        JudgeNoise::PerInput => {
            let mut hasher = Sha256::new();
            hasher.update(prompt.as_bytes());
            hasher.update([0u8]);
            hasher.update(response.as_bytes());
            StdRng::from_seed(hasher.finalize().into())
                .random_range(-JUDGE_NOISE_AMPLITUDE..JUDGE_NOISE_AMPLITUDE)
        }
        JudgeNoise::Off => 0.0,
    }
}
