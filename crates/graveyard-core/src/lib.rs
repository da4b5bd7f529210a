//! # graveyard-core
//!
//! Scoring engine for finding "zombie" prompts: prompts whose responses are
//! consistently slow, expensive, off-topic or incoherent.
//!
//! The crate answers three questions for one prompt and its response set:
//! - How well did the responses do on each configured dimension?
//! - Is the prompt a zombie, and how badly?
//! - Which rewrites are most likely to revive it?
//!
//! ## Key Guarantees
//!
//! 1. **No I/O**: Everything here is pure computation over its inputs
//! 2. **Injected randomness**: Judge noise and technique selection draw from
//!    the caller's RNG, so a seeded RNG reproduces a run exactly
//! 3. **No panics**: Degenerate input produces a typed failure result
//!
//! ## Example
//!
//! ```rust,ignore
//! use graveyard_core::{evaluate, GraveyardConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let config = GraveyardConfig::from_file("config/graveyard.yaml")?;
//! let mut rng = StdRng::seed_from_u64(42);
//! let outcome = evaluate(&config, "fix", &responses, &mut rng);
//!
//! if let Some(status) = &outcome.zombie_status {
//!     println!("{}: {}", status.severity, status.reason);
//! }
//! ```

pub mod classifier;
pub mod config;
pub mod metrics;
pub mod revival;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use classifier::ZombieClassifier;
pub use config::{ConfigError, GraveyardConfig, JudgeNoise};
pub use metrics::MetricsCalculator;
pub use revival::{RevivalAgent, Technique};
pub use types::{
    MetricCategory, MetricKind, MetricScore, MetricsFailure, MetricsReport, MetricsResult,
    MetricsSummary, ResponseRecord, RevivalPriority, RevivalSuggestion, ZombieStatus,
};

use indexmap::IndexMap;
use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during evaluation.
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Nothing to score: {0}")]
    NoValidResponses(String),
}

/// Everything the engine concluded about one prompt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PromptEvaluation {
    pub metrics: MetricsResult,

    /// Absent when no response could be scored
    pub zombie_status: Option<ZombieStatus>,

    /// Empty unless the prompt is a zombie
    pub revival_suggestions: Vec<RevivalSuggestion>,
}

impl PromptEvaluation {
    pub fn is_zombie(&self) -> bool {
        self.zombie_status.as_ref().is_some_and(|s| s.is_zombie)
    }

    /// The scored report, or an error carrying the failure text.
    pub fn require_report(&self) -> Result<&MetricsReport, EvaluationError> {
        match &self.metrics {
            MetricsResult::Scored(report) => Ok(report),
            MetricsResult::Failed(failure) => {
                Err(EvaluationError::NoValidResponses(failure.error.clone()))
            }
        }
    }
}

/// The three engine stages wired together.
#[derive(Debug, Clone)]
pub struct Evaluator {
    calculator: MetricsCalculator,
    classifier: ZombieClassifier,
    agent: RevivalAgent,
}

impl Evaluator {
    pub fn new(config: &GraveyardConfig) -> Self {
        Self {
            calculator: MetricsCalculator::from_config(config),
            classifier: ZombieClassifier::from_config(config),
            agent: RevivalAgent::from_config(config),
        }
    }

    /// Score, classify and, for zombies, suggest rewrites.
    pub fn evaluate<R: Rng + ?Sized>(
        &self,
        prompt: &str,
        responses: &IndexMap<String, ResponseRecord>,
        rng: &mut R,
    ) -> PromptEvaluation {
        let metrics = self.calculator.calculate_all_metrics(prompt, responses, rng);

        let Some(report) = metrics.report() else {
            return PromptEvaluation {
                metrics,
                zombie_status: None,
                revival_suggestions: Vec::new(),
            };
        };

        let status = self.classifier.classify_prompt(report);
        let revival_suggestions = if status.is_zombie {
            self.agent
                .generate_revival_suggestions(prompt, report, &status, rng)
        } else {
            Vec::new()
        };

        PromptEvaluation {
            metrics,
            zombie_status: Some(status),
            revival_suggestions,
        }
    }
}

/// Evaluate one prompt's responses against a configuration.
///
/// Convenience wrapper building an [`Evaluator`] for a single call.
pub fn evaluate<R: Rng + ?Sized>(
    config: &GraveyardConfig,
    prompt: &str,
    responses: &IndexMap<String, ResponseRecord>,
    rng: &mut R,
) -> PromptEvaluation {
    Evaluator::new(config).evaluate(prompt, responses, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{
        dead_responses, healthy_responses, sample_config, HEALTHY_PROMPT,
    };
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_zombie_pipeline() {
        let config = sample_config();
        let outcome = evaluate(&config, "fix", &dead_responses(), &mut StdRng::seed_from_u64(1));

        assert!(outcome.is_zombie());
        let status = outcome.zombie_status.as_ref().unwrap();
        assert!(status.failed_critical_metrics.contains(&MetricKind::SemanticAccuracy));
        assert!(!outcome.revival_suggestions.is_empty());
        assert!(outcome.require_report().is_ok());
    }

    #[test]
    fn test_healthy_pipeline_has_no_suggestions() {
        let config = sample_config();
        let outcome = evaluate(
            &config,
            HEALTHY_PROMPT,
            &healthy_responses(),
            &mut StdRng::seed_from_u64(1),
        );
        assert!(!outcome.is_zombie());
        assert!(outcome.revival_suggestions.is_empty());
    }

    #[test]
    fn test_empty_response_set_stops_after_metrics() {
        let config = sample_config();
        let outcome = evaluate(&config, "fix", &IndexMap::new(), &mut StdRng::seed_from_u64(1));

        assert!(outcome.zombie_status.is_none());
        assert!(outcome.revival_suggestions.is_empty());
        assert!(matches!(
            outcome.require_report(),
            Err(EvaluationError::NoValidResponses(_))
        ));

        let json = serde_json::to_value(&outcome.metrics).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "error": "No valid responses to evaluate",
                "total_responses": 0,
                "failed_responses": 0
            })
        );
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let evaluator = Evaluator::new(&sample_config());
        let a = evaluator.evaluate("fix", &dead_responses(), &mut StdRng::seed_from_u64(99));
        let b = evaluator.evaluate("fix", &dead_responses(), &mut StdRng::seed_from_u64(99));
        assert_eq!(a, b);
    }
}
