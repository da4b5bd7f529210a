//! Revival agent: proposes rewrites for zombie prompts.
//!
//! Each configured strategy contributes at most one suggestion. A strategy
//! picks a technique that targets the prompt's active problems when it can,
//! applies it, and attaches a confidence estimate and the improvements the
//! rewrite is expected to bring.

mod problems;
mod technique;

pub use problems::{Problem, ProblemAnalysis};
pub use technique::{Placement, Technique};

use indexmap::IndexMap;
use rand::Rng;

use crate::config::{GraveyardConfig, RevivalConfig, StrategyConfig};
use crate::types::{MetricKind, MetricsReport, RevivalSuggestion, ZombieStatus};

/// Expected improvements never exceed this.
pub const MAX_EXPECTED_IMPROVEMENT: f64 = 0.5;

/// Multiplier on expected improvement for a metric that is currently a problem.
const PROBLEM_BOOST: f64 = 1.5;

const MIN_CONFIDENCE: f64 = 0.1;
const MAX_CONFIDENCE: f64 = 1.0;

/// Generates ranked rewrite suggestions.
#[derive(Debug, Clone)]
pub struct RevivalAgent {
    config: RevivalConfig,
}

impl RevivalAgent {
    pub fn new(config: RevivalConfig) -> Self {
        Self { config }
    }

    pub fn from_config(config: &GraveyardConfig) -> Self {
        Self::new(config.revival_agent.clone())
    }

    pub fn suggestion_limit(&self) -> usize {
        self.config.suggestion_limit
    }

    /// Up to `suggestion_limit` suggestions, highest confidence first.
    ///
    /// Strategies are visited in configuration order and visiting stops once
    /// the limit is reached. Equal confidences keep that order.
    pub fn generate_revival_suggestions<R: Rng + ?Sized>(
        &self,
        prompt: &str,
        report: &MetricsReport,
        status: &ZombieStatus,
        rng: &mut R,
    ) -> Vec<RevivalSuggestion> {
        let analysis = ProblemAnalysis::analyze(report, status);
        let limit = self.config.suggestion_limit;
        tracing::debug!(
            problems = ?analysis.active().iter().map(|p| p.as_str()).collect::<Vec<_>>(),
            "Analyzing zombie prompt for revival"
        );

        let mut suggestions = Vec::new();
        for (strategy, strategy_config) in &self.config.improvement_strategies {
            if suggestions.len() >= limit {
                break;
            }
            if let Some(suggestion) =
                self.strategy_suggestion(prompt, strategy, strategy_config, &analysis, rng)
            {
                suggestions.push(suggestion);
            }
        }

        suggestions.sort_by(|a, b| b.confidence_score.total_cmp(&a.confidence_score));
        suggestions.truncate(limit);

        tracing::info!(count = suggestions.len(), "Generated revival suggestions");
        suggestions
    }

    fn strategy_suggestion<R: Rng + ?Sized>(
        &self,
        prompt: &str,
        strategy: &str,
        config: &StrategyConfig,
        analysis: &ProblemAnalysis,
        rng: &mut R,
    ) -> Option<RevivalSuggestion> {
        let name = select_technique(&config.techniques, analysis, rng)?;

        let Some(technique) = Technique::parse(name) else {
            tracing::warn!(strategy = %strategy, technique = %name, "Unknown technique, skipping strategy");
            return None;
        };

        let improved_prompt = technique.apply(prompt, rng);
        if improved_prompt == prompt {
            return None;
        }

        Some(RevivalSuggestion {
            improved_prompt,
            strategy: strategy.to_string(),
            technique: technique.as_str().to_string(),
            reasoning: reasoning(strategy, technique, analysis),
            confidence_score: confidence(config.weight, analysis, rng),
            expected_improvements: expected_improvements(technique, analysis),
        })
    }
}

/// Pick uniformly among the strategy's techniques that target an active
/// problem; if none do, among all of them.
fn select_technique<'a, R: Rng + ?Sized>(
    techniques: &'a [String],
    analysis: &ProblemAnalysis,
    rng: &mut R,
) -> Option<&'a str> {
    if techniques.is_empty() {
        return None;
    }

    let targeted: Vec<&String> = techniques
        .iter()
        .filter(|name| Technique::parse(name).is_some_and(|t| analysis.prefers(t)))
        .collect();

    let chosen = if targeted.is_empty() {
        &techniques[rng.random_range(0..techniques.len())]
    } else {
        targeted[rng.random_range(0..targeted.len())]
    };
    Some(chosen.as_str())
}

fn reasoning(strategy: &str, technique: Technique, analysis: &ProblemAnalysis) -> String {
    if analysis.active().is_empty() {
        return format!(
            "Applied {} technique from {} strategy for general improvement",
            technique, strategy
        );
    }

    let descriptions: Vec<&str> = analysis.active().iter().map(|p| p.description()).collect();
    format!(
        "Applied {} technique from {} strategy to address: {}",
        technique,
        strategy,
        descriptions.join(", ")
    )
}

fn confidence<R: Rng + ?Sized>(weight: f64, analysis: &ProblemAnalysis, rng: &mut R) -> f64 {
    let problem_boost = (0.1 * analysis.count() as f64).min(0.3);
    let jitter = rng.random_range(-0.1..0.1);
    (weight + problem_boost + jitter).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

fn expected_improvements(
    technique: Technique,
    analysis: &ProblemAnalysis,
) -> IndexMap<MetricKind, f64> {
    technique
        .base_improvements()
        .iter()
        .map(|(metric, base)| {
            let boost = if analysis.is_active(Problem::for_metric(*metric)) {
                PROBLEM_BOOST
            } else {
                1.0
            };
            (*metric, (base * boost).min(MAX_EXPECTED_IMPROVEMENT))
        })
        .collect()
}
