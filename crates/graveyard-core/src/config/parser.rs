//! Configuration parsing from YAML/JSON.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_config_schema;
use crate::revival::Technique;
use crate::types::{MetricCategory, MetricKind, RevivalPriority};

/// Errors that can occur when loading a configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config does not match schema: {}", .0.join("; "))]
    SchemaError(Vec<String>),

    #[error("Config validation failed: {0}")]
    ValidationError(String),
}

/// One row of a threshold table. Bounds are inclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Threshold {
    pub min: f64,

    #[serde(default = "unbounded")]
    pub max: f64,

    /// Normalized score assigned to values in range
    pub score: f64,
}

impl Threshold {
    pub fn contains(&self, value: f64) -> bool {
        self.min <= value && value <= self.max
    }
}

fn unbounded() -> f64 {
    f64::MAX
}

/// How per-response noise is applied to heuristic judge scores.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JudgeNoise {
    /// Uniform noise from the caller's random source
    #[default]
    Random,
    /// Noise derived from the prompt and response text, stable across runs
    PerInput,
    /// No noise
    Off,
}

/// Configuration for a single metric dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricConfig {
    /// Relative weight in the overall score
    pub weight: f64,

    /// Threshold table, checked in order
    pub scoring: IndexMap<MetricCategory, Threshold>,

    /// Scoring method label (`heuristic`, `llm_judge`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scoring_method: Option<String>,

    /// Prompt substrings that enable this metric; empty means always
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enabled_for_prompts: Vec<String>,

    /// Judge prompt template for LLM-judged scoring
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_prompt: Option<String>,

    #[serde(default)]
    pub judge_noise: JudgeNoise,
}

impl MetricConfig {
    /// Whether the metric applies to a prompt.
    pub fn applies_to(&self, prompt: &str) -> bool {
        if self.enabled_for_prompts.is_empty() {
            return true;
        }
        let lowered = prompt.to_lowercase();
        self.enabled_for_prompts
            .iter()
            .any(|pattern| lowered.contains(&pattern.to_lowercase()))
    }
}

/// A metric whose raw value must stay at or above a floor.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CriticalMetric {
    pub metric: MetricKind,
    pub threshold: f64,
}

/// Inclusive score range for a severity tier.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct ScoreRange {
    pub min: f64,
    pub max: f64,
}

impl ScoreRange {
    pub fn contains(&self, score: f64) -> bool {
        self.min <= score && score <= self.max
    }
}

/// A named severity tier.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeverityLevel {
    pub score_range: ScoreRange,
    pub visual_theme: String,
    pub revival_priority: RevivalPriority,
}

/// Classifier configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ZombieConfig {
    pub overall_threshold: f64,

    #[serde(default)]
    pub critical_metrics: Vec<CriticalMetric>,

    /// Tiers checked in order; the first containing the score wins
    #[serde(default)]
    pub severity_levels: IndexMap<String, SeverityLevel>,
}

/// A named group of rewrite techniques.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub techniques: Vec<String>,

    /// Base confidence for suggestions from this strategy
    pub weight: f64,
}

/// Revival agent configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RevivalConfig {
    #[serde(default)]
    pub improvement_strategies: IndexMap<String, StrategyConfig>,

    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

impl Default for RevivalConfig {
    fn default() -> Self {
        Self {
            improvement_strategies: IndexMap::new(),
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

fn default_suggestion_limit() -> usize {
    3
}

/// Full evaluation configuration.
///
/// Unknown top-level sections (provider definitions, output paths) are
/// ignored here so one file can drive both the engine and the runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraveyardConfig {
    pub evaluation_metrics: IndexMap<MetricKind, MetricConfig>,

    pub zombie_classification: ZombieConfig,

    #[serde(default)]
    pub revival_agent: RevivalConfig,
}

impl GraveyardConfig {
    /// Parse a configuration from a YAML string.
    ///
    /// The typed config is read straight from the text so ordered tables
    /// keep the order they were written in.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        check_schema(&value)?;
        let config: GraveyardConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        check_schema(&value)?;
        let config: GraveyardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration file, choosing the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    /// Validate against the schema, then deserialize and check semantics.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ConfigError> {
        check_schema(&value)?;
        let config: GraveyardConfig = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    pub fn metric(&self, kind: MetricKind) -> Option<&MetricConfig> {
        self.evaluation_metrics.get(&kind)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        for (kind, metric) in &self.evaluation_metrics {
            if !metric.weight.is_finite() || metric.weight < 0.0 {
                return Err(ConfigError::ValidationError(format!(
                    "{}: weight must be a non-negative number",
                    kind
                )));
            }
            for (category, threshold) in &metric.scoring {
                if threshold.min > threshold.max {
                    return Err(ConfigError::ValidationError(format!(
                        "{}.scoring.{}: min {} exceeds max {}",
                        kind, category, threshold.min, threshold.max
                    )));
                }
                if !(0.0..=1.0).contains(&threshold.score) {
                    return Err(ConfigError::ValidationError(format!(
                        "{}.scoring.{}: score {} outside [0, 1]",
                        kind, category, threshold.score
                    )));
                }
            }
        }

        for (name, level) in &self.zombie_classification.severity_levels {
            if level.score_range.min > level.score_range.max {
                return Err(ConfigError::ValidationError(format!(
                    "severity level '{}': min exceeds max",
                    name
                )));
            }
        }

        for critical in &self.zombie_classification.critical_metrics {
            if !self.evaluation_metrics.contains_key(&critical.metric) {
                tracing::warn!(
                    metric = %critical.metric,
                    "Critical metric is not configured for evaluation and will never fire"
                );
            }
        }

        // Unknown techniques are a runtime no-op, so only warn.
        for (strategy, cfg) in &self.revival_agent.improvement_strategies {
            for technique in &cfg.techniques {
                if Technique::parse(technique).is_none() {
                    tracing::warn!(strategy = %strategy, technique = %technique, "Unknown revival technique");
                }
            }
        }

        Ok(())
    }
}

fn check_schema(value: &serde_json::Value) -> Result<(), ConfigError> {
    validate_config_schema(value).map_err(ConfigError::SchemaError)
}
