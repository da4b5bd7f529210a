//! Evaluation configuration.
//!
//! Configurations are YAML or JSON documents validated against an embedded
//! JSON Schema before they are deserialized into typed structs.

mod parser;
mod schema;

pub use parser::{
    ConfigError, CriticalMetric, GraveyardConfig, JudgeNoise, MetricConfig, RevivalConfig,
    ScoreRange, SeverityLevel, StrategyConfig, Threshold, ZombieConfig,
};
pub use schema::{is_valid_config, validate_config_schema};
