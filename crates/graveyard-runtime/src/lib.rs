//! # graveyard-runtime
//!
//! Talks to LLM providers on behalf of `graveyard-core`.
//!
//! The core crate only scores response sets it is handed. This crate
//! produces those sets: it fans a prompt out to every configured provider,
//! respects per-provider rate limits, retries transient failures, and appends
//! the finished evaluation to a JSONL results file.
//!
//! ## Important
//!
//! Credentials are never read implicitly. Build a [`CredentialStore`] (the CLI
//! resolves one from the environment at startup) and pass it to
//! [`ProviderRegistry::build_providers`]. An enabled provider without a
//! credential is a construction error, not a silent skip.
//!
//! ## Example
//!
//! ```rust,ignore
//! use graveyard_runtime::{
//!     CredentialStore, PromptRunner, ProviderRegistry, ResponseCollector, RuntimeConfig,
//! };
//!
//! let runtime = RuntimeConfig::from_file("config/graveyard.yaml")?;
//! let credentials = CredentialStore::from_env(&runtime);
//! let providers = ProviderRegistry::with_defaults().build_providers(&runtime, &credentials)?;
//!
//! let collector = ResponseCollector::from_config(providers, &runtime);
//! let runner = PromptRunner::new(&core_config, collector);
//! let record = runner.evaluate_file("prompts/fix.txt", &mut rng).await?;
//! ```

use thiserror::Error;

pub mod collector;
pub mod config;
pub mod providers;
pub mod record;
pub mod resilience;
pub mod runner;

pub use collector::{ProviderHandle, ResponseCollector};
pub use config::{ProviderConfig, RuntimeConfig};
pub use providers::{
    ApiCredential, CredentialSource, CredentialStore, LlmProvider, ProviderError, ProviderKind,
    ProviderRegistry, TokenPricing,
};
pub use record::{prompt_id, EvaluationRecord, ResultsStore, ResultsSummary};
pub use resilience::{ProviderUsage, RateLimiter, UsageTracker};
pub use runner::PromptRunner;

/// Errors from the runtime.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Invalid runtime config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Config(#[from] graveyard_core::ConfigError),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error("No LLM providers enabled")]
    NoProviders,

    #[error("Empty prompt file: {0}")]
    EmptyPrompt(String),

    #[error("Malformed results line {line}: {message}")]
    MalformedRecord { line: usize, message: String },
}
