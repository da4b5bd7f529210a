//! Runtime sections of the configuration file.
//!
//! The same YAML/JSON file feeds both crates: `graveyard-core` reads the
//! scoring sections, this module reads `llm_providers` and `results_path`
//! and ignores the rest.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::providers::{ProviderKind, TokenPricing};
use crate::RuntimeError;

pub const DEFAULT_RESULTS_PATH: &str = "data/results.jsonl";

/// One configured LLM endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Display name
    pub name: String,

    /// Wire protocol
    pub provider: ProviderKind,

    pub model: String,

    /// Overrides the protocol's default endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_endpoint: Option<String>,

    /// Environment variable holding the API key
    pub api_key_env: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Per-call timeout, integer seconds or a human duration ("30s", "1m")
    #[serde(default = "default_timeout", with = "duration_human")]
    pub timeout: Duration,

    #[serde(default)]
    pub cost_per_token: TokenPricing,

    #[serde(default = "default_enabled")]
    pub enabled: bool,

    #[serde(default = "default_requests_per_minute")]
    pub requests_per_minute: u32,

    /// Extra attempts after a transient failure
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_enabled() -> bool {
    true
}

fn default_requests_per_minute() -> u32 {
    60
}

fn default_max_retries() -> usize {
    2
}

impl ProviderConfig {
    /// Configured endpoint, or the protocol default.
    pub fn endpoint(&self) -> &str {
        self.api_endpoint
            .as_deref()
            .unwrap_or_else(|| self.provider.default_endpoint())
    }
}

mod duration_human {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Secs(u64),
        Human(String),
    }

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Raw::deserialize(deserializer)? {
            Raw::Secs(secs) => Ok(Duration::from_secs(secs)),
            Raw::Human(text) => humantime::parse_duration(&text).map_err(serde::de::Error::custom),
        }
    }
}

/// Provider and storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub llm_providers: IndexMap<String, ProviderConfig>,

    #[serde(default = "default_results_path")]
    pub results_path: PathBuf,
}

fn default_results_path() -> PathBuf {
    PathBuf::from(DEFAULT_RESULTS_PATH)
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            llm_providers: IndexMap::new(),
            results_path: default_results_path(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, RuntimeError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, RuntimeError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file, choosing the format by extension.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RuntimeError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&content),
            _ => Self::from_yaml(&content),
        }
    }

    /// Enabled providers in configuration order.
    pub fn enabled_providers(&self) -> impl Iterator<Item = (&String, &ProviderConfig)> {
        self.llm_providers.iter().filter(|(_, p)| p.enabled)
    }

    fn validate(&self) -> Result<(), RuntimeError> {
        for (id, provider) in &self.llm_providers {
            if provider.requests_per_minute == 0 {
                return Err(RuntimeError::InvalidConfig(format!(
                    "provider '{}': requests_per_minute must be at least 1",
                    id
                )));
            }
            if provider.timeout.is_zero() {
                return Err(RuntimeError::InvalidConfig(format!(
                    "provider '{}': timeout must be positive",
                    id
                )));
            }
            let endpoint = provider.endpoint();
            if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
                return Err(RuntimeError::InvalidConfig(format!(
                    "provider '{}': api_endpoint must start with http:// or https://",
                    id
                )));
            }
            let pricing = provider.cost_per_token;
            if !(pricing.input >= 0.0 && pricing.output >= 0.0) {
                return Err(RuntimeError::InvalidConfig(format!(
                    "provider '{}': cost_per_token must be non-negative",
                    id
                )));
            }
        }
        Ok(())
    }
}
