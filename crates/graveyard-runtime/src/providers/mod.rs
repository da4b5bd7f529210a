//! LLM provider abstractions for graveyard-runtime.
//!
//! This module defines the trait every provider implements and the two wire
//! protocols behind it: OpenAI-style chat completions (used by OpenAI and
//! Groq) and Anthropic messages.
//!
//! ## Security
//!
//! All providers take an [`ApiCredential`] at construction. See the
//! [`secrets`] module for how those are resolved.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

mod anthropic;
mod factory;
mod openai;
pub mod secrets;

pub use anthropic::{AnthropicProvider, AnthropicProviderFactory};
pub use factory::{ProviderFactory, ProviderRegistry};
pub use openai::{GroqProviderFactory, OpenAiProvider, OpenAiProviderFactory};
pub use secrets::{ApiCredential, CredentialSource, CredentialStore};

/// Heuristic tokens per whitespace-separated word.
pub const TOKENS_PER_WORD: f64 = 1.3;

/// Errors from LLM providers.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(String),

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    ParseError(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),
}

impl ProviderError {
    /// Whether another attempt could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            ProviderError::HttpError(_) | ProviderError::Timeout(_) => true,
            ProviderError::ApiError { status, .. } => *status == 429 || *status >= 500,
            ProviderError::ParseError(_) | ProviderError::NotConfigured(_) => false,
        }
    }

    fn from_transport(error: reqwest::Error, timeout: Duration) -> Self {
        if error.is_timeout() {
            ProviderError::Timeout(timeout)
        } else {
            ProviderError::HttpError(error.to_string())
        }
    }

    /// Build an `ApiError` from a non-success response, keeping the body.
    async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let message = response.text().await.unwrap_or_default();
        ProviderError::ApiError { status, message }
    }
}

/// Wire protocol of a configured provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Groq,
    Anthropic,
}

impl ProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "openai",
            ProviderKind::Groq => "groq",
            ProviderKind::Anthropic => "anthropic",
        }
    }

    pub fn default_endpoint(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1/chat/completions",
            ProviderKind::Groq => "https://api.groq.com/openai/v1/chat/completions",
            ProviderKind::Anthropic => "https://api.anthropic.com/v1/messages",
        }
    }

    /// Human-readable credential name for error messages.
    pub fn credential_name(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI API key",
            ProviderKind::Groq => "Groq API key",
            ProviderKind::Anthropic => "Anthropic API key",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// USD price per token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TokenPricing {
    #[serde(default)]
    pub input: f64,
    #[serde(default)]
    pub output: f64,
}

impl TokenPricing {
    /// Estimate the cost of one call from word counts.
    pub fn estimate(&self, prompt: &str, response: &str) -> f64 {
        estimate_tokens(prompt) * self.input + estimate_tokens(response) * self.output
    }
}

/// Approximate token count: words x 1.3.
pub fn estimate_tokens(text: &str) -> f64 {
    text.split_whitespace().count() as f64 * TOKENS_PER_WORD
}

/// A single-prompt LLM endpoint.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Configuration id, used as the response key.
    fn name(&self) -> &str;

    fn model(&self) -> &str;

    fn pricing(&self) -> TokenPricing;

    /// Send one user message and return the trimmed reply text.
    async fn respond(&self, prompt: &str) -> Result<String, ProviderError>;

    fn estimate_cost(&self, prompt: &str, response: &str) -> f64 {
        self.pricing().estimate(prompt, response)
    }
}

/// Shared HTTP client with the provider's timeout.
fn build_client(timeout: Duration) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| ProviderError::HttpError(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_estimate_uses_word_count() {
        let pricing = TokenPricing {
            input: 0.001,
            output: 0.002,
        };
        // 2 words in, 10 words out
        let cost = pricing.estimate("fix this", "one two three four five six seven eight nine ten");
        let expected = 2.0 * 1.3 * 0.001 + 10.0 * 1.3 * 0.002;
        assert!((cost - expected).abs() < 1e-12);
    }

    #[test]
    fn test_transient_classification() {
        assert!(ProviderError::Timeout(Duration::from_secs(1)).is_transient());
        assert!(ProviderError::HttpError("reset".into()).is_transient());
        assert!(ProviderError::ApiError { status: 429, message: String::new() }.is_transient());
        assert!(ProviderError::ApiError { status: 503, message: String::new() }.is_transient());
        assert!(!ProviderError::ApiError { status: 401, message: String::new() }.is_transient());
        assert!(!ProviderError::ParseError("x".into()).is_transient());
        assert!(!ProviderError::NotConfigured("x".into()).is_transient());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ProviderKind::OpenAi.to_string(), "openai");
        let kind: ProviderKind = serde_json::from_str("\"groq\"").unwrap();
        assert_eq!(kind, ProviderKind::Groq);
    }
}
