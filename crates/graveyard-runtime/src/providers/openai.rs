//! OpenAI-compatible chat completions.
//!
//! Groq serves the same wire format, so one client covers both; the two
//! factories differ only in their kind and defaults.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::{
    build_client, factory::ProviderFactory, secrets::ApiCredential, LlmProvider, ProviderError,
    ProviderKind, TokenPricing,
};
use crate::config::ProviderConfig;

/// Chat completions client for OpenAI and Groq.
pub struct OpenAiProvider {
    id: String,
    kind: ProviderKind,
    model: String,
    endpoint: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
    pricing: TokenPricing,
    credential: ApiCredential,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiProvider")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("credential", &self.credential)
            .finish()
    }
}

impl OpenAiProvider {
    pub fn new(
        id: impl Into<String>,
        config: &ProviderConfig,
        credential: ApiCredential,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            id: id.into(),
            kind: config.provider,
            model: config.model.clone(),
            endpoint: config.endpoint().to_string(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            timeout: config.timeout,
            pricing: config.cost_per_token,
            credential,
            client: build_client(config.timeout)?,
        })
    }

    pub fn kind(&self) -> ProviderKind {
        self.kind
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.id
    }

    fn model(&self) -> &str {
        &self.model
    }

    fn pricing(&self) -> TokenPricing {
        self.pricing
    }

    async fn respond(&self, prompt: &str) -> Result<String, ProviderError> {
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens: self.max_tokens,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.credential.expose())
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| ProviderError::ParseError("response contained no message content".to_string()))
    }
}

/// Factory for `provider: openai`.
pub struct OpenAiProviderFactory;

impl ProviderFactory for OpenAiProviderFactory {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    fn create(
        &self,
        id: &str,
        config: &ProviderConfig,
        credential: ApiCredential,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(OpenAiProvider::new(id, config, credential)?))
    }

    fn description(&self) -> &'static str {
        "OpenAI chat completions"
    }
}

/// Factory for `provider: groq`.
pub struct GroqProviderFactory;

impl ProviderFactory for GroqProviderFactory {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Groq
    }

    fn create(
        &self,
        id: &str,
        config: &ProviderConfig,
        credential: ApiCredential,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(OpenAiProvider::new(id, config, credential)?))
    }

    fn description(&self) -> &'static str {
        "Groq OpenAI-compatible chat completions"
    }
}
