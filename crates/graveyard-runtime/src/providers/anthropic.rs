//! Anthropic messages provider.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use super::{
    build_client, factory::ProviderFactory, secrets::ApiCredential, LlmProvider, ProviderError,
    ProviderKind, TokenPricing,
};
use crate::config::ProviderConfig;

pub const ANTHROPIC_VERSION: &str = "2023-06-01";

/// Anthropic Claude provider.
///
/// The API key goes in the `x-api-key` header and is exposed only while the
/// request is built.
pub struct AnthropicProvider {
    id: String,
    model: String,
    endpoint: String,
    max_tokens: u32,
    temperature: f32,
    timeout: Duration,
    pricing: TokenPricing,
    credential: ApiCredential,
    client: reqwest::Client,
}

impl std::fmt::Debug for AnthropicProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicProvider")
            .field("id", &self.id)
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("credential", &self.credential)
            .finish()
    }
}

impl AnthropicProvider {
    pub fn new(
        id: impl Into<String>,
        config: &ProviderConfig,
        credential: ApiCredential,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            id: id.into(),
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
}

/// Anthropic API request format.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Anthropic API response format.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[async_trait]
impl LlmProvider for AnthropicProvider {
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
        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: [Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header("x-api-key", self.credential.expose())
            .header("anthropic-version", ANTHROPIC_VERSION)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(e, self.timeout))?;

        if !response.status().is_success() {
            return Err(ProviderError::from_response(response).await);
        }

        let body: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ParseError(e.to_string()))?;

        body.content
            .into_iter()
            .find_map(|block| block.text)
            .map(|text| text.trim().to_string())
            .ok_or_else(|| ProviderError::ParseError("response contained no text block".to_string()))
    }
}

/// Factory for `provider: anthropic`.
pub struct AnthropicProviderFactory;

impl ProviderFactory for AnthropicProviderFactory {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    fn create(
        &self,
        id: &str,
        config: &ProviderConfig,
        credential: ApiCredential,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        Ok(Arc::new(AnthropicProvider::new(id, config, credential)?))
    }

    fn description(&self) -> &'static str {
        "Anthropic Claude messages"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::CredentialSource;
    use mockito::Matcher;

    const SECRET: &str = "sk-ant-REDACTED";

    fn provider(endpoint: &str) -> AnthropicProvider {
        let config = ProviderConfig {
            name: "Claude".to_string(),
            provider: ProviderKind::Anthropic,
            model: "claude-3-5-haiku-latest".to_string(),
            api_endpoint: Some(endpoint.to_string()),
            api_key_env: "ANTHROPIC_API_KEY".to_string(),
            max_tokens: 512,
            temperature: 0.7,
            timeout: Duration::from_secs(5),
            cost_per_token: TokenPricing::default(),
            enabled: true,
            requests_per_minute: 60,
            max_retries: 0,
        };
        let credential = ApiCredential::new(SECRET, CredentialSource::Programmatic, "Anthropic API key");
        AnthropicProvider::new("claude", &config, credential).unwrap()
    }

    #[tokio::test]
    async fn test_respond_sends_headers_and_reads_first_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("x-api-key", SECRET)
            .match_header("anthropic-version", ANTHROPIC_VERSION)
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "claude-3-5-haiku-latest",
                "max_tokens": 512,
                "messages": [{"role": "user", "content": "Explain ownership"}]
            })))
            .with_status(200)
            .with_body(r#"{"content":[{"type":"text","text":"\nOwnership means one owner.  "}],"model":"claude-3-5-haiku-latest"}"#)
            .create_async()
            .await;

        let provider = provider(&format!("{}/v1/messages", server.url()));
        let text = provider.respond("Explain ownership").await.unwrap();

        assert_eq!(text, "Ownership means one owner.");
        assert_eq!(provider.name(), "claude");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_error_is_transient_api_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/messages")
            .with_status(529)
            .with_body(r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#)
            .create_async()
            .await;

        let provider = provider(&format!("{}/v1/messages", server.url()));
        let error = provider.respond("hi").await.unwrap_err();

        assert!(error.is_transient());
        assert!(error.to_string().contains("529"));
        assert!(error.to_string().contains("Overloaded"));
    }

    #[test]
    fn test_api_key_not_in_debug_output() {
        let provider = provider("https://api.anthropic.com/v1/messages");
        let debug_output = format!("{:?}", provider);
        assert!(
            !debug_output.contains(SECRET),
            "API key was exposed in Debug output!"
        );
        assert!(debug_output.contains("[REDACTED]"));
    }
}
