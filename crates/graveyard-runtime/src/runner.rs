//! End-to-end evaluation of prompt files.

use graveyard_core::{Evaluator, GraveyardConfig};
use rand::Rng;
use std::path::Path;

use crate::collector::ResponseCollector;
use crate::record::{prompt_id, EvaluationRecord};
use crate::RuntimeError;

/// Collects responses for a prompt and runs the scoring engine over them.
#[derive(Debug)]
pub struct PromptRunner {
    evaluator: Evaluator,
    collector: ResponseCollector,
}

impl PromptRunner {
    pub fn new(config: &GraveyardConfig, collector: ResponseCollector) -> Self {
        Self {
            evaluator: Evaluator::new(config),
            collector,
        }
    }

    pub fn collector(&self) -> &ResponseCollector {
        &self.collector
    }

    /// Read, trim and evaluate one prompt file.
    pub async fn evaluate_file<R: Rng + ?Sized>(
        &self,
        path: impl AsRef<Path>,
        rng: &mut R,
    ) -> Result<EvaluationRecord, RuntimeError> {
        let path = path.as_ref();
        let text = tokio::fs::read_to_string(path).await?;
        let prompt = text.trim();
        if prompt.is_empty() {
            return Err(RuntimeError::EmptyPrompt(path.display().to_string()));
        }

        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(self
            .evaluate_prompt(&path.display().to_string(), &file_name, prompt, rng)
            .await)
    }

    /// Query every provider with `prompt` and evaluate the responses.
    pub async fn evaluate_prompt<R: Rng + ?Sized>(
        &self,
        file_path: &str,
        file_name: &str,
        prompt: &str,
        rng: &mut R,
    ) -> EvaluationRecord {
        let timestamp = chrono::Utc::now().to_rfc3339();
        let id = prompt_id(file_name, &timestamp);

        tracing::info!(
            prompt_id = %id,
            file = file_path,
            words = prompt.split_whitespace().count(),
            providers = self.collector.len(),
            "Evaluating prompt"
        );

        let llm_responses = self.collector.collect(prompt).await;
        let outcome = self.evaluator.evaluate(prompt, &llm_responses, rng);

        match &outcome.zombie_status {
            Some(status) => tracing::info!(
                prompt_id = %id,
                is_zombie = status.is_zombie,
                severity = %status.severity,
                overall_score = status.overall_score,
                suggestions = outcome.revival_suggestions.len(),
                "Prompt evaluated"
            ),
            None => tracing::warn!(prompt_id = %id, "No valid responses, prompt left unscored"),
        }

        EvaluationRecord {
            prompt_id: id,
            file_path: file_path.to_string(),
            prompt_text: prompt.to_string(),
            timestamp,
            llm_responses,
            metrics: outcome.metrics,
            zombie_status: outcome.zombie_status,
            revival_suggestions: outcome.revival_suggestions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::ProviderHandle;
    use crate::config::ProviderConfig;
    use crate::providers::{ApiCredential, CredentialSource, OpenAiProvider, ProviderKind, TokenPricing};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::TempDir;

    const SAMPLE: &str = include_str!("../../../config/graveyard.yaml");

    fn provider_config(endpoint: String) -> ProviderConfig {
        ProviderConfig {
            name: "Mock".to_string(),
            provider: ProviderKind::OpenAi,
            model: "gpt-4o-mini".to_string(),
            api_endpoint: Some(endpoint),
            api_key_env: "OPENAI_API_KEY".to_string(),
            max_tokens: 64,
            temperature: 0.7,
            timeout: Duration::from_secs(5),
            cost_per_token: TokenPricing {
                input: 0.001,
                output: 0.002,
            },
            enabled: true,
            requests_per_minute: 60,
            max_retries: 0,
        }
    }

    fn runner(endpoint: String) -> PromptRunner {
        let credential = ApiCredential::new("sk-test", CredentialSource::Programmatic, "OpenAI API key");
        let provider = OpenAiProvider::new("openai", &provider_config(endpoint), credential).unwrap();
        let collector = ResponseCollector::new(vec![ProviderHandle::new(Arc::new(provider), 60, 0)]);
        PromptRunner::new(&GraveyardConfig::from_yaml(SAMPLE).unwrap(), collector)
    }

    #[tokio::test]
    async fn test_evaluate_file_end_to_end() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(200)
            .with_body(r#"{"choices":[{"message":{"content":"Here is some code."}}]}"#)
            .create_async()
            .await;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("fix.txt");
        std::fs::write(&path, "  fix\n").unwrap();

        let runner = runner(format!("{}/v1/chat/completions", server.url()));
        let record = runner
            .evaluate_file(&path, &mut StdRng::seed_from_u64(7))
            .await
            .unwrap();

        assert_eq!(record.prompt_text, "fix");
        assert_eq!(record.prompt_id.len(), 12);
        assert!(record.llm_responses["openai"].is_valid());
        assert!(!record.metrics.is_failed());
        assert!(record.zombie_status.is_some());
    }

    #[tokio::test]
    async fn test_all_providers_failing_leaves_prompt_unscored() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/v1/chat/completions")
            .with_status(401)
            .with_body("invalid api key")
            .create_async()
            .await;

        let runner = runner(format!("{}/v1/chat/completions", server.url()));
        let record = runner
            .evaluate_prompt("fix.txt", "fix.txt", "fix", &mut StdRng::seed_from_u64(7))
            .await;

        assert!(record.metrics.is_failed());
        assert!(record.zombie_status.is_none());
        assert!(record.revival_suggestions.is_empty());
        assert!(record.llm_responses["openai"].error.is_some());
    }

    #[tokio::test]
    async fn test_empty_prompt_file_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("blank.txt");
        std::fs::write(&path, "   \n").unwrap();

        let runner = runner("http://127.0.0.1:9".to_string());
        let result = runner.evaluate_file(&path, &mut StdRng::seed_from_u64(7)).await;
        assert!(matches!(result, Err(RuntimeError::EmptyPrompt(_))));
    }
}
