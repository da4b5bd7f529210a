//! Provider factories keyed by wire protocol.
//!
//! ## Usage
//!
//! ```ignore
//! let registry = ProviderRegistry::with_defaults();
//! let providers = registry.build_providers(&runtime_config, &credentials)?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{secrets::CredentialStore, ApiCredential, LlmProvider, ProviderError, ProviderKind};
use crate::config::{ProviderConfig, RuntimeConfig};

/// Factory for creating LLM providers from configuration.
pub trait ProviderFactory: Send + Sync {
    /// Protocol this factory serves.
    fn kind(&self) -> ProviderKind;

    /// Create a provider instance.
    fn create(
        &self,
        id: &str,
        config: &ProviderConfig,
        credential: ApiCredential,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError>;

    /// Validate configuration without creating a provider.
    fn validate_config(&self, config: &ProviderConfig) -> Result<(), ProviderError> {
        if config.model.trim().is_empty() {
            return Err(ProviderError::NotConfigured(format!(
                "{} provider requires a model",
                self.kind()
            )));
        }
        Ok(())
    }

    fn description(&self) -> &'static str {
        "LLM Provider"
    }
}

/// Registry of available provider factories.
#[derive(Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<ProviderKind, Arc<dyn ProviderFactory>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a provider factory, replacing any for the same kind.
    pub fn register(&mut self, factory: Arc<dyn ProviderFactory>) {
        self.factories.insert(factory.kind(), factory);
    }

    /// Registry with all built-in protocols.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::OpenAiProviderFactory));
        registry.register(Arc::new(super::GroqProviderFactory));
        registry.register(Arc::new(super::AnthropicProviderFactory));
        registry
    }

    pub fn available_types(&self) -> Vec<ProviderKind> {
        self.factories.keys().copied().collect()
    }

    pub fn has_provider(&self, kind: ProviderKind) -> bool {
        self.factories.contains_key(&kind)
    }

    /// Create one provider.
    pub fn create(
        &self,
        id: &str,
        config: &ProviderConfig,
        credential: ApiCredential,
    ) -> Result<Arc<dyn LlmProvider>, ProviderError> {
        let factory = self.factories.get(&config.provider).ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "Unknown provider type: '{}'. Available: {:?}",
                config.provider,
                self.available_types()
            ))
        })?;
        factory.validate_config(config)?;
        factory.create(id, config, credential)
    }

    /// Create every enabled provider in configuration order.
    ///
    /// Disabled providers are skipped. An enabled provider whose credential
    /// is missing fails the whole build.
    pub fn build_providers(
        &self,
        config: &RuntimeConfig,
        credentials: &CredentialStore,
    ) -> Result<Vec<Arc<dyn LlmProvider>>, ProviderError> {
        let mut providers = Vec::new();

        for (id, provider_config) in &config.llm_providers {
            if !provider_config.enabled {
                tracing::debug!(provider = %id, "Provider disabled, skipping");
                continue;
            }

            let credential = credentials
                .require(
                    &provider_config.api_key_env,
                    provider_config.provider.credential_name(),
                )?
                .clone();

            let provider = self.create(id, provider_config, credential)?;
            tracing::info!(
                provider = %id,
                kind = %provider_config.provider,
                model = %provider_config.model,
                "Provider ready"
            );
            providers.push(provider);
        }

        Ok(providers)
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("providers", &self.available_types())
            .finish()
    }
}
