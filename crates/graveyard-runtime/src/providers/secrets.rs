//! Credential handling for LLM providers.
//!
//! - **No accidental logging**: credentials print as `[REDACTED]`
//! - **Explicit lookup**: providers receive an [`ApiCredential`]; only the
//!   [`CredentialStore`] reads the environment, once, at startup
//!
//! ## Usage
//!
//! ```ignore
//! let store = CredentialStore::from_env(&runtime_config);
//! let credential = store.require("OPENAI_API_KEY", "OpenAI API key")?;
//!
//! // Explicit exposure at the point of use
//! request.bearer_auth(credential.expose());
//! ```

use secrecy::{ExposeSecret, SecretString};
use std::collections::BTreeMap;
use std::fmt;

use super::ProviderError;
use crate::config::RuntimeConfig;

/// Where a credential was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    /// Read from an environment variable
    Environment,
    /// Provided programmatically
    Programmatic,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment"),
            CredentialSource::Programmatic => write!(f, "programmatic"),
        }
    }
}

/// A securely-stored API credential.
///
/// Debug and Display show `[REDACTED]`; the value is zeroed on drop by
/// `secrecy` and only reachable through [`ApiCredential::expose`].
pub struct ApiCredential {
    value: SecretString,
    source: CredentialSource,
    name: &'static str,
}

impl ApiCredential {
    pub fn new(value: impl Into<String>, source: CredentialSource, name: &'static str) -> Self {
        Self {
            value: SecretString::from(value.into()),
            source,
            name,
        }
    }

    /// Load a credential from an environment variable.
    pub fn from_env(env_var: &str, name: &'static str) -> Result<Self, ProviderError> {
        std::env::var(env_var)
            .map(|v| Self::new(v, CredentialSource::Environment, name))
            .map_err(|_| not_set(name, env_var))
    }

    /// Expose the credential value for an API call.
    ///
    /// Only call this where the value is sent (e.g. setting an HTTP header).
    pub fn expose(&self) -> &str {
        self.value.expose_secret()
    }

    pub fn is_empty(&self) -> bool {
        self.value.expose_secret().is_empty()
    }

    pub fn source(&self) -> CredentialSource {
        self.source
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Clone for ApiCredential {
    fn clone(&self) -> Self {
        Self::new(self.expose(), self.source, self.name)
    }
}

impl fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiCredential")
            .field("value", &"[REDACTED]")
            .field("source", &self.source)
            .field("name", &self.name)
            .finish()
    }
}

impl fmt::Display for ApiCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} from {} [REDACTED]", self.name, self.source)
    }
}

fn not_set(name: &str, env_var: &str) -> ProviderError {
    ProviderError::NotConfigured(format!(
        "{} not set: configure '{}' environment variable",
        name, env_var
    ))
}

/// Credentials keyed by the environment variable that names them.
#[derive(Default, Clone)]
pub struct CredentialStore {
    credentials: BTreeMap<String, ApiCredential>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every enabled provider's `api_key_env` from the process
    /// environment. Missing or empty variables are left out; asking for
    /// them later yields `NotConfigured`.
    pub fn from_env(config: &RuntimeConfig) -> Self {
        let mut store = Self::new();
        for (_, provider) in config.enabled_providers() {
            let env_var = provider.api_key_env.as_str();
            if store.credentials.contains_key(env_var) {
                continue;
            }
            match ApiCredential::from_env(env_var, provider.provider.credential_name()) {
                Ok(credential) if !credential.is_empty() => {
                    store.credentials.insert(env_var.to_string(), credential);
                }
                _ => tracing::debug!(env_var, "Credential not present in environment"),
            }
        }
        store
    }

    /// Add a credential under an environment variable name.
    pub fn insert(&mut self, env_var: impl Into<String>, credential: ApiCredential) {
        self.credentials.insert(env_var.into(), credential);
    }

    /// Builder-style programmatic credential.
    pub fn with(mut self, env_var: impl Into<String>, value: impl Into<String>, name: &'static str) -> Self {
        self.insert(env_var, ApiCredential::new(value, CredentialSource::Programmatic, name));
        self
    }

    pub fn get(&self, env_var: &str) -> Option<&ApiCredential> {
        self.credentials.get(env_var)
    }

    /// The credential for `env_var`, or `NotConfigured`.
    pub fn require(&self, env_var: &str, name: &'static str) -> Result<&ApiCredential, ProviderError> {
        self.get(env_var).ok_or_else(|| not_set(name, env_var))
    }

    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("env_vars", &self.credentials.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "sk-graveyard-super-secret-12345";

    #[test]
    fn test_debug_and_display_redact() {
        let credential = ApiCredential::new(SECRET, CredentialSource::Programmatic, "OpenAI API key");
        let debug = format!("{:?}", credential);
        let display = format!("{}", credential);

        assert!(!debug.contains(SECRET), "API key was exposed in Debug output!");
        assert!(debug.contains("[REDACTED]"));
        assert!(!display.contains(SECRET));
        assert_eq!(display, "OpenAI API key from programmatic [REDACTED]");
        assert_eq!(credential.expose(), SECRET);
    }

    #[test]
    fn test_clone_keeps_value_and_source() {
        let credential = ApiCredential::new(SECRET, CredentialSource::Environment, "Groq API key");
        let copy = credential.clone();
        assert_eq!(copy.expose(), SECRET);
        assert_eq!(copy.source(), CredentialSource::Environment);
    }

    #[test]
    fn test_missing_env_var_is_not_configured() {
        let result = ApiCredential::from_env("GRAVEYARD_TEST_SURELY_UNSET_VAR", "Test key");
        match result {
            Err(ProviderError::NotConfigured(msg)) => {
                assert!(msg.contains("GRAVEYARD_TEST_SURELY_UNSET_VAR"));
                assert!(msg.contains("Test key not set"));
            }
            other => panic!("Expected NotConfigured, got {:?}", other),
        }
    }

    #[test]
    fn test_store_require() {
        let store = CredentialStore::new().with("OPENAI_API_KEY", SECRET, "OpenAI API key");
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.require("OPENAI_API_KEY", "OpenAI API key").unwrap().expose(),
            SECRET
        );
        assert!(matches!(
            store.require("GROQ_API_KEY", "Groq API key"),
            Err(ProviderError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_store_debug_lists_names_only() {
        let store = CredentialStore::new().with("OPENAI_API_KEY", SECRET, "OpenAI API key");
        let debug = format!("{:?}", store);
        assert!(debug.contains("OPENAI_API_KEY"));
        assert!(!debug.contains(SECRET));
    }

    #[test]
    fn test_store_from_env_skips_disabled_and_missing() {
        let yaml = r#"
llm_providers:
  off:
    name: Off
    provider: openai
    model: m
    api_key_env: GRAVEYARD_TEST_DISABLED_KEY
    enabled: false
  missing:
    name: Missing
    provider: groq
    model: m
    api_key_env: GRAVEYARD_TEST_SURELY_UNSET_VAR
"#;
        let config = RuntimeConfig::from_yaml(yaml).unwrap();
        let store = CredentialStore::from_env(&config);
        assert!(store.is_empty());
    }
}
