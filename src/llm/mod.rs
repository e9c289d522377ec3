//! LLM integration for the triage pipeline.
//!
//! Supports:
//! - **Ollama**: local models over HTTP (default, e.g. `llama3`)
//! - **Anthropic**: direct API access via rig-core
//! - **OpenAI**: direct API access via rig-core
//!
//! Every backend implements `LlmProvider`; pipeline stages only ever see
//! the `CompletionService` wrapper.

mod costs;
pub mod ollama;
pub mod provider;
mod rig_adapter;
pub mod service;

pub use ollama::OllamaProvider;
pub use provider::*;
pub use rig_adapter::RigAdapter;
pub use service::{Completion, CompletionService, CompletionSettings, Metered, TokenUsage};

use std::sync::Arc;
use std::time::Duration;

use rig::client::CompletionClient;
use secrecy::ExposeSecret;

use crate::error::{ConfigError, LlmError};

/// Supported LLM backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmBackend {
    Ollama,
    Anthropic,
    OpenAi,
}

impl std::str::FromStr for LlmBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ollama" => Ok(Self::Ollama),
            "anthropic" => Ok(Self::Anthropic),
            "openai" => Ok(Self::OpenAi),
            other => Err(ConfigError::InvalidValue {
                key: "EMAIL_TRIAGE_BACKEND".to_string(),
                message: format!(
                    "unknown backend '{other}' (expected ollama, anthropic or openai)"
                ),
            }),
        }
    }
}

impl std::fmt::Display for LlmBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Ollama => "ollama",
            Self::Anthropic => "anthropic",
            Self::OpenAi => "openai",
        };
        write!(f, "{s}")
    }
}

/// Configuration for creating an LLM provider.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub model: String,
    /// Required for hosted backends; ignored by Ollama.
    pub api_key: Option<secrecy::SecretString>,
    pub ollama_url: String,
    /// HTTP-level timeout for backends that take one.
    pub request_timeout: Duration,
}

/// Create an LLM provider from configuration.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    match config.backend {
        LlmBackend::Ollama => create_ollama_provider(config),
        LlmBackend::Anthropic => create_anthropic_provider(config),
        LlmBackend::OpenAi => create_openai_provider(config),
    }
}

fn create_ollama_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    let provider = OllamaProvider::new(
        config.ollama_url.clone(),
        config.model.clone(),
        config.request_timeout,
    )?;
    tracing::info!("Using Ollama at {} (model: {})", config.ollama_url, config.model);
    Ok(Arc::new(provider))
}

fn require_key<'a>(
    config: &'a LlmConfig,
    provider: &str,
) -> Result<&'a secrecy::SecretString, LlmError> {
    config.api_key.as_ref().ok_or_else(|| LlmError::AuthFailed {
        provider: provider.to_string(),
    })
}

fn create_anthropic_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::anthropic;

    let api_key = require_key(config, "anthropic")?;
    let client: rig::client::Client<anthropic::client::AnthropicExt> =
        anthropic::Client::new(api_key.expose_secret()).map_err(|e| LlmError::RequestFailed {
            provider: "anthropic".to_string(),
            reason: format!("Failed to create Anthropic client: {}", e),
        })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using Anthropic (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model)))
}

fn create_openai_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>, LlmError> {
    use rig::providers::openai;

    let api_key = require_key(config, "openai")?;
    let client: rig::client::Client<openai::client::OpenAIResponsesExt> =
        openai::Client::new(api_key.expose_secret()).map_err(|e| LlmError::RequestFailed {
            provider: "openai".to_string(),
            reason: format!("Failed to create OpenAI client: {}", e),
        })?;

    let model = client.completion_model(&config.model);
    tracing::info!("Using OpenAI (model: {})", config.model);
    Ok(Arc::new(RigAdapter::new(model, &config.model)))
}
