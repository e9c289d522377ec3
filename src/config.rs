//! Configuration types.
//!
//! Everything is read from `EMAIL_TRIAGE_*` environment variables once at
//! startup and passed down explicitly; nothing reads the environment later.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;

use crate::agent::AgentConfig;
use crate::error::ConfigError;
use crate::llm::{CompletionSettings, LlmBackend, LlmConfig};

const DEFAULT_MODEL: &str = "llama3";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Full runtime configuration of the triage binary.
#[derive(Debug, Clone)]
pub struct TriageConfig {
    pub llm: LlmConfig,
    pub completion: CompletionSettings,
    pub agent: AgentConfig,
    /// Read `.eml` files from here instead of the built-in samples.
    pub eml_dir: Option<PathBuf>,
    /// Directory for the rolling audit log file.
    pub log_dir: Option<PathBuf>,
}

impl TriageConfig {
    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let backend = match get("EMAIL_TRIAGE_BACKEND") {
            Some(raw) => raw.parse()?,
            None => LlmBackend::Ollama,
        };

        let api_key = match backend {
            LlmBackend::Ollama => None,
            LlmBackend::Anthropic => Some(require(&get, "ANTHROPIC_API_KEY")?),
            LlmBackend::OpenAi => Some(require(&get, "OPENAI_API_KEY")?),
        };

        let completion_defaults = CompletionSettings::default();
        let timeout = parse_or(
            &get,
            "EMAIL_TRIAGE_TIMEOUT_SECS",
            completion_defaults.timeout.as_secs(),
        )?;
        let completion = CompletionSettings {
            timeout: Duration::from_secs(timeout),
            temperature: parse_opt(&get, "EMAIL_TRIAGE_TEMPERATURE")?,
            max_tokens: parse_or(&get, "EMAIL_TRIAGE_MAX_TOKENS", completion_defaults.max_tokens)?,
        };

        let llm = LlmConfig {
            backend,
            model: get("EMAIL_TRIAGE_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_key,
            ollama_url: get("EMAIL_TRIAGE_OLLAMA_URL")
                .unwrap_or_else(|| DEFAULT_OLLAMA_URL.to_string()),
            request_timeout: completion.timeout,
        };

        let agent_defaults = AgentConfig::default();
        let max_iterations =
            parse_or(&get, "EMAIL_TRIAGE_MAX_ITERATIONS", agent_defaults.max_iterations)?;
        if max_iterations == 0 {
            return Err(ConfigError::InvalidValue {
                key: "EMAIL_TRIAGE_MAX_ITERATIONS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        let agent = AgentConfig {
            max_iterations,
            max_execution_time: parse_opt::<u64>(&get, "EMAIL_TRIAGE_MAX_EXECUTION_SECS")?
                .map(Duration::from_secs),
            tool_timeout: Duration::from_secs(parse_or(
                &get,
                "EMAIL_TRIAGE_TOOL_TIMEOUT_SECS",
                agent_defaults.tool_timeout.as_secs(),
            )?),
        };

        Ok(Self {
            llm,
            completion,
            agent,
            eml_dir: get("EMAIL_TRIAGE_EML_DIR").map(PathBuf::from),
            log_dir: get("EMAIL_TRIAGE_LOG_DIR").map(PathBuf::from),
        })
    }
}

fn require(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<SecretString, ConfigError> {
    get(key)
        .map(SecretString::from)
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

fn parse_opt<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|raw| {
            raw.parse::<T>().map_err(|e| ConfigError::InvalidValue {
                key: key.to_string(),
                message: format!("'{raw}': {e}"),
            })
        })
        .transpose()
}

fn parse_or<T>(
    get: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    Ok(parse_opt(get, key)?.unwrap_or(default))
}
