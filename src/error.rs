//! Error types for the triage pipeline.

use std::time::Duration;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Completion-service errors.
///
/// Any of these aborts the current email's pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("Provider {provider} request failed: {reason}")]
    RequestFailed { provider: String, reason: String },

    #[error("Provider {provider} unreachable: {reason}")]
    Unreachable { provider: String, reason: String },

    #[error("Invalid response from {provider}: {reason}")]
    InvalidResponse { provider: String, reason: String },

    #[error("Provider {provider} timed out after {timeout:?}")]
    Timeout { provider: String, timeout: Duration },

    #[error("Authentication failed for provider {provider}")]
    AuthFailed { provider: String },
}

/// Tool execution errors.
#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Tool {name} not found")]
    NotFound { name: String },

    #[error("Tool {name} timed out after {timeout:?}")]
    Timeout { name: String, timeout: Duration },

    #[error("Invalid input for tool {name}: {reason}")]
    InvalidInput { name: String, reason: String },
}

/// Reasoning-loop errors.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Agent reply could not be parsed: {0}")]
    Parse(String),

    #[error("Agent exceeded {max} iterations without a final answer")]
    IterationExceeded { max: usize },

    #[error("Agent exceeded its time budget of {budget:?}")]
    TimeBudgetExceeded { budget: Duration },

    #[error("Invalid agent state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("LLM error: {0}")]
    Llm(#[from] LlmError),
}

/// Pipeline-related errors.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Summarization failed: {0}")]
    Summarize(#[source] LlmError),

    #[error("Classification failed: {0}")]
    Classify(#[source] LlmError),

    #[error("Agent run failed: {0}")]
    Agent(#[from] AgentError),

    #[error("Email source {source_name} failed: {reason}")]
    Source { source_name: String, reason: String },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;
