//! Tool trait and execution types.

use std::time::Duration;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::ToolError;

/// Per-run context handed to every tool call.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Agent run that issued the call.
    pub run_id: Uuid,
    /// Subject of the email being triaged.
    pub subject: String,
}

impl ToolContext {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            subject: subject.into(),
        }
    }
}

/// Output of a successful tool call — the observation fed back to the agent.
#[derive(Debug, Clone)]
pub struct ToolOutput {
    pub content: String,
    pub duration: Duration,
}

impl ToolOutput {
    pub fn text(content: impl Into<String>, duration: Duration) -> Self {
        Self {
            content: content.into(),
            duration,
        }
    }
}

/// A capability the agent can invoke by name with a single string input.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name the agent uses in `Action: <name>`.
    fn name(&self) -> &str;

    /// One-line description rendered into the agent prompt.
    fn description(&self) -> &str;

    /// Execute with the raw `Action Input` text.
    async fn execute(&self, input: &str, ctx: &ToolContext) -> Result<ToolOutput, ToolError>;
}

/// Require a non-blank input, returning it trimmed.
pub fn require_input<'a>(tool: &str, input: &'a str) -> Result<&'a str, ToolError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ToolError::InvalidInput {
            name: tool.to_string(),
            reason: "input must not be empty".to_string(),
        });
    }
    Ok(trimmed)
}
