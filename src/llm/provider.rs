//! Provider-neutral completion types and the `LlmProvider` trait.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// A completion request.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Generation halts before emitting any of these strings.
    pub stop_sequences: Vec<String>,
}

impl CompletionRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            max_tokens: None,
            temperature: None,
            stop_sequences: Vec::new(),
        }
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_stop_sequences(mut self, stop: Vec<String>) -> Self {
        self.stop_sequences = stop;
        self
    }

    /// Split the request into an optional system preamble and a single
    /// flattened prompt, for backends that take one prompt string.
    pub fn flatten(&self) -> (Option<String>, String) {
        let system: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();
        let prompt: Vec<&str> = self
            .messages
            .iter()
            .filter(|m| m.role != Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let preamble = if system.is_empty() {
            None
        } else {
            Some(system.join("\n\n"))
        };
        (preamble, prompt.join("\n\n"))
    }
}

/// Why the model stopped generating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishReason {
    Stop,
    Length,
    Unknown,
}

/// A completion response.
#[derive(Debug, Clone)]
pub struct CompletionResponse {
    pub content: String,
    pub input_tokens: u32,
    pub output_tokens: u32,
    pub finish_reason: FinishReason,
}

/// A language-model backend.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Model identifier, for logging.
    fn model_name(&self) -> &str;

    /// Cost per input and output token.
    fn cost_per_token(&self) -> (Decimal, Decimal);

    /// Run a single non-streaming completion.
    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flatten_separates_system_messages() {
        let request = CompletionRequest::new(vec![
            ChatMessage::system("You are terse."),
            ChatMessage::user("Hello"),
            ChatMessage::assistant("Hi"),
        ]);
        let (preamble, prompt) = request.flatten();
        assert_eq!(preamble.as_deref(), Some("You are terse."));
        assert_eq!(prompt, "Hello\n\nHi");
    }

    #[test]
    fn flatten_without_system() {
        let request = CompletionRequest::new(vec![ChatMessage::user("only prompt")]);
        let (preamble, prompt) = request.flatten();
        assert!(preamble.is_none());
        assert_eq!(prompt, "only prompt");
    }

    #[test]
    fn builder_sets_options() {
        let request = CompletionRequest::new(vec![])
            .with_max_tokens(256)
            .with_temperature(0.2)
            .with_stop_sequences(vec!["\nObservation".into()]);
        assert_eq!(request.max_tokens, Some(256));
        assert_eq!(request.temperature, Some(0.2));
        assert_eq!(request.stop_sequences, vec!["\nObservation".to_string()]);
    }
}
