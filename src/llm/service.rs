//! Text completion service — the `prompt -> text` contract every pipeline
//! stage talks to.
//!
//! Wraps an `LlmProvider` with a per-call timeout and token accounting. The
//! service itself holds no mutable state, so a single instance is shared by
//! every email in a run.

use std::sync::Arc;
use std::time::Duration;

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::llm::provider::{ChatMessage, CompletionRequest, FinishReason, LlmProvider};

/// Token usage of one or more completion calls.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl TokenUsage {
    pub fn total(&self) -> u32 {
        self.input_tokens.saturating_add(self.output_tokens)
    }

    pub fn add(&mut self, other: TokenUsage) {
        self.input_tokens = self.input_tokens.saturating_add(other.input_tokens);
        self.output_tokens = self.output_tokens.saturating_add(other.output_tokens);
    }
}

/// Output of one completion call.
#[derive(Debug, Clone)]
pub struct Completion {
    pub text: String,
    pub usage: TokenUsage,
    pub cost: Decimal,
}

impl Completion {
    /// Turn the text into a stage value, keeping the accounting.
    pub fn metered<T>(self, f: impl FnOnce(String) -> T) -> Metered<T> {
        Metered {
            value: f(self.text),
            usage: self.usage,
            cost: self.cost,
        }
    }
}

/// A pipeline-stage result plus the model usage spent producing it.
#[derive(Debug, Clone)]
pub struct Metered<T> {
    pub value: T,
    pub usage: TokenUsage,
    pub cost: Decimal,
}

/// Sampling settings applied to every call.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub timeout: Duration,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(120),
            temperature: None,
            max_tokens: 1024,
        }
    }
}

/// Language-model capability used by the summarizer, classifier and agent.
#[derive(Clone)]
pub struct CompletionService {
    llm: Arc<dyn LlmProvider>,
    settings: CompletionSettings,
}

impl CompletionService {
    pub fn new(llm: Arc<dyn LlmProvider>, settings: CompletionSettings) -> Self {
        Self { llm, settings }
    }

    /// Complete a prompt and return the raw text.
    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        Ok(self.complete_with_stop(prompt, &[]).await?.text)
    }

    /// Complete a prompt, halting at any of `stop`, and report usage.
    pub async fn complete_with_stop(
        &self,
        prompt: &str,
        stop: &[&str],
    ) -> Result<Completion, LlmError> {
        let mut request = CompletionRequest::new(vec![ChatMessage::user(prompt)])
            .with_max_tokens(self.settings.max_tokens)
            .with_stop_sequences(stop.iter().map(|s| s.to_string()).collect());
        if let Some(temperature) = self.settings.temperature {
            request = request.with_temperature(temperature);
        }

        let start = std::time::Instant::now();
        let response =
            tokio::time::timeout(self.settings.timeout, self.llm.complete(request))
                .await
                .map_err(|_| LlmError::Timeout {
                    provider: self.llm.model_name().to_string(),
                    timeout: self.settings.timeout,
                })??;

        let usage = TokenUsage {
            input_tokens: response.input_tokens,
            output_tokens: response.output_tokens,
        };
        let (input_cost, output_cost) = self.llm.cost_per_token();
        let cost = input_cost * Decimal::from(usage.input_tokens)
            + output_cost * Decimal::from(usage.output_tokens);

        debug!(
            model = self.llm.model_name(),
            prompt_chars = prompt.len(),
            completion_chars = response.content.len(),
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            finish_reason = ?response.finish_reason,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Completion finished"
        );
        if response.finish_reason == FinishReason::Length {
            warn!(
                model = self.llm.model_name(),
                max_tokens = self.settings.max_tokens,
                "Completion hit the token limit, output may be cut short"
            );
        }

        Ok(Completion {
            text: response.content,
            usage,
            cost,
        })
    }
}
