//! Ollama backend over its local HTTP API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role,
};

const PROVIDER: &str = "ollama";

/// Client for an Ollama server (`/api/chat`, non-streaming).
pub struct OllamaProvider {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaProvider {
    /// Create a client. The HTTP timeout is a hard ceiling; the pipeline
    /// applies its own per-call timeout on top.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("Failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
        })
    }

    fn build_body(&self, request: &CompletionRequest) -> OllamaRequest {
        let messages = request
            .messages
            .iter()
            .map(|m| OllamaMessage {
                role: match m.role {
                    Role::System => "system",
                    Role::User => "user",
                    Role::Assistant => "assistant",
                }
                .to_string(),
                content: m.content.clone(),
            })
            .collect();

        let options = OllamaOptions {
            temperature: request.temperature,
            num_predict: request.max_tokens,
            stop: request.stop_sequences.clone(),
        };

        OllamaRequest {
            model: self.model.clone(),
            messages,
            stream: false,
            options: if options.is_empty() {
                None
            } else {
                Some(options)
            },
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn cost_per_token(&self) -> (Decimal, Decimal) {
        (Decimal::ZERO, Decimal::ZERO)
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.build_body(&request);

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    LlmError::Unreachable {
                        provider: PROVIDER.to_string(),
                        reason: e.to_string(),
                    }
                } else {
                    LlmError::RequestFailed {
                        provider: PROVIDER.to_string(),
                        reason: e.to_string(),
                    }
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                provider: PROVIDER.to_string(),
                reason: format!("HTTP {status}: {error_text}"),
            });
        }

        let parsed: OllamaResponse =
            response
                .json()
                .await
                .map_err(|e| LlmError::InvalidResponse {
                    provider: PROVIDER.to_string(),
                    reason: e.to_string(),
                })?;

        Ok(parsed.into_completion())
    }
}

// Ollama API types

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    stop: Vec<String>,
}

impl OllamaOptions {
    fn is_empty(&self) -> bool {
        self.temperature.is_none() && self.num_predict.is_none() && self.stop.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
    #[serde(default)]
    done_reason: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

impl OllamaResponse {
    fn into_completion(self) -> CompletionResponse {
        let finish_reason = match self.done_reason.as_deref() {
            Some("stop") => FinishReason::Stop,
            Some("length") => FinishReason::Length,
            _ => FinishReason::Unknown,
        };
        CompletionResponse {
            content: self.message.content,
            input_tokens: self.prompt_eval_count.unwrap_or(0),
            output_tokens: self.eval_count.unwrap_or(0),
            finish_reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::ChatMessage;

    fn provider() -> OllamaProvider {
        OllamaProvider::new("http://localhost:11434/", "llama3", Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn base_url_trailing_slash_trimmed() {
        assert_eq!(provider().base_url, "http://localhost:11434");
    }

    #[test]
    fn request_body_carries_options() {
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")])
            .with_temperature(0.0)
            .with_stop_sequences(vec!["\nObservation".into()]);
        let body = serde_json::to_value(provider().build_body(&request)).unwrap();

        assert_eq!(body["model"], "llama3");
        assert_eq!(body["stream"], false);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["options"]["stop"][0], "\nObservation");
        assert!(body["options"].get("num_predict").is_none());
    }

    #[test]
    fn request_body_omits_empty_options() {
        let request = CompletionRequest::new(vec![ChatMessage::user("hi")]);
        let body = serde_json::to_value(provider().build_body(&request)).unwrap();
        assert!(body.get("options").is_none());
    }

    #[test]
    fn response_maps_counts_and_reason() {
        let raw = r#"{
            "model": "llama3",
            "message": {"role": "assistant", "content": "Final Answer: done"},
            "done": true,
            "done_reason": "stop",
            "prompt_eval_count": 42,
            "eval_count": 7
        }"#;
        let parsed: OllamaResponse = serde_json::from_str(raw).unwrap();
        let completion = parsed.into_completion();
        assert_eq!(completion.content, "Final Answer: done");
        assert_eq!(completion.input_tokens, 42);
        assert_eq!(completion.output_tokens, 7);
        assert_eq!(completion.finish_reason, FinishReason::Stop);
    }

    #[tokio::test]
    async fn unreachable_server_is_reported() {
        // Port 9 (discard) is closed on test machines.
        let provider =
            OllamaProvider::new("http://127.0.0.1:9", "llama3", Duration::from_secs(2)).unwrap();
        let err = provider
            .complete(CompletionRequest::new(vec![ChatMessage::user("hi")]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            LlmError::Unreachable { .. } | LlmError::RequestFailed { .. }
        ));
    }
}
