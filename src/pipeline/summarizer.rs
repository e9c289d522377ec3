//! Summarizer — condenses an email body into a few sentences.

use tracing::{debug, warn};

use crate::error::LlmError;
use crate::llm::{CompletionService, Metered};

/// Build the summarization prompt. The body is embedded verbatim.
fn build_summary_prompt(body: &str) -> String {
    format!(
        "\nYou are an expert at summarizing emails. Summarize the following email in a short paragraph, no more than three sentences.\n\
         Email content: {body}\n\
         Summary:\n"
    )
}

/// Summarization stage.
#[derive(Clone)]
pub struct Summarizer {
    completion: CompletionService,
}

impl Summarizer {
    pub fn new(completion: CompletionService) -> Self {
        Self { completion }
    }

    /// Summarize `body` with exactly one completion call.
    ///
    /// An empty completion yields an empty summary rather than an error.
    pub async fn summarize(&self, body: &str) -> Result<Metered<String>, LlmError> {
        let prompt = build_summary_prompt(body);
        let completion = self.completion.complete_with_stop(&prompt, &[]).await?;
        let summary = completion.metered(|text| text.trim().to_string());

        if summary.value.is_empty() {
            warn!(body_chars = body.len(), "Model returned an empty summary");
        } else {
            debug!(summary = %summary.value, "Email summarized");
        }
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::CompletionSettings;
    use crate::llm::service::testing::{DownLlm, FixedLlm, ScriptedLlm};

    fn summarizer(llm: Arc<dyn crate::llm::LlmProvider>) -> Summarizer {
        Summarizer::new(CompletionService::new(llm, CompletionSettings::default()))
    }

    #[test]
    fn prompt_embeds_body_verbatim() {
        let body = "Subject: Server Downtime\n\n  The {production} server is down.";
        let prompt = build_summary_prompt(body);
        assert!(prompt.contains(body));
        assert!(prompt.contains("no more than three sentences"));
        assert!(prompt.trim_end().ends_with("Summary:"));
    }

    #[tokio::test]
    async fn output_is_trimmed() {
        let s = summarizer(Arc::new(FixedLlm("\n  The server is down.  \n".into())));
        let summary = s.summarize("body").await.unwrap();
        assert_eq!(summary.value, "The server is down.");
        assert_eq!(summary.usage.total(), 15);
    }

    #[tokio::test]
    async fn empty_output_is_empty_summary() {
        let s = summarizer(Arc::new(FixedLlm("   ".into())));
        assert_eq!(s.summarize("body").await.unwrap().value, "");
    }

    #[tokio::test]
    async fn exactly_one_call() {
        let llm = Arc::new(ScriptedLlm::new(&["one", "two"]));
        let s = summarizer(llm.clone());
        s.summarize("Hello team").await.unwrap();
        let prompts = llm.prompts();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Email content: Hello team"));
    }

    #[tokio::test]
    async fn backend_failure_propagates() {
        let s = summarizer(Arc::new(DownLlm));
        assert!(matches!(
            s.summarize("body").await.unwrap_err(),
            LlmError::Unreachable { .. }
        ));
    }
}
