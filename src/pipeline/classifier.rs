//! Classifier — labels a summary as Urgent, Important or General.
//!
//! The model is asked for a JSON object `{category, reason}`. Parsing is
//! forgiving (code fences and surrounding prose are stripped) and never
//! fails: unusable output becomes `Unknown`.

use std::sync::LazyLock;

use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::error::LlmError;
use crate::llm::{CompletionService, Metered};
use crate::pipeline::types::{Category, Classification, FALLBACK_REASON};

/// Format instructions describing the expected JSON object.
static FORMAT_INSTRUCTIONS: LazyLock<String> = LazyLock::new(|| {
    let schema = json!({
        "properties": {
            "category": {
                "description": "The classification of the email (Urgent, Important, or General).",
                "title": "Category",
                "type": "string"
            },
            "reason": {
                "description": "A brief reason for the classification.",
                "title": "Reason",
                "type": "string"
            }
        },
        "required": ["category", "reason"]
    });
    format!(
        "The output should be formatted as a JSON instance that conforms to the JSON schema below.\n\n\
         As an example, for the schema {{\"properties\": {{\"foo\": {{\"title\": \"Foo\", \"description\": \"a list of strings\", \"type\": \"array\", \"items\": {{\"type\": \"string\"}}}}}}, \"required\": [\"foo\"]}}\n\
         the object {{\"foo\": [\"bar\", \"baz\"]}} is a well-formatted instance of the schema. \
         The object {{\"properties\": {{\"foo\": [\"bar\", \"baz\"]}}}} is not well-formatted.\n\n\
         Here is the output schema:\n```\n{schema}\n```"
    )
});

/// Build the classification prompt for a summary.
fn build_classification_prompt(summary: &str) -> String {
    format!(
        "\nYou are an intelligent email assistant.\n\
         Given the email summary, classify it as 'Urgent', 'Important', or 'General'.\n\
         Provide a brief reason for your classification.\n\
         {instructions}\n\
         Email Summary: {summary}\n\n\
         IMPORTANT: Output ONLY valid JSON. Do not include any extra text, explanation, or formatting.\n",
        instructions = FORMAT_INSTRUCTIONS.as_str(),
    )
}

/// Classification stage.
#[derive(Clone)]
pub struct Classifier {
    completion: CompletionService,
}

impl Classifier {
    pub fn new(completion: CompletionService) -> Self {
        Self { completion }
    }

    /// Classify a summary with exactly one completion call.
    ///
    /// Only completion-service failures are errors; malformed output is
    /// recovered as `Unknown`.
    pub async fn classify(&self, summary: &str) -> Result<Metered<Classification>, LlmError> {
        let prompt = build_classification_prompt(summary);
        let completion = self.completion.complete_with_stop(&prompt, &[]).await?;
        let classification = completion.metered(|raw| parse_classification(&raw));
        debug!(
            category = %classification.value.category,
            reason = %classification.value.reason,
            "Summary classified"
        );
        Ok(classification)
    }
}

/// Parse the model's reply into a `Classification`.
fn parse_classification(raw: &str) -> Classification {
    let json_str = extract_json_object(raw);
    let value: Value = match serde_json::from_str(&json_str) {
        Ok(v) => v,
        Err(e) => {
            warn!(raw_response = %raw, error = %e, "Classification was not valid JSON");
            return Classification::unknown();
        }
    };

    let field = |name: &str| value.get(name).and_then(Value::as_str);

    // The label is taken as written; only the reason is trimmed.
    let category = match field("category").filter(|s| !s.is_empty()) {
        Some(label) => Category::parse(label),
        None => {
            warn!(raw_response = %raw, "Classification is missing a category");
            Category::Unknown
        }
    };
    let reason = field("reason")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(FALLBACK_REASON)
        .to_string();

    Classification { category, reason }
}

// Same extraction as the inbound-message triage parser.
/// Extract a JSON object from LLM output (handles markdown wrapping).
fn extract_json_object(text: &str) -> String {
    let trimmed = text.trim();

    // Already a JSON object
    if trimmed.starts_with('{') {
        return trimmed.to_string();
    }

    // Wrapped in markdown code block
    if let Some(start) = trimmed.find("```json") {
        let after = &trimmed[start + 7..];
        if let Some(end) = after.find("```") {
            return after[..end].trim().to_string();
        }
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        if let Some(end) = after.find("```") {
            let inner = after[..end].trim();
            if inner.starts_with('{') {
                return inner.to_string();
            }
        }
    }

    // Try to find object bounds
    if let (Some(start), Some(end)) = (trimmed.find('{'), trimmed.rfind('}'))
        && end > start
    {
        return trimmed[start..=end].to_string();
    }

    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::llm::CompletionSettings;
    use crate::llm::service::testing::{DownLlm, FixedLlm, ScriptedLlm};

    fn classifier(llm: Arc<dyn crate::llm::LlmProvider>) -> Classifier {
        Classifier::new(CompletionService::new(llm, CompletionSettings::default()))
    }

    // ── Prompt construction ─────────────────────────────────────────

    #[test]
    fn prompt_contains_schema_and_json_rule() {
        let prompt = build_classification_prompt("The server is down.");
        assert!(prompt.contains("Email Summary: The server is down."));
        assert!(prompt.contains("\"category\""));
        assert!(prompt.contains("\"reason\""));
        assert!(prompt.contains("IMPORTANT: Output ONLY valid JSON."));
    }

    // ── Response parsing ────────────────────────────────────────────

    #[test]
    fn parses_plain_json() {
        let c = parse_classification(r#"{"category": "Urgent", "reason": "Outage"}"#);
        assert_eq!(c.category, Category::Urgent);
        assert_eq!(c.reason, "Outage");
    }

    #[test]
    fn parses_fenced_json() {
        let raw = "```json\n{\"category\": \"Important\", \"reason\": \"Deadline\"}\n```";
        assert_eq!(parse_classification(raw).category, Category::Important);
    }

    #[test]
    fn parses_json_in_prose() {
        let raw =
            "Sure! Here you go: {\"category\": \"General\", \"reason\": \"Chat\"} Hope it helps.";
        let c = parse_classification(raw);
        assert_eq!(c.category, Category::General);
        assert_eq!(c.reason, "Chat");
    }

    #[test]
    fn garbage_is_unknown() {
        let c = parse_classification("I think this one is urgent.");
        assert_eq!(c, Classification::unknown());
    }

    #[test]
    fn missing_fields_fall_back() {
        let c = parse_classification(r#"{"category": ""}"#);
        assert_eq!(c.category, Category::Unknown);
        assert_eq!(c.reason, FALLBACK_REASON);

        let c = parse_classification(r#"{"reason": "no label"}"#);
        assert_eq!(c.category, Category::Unknown);
        assert_eq!(c.reason, "no label");
    }

    #[test]
    fn unrecognised_label_is_kept() {
        let c = parse_classification(r#"{"category": "Spam", "reason": "Ads"}"#);
        assert_eq!(c.category, Category::Other("Spam".into()));
    }

    #[test]
    fn label_case_and_spacing_are_not_normalised() {
        let c = parse_classification(r#"{"category": "urgent", "reason": "Outage"}"#);
        assert_eq!(c.category, Category::Other("urgent".into()));

        let c = parse_classification(r#"{"category": " General ", "reason": " Chat "}"#);
        assert_eq!(c.category, Category::Other(" General ".into()));
        assert_eq!(c.reason, "Chat");
    }

    #[test]
    fn non_string_category_is_unknown() {
        let c = parse_classification(r#"{"category": 3, "reason": "x"}"#);
        assert_eq!(c.category, Category::Unknown);
    }

    #[test]
    fn extract_json_from_markdown() {
        let text = "Here's the result:\n```json\n{\"category\": \"Urgent\"}\n```\nDone.";
        assert_eq!(extract_json_object(text), r#"{"category": "Urgent"}"#);
    }

    #[test]
    fn extract_json_plain() {
        let text = r#"{"category": "General"}"#;
        assert_eq!(extract_json_object(text), text);
    }

    // ── Stage behaviour ─────────────────────────────────────────────

    #[tokio::test]
    async fn classify_makes_one_call() {
        let llm = Arc::new(ScriptedLlm::new(&[r#"{"category": "Urgent", "reason": "down"}"#]));
        let c = classifier(llm.clone());
        let result = c.classify("Server down").await.unwrap();
        assert_eq!(result.value.category, Category::Urgent);
        assert_eq!(llm.prompts().len(), 1);
    }

    #[tokio::test]
    async fn malformed_output_does_not_fail() {
        let c = classifier(Arc::new(FixedLlm("not json at all".into())));
        let result = c.classify("x").await.unwrap();
        assert_eq!(result.value.category, Category::Unknown);
    }

    #[tokio::test]
    async fn empty_summary_with_garbage_reply_is_unknown() {
        let c = classifier(Arc::new(FixedLlm("I cannot tell from that.".into())));
        let result = c.classify("").await.unwrap();
        assert_eq!(result.value.category, Category::Unknown);
        assert_eq!(result.value.reason, FALLBACK_REASON);
    }

    #[tokio::test]
    async fn empty_summary_with_json_reply_is_classified() {
        let llm = Arc::new(ScriptedLlm::new(&[
            r#"{"category": "General", "reason": "Nothing to act on."}"#,
        ]));
        let c = classifier(llm.clone());
        let result = c.classify("").await.unwrap();
        assert_eq!(result.value.category, Category::General);
        assert!(!result.value.reason.is_empty());
        assert!(llm.prompts()[0].contains("Email Summary: \n"));
    }

    #[tokio::test]
    async fn backend_failure_propagates() {
        let c = classifier(Arc::new(DownLlm));
        assert!(c.classify("x").await.is_err());
    }
}
