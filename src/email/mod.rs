//! Email sources — pluggable providers of the emails to triage.
//!
//! Sources are pure I/O: they produce an ordered list of `Email`s and
//! nothing else. Summaries, classification and actions live in `pipeline`.

mod eml;
mod samples;

pub use eml::EmlDirectorySource;
pub use samples::SampleEmailSource;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Subject used when the raw text has none.
const NO_SUBJECT: &str = "(no subject)";

/// An email to triage. Immutable once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Email {
    /// Subject line.
    pub subject: String,
    /// Raw email text handed to the summarizer (may start with a
    /// `Subject:` line).
    pub body: String,
}

impl Email {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// Build an email from raw text whose first non-blank line is the
    /// subject (optionally prefixed with `Subject:`).
    ///
    /// The body keeps the full text, with common indentation removed.
    pub fn from_raw(raw: &str) -> Self {
        let body = dedent(raw);
        let subject = body
            .lines()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .map(|l| l.strip_prefix("Subject:").unwrap_or(l).trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_SUBJECT.to_string());
        Self { subject, body }
    }
}

/// Trait for email sources.
#[async_trait]
pub trait EmailSource: Send + Sync {
    /// Source name for logging (e.g. "samples", "eml-dir").
    fn name(&self) -> &str;

    /// Load the emails to triage, in processing order.
    async fn load(&self) -> Result<Vec<Email>, PipelineError>;
}

/// Remove the indentation shared by all non-blank lines and trim
/// surrounding blank lines.
fn dedent(raw: &str) -> String {
    let indent = raw
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.len() - l.trim_start().len())
        .min()
        .unwrap_or(0);

    let lines: Vec<&str> = raw
        .lines()
        .map(|l| {
            if l.trim().is_empty() {
                ""
            } else {
                // Indent is measured in bytes of leading whitespace, which is
                // always a char boundary for ASCII whitespace.
                l.get(indent..).unwrap_or(l.trim_start())
            }
        })
        .collect();

    lines.join("\n").trim_matches('\n').to_string()
}
