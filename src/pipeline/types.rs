//! Shared types for the triage pipeline.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::agent::AgentOutcome;
use crate::llm::TokenUsage;

/// Reason recorded when the classifier output cannot be used.
pub const FALLBACK_REASON: &str = "Failed to classify automatically.";

// ── Category ────────────────────────────────────────────────────────

/// Email category assigned by the classifier.
///
/// Only `Urgent`, `Important` and `General` get their own directive; any
/// other label the model invents is kept verbatim in `Other` and routed
/// like `Unknown`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Urgent,
    Important,
    General,
    Unknown,
    Other(String),
}

impl Category {
    /// Parse a model-produced label. Only the exact documented labels
    /// match; an empty label is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "Urgent" => Self::Urgent,
            "Important" => Self::Important,
            "General" => Self::General,
            "Unknown" | "" => Self::Unknown,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Urgent => "Urgent",
            Self::Important => "Important",
            Self::General => "General",
            Self::Unknown => "Unknown",
            Self::Other(label) => label,
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for Category {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<Category> for String {
    fn from(category: Category) -> Self {
        category.label().to_string()
    }
}

// ── Classification ──────────────────────────────────────────────────

/// Classifier verdict. `reason` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub category: Category,
    pub reason: String,
}

impl Classification {
    /// Verdict used when the model output is unusable.
    pub fn unknown() -> Self {
        Self {
            category: Category::Unknown,
            reason: FALLBACK_REASON.to_string(),
        }
    }
}

// ── Per-email results ───────────────────────────────────────────────

/// Pipeline stage an email failed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Summarize,
    Classify,
    Act,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Summarize => "summarize",
            Self::Classify => "classify",
            Self::Act => "act",
        };
        write!(f, "{s}")
    }
}

/// Everything produced for one successfully triaged email.
#[derive(Debug, Clone, Serialize)]
pub struct TriageRecord {
    pub summary: String,
    pub classification: Classification,
    pub directive: String,
    pub agent: AgentOutcome,
}

/// How processing of one email ended.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TriageStatus {
    Completed(Box<TriageRecord>),
    Failed { stage: Stage, error: String },
}

/// Report entry for one email.
#[derive(Debug, Clone, Serialize)]
pub struct EmailReport {
    pub subject: String,
    pub processed_at: DateTime<Utc>,
    pub status: TriageStatus,
    pub usage: TokenUsage,
    pub cost: Decimal,
}

impl EmailReport {
    pub fn record(&self) -> Option<&TriageRecord> {
        match &self.status {
            TriageStatus::Completed(record) => Some(record),
            TriageStatus::Failed { .. } => None,
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, TriageStatus::Completed(_))
    }
}

// ── Batch report ────────────────────────────────────────────────────

/// Result of one orchestrator run, in input order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TriageReport {
    pub emails: Vec<EmailReport>,
}

impl TriageReport {
    pub fn push(&mut self, entry: EmailReport) {
        self.emails.push(entry);
    }

    pub fn len(&self) -> usize {
        self.emails.len()
    }

    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
    }

    /// Emails that went through every stage (the agent itself may still
    /// have stopped on its iteration bound).
    pub fn completed(&self) -> usize {
        self.emails.iter().filter(|e| e.is_completed()).count()
    }

    pub fn failed(&self) -> usize {
        self.len() - self.completed()
    }

    /// Completed emails per category label.
    pub fn by_category(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in self.emails.iter().filter_map(EmailReport::record) {
            *counts
                .entry(record.classification.category.to_string())
                .or_insert(0) += 1;
        }
        counts
    }

    pub fn total_usage(&self) -> TokenUsage {
        let mut usage = TokenUsage::default();
        for entry in &self.emails {
            usage.add(entry.usage);
        }
        usage
    }

    /// Estimated model cost of the whole run.
    pub fn total_cost(&self) -> Decimal {
        self.emails.iter().map(|e| e.cost).sum()
    }
}
