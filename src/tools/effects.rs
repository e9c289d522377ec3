//! Record of tool side effects.
//!
//! The tools are stand-ins for a chat webhook, a task tracker and a mail
//! archive. Each successful call appends one entry here and logs it, which
//! makes the actions observable without any external system.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A single side effect performed by a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolEffect {
    Notification { message: String },
    Task { description: String },
    Archived,
}

impl ToolEffect {
    /// Name of the tool that produces this effect.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::Notification { .. } => "notify",
            Self::Task { .. } => "add-task",
            Self::Archived => "archive",
        }
    }
}

/// An effect tagged with the run and email it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct EffectRecord {
    pub run_id: Uuid,
    pub subject: String,
    pub effect: ToolEffect,
    pub at: DateTime<Utc>,
}

/// Append-only effect log shared by the built-in tools.
#[derive(Debug, Default)]
pub struct EffectLog {
    records: RwLock<Vec<EffectRecord>>,
}

impl EffectLog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub async fn record(&self, run_id: Uuid, subject: &str, effect: ToolEffect) {
        self.records.write().await.push(EffectRecord {
            run_id,
            subject: subject.to_string(),
            effect,
            at: Utc::now(),
        });
    }

    /// All records, oldest first.
    pub async fn all(&self) -> Vec<EffectRecord> {
        self.records.read().await.clone()
    }

    /// Records produced by one agent run.
    pub async fn for_run(&self, run_id: Uuid) -> Vec<EffectRecord> {
        self.records
            .read()
            .await
            .iter()
            .filter(|r| r.run_id == run_id)
            .cloned()
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}
