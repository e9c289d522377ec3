//! `add-task` — record a follow-up on the user's to-do list.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::ToolError;
use crate::tools::effects::{EffectLog, ToolEffect};
use crate::tools::tool::{Tool, ToolContext, ToolOutput, require_input};

/// Adds a new task to the user's to-do list.
pub struct AddTaskTool {
    effects: Arc<EffectLog>,
}

impl AddTaskTool {
    pub fn new(effects: Arc<EffectLog>) -> Self {
        Self { effects }
    }
}

#[async_trait]
impl Tool for AddTaskTool {
    fn name(&self) -> &str {
        "add-task"
    }

    fn description(&self) -> &str {
        "Adds a new task to the user's to-do list. Input: a short description of the task."
    }

    async fn execute(&self, input: &str, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let description = require_input(self.name(), input)?;

        tracing::info!(
            tool = self.name(),
            subject = %ctx.subject,
            task = %description,
            "Adding to-do item"
        );
        self.effects
            .record(
                ctx.run_id,
                &ctx.subject,
                ToolEffect::Task {
                    description: description.to_string(),
                },
            )
            .await;

        Ok(ToolOutput::text("Task added to to-do list.", start.elapsed()))
    }
}
