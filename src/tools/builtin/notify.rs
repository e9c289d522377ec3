//! `notify` — urgent notification to the user's chat channel.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::ToolError;
use crate::tools::effects::{EffectLog, ToolEffect};
use crate::tools::tool::{Tool, ToolContext, ToolOutput, require_input};

/// Sends an urgent message to the designated notification channel.
pub struct NotifyTool {
    effects: Arc<EffectLog>,
}

impl NotifyTool {
    pub fn new(effects: Arc<EffectLog>) -> Self {
        Self { effects }
    }
}

#[async_trait]
impl Tool for NotifyTool {
    fn name(&self) -> &str {
        "notify"
    }

    fn description(&self) -> &str {
        "Sends an urgent message to the user's notification channel. \
         Input: the message to send."
    }

    async fn execute(&self, input: &str, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();
        let message = require_input(self.name(), input)?;

        tracing::info!(
            tool = self.name(),
            subject = %ctx.subject,
            message = %message,
            "Sending notification"
        );
        self.effects
            .record(
                ctx.run_id,
                &ctx.subject,
                ToolEffect::Notification {
                    message: message.to_string(),
                },
            )
            .await;

        Ok(ToolOutput::text(
            "Notification sent successfully.",
            start.elapsed(),
        ))
    }
}
