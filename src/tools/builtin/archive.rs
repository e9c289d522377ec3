//! `archive` — archive the email being triaged.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;

use crate::error::ToolError;
use crate::tools::effects::{EffectLog, ToolEffect};
use crate::tools::tool::{Tool, ToolContext, ToolOutput};

/// Archives the current email. Takes no input; anything given is ignored.
pub struct ArchiveTool {
    effects: Arc<EffectLog>,
}

impl ArchiveTool {
    pub fn new(effects: Arc<EffectLog>) -> Self {
        Self { effects }
    }
}

#[async_trait]
impl Tool for ArchiveTool {
    fn name(&self) -> &str {
        "archive"
    }

    fn description(&self) -> &str {
        "Archives the current email. Input: none (leave empty)."
    }

    async fn execute(&self, _input: &str, ctx: &ToolContext) -> Result<ToolOutput, ToolError> {
        let start = Instant::now();

        tracing::info!(tool = self.name(), subject = %ctx.subject, "Archiving email");
        self.effects
            .record(ctx.run_id, &ctx.subject, ToolEffect::Archived)
            .await;

        Ok(ToolOutput::text("Email archived.", start.elapsed()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn archive_ignores_input() {
        let effects = EffectLog::new();
        let tool = ArchiveTool::new(Arc::clone(&effects));
        let ctx = ToolContext::new("Weekend plans?");

        let output = tool.execute("None", &ctx).await.unwrap();
        assert_eq!(output.content, "Email archived.");
        assert_eq!(effects.all().await[0].effect, ToolEffect::Archived);
    }
}
