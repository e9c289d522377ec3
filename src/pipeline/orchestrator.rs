//! Orchestrator — drives each email through summarize → classify → route →
//! act, one email at a time.
//!
//! A failure in any stage ends that email's run and is recorded in the
//! report; the batch always continues with the next email.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use crate::agent::{ActionAgent, AgentConfig};
use crate::email::{Email, EmailSource};
use crate::error::PipelineError;
use crate::llm::{CompletionService, Metered, TokenUsage};
use crate::pipeline::classifier::Classifier;
use crate::pipeline::router::ActionRouter;
use crate::pipeline::summarizer::Summarizer;
use crate::pipeline::types::{EmailReport, Stage, TriageRecord, TriageReport, TriageStatus};
use crate::tools::ToolRegistry;

/// Running model usage for one email.
#[derive(Default)]
struct Meter {
    usage: TokenUsage,
    cost: Decimal,
}

impl Meter {
    fn take<T>(&mut self, metered: Metered<T>) -> T {
        self.usage.add(metered.usage);
        self.cost += metered.cost;
        metered.value
    }
}

/// Triage pipeline over a shared completion service and tool registry.
pub struct Orchestrator {
    summarizer: Summarizer,
    classifier: Classifier,
    router: ActionRouter,
    agent: ActionAgent,
}

impl Orchestrator {
    pub fn new(
        completion: CompletionService,
        tools: Arc<ToolRegistry>,
        agent_config: AgentConfig,
    ) -> Self {
        Self {
            summarizer: Summarizer::new(completion.clone()),
            classifier: Classifier::new(completion.clone()),
            router: ActionRouter::new(),
            agent: ActionAgent::new(completion, tools, agent_config),
        }
    }

    /// Load every email from `source` and triage them in order.
    ///
    /// Only a failing source is an error; per-email failures land in the
    /// report.
    pub async fn run_source(
        &self,
        source: &dyn EmailSource,
    ) -> Result<TriageReport, PipelineError> {
        let emails = source.load().await?;
        info!(source = source.name(), count = emails.len(), "Loaded emails");
        Ok(self.run(&emails).await)
    }

    /// Triage a batch sequentially. Never aborts on a per-email error.
    pub async fn run(&self, emails: &[Email]) -> TriageReport {
        let total = emails.len();
        info!(total, "Starting email triage");

        let mut report = TriageReport::default();
        for (i, email) in emails.iter().enumerate() {
            info!(
                index = i + 1,
                total,
                subject = %email.subject,
                "Processing email"
            );
            report.push(self.process(email).await);
        }

        info!(
            completed = report.completed(),
            failed = report.failed(),
            total_tokens = report.total_usage().total(),
            cost = %report.total_cost(),
            "Triage batch complete"
        );
        report
    }

    /// Triage one email and build its report entry.
    pub async fn process(&self, email: &Email) -> EmailReport {
        let mut meter = Meter::default();
        let status = match self.triage(email, &mut meter).await {
            Ok(record) => TriageStatus::Completed(Box::new(record)),
            Err((stage, e)) => {
                error!(
                    subject = %email.subject,
                    stage = %stage,
                    error = %e,
                    "Failed to triage email"
                );
                TriageStatus::Failed {
                    stage,
                    error: e.to_string(),
                }
            }
        };

        EmailReport {
            subject: email.subject.clone(),
            processed_at: Utc::now(),
            status,
            usage: meter.usage,
            cost: meter.cost,
        }
    }

    async fn triage(
        &self,
        email: &Email,
        meter: &mut Meter,
    ) -> Result<TriageRecord, (Stage, PipelineError)> {
        // 1. Summarize
        let summary = self
            .summarizer
            .summarize(&email.body)
            .await
            .map_err(|e| (Stage::Summarize, PipelineError::Summarize(e)))?;
        let summary = meter.take(summary);
        info!(subject = %email.subject, summary = %summary, "Summary");

        // 2. Classify
        let classification = self
            .classifier
            .classify(&summary)
            .await
            .map_err(|e| (Stage::Classify, PipelineError::Classify(e)))?;
        let classification = meter.take(classification);
        info!(
            subject = %email.subject,
            category = %classification.category,
            reason = %classification.reason,
            "Classification"
        );

        // 3. Route
        let directive = self.router.route(&classification.category, &summary);
        info!(subject = %email.subject, directive = %directive, "Directive");

        // 4. Act
        let outcome = self
            .agent
            .run(&directive, &email.subject)
            .await
            .map_err(|e| (Stage::Act, PipelineError::Agent(e)))?;
        meter.usage.add(outcome.usage);
        meter.cost += outcome.cost;

        if outcome.succeeded() {
            info!(
                subject = %email.subject,
                run_id = %outcome.run_id,
                transcript = %outcome.transcript(),
                "Agent transcript"
            );
        } else {
            warn!(
                subject = %email.subject,
                run_id = %outcome.run_id,
                failure = outcome.failure.as_deref().unwrap_or("unknown"),
                transcript = %outcome.transcript(),
                "Agent stopped without a final answer"
            );
        }

        Ok(TriageRecord {
            summary,
            classification,
            directive,
            agent: outcome,
        })
    }
}
