//! Action agent — the think → act → observe loop.
//!
//! Each iteration renders the ReAct prompt with the directive and the
//! scratchpad of earlier steps, asks the completion service for the next
//! step, and either finishes, runs exactly one tool, or feeds a format error
//! back to the model. The loop is bounded by `max_iterations` and an
//! optional wall-clock budget.

use std::sync::Arc;
use std::time::{Duration, Instant};

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::agent::parser::{self, AgentAction, AgentReply};
use crate::agent::prompt::{self, ScratchpadEntry};
use crate::agent::state::{AgentState, StateMachine};
use crate::error::{AgentError, ToolError};
use crate::llm::{CompletionService, TokenUsage};
use crate::tools::{ToolContext, ToolRegistry};

/// Answer reported when the loop stops without a final answer.
pub const STOPPED_ANSWER: &str = "Agent stopped due to iteration limit or time limit.";

/// Bounds on a single agent run.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub max_iterations: usize,
    /// Wall-clock budget for the whole run; unbounded when `None`.
    pub max_execution_time: Option<Duration>,
    /// Per-call timeout for tool execution.
    pub tool_timeout: Duration,
}

/// A tool call made by the agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolInvocation {
    pub tool_name: String,
    pub input: String,
}

/// One iteration of the loop that did not finish the run.
#[derive(Debug, Clone, Serialize)]
pub struct AgentStep {
    pub iteration: usize,
    /// Model text for this step.
    pub log: String,
    /// The tool call, if the reply parsed as one.
    pub invocation: Option<ToolInvocation>,
    /// What was fed back to the model.
    pub observation: String,
}

/// Result of an agent run that did not hit a completion-service error.
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    pub run_id: Uuid,
    /// `Done` or `Failed`.
    pub state: AgentState,
    pub final_answer: String,
    /// Why the run failed, when `state` is `Failed`.
    pub failure: Option<String>,
    pub steps: Vec<AgentStep>,
    pub iterations: usize,
    pub usage: TokenUsage,
    pub cost: Decimal,
    pub transitions: Vec<AgentState>,
}

impl AgentOutcome {
    pub fn succeeded(&self) -> bool {
        self.state == AgentState::Done
    }

    /// Tool calls in the order they were made (unknown tools included).
    pub fn invocations(&self) -> impl Iterator<Item = &ToolInvocation> {
        self.steps.iter().filter_map(|s| s.invocation.as_ref())
    }

    /// Human-readable transcript for the audit log.
    pub fn transcript(&self) -> String {
        let mut out = String::new();
        for step in &self.steps {
            out.push_str(&format!("[{}] {}\n", step.iteration, step.log.trim()));
            out.push_str(&format!("    Observation: {}\n", step.observation));
        }
        out.push_str(&format!("Final Answer: {}", self.final_answer));
        out
    }
}

/// Bookkeeping for a single run.
struct Run {
    id: Uuid,
    machine: StateMachine,
    scratchpad: Vec<ScratchpadEntry>,
    steps: Vec<AgentStep>,
    usage: TokenUsage,
    cost: Decimal,
}

impl Run {
    fn new(id: Uuid) -> Self {
        Self {
            id,
            machine: StateMachine::new(),
            scratchpad: Vec::new(),
            steps: Vec::new(),
            usage: TokenUsage::default(),
            cost: Decimal::ZERO,
        }
    }

    fn record(
        &mut self,
        iteration: usize,
        log: String,
        invocation: Option<ToolInvocation>,
        observation: String,
    ) {
        self.scratchpad.push(ScratchpadEntry {
            log: log.clone(),
            observation: observation.clone(),
        });
        self.steps.push(AgentStep {
            iteration,
            log,
            invocation,
            observation,
        });
    }

    fn finish(
        self,
        iterations: usize,
        final_answer: String,
        failure: Option<String>,
    ) -> AgentOutcome {
        AgentOutcome {
            run_id: self.id,
            state: self.machine.state(),
            final_answer,
            failure,
            steps: self.steps,
            iterations,
            usage: self.usage,
            cost: self.cost,
            transitions: self.machine.history().to_vec(),
        }
    }
}

/// Tool-calling agent over a fixed tool registry.
pub struct ActionAgent {
    completion: CompletionService,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl ActionAgent {
    pub fn new(
        completion: CompletionService,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            completion,
            tools,
            config,
        }
    }

    /// Run the loop for one directive.
    ///
    /// Iteration and time limits end the run in `Failed` but still return
    /// `Ok`; only completion-service failures are errors.
    pub async fn run(&self, directive: &str, subject: &str) -> Result<AgentOutcome, AgentError> {
        let ctx = ToolContext::new(subject);
        let mut run = Run::new(ctx.run_id);
        let tool_names = self.tools.names();
        let tool_descriptions = self.tools.describe();
        let started = Instant::now();

        info!(
            run_id = %run.id,
            subject = %subject,
            prompt_version = prompt::REACT_PROMPT_VERSION,
            max_iterations = self.config.max_iterations,
            "Agent run started"
        );

        for iteration in 1..=self.config.max_iterations {
            if let Some(budget) = self.config.max_execution_time
                && started.elapsed() >= budget
            {
                return self.stop(run, iteration - 1, AgentError::TimeBudgetExceeded { budget });
            }

            let scratchpad = prompt::render_scratchpad(&run.scratchpad);
            let full_prompt =
                prompt::render(&tool_descriptions, &tool_names, directive, &scratchpad);
            let completion = self
                .completion
                .complete_with_stop(&full_prompt, &[parser::STOP_SEQUENCE])
                .await?;
            run.usage.add(completion.usage);
            run.cost += completion.cost;

            match parser::parse_reply(&completion.text) {
                Ok(AgentReply::Finish { answer, log }) => {
                    run.machine.transition(AgentState::Done)?;
                    debug!(run_id = %run.id, iteration, log = %log, "Agent finished");
                    info!(
                        run_id = %run.id,
                        iterations = iteration,
                        answer = %answer,
                        "Agent run completed"
                    );
                    return Ok(run.finish(iteration, answer, None));
                }
                Ok(AgentReply::Action(action)) => {
                    run.machine.transition(AgentState::ToolCall)?;
                    let observation = self.invoke(&action, &ctx).await;
                    run.machine.transition(AgentState::Observing)?;
                    let invocation = ToolInvocation {
                        tool_name: action.tool,
                        input: action.input,
                    };
                    run.record(iteration, action.log, Some(invocation), observation);
                }
                Err(e) => {
                    warn!(run_id = %run.id, iteration, error = %e, "Unparseable agent reply");
                    run.machine.transition(AgentState::Observing)?;
                    let observation = match e {
                        AgentError::Parse(detail) => detail,
                        other => other.to_string(),
                    };
                    run.record(
                        iteration,
                        completion.text.trim_end().to_string(),
                        None,
                        observation,
                    );
                }
            }

            run.machine.transition(AgentState::Thinking)?;
        }

        let max = self.config.max_iterations;
        self.stop(run, max, AgentError::IterationExceeded { max })
    }

    /// End the run in `Failed` with the forced-stop answer.
    fn stop(
        &self,
        mut run: Run,
        iterations: usize,
        reason: AgentError,
    ) -> Result<AgentOutcome, AgentError> {
        run.machine.transition(AgentState::Failed)?;
        warn!(run_id = %run.id, iterations, reason = %reason, "Agent run stopped");
        Ok(run.finish(iterations, STOPPED_ANSWER.to_string(), Some(reason.to_string())))
    }

    /// Resolve and execute one tool call, returning the observation.
    ///
    /// Unknown tools, tool errors and timeouts all become observations so
    /// the model can correct itself.
    async fn invoke(&self, action: &AgentAction, ctx: &ToolContext) -> String {
        let Some(tool) = self.tools.get(&action.tool) else {
            let err = ToolError::NotFound {
                name: action.tool.clone(),
            };
            warn!(run_id = %ctx.run_id, error = %err, "Agent requested unknown tool");
            return format!(
                "{} is not a valid tool, try one of [{}].",
                action.tool,
                self.tools.names().join(", ")
            );
        };

        debug!(
            run_id = %ctx.run_id,
            tool = %action.tool,
            input = %action.input,
            "Tool call started"
        );

        let timeout = self.config.tool_timeout;
        let result = tokio::time::timeout(timeout, tool.execute(&action.input, ctx)).await;

        match result {
            Ok(Ok(output)) => {
                debug!(
                    run_id = %ctx.run_id,
                    tool = %action.tool,
                    elapsed_ms = output.duration.as_millis() as u64,
                    "Tool call succeeded"
                );
                output.content
            }
            Ok(Err(e)) => {
                warn!(run_id = %ctx.run_id, tool = %action.tool, error = %e, "Tool call failed");
                format!("Error: {e}")
            }
            Err(_) => {
                let err = ToolError::Timeout {
                    name: action.tool.clone(),
                    timeout,
                };
                warn!(run_id = %ctx.run_id, error = %err, "Tool call timed out");
                format!("Error: {err}")
            }
        }
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            max_execution_time: None,
            tool_timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CompletionSettings;
    use crate::llm::service::testing::{DownLlm, FixedLlm, ScriptedLlm};
    use crate::tools::EffectLog;
    use crate::tools::ToolEffect;

    fn agent_with(llm: Arc<dyn crate::llm::LlmProvider>, effects: Arc<EffectLog>) -> ActionAgent {
        ActionAgent::new(
            CompletionService::new(llm, CompletionSettings::default()),
            Arc::new(ToolRegistry::with_builtin(effects)),
            AgentConfig::default(),
        )
    }

    #[tokio::test]
    async fn tool_call_then_final_answer() {
        let llm = Arc::new(ScriptedLlm::new(&[
            " This is urgent.\nAction: notify\nAction Input: Production server outage",
            " I now know the final answer\nFinal Answer: The team has been notified.",
        ]));
        let effects = EffectLog::new();
        let agent = agent_with(llm.clone(), Arc::clone(&effects));

        let outcome = agent.run("This email is urgent.", "Server Downtime").await.unwrap();

        assert!(outcome.succeeded());
        assert_eq!(outcome.final_answer, "The team has been notified.");
        assert_eq!(outcome.iterations, 2);
        let calls: Vec<_> = outcome.invocations().collect();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].tool_name, "notify");
        assert_eq!(outcome.steps[0].observation, "Notification sent successfully.");

        let records = effects.for_run(outcome.run_id).await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].subject, "Server Downtime");

        // Second prompt carries the first step and its observation.
        let prompts = llm.prompts();
        assert!(prompts[1].contains("Observation: Notification sent successfully."));
        assert_eq!(
            outcome.transitions,
            vec![
                AgentState::Thinking,
                AgentState::ToolCall,
                AgentState::Observing,
                AgentState::Thinking,
                AgentState::Done
            ]
        );
    }

    #[tokio::test]
    async fn unknown_tool_is_observed_and_loop_continues() {
        let llm = Arc::new(ScriptedLlm::new(&[
            "Action: send_slack_notification\nAction Input: hi",
            "Action: archive\nAction Input: ",
            "Final Answer: archived",
        ]));
        let effects = EffectLog::new();
        let agent = agent_with(llm, Arc::clone(&effects));

        let outcome = agent.run("unclear", "Weekend plans?").await.unwrap();

        assert!(outcome.succeeded());
        assert_eq!(
            outcome.steps[0].observation,
            "send_slack_notification is not a valid tool, try one of [notify, add-task, archive]."
        );
        assert_eq!(effects.all().await[0].effect, ToolEffect::Archived);
    }

    #[tokio::test]
    async fn format_error_is_fed_back() {
        let llm = Arc::new(ScriptedLlm::new(&[
            "I should probably archive this.",
            "Action: archive\nAction Input: none",
            "Final Answer: done",
        ]));
        let agent = agent_with(llm.clone(), EffectLog::new());

        let outcome = agent.run("general", "x").await.unwrap();

        assert!(outcome.succeeded());
        assert!(outcome.steps[0].invocation.is_none());
        assert!(outcome.steps[0].observation.contains("Missing 'Action:'"));
        assert!(llm.prompts()[1].contains("Observation: Invalid Format"));
    }

    #[tokio::test]
    async fn tool_error_is_observed() {
        let llm = Arc::new(ScriptedLlm::new(&[
            "Action: notify\nAction Input: ",
            "Final Answer: gave up",
        ]));
        let effects = EffectLog::new();
        let agent = agent_with(llm, Arc::clone(&effects));

        let outcome = agent.run("urgent", "x").await.unwrap();
        assert!(outcome.steps[0].observation.starts_with("Error: "));
        assert!(effects.is_empty().await);
    }

    #[tokio::test]
    async fn iteration_limit_fails_without_error() {
        let llm = Arc::new(FixedLlm("Action: archive\nAction Input: none".into()));
        let effects = EffectLog::new();
        let agent = ActionAgent::new(
            CompletionService::new(llm, CompletionSettings::default()),
            Arc::new(ToolRegistry::with_builtin(Arc::clone(&effects))),
            AgentConfig {
                max_iterations: 3,
                ..Default::default()
            },
        );

        let outcome = agent.run("loop forever", "x").await.unwrap();

        assert_eq!(outcome.state, AgentState::Failed);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.final_answer, STOPPED_ANSWER);
        assert!(outcome.failure.unwrap().contains("3 iterations"));
        // One tool per iteration.
        assert_eq!(effects.len().await, 3);
    }

    #[tokio::test]
    async fn exhausted_time_budget_fails() {
        let llm = Arc::new(FixedLlm("Action: archive\nAction Input: none".into()));
        let agent = ActionAgent::new(
            CompletionService::new(llm, CompletionSettings::default()),
            Arc::new(ToolRegistry::with_builtin(EffectLog::new())),
            AgentConfig {
                max_execution_time: Some(Duration::ZERO),
                ..Default::default()
            },
        );

        let outcome = agent.run("x", "x").await.unwrap();
        assert_eq!(outcome.state, AgentState::Failed);
        assert_eq!(outcome.iterations, 0);
        assert!(outcome.failure.unwrap().contains("time budget"));
    }

    #[tokio::test]
    async fn completion_failure_is_an_error() {
        let agent = agent_with(Arc::new(DownLlm), EffectLog::new());
        let err = agent.run("x", "x").await.unwrap_err();
        assert!(matches!(err, AgentError::Llm(_)));
    }

    #[tokio::test]
    async fn transcript_lists_steps() {
        let llm = Arc::new(ScriptedLlm::new(&[
            "Action: add-task\nAction Input: Submit report",
            "Final Answer: Task tracked.",
        ]));
        let agent = agent_with(llm, EffectLog::new());
        let outcome = agent.run("important", "x").await.unwrap();

        let transcript = outcome.transcript();
        assert!(transcript.contains("[1] Action: add-task"));
        assert!(transcript.contains("Observation: Task added to to-do list."));
        assert!(transcript.ends_with("Final Answer: Task tracked."));
    }
}
