//! Action agent — a bounded ReAct loop over the triage tools.

mod agent_loop;
pub mod parser;
pub mod prompt;
pub mod state;

pub use agent_loop::{
    ActionAgent, AgentConfig, AgentOutcome, AgentStep, STOPPED_ANSWER, ToolInvocation,
};
pub use state::AgentState;
