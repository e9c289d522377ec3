//! Reasoning-loop state machine.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// State of an agent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentState {
    /// Waiting on the model for the next step.
    Thinking,
    /// The model asked for a tool; it is being resolved and executed.
    ToolCall,
    /// A tool result is being appended to the transcript.
    Observing,
    /// The model produced a final answer.
    Done,
    /// The loop ran out of iterations or time.
    Failed,
}

impl AgentState {
    /// Check if this state allows transitioning to another state.
    pub fn can_transition_to(&self, target: AgentState) -> bool {
        use AgentState::*;

        matches!(
            (self, target),
            // A reply is either a tool call, a final answer, or unparseable
            // (observed as an error and thought about again).
            (Thinking, ToolCall) | (Thinking, Done) | (Thinking, Observing) |
            (Thinking, Failed) |
            (ToolCall, Observing) |
            (Observing, Thinking) | (Observing, Failed)
        )
    }

    /// Check if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl std::fmt::Display for AgentState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Thinking => "thinking",
            Self::ToolCall => "tool_call",
            Self::Observing => "observing",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

/// Current state plus the path taken to reach it.
#[derive(Debug, Clone)]
pub struct StateMachine {
    state: AgentState,
    history: Vec<AgentState>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            state: AgentState::Thinking,
            history: vec![AgentState::Thinking],
        }
    }

    pub fn state(&self) -> AgentState {
        self.state
    }

    pub fn history(&self) -> &[AgentState] {
        &self.history
    }

    /// Move to `target`, rejecting transitions the table does not allow.
    pub fn transition(&mut self, target: AgentState) -> Result<(), AgentError> {
        if !self.state.can_transition_to(target) {
            return Err(AgentError::InvalidTransition {
                from: self.state.to_string(),
                to: target.to_string(),
            });
        }
        tracing::trace!(from = %self.state, to = %target, "Agent state transition");
        self.state = target;
        self.history.push(target);
        Ok(())
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_transitions() {
        use AgentState::*;

        assert!(Thinking.can_transition_to(ToolCall));
        assert!(Thinking.can_transition_to(Done));
        assert!(ToolCall.can_transition_to(Observing));
        assert!(Observing.can_transition_to(Thinking));

        assert!(!Done.can_transition_to(Thinking));
        assert!(!Failed.can_transition_to(Thinking));
        assert!(!ToolCall.can_transition_to(Done));
        assert!(!Observing.can_transition_to(ToolCall));
    }

    #[test]
    fn test_terminal_states() {
        assert!(AgentState::Done.is_terminal());
        assert!(AgentState::Failed.is_terminal());
        assert!(!AgentState::Thinking.is_terminal());
        assert!(!AgentState::Observing.is_terminal());
    }

    #[test]
    fn test_machine_records_history() {
        let mut machine = StateMachine::new();
        machine.transition(AgentState::ToolCall).unwrap();
        machine.transition(AgentState::Observing).unwrap();
        machine.transition(AgentState::Thinking).unwrap();
        machine.transition(AgentState::Done).unwrap();

        assert_eq!(machine.state(), AgentState::Done);
        assert_eq!(machine.history().len(), 5);
    }

    #[test]
    fn test_machine_rejects_invalid_transition() {
        let mut machine = StateMachine::new();
        machine.transition(AgentState::Done).unwrap();
        let err = machine.transition(AgentState::Thinking).unwrap_err();
        assert!(matches!(err, AgentError::InvalidTransition { .. }));
        assert_eq!(machine.state(), AgentState::Done);
    }

    #[test]
    fn test_display() {
        assert_eq!(AgentState::ToolCall.to_string(), "tool_call");
    }
}
