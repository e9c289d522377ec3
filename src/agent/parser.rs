//! Parser for plain-text ReAct replies.
//!
//! A reply is either a tool call:
//!
//! ```text
//! Thought: this is urgent
//! Action: notify
//! Action Input: Production server is down
//! ```
//!
//! or a final answer (`Final Answer: ...`). Anything else is a format error
//! the loop reports back to the model.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::AgentError;

/// Marker introducing the final answer.
pub const FINAL_ANSWER: &str = "Final Answer:";

/// Models sometimes invent their own observation; everything from here on
/// is discarded.
pub const STOP_SEQUENCE: &str = "\nObservation";

static ACTION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)[\s]*Action\s*\d*\s*Input\s*\d*\s*:[\s]*(.*)")
        .expect("action regex is valid")
});

static ACTION_ONLY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)Action\s*\d*\s*:[\s]*(.*?)").expect("action regex is valid"));

/// A tool call requested by the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentAction {
    pub tool: String,
    pub input: String,
    /// Full reply text, replayed in the scratchpad.
    pub log: String,
}

/// A parsed model reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentReply {
    Action(AgentAction),
    Finish { answer: String, log: String },
}

/// Parse one model reply.
pub fn parse_reply(text: &str) -> Result<AgentReply, AgentError> {
    let text = match text.find(STOP_SEQUENCE) {
        Some(idx) => &text[..idx],
        None => text,
    };
    let includes_answer = text.contains(FINAL_ANSWER);

    if let Some(caps) = ACTION_RE.captures(text) {
        if includes_answer {
            return Err(AgentError::Parse(format!(
                "Parsing LLM output produced both a final answer and a parse-able action: {}",
                text.trim()
            )));
        }
        let tool = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
        let input = caps
            .get(2)
            .map(|m| m.as_str().trim().trim_matches('"'))
            .unwrap_or_default();
        return Ok(AgentReply::Action(AgentAction {
            tool: tool.to_string(),
            input: input.to_string(),
            log: text.trim_end().to_string(),
        }));
    }

    if includes_answer {
        let answer = text
            .rsplit(FINAL_ANSWER)
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        return Ok(AgentReply::Finish {
            answer,
            log: text.trim_end().to_string(),
        });
    }

    if !ACTION_ONLY_RE.is_match(text) {
        return Err(AgentError::Parse(
            "Invalid Format: Missing 'Action:' after 'Thought:'".to_string(),
        ));
    }
    Err(AgentError::Parse(
        "Invalid Format: Missing 'Action Input:' after 'Action:'".to_string(),
    ))
}
