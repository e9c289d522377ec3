//! Embedded ReAct prompt template.
//!
//! The template is owned by this crate and versioned so agent behaviour is
//! reproducible; bump `REACT_PROMPT_VERSION` whenever the text changes.

pub const REACT_PROMPT_VERSION: &str = "react-v1";

const REACT_TEMPLATE: &str = "\
Answer the following questions as best you can. You have access to the following tools:

{tools}

Use the following format:

Question: the input question you must answer
Thought: you should always think about what to do
Action: the action to take, should be one of [{tool_names}]
Action Input: the input to the action
Observation: the result of the action
... (this Thought/Action/Action Input/Observation can repeat N times)
Thought: I now know the final answer
Final Answer: the final answer to the original input question

Begin!

Question: {input}
Thought:{agent_scratchpad}";

/// Observation prefix; also the stop sequence for each model call.
pub const OBSERVATION_PREFIX: &str = "Observation: ";

/// Prefix written after an observation to prompt the next thought.
pub const THOUGHT_PREFIX: &str = "Thought: ";

/// One completed step: the model's text and the observation it produced.
#[derive(Debug, Clone)]
pub struct ScratchpadEntry {
    pub log: String,
    pub observation: String,
}

/// Render the scratchpad of prior steps.
pub fn render_scratchpad(entries: &[ScratchpadEntry]) -> String {
    let mut pad = String::new();
    for entry in entries {
        pad.push_str(&entry.log);
        pad.push('\n');
        pad.push_str(OBSERVATION_PREFIX);
        pad.push_str(&entry.observation);
        pad.push('\n');
        pad.push_str(THOUGHT_PREFIX);
    }
    pad
}

/// Render the full prompt for one reasoning step.
pub fn render(tools: &str, tool_names: &[&str], input: &str, scratchpad: &str) -> String {
    REACT_TEMPLATE
        .replace("{tools}", tools)
        .replace("{tool_names}", &tool_names.join(", "))
        .replace("{agent_scratchpad}", scratchpad)
        // Input last so braces inside user text are never substituted.
        .replace("{input}", input)
}
