//! Action router — turns a category and summary into an agent directive.

use crate::pipeline::types::Category;

/// Formatting rules appended to every directive.
pub const FORMAT_RULES: &str = "IMPORTANT: When you take an action, use the following format exactly:\n\
Action: <tool name>\n\
Action Input: <input for the tool>\n\
Do not use JSON or code blocks.";

/// Deterministic category → directive mapping. Holds no state.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionRouter;

impl ActionRouter {
    pub fn new() -> Self {
        Self
    }

    /// Build the directive for the agent. Total over every category.
    pub fn route(&self, category: &Category, summary: &str) -> String {
        let instruction = match category {
            Category::Urgent => format!(
                "This email is urgent. The summary is: '{summary}'. It requires immediate attention. Use the appropriate tool to notify me."
            ),
            Category::Important => format!(
                "This email is important. The summary is: '{summary}'. It contains a task that needs to be done. Use the appropriate tool to track this task."
            ),
            Category::General => format!(
                "This is a general email. The summary is: '{summary}'. It does not require a specific action. Use the appropriate tool to handle it."
            ),
            Category::Unknown | Category::Other(_) => format!(
                "The classification was unclear. Summary: '{summary}'. Use the archive tool as a default."
            ),
        };
        format!("{instruction} {FORMAT_RULES}")
    }
}
