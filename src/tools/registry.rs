//! Tool registry — fixed name → tool lookup table built at startup.

use std::collections::HashMap;
use std::sync::Arc;

use crate::tools::builtin::{AddTaskTool, ArchiveTool, NotifyTool};
use crate::tools::effects::EffectLog;
use crate::tools::tool::Tool;

/// Registry of available tools, in registration order.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
    order: Vec<String>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
            order: Vec::new(),
        }
    }

    /// Registry holding the three triage tools: notify, add-task, archive.
    pub fn with_builtin(effects: Arc<EffectLog>) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(NotifyTool::new(Arc::clone(&effects))));
        registry.register(Arc::new(AddTaskTool::new(Arc::clone(&effects))));
        registry.register(Arc::new(ArchiveTool::new(effects)));
        registry
    }

    /// Register a tool. A second tool with an existing name is rejected.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> bool {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            tracing::warn!(tool = %name, "Rejected tool registration: name already taken");
            return false;
        }
        self.order.push(name.clone());
        self.tools.insert(name.clone(), tool);
        tracing::debug!("Registered tool: {}", name);
        true
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Tool names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.order.iter().map(String::as_str).collect()
    }

    /// `name: description` lines for the agent prompt.
    pub fn describe(&self) -> String {
        self.order
            .iter()
            .filter_map(|name| self.tools.get(name))
            .map(|tool| format!("{}: {}", tool.name(), tool.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::tools::tool::{ToolContext, ToolOutput};
    use async_trait::async_trait;
    use std::time::Duration;

    struct MockTool {
        name: String,
    }

    #[async_trait]
    impl Tool for MockTool {
        fn name(&self) -> &str {
            &self.name
        }
        fn description(&self) -> &str {
            "A mock tool for testing"
        }
        async fn execute(
            &self,
            _input: &str,
            _ctx: &ToolContext,
        ) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::text("mock", Duration::from_millis(1)))
        }
    }

    fn mock(name: &str) -> Arc<dyn Tool> {
        Arc::new(MockTool {
            name: name.to_string(),
        })
    }

    #[test]
    fn test_register_and_get() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register(mock("test_tool")));
        assert!(registry.get("nonexistent").is_none());
        assert_eq!(registry.get("test_tool").unwrap().name(), "test_tool");
    }

    #[test]
    fn test_duplicate_rejected() {
        let mut registry = ToolRegistry::new();
        assert!(registry.register(mock("a")));
        assert!(!registry.register(mock("a")));
        assert_eq!(registry.names(), vec!["a"]);
    }

    #[test]
    fn test_builtin_order_and_descriptions() {
        let registry = ToolRegistry::with_builtin(EffectLog::new());
        assert_eq!(registry.names(), vec!["notify", "add-task", "archive"]);

        let described = registry.describe();
        let lines: Vec<&str> = described.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("notify: "));
        assert!(lines[2].starts_with("archive: "));
    }
}
