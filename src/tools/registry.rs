//! Tool registry
//!
//! Tools implement the Tool trait (name / description / execute) and are
//! registered by name; the executor looks them up and applies a timeout.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

/// Tool trait: name, description (for the planner prompt) and async execution
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (used for routing planner decisions)
    fn name(&self) -> &str;

    /// Tool description
    fn description(&self) -> &str;

    /// Execute with JSON args
    async fn execute(&self, args: Value) -> Result<String, String>;
}

/// Registry: stores Arc<dyn Tool> by name
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub async fn execute(&self, name: &str, args: Value) -> Result<String, String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| format!("Unknown tool: {name}"))?;
        tool.execute(args).await
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    /// (name, description) pairs for prompt construction
    pub fn tool_descriptions(&self) -> Vec<(String, String)> {
        self.tools
            .iter()
            .map(|(name, tool)| (name.clone(), tool.description().to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct UpperTool;

    #[async_trait]
    impl Tool for UpperTool {
        fn name(&self) -> &str {
            "upper"
        }
        fn description(&self) -> &str {
            "uppercases text"
        }
        async fn execute(&self, args: Value) -> Result<String, String> {
            Ok(args["text"].as_str().unwrap_or("").to_uppercase())
        }
    }

    #[tokio::test]
    async fn register_and_execute() {
        let mut registry = ToolRegistry::new();
        registry.register(UpperTool);
        let out = registry
            .execute("upper", serde_json::json!({"text": "ok"}))
            .await
            .unwrap();
        assert_eq!(out, "OK");
        assert!(registry.execute("missing", Value::Null).await.is_err());
    }
}
