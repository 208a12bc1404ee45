//! Tool executor: wraps registry calls with a timeout and audit logging.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;

use crate::core::AgentError;
use crate::tools::ToolRegistry;

pub struct ToolExecutor {
    registry: Arc<ToolRegistry>,
    timeout: Duration,
}

impl ToolExecutor {
    pub fn new(registry: Arc<ToolRegistry>, timeout_secs: u64) -> Self {
        Self {
            registry,
            timeout: Duration::from_secs(timeout_secs),
        }
    }

    /// Execute a tool by name with a hard timeout. Results and failures are
    /// logged as JSON for auditability.
    pub async fn execute(&self, name: &str, args: Value) -> Result<String, AgentError> {
        tracing::info!(
            tool = name,
            args = %args,
            "tool call"
        );
        let fut = self.registry.execute(name, args);
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(Ok(output)) => {
                tracing::info!(
                    tool = name,
                    output_len = output.len(),
                    "tool ok"
                );
                Ok(output)
            }
            Ok(Err(e)) => {
                tracing::warn!(tool = name, error = %e, "tool failed");
                Err(AgentError::ToolFailed(e))
            }
            Err(_) => {
                tracing::warn!(tool = name, timeout_secs = self.timeout.as_secs(), "tool timed out");
                Err(AgentError::ToolTimeout(name.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use crate::tools::Tool;

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &str {
            "slow"
        }
        fn description(&self) -> &str {
            "sleeps"
        }
        async fn execute(&self, _args: Value) -> Result<String, String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("done".into())
        }
    }

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }
        fn description(&self) -> &str {
            "echoes"
        }
        async fn execute(&self, args: Value) -> Result<String, String> {
            Ok(args["text"].as_str().unwrap_or("").to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_tool_times_out() {
        let mut registry = ToolRegistry::new();
        registry.register(SlowTool);
        let executor = ToolExecutor::new(Arc::new(registry), 1);
        let err = executor.execute("slow", Value::Null).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolTimeout(_)));
    }

    #[tokio::test]
    async fn echo_passes_through() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);
        let executor = ToolExecutor::new(Arc::new(registry), 1);
        let out = executor
            .execute("echo", serde_json::json!({"text": "hi"}))
            .await
            .unwrap();
        assert_eq!(out, "hi");
    }
}
