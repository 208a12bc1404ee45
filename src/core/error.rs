//! Agent error types
//!
//! Per-request errors are recoverable: the orchestrator maps them to a
//! well-formed error action in the response instead of failing the call.

use thiserror::Error;

/// Errors that can occur while running the reasoning loop
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),

    #[error("Tool execution failed: {0}")]
    ToolFailed(String),

    #[error("Tool timeout: {0}")]
    ToolTimeout(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Config error: {0}")]
    Config(String),

    #[error("Request queue closed")]
    QueueClosed,
}
