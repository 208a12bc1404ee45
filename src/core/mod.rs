//! Core layer: error taxonomy and the task orchestrator

pub mod error;
pub mod orchestrator;

pub use error::AgentError;
pub use orchestrator::{ChatMessage, ChatResponse, Orchestrator, TIMEOUT_ACTION};
