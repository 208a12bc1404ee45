//! Per-thread task state
//!
//! The unit of persistence in the thread store. Every field is always present
//! and defaulted; the reasoning stages receive a mutable reference and never
//! persist it themselves, the orchestrator does.

use serde::{Deserialize, Serialize};

use crate::memory::Message;

/// Accumulated state of one task on one thread
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TaskState {
    /// Ordered role-tagged history; append-only within a run
    pub messages: Vec<Message>,
    /// One-sentence interpretation of the task or of the latest OS/tool output
    pub analysis_summary: String,
    /// Stable restatement of the user's goal; set once per task, cleared on reset
    pub current_problem: String,
    /// Most recent finalized action; empty means the task has not started
    pub last_action: String,
    /// Latest unvalidated candidate action
    pub draft_solution: String,
    /// Tool names invoked this task, in order
    pub tool_history: Vec<String>,
    /// Concatenated tool results used by the finalizer
    pub tool_context: String,
    /// Planner iterations for the current task
    pub cycles: u32,
    /// Target output template extracted from the first message, when supplied
    pub expected_format: Option<String>,
}

impl TaskState {
    /// Clear the current task while keeping the thread alive. Conversation
    /// history and the output template are thread-scoped and survive. Idempotent.
    pub fn reset(&mut self) {
        self.analysis_summary.clear();
        self.current_problem.clear();
        self.last_action.clear();
        self.draft_solution.clear();
        self.tool_history.clear();
        self.tool_context.clear();
        self.cycles = 0;
    }

    /// Whether a task is already in flight on this thread
    pub fn started(&self) -> bool {
        !self.last_action.is_empty()
    }
}
