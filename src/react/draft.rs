//! Draft-reasoning stage
//!
//! Produces the candidate next step. The numeric fast path synthesizes
//! `answer(<n>)` without a model call when the previous bash command already
//! produced the value; that path must stay deterministic.

use std::sync::Arc;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::{Message, TaskState};
use crate::react::parse::{format_answer, numeric_os_output, strip_think_blocks};
use crate::react::prompts;

/// Whether the finalized action was a bash invocation
pub fn is_bash_action(action: &str) -> bool {
    action.contains("```bash") || action.contains("Act: bash")
}

/// Deterministic shortcut: prior bash action plus numeric output means the
/// number is the answer
pub fn numeric_fast_path(state: &TaskState, latest_input: &str) -> Option<String> {
    if !is_bash_action(&state.last_action) {
        return None;
    }
    let n = numeric_os_output(latest_input)?;
    Some(format_answer(
        &format!("The OS returned {}, which answers the task.", n),
        &n,
    ))
}

/// Draft stage: proposes one candidate action per turn
pub struct Drafter {
    llm: Arc<dyn LlmClient>,
}

impl Drafter {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// `draft(task_state) -> task_state'` with `draft_solution` populated
    pub async fn draft(&self, state: &mut TaskState, latest_input: &str) -> Result<(), AgentError> {
        if let Some(fast) = numeric_fast_path(state, latest_input) {
            tracing::debug!("numeric fast path, skipping model call");
            state.draft_solution = fast;
        } else {
            let prompt = if state.started() {
                prompts::continuation_draft(
                    &state.current_problem,
                    &state.analysis_summary,
                    &state.last_action,
                )
            } else {
                prompts::first_draft(&state.current_problem)
            };
            let response = self
                .llm
                .complete(&[Message::system(prompt)])
                .await
                .map_err(AgentError::Llm)?;
            state.draft_solution = strip_think_blocks(&response);
        }

        state
            .messages
            .push(Message::user(format!("[Draft Solution]\n{}", state.draft_solution)));
        Ok(())
    }
}
