//! Analysis stage
//!
//! Turns the latest input into a one-sentence task summary. First contact
//! sets `current_problem`; continuation turns interpret the input as the
//! result of the previously chosen action. A reset trigger anywhere in the
//! input clears the task before either branch runs.

use std::sync::Arc;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::{Message, TaskState};
use crate::react::parse::{numeric_os_output, strip_think_blocks};
use crate::react::prompts;

/// Phrase that starts a fresh task on a live thread (matched case-insensitively)
pub const RESET_TRIGGER: &str = "start a new problem";

/// Error substrings that mark an OS output as a failed command
const ERROR_MARKERS: &[&str] = &["not found", "no such", "permission denied", "invalid option"];

/// Tokens that would leak a solution into the problem statement
const COMMAND_TOKENS: &[&str] = &[
    "ls", "grep", "bash", "sh", "cat", "wc", "find", "awk", "sed", "head", "tail", "man",
    "echo", "chmod", "chown", "mkdir", "touch", "rm", "mv", "cp", "sudo", "apt", "npm", "df",
    "du", "ps", "kill", "tar", "curl", "wget",
];

pub fn has_reset_trigger(input: &str) -> bool {
    input.to_lowercase().contains(RESET_TRIGGER)
}

/// Drop digit-bearing and command-like tokens so the restatement cannot
/// contain a proposed solution or a numeric result; capped at 30 words
pub fn sanitize_problem_statement(text: &str) -> String {
    text.split_whitespace()
        .filter(|token| !token.chars().any(|c| c.is_ascii_digit()))
        .filter(|token| {
            let bare: String = token
                .chars()
                .filter(|c| c.is_ascii_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            !COMMAND_TOKENS.contains(&bare.as_str())
        })
        .take(30)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Analysis stage: holds the LLM used for summarization and interpretation
pub struct Analyzer {
    llm: Arc<dyn LlmClient>,
}

impl Analyzer {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// `analyze(task_state, latest_input) -> task_state'`
    pub async fn analyze(&self, state: &mut TaskState, latest_input: &str) -> Result<(), AgentError> {
        // Reset applies before the first-contact/continuation branch is chosen
        if has_reset_trigger(latest_input) {
            tracing::info!("reset trigger detected, clearing task state");
            state.reset();
        }

        state.messages.push(Message::user(latest_input));

        if state.current_problem.is_empty() {
            self.first_contact(state, latest_input).await?;
        } else {
            self.continuation(state, latest_input).await?;
        }

        state
            .messages
            .push(Message::user(format!("[Analysis Summary]\n{}", state.analysis_summary)));
        Ok(())
    }

    async fn first_contact(&self, state: &mut TaskState, latest_input: &str) -> Result<(), AgentError> {
        if state.expected_format.is_none() {
            state.expected_format = extract_expected_format(latest_input);
        }

        // "my problem is: ..." framing; the task text is everything after it
        let task_text = match latest_input.to_lowercase().find("problem is") {
            Some(idx) => latest_input[idx + "problem is".len()..]
                .trim_start_matches([':', ' ', '\n'])
                .to_string(),
            None => latest_input.to_string(),
        };

        let prompt = prompts::first_contact_analysis(&task_text);
        let response = self
            .llm
            .complete(&[Message::system(prompt)])
            .await
            .map_err(AgentError::Llm)?;

        let mut summary = sanitize_problem_statement(&strip_think_blocks(&response));
        if summary.is_empty() {
            summary = sanitize_problem_statement(&task_text);
        }
        tracing::debug!(summary = %summary, "initial problem analysis");

        state.analysis_summary = summary.clone();
        state.current_problem = summary;
        Ok(())
    }

    async fn continuation(&self, state: &mut TaskState, latest_input: &str) -> Result<(), AgentError> {
        let lower = latest_input.to_lowercase();

        // Deterministic pre-classification; only ambiguous outputs reach the model
        let summary = if let Some(n) = numeric_os_output(latest_input) {
            format!(
                "The output {} is probably the result for the goal: {}",
                n, state.current_problem
            )
        } else if let Some(marker) = ERROR_MARKERS.iter().find(|m| lower.contains(**m)) {
            format!("The command failed ({}) and needs correction.", marker)
        } else {
            let prompt = prompts::continuation_analysis(
                &state.current_problem,
                &state.analysis_summary,
                &state.last_action,
                latest_input,
            );
            let response = self
                .llm
                .complete(&[Message::system(prompt)])
                .await
                .map_err(AgentError::Llm)?;
            strip_think_blocks(&response)
        };
        tracing::debug!(summary = %summary, "contextual interpretation");

        state.analysis_summary = summary;
        Ok(())
    }
}

/// An output template supplied in the first message: the block starting at the
/// first format instruction ("Think:" followed by an "Act:" later on)
pub fn extract_expected_format(message: &str) -> Option<String> {
    let start = message.find("Think:")?;
    let block = &message[start..];
    if !block.contains("Act:") {
        return None;
    }
    // Template ends where the task statement begins, when present
    let end = block.to_lowercase().find("now, my problem is").unwrap_or(block.len());
    let template = block[..end].trim();
    if template.is_empty() {
        None
    } else {
        Some(template.to_string())
    }
}
