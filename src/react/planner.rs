//! Planner/router stage
//!
//! An explicit finite-state machine replaces the prototype's imperatively
//! wired graph. The transition rule is a pure function evaluated in fixed
//! priority order; the model is only consulted when the hard heuristics are
//! inconclusive, and its reply is parsed by substring with a refine default.

use std::sync::Arc;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::{Message, TaskState};
use crate::react::parse::{is_numeric_os_signal, parse_action, strip_think_blocks, ParsedAction};
use crate::react::prompts;

/// States of the task-level loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Drafting,
    Planning,
    /// linux_doc lookup
    ToolA,
    /// search_in_doc lookup
    ToolB,
    Finalizing,
    Done,
}

/// Outcome of one planning step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanDecision {
    RefineDraft,
    CallLinuxDoc,
    CallSearchInDoc,
    Finalize,
}

/// A decision plus the text it was derived from (tool arguments are
/// extracted from the rationale)
#[derive(Debug, Clone)]
pub struct Plan {
    pub decision: PlanDecision,
    pub rationale: String,
}

/// Hard transition rules, in fixed priority order. Returns None when the
/// decision must be delegated to the model.
pub fn hard_rule(state: &TaskState, latest_input: &str, max_cycles: u32) -> Option<PlanDecision> {
    // 1. cycle cap overrides everything else
    if state.cycles >= max_cycles {
        return Some(PlanDecision::Finalize);
    }
    // 2. numeric OS output means the result is already in hand
    if is_numeric_os_signal(latest_input) {
        return Some(PlanDecision::Finalize);
    }
    // 3. an already-actionable draft needs no further deliberation
    match parse_action(&state.draft_solution) {
        ParsedAction::Bash(_) | ParsedAction::Answer(_) | ParsedAction::Finish => {
            Some(PlanDecision::Finalize)
        }
        ParsedAction::Malformed => None,
    }
}

/// Substring parse of the delegate reply; ambiguous text defaults to refining
/// the draft. A tool equal to the immediately preceding one is demoted to
/// RefineDraft (loop breaker).
pub fn parse_delegate(text: &str, last_tool: Option<&str>) -> PlanDecision {
    let lower = text.to_lowercase();
    let decision = if lower.contains("linux_doc") {
        PlanDecision::CallLinuxDoc
    } else if lower.contains("search_in_doc") {
        PlanDecision::CallSearchInDoc
    } else if lower.contains("reasoning_final") || lower.contains("finalize") {
        PlanDecision::Finalize
    } else {
        PlanDecision::RefineDraft
    };

    let repeated = match (&decision, last_tool) {
        (PlanDecision::CallLinuxDoc, Some("linux_doc")) => true,
        (PlanDecision::CallSearchInDoc, Some("search_in_doc")) => true,
        _ => false,
    };
    if repeated {
        PlanDecision::RefineDraft
    } else {
        decision
    }
}

/// Pure transition function over state, input and an optional delegate hint
pub fn decide(
    state: &TaskState,
    latest_input: &str,
    delegate_hint: Option<&str>,
    max_cycles: u32,
) -> PlanDecision {
    if let Some(decision) = hard_rule(state, latest_input, max_cycles) {
        return decision;
    }
    match delegate_hint {
        Some(text) => parse_delegate(text, state.tool_history.last().map(|s| s.as_str())),
        None => PlanDecision::RefineDraft,
    }
}

/// Planner stage: applies the hard rules, then delegates to the model
pub struct Planner {
    llm: Arc<dyn LlmClient>,
    max_cycles: u32,
}

impl Planner {
    pub fn new(llm: Arc<dyn LlmClient>, max_cycles: u32) -> Self {
        Self { llm, max_cycles }
    }

    /// `plan(task_state) -> {action, rationale}`
    pub async fn plan(&self, state: &TaskState, latest_input: &str) -> Result<Plan, AgentError> {
        if let Some(decision) = hard_rule(state, latest_input, self.max_cycles) {
            return Ok(Plan {
                decision,
                rationale: "hard rule".to_string(),
            });
        }

        let prompt = prompts::planner_decision(
            &state.analysis_summary,
            &state.draft_solution,
            latest_input,
            &state.tool_history,
        );
        let response = self
            .llm
            .complete(&[Message::system(prompt)])
            .await
            .map_err(AgentError::Llm)?;
        let rationale = strip_think_blocks(&response);
        let decision = parse_delegate(&rationale, state.tool_history.last().map(|s| s.as_str()));
        tracing::debug!(?decision, "planner delegate decision");
        Ok(Plan { decision, rationale })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_cap_overrides_everything() {
        let state = TaskState {
            cycles: 2,
            draft_solution: "completely unusable draft".into(),
            ..Default::default()
        };
        // delegate hint would pick a tool, cap still wins
        assert_eq!(
            decide(&state, "anything", Some("use linux_doc"), 2),
            PlanDecision::Finalize
        );
    }

    #[test]
    fn numeric_os_signal_finalizes() {
        let state = TaskState::default();
        assert_eq!(
            decide(&state, "The output of the OS:\n220", None, 2),
            PlanDecision::Finalize
        );
    }

    #[test]
    fn actionable_draft_finalizes() {
        let state = TaskState {
            draft_solution: "Think: count.\nAct: bash\n\n```bash\nls /etc | wc -l\n```".into(),
            ..Default::default()
        };
        assert_eq!(decide(&state, "plain input", None, 2), PlanDecision::Finalize);

        let state = TaskState {
            draft_solution: "Think: done.\nAct: answer(42)".into(),
            ..Default::default()
        };
        assert_eq!(decide(&state, "plain input", None, 2), PlanDecision::Finalize);
    }

    #[test]
    fn delegate_substring_parsing() {
        assert_eq!(
            parse_delegate("{ \"action\": \"linux_doc\" }", None),
            PlanDecision::CallLinuxDoc
        );
        assert_eq!(
            parse_delegate("I would call search_in_doc here", None),
            PlanDecision::CallSearchInDoc
        );
        assert_eq!(
            parse_delegate("action: reasoning_final, solution complete", None),
            PlanDecision::Finalize
        );
        // ambiguity defaults to refining the draft
        assert_eq!(parse_delegate("hmm, not sure", None), PlanDecision::RefineDraft);
    }

    #[test]
    fn immediate_tool_repeat_is_demoted() {
        assert_eq!(
            parse_delegate("linux_doc again", Some("linux_doc")),
            PlanDecision::RefineDraft
        );
        // a different tool is fine right after
        assert_eq!(
            parse_delegate("search_in_doc", Some("linux_doc")),
            PlanDecision::CallSearchInDoc
        );
        // and the same tool is allowed again later in the task
        assert_eq!(
            parse_delegate("linux_doc", Some("search_in_doc")),
            PlanDecision::CallLinuxDoc
        );
    }

    #[tokio::test]
    async fn hard_rules_skip_the_model() {
        let llm = Arc::new(crate::llm::MockLlmClient::scripted(vec!["unused"]));
        let planner = Planner::new(llm.clone(), 2);
        let state = TaskState {
            cycles: 5,
            ..Default::default()
        };
        let plan = planner.plan(&state, "input").await.unwrap();
        assert_eq!(plan.decision, PlanDecision::Finalize);
        assert_eq!(llm.remaining(), 1);
    }
}
