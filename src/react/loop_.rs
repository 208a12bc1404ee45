//! Reasoning loop driver.
//!
//! Runs one turn of the agent as a small state machine:
//! analyze, then draft / plan / tool rounds until the planner (or a hard
//! rule) routes to finalization. Tool rounds count against the cycle cap;
//! planning rounds are separately bounded so a refine loop cannot spin
//! forever.

use std::sync::Arc;

use serde_json::json;

use crate::core::AgentError;
use crate::llm::LlmClient;
use crate::memory::{Message, TaskState};
use crate::react::analyze::Analyzer;
use crate::react::draft::Drafter;
use crate::react::finalize::Finalizer;
use crate::react::parse::{extract_field, extract_first_json, parse_action, ParsedAction};
use crate::react::planner::{Phase, PlanDecision, Planner};
use crate::tools::ToolExecutor;

pub struct TaskAgent {
    analyzer: Analyzer,
    drafter: Drafter,
    planner: Planner,
    finalizer: Finalizer,
    executor: Arc<ToolExecutor>,
    max_plan_steps: u32,
}

impl TaskAgent {
    pub fn new(
        llm: Arc<dyn LlmClient>,
        executor: Arc<ToolExecutor>,
        max_cycles: u32,
        max_plan_steps: u32,
    ) -> Self {
        Self {
            analyzer: Analyzer::new(llm.clone()),
            drafter: Drafter::new(llm.clone()),
            planner: Planner::new(llm.clone(), max_cycles),
            finalizer: Finalizer::new(llm),
            executor,
            max_plan_steps,
        }
    }

    /// Run one full turn against the given thread state. Returns the final
    /// `Think:`/`Act:` action text, which is also recorded on the state.
    pub async fn run(
        &self,
        state: &mut TaskState,
        latest_input: &str,
    ) -> Result<String, AgentError> {
        self.analyzer.analyze(state, latest_input).await?;

        let mut phase = Phase::Drafting;
        // arguments for the pending tool phase, taken from the planner output
        let mut rationale = String::new();
        let mut plan_steps: u32 = 0;

        while phase != Phase::Done {
            match phase {
                Phase::Drafting => {
                    self.drafter.draft(state, latest_input).await?;
                    phase = Phase::Planning;
                }
                Phase::Planning => {
                    plan_steps += 1;
                    if plan_steps > self.max_plan_steps {
                        tracing::warn!(plan_steps, "plan step limit reached, finalizing");
                        phase = Phase::Finalizing;
                        continue;
                    }
                    let plan = self.planner.plan(state, latest_input).await?;
                    tracing::debug!(decision = ?plan.decision, "planner decision");
                    rationale = plan.rationale;
                    phase = match plan.decision {
                        PlanDecision::RefineDraft => Phase::Drafting,
                        PlanDecision::CallLinuxDoc => Phase::ToolA,
                        PlanDecision::CallSearchInDoc => Phase::ToolB,
                        PlanDecision::Finalize => Phase::Finalizing,
                    };
                }
                Phase::ToolA => {
                    let command = self.tool_command(state, &rationale);
                    let result = self.run_tool("linux_doc", json!({ "command": command })).await;
                    state.cycles += 1;
                    self.record_tool(state, "linux_doc", &result);
                    phase = Phase::Planning;
                }
                Phase::ToolB => {
                    let command = self.tool_command(state, &rationale);
                    let keyword = plan_field(&rationale, "keyword")
                        .unwrap_or_else(|| state.current_problem.clone());
                    let result = self
                        .run_tool(
                            "search_in_doc",
                            json!({ "command": command, "keyword": keyword }),
                        )
                        .await;
                    state.cycles += 1;
                    self.record_tool(state, "search_in_doc", &result);
                    phase = Phase::Planning;
                }
                Phase::Finalizing => {
                    let action = self.finalizer.finalize(state).await?;
                    state.last_action = action.clone();
                    state.messages.push(Message::assistant(&action));
                    phase = Phase::Done;
                }
                Phase::Done => {}
            }
        }
        Ok(state.last_action.clone())
    }

    /// Best-effort tool call: failures become inline error context instead of
    /// aborting the turn, so the model can still reason about them.
    async fn run_tool(&self, name: &str, args: serde_json::Value) -> String {
        match self.executor.execute(name, args).await {
            Ok(output) => output,
            Err(e) => format!("Error: {e}"),
        }
    }

    fn record_tool(&self, state: &mut TaskState, name: &str, result: &str) {
        state
            .messages
            .push(Message::assistant(&format!("[{name} RESULT]\n{result}")));
        if !state.tool_context.is_empty() {
            state.tool_context.push_str("\n\n");
        }
        state.tool_context.push_str(result);
        state.tool_history.push(name.to_string());
    }

    /// Pick the command a tool should target: the planner's rationale when it
    /// carries one, otherwise the command from the current draft.
    fn tool_command(&self, state: &TaskState, rationale: &str) -> String {
        if let Some(cmd) = plan_field(rationale, "command") {
            return cmd;
        }
        if let ParsedAction::Bash(cmd) = parse_action(&state.draft_solution) {
            if let Some(first) = cmd.split_whitespace().next() {
                return first.to_string();
            }
        }
        "ls".to_string()
    }
}

/// Pull a tool argument out of the planner's reply: structured JSON first,
/// then a loose quoted-field scan for replies that only resemble JSON.
fn plan_field(rationale: &str, key: &str) -> Option<String> {
    if let Some(v) = extract_first_json(rationale) {
        for path in [format!("/input/{key}"), format!("/{key}")] {
            if let Some(value) = v.pointer(&path).and_then(|x| x.as_str()) {
                let value = value.trim();
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    extract_field(rationale, key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::mock::MockLlmClient;
    use crate::react::parse::format_bash;
    use crate::tools::{Tool, ToolRegistry};
    use async_trait::async_trait;

    struct FakeDoc;

    #[async_trait]
    impl Tool for FakeDoc {
        fn name(&self) -> &str {
            "linux_doc"
        }
        fn description(&self) -> &str {
            "fake"
        }
        async fn execute(&self, args: serde_json::Value) -> Result<String, String> {
            Ok(format!(
                "DOC({})",
                args["command"].as_str().unwrap_or("?")
            ))
        }
    }

    struct FakeSearch;

    #[async_trait]
    impl Tool for FakeSearch {
        fn name(&self) -> &str {
            "search_in_doc"
        }
        fn description(&self) -> &str {
            "fake"
        }
        async fn execute(&self, args: serde_json::Value) -> Result<String, String> {
            Ok(format!(
                "HITS({})",
                args["keyword"].as_str().unwrap_or("?")
            ))
        }
    }

    fn agent(llm: Arc<MockLlmClient>) -> TaskAgent {
        let mut registry = ToolRegistry::new();
        registry.register(FakeDoc);
        registry.register(FakeSearch);
        let executor = Arc::new(ToolExecutor::new(Arc::new(registry), 5));
        TaskAgent::new(llm, executor, 2, 8)
    }

    #[tokio::test]
    async fn actionable_draft_routes_straight_to_finalize() {
        let action = format_bash("Count the files.", "ls | wc -l");
        let llm = Arc::new(MockLlmClient::scripted(vec![
            "The user needs a shell one-liner.".to_string(), // analysis
            action.clone(),                      // draft
            action.clone(),                      // finalize
        ]));
        let agent = agent(llm.clone());
        let mut state = TaskState::default();
        let out = agent.run(&mut state, "how do I count files here").await.unwrap();
        assert!(out.contains("Act: bash"));
        assert_eq!(llm.remaining(), 0);
        assert_eq!(state.cycles, 0);
    }

    #[tokio::test]
    async fn doc_lookup_consumes_a_cycle() {
        let action = format_bash("Use tar with -z.", "tar -czf out.tar.gz dir");
        let llm = Arc::new(MockLlmClient::scripted(vec![
            "The user wants to compress a directory.".to_string(), // analysis
            "I am not sure which flag compresses.".to_string(),    // draft (not actionable)
            "Delegate to linux_doc {\"command\": \"tar\"}".to_string(), // planner
            "Refine the draft with the new context.".to_string(),  // planner after tool
            action.clone(),                                        // redraft (now actionable)
            action.clone(),                                        // finalize
        ]));
        let agent = agent(llm);
        let mut state = TaskState::default();
        let out = agent.run(&mut state, "how do I compress a folder").await.unwrap();
        assert!(out.contains("tar"));
        assert_eq!(state.cycles, 1);
        assert_eq!(state.tool_history, vec!["linux_doc"]);
        assert!(state.tool_context.contains("DOC(tar)"));
    }

    #[tokio::test]
    async fn cycle_cap_forces_finalization() {
        // Draft stays unactionable and the planner keeps asking for docs;
        // after two tool rounds the hard rule must cut the loop (no third
        // planner delegate call happens).
        let llm = Arc::new(MockLlmClient::scripted(vec![
            "Analysis.",
            "Not actionable yet.",
            "Delegate to linux_doc {\"command\": \"ls\"}",
            "Delegate to search_in_doc {\"command\": \"ls\", \"keyword\": \"count\"}",
            "Think: Nothing worked.\nAct: finish",
        ]));
        let agent = agent(llm);
        let mut state = TaskState::default();
        let out = agent.run(&mut state, "impossible request").await.unwrap();
        assert!(out.contains("Act: finish"));
        assert_eq!(state.cycles, 2);
    }
}
