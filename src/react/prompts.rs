//! Prompt templates for the reasoning stages

/// System prompt injected when the inbound request carries none
pub const SYSTEM_PROMPT: &str = "You are an autonomous agent operating in a simulated Ubuntu terminal environment. \
Your goal is to complete user instructions efficiently and precisely using available shell tools. \
For each task, you must first think briefly about what to do, then take exactly one action.\n\n\
Guidelines:\n\
- Do not speculate or provide commentary.\n\
- Keep reasoning minimal and strictly focused on task execution.\n\
- Never perform multiple actions in one turn.\n\
- Avoid interactive commands (no user input).\n\
- Respond only with the required format, no extra text.\n";

/// The three legal output shapes, shown to the finalizer
pub const EXPECTED_FORMATS: &str = "\
Think: Explain your reasoning.\n\
Act: bash\n\n\
```bash\n\
# put your bash code here\n\
```\n\n\
Think: Explain why this is an answer.\n\
Act: answer(your_answer_here)\n\n\
Think: Explain why the task is done.\n\
Act: finish\n";

pub fn first_contact_analysis(user_message: &str) -> String {
    format!(
        "Summarize the user's problem in one short sentence.\n\
         User message:\n---\n{}\n---\n\
         Rules:\n- Do NOT propose a solution.\n- Max 30 words.",
        user_message
    )
}

pub fn continuation_analysis(
    current_problem: &str,
    previous_summary: &str,
    last_action: &str,
    output: &str,
) -> String {
    format!(
        "You are analyzing the output of an executed command in a multi-step reasoning process.\n\
         The final goal is: \"{}\"\n\
         Previous summary: \"{}\"\n\
         Last executed action: \"{}\"\n\
         System output: \"{}\"\n\
         Explain in ONE short sentence what this output means in relation to the goal.\n\
         Examples:\n\
         - If it's just a number, it is probably the result (file count).\n\
         - If it's an error, the command failed and needs correction.\n\
         - If unrelated, the output is irrelevant to the goal.\n\
         Return only the interpretation, no extra text.",
        current_problem, previous_summary, last_action, output
    )
}

pub fn first_draft(current_problem: &str) -> String {
    format!(
        "You are an assistant that will act like a person. You MUST follow a strict process to complete the task.\n\
         RULES:\n\
         - You always output in the format:\n\
         Think: <your reasoning>\n\
         Act: <one of bash, answer, or finish>\n\
         - ONE action per step.\n\
         - bash: execute a command inside a ```bash fenced block.\n\
         - answer(<value>): when you have the requested result.\n\
         - finish: ONLY when the task is confirmed done.\n\
         NEVER output explanations or multiple actions.\n\n\
         Current Problem: {}",
        current_problem
    )
}

pub fn continuation_draft(current_problem: &str, analysis_summary: &str, last_action: &str) -> String {
    format!(
        "You are an expert Linux assistant following a strict output format.\n\n\
         Your task:\n\
         - Solve the user's problem by reasoning step by step.\n\
         - Then propose ONE next action (bash command or final answer).\n\n\
         Context:\n\
         - Current Problem: {}\n\
         - Current Analysis Summary: {}\n\
         - Last action you took: {}\n\n\
         Rules:\n\
         1. Start with \"Think:\" and explain your reasoning clearly.\n\
         2. Then output the action using the correct format (Act: ...).\n\
         3. Do NOT add extra text outside the format.\n\
         4. Only ONE action per response.\n\
         5. If the analysis says the result solves the task, return it with Act: answer(<value>).\n\
         6. If the task is not solved yet, return a bash command.",
        current_problem, analysis_summary, last_action
    )
}

pub fn planner_decision(
    analysis_summary: &str,
    draft_solution: &str,
    latest_input: &str,
    tools_used: &[String],
) -> String {
    format!(
        "You are the Planner in a reasoning system.\n\
         Decide the NEXT ACTION to solve the task based on the context below.\n\n\
         Context:\n\
         - Task Summary: {}\n\
         - Last Draft: {}\n\
         - Last user message: {}\n\
         - Tools already used: {:?}\n\n\
         Available actions:\n\
         1. linux_doc(\"command\") if you need details about a Linux command.\n\
         2. search_in_doc(\"command\", \"keyword\") if you need a specific option or flag.\n\
         3. reasoning_draft if you need another reasoning iteration.\n\
         4. reasoning_final if the problem is solved and ready for final output.\n\n\
         Expected output format:\n\
         {{ \"action\": \"<one of: linux_doc, search_in_doc, reasoning_draft, reasoning_final>\", \"input\": {{ \"command\": \"...\", \"keyword\": \"...\" }}, \"reason\": \"<why this>\" }}\n\n\
         Rules:\n\
         - If the draft is good and no more steps are needed: reasoning_final.\n\
         - If you lack details about a command: linux_doc.\n\
         - If you need an option or flag detail: search_in_doc.\n\
         - Otherwise: reasoning_draft to refine the solution.",
        analysis_summary, draft_solution, latest_input, tools_used
    )
}

pub fn final_output(analysis_summary: &str, draft_solution: &str, tool_context: &str) -> String {
    format!(
        "You are finalizing the solution for the task.\n\n\
         Context:\n\
         - Task Summary: {}\n\
         - Previous draft: {}\n\
         - Tool context: {}\n\
         - Possible formats:\n{}\n\
         Rules:\n\
         1. YOU MUST OUTPUT EXACTLY ONE ACTION.\n\
         2. Choose only ONE of the above formats. If you use more than one, the answer is INVALID.\n\
         3. Always start with \"Think:\" then one \"Act:\" line according to the chosen format.\n\
         4. If a numeric result or clear answer is available, use answer(...).\n\
         5. Never guess a result: answer(...) only when the needed output is present in context.\n\
         6. If the task is complete but no numeric answer, use finish.\n\
         7. Do NOT include multiple Act sections. Do NOT add text outside the format.\n\n\
         Output ONLY the reasoning and ONE final action.",
        analysis_summary,
        draft_solution,
        if tool_context.is_empty() { "None" } else { tool_context },
        EXPECTED_FORMATS
    )
}

pub fn rewrite_to_format(raw: &str, template: &str) -> String {
    format!(
        "Rewrite the following response so it conforms EXACTLY to the target template.\n\
         Keep the action and its value unchanged; adjust only the surrounding shape.\n\n\
         Target template:\n---\n{}\n---\n\
         Response to rewrite:\n---\n{}\n---\n\
         Output only the rewritten response, nothing else.",
        template, raw
    )
}
