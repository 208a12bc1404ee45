//! Action grammar parsing
//!
//! The externally visible contract is one `Think:` block followed by exactly
//! one `Act:` line whose action is `bash` (fenced code block), `answer(...)`
//! or `finish`. Model output gets think-blocks stripped first, then parsed
//! into a tagged result so the fallback path stays unit-testable away from
//! any model call.

use regex::Regex;
use serde_json::Value;

/// Parsed form of a model-produced action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedAction {
    /// Bash command, captured verbatim from the fenced block
    Bash(String),
    /// Final answer value
    Answer(String),
    Finish,
    /// Output does not satisfy the grammar
    Malformed,
}

/// Remove `<think>...</think>` blocks, including multiline ones
pub fn strip_think_blocks(text: &str) -> String {
    let re = Regex::new(r"(?is)<think>.*?</think>\s*").expect("static regex");
    re.replace_all(text, "").trim().to_string()
}

/// Parse a `Think:`/`Act:` response into a tagged action
pub fn parse_action(text: &str) -> ParsedAction {
    let text = strip_think_blocks(text);

    if text.matches("Act:").count() != 1 {
        return ParsedAction::Malformed;
    }
    let after_act = match text.split_once("Act:") {
        Some((_, rest)) => rest.trim_start(),
        None => return ParsedAction::Malformed,
    };

    if after_act.starts_with("bash") {
        return match extract_bash_block(&text) {
            Some(cmd) => ParsedAction::Bash(cmd),
            None => ParsedAction::Malformed,
        };
    }
    if let Some(rest) = after_act.strip_prefix("answer(") {
        // balanced close paren; trailing text after it is ignored
        let mut depth = 1usize;
        for (i, c) in rest.char_indices() {
            match c {
                '(' => depth += 1,
                ')' => {
                    depth -= 1;
                    if depth == 0 {
                        return ParsedAction::Answer(rest[..i].to_string());
                    }
                }
                _ => {}
            }
        }
        return ParsedAction::Malformed;
    }
    if after_act.starts_with("finish") {
        return ParsedAction::Finish;
    }
    ParsedAction::Malformed
}

/// Command text between ```` ```bash ```` and the closing fence, verbatim
fn extract_bash_block(text: &str) -> Option<String> {
    let start = text.find("```bash\n")? + "```bash\n".len();
    let end = text[start..].find("\n```")? + start;
    Some(text[start..end].to_string())
}

/// Render a bash action in the exact output grammar
pub fn format_bash(think: &str, cmd: &str) -> String {
    format!("Think: {}\nAct: bash\n\n```bash\n{}\n```", think, cmd)
}

/// Render an answer action in the exact output grammar
pub fn format_answer(think: &str, value: &str) -> String {
    format!("Think: {}\nAct: answer({})", think, value)
}

/// A bare numeric OS output, either as the whole message or after an
/// "output of the OS" framing line; returns the number when present
pub fn numeric_os_output(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if !trimmed.is_empty() && trimmed.chars().all(|c| c.is_ascii_digit()) {
        return Some(trimmed.to_string());
    }
    let lower = input.to_lowercase();
    let idx = lower.find("output of the os")?;
    let tail = lower[idx + "output of the os".len()..]
        .trim_start_matches(|c: char| c == ':' || c.is_whitespace() || c == '\u{ff1a}');
    let token = tail.split_whitespace().next()?;
    if !token.is_empty() && token.chars().all(|c| c.is_ascii_digit()) {
        Some(token.to_string())
    } else {
        None
    }
}

/// Planner heuristic: the latest input carries a numeric OS-output signal
pub fn is_numeric_os_signal(input: &str) -> bool {
    input.to_lowercase().contains("output of the os")
        && input.chars().any(|c| c.is_ascii_digit())
}

/// Bounded fallback: first balanced, parseable JSON object inside noisy text
pub fn extract_first_json(text: &str) -> Option<Value> {
    let bytes = text.as_bytes();
    let mut search_from = 0;
    while let Some(rel) = text[search_from..].find('{') {
        let open = search_from + rel;
        let mut depth = 0usize;
        let mut in_string = false;
        let mut escaped = false;
        for (i, &b) in bytes.iter().enumerate().skip(open) {
            match b {
                b'"' if !escaped => in_string = !in_string,
                b'\\' if in_string && !escaped => {
                    escaped = true;
                    continue;
                }
                b'{' if !in_string => depth += 1,
                b'}' if !in_string => {
                    depth -= 1;
                    if depth == 0 {
                        if let Ok(v) = serde_json::from_str(&text[open..=i]) {
                            return Some(v);
                        }
                        break;
                    }
                }
                _ => {}
            }
            escaped = false;
        }
        search_from = open + 1;
    }
    None
}

/// Pull a quoted string field out of loosely structured planner text,
/// e.g. `"command": "ls -la"`
pub fn extract_field(raw: &str, key: &str) -> Option<String> {
    let re = Regex::new(&format!(r#""{}"\s*:\s*"([^"]+)""#, regex::escape(key))).ok()?;
    re.captures(raw).map(|c| c[1].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_multiline_think_blocks() {
        let raw = "<think>\nlet me reason\nabout this\n</think>\nAct: finish";
        let cleaned = strip_think_blocks(raw);
        assert!(!cleaned.contains("think"));
        assert!(cleaned.starts_with("Act: finish"));
    }

    #[test]
    fn parses_bash_action() {
        let text = "Think: count entries.\nAct: bash\n\n```bash\nls /etc | wc -l\n```";
        assert_eq!(
            parse_action(text),
            ParsedAction::Bash("ls /etc | wc -l".to_string())
        );
    }

    #[test]
    fn parses_answer_and_finish() {
        assert_eq!(
            parse_action("Think: done.\nAct: answer(220)"),
            ParsedAction::Answer("220".to_string())
        );
        assert_eq!(parse_action("Think: done.\nAct: finish"), ParsedAction::Finish);
    }

    #[test]
    fn answer_value_ends_at_the_balanced_paren() {
        assert_eq!(
            parse_action("Think: t.\nAct: answer(42) and that is final"),
            ParsedAction::Answer("42".to_string())
        );
        assert_eq!(
            parse_action("Think: t.\nAct: answer(f(x))"),
            ParsedAction::Answer("f(x)".to_string())
        );
        assert_eq!(
            parse_action("Think: t.\nAct: answer(42"),
            ParsedAction::Malformed
        );
    }

    #[test]
    fn multiple_act_sections_are_malformed() {
        let text = "Think: hm.\nAct: finish\nAct: answer(1)";
        assert_eq!(parse_action(text), ParsedAction::Malformed);
    }

    #[test]
    fn bash_without_fence_is_malformed() {
        assert_eq!(parse_action("Think: hm.\nAct: bash"), ParsedAction::Malformed);
    }

    #[test]
    fn bash_round_trip_is_verbatim() {
        let cmd = "find /etc -type f | wc -l  # trailing comment";
        let rendered = format_bash("count files", cmd);
        assert_eq!(parse_action(&rendered), ParsedAction::Bash(cmd.to_string()));
    }

    #[test]
    fn numeric_output_detection() {
        assert_eq!(numeric_os_output("220"), Some("220".to_string()));
        assert_eq!(numeric_os_output("  42\n"), Some("42".to_string()));
        assert_eq!(
            numeric_os_output("The output of the OS:\n220"),
            Some("220".to_string())
        );
        assert_eq!(numeric_os_output("The output of the OS:\nerror"), None);
        assert_eq!(numeric_os_output("no numbers here"), None);
    }

    #[test]
    fn numeric_signal_requires_framing_and_digit() {
        assert!(is_numeric_os_signal("The output of the OS:\n220"));
        assert!(!is_numeric_os_signal("220"));
        assert!(!is_numeric_os_signal("The output of the OS:\ndone"));
    }

    #[test]
    fn extracts_json_from_noise() {
        let text = "Sure! Here is my decision: { \"action\": \"linux_doc\" } hope it helps";
        let v = extract_first_json(text).unwrap();
        assert_eq!(v["action"], "linux_doc");
    }

    #[test]
    fn extracts_quoted_fields() {
        let raw = r#"{ "action": "linux_doc", "input": { "command": "grep -r" } }"#;
        assert_eq!(extract_field(raw, "command"), Some("grep -r".to_string()));
        assert_eq!(extract_field(raw, "keyword"), None);
    }
}
