//! Documentation tools backed by a local man-page service.
//!
//! linux_doc fetches the documentation for a command, truncated to a
//! configurable length. search_in_doc fetches the same document and returns
//! the first lines containing a keyword.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::tools::Tool;

/// Wire shape returned by the doc service. `summary` lists the section
/// names present in the manual page.
#[derive(Debug, Deserialize)]
pub struct DocResponse {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub summary: Vec<String>,
    #[serde(default)]
    pub full_doc: String,
    #[serde(default)]
    pub error: Option<String>,
}

/// HTTP client for the doc service.
pub struct DocClient {
    http: reqwest::Client,
    base_url: String,
}

impl DocClient {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, String> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| format!("Failed to build HTTP client: {e}"))?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub async fn get_doc(&self, command: &str) -> Result<DocResponse, String> {
        let url = format!("{}/get_doc", self.base_url);
        let resp = self
            .http
            .get(&url)
            .query(&[("command", command)])
            .send()
            .await
            .map_err(|e| format!("Doc service request failed: {e}"))?;
        resp.json::<DocResponse>()
            .await
            .map_err(|e| format!("Doc service returned invalid JSON: {e}"))
    }
}

fn arg_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, String> {
    args.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| format!("Missing required argument: {key}"))
}

/// "ls -la" means the ls man page
fn command_token(raw: &str) -> &str {
    raw.split_whitespace().next().unwrap_or(raw)
}

/// Fetch documentation for a command, truncated to max_chars.
pub struct LinuxDocTool {
    client: Arc<DocClient>,
    max_chars: usize,
}

impl LinuxDocTool {
    pub fn new(client: Arc<DocClient>, max_chars: usize) -> Self {
        Self { client, max_chars }
    }
}

#[async_trait]
impl Tool for LinuxDocTool {
    fn name(&self) -> &str {
        "linux_doc"
    }

    fn description(&self) -> &str {
        "Fetch the manual page for a Linux command. Args: {\"command\": \"<name>\"}"
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let command = command_token(arg_str(&args, "command")?);
        let doc = self.client.get_doc(command).await?;
        if doc.error.is_some() {
            return Ok(format!("No documentation found for '{command}'"));
        }
        let mut text = doc.full_doc;
        if text.is_empty() {
            text = doc.summary.join("\n");
        }
        if text.len() > self.max_chars {
            let cut = truncate_at_boundary(&text, self.max_chars);
            text.truncate(cut);
        }
        Ok(text)
    }
}

/// Search the documentation of a command for a keyword, returning the first
/// matching lines.
pub struct SearchInDocTool {
    client: Arc<DocClient>,
    max_matches: usize,
}

impl SearchInDocTool {
    pub fn new(client: Arc<DocClient>, max_matches: usize) -> Self {
        Self {
            client,
            max_matches,
        }
    }
}

#[async_trait]
impl Tool for SearchInDocTool {
    fn name(&self) -> &str {
        "search_in_doc"
    }

    fn description(&self) -> &str {
        "Search a command's manual page for a keyword. Args: {\"command\": \"<name>\", \"keyword\": \"<text>\"}"
    }

    async fn execute(&self, args: Value) -> Result<String, String> {
        let command = command_token(arg_str(&args, "command")?);
        let keyword = arg_str(&args, "keyword")?;
        let doc = self.client.get_doc(command).await?;
        if doc.error.is_some() {
            return Ok(format!("No documentation found for '{command}'"));
        }
        let needle = keyword.to_lowercase();
        let matches: Vec<&str> = doc
            .full_doc
            .lines()
            .filter(|line| line.to_lowercase().contains(&needle))
            .take(self.max_matches)
            .collect();
        if matches.is_empty() {
            return Ok(format!("No matches found for '{keyword}'"));
        }
        Ok(matches.join("\n"))
    }
}

/// Largest char boundary at or below `max`.
fn truncate_at_boundary(text: &str, max: usize) -> usize {
    let mut cut = max;
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    cut
}
