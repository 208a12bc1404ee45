//! Mock LLM client (for tests, no API required)
//!
//! Scripted mode returns canned replies in order, which lets tests drive the
//! multi-stage loop deterministically. With no script it answers with a
//! finish action.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::llm::LlmClient;
use crate::memory::Message;

/// Mock client: pops scripted replies, or falls back to a fixed finish action
#[derive(Debug, Default)]
pub struct MockLlmClient {
    replies: Mutex<VecDeque<String>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scripted(replies: Vec<impl Into<String>>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        }
    }

    /// Number of scripted replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _messages: &[Message]) -> Result<String, String> {
        let next = self.replies.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| "Think: Nothing left to do.\nAct: finish".to_string()))
    }
}
