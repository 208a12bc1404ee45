//! LLM client abstraction
//!
//! Every backend (OpenAI compatible / Mock) implements LlmClient. The loop
//! treats the model as an opaque call: messages in, text out.

use std::pin::Pin;

use async_trait::async_trait;
use futures_util::{stream, Stream};

use crate::memory::Message;

/// LLM client trait: non-streaming completion, with an optional token stream
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, messages: &[Message]) -> Result<String, String>;

    /// Streaming completion; the default adapter yields the full completion as one chunk
    async fn complete_stream(
        &self,
        messages: &[Message],
    ) -> Result<Pin<Box<dyn Stream<Item = Result<String, String>> + Send>>, String> {
        let content = self.complete(messages).await?;
        Ok(Box::pin(stream::iter(vec![Ok(content)])))
    }

    /// Cumulative token usage: (prompt_tokens, completion_tokens, total_tokens)
    fn token_usage(&self) -> (u64, u64, u64) {
        (0, 0, 0)
    }
}
