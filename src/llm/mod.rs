//! LLM layer: client abstraction and implementations (OpenAI compatible / Mock)

pub mod mock;
pub mod openai;
pub mod traits;

use std::sync::Arc;

pub use mock::MockLlmClient;
pub use openai::{OpenAiClient, TokenUsage};
pub use traits::LlmClient;

use crate::config::AppConfig;

/// Ollama's OpenAI compatible endpoint
const OLLAMA_BASE_URL: &str = "http://127.0.0.1:11434/v1";

/// Build the LLM client described by `[llm]` in the config
pub fn create_llm_from_config(cfg: &AppConfig) -> Arc<dyn LlmClient> {
    match cfg.llm.provider.to_lowercase().as_str() {
        "openai" => {
            tracing::info!(model = %cfg.llm.model, "using OpenAI LLM");
            Arc::new(OpenAiClient::new(
                cfg.llm.base_url.as_deref(),
                &cfg.llm.model,
                std::env::var("OPENAI_API_KEY").ok().as_deref(),
                cfg.llm.request_timeout_secs,
            ))
        }
        "mock" => {
            tracing::warn!("using Mock LLM");
            Arc::new(MockLlmClient::new())
        }
        _ => {
            let base = cfg.llm.base_url.as_deref().unwrap_or(OLLAMA_BASE_URL);
            tracing::info!(model = %cfg.llm.model, base_url = %base, "using Ollama LLM");
            Arc::new(OpenAiClient::new(
                Some(base),
                &cfg.llm.model,
                Some("ollama"),
                cfg.llm.request_timeout_secs,
            ))
        }
    }
}
