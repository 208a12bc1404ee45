//! HTTP surface: an OpenAI-compatible chat endpoint plus status, history and
//! health probes.

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::json;

use crate::core::{ChatMessage, Orchestrator};
use crate::memory::{Role, ThreadStore};

pub struct AppState {
    pub orchestrator: Orchestrator,
    pub store: Arc<ThreadStore>,
}

pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/status", get(status))
        .route("/api/history", get(history))
        .route("/api/health", get(health))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub model: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub thread_id: Option<String>,
}

async fn chat(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Response {
    tracing::info!(
        thread_id = req.thread_id.as_deref().unwrap_or("default"),
        model = req.model.as_deref().unwrap_or("-"),
        n_messages = req.messages.len(),
        "chat request"
    );
    match state.orchestrator.handle(req.thread_id, req.messages).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": e.to_string()})),
        )
            .into_response(),
    }
}

async fn status(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let (queued, workers) = state.orchestrator.status();
    let active_threads = state.store.active_count().await;
    Json(json!({
        "queue_depth": queued,
        "workers": workers,
        "active_threads": active_threads,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[derive(Debug, Deserialize)]
struct HistoryQuery {
    #[serde(default)]
    thread_id: Option<String>,
}

async fn history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Json<serde_json::Value> {
    let thread_id = query.thread_id.as_deref().unwrap_or("default");
    match state.store.history(thread_id).await {
        Some(messages) => {
            // the injected system prompt stays private
            let visible: Vec<_> = messages
                .iter()
                .filter(|m| !matches!(m.role, Role::System))
                .collect();
            Json(json!({ "messages": visible }))
        }
        None => Json(json!({ "empty": true })),
    }
}

async fn health() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_request_parses_with_optional_fields() {
        let req: ChatRequest = serde_json::from_str(
            r#"{"messages":[{"role":"user","content":"hi"}]}"#,
        )
        .unwrap();
        assert!(req.thread_id.is_none());
        assert!(req.model.is_none());
        assert_eq!(req.messages.len(), 1);

        let req: ChatRequest = serde_json::from_str(
            r#"{"model":"qwen3:1.7b","thread_id":"t1","messages":[{"role":"user","content":"hi"}]}"#,
        )
        .unwrap();
        assert_eq!(req.thread_id.as_deref(), Some("t1"));
    }
}
