//! Request orchestration
//!
//! Chat requests are queued onto a bounded channel and drained by a fixed
//! pool of workers, so at most `workers` turns run concurrently per process.
//! Each request carries a oneshot for its reply; the caller races that
//! oneshot against the request timeout.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot, Mutex};

use crate::core::AgentError;
use crate::memory::{Message, ThreadStore};
use crate::react::{prompts, TaskAgent};

/// Action returned when a turn exceeds the request timeout.
pub const TIMEOUT_ACTION: &str =
    "Think: The request timed out before completing.\nAct: finish";

/// Inbound chat message (OpenAI-style role/content pair).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResponseMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

/// Response envelope: a single assistant choice.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub choices: Vec<Choice>,
}

impl ChatResponse {
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            choices: vec![Choice {
                message: ResponseMessage {
                    role: "assistant".to_string(),
                    content: content.into(),
                },
            }],
        }
    }

    pub fn content(&self) -> &str {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .unwrap_or("")
    }
}

struct Job {
    thread_id: String,
    messages: Vec<ChatMessage>,
    reply: oneshot::Sender<String>,
}

pub struct Orchestrator {
    tx: mpsc::Sender<Job>,
    queue_depth: Arc<AtomicUsize>,
    workers: usize,
    request_timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        agent: Arc<TaskAgent>,
        store: Arc<ThreadStore>,
        workers: usize,
        queue_capacity: usize,
        request_timeout: Duration,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<Job>(queue_capacity);
        let rx = Arc::new(Mutex::new(rx));
        let queue_depth = Arc::new(AtomicUsize::new(0));

        for worker_id in 0..workers {
            let rx = rx.clone();
            let agent = agent.clone();
            let store = store.clone();
            let queue_depth = queue_depth.clone();
            tokio::spawn(async move {
                loop {
                    let job = {
                        let mut guard = rx.lock().await;
                        guard.recv().await
                    };
                    let Some(job) = job else {
                        break;
                    };
                    queue_depth.fetch_sub(1, Ordering::Relaxed);
                    tracing::debug!(worker_id, thread_id = %job.thread_id, "worker picked up turn");
                    let content = process(&agent, &store, &job.thread_id, &job.messages).await;
                    // receiver may have timed out and dropped
                    let _ = job.reply.send(content);
                }
                tracing::debug!(worker_id, "worker exiting, queue closed");
            });
        }

        Self {
            tx,
            queue_depth,
            workers,
            request_timeout,
        }
    }

    /// Queue a turn and wait for its reply, up to the request timeout.
    pub async fn handle(
        &self,
        thread_id: Option<String>,
        messages: Vec<ChatMessage>,
    ) -> Result<ChatResponse, AgentError> {
        let thread_id = match thread_id {
            Some(id) if !id.trim().is_empty() => id,
            _ => "default".to_string(),
        };
        let request_id = uuid::Uuid::new_v4();
        tracing::info!(%request_id, thread_id = %thread_id, "turn queued");
        let (reply_tx, reply_rx) = oneshot::channel();
        let job = Job {
            thread_id,
            messages,
            reply: reply_tx,
        };
        self.queue_depth.fetch_add(1, Ordering::Relaxed);
        if self.tx.send(job).await.is_err() {
            self.queue_depth.fetch_sub(1, Ordering::Relaxed);
            return Err(AgentError::QueueClosed);
        }
        match tokio::time::timeout(self.request_timeout, reply_rx).await {
            Ok(Ok(content)) => Ok(ChatResponse::assistant(content)),
            Ok(Err(_)) => Err(AgentError::QueueClosed),
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.request_timeout.as_secs(),
                    "turn timed out"
                );
                Ok(ChatResponse::assistant(TIMEOUT_ACTION))
            }
        }
    }

    /// (queued turns, worker count)
    pub fn status(&self) -> (usize, usize) {
        (self.queue_depth.load(Ordering::Relaxed), self.workers)
    }
}

/// "start a new problem in a new OS" resets the thread before anything else
fn is_hard_reset(input: &str) -> bool {
    input
        .to_lowercase()
        .contains("start a new problem in a new os")
}

async fn process(
    agent: &TaskAgent,
    store: &ThreadStore,
    thread_id: &str,
    messages: &[ChatMessage],
) -> String {
    let latest = messages
        .iter()
        .rev()
        .find(|m| m.role == "user")
        .map(|m| m.content.clone())
        .unwrap_or_default();

    if is_hard_reset(&latest) {
        if store.remove(thread_id).await {
            tracing::info!(thread_id, "thread reset on request");
        }
    }

    // same text already seen recently goes to a shadow thread so it cannot
    // disturb an in-flight conversation; the shadow starts fresh every time,
    // otherwise a third retry would continue the second one's task
    let mut thread_id = thread_id.to_string();
    if store.is_duplicate(&latest).await {
        thread_id = format!("{thread_id}_dup");
        store.remove(&thread_id).await;
        tracing::info!(thread_id, "duplicate prompt redirected");
    }

    let mut state = store.get(&thread_id).await.unwrap_or_default();

    if state.messages.is_empty() {
        let has_system = messages.iter().any(|m| m.role == "system");
        if !has_system {
            state.messages.push(Message::system(prompts::SYSTEM_PROMPT));
        }
        // seed conversation context with everything before the live turn;
        // unknown roles are dropped
        for m in &messages[..messages.len().saturating_sub(1)] {
            let msg = match m.role.as_str() {
                "system" => Message::system(&m.content),
                "assistant" => Message::assistant(&m.content),
                "user" => Message::user(&m.content),
                _ => continue,
            };
            state.messages.push(msg);
        }
    }

    let content = match agent.run(&mut state, &latest).await {
        Ok(action) => action,
        Err(e) => {
            tracing::error!(thread_id, error = %e, "turn failed");
            format!("Error: {e}")
        }
    };

    if content.to_lowercase().contains("act: finish") {
        store.remove(&thread_id).await;
        tracing::info!(thread_id, "thread finished and released");
    } else {
        store.put(&thread_id, state).await;
    }

    content
}

impl std::fmt::Debug for Orchestrator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let (queued, workers) = self.status();
        f.debug_struct("Orchestrator")
            .field("queued", &queued)
            .field("workers", &workers)
            .finish()
    }
}
