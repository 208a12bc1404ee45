//! Thread store
//!
//! Maps thread ids to task state with a last-activity timestamp. The map is
//! owned by the orchestrator and mutated only through this store, so worker
//! access and the background sweeper interleave safely behind the RwLock.
//! Also keeps the seen-prompt hash set used for duplicate detection.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, RwLock};

use crate::memory::{Message, TaskState};

struct ThreadEntry {
    state: TaskState,
    last_used: Instant,
}

/// In-memory store of per-thread task state with TTL eviction
pub struct ThreadStore {
    threads: RwLock<HashMap<String, ThreadEntry>>,
    /// Hash of normalized prompt -> first-seen time, pruned alongside the sweep
    seen: Mutex<HashMap<String, Instant>>,
}

impl Default for ThreadStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ThreadStore {
    pub fn new() -> Self {
        Self {
            threads: RwLock::new(HashMap::new()),
            seen: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch a thread's state, refreshing its last-activity timestamp
    pub async fn get(&self, thread_id: &str) -> Option<TaskState> {
        let mut threads = self.threads.write().await;
        threads.get_mut(thread_id).map(|entry| {
            entry.last_used = Instant::now();
            entry.state.clone()
        })
    }

    pub async fn put(&self, thread_id: &str, state: TaskState) {
        let mut threads = self.threads.write().await;
        threads.insert(
            thread_id.to_string(),
            ThreadEntry {
                state,
                last_used: Instant::now(),
            },
        );
    }

    pub async fn remove(&self, thread_id: &str) -> bool {
        self.threads.write().await.remove(thread_id).is_some()
    }

    pub async fn contains(&self, thread_id: &str) -> bool {
        self.threads.read().await.contains_key(thread_id)
    }

    pub async fn active_count(&self) -> usize {
        self.threads.read().await.len()
    }

    /// Stored message history for the debug endpoint; None when the thread is unknown
    pub async fn history(&self, thread_id: &str) -> Option<Vec<Message>> {
        self.threads
            .read()
            .await
            .get(thread_id)
            .map(|entry| entry.state.messages.clone())
    }

    /// Evict threads idle past the TTL; returns how many were removed.
    /// Seen-prompt hashes past the same window are pruned too.
    pub async fn sweep_expired(&self, ttl: Duration) -> usize {
        let now = Instant::now();
        let mut threads = self.threads.write().await;
        let expired: Vec<String> = threads
            .iter()
            .filter(|(_, entry)| now.duration_since(entry.last_used) > ttl)
            .map(|(id, _)| id.clone())
            .collect();
        for id in &expired {
            threads.remove(id);
            tracing::info!(thread_id = %id, "evicted inactive thread");
        }
        drop(threads);

        let mut seen = self.seen.lock().await;
        seen.retain(|_, first_seen| now.duration_since(*first_seen) <= ttl);

        expired.len()
    }

    /// Whether this prompt was already seen (normalized text hash); records it if not
    pub async fn is_duplicate(&self, text: &str) -> bool {
        let digest = prompt_digest(text);
        let mut seen = self.seen.lock().await;
        if seen.contains_key(&digest) {
            true
        } else {
            seen.insert(digest, Instant::now());
            false
        }
    }
}

/// SHA-256 of the whitespace-normalized prompt; only equality matters
fn prompt_digest(text: &str) -> String {
    let normalized = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_put_remove_roundtrip() {
        let store = ThreadStore::new();
        assert!(store.get("t1").await.is_none());

        let mut state = TaskState::default();
        state.current_problem = "count files".into();
        store.put("t1", state).await;

        let fetched = store.get("t1").await.unwrap();
        assert_eq!(fetched.current_problem, "count files");
        assert_eq!(store.active_count().await, 1);

        assert!(store.remove("t1").await);
        assert!(!store.contains("t1").await);
    }

    #[tokio::test]
    async fn sweep_evicts_only_idle_threads() {
        let store = ThreadStore::new();
        store.put("old", TaskState::default()).await;
        {
            let mut threads = store.threads.write().await;
            threads.get_mut("old").unwrap().last_used =
                Instant::now() - Duration::from_secs(120);
        }
        store.put("fresh", TaskState::default()).await;

        let evicted = store.sweep_expired(Duration::from_secs(60)).await;
        assert_eq!(evicted, 1);
        assert!(!store.contains("old").await);
        assert!(store.contains("fresh").await);
    }

    #[tokio::test]
    async fn duplicate_detection_normalizes_whitespace() {
        let store = ThreadStore::new();
        assert!(!store.is_duplicate("how many files  are in /etc?").await);
        assert!(store.is_duplicate("how many files are in /etc?").await);
        assert!(!store.is_duplicate("a different prompt").await);
    }
}
