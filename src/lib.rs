//! linagent - ReAct agent server for simulated Linux terminal tasks
//!
//! Module layout:
//! - **config**: application configuration (TOML + environment variables)
//! - **core**: error taxonomy and the task orchestrator (worker pool, thread lifecycle)
//! - **llm**: LLM client abstraction and implementations (OpenAI compatible / Mock)
//! - **memory**: conversation messages, per-thread task state, thread store
//! - **react**: the reasoning state machine (analyze / draft / plan / finalize)
//! - **server**: axum HTTP surface (chat, status, history, health)
//! - **tools**: documentation lookup tools and executor

pub mod config;
pub mod core;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod react;
pub mod server;
pub mod tools;
