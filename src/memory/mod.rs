//! Memory layer: conversation messages, per-thread task state, thread store

pub mod conversation;
pub mod state;
pub mod store;

pub use conversation::{Message, Role};
pub use state::TaskState;
pub use store::ThreadStore;
