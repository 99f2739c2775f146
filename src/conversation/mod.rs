//! Popup chat: conversation threads, turn lifecycle and connection retries

pub mod manager;
pub mod retry;
pub mod state;

pub use manager::{ConversationManager, ManagerOptions, Notice, NoticeKind};
pub use retry::RetryPolicy;
pub use state::ConversationState;
