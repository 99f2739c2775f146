//! All AI/LLM functionality

pub mod client;
pub mod prompt_builder;

// Re-export main types for convenience
pub use client::SummarizationClient;
pub use prompt_builder::{build_chat_context, build_prompt};
