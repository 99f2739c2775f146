//! Cross-context messaging
//!
//! The page, background and popup contexts share no memory. They talk only
//! through typed request/response channels ([`rpc`]) carrying the messages in
//! [`protocol`].

pub mod background;
pub mod page;
pub mod protocol;
pub mod rpc;

use async_trait::async_trait;

use crate::core::models::{ExtractedContent, SummaryRequest};
use crate::errors::SummarizerError;

pub use background::{BackgroundClient, spawn_background};
pub use page::{PageClient, spawn_page_context};

/// What the popup needs from the page it was opened on.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn get_page_content(&self) -> Result<ExtractedContent, SummarizerError>;

    async fn test_summarization(&self) -> Result<bool, SummarizerError>;
}

/// What the popup needs from the background context.
#[async_trait]
pub trait AiBackend: Send + Sync {
    async fn generate_summary(&self, request: &SummaryRequest) -> Result<String, SummarizerError>;

    async fn generate_chat_response(
        &self,
        prompt: &str,
        user_message: &str,
    ) -> Result<String, SummarizerError>;
}
