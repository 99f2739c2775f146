use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::retry::{RetryPolicy, retry_connection_errors};
use super::state::ConversationState;
use crate::ai::prompt_builder::{build_chat_context, sanitize_user_input};
use crate::core::config::AppConfig;
use crate::core::models::{Conversation, SummaryRequest};
use crate::errors::{CONNECTION_ERROR_PATTERNS, SummarizerError};
use crate::messaging::{AiBackend, PageSource};

pub const INITIAL_SUMMARY_REQUEST: &str = "Please summarize this page";
pub const CONNECTION_FAILED_MESSAGE: &str = "Connection failed after multiple attempts. Please try refreshing the page and reopening the extension.";
pub const SUMMARY_ERROR_MESSAGE: &str =
    "Sorry, there was an error generating the summary. Please try again.";
pub const CHAT_ERROR_MESSAGE: &str = "Sorry, I encountered an error. Please try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Short-lived status line shown next to the chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ManagerOptions {
    pub content_retry: RetryPolicy,
    pub ai_retry: RetryPolicy,
    pub connection_patterns: Vec<String>,
}

impl Default for ManagerOptions {
    fn default() -> Self {
        Self {
            content_retry: RetryPolicy::content_load(),
            ai_retry: RetryPolicy::ai_call(),
            connection_patterns: CONNECTION_ERROR_PATTERNS
                .iter()
                .map(|p| (*p).to_string())
                .collect(),
        }
    }
}

impl From<&AppConfig> for ManagerOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            content_retry: config.content_retry,
            ai_retry: config.ai_retry,
            ..Self::default()
        }
    }
}

/// Which placeholder text and notice a failed turn gets.
#[derive(Clone, Copy)]
enum TurnKind {
    Summary,
    Chat,
}

impl TurnKind {
    const fn error_message(self) -> &'static str {
        match self {
            TurnKind::Summary => SUMMARY_ERROR_MESSAGE,
            TurnKind::Chat => CHAT_ERROR_MESSAGE,
        }
    }

    const fn error_notice(self) -> &'static str {
        match self {
            TurnKind::Summary => "Error generating summary",
            TurnKind::Chat => "Error generating response",
        }
    }
}

/// Drives the popup chat: loads page content, runs summary and follow-up
/// turns against the background context and records their outcome.
pub struct ConversationManager {
    page: Arc<dyn PageSource>,
    ai: Arc<dyn AiBackend>,
    options: ManagerOptions,
    state: ConversationState,
    notices: mpsc::UnboundedSender<Notice>,
}

impl ConversationManager {
    #[must_use]
    pub fn new(
        page: Arc<dyn PageSource>,
        ai: Arc<dyn AiBackend>,
        options: ManagerOptions,
    ) -> (Self, mpsc::UnboundedReceiver<Notice>) {
        let (notices, rx) = mpsc::unbounded_channel();
        let manager = Self {
            page,
            ai,
            options,
            state: ConversationState::new(),
            notices,
        };
        (manager, rx)
    }

    #[must_use]
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    #[must_use]
    pub fn conversations(&self) -> &[Conversation] {
        self.state.conversations()
    }

    #[must_use]
    pub fn active_conversation(&self) -> Option<&Conversation> {
        self.state.active()
    }

    pub fn inactive_conversations(&self) -> impl Iterator<Item = &Conversation> {
        self.state.inactive()
    }

    #[must_use]
    pub fn connection_failed(&self) -> bool {
        self.state.connection_failed()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    #[must_use]
    pub fn message_content(&self, message_id: &str) -> Option<&str> {
        self.state.message_content(message_id)
    }

    pub fn toggle_collapse(&mut self, conversation_id: &str) {
        self.state.toggle_collapse(conversation_id);
    }

    fn notify(&self, notice: Notice) {
        // The UI may have closed; notices are best-effort.
        let _ = self.notices.send(notice);
    }

    /// Fetch the page snapshot, retrying while the page context is
    /// unreachable. Returns whether content is now available.
    pub async fn load_page_content(&mut self) -> bool {
        let page = Arc::clone(&self.page);
        let notices = self.notices.clone();
        let result = retry_connection_errors(
            &self.options.content_retry,
            &self.options.connection_patterns,
            |n, max| {
                let _ = notices.send(Notice::error(format!(
                    "Connection issue, retrying... ({n}/{max})"
                )));
            },
            || page.get_page_content(),
        )
        .await;

        match result {
            Ok(content) => {
                info!(
                    "Page content loaded: \"{}\" ({} words)",
                    content.title, content.word_count
                );
                self.state.set_page(content);
                true
            }
            Err(e) if e.is_connection_class(&self.options.connection_patterns) => {
                warn!("Max retries reached loading page content: {}", e);
                self.state.set_connection_failed(true);
                false
            }
            Err(e) => {
                error!("Error loading page content: {}", e);
                self.notify(Notice::error("Error loading page content"));
                false
            }
        }
    }

    /// Open a new conversation asking for a summary of the current page.
    ///
    /// Returns the new conversation id, or `None` when no page content could
    /// be loaded.
    pub async fn generate_initial_summary(&mut self) -> Option<String> {
        if self.state.page().is_none() && !self.load_page_content().await {
            return None;
        }
        let page = self.state.page()?.clone();

        let (conversation_id, placeholder_id) = self
            .state
            .start_conversation(&format!("Summary: {}", page.title), INITIAL_SUMMARY_REQUEST);
        self.state.set_loading(true);

        let ai = Arc::clone(&self.ai);
        let request = SummaryRequest::from(&page);
        let result = self
            .call_ai(|| ai.generate_summary(&request))
            .await;

        self.finish_turn(TurnKind::Summary, &conversation_id, &placeholder_id, result);
        Some(conversation_id)
    }

    /// Ask a follow-up question in the active conversation.
    ///
    /// Returns the id of the AI message that holds the answer (or the error
    /// text), or `None` for a blank question.
    ///
    /// # Errors
    ///
    /// `NoActiveConversation` when no summary has been requested yet.
    pub async fn send_message(&mut self, text: &str) -> Result<Option<String>, SummarizerError> {
        let question = sanitize_user_input(text);
        if question.is_empty() {
            return Ok(None);
        }

        let active = self
            .state
            .active()
            .ok_or(SummarizerError::NoActiveConversation)?;
        let conversation_id = active.id.clone();
        let prompt = build_chat_context(self.state.page(), active, &question);

        let placeholder_id = self
            .state
            .append_turn(&conversation_id, &question)
            .ok_or(SummarizerError::NoActiveConversation)?;
        self.state.set_loading(true);

        let ai = Arc::clone(&self.ai);
        let result = self
            .call_ai(|| ai.generate_chat_response(&prompt, &question))
            .await;

        self.finish_turn(TurnKind::Chat, &conversation_id, &placeholder_id, result);
        Ok(Some(placeholder_id))
    }

    /// User-initiated recovery after a connection failure.
    pub async fn manual_retry(&mut self) -> Option<String> {
        info!("Manual retry initiated");
        self.state.set_connection_failed(false);
        self.notify(Notice::success("Retrying connection..."));

        self.load_page_content().await;

        if self.state.conversations().is_empty() && self.state.page().is_some() {
            return self.generate_initial_summary().await;
        }
        None
    }

    /// Popup-open behaviour: summarise once, unless a connection failure is
    /// waiting for the user to retry.
    pub async fn auto_start(&mut self) -> Option<String> {
        if self.state.connection_failed() || !self.state.conversations().is_empty() {
            return None;
        }
        self.generate_initial_summary().await
    }

    async fn call_ai<F, Fut>(&self, operation: F) -> Result<String, SummarizerError>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<String, SummarizerError>>,
    {
        let notices = self.notices.clone();
        retry_connection_errors(
            &self.options.ai_retry,
            &self.options.connection_patterns,
            |n, max| {
                let _ = notices.send(Notice::error(format!(
                    "AI connection issue, retrying... ({n}/{max})"
                )));
            },
            operation,
        )
        .await
    }

    fn finish_turn(
        &mut self,
        kind: TurnKind,
        conversation_id: &str,
        placeholder_id: &str,
        result: Result<String, SummarizerError>,
    ) {
        match result {
            Ok(text) => {
                info!("AI turn completed ({} chars)", text.chars().count());
                self.state.resolve_message(conversation_id, placeholder_id, &text);
            }
            Err(e) if e.is_connection_class(&self.options.connection_patterns) => {
                warn!("AI turn failed after retries: {}", e);
                self.state
                    .fail_message(conversation_id, placeholder_id, CONNECTION_FAILED_MESSAGE);
                self.state.set_connection_failed(true);
            }
            Err(e) => {
                error!("AI turn failed: {}", e);
                self.state
                    .fail_message(conversation_id, placeholder_id, kind.error_message());
                self.notify(Notice::error(kind.error_notice()));
            }
        }
        self.state.set_loading(false);
    }
}
