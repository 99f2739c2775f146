use std::collections::HashSet;

use crate::core::models::{ChatMessage, Conversation, ExtractedContent};

/// Everything the chat UI renders. Only mutated through the transition
/// methods below.
#[derive(Debug, Clone, Default)]
pub struct ConversationState {
    conversations: Vec<Conversation>,
    collapsed: HashSet<String>,
    is_loading: bool,
    connection_failed: bool,
    page: Option<ExtractedContent>,
}

impl ConversationState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Newest first.
    #[must_use]
    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    #[must_use]
    pub fn conversation(&self, conversation_id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == conversation_id)
    }

    #[must_use]
    pub fn active(&self) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.is_active)
    }

    pub fn inactive(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.iter().filter(|c| !c.is_active)
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    #[must_use]
    pub fn connection_failed(&self) -> bool {
        self.connection_failed
    }

    #[must_use]
    pub fn page(&self) -> Option<&ExtractedContent> {
        self.page.as_ref()
    }

    /// The active conversation is always expanded.
    #[must_use]
    pub fn is_collapsed(&self, conversation_id: &str) -> bool {
        self.conversation(conversation_id)
            .is_some_and(|c| !c.is_active && self.collapsed.contains(conversation_id))
    }

    /// Text of any message, for copying out of old or current threads.
    #[must_use]
    pub fn message_content(&self, message_id: &str) -> Option<&str> {
        self.conversations
            .iter()
            .find_map(|c| c.message(message_id))
            .filter(|m| !m.is_loading)
            .map(|m| m.content.as_str())
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.is_loading = loading;
    }

    pub fn set_connection_failed(&mut self, failed: bool) {
        self.connection_failed = failed;
    }

    pub fn set_page(&mut self, page: ExtractedContent) {
        self.page = Some(page);
    }

    /// Open a new active thread with `first_message` and an AI placeholder.
    /// Every older thread is deactivated and collapsed.
    ///
    /// Returns `(conversation_id, placeholder_id)`.
    pub fn start_conversation(&mut self, title: &str, first_message: &str) -> (String, String) {
        for conversation in &mut self.conversations {
            conversation.is_active = false;
            self.collapsed.insert(conversation.id.clone());
        }

        let placeholder = ChatMessage::pending_ai();
        let placeholder_id = placeholder.id.clone();
        let conversation = Conversation::new(title, vec![ChatMessage::user(first_message), placeholder]);
        let conversation_id = conversation.id.clone();
        self.conversations.insert(0, conversation);

        (conversation_id, placeholder_id)
    }

    /// Add a user message and AI placeholder to an active conversation.
    /// Inactive threads are read-only, so this returns `None` for them.
    pub fn append_turn(&mut self, conversation_id: &str, user_message: &str) -> Option<String> {
        let conversation = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id && c.is_active)?;

        let placeholder = ChatMessage::pending_ai();
        let placeholder_id = placeholder.id.clone();
        conversation.messages.push(ChatMessage::user(user_message));
        conversation.messages.push(placeholder);
        Some(placeholder_id)
    }

    /// Fill in a placeholder with the AI answer.
    pub fn resolve_message(&mut self, conversation_id: &str, message_id: &str, content: &str) -> bool {
        self.finish_message(conversation_id, message_id, content)
    }

    /// Replace a placeholder with a user-facing error.
    pub fn fail_message(&mut self, conversation_id: &str, message_id: &str, error_text: &str) -> bool {
        self.finish_message(conversation_id, message_id, error_text)
    }

    pub fn toggle_collapse(&mut self, conversation_id: &str) {
        if !self.collapsed.remove(conversation_id) {
            self.collapsed.insert(conversation_id.to_string());
        }
    }

    fn finish_message(&mut self, conversation_id: &str, message_id: &str, content: &str) -> bool {
        let Some(message) = self
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .and_then(|c| c.messages.iter_mut().find(|m| m.id == message_id))
        else {
            return false;
        };

        message.content = content.to_string();
        message.is_loading = false;
        true
    }
}
