use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Article,
    Blog,
    Documentation,
    #[default]
    General,
}

impl ContentType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            ContentType::Article => "article",
            ContentType::Blog => "blog",
            ContentType::Documentation => "documentation",
            ContentType::General => "general",
        }
    }

    /// Lenient parse; anything unrecognised is general content.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "article" => ContentType::Article,
            "blog" => ContentType::Blog,
            "documentation" => ContentType::Documentation,
            _ => ContentType::General,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Readable text pulled out of a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedContent {
    pub title: String,
    pub content: String,
    pub url: String,
    pub word_count: usize,
    pub content_type: ContentType,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRequest {
    pub content: String,
    pub title: String,
    pub content_type: ContentType,
}

impl From<&ExtractedContent> for SummaryRequest {
    fn from(extracted: &ExtractedContent) -> Self {
        Self {
            content: extracted.content.clone(),
            title: extracted.title.clone(),
            content_type: extracted.content_type,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Ai,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub is_loading: bool,
}

impl ChatMessage {
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            id: new_id("msg"),
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            is_loading: false,
        }
    }

    /// Placeholder for an AI reply that has not arrived yet.
    #[must_use]
    pub fn pending_ai() -> Self {
        Self {
            id: new_id("msg"),
            role: Role::Ai,
            content: String::new(),
            timestamp: Utc::now(),
            is_loading: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub messages: Vec<ChatMessage>,
    pub timestamp: DateTime<Utc>,
    pub is_active: bool,
}

impl Conversation {
    #[must_use]
    pub fn new(title: impl Into<String>, messages: Vec<ChatMessage>) -> Self {
        Self {
            id: new_id("conv"),
            title: title.into(),
            messages,
            timestamp: Utc::now(),
            is_active: true,
        }
    }

    #[must_use]
    pub fn message(&self, message_id: &str) -> Option<&ChatMessage> {
        self.messages.iter().find(|m| m.id == message_id)
    }

    /// Prior turns rendered as `User: ...` / `AI: ...`, skipping placeholders.
    #[must_use]
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .filter(|m| !m.is_loading)
            .map(|m| match m.role {
                Role::User => format!("User: {}", m.content),
                Role::Ai => format!("AI: {}", m.content),
            })
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn new_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&ContentType::Documentation).unwrap(),
            "\"documentation\""
        );
        assert_eq!(ContentType::parse("BLOG"), ContentType::Blog);
        assert_eq!(ContentType::parse("recipe"), ContentType::General);
    }

    #[test]
    fn test_extracted_content_uses_camel_case() {
        let extracted = ExtractedContent {
            title: "T".into(),
            content: "C".into(),
            url: "https://example.com".into(),
            word_count: 1,
            content_type: ContentType::Article,
        };
        let value = serde_json::to_value(&extracted).unwrap();
        assert_eq!(value["wordCount"], 1);
        assert_eq!(value["contentType"], "article");
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = ChatMessage::user("hi");
        let b = ChatMessage::user("hi");
        assert_ne!(a.id, b.id);
        assert!(a.id.starts_with("msg-"));
    }

    #[test]
    fn test_transcript_skips_loading_placeholders() {
        let conversation = Conversation::new(
            "Summary: Test",
            vec![
                ChatMessage::user("Please summarize this page"),
                ChatMessage {
                    content: "A short summary.".into(),
                    is_loading: false,
                    ..ChatMessage::pending_ai()
                },
                ChatMessage::user("What else?"),
                ChatMessage::pending_ai(),
            ],
        );
        assert_eq!(
            conversation.transcript(),
            "User: Please summarize this page\n\nAI: A short summary.\n\nUser: What else?"
        );
    }
}
