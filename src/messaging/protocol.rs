//! Message shapes exchanged between the page, background and popup contexts.

use serde::{Deserialize, Serialize};

use crate::core::models::{ContentType, ExtractedContent};
use crate::errors::SummarizerError;

/// Requests served by the background context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BackgroundRequest {
    #[serde(rename_all = "camelCase")]
    GenerateSummary {
        content: String,
        title: String,
        content_type: ContentType,
    },
    #[serde(rename_all = "camelCase")]
    GenerateChatResponse { prompt: String, user_message: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackgroundResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl BackgroundResponse {
    #[must_use]
    pub fn summary(summary: String) -> Self {
        Self {
            success: true,
            summary: Some(summary),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn chat(response: String) -> Self {
        Self {
            success: true,
            response: Some(response),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failure(error: &SummarizerError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            ..Self::default()
        }
    }
}

/// Requests served by the page (content script) context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PageRequest {
    TestSummarization,
    GetPageContent,
    GenerateSummaryFromPopup,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<ContentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageResponse {
    #[must_use]
    pub fn status(success: bool) -> Self {
        Self {
            success,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn content(extracted: &ExtractedContent) -> Self {
        Self {
            success: true,
            title: Some(extracted.title.clone()),
            content: Some(extracted.content.clone()),
            url: Some(extracted.url.clone()),
            content_type: Some(extracted.content_type),
            word_count: Some(extracted.word_count),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn summary(extracted: &ExtractedContent, summary: String) -> Self {
        Self {
            success: true,
            title: Some(extracted.title.clone()),
            content_type: Some(extracted.content_type),
            word_count: Some(extracted.word_count),
            summary: Some(summary),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Rebuild the page snapshot, filling gaps the way the popup always has.
    #[must_use]
    pub fn into_extracted(self) -> ExtractedContent {
        ExtractedContent {
            title: self.title.unwrap_or_else(|| "Untitled".to_string()),
            content: self.content.unwrap_or_default(),
            url: self.url.unwrap_or_default(),
            word_count: self.word_count.unwrap_or_default(),
            content_type: self.content_type.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_background_request_wire_format() {
        let request = BackgroundRequest::GenerateSummary {
            content: "body".into(),
            title: "Title".into(),
            content_type: ContentType::Blog,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"type": "GENERATE_SUMMARY", "content": "body", "title": "Title", "contentType": "blog"})
        );

        let chat: BackgroundRequest = serde_json::from_value(json!({
            "type": "GENERATE_CHAT_RESPONSE", "prompt": "p", "userMessage": "q"
        }))
        .unwrap();
        assert_eq!(
            chat,
            BackgroundRequest::GenerateChatResponse {
                prompt: "p".into(),
                user_message: "q".into()
            }
        );
    }

    #[test]
    fn test_page_request_wire_format() {
        assert_eq!(
            serde_json::to_value(PageRequest::GenerateSummaryFromPopup).unwrap(),
            json!({"type": "GENERATE_SUMMARY_FROM_POPUP"})
        );
        let parsed: PageRequest =
            serde_json::from_value(json!({"type": "TEST_SUMMARIZATION"})).unwrap();
        assert_eq!(parsed, PageRequest::TestSummarization);
    }

    #[test]
    fn test_failure_response_omits_payload_fields() {
        let value = serde_json::to_value(BackgroundResponse::failure(&SummarizerError::EmptyResult)).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "error": "No summary generated from OpenAI API"})
        );
    }

    #[test]
    fn test_into_extracted_defaults() {
        let extracted = PageResponse::status(true).into_extracted();
        assert_eq!(extracted.title, "Untitled");
        assert_eq!(extracted.content_type, ContentType::General);
        assert_eq!(extracted.word_count, 0);
    }
}
