//! LLM (`OpenAI`) chat-completion client
//!
//! Encapsulates the single HTTP call used for both page summaries and
//! follow-up chat answers. Retrying is left to the caller.

use openai_api_rs::v1::chat_completion::{ChatCompletionMessage, Content, MessageRole};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::prompt_builder::build_prompt;
use crate::core::config::AppConfig;
use crate::core::models::ContentType;
use crate::errors::SummarizerError;
use crate::storage::{API_KEY_PREFIX, CredentialStore, load_api_key, mask_key};

pub const SUMMARY_SYSTEM_PROMPT: &str = "You are a summarization assistant. Produce only the summary, \
     with no preamble or closing remarks. Respect the requested word budget strictly, never invent \
     facts that are not in the content, and prefer concrete facts over general statements.";

pub const CHAT_SYSTEM_PROMPT: &str = "You are a helpful assistant that answers questions about a web \
     page the user is reading. Ground your answers in the provided page content and conversation, \
     and say so when the page does not contain the answer.";

/// Sampling parameters for one kind of request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSettings {
    pub system_prompt: &'static str,
    pub max_tokens: u32,
    pub temperature: f64,
}

pub const SUMMARY_SETTINGS: CompletionSettings = CompletionSettings {
    system_prompt: SUMMARY_SYSTEM_PROMPT,
    max_tokens: 200,
    temperature: 0.3,
};

pub const CHAT_SETTINGS: CompletionSettings = CompletionSettings {
    system_prompt: CHAT_SYSTEM_PROMPT,
    max_tokens: 500,
    temperature: 0.7,
};

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: Option<ChatCompletionChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Best-effort `error.message` from an error response body.
#[must_use]
pub fn upstream_error_message(body: &str) -> String {
    serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .and_then(|envelope| envelope.error)
        .and_then(|error| error.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| "Unknown error".to_string())
}

/// Pull `choices[0].message.content` out of a completion body.
///
/// # Errors
///
/// `EmptyResult` when the body does not match the schema or carries no text.
pub fn parse_completion(body: &str) -> Result<String, SummarizerError> {
    let parsed: ChatCompletionResponse = serde_json::from_str(body).map_err(|e| {
        warn!("Completion response did not match schema: {}", e);
        SummarizerError::EmptyResult
    })?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .ok_or(SummarizerError::EmptyResult)
}

pub(crate) fn build_messages(system: &str, user: &str) -> Vec<ChatCompletionMessage> {
    vec![
        ChatCompletionMessage {
            role: MessageRole::system,
            content: Content::Text(system.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        },
        ChatCompletionMessage {
            role: MessageRole::user,
            content: Content::Text(user.to_string()),
            name: None,
            tool_calls: None,
            tool_call_id: None,
        },
    ]
}

/// Chat Completions wire format: `{ role, content }` with plain-text content.
pub(crate) fn messages_to_json(messages: &[ChatCompletionMessage]) -> Vec<Value> {
    messages
        .iter()
        .filter_map(|m| {
            let role_str = match m.role {
                MessageRole::system => "system",
                MessageRole::user | MessageRole::function | MessageRole::tool => "user",
                MessageRole::assistant => "assistant",
            };
            match &m.content {
                Content::Text(t) => Some(json!({ "role": role_str, "content": t })),
                Content::ImageUrl(_) => None,
            }
        })
        .collect()
}

/// Summarization client backed by a stored credential.
pub struct SummarizationClient {
    http: Client,
    store: Arc<dyn CredentialStore>,
    api_url: String,
    model_name: String,
}

impl SummarizationClient {
    /// # Errors
    ///
    /// Returns `Config` if the HTTP client cannot be built.
    pub fn new(config: &AppConfig, store: Arc<dyn CredentialStore>) -> Result<Self, SummarizerError> {
        let http = Client::builder()
            .timeout(config.http_timeout)
            .build()
            .map_err(|e| SummarizerError::Config(format!("Failed to build OpenAI HTTP client: {e}")))?;

        Ok(Self {
            http,
            store,
            api_url: config.openai_api_url.clone(),
            model_name: config.openai_model.clone(),
        })
    }

    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// # Errors
    ///
    /// Credential, upstream, connection or empty-result failures; see
    /// [`SummarizerError`].
    pub async fn summarize(
        &self,
        content: &str,
        title: &str,
        content_type: ContentType,
    ) -> Result<String, SummarizerError> {
        let prompt = build_prompt(content, title, content_type);
        info!(
            "Generating {} summary for \"{}\" ({} prompt chars)",
            content_type,
            title,
            prompt.chars().count()
        );
        self.complete(SUMMARY_SETTINGS, &prompt).await
    }

    /// Free-form answer to a contextual prompt.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::summarize`].
    pub async fn chat(&self, prompt: &str, user_message: &str) -> Result<String, SummarizerError> {
        info!(
            "Generating chat response ({} chars question, {} chars prompt)",
            user_message.chars().count(),
            prompt.chars().count()
        );
        self.complete(CHAT_SETTINGS, prompt).await
    }

    async fn api_key(&self) -> Result<String, SummarizerError> {
        let key = load_api_key(self.store.as_ref())
            .await?
            .ok_or(SummarizerError::MissingCredential)?;
        if !key.starts_with(API_KEY_PREFIX) {
            warn!("Stored API key has unexpected format ({})", mask_key(&key));
            return Err(SummarizerError::InvalidCredentialFormat);
        }
        Ok(key)
    }

    async fn complete(
        &self,
        settings: CompletionSettings,
        user_content: &str,
    ) -> Result<String, SummarizerError> {
        let api_key = self.api_key().await?;
        debug!("Using API key {}", mask_key(&api_key));

        #[cfg(feature = "debug-logs")]
        info!("Using prompt:\n{}", user_content);

        let messages = build_messages(settings.system_prompt, user_content);
        let request_body = json!({
            "model": self.model_name,
            "messages": messages_to_json(&messages),
            "max_tokens": settings.max_tokens,
            "temperature": settings.temperature,
        });

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                warn!("OpenAI API request failed: {}", e);
                SummarizerError::ConnectionFailure(e.to_string())
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SummarizerError::ConnectionFailure(e.to_string()))?;

        if !status.is_success() {
            let message = upstream_error_message(&body);
            warn!("OpenAI API returned {}: {}", status, message);
            return Err(SummarizerError::UpstreamError {
                status: status.as_u16(),
                message,
            });
        }

        let text = parse_completion(&body)?;
        info!("Received completion ({} chars)", text.chars().count());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_to_json_keeps_system_then_user() {
        let messages = build_messages("policy", "hello");
        let json = messages_to_json(&messages);
        assert_eq!(json.len(), 2);
        assert_eq!(json[0]["role"], "system");
        assert_eq!(json[0]["content"], "policy");
        assert_eq!(json[1]["role"], "user");
        assert_eq!(json[1]["content"], "hello");
    }

    #[test]
    fn test_upstream_error_message_extraction() {
        assert_eq!(
            upstream_error_message(r#"{"error":{"message":"invalid_api_key"}}"#),
            "invalid_api_key"
        );
        assert_eq!(upstream_error_message("<html>bad gateway</html>"), "Unknown error");
        assert_eq!(upstream_error_message(r#"{"error":{}}"#), "Unknown error");
    }

    #[test]
    fn test_parse_completion() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"  A summary.  "}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "A summary.");
    }

    #[test]
    fn test_parse_completion_rejects_empty_shapes() {
        for body in [
            r#"{"choices":[]}"#,
            r#"{}"#,
            r#"{"choices":[{"message":{"content":"   "}}]}"#,
            r#"{"choices":[{"message":{"content":null}}]}"#,
            r#"{"choices":"nope"}"#,
            "not json",
        ] {
            assert!(
                matches!(parse_completion(body), Err(SummarizerError::EmptyResult)),
                "body should be rejected: {body}"
            );
        }
    }

    #[test]
    fn test_summary_budget_is_tighter_than_chat() {
        assert!(SUMMARY_SETTINGS.max_tokens < CHAT_SETTINGS.max_tokens);
        assert!(SUMMARY_SETTINGS.temperature < CHAT_SETTINGS.temperature);
    }
}
