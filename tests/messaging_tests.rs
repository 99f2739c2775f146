use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use page_summarizer::ai::SummarizationClient;
use page_summarizer::core::config::AppConfig;
use page_summarizer::core::models::{ContentType, SummaryRequest};
use page_summarizer::errors::{CONNECTION_ERROR_PATTERNS, SummarizerError};
use page_summarizer::extract::ContentExtractor;
use page_summarizer::messaging::protocol::PageRequest;
use page_summarizer::messaging::{
    AiBackend, BackgroundClient, PageSource, spawn_background, spawn_page_context,
};
use page_summarizer::storage::MemoryStore;

const SENTENCE: &str = "The guide explains how to configure the build for release targets.";

fn docs_page() -> String {
    let body: String = (0..10).map(|_| format!("<p>{SENTENCE}</p>")).collect();
    format!("<html><head><title>Build Guide</title></head><body><main><h1>Build Guide</h1>{body}</main></body></html>")
}

async fn background_with(server: &MockServer, key: Option<&str>) -> BackgroundClient {
    let config = AppConfig {
        openai_api_url: format!("{}/v1/chat/completions", server.uri()),
        ..AppConfig::default()
    };
    let store = match key {
        Some(key) => MemoryStore::with_api_key(key),
        None => MemoryStore::new(),
    };
    let client = SummarizationClient::new(&config, Arc::new(store)).unwrap();
    spawn_background(Arc::new(client))
}

async fn completion_server(content: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{ "message": { "role": "assistant", "content": content } }]
        })))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_page_context_serves_extracted_content() {
    let server = completion_server("unused").await;
    let background = background_with(&server, Some("sk-test")).await;
    let page = spawn_page_context(
        docs_page(),
        "https://example.com/docs/build".to_string(),
        ContentExtractor::default(),
        background,
    );

    assert!(page.is_connected());
    assert!(page.test_summarization().await.unwrap());

    let content = page.get_page_content().await.unwrap();
    assert_eq!(content.title, "Build Guide");
    assert_eq!(content.content_type, ContentType::Documentation);
    assert_eq!(content.url, "https://example.com/docs/build");
    assert!(content.content.starts_with("Build Guide"));
}

#[tokio::test]
async fn test_summary_from_popup_goes_through_background() {
    let server = completion_server("Configure release targets in the build file.").await;
    let background = background_with(&server, Some("sk-test")).await;
    let page = spawn_page_context(
        docs_page(),
        "https://example.com/docs/build".to_string(),
        ContentExtractor::default(),
        background,
    );

    let response = page.call(PageRequest::GenerateSummaryFromPopup).await.unwrap();
    assert!(response.success);
    assert_eq!(
        response.summary.as_deref(),
        Some("Configure release targets in the build file.")
    );
    assert_eq!(response.title.as_deref(), Some("Build Guide"));
    assert_eq!(response.content_type, Some(ContentType::Documentation));
}

#[tokio::test]
async fn test_background_relays_credential_errors() {
    let server = completion_server("unused").await;
    let background = background_with(&server, None).await;

    let request = SummaryRequest {
        content: SENTENCE.to_string(),
        title: "Build Guide".to_string(),
        content_type: ContentType::General,
    };
    let err = background.generate_summary(&request).await.unwrap_err();

    assert!(matches!(err, SummarizerError::Remote(_)));
    assert!(err.to_string().contains("API key not configured"));
    assert!(!err.is_connection_class(&CONNECTION_ERROR_PATTERNS));
}

#[tokio::test]
async fn test_background_chat_round_trip() {
    let server = completion_server("Use the --release flag.").await;
    let background = background_with(&server, Some("sk-test")).await;

    let answer = background
        .generate_chat_response("Page Title: Build Guide", "How do I build for release?")
        .await
        .unwrap();
    assert_eq!(answer, "Use the --release flag.");
}

#[tokio::test]
async fn test_unsupported_page_has_no_receiver() {
    let server = completion_server("unused").await;
    let background = background_with(&server, Some("sk-test")).await;
    let page = spawn_page_context(
        docs_page(),
        "chrome://extensions".to_string(),
        ContentExtractor::default(),
        background,
    );

    assert!(!page.is_connected());
    let err = page.get_page_content().await.unwrap_err();
    assert!(matches!(err, SummarizerError::Disconnected(_)));
    assert!(err.is_connection_class(&CONNECTION_ERROR_PATTERNS));
}

#[tokio::test]
async fn test_unextractable_page_reports_failure() {
    let server = completion_server("unused").await;
    let background = background_with(&server, Some("sk-test")).await;
    let page = spawn_page_context(
        "<html><body><p>Nothing here.</p></body></html>".to_string(),
        "https://example.com/empty".to_string(),
        ContentExtractor::default(),
        background,
    );

    assert!(!page.test_summarization().await.unwrap());
    let err = page.get_page_content().await.unwrap_err();
    assert_eq!(err.to_string(), "Could not extract content from page");
}
