/// Page Summarizer - summarises the web page you are reading with ChatGPT and
/// lets you ask follow-up questions about it.
///
/// The crate mirrors the three contexts of a browser extension:
/// 1. A page context that parses the loaded document and extracts readable text
/// 2. A background context that owns the API credential and calls `OpenAI`
/// 3. A popup context whose conversation manager drives summaries and follow-ups
///
/// # Architecture
///
/// The system uses:
/// - scraper for HTML parsing and selector matching
/// - reqwest for the chat-completion API
/// - Tokio channels as the only link between contexts
/// - tokio-retry interval strategies for connection retries
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use page_summarizer::ai::SummarizationClient;
/// use page_summarizer::conversation::{ConversationManager, ManagerOptions};
/// use page_summarizer::core::config::AppConfig;
/// use page_summarizer::extract::ContentExtractor;
/// use page_summarizer::messaging::{spawn_background, spawn_page_context};
/// use page_summarizer::storage::JsonFileStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     page_summarizer::setup_logging();
///
///     let config = AppConfig::from_env()?;
///     let store = Arc::new(JsonFileStore::new(&config.store_path));
///     let client = Arc::new(SummarizationClient::new(&config, store)?);
///
///     let background = spawn_background(client);
///     let page = spawn_page_context(
///         std::fs::read_to_string("page.html")?,
///         "https://example.com/article".to_string(),
///         ContentExtractor::default(),
///         background.clone(),
///     );
///
///     let (mut manager, _notices) = ConversationManager::new(
///         Arc::new(page),
///         Arc::new(background),
///         ManagerOptions::from(&config),
///     );
///
///     if manager.generate_initial_summary().await.is_some() {
///         manager.send_message("What are the key numbers?").await?;
///     }
///     for conversation in manager.conversations() {
///         println!("{}", conversation.transcript());
///     }
///
///     Ok(())
/// }
/// ```
pub mod ai;
pub mod conversation;
pub mod core;
pub mod errors;
pub mod extract;
pub mod messaging;
pub mod storage;

/// Configure structured logging with JSON output.
///
/// Honours `RUST_LOG` (default `info`). Calling it more than once is harmless;
/// only the first subscriber is installed.
///
/// # Example
///
/// ```
/// page_summarizer::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_writer(std::io::stderr);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
