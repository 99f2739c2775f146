// Command-line shell around the page, background and popup contexts

use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use page_summarizer::ai::SummarizationClient;
use page_summarizer::conversation::{ConversationManager, ManagerOptions, NoticeKind};
use page_summarizer::core::config::AppConfig;
use page_summarizer::extract::ContentExtractor;
use page_summarizer::messaging::{
    BackgroundClient, PageClient, PageSource, spawn_background, spawn_page_context,
};
use page_summarizer::storage::{JsonFileStore, save_api_key};

const TEST_PAGE_ERROR: &str = "Error testing page. Make sure you're on a web page with content.";
const CONNECTION_ERROR: &str = "Unable to connect to the page content. Try refreshing the page.";
const NO_CONTENT_ERROR: &str =
    "Could not extract content from this page. Make sure it is a web page with content.";

#[derive(Debug, Parser)]
#[command(name = "page-summarizer", about = "Summarize a web page and chat about it")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Store the OpenAI API key
    SetKey {
        #[arg(env = "OPENAI_API_KEY")]
        key: String,
    },
    /// Check whether a page has enough content to summarize
    Test(PageArgs),
    /// Summarize a page, then answer follow-up questions read from stdin
    Summarize(PageArgs),
}

#[derive(Debug, Args)]
struct PageArgs {
    /// Saved HTML of the page
    #[arg(long)]
    html: PathBuf,
    /// Address the page was loaded from
    #[arg(long)]
    url: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    page_summarizer::setup_logging();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;
    let store = Arc::new(JsonFileStore::new(&config.store_path));

    match cli.command {
        Command::SetKey { key } => {
            save_api_key(store.as_ref(), &key).await?;
            println!("API key saved successfully!");
        }
        Command::Test(args) => {
            let client = Arc::new(SummarizationClient::new(&config, store)?);
            let page = open_page(&args, spawn_background(client))?;
            if test_page(&page).await? {
                println!("Page can be summarized!");
            } else {
                println!("This page cannot be summarized (not enough content)");
            }
        }
        Command::Summarize(args) => {
            let client = Arc::new(SummarizationClient::new(&config, store)?);
            let background = spawn_background(client);
            let page = open_page(&args, background.clone())?;
            run_chat(page, background, &config).await?;
        }
    }

    Ok(())
}

async fn test_page(page: &PageClient) -> Result<bool> {
    page.test_summarization().await.map_err(|e| {
        warn!("Error testing page: {}", e);
        anyhow!(TEST_PAGE_ERROR)
    })
}

fn open_page(args: &PageArgs, background: BackgroundClient) -> Result<PageClient> {
    let html = std::fs::read_to_string(&args.html)
        .with_context(|| format!("reading {}", args.html.display()))?;
    Ok(spawn_page_context(
        html,
        args.url.clone(),
        ContentExtractor::default(),
        background,
    ))
}

async fn run_chat(
    page: PageClient,
    background: BackgroundClient,
    config: &AppConfig,
) -> Result<()> {
    let (mut manager, mut notices) = ConversationManager::new(
        Arc::new(page),
        Arc::new(background),
        ManagerOptions::from(config),
    );

    tokio::spawn(async move {
        while let Some(notice) = notices.recv().await {
            let marker = match notice.kind {
                NoticeKind::Success => "ok",
                NoticeKind::Error => "!!",
            };
            eprintln!("[{marker}] {}", notice.text);
        }
    });

    manager.auto_start().await;
    if manager.connection_failed() {
        eprintln!("Connection failed. Retrying once...");
        manager.manual_retry().await;
    }
    if let Some(message) = startup_failure(
        manager.connection_failed(),
        manager.active_conversation().is_some(),
    ) {
        bail!(message);
    }
    print_last_reply(&manager);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            break;
        }
        if manager.send_message(&line).await?.is_some() {
            print_last_reply(&manager);
        }
        if manager.connection_failed() {
            bail!("Connection failed after multiple attempts.");
        }
    }

    info!("Chat finished with {} conversation(s)", manager.conversations().len());
    Ok(())
}

fn print_last_reply(manager: &ConversationManager) {
    if let Some(reply) = manager
        .active_conversation()
        .and_then(|c| c.messages.last())
    {
        println!("{}\n", reply.content);
    }
}

/// Why the chat could not start, if it could not.
fn startup_failure(connection_failed: bool, has_conversation: bool) -> Option<&'static str> {
    if connection_failed {
        Some(CONNECTION_ERROR)
    } else if !has_conversation {
        Some(NO_CONTENT_ERROR)
    } else {
        None
    }
}
