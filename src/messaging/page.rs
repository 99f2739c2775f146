//! Page (content script) context: owns the loaded document.

use async_trait::async_trait;
use std::sync::OnceLock;
use tracing::{info, warn};

use super::background::BackgroundClient;
use super::protocol::{PageRequest, PageResponse};
use super::rpc::{self, RequestHandler, RpcClient};
use super::{AiBackend, PageSource};
use crate::core::models::{ExtractedContent, SummaryRequest};
use crate::errors::SummarizerError;
use crate::extract::{ContentExtractor, is_supported_url};

pub type PageClient = RpcClient<PageRequest, PageResponse>;

const NOT_EXTRACTABLE: &str = "Could not extract content from page";

/// A loaded page as seen from inside the tab.
pub struct PageContextHandler {
    html: String,
    url: String,
    extractor: ContentExtractor,
    background: BackgroundClient,
    extracted: OnceLock<Option<ExtractedContent>>,
}

impl PageContextHandler {
    #[must_use]
    pub fn new(
        html: String,
        url: String,
        extractor: ContentExtractor,
        background: BackgroundClient,
    ) -> Self {
        Self {
            html,
            url,
            extractor,
            background,
            extracted: OnceLock::new(),
        }
    }

    /// Extraction runs once per page load and is reused afterwards.
    fn extracted(&self) -> Option<&ExtractedContent> {
        self.extracted
            .get_or_init(|| self.extractor.extract(&self.html, &self.url))
            .as_ref()
    }

    fn is_summarizable(&self) -> bool {
        self.extracted()
            .is_some_and(|e| e.word_count >= self.extractor.rules().min_summarizable_words)
    }
}

#[async_trait]
impl RequestHandler<PageRequest, PageResponse> for PageContextHandler {
    async fn handle(&self, request: PageRequest) -> PageResponse {
        match request {
            PageRequest::TestSummarization => PageResponse::status(self.is_summarizable()),
            PageRequest::GetPageContent => match self.extracted() {
                Some(extracted) => PageResponse::content(extracted),
                None => PageResponse::failure(NOT_EXTRACTABLE),
            },
            PageRequest::GenerateSummaryFromPopup => {
                let Some(extracted) = self.extracted() else {
                    return PageResponse::failure(NOT_EXTRACTABLE);
                };
                match self
                    .background
                    .generate_summary(&SummaryRequest::from(extracted))
                    .await
                {
                    Ok(summary) => PageResponse::summary(extracted, summary),
                    Err(e) => {
                        warn!("Summary requested from popup failed: {}", e);
                        PageResponse::failure(e.to_string())
                    }
                }
            }
        }
    }
}

/// Load a page into its own context.
///
/// Non-http(s) pages never get a content script; the returned client then
/// behaves like one talking to a tab without a receiver.
#[must_use]
pub fn spawn_page_context(
    html: String,
    url: String,
    extractor: ContentExtractor,
    background: BackgroundClient,
) -> PageClient {
    let (client, server) = rpc::channel();
    if is_supported_url(&url) {
        info!("Page context loaded for {}", url);
        server.spawn(PageContextHandler::new(html, url, extractor, background));
    } else {
        info!("Skipping unsupported page {}", url);
        drop(server);
    }
    client
}

#[async_trait]
impl PageSource for PageClient {
    async fn get_page_content(&self) -> Result<ExtractedContent, SummarizerError> {
        let response = self.call(PageRequest::GetPageContent).await?;
        if response.success {
            Ok(response.into_extracted())
        } else {
            Err(SummarizerError::Remote(
                response
                    .error
                    .unwrap_or_else(|| "Failed to get page content".to_string()),
            ))
        }
    }

    async fn test_summarization(&self) -> Result<bool, SummarizerError> {
        Ok(self.call(PageRequest::TestSummarization).await?.success)
    }
}
