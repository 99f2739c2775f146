//! Background (service) context: owns the summarization client.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

use super::protocol::{BackgroundRequest, BackgroundResponse};
use super::rpc::{self, RequestHandler, RpcClient};
use super::AiBackend;
use crate::ai::SummarizationClient;
use crate::core::models::SummaryRequest;
use crate::errors::SummarizerError;

pub type BackgroundClient = RpcClient<BackgroundRequest, BackgroundResponse>;

pub struct BackgroundHandler {
    client: Arc<SummarizationClient>,
}

impl BackgroundHandler {
    #[must_use]
    pub fn new(client: Arc<SummarizationClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl RequestHandler<BackgroundRequest, BackgroundResponse> for BackgroundHandler {
    async fn handle(&self, request: BackgroundRequest) -> BackgroundResponse {
        match request {
            BackgroundRequest::GenerateSummary {
                content,
                title,
                content_type,
            } => match self.client.summarize(&content, &title, content_type).await {
                Ok(summary) => BackgroundResponse::summary(summary),
                Err(e) => {
                    error!("Error generating summary: {}", e);
                    BackgroundResponse::failure(&e)
                }
            },
            BackgroundRequest::GenerateChatResponse {
                prompt,
                user_message,
            } => match self.client.chat(&prompt, &user_message).await {
                Ok(response) => BackgroundResponse::chat(response),
                Err(e) => {
                    error!("Error generating chat response: {}", e);
                    BackgroundResponse::failure(&e)
                }
            },
        }
    }
}

/// Start the background context and hand back a client for it.
#[must_use]
pub fn spawn_background(client: Arc<SummarizationClient>) -> BackgroundClient {
    let (rpc_client, server) = rpc::channel();
    server.spawn(BackgroundHandler::new(client));
    info!("Background context started");
    rpc_client
}

fn remote_failure(response: BackgroundResponse, fallback: &str) -> SummarizerError {
    SummarizerError::Remote(response.error.unwrap_or_else(|| fallback.to_string()))
}

#[async_trait]
impl AiBackend for BackgroundClient {
    async fn generate_summary(&self, request: &SummaryRequest) -> Result<String, SummarizerError> {
        let response = self
            .call(BackgroundRequest::GenerateSummary {
                content: request.content.clone(),
                title: request.title.clone(),
                content_type: request.content_type,
            })
            .await?;

        match response {
            BackgroundResponse {
                success: true,
                summary: Some(summary),
                ..
            } => Ok(summary),
            other => Err(remote_failure(other, "Failed to generate summary")),
        }
    }

    async fn generate_chat_response(
        &self,
        prompt: &str,
        user_message: &str,
    ) -> Result<String, SummarizerError> {
        let response = self
            .call(BackgroundRequest::GenerateChatResponse {
                prompt: prompt.to_string(),
                user_message: user_message.to_string(),
            })
            .await?;

        match response {
            BackgroundResponse {
                success: true,
                response: Some(text),
                ..
            } => Ok(text),
            other => Err(remote_failure(other, "Failed to generate response")),
        }
    }
}
