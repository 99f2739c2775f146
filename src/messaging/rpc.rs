//! Request/response channel between two contexts.
//!
//! Each call carries its own reply slot, so callers simply await the answer.
//! When the serving side is gone the call fails with the same
//! "Receiving end does not exist" error a browser reports for a missing
//! content script.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::errors::{DISCONNECTED_MESSAGE, SummarizerError};

const CHANNEL_CAPACITY: usize = 32;

#[async_trait]
pub trait RequestHandler<Req, Resp>: Send + Sync + 'static {
    async fn handle(&self, request: Req) -> Resp;
}

struct Envelope<Req, Resp> {
    request: Req,
    reply: oneshot::Sender<Resp>,
}

pub struct RpcClient<Req, Resp> {
    tx: mpsc::Sender<Envelope<Req, Resp>>,
}

impl<Req, Resp> Clone for RpcClient<Req, Resp> {
    fn clone(&self) -> Self {
        Self {
            tx: self.tx.clone(),
        }
    }
}

impl<Req, Resp> RpcClient<Req, Resp>
where
    Req: Send,
    Resp: Send,
{
    /// # Errors
    ///
    /// `Disconnected` when the serving context is not running or drops the
    /// request without answering.
    pub async fn call(&self, request: Req) -> Result<Resp, SummarizerError> {
        let (reply, response) = oneshot::channel();
        self.tx
            .send(Envelope { request, reply })
            .await
            .map_err(|_| SummarizerError::Disconnected(DISCONNECTED_MESSAGE.to_string()))?;
        response
            .await
            .map_err(|_| SummarizerError::Disconnected(DISCONNECTED_MESSAGE.to_string()))
    }

    #[must_use]
    pub fn is_connected(&self) -> bool {
        !self.tx.is_closed()
    }
}

pub struct RpcServer<Req, Resp> {
    rx: mpsc::Receiver<Envelope<Req, Resp>>,
}

#[must_use]
pub fn channel<Req, Resp>() -> (RpcClient<Req, Resp>, RpcServer<Req, Resp>) {
    let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);
    (RpcClient { tx }, RpcServer { rx })
}

impl<Req, Resp> RpcServer<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    /// Answer requests until every client is dropped. Each request is handled
    /// on its own task so a slow call does not hold up the next one.
    pub async fn serve<H>(mut self, handler: H)
    where
        H: RequestHandler<Req, Resp>,
    {
        let handler = Arc::new(handler);
        while let Some(Envelope { request, reply }) = self.rx.recv().await {
            let handler = Arc::clone(&handler);
            tokio::spawn(async move {
                let response = handler.handle(request).await;
                if reply.send(response).is_err() {
                    debug!("Caller went away before the response was delivered");
                }
            });
        }
        debug!("All clients disconnected; stopping server");
    }

    pub fn spawn<H>(self, handler: H) -> JoinHandle<()>
    where
        H: RequestHandler<Req, Resp>,
    {
        tokio::spawn(self.serve(handler))
    }
}
