use std::future::Future;
use std::time::Duration;
use tokio_retry::strategy::FixedInterval;
use tracing::warn;

use crate::errors::SummarizerError;

/// How often and how patiently a connection-class failure is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: usize,
    pub delay: Duration,
}

impl RetryPolicy {
    /// Fetching content from the page context.
    #[must_use]
    pub const fn content_load() -> Self {
        Self {
            max_retries: 3,
            delay: Duration::from_millis(1000),
        }
    }

    /// Summary and chat calls to the background context.
    #[must_use]
    pub const fn ai_call() -> Self {
        Self {
            max_retries: 2,
            delay: Duration::from_millis(1500),
        }
    }

    #[must_use]
    pub fn delays(&self) -> std::iter::Take<FixedInterval> {
        FixedInterval::new(self.delay).take(self.max_retries)
    }
}

/// Run `operation`, retrying only connection-class failures.
///
/// `on_retry(n, max)` fires before the n-th retry. Any other failure, or the
/// last connection failure once retries run out, is returned unchanged.
pub async fn retry_connection_errors<T, F, Fut, N>(
    policy: &RetryPolicy,
    patterns: &[String],
    mut on_retry: N,
    mut operation: F,
) -> Result<T, SummarizerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SummarizerError>>,
    N: FnMut(usize, usize),
{
    let mut delays = policy.delays();
    let mut retry = 0;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_connection_class(patterns) => {
                let Some(delay) = delays.next() else {
                    warn!("Giving up after {} retries: {}", retry, err);
                    return Err(err);
                };
                retry += 1;
                warn!(
                    "Connection error ({}), retry {}/{} in {:?}",
                    err, retry, policy.max_retries, delay
                );
                on_retry(retry, policy.max_retries);
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}
