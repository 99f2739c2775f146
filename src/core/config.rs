use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::conversation::RetryPolicy;
use crate::errors::SummarizerError;

pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub openai_api_url: String,
    pub openai_model: String,
    pub store_path: PathBuf,
    pub http_timeout: Duration,
    pub content_retry: RetryPolicy,
    pub ai_retry: RetryPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            openai_api_url: DEFAULT_API_URL.to_string(),
            openai_model: DEFAULT_MODEL.to_string(),
            store_path: default_store_path(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
            content_retry: RetryPolicy::content_load(),
            ai_retry: RetryPolicy::ai_call(),
        }
    }
}

impl AppConfig {
    /// Defaults overridden by whichever environment variables are set.
    ///
    /// # Errors
    ///
    /// Returns `Config` when a numeric variable is set but does not parse.
    pub fn from_env() -> Result<Self, SummarizerError> {
        let defaults = Self::default();
        Ok(Self {
            openai_api_url: env::var("OPENAI_API_URL").unwrap_or(defaults.openai_api_url),
            openai_model: env::var("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            store_path: env::var("PAGE_SUMMARIZER_STORE")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            http_timeout: parse_var("PAGE_SUMMARIZER_HTTP_TIMEOUT_SECS")?
                .map_or(defaults.http_timeout, Duration::from_secs),
            content_retry: RetryPolicy {
                max_retries: parse_var("PAGE_SUMMARIZER_CONTENT_RETRIES")?
                    .unwrap_or(defaults.content_retry.max_retries),
                delay: parse_var("PAGE_SUMMARIZER_CONTENT_RETRY_DELAY_MS")?
                    .map_or(defaults.content_retry.delay, Duration::from_millis),
            },
            ai_retry: RetryPolicy {
                max_retries: parse_var("PAGE_SUMMARIZER_AI_RETRIES")?
                    .unwrap_or(defaults.ai_retry.max_retries),
                delay: parse_var("PAGE_SUMMARIZER_AI_RETRY_DELAY_MS")?
                    .map_or(defaults.ai_retry.delay, Duration::from_millis),
            },
        })
    }
}

fn default_store_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("page-summarizer")
        .join("storage.json")
}

fn parse_var<T: FromStr>(name: &str) -> Result<Option<T>, SummarizerError>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| SummarizerError::Config(format!("{name}: {e}"))),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_keep_separate_retry_policies() {
        let config = AppConfig::default();
        assert_eq!(config.content_retry.max_retries, 3);
        assert_eq!(config.content_retry.delay, Duration::from_millis(1000));
        assert_eq!(config.ai_retry.max_retries, 2);
        assert_eq!(config.ai_retry.delay, Duration::from_millis(1500));
        assert_eq!(config.openai_api_url, DEFAULT_API_URL);
        assert!(config.store_path.ends_with("page-summarizer/storage.json"));
    }
}
