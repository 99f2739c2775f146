use thiserror::Error;

/// Message fragments that identify an unreachable peer context rather than an
/// application-level failure.
pub const CONNECTION_ERROR_PATTERNS: [&str; 3] = [
    "Could not establish connection",
    "Receiving end does not exist",
    "Extension context invalidated",
];

/// Error returned when an RPC peer has gone away.
pub const DISCONNECTED_MESSAGE: &str =
    "Could not establish connection. Receiving end does not exist.";

#[derive(Debug, Error)]
pub enum SummarizerError {
    #[error("OpenAI API key not configured. Please set it in the extension settings.")]
    MissingCredential,

    #[error("Invalid API key format. OpenAI keys start with \"sk-\"")]
    InvalidCredentialFormat,

    #[error("OpenAI API error: {status} - {message}")]
    UpstreamError { status: u16, message: String },

    #[error("No summary generated from OpenAI API")]
    EmptyResult,

    #[error("Failed to connect to OpenAI API: {0}")]
    ConnectionFailure(String),

    #[error("Failed to extract page content: {0}")]
    ExtractionFailure(String),

    #[error("{0}")]
    Disconnected(String),

    #[error("{0}")]
    Remote(String),

    #[error("Failed to access credential storage: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("No active conversation")]
    NoActiveConversation,
}

impl SummarizerError {
    /// Whether this failure means the other context could not be reached.
    ///
    /// Matching is done on the rendered message so that errors relayed as
    /// plain strings from another context classify the same way.
    #[must_use]
    pub fn is_connection_class<S: AsRef<str>>(&self, patterns: &[S]) -> bool {
        let rendered = self.to_string().to_lowercase();
        patterns
            .iter()
            .any(|p| rendered.contains(&p.as_ref().to_lowercase()))
    }
}

impl From<reqwest::Error> for SummarizerError {
    fn from(error: reqwest::Error) -> Self {
        SummarizerError::ConnectionFailure(error.to_string())
    }
}

impl From<serde_json::Error> for SummarizerError {
    fn from(error: serde_json::Error) -> Self {
        SummarizerError::Storage(error.to_string())
    }
}

impl From<std::io::Error> for SummarizerError {
    fn from(error: std::io::Error) -> Self {
        SummarizerError::Storage(error.to_string())
    }
}
