//! Base traits for completion and summarization providers

use async_trait::async_trait;
use parley_core::session::Turn;
use reqwest::StatusCode;
use thiserror::Error;

/// Error type for provider operations
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The service could not be reached or refused our credentials
    #[error("Backend unavailable: {0}")]
    BackendUnavailable(String),

    /// The call reached the service but did not succeed
    #[error("Request failed: {0}")]
    RequestFailed(String),

    /// The body did not have the expected shape. Completion callers never
    /// see this: extraction falls back to the raw body.
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Unsupported model: {0}")]
    UnsupportedModel(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ProviderError {
    /// Classify a non-success HTTP status
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = format!("HTTP {}: {}", status, body);
        match status {
            StatusCode::UNAUTHORIZED
            | StatusCode::FORBIDDEN
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => ProviderError::BackendUnavailable(message),
            _ => ProviderError::RequestFailed(message),
        }
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() {
            ProviderError::BackendUnavailable(e.to_string())
        } else if e.is_timeout() {
            ProviderError::RequestFailed(format!("timed out: {}", e))
        } else if e.is_builder() {
            ProviderError::ConfigError(e.to_string())
        } else {
            ProviderError::RequestFailed(e.to_string())
        }
    }
}

impl From<ProviderError> for parley_core::Error {
    fn from(e: ProviderError) -> Self {
        match e {
            ProviderError::ConfigError(msg) => parley_core::Error::Config(msg),
            ProviderError::InvalidRequest(msg) => parley_core::Error::Validation(msg),
            other => parley_core::Error::Provider(other.to_string()),
        }
    }
}

pub type ProviderResult<T> = Result<T, ProviderError>;

/// A text-completion backend
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Send `prompt` to `model` and return the response text
    async fn complete(&self, prompt: &str, model: &str) -> ProviderResult<String>;

    /// Get the default model for this provider
    fn default_model(&self) -> String;
}

/// A backend that condenses text into a short digest
#[async_trait]
pub trait SummarizationProvider: Send + Sync {
    /// Summarize free-form content (an article, a URL, a response)
    async fn summarize(&self, text: &str) -> ProviderResult<String>;

    /// Summarize a transcript already rendered by [`render_window`]
    async fn summarize_transcript(&self, transcript: &str) -> ProviderResult<String>;

    /// Summarize the trailing `window` turns of a conversation
    async fn summarize_conversation(&self, turns: &[Turn], window: usize) -> ProviderResult<String> {
        let transcript = render_window(turns, window);
        self.summarize_transcript(&transcript).await
    }
}

/// Render the trailing `window` turns as `role: content` lines joined by newline
pub fn render_window(turns: &[Turn], window: usize) -> String {
    let start = turns.len().saturating_sub(window);
    turns[start..]
        .iter()
        .map(|turn| format!("{}: {}", turn.role().as_str(), turn.content()))
        .collect::<Vec<_>>()
        .join("\n")
}
