//! Summarization client: digests built from completion calls on a summary model

use async_trait::async_trait;
use parley_core::config::{SummaryConfig, SummaryStyle};
use std::sync::Arc;
use tracing::debug;

use crate::base::{CompletionProvider, ProviderError, ProviderResult, SummarizationProvider};

/// Placeholder replaced by the text being summarized
pub const CONTENT_PLACEHOLDER: &str = "{content}";

/// TL;DR of a conversation in a few sentences
pub const CONVERSATION_SENTENCES_TEMPLATE: &str = "Please provide a concise TL;DR (Too Long; Didn't Read) summary of the following conversation in 2-3 sentences:\n\n{content}";

/// TL;DR of a conversation as bullet points
pub const CONVERSATION_BULLETS_TEMPLATE: &str = "Please provide a concise TL;DR (Too Long; Didn't Read) summary of the following conversation in 2-3 bullet points:\n\n{content}";

/// Short summary of free-form content
pub const CONTENT_TEMPLATE: &str =
    "Please summarize the following content in 2-3 sentences:\n{content}";

/// Built-in conversation template for a style
pub fn conversation_template(style: SummaryStyle) -> &'static str {
    match style {
        SummaryStyle::Sentences => CONVERSATION_SENTENCES_TEMPLATE,
        SummaryStyle::Bullets => CONVERSATION_BULLETS_TEMPLATE,
    }
}

/// Summarizer that prompts a completion provider with summary instructions
pub struct Summarizer {
    provider: Arc<dyn CompletionProvider>,
    model: String,
    conversation_template: String,
    content_template: String,
}

impl Summarizer {
    /// Create a summarizer using the default wording
    pub fn new(provider: Arc<dyn CompletionProvider>, model: impl Into<String>) -> Self {
        Self {
            provider,
            model: model.into(),
            conversation_template: CONVERSATION_SENTENCES_TEMPLATE.to_string(),
            content_template: CONTENT_TEMPLATE.to_string(),
        }
    }

    /// Create a summarizer from the `summary` configuration section.
    /// A custom template takes precedence over the style.
    pub fn from_config(provider: Arc<dyn CompletionProvider>, config: &SummaryConfig) -> Self {
        let template = config
            .template
            .clone()
            .unwrap_or_else(|| conversation_template(config.style).to_string());
        Self::new(provider, config.model.clone()).with_conversation_template(template)
    }

    /// Replace the conversation template
    pub fn with_conversation_template(mut self, template: impl Into<String>) -> Self {
        self.conversation_template = template.into();
        self
    }

    /// Model digests are requested from
    pub fn model(&self) -> &str {
        &self.model
    }

    fn fill(template: &str, text: &str) -> String {
        template.replace(CONTENT_PLACEHOLDER, text)
    }

    /// The prompt sent for a rendered conversation transcript
    pub fn conversation_prompt(&self, transcript: &str) -> String {
        Self::fill(&self.conversation_template, transcript)
    }

    /// The prompt sent for free-form content
    pub fn content_prompt(&self, text: &str) -> String {
        Self::fill(&self.content_template, text)
    }

    async fn request(&self, prompt: String) -> ProviderResult<String> {
        debug!("Requesting summary from {}", self.model);
        self.provider.complete(&prompt, &self.model).await
    }
}

#[async_trait]
impl SummarizationProvider for Summarizer {
    async fn summarize(&self, text: &str) -> ProviderResult<String> {
        if text.trim().is_empty() {
            return Err(ProviderError::InvalidRequest(
                "nothing to summarize".to_string(),
            ));
        }
        self.request(self.content_prompt(text)).await
    }

    async fn summarize_transcript(&self, transcript: &str) -> ProviderResult<String> {
        if transcript.trim().is_empty() {
            return Err(ProviderError::InvalidRequest(
                "conversation is empty".to_string(),
            ));
        }
        self.request(self.conversation_prompt(transcript)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::session::Turn;
    use std::sync::Mutex;

    /// Records prompts and answers with a fixed digest
    struct Recorder {
        calls: Mutex<Vec<(String, String)>>,
    }

    impl Recorder {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                calls: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl CompletionProvider for Recorder {
        async fn complete(&self, prompt: &str, model: &str) -> ProviderResult<String> {
            self.calls
                .lock()
                .unwrap()
                .push((prompt.to_string(), model.to_string()));
            Ok("digest".to_string())
        }

        fn default_model(&self) -> String {
            "mistral-large".to_string()
        }
    }

    #[tokio::test]
    async fn test_summarize_conversation_uses_window() {
        let recorder = Recorder::new();
        let summarizer = Summarizer::new(recorder.clone(), "mistral-large");
        let turns: Vec<Turn> = (0..14).map(|i| Turn::user(format!("m{}", i))).collect();

        let digest = summarizer.summarize_conversation(&turns, 10).await.unwrap();
        assert_eq!(digest, "digest");

        let calls = recorder.calls.lock().unwrap();
        let (prompt, model) = &calls[0];
        assert_eq!(model, "mistral-large");
        assert!(prompt.starts_with("Please provide a concise TL;DR"));
        let expected: Vec<String> = (4..14).map(|i| format!("user: m{}", i)).collect();
        assert!(prompt.ends_with(&format!("\n\n{}", expected.join("\n"))));
        assert!(!prompt.contains("user: m3\n"));
    }

    #[tokio::test]
    async fn test_bullet_style_from_config() {
        let recorder = Recorder::new();
        let config = SummaryConfig {
            style: SummaryStyle::Bullets,
            ..SummaryConfig::default()
        };
        let summarizer = Summarizer::from_config(recorder.clone(), &config);

        summarizer.summarize_transcript("user: hi").await.unwrap();

        let calls = recorder.calls.lock().unwrap();
        assert!(calls[0].0.contains("2-3 bullet points"));
        assert!(calls[0].0.ends_with("user: hi"));
    }

    #[tokio::test]
    async fn test_custom_template_overrides_style() {
        let recorder = Recorder::new();
        let config = SummaryConfig {
            template: Some("Digest: {content} (end)".to_string()),
            ..SummaryConfig::default()
        };
        let summarizer = Summarizer::from_config(recorder.clone(), &config);

        summarizer.summarize_transcript("user: hi").await.unwrap();
        assert_eq!(recorder.calls.lock().unwrap()[0].0, "Digest: user: hi (end)");
    }

    #[tokio::test]
    async fn test_summarize_content() {
        let recorder = Recorder::new();
        let summarizer = Summarizer::new(recorder.clone(), "mistral-large");

        summarizer
            .summarize("https://docs.example.com/views")
            .await
            .unwrap();

        let calls = recorder.calls.lock().unwrap();
        assert_eq!(
            calls[0].0,
            "Please summarize the following content in 2-3 sentences:\nhttps://docs.example.com/views"
        );
    }

    #[tokio::test]
    async fn test_empty_input_rejected() {
        let summarizer = Summarizer::new(Recorder::new(), "mistral-large");
        assert!(summarizer.summarize("  ").await.is_err());
        assert!(summarizer.summarize_conversation(&[], 10).await.is_err());
    }
}
