//! One-shot generators: ask a single question, draft a social post

use parley_core::cache::{CacheStats, Fingerprint, ResponseCache};
use parley_core::{Error, Result};
use parley_providers::{CompletionProvider, SummarizationProvider};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info};

use crate::selector::Selector;

/// Model used for post drafts
pub const POST_MODEL: &str = "claude-3-5-sonnet";

pub const MIN_POST_WORDS: u32 = 50;
pub const MAX_POST_WORDS: u32 = 300;
pub const DEFAULT_POST_WORDS: u32 = 100;

/// Answer to a one-shot prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub model: String,
    pub response: String,
    /// Digest of `response`, when requested
    pub summary: Option<String>,
}

/// Sends single prompts without conversation history
pub struct Asker {
    completer: Arc<dyn CompletionProvider>,
    summarizer: Arc<dyn SummarizationProvider>,
    selector: Selector,
    cache: ResponseCache,
}

impl Asker {
    pub fn new(
        completer: Arc<dyn CompletionProvider>,
        summarizer: Arc<dyn SummarizationProvider>,
        selector: Selector,
    ) -> Self {
        Self {
            completer,
            summarizer,
            selector,
            cache: ResponseCache::new(),
        }
    }

    /// Send `prompt` to the model behind `model_label` and optionally
    /// summarize the response
    pub async fn ask(&mut self, prompt: &str, model_label: &str, summarize: bool) -> Result<Answer> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(Error::Validation("prompt is empty".to_string()));
        }

        let model = self.selector.model_id_for(model_label).to_string();
        info!(model = %model, summarize, "One-shot prompt");

        let completer = self.completer.clone();
        let (p, m) = (prompt.to_string(), model.clone());
        let response = self
            .cache
            .fetch(Fingerprint::completion(prompt, model.as_str()), || async move {
                completer.complete(&p, &m).await
            })
            .await?;

        let summary = if summarize {
            Some(self.summarize(&response).await?)
        } else {
            None
        };

        Ok(Answer {
            model,
            response,
            summary,
        })
    }

    async fn summarize(&mut self, text: &str) -> Result<String> {
        let summarizer = self.summarizer.clone();
        let text = text.to_string();
        let summary = self
            .cache
            .fetch(Fingerprint::summary(text.as_str()), || async move {
                summarizer.summarize(&text).await
            })
            .await?;
        Ok(summary)
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

/// Voice of a generated post
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tone {
    #[default]
    Professional,
    Casual,
    Funny,
}

impl Tone {
    pub const ALL: [Tone; 3] = [Tone::Professional, Tone::Casual, Tone::Funny];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "Professional",
            Tone::Casual => "Casual",
            Tone::Funny => "Funny",
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tone {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Tone::ALL
            .into_iter()
            .find(|tone| tone.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Validation(format!("unknown tone: {}", s)))
    }
}

/// What to write about and how
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostRequest {
    pub tone: Tone,
    words: u32,
    /// URL or text the post draws from
    pub content: String,
}

impl PostRequest {
    /// Word counts outside 50..=300 are clamped
    pub fn new(tone: Tone, words: u32, content: impl Into<String>) -> Self {
        Self {
            tone,
            words: words.clamp(MIN_POST_WORDS, MAX_POST_WORDS),
            content: content.into(),
        }
    }

    pub fn words(&self) -> u32 {
        self.words
    }

    pub fn prompt(&self) -> String {
        format!(
            "You are an expert social media manager. Generate a LinkedIn post based on the following:\n\n\
             Tone: {}\n\
             Desired Length: Approximately {} words\n\
             Use content from this URL: {}\n\n\
             Generate only the LinkedIn post text. Use dash for bullet points.",
            self.tone, self.words, self.content
        )
    }
}

/// Drafts posts and summarizes their source content
pub struct PostGenerator {
    completer: Arc<dyn CompletionProvider>,
    summarizer: Arc<dyn SummarizationProvider>,
    cache: ResponseCache,
}

impl PostGenerator {
    pub fn new(
        completer: Arc<dyn CompletionProvider>,
        summarizer: Arc<dyn SummarizationProvider>,
    ) -> Self {
        Self {
            completer,
            summarizer,
            cache: ResponseCache::new(),
        }
    }

    /// Generate the post text
    pub async fn generate(&mut self, request: &PostRequest) -> Result<String> {
        if request.content.trim().is_empty() {
            return Err(Error::Validation("post content is empty".to_string()));
        }
        debug!(tone = %request.tone, words = request.words, "Generating post");

        let prompt = request.prompt();
        let completer = self.completer.clone();
        let p = prompt.clone();
        let post = self
            .cache
            .fetch(Fingerprint::completion(prompt, POST_MODEL), || async move {
                completer.complete(&p, POST_MODEL).await
            })
            .await?;
        Ok(post)
    }

    /// Short digest of the post's source content
    pub async fn summarize_content(&mut self, content: &str) -> Result<String> {
        let content = content.trim().to_string();
        if content.is_empty() {
            return Err(Error::Validation("post content is empty".to_string()));
        }
        let summarizer = self.summarizer.clone();
        let c = content.clone();
        let summary = self
            .cache
            .fetch(Fingerprint::summary(content), || async move {
                summarizer.summarize(&c).await
            })
            .await?;
        Ok(summary)
    }
}
