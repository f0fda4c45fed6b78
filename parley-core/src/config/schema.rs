//! Configuration schema definitions

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root configuration for parley
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Completion service connection
    #[serde(default)]
    pub service: ServiceConfig,
    /// Chat session defaults
    #[serde(default)]
    pub chat: ChatDefaults,
    /// Auto-summarization settings
    #[serde(default)]
    pub summary: SummaryConfig,
    /// Extra or overriding conversation mode prompts, keyed by mode name
    #[serde(default)]
    pub modes: HashMap<String, String>,
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Completion service connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the completion service
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// Bearer token, empty for unauthenticated local services
    #[serde(default)]
    pub api_key: String,
    /// Path of the completion endpoint, appended to `api_base`
    #[serde(default = "default_complete_path")]
    pub complete_path: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Extra headers sent with every request
    #[serde(default)]
    pub extra_headers: HashMap<String, String>,
}

fn default_api_base() -> String {
    "http://localhost:8080".to_string()
}

fn default_complete_path() -> String {
    "/complete".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_base: default_api_base(),
            api_key: String::new(),
            complete_path: default_complete_path(),
            timeout_secs: default_timeout_secs(),
            extra_headers: HashMap::new(),
        }
    }
}

/// Default chat session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatDefaults {
    /// Default model id or label
    #[serde(default = "default_chat_model")]
    pub model: String,
    /// Default conversation mode
    #[serde(default = "default_chat_mode")]
    pub mode: String,
    /// Whether a fresh conversation starts with an assistant greeting.
    /// The greeting shifts every post-reply log length to an odd value.
    #[serde(default)]
    pub seed_greeting: bool,
    /// Greeting text used when `seed_greeting` is set
    #[serde(default = "default_greeting")]
    pub greeting: String,
}

fn default_chat_model() -> String {
    "claude-3-5-sonnet".to_string()
}

fn default_chat_mode() -> String {
    "General Chat".to_string()
}

fn default_greeting() -> String {
    "Hello! I'm your AI assistant. How can I help you today?".to_string()
}

impl Default for ChatDefaults {
    fn default() -> Self {
        Self {
            model: default_chat_model(),
            mode: default_chat_mode(),
            seed_greeting: false,
            greeting: default_greeting(),
        }
    }
}

/// Wording used for conversation digests
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum SummaryStyle {
    /// TL;DR in 2-3 sentences
    #[default]
    Sentences,
    /// TL;DR in 2-3 bullet points
    Bullets,
}

/// Auto-summarization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// Model used for digests
    #[serde(default = "default_summary_model")]
    pub model: String,
    /// Trigger period: summarize whenever the log length is a multiple of this
    #[serde(default = "default_summary_every")]
    pub every: usize,
    /// Number of trailing turns sent to the summarizer
    #[serde(default = "default_summary_window")]
    pub window: usize,
    /// Built-in wording
    #[serde(default)]
    pub style: SummaryStyle,
    /// Custom conversation template; must contain `{content}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
}

fn default_summary_model() -> String {
    "mistral-large".to_string()
}

fn default_summary_every() -> usize {
    10
}

fn default_summary_window() -> usize {
    10
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            model: default_summary_model(),
            every: default_summary_every(),
            window: default_summary_window(),
            style: SummaryStyle::default(),
            template: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Log format (text, json)
    #[serde(default = "default_log_format")]
    pub format: String,
    /// Directory for log files
    #[serde(default = "default_log_dir")]
    pub dir: String,
    /// Module-specific overrides
    #[serde(default)]
    pub overrides: HashMap<String, String>,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_log_dir() -> String {
    "logs".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            dir: default_log_dir(),
            overrides: HashMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.chat.model, "claude-3-5-sonnet");
        assert_eq!(config.chat.mode, "General Chat");
        assert!(!config.chat.seed_greeting);
        assert_eq!(config.summary.every, 10);
        assert_eq!(config.summary.window, 10);
        assert_eq!(config.summary.model, "mistral-large");
        assert_eq!(config.service.timeout_secs, 60);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"summary":{"style":"bullets","every":4}}"#).unwrap();
        assert_eq!(config.summary.style, SummaryStyle::Bullets);
        assert_eq!(config.summary.every, 4);
        assert_eq!(config.summary.window, 10);
        assert_eq!(config.service.complete_path, "/complete");
    }
}
