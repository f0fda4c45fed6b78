//! Prompt context: conversation modes and prompt assembly

use parley_core::session::Turn;
use std::collections::HashMap;

/// Mode used when the requested one is unknown
pub const DEFAULT_MODE: &str = "General Chat";

const BUILTIN_MODES: [(&str, &str); 4] = [
    (
        "General Chat",
        "You are a helpful and friendly AI assistant.",
    ),
    (
        "Code Assistant",
        "You are an expert code assistant. Help users with programming questions, debugging, and best practices. Provide code examples when relevant.",
    ),
    (
        "Data Analyst",
        "You are a data analyst expert. Help users understand data, create queries, and provide insights. Focus on SQL and data visualization.",
    ),
    (
        "Tech Mentor",
        "You are a patient technical mentor. Explain complex concepts in simple terms using analogies and examples. Help users learn and understand technology.",
    ),
];

/// Conversation modes and their system prompts
#[derive(Debug, Clone)]
pub struct ModeCatalog {
    /// Mode names in display order
    order: Vec<String>,
    prompts: HashMap<String, String>,
}

impl ModeCatalog {
    /// Catalog with the built-in modes
    pub fn new() -> Self {
        let mut catalog = Self {
            order: Vec::new(),
            prompts: HashMap::new(),
        };
        for (name, prompt) in BUILTIN_MODES {
            catalog.insert(name, prompt);
        }
        catalog
    }

    /// Built-in modes plus configured extras; a configured name that matches
    /// a built-in replaces its prompt
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Self {
        let mut catalog = Self::new();
        let mut names: Vec<&String> = overrides.keys().collect();
        names.sort();
        for name in names {
            catalog.insert(name, &overrides[name]);
        }
        catalog
    }

    /// Add or replace a mode
    pub fn insert(&mut self, name: &str, prompt: &str) {
        if !self.prompts.contains_key(name) {
            self.order.push(name.to_string());
        }
        self.prompts.insert(name.to_string(), prompt.to_string());
    }

    /// Mode names in display order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    pub fn contains(&self, mode: &str) -> bool {
        self.prompts.contains_key(mode.trim())
    }

    /// Canonical name for `mode`, or the default mode if unknown
    pub fn resolve<'a>(&'a self, mode: &str) -> &'a str {
        let mode = mode.trim();
        self.order
            .iter()
            .find(|name| name.as_str() == mode)
            .map(String::as_str)
            .unwrap_or(DEFAULT_MODE)
    }

    /// System prompt for `mode`; unknown or empty modes get the default prompt
    pub fn system_prompt_for(&self, mode: &str) -> &str {
        let name = self.resolve(mode);
        self.prompts
            .get(name)
            .map(String::as_str)
            .unwrap_or(BUILTIN_MODES[0].1)
    }
}

impl Default for ModeCatalog {
    fn default() -> Self {
        Self::new()
    }
}

/// Render turns as `User: ...` / `Assistant: ...` blocks separated by blank lines
pub fn render_history(turns: &[Turn]) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", turn.role().label(), turn.content()))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Full chat prompt: system prompt, the whole history, then an open assistant slot
pub fn build_chat_prompt(system_prompt: &str, history: &[Turn]) -> String {
    format!(
        "{}\n\n{}\n\nAssistant:",
        system_prompt,
        render_history(history)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_modes() {
        let catalog = ModeCatalog::new();
        assert_eq!(
            catalog.names(),
            &["General Chat", "Code Assistant", "Data Analyst", "Tech Mentor"]
        );
        assert!(catalog
            .system_prompt_for("Data Analyst")
            .contains("data analyst expert"));
    }

    #[test]
    fn test_unknown_mode_falls_back() {
        let catalog = ModeCatalog::new();
        let general = catalog.system_prompt_for("General Chat");
        assert_eq!(catalog.system_prompt_for("unknown mode"), general);
        assert_eq!(catalog.system_prompt_for(""), general);
        assert_eq!(catalog.resolve("nope"), DEFAULT_MODE);
    }

    #[test]
    fn test_overrides_replace_and_extend() {
        let mut overrides = HashMap::new();
        overrides.insert("Tech Mentor".to_string(), "Be brief.".to_string());
        overrides.insert("Poet".to_string(), "Answer in verse.".to_string());

        let catalog = ModeCatalog::with_overrides(&overrides);
        assert_eq!(catalog.system_prompt_for("Tech Mentor"), "Be brief.");
        assert_eq!(catalog.system_prompt_for("Poet"), "Answer in verse.");
        assert_eq!(catalog.names().len(), 5);
        assert_eq!(catalog.names()[4], "Poet");
    }

    #[test]
    fn test_build_chat_prompt() {
        let history = vec![
            Turn::assistant("Hello!"),
            Turn::user("What is a view?"),
        ];
        let prompt = build_chat_prompt("You are helpful.", &history);
        assert_eq!(
            prompt,
            "You are helpful.\n\nAssistant: Hello!\n\nUser: What is a view?\n\nAssistant:"
        );
    }
}
