//! Mode/model selector: pure lookups from user choices to backend inputs

use parley_core::config::Config;
use parley_providers::{ModelRegistry, ModelSpec};

use crate::context::ModeCatalog;

/// Maps user-facing choices to a system prompt and a backend model id.
/// Lookups never fail; unknown keys resolve to defaults.
#[derive(Debug, Clone, Default)]
pub struct Selector {
    models: ModelRegistry,
    modes: ModeCatalog,
}

impl Selector {
    pub fn new(models: ModelRegistry, modes: ModeCatalog) -> Self {
        Self { models, modes }
    }

    /// Built-in models plus the modes configured in `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(ModelRegistry::new(), ModeCatalog::with_overrides(&config.modes))
    }

    /// System prompt for a conversation mode
    pub fn system_prompt_for(&self, mode: &str) -> &str {
        self.modes.system_prompt_for(mode)
    }

    /// Canonical mode name (default if unknown)
    pub fn resolve_mode<'a>(&'a self, mode: &str) -> &'a str {
        self.modes.resolve(mode)
    }

    /// Backend id for a picker label or bare id (default if unknown)
    pub fn model_id_for(&self, label: &str) -> &str {
        self.models.model_id_for(label)
    }

    /// Models offered to the user
    pub fn models(&self) -> Vec<&ModelSpec> {
        self.models.selectable().collect()
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.models
    }

    /// Mode names offered to the user
    pub fn modes(&self) -> &[String] {
        self.modes.names()
    }
}
