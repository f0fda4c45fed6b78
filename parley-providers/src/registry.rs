//! Model registry - the fixed catalog of models the completion service offers

use serde::{Deserialize, Serialize};

use crate::base::{ProviderError, ProviderResult};

/// One model offered by the completion service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelSpec {
    /// Canonical backend identifier
    pub id: String,
    /// What the model is good at
    pub description: String,
    /// Whether the model is offered in pickers
    #[serde(default = "default_selectable")]
    pub selectable: bool,
}

fn default_selectable() -> bool {
    true
}

impl ModelSpec {
    /// Human-readable picker label: `"{id} - {description}"`
    pub fn label(&self) -> String {
        format!("{} - {}", self.id, self.description)
    }
}

#[derive(Debug, Deserialize)]
struct Catalog {
    default: String,
    models: Vec<ModelSpec>,
}

/// Registry of supported models
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    models: Vec<ModelSpec>,
    default_id: String,
}

impl ModelRegistry {
    /// Create a registry from the built-in catalog
    pub fn new() -> Self {
        let catalog: Catalog = serde_yaml::from_str(include_str!("models.yaml"))
            .expect("Failed to parse built-in model catalog");
        Self {
            models: catalog.models,
            default_id: catalog.default,
        }
    }

    /// All model specs, including internal ones
    pub fn all(&self) -> &[ModelSpec] {
        &self.models
    }

    /// Models offered in pickers, in catalog order
    pub fn selectable(&self) -> impl Iterator<Item = &ModelSpec> {
        self.models.iter().filter(|spec| spec.selectable)
    }

    /// Picker labels, in catalog order
    pub fn labels(&self) -> Vec<String> {
        self.selectable().map(ModelSpec::label).collect()
    }

    /// The default model id
    pub fn default_id(&self) -> &str {
        &self.default_id
    }

    /// Whether `id` is a model the service accepts
    pub fn is_supported(&self, id: &str) -> bool {
        self.find_by_id(id).is_some()
    }

    /// Fail with `UnsupportedModel` unless `id` is in the catalog
    pub fn ensure_supported(&self, id: &str) -> ProviderResult<()> {
        if self.is_supported(id) {
            Ok(())
        } else {
            Err(ProviderError::UnsupportedModel(id.to_string()))
        }
    }

    /// Find a model by canonical id
    pub fn find_by_id(&self, id: &str) -> Option<&ModelSpec> {
        self.models.iter().find(|spec| spec.id == id)
    }

    /// Find a model by picker label or bare id (surrounding whitespace ignored)
    pub fn find_by_label(&self, label: &str) -> Option<&ModelSpec> {
        let label = label.trim();
        self.models
            .iter()
            .find(|spec| spec.label() == label || spec.id == label)
    }

    /// Map a picker label (or bare id) to its backend id.
    /// Unknown or empty labels resolve to the default model.
    pub fn model_id_for(&self, label: &str) -> &str {
        self.find_by_label(label)
            .map(|spec| spec.id.as_str())
            .unwrap_or(&self.default_id)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
