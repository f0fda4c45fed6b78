//! Completion and summarization clients for parley
//!
//! This crate provides the provider traits, the HTTP client for the hosted
//! completion service, the summarizer built on top of it, and the catalog of
//! supported models.

pub mod base;
pub mod cortex;
pub mod registry;
pub mod summarize;

pub use base::{
    render_window, CompletionProvider, ProviderError, ProviderResult, SummarizationProvider,
};
pub use cortex::CortexClient;
pub use registry::{ModelRegistry, ModelSpec};
pub use summarize::Summarizer;
