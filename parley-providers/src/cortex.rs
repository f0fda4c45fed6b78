//! HTTP client for the hosted completion service

use async_trait::async_trait;
use parley_core::config::ServiceConfig;
use parley_core::utils::truncate;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

use crate::base::{CompletionProvider, ProviderError, ProviderResult};
use crate::registry::ModelRegistry;

/// Completion request body
#[derive(Debug, Serialize)]
struct CompleteRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

/// Completion service client
pub struct CortexClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    extra_headers: HashMap<String, String>,
    default_model: String,
    registry: ModelRegistry,
}

impl CortexClient {
    /// Create a new client.
    ///
    /// Fails only if the HTTP client cannot be built, which callers treat as
    /// a fatal bootstrap error.
    pub fn new(
        api_base: &str,
        complete_path: &str,
        api_key: Option<String>,
        timeout: Duration,
        default_model: String,
    ) -> ProviderResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ProviderError::ConfigError(e.to_string()))?;

        let endpoint = format!("{}{}", api_base.trim_end_matches('/'), complete_path);
        let api_key = api_key.filter(|key| !key.trim().is_empty());

        Ok(Self {
            client,
            endpoint,
            api_key,
            extra_headers: HashMap::new(),
            default_model,
            registry: ModelRegistry::new(),
        })
    }

    /// Create a client from the `service` configuration section
    pub fn from_config(service: &ServiceConfig, default_model: String) -> ProviderResult<Self> {
        let mut client = Self::new(
            &service.api_base,
            &service.complete_path,
            Some(service.api_key.clone()),
            Duration::from_secs(service.timeout_secs),
            default_model,
        )?;
        client.extra_headers = service.extra_headers.clone();
        Ok(client)
    }

    /// Endpoint requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn apply_headers(&self, mut req_builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        if let Some(api_key) = &self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        for (key, value) in &self.extra_headers {
            req_builder = req_builder.header(key, value);
        }

        req_builder
    }

    fn validate(&self, prompt: &str, model: &str) -> ProviderResult<()> {
        if prompt.trim().is_empty() {
            return Err(ProviderError::InvalidRequest("prompt is empty".to_string()));
        }
        if !self.registry.is_supported(model) {
            return Err(ProviderError::UnsupportedModel(model.to_string()));
        }
        Ok(())
    }
}

/// Pull the message text out of a completion body.
///
/// Accepts `{"choices":[{"messages": ...}]}` or `{"choices":[{"message": ...}]}`
/// where the message is a string or an object with `content`, and a bare
/// JSON string. Anything else is malformed.
pub fn extract_text(raw: &str) -> ProviderResult<String> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| ProviderError::MalformedResponse(format!("not JSON: {}", e)))?;

    match value {
        Value::String(text) => Ok(text),
        Value::Object(map) => {
            let choice = map
                .get("choices")
                .and_then(Value::as_array)
                .and_then(|choices| choices.first())
                .ok_or_else(|| {
                    ProviderError::MalformedResponse("no choices in response".to_string())
                })?;

            let message = choice
                .get("messages")
                .or_else(|| choice.get("message"))
                .ok_or_else(|| {
                    ProviderError::MalformedResponse("choice has no message".to_string())
                })?;

            match message {
                Value::String(text) => Ok(text.clone()),
                Value::Object(inner) => inner
                    .get("content")
                    .and_then(Value::as_str)
                    .map(ToString::to_string)
                    .ok_or_else(|| {
                        ProviderError::MalformedResponse("message has no content".to_string())
                    }),
                other => Err(ProviderError::MalformedResponse(format!(
                    "unexpected message type: {}",
                    other
                ))),
            }
        }
        other => Err(ProviderError::MalformedResponse(format!(
            "unexpected body: {}",
            truncate(&other.to_string(), 80)
        ))),
    }
}

/// [`extract_text`], falling back to the raw body when the shape is unexpected
pub fn extract_or_raw(raw: &str) -> String {
    match extract_text(raw) {
        Ok(text) => text,
        Err(e) => {
            warn!("Using raw completion body: {}", e);
            raw.to_string()
        }
    }
}

#[async_trait]
impl CompletionProvider for CortexClient {
    async fn complete(&self, prompt: &str, model: &str) -> ProviderResult<String> {
        self.validate(prompt, model)?;

        debug!(
            "Sending completion request to {} with model {} ({} chars)",
            self.endpoint,
            model,
            prompt.len()
        );

        let request = CompleteRequest { model, prompt };
        let req_builder = self.apply_headers(self.client.post(&self.endpoint).json(&request));
        let response = req_builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ProviderError::from_status(status, &error_text));
        }

        let body = response.text().await?;
        Ok(extract_or_raw(&body))
    }

    fn default_model(&self) -> String {
        self.default_model.clone()
    }
}
