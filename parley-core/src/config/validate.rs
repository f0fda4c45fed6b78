//! Configuration validation rules.

use super::schema::Config;

/// Validate configuration and return aggregated validation errors.
pub fn validate_config(config: &Config) -> crate::Result<()> {
    let mut errors = Vec::new();

    if config.service.api_base.trim().is_empty() {
        errors.push("service.api_base must not be empty".to_string());
    }
    if !config.service.complete_path.starts_with('/') {
        errors.push("service.complete_path must start with '/'".to_string());
    }
    if config.service.timeout_secs == 0 {
        errors.push("service.timeout_secs must be > 0".to_string());
    }

    if config.chat.model.trim().is_empty() {
        errors.push("chat.model must not be empty".to_string());
    }
    if config.chat.seed_greeting && config.chat.greeting.trim().is_empty() {
        errors.push("chat.greeting is required when chat.seed_greeting is set".to_string());
    }

    if config.summary.model.trim().is_empty() {
        errors.push("summary.model must not be empty".to_string());
    }
    if config.summary.every == 0 {
        errors.push("summary.every must be > 0".to_string());
    } else if config.chat.seed_greeting && config.summary.every % 2 == 0 {
        // Seeded logs only reach odd lengths after a reply
        errors.push(
            "summary.every must be odd when chat.seed_greeting is set".to_string(),
        );
    }
    if config.summary.window == 0 {
        errors.push("summary.window must be > 0".to_string());
    }
    if let Some(template) = &config.summary.template {
        if !template.contains("{content}") {
            errors.push("summary.template must contain {content}".to_string());
        }
    }

    for (name, prompt) in &config.modes {
        if name.trim().is_empty() {
            errors.push("modes must not contain an empty mode name".to_string());
        } else if prompt.trim().is_empty() {
            errors.push(format!("modes.{} must have a non-empty prompt", name));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(crate::Error::Validation(errors.join("; ")))
    }
}
