//! Configuration validation.
//!
//! Checks numeric ranges for every provider table and that a default
//! backend is named. All problems are collected into one error.

use crate::schema::{ProviderSettings, QuillConfig};
use quill_common::ConfigError;

/// Run all validations on a config, collecting all errors.
pub fn validate(config: &QuillConfig) -> Result<(), ConfigError> {
    let mut errors: Vec<String> = Vec::new();

    if config.provider.default.trim().is_empty() {
        errors.push("provider.default must name a backend".into());
    }

    for (id, settings) in &config.providers {
        validate_provider(&mut errors, id, settings);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationError(errors.join("; ")))
    }
}

fn validate_provider(errors: &mut Vec<String>, id: &str, settings: &ProviderSettings) {
    validate_range(
        errors,
        &format!("providers.{id}.max_tokens"),
        u64::from(settings.max_tokens),
        1,
        200_000,
    );
    validate_range(
        errors,
        &format!("providers.{id}.timeout_secs"),
        settings.timeout_secs,
        1,
        600,
    );
    validate_range_f64(
        errors,
        &format!("providers.{id}.temperature"),
        settings.temperature,
        0.0,
        2.0,
    );

    if let Some(url) = &settings.base_url {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            errors.push(format!(
                "providers.{id}.base_url = {url:?} must start with http:// or https://"
            ));
        }
    }
}

/// Push an error if `value` is outside `[min, max]` (integer).
fn validate_range(errors: &mut Vec<String>, name: &str, value: u64, min: u64, max: u64) {
    if value < min || value > max {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}

/// Push an error if `value` is outside `[min, max]` (float).
fn validate_range_f64(errors: &mut Vec<String>, name: &str, value: f64, min: f64, max: f64) {
    if !(min..=max).contains(&value) {
        errors.push(format!("{name} = {value} is out of range [{min}, {max}]"));
    }
}
