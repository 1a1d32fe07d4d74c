//! Turning config sections into live backend adapters.

use std::sync::Arc;
use std::time::Duration;

use quill_ai::{ChatProvider, ProviderConfig, ProviderSelector};
use quill_common::{QuillError, Result};
use quill_config::{default_env_var, resolve_credential_with, ProviderSettings, QuillConfig};

/// Build the adapter for `id` from its `[providers.<id>]` section.
///
/// `model_override` wins over the configured model.
pub fn build_provider(
    selector: &ProviderSelector,
    config: &QuillConfig,
    id: &str,
    model_override: Option<&str>,
) -> Result<Arc<dyn ChatProvider>> {
    build_provider_with(selector, config, id, model_override, |name| {
        std::env::var(name).ok()
    })
}

pub(crate) fn build_provider_with(
    selector: &ProviderSelector,
    config: &QuillConfig,
    id: &str,
    model_override: Option<&str>,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<Arc<dyn ChatProvider>> {
    let id = id.trim().to_ascii_lowercase();
    if !selector.is_supported(&id) {
        let known: Vec<_> = selector.supported_identifiers().into_iter().collect();
        return Err(QuillError::Other(format!(
            "unsupported provider '{id}' (expected one of: {})",
            known.join(", ")
        )));
    }

    let settings = config.provider_settings(&id);
    let credential = resolve_credential_with(&id, &settings, lookup).ok_or_else(|| {
        let env = settings
            .api_key_env
            .clone()
            .unwrap_or_else(|| default_env_var(&id));
        QuillError::Other(format!(
            "no credential for {id}: set {env} or providers.{id}.api_key"
        ))
    })?;

    let provider_config = provider_config(credential, &settings, model_override);
    selector
        .create(&id, provider_config)
        .map_err(|e| QuillError::Ai(e.to_string()))
}

fn provider_config(
    credential: String,
    settings: &ProviderSettings,
    model_override: Option<&str>,
) -> ProviderConfig {
    let mut config = ProviderConfig::new(credential)
        .with_max_tokens(settings.max_tokens)
        .with_temperature(settings.temperature)
        .with_timeout(Duration::from_secs(settings.timeout_secs));

    if let Some(model) = model_override.or(settings.model.as_deref()) {
        config = config.with_model(model);
    }
    if let Some(base_url) = &settings.base_url {
        config = config.with_base_url(base_url.clone());
    }
    config
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(id: &str, settings: ProviderSettings) -> QuillConfig {
        let mut config = QuillConfig::default();
        config.providers.insert(id.to_string(), settings);
        config
    }

    #[test]
    fn settings_flow_into_provider() {
        let config = config_with(
            "openai",
            ProviderSettings {
                api_key: Some("sk-inline".into()),
                model: Some("gpt-4o".into()),
                max_tokens: 256,
                temperature: 0.1,
                ..ProviderSettings::default()
            },
        );

        let provider =
            build_provider_with(&ProviderSelector::new(), &config, "openai", None, |_| None)
                .unwrap();
        let snapshot = provider.config();
        assert_eq!(snapshot.provider, "openai");
        assert_eq!(snapshot.model, "gpt-4o");
        assert_eq!(snapshot.max_tokens, 256);
        assert_eq!(snapshot.temperature, 0.1);
    }

    #[test]
    fn cli_model_wins_over_config() {
        let config = config_with(
            "deepseek",
            ProviderSettings {
                model: Some("deepseek-chat".into()),
                ..ProviderSettings::default()
            },
        );
        let provider = build_provider_with(
            &ProviderSelector::new(),
            &config,
            "DeepSeek",
            Some("deepseek-reasoner"),
            |name| (name == "DEEPSEEK_API_KEY").then(|| "sk-env".to_string()),
        )
        .unwrap();
        assert_eq!(provider.name(), "deepseek");
        assert_eq!(provider.config().model, "deepseek-reasoner");
    }

    #[test]
    fn missing_credential_names_env_var() {
        let err = build_provider_with(
            &ProviderSelector::new(),
            &QuillConfig::default(),
            "anthropic",
            None,
            |_| None,
        )
        .err()
        .unwrap();
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }

    #[test]
    fn unknown_provider_lists_supported() {
        let err = build_provider_with(
            &ProviderSelector::new(),
            &QuillConfig::default(),
            "made-up-backend",
            None,
            |_| Some("k".into()),
        )
        .err()
        .unwrap();
        let message = err.to_string();
        assert!(message.contains("made-up-backend"));
        assert!(message.contains("anthropic, deepseek, openai"));
    }
}
