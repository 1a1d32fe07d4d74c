//! Configuration schema types for Quill.
//!
//! All structs use `serde(default)` so partial configs work correctly.

mod logging;
mod provider;
mod session;

pub use logging::*;
pub use provider::*;
pub use session::*;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct QuillConfig {
    pub provider: ProviderSelection,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
    /// Per-backend settings keyed by provider identifier.
    pub providers: BTreeMap<String, ProviderSettings>,
}

impl QuillConfig {
    /// Settings for `id`, falling back to defaults when the file has no
    /// `[providers.<id>]` table.
    pub fn provider_settings(&self, id: &str) -> ProviderSettings {
        self.providers.get(id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let config: QuillConfig = toml::from_str("").unwrap();
        assert_eq!(config.provider.default, "anthropic");
        assert_eq!(config.logging.level, "quill=info");
        assert!(config.providers.is_empty());
        assert!(!config.session.system_prompt.is_empty());
    }

    #[test]
    fn partial_provider_table_keeps_other_defaults() {
        let config: QuillConfig = toml::from_str(
            r#"
[providers.openai]
model = "gpt-4o"
"#,
        )
        .unwrap();
        let openai = config.provider_settings("openai");
        assert_eq!(openai.model.as_deref(), Some("gpt-4o"));
        assert_eq!(openai.max_tokens, 4096);
        assert!((openai.temperature - 0.7).abs() < f64::EPSILON);
        assert_eq!(openai.timeout_secs, 120);
    }

    #[test]
    fn unknown_provider_settings_fall_back_to_default() {
        let config = QuillConfig::default();
        let settings = config.provider_settings("deepseek");
        assert!(settings.model.is_none());
        assert!(settings.base_url.is_none());
    }
}
