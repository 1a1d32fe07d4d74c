//! Provider selection and per-backend request settings.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which backend a new session starts with.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSelection {
    /// Backend identifier (`anthropic`, `openai`, `deepseek`).
    pub default: String,
}

impl Default for ProviderSelection {
    fn default() -> Self {
        Self {
            default: "anthropic".into(),
        }
    }
}

/// Settings for one backend, read from `[providers.<id>]`.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Inline credential. Prefer `api_key_env` so keys stay out of the file.
    pub api_key: Option<String>,
    /// Environment variable holding the credential.
    pub api_key_env: Option<String>,
    /// Model override; each backend has its own default.
    pub model: Option<String>,
    /// Maximum output tokens (valid range: 1-200000).
    pub max_tokens: u32,
    /// Sampling temperature (valid range: 0.0-2.0).
    pub temperature: f64,
    /// Alternate API endpoint, e.g. a proxy or self-hosted gateway.
    pub base_url: Option<String>,
    /// Whole-request deadline in seconds (valid range: 1-600).
    pub timeout_secs: u64,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: None,
            model: None,
            max_tokens: 4096,
            temperature: 0.7,
            base_url: None,
            timeout_secs: 120,
        }
    }
}

impl fmt::Debug for ProviderSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_env", &self.api_key_env)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_redacts_inline_key() {
        let settings = ProviderSettings {
            api_key: Some("sk-secret-value".into()),
            ..Default::default()
        };
        let debug = format!("{settings:?}");
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("sk-secret-value"));
    }
}
