//! Adapter configuration and its read-only snapshot.

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Settings an adapter is constructed with. Immutable afterwards.
#[derive(Clone)]
pub struct ProviderConfig {
    pub credential: String,
    /// Overrides the backend's default model.
    pub model: Option<String>,
    pub max_tokens: u32,
    pub temperature: f64,
    /// Alternate endpoint root (proxy, gateway, self-hosted).
    pub base_url: Option<String>,
    /// Deadline for a whole non-streaming call, and the longest a stream
    /// may go without receiving bytes.
    pub timeout: Duration,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("credential", &"[REDACTED]")
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ProviderConfig {
    pub fn new(credential: impl Into<String>) -> Self {
        Self {
            credential: credential.into(),
            model: None,
            max_tokens: 4096,
            temperature: 0.7,
            base_url: None,
            timeout: Duration::from_secs(120),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// What `ChatProvider::config` reports for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProviderSnapshot {
    pub provider: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl fmt::Display for ProviderSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} / {} (max_tokens {}, temperature {})",
            self.provider, self.model, self.max_tokens, self.temperature
        )
    }
}
