//! Quill configuration system.
//!
//! TOML-based configuration for backend selection, per-provider limits,
//! the session's system prompt, and logging. All sections use serde
//! defaults so a partial (or empty) file works out of the box.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use quill_config::{load_config, resolve_credential};
//!
//! let config = load_config().expect("failed to load config");
//! let id = &config.provider.default;
//! let settings = config.provider_settings(id);
//! let key = resolve_credential(id, &settings);
//! println!("{id}: credential present = {}", key.is_some());
//! ```

pub mod credentials;
pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use credentials::{default_env_var, resolve_credential, resolve_credential_with};
pub use schema::{LoggingConfig, ProviderSelection, ProviderSettings, QuillConfig, SessionConfig};

use quill_common::ConfigError;

/// Load config from the platform default path and validate it.
///
/// Creates a documented default file if none exists.
pub fn load_config() -> Result<QuillConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}
