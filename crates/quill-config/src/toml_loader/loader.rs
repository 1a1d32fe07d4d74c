//! Reading a config file into [`QuillConfig`].

use std::path::Path;

use quill_common::ConfigError;
use tracing::{info, warn};

use super::paths::{create_default_config, default_config_path, io_failure};
use crate::schema::QuillConfig;
use crate::validation;

/// Parse the file at `path`.
///
/// Unset keys fall back to their defaults. Out-of-range values are kept and
/// reported with `warn!`; run [`validation::validate`] for a hard check.
pub fn load_from_path(path: &Path) -> Result<QuillConfig, ConfigError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(io_failure("read", path, e)),
    };

    let config = parse(&text, path)?;
    info!(path = %path.display(), provider = %config.provider.default, "config loaded");
    Ok(config)
}

/// Load from [`default_config_path`], writing the template on first run.
pub fn load_default() -> Result<QuillConfig, ConfigError> {
    let path = default_config_path()?;
    match load_from_path(&path) {
        Err(ConfigError::FileNotFound(_)) => {
            create_default_config(&path)?;
            Ok(QuillConfig::default())
        }
        other => other,
    }
}

fn parse(text: &str, origin: &Path) -> Result<QuillConfig, ConfigError> {
    let config: QuillConfig = toml::from_str(text)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", origin.display())))?;

    if let Err(e) = validation::validate(&config) {
        warn!(path = %origin.display(), "keeping config despite problems: {e}");
    }
    Ok(config)
}
