use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Top-level error for the `quill` binary.
#[derive(Debug, thiserror::Error)]
pub enum QuillError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("ai error: {0}")]
    Ai(String),

    #[error("{0}")]
    Other(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("providers.openai.temperature out of range".into());
        assert_eq!(
            err.to_string(),
            "config validation error: providers.openai.temperature out of range"
        );
    }

    #[test]
    fn quill_error_from_config() {
        let err: QuillError = ConfigError::ParseError("bad toml".into()).into();
        assert!(matches!(err, QuillError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn quill_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "stdout closed");
        let err: QuillError = io_err.into();
        assert!(matches!(err, QuillError::Io(_)));
        assert!(err.to_string().contains("stdout closed"));
    }

    #[test]
    fn quill_error_other_variants() {
        assert_eq!(
            QuillError::Ai("anthropic request failed".into()).to_string(),
            "ai error: anthropic request failed"
        );
        assert_eq!(QuillError::Other("no input".into()).to_string(), "no input");
    }
}
