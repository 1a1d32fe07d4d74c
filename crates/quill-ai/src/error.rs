//! Error taxonomy for provider calls.

use std::fmt;

#[derive(Debug, Clone, thiserror::Error)]
pub enum AiError {
    /// The identifier is not in the selector's closed set.
    #[error("unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl AiError {
    pub fn backend(&self) -> Option<&BackendError> {
        match self {
            AiError::Backend(e) => Some(e),
            AiError::UnsupportedProvider(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendErrorKind {
    /// Non-success HTTP status.
    Status,
    /// HTTP 429.
    RateLimited,
    Network,
    Timeout,
    /// Response body did not have the expected shape.
    Parse,
    /// The backend reported an error mid-stream.
    Stream,
}

impl fmt::Display for BackendErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BackendErrorKind::Status => "API error",
            BackendErrorKind::RateLimited => "rate limited",
            BackendErrorKind::Network => "network error",
            BackendErrorKind::Timeout => "timeout",
            BackendErrorKind::Parse => "parse error",
            BackendErrorKind::Stream => "stream error",
        };
        f.write_str(label)
    }
}

/// Any failure of a remote call, tagged with the backend that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendError {
    pub provider: String,
    pub kind: BackendErrorKind,
    pub status: Option<u16>,
    pub message: String,
}

impl BackendError {
    pub fn new(
        provider: impl Into<String>,
        kind: BackendErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            provider: provider.into(),
            kind,
            status: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub(crate) fn from_reqwest(provider: &str, err: reqwest::Error) -> Self {
        let kind = if err.is_timeout() {
            BackendErrorKind::Timeout
        } else if err.is_decode() {
            BackendErrorKind::Parse
        } else {
            BackendErrorKind::Network
        };
        let status = err.status().map(|s| s.as_u16());
        Self {
            provider: provider.to_string(),
            kind,
            status,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for BackendError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.provider, self.kind)?;
        if let Some(status) = self.status {
            write!(f, " (HTTP {status})")?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for BackendError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_status_and_message() {
        let err = BackendError::new("anthropic", BackendErrorKind::Status, "invalid x-api-key")
            .with_status(401);
        assert_eq!(
            err.to_string(),
            "anthropic API error (HTTP 401): invalid x-api-key"
        );
    }

    #[test]
    fn display_without_detail() {
        let err = BackendError::new("openai", BackendErrorKind::Status, "").with_status(502);
        assert_eq!(err.to_string(), "openai API error (HTTP 502)");
    }

    #[test]
    fn ai_error_wraps_backend_transparently() {
        let inner = BackendError::new("deepseek", BackendErrorKind::Timeout, "deadline elapsed");
        let err: AiError = inner.clone().into();
        assert_eq!(err.to_string(), inner.to_string());
        assert_eq!(err.backend(), Some(&inner));
    }

    #[test]
    fn unsupported_provider_display() {
        let err = AiError::UnsupportedProvider("made-up-backend".into());
        assert_eq!(err.to_string(), "unsupported provider: made-up-backend");
        assert!(err.backend().is_none());
    }
}
