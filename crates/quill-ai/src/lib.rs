//! Provider layer for Quill.
//!
//! Normalizes chat requests across LLM backends:
//! - A single [`ChatProvider`] contract for blocking and streaming chat
//! - Transport adapters for the Anthropic Messages API and for
//!   OpenAI-compatible chat completions (OpenAI, DeepSeek)
//! - Incremental SSE decoding with partial-line buffering
//! - A [`ProviderSelector`] mapping identifiers to configured adapters
//! - Conversation [`Session`]s that own history and token accounting

pub mod anthropic;
pub mod config;
pub mod error;
mod http;
pub mod openai;
pub mod selector;
pub mod session;
pub mod streaming;
pub mod token_tracker;

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use serde::{Deserialize, Serialize};

pub use anthropic::AnthropicClient;
pub use config::{ProviderConfig, ProviderSnapshot};
pub use error::{AiError, BackendError, BackendErrorKind};
pub use openai::OpenAiClient;
pub use selector::{ProviderCatalog, ProviderKind, ProviderMetadata, ProviderSelector};
pub use session::Session;
pub use streaming::stream_from_chat;
pub use token_tracker::TokenTracker;

/// Incremental response text. Finite, not restartable; dropping it
/// releases the underlying connection.
pub type FragmentStream<'a> = BoxStream<'a, Result<String, AiError>>;

/// Capability contract every transport adapter satisfies.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Backend identifier, e.g. `anthropic`.
    fn name(&self) -> &str;

    /// The backend's built-in model, used when the config names none.
    fn default_model(&self) -> &str;

    /// Read-only view of the effective request settings.
    fn config(&self) -> ProviderSnapshot;

    /// Send the conversation and wait for the complete response.
    async fn chat(
        &self,
        history: &[Message],
        system_instruction: Option<&str>,
    ) -> Result<ModelResponse, AiError>;

    /// Stream the response as text fragments.
    ///
    /// Nothing is sent until the stream is first polled. Backends without
    /// incremental transport keep this default, which yields the whole
    /// `chat` content as one fragment.
    fn stream_chat<'a>(
        &'a self,
        history: &'a [Message],
        system_instruction: Option<&'a str>,
    ) -> FragmentStream<'a> {
        stream_from_chat(self.chat(history, system_instruction))
    }

    /// Issue a minimal authenticated request, reporting why it failed.
    async fn check_credential(&self) -> Result<(), AiError>;

    /// `true` when the credential was accepted. Auth failures and
    /// unreachable backends both report `false`.
    async fn validate_credential(&self) -> bool {
        match self.check_credential().await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(provider = %self.name(), error = %e, "credential check failed");
                false
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
        }
    }
}

/// Normalized result of a non-streaming call.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelResponse {
    pub content: String,
    /// Model that actually served the request; may differ from the one asked for.
    pub model: String,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
    pub total_tokens: u64,
}

impl TokenUsage {
    /// Usage from separate counters, total derived as their sum.
    pub fn from_counts(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            prompt_tokens,
            completion_tokens,
            total_tokens: prompt_tokens.saturating_add(completion_tokens),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_serializes_lowercase() {
        let json = serde_json::to_string(&Message::assistant("hi")).unwrap();
        assert_eq!(json, r#"{"role":"assistant","content":"hi"}"#);
    }

    #[test]
    fn usage_from_counts_sums_total() {
        let usage = TokenUsage::from_counts(12, 30);
        assert_eq!(usage.total_tokens, 42);
        assert_eq!(TokenUsage::from_counts(u64::MAX, 1).total_tokens, u64::MAX);
    }
}
