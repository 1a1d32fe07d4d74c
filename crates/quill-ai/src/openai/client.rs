//! OpenAI-compatible client struct, request building, and response parsing.

use async_stream::try_stream;
use futures_util::{Stream, StreamExt};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::ProviderConfig;
use crate::error::{BackendError, BackendErrorKind};
use crate::http::{build_client, error_detail, join_url};
use crate::streaming::{byte_lines, StreamStep};
use crate::{AiError, Message, ModelResponse, TokenUsage};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Client for one chat-completions-compatible backend.
pub struct OpenAiClient {
    pub(crate) provider: String,
    pub(crate) default_model: String,
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) config: ProviderConfig,
    pub(crate) http: reqwest::Client,
}

impl OpenAiClient {
    /// Client for api.openai.com.
    pub fn new(config: ProviderConfig) -> Result<Self, AiError> {
        Self::compatible("openai", OPENAI_DEFAULT_MODEL, OPENAI_BASE_URL, config)
    }

    /// Client for another backend with the same wire shape.
    ///
    /// `default_model` and `default_base_url` apply when the config does
    /// not override them.
    pub fn compatible(
        provider: impl Into<String>,
        default_model: impl Into<String>,
        default_base_url: &str,
        config: ProviderConfig,
    ) -> Result<Self, AiError> {
        let provider = provider.into();
        let default_model = default_model.into();
        let http = build_client(&provider, config.timeout)?;
        let model = config.model.clone().unwrap_or_else(|| default_model.clone());
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url.to_string());

        Ok(Self {
            provider,
            default_model,
            model,
            base_url,
            config,
            http,
        })
    }

    pub(crate) fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Build the chat-completions request body.
    pub(crate) fn build_request_body(
        &self,
        history: &[Message],
        system_instruction: Option<&str>,
        stream: bool,
    ) -> Value {
        let mut messages = Vec::with_capacity(history.len() + 1);
        if let Some(system) = system_instruction {
            messages.push(json!({ "role": "system", "content": system }));
        }
        messages.extend(history.iter().map(|msg| {
            json!({
                "role": msg.role.as_str(),
                "content": msg.content,
            })
        }));

        json!({
            "model": self.model,
            "messages": messages,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "stream": stream,
        })
    }

    /// Normalize a non-streaming response.
    pub(crate) fn parse_response(
        &self,
        response: ChatCompletionResponse,
    ) -> Result<ModelResponse, BackendError> {
        let choice = response.choices.into_iter().next().ok_or_else(|| {
            BackendError::new(
                &self.provider,
                BackendErrorKind::Parse,
                "response contained no choices",
            )
        })?;

        Ok(ModelResponse {
            content: choice.message.content.unwrap_or_default(),
            model: response.model.unwrap_or_else(|| self.model.clone()),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
        })
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    pub(crate) choices: Vec<Choice>,
    #[serde(default)]
    pub(crate) model: Option<String>,
    #[serde(default)]
    pub(crate) usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub(crate) message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub(crate) content: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Usage {
    #[serde(default)]
    pub(crate) prompt_tokens: u64,
    #[serde(default)]
    pub(crate) completion_tokens: u64,
    #[serde(default)]
    pub(crate) total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct StreamChunk {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    error: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

/// Map one complete SSE line to its contribution.
///
/// Blank lines, comments, and chunks without a content delta (role-only,
/// usage-only) are skipped. A chunk that fails to parse is logged and
/// skipped. An explicit `error` object aborts the stream.
pub(crate) fn interpret_line(provider: &str, line: &str) -> Result<StreamStep, BackendError> {
    let line = line.trim();
    let Some(payload) = line.strip_prefix("data:") else {
        return Ok(StreamStep::Skip);
    };
    let payload = payload.trim_start();

    if payload == "[DONE]" {
        return Ok(StreamStep::Done);
    }

    let chunk: StreamChunk = match serde_json::from_str(payload) {
        Ok(chunk) => chunk,
        Err(e) => {
            warn!(provider = %provider, error = %e, data = %payload, "skipping malformed stream chunk");
            return Ok(StreamStep::Skip);
        }
    };

    if let Some(error) = chunk.error {
        let message = error_detail(&json!({ "error": error }).to_string())
            .unwrap_or_else(|| "stream reported an error".to_string());
        return Err(BackendError::new(
            provider,
            BackendErrorKind::Stream,
            message,
        ));
    }

    match chunk.choices.into_iter().next().and_then(|c| c.delta.content) {
        Some(text) if !text.is_empty() => Ok(StreamStep::Fragment(text)),
        _ => Ok(StreamStep::Skip),
    }
}

/// Decode a chat-completions byte stream into content fragments.
pub(crate) fn decode_stream<S, B>(
    provider: String,
    bytes: S,
) -> impl Stream<Item = Result<String, AiError>> + Send
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send,
    B: AsRef<[u8]> + Send,
{
    try_stream! {
        let lines = byte_lines(provider.clone(), bytes);
        futures_util::pin_mut!(lines);

        while let Some(line) = lines.next().await {
            let line = line.map_err(AiError::from)?;
            match interpret_line(&provider, &line).map_err(AiError::from)? {
                StreamStep::Fragment(text) => {
                    yield text;
                }
                StreamStep::Skip => {}
                StreamStep::Done => break,
            }
        }
    }
}
