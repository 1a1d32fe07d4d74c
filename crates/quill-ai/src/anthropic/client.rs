//! Anthropic client struct, request building, and response parsing.

use serde::Deserialize;
use serde_json::{json, Value};
use tracing::warn;

use crate::config::ProviderConfig;
use crate::error::{BackendError, BackendErrorKind};
use crate::http::{build_client, join_url};
use crate::streaming::{SseEvent, StreamStep};
use crate::{AiError, Message, ModelResponse, Role, TokenUsage};

pub const PROVIDER_NAME: &str = "anthropic";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";
pub(crate) const ANTHROPIC_VERSION: &str = "2023-06-01";

/// How the client authenticates with the Anthropic API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Console API key, sent as `x-api-key`.
    ApiKey,
    /// OAuth access token, sent as `Authorization: Bearer`.
    OAuth,
}

impl AuthMethod {
    /// OAuth access tokens carry the `sk-ant-oat` prefix; everything else
    /// is treated as an API key.
    pub fn detect(credential: &str) -> Self {
        if credential.starts_with("sk-ant-oat") {
            AuthMethod::OAuth
        } else {
            AuthMethod::ApiKey
        }
    }
}

/// Anthropic API client.
pub struct AnthropicClient {
    pub(crate) config: ProviderConfig,
    pub(crate) model: String,
    pub(crate) base_url: String,
    pub(crate) auth_method: AuthMethod,
    pub(crate) http: reqwest::Client,
}

impl AnthropicClient {
    pub fn new(config: ProviderConfig) -> Result<Self, AiError> {
        let http = build_client(PROVIDER_NAME, config.timeout)?;
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let auth_method = AuthMethod::detect(&config.credential);

        Ok(Self {
            config,
            model,
            base_url,
            auth_method,
            http,
        })
    }

    pub fn auth_method(&self) -> AuthMethod {
        self.auth_method
    }

    pub(crate) fn url(&self, path: &str) -> String {
        join_url(&self.base_url, path)
    }

    /// Attach auth and version headers for the configured auth method.
    pub(crate) fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = match self.auth_method {
            AuthMethod::ApiKey => request.header("x-api-key", &self.config.credential),
            AuthMethod::OAuth => request.bearer_auth(&self.config.credential),
        };
        request.header("anthropic-version", ANTHROPIC_VERSION)
    }

    /// Build the JSON request body for the Messages API.
    pub(crate) fn build_request_body(
        &self,
        history: &[Message],
        system_instruction: Option<&str>,
        stream: bool,
    ) -> Value {
        let messages: Vec<Value> = history
            .iter()
            .filter(|msg| msg.role != Role::System)
            .map(|msg| {
                json!({
                    "role": msg.role.as_str(),
                    "content": msg.content,
                })
            })
            .collect();

        let mut body = json!({
            "model": self.model,
            "max_tokens": self.config.max_tokens,
            "temperature": self.config.temperature,
            "messages": messages,
            "stream": stream,
        });

        if let Some(system) = system_instruction {
            body["system"] = json!(system);
        }

        body
    }

    /// Normalize a non-streaming response.
    pub(crate) fn parse_response(&self, response: MessagesResponse) -> ModelResponse {
        let content = response
            .content
            .iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text.as_deref())
            .collect::<Vec<_>>()
            .join("\n");

        ModelResponse {
            content,
            model: response.model.unwrap_or_else(|| self.model.clone()),
            usage: response
                .usage
                .map(|u| TokenUsage::from_counts(u.input_tokens, u.output_tokens)),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct MessagesResponse {
    pub(crate) content: Vec<ContentBlock>,
    #[serde(default)]
    pub(crate) model: Option<String>,
    #[serde(default)]
    pub(crate) usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ContentBlock {
    #[serde(rename = "type")]
    pub(crate) kind: String,
    #[serde(default)]
    pub(crate) text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Usage {
    #[serde(default)]
    pub(crate) input_tokens: u64,
    #[serde(default)]
    pub(crate) output_tokens: u64,
}

/// Map one typed stream event to its contribution.
///
/// Only `text_delta`s inside `content_block_delta` produce text. An
/// `error` event aborts the stream; unparseable payloads are skipped.
pub(crate) fn interpret_event(event: &SseEvent) -> Result<StreamStep, BackendError> {
    let data: Value = match serde_json::from_str(&event.data) {
        Ok(data) => data,
        Err(e) => {
            warn!(provider = PROVIDER_NAME, error = %e, data = %event.data, "skipping malformed stream event");
            return Ok(StreamStep::Skip);
        }
    };

    // The event name is repeated as `type` in the payload.
    let event_type = event
        .event
        .as_deref()
        .or_else(|| data["type"].as_str())
        .unwrap_or("");

    match event_type {
        "content_block_delta" if data["delta"]["type"] == "text_delta" => {
            match data["delta"]["text"].as_str() {
                Some(text) if !text.is_empty() => Ok(StreamStep::Fragment(text.to_string())),
                _ => Ok(StreamStep::Skip),
            }
        }
        "message_stop" => Ok(StreamStep::Done),
        "error" => {
            let message = data["error"]["message"]
                .as_str()
                .unwrap_or("stream reported an error")
                .to_string();
            Err(BackendError::new(
                PROVIDER_NAME,
                BackendErrorKind::Stream,
                message,
            ))
        }
        _ => Ok(StreamStep::Skip),
    }
}
