//! ChatProvider implementation for AnthropicClient (chat + streaming).

use async_stream::try_stream;
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tracing::debug;

use crate::error::BackendError;
use crate::http::{ensure_success, read_json};
use crate::streaming::{sse_events, StreamStep};
use crate::{AiError, ChatProvider, FragmentStream, Message, ModelResponse, ProviderSnapshot};

use super::client::{interpret_event, AnthropicClient, MessagesResponse, DEFAULT_MODEL, PROVIDER_NAME};

impl AnthropicClient {
    fn messages_request(&self, body: &Value) -> reqwest::RequestBuilder {
        self.authorize(self.http.post(self.url("v1/messages")))
            .json(body)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(PROVIDER_NAME, e))?;
        ensure_success(PROVIDER_NAME, response).await
    }

    fn fragments(&self, body: Value) -> impl Stream<Item = Result<String, AiError>> + Send + '_ {
        try_stream! {
            let response = self
                .send(self.messages_request(&body))
                .await
                .map_err(AiError::from)?;
            let events = sse_events(PROVIDER_NAME.to_string(), response.bytes_stream());
            futures_util::pin_mut!(events);

            while let Some(event) = events.next().await {
                let event = event.map_err(AiError::from)?;
                match interpret_event(&event).map_err(AiError::from)? {
                    StreamStep::Fragment(text) => {
                        yield text;
                    }
                    StreamStep::Skip => {}
                    StreamStep::Done => break,
                }
            }
            debug!(provider = PROVIDER_NAME, "stream finished");
        }
    }
}

#[async_trait]
impl ChatProvider for AnthropicClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn default_model(&self) -> &str {
        DEFAULT_MODEL
    }

    fn config(&self) -> ProviderSnapshot {
        ProviderSnapshot {
            provider: PROVIDER_NAME.to_string(),
            model: self.model.clone(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        }
    }

    async fn chat(
        &self,
        history: &[Message],
        system_instruction: Option<&str>,
    ) -> Result<ModelResponse, AiError> {
        let body = self.build_request_body(history, system_instruction, false);

        debug!(provider = PROVIDER_NAME, model = %self.model, turns = history.len(), "chat request");

        let request = self.messages_request(&body).timeout(self.config.timeout);
        let response = self.send(request).await?;
        let parsed: MessagesResponse = read_json(PROVIDER_NAME, response).await?;
        Ok(self.parse_response(parsed))
    }

    fn stream_chat<'a>(
        &'a self,
        history: &'a [Message],
        system_instruction: Option<&'a str>,
    ) -> FragmentStream<'a> {
        let body = self.build_request_body(history, system_instruction, true);

        debug!(provider = PROVIDER_NAME, model = %self.model, turns = history.len(), "streaming request");

        self.fragments(body).boxed()
    }

    async fn check_credential(&self) -> Result<(), AiError> {
        let request = self
            .authorize(self.http.get(self.url("v1/models?limit=1")))
            .timeout(self.config.timeout);
        self.send(request).await?;
        Ok(())
    }
}
