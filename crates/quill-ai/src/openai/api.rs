//! ChatProvider implementation for OpenAiClient (chat + streaming).

use async_stream::try_stream;
use async_trait::async_trait;
use futures_util::{Stream, StreamExt};
use serde_json::Value;
use tracing::debug;

use crate::error::BackendError;
use crate::http::{ensure_success, read_json};
use crate::{AiError, ChatProvider, FragmentStream, Message, ModelResponse, ProviderSnapshot};

use super::client::{decode_stream, ChatCompletionResponse, OpenAiClient};

impl OpenAiClient {
    fn completions_request(&self, body: &Value) -> reqwest::RequestBuilder {
        self.http
            .post(self.url("chat/completions"))
            .bearer_auth(&self.config.credential)
            .json(body)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, BackendError> {
        let response = request
            .send()
            .await
            .map_err(|e| BackendError::from_reqwest(&self.provider, e))?;
        ensure_success(&self.provider, response).await
    }

    fn fragments(&self, body: Value) -> impl Stream<Item = Result<String, AiError>> + Send + '_ {
        try_stream! {
            let response = self
                .send(self.completions_request(&body))
                .await
                .map_err(AiError::from)?;
            let fragments = decode_stream(self.provider.clone(), response.bytes_stream());
            futures_util::pin_mut!(fragments);

            while let Some(fragment) = fragments.next().await {
                yield fragment?;
            }
            debug!(provider = %self.provider, "stream finished");
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiClient {
    fn name(&self) -> &str {
        &self.provider
    }

    fn default_model(&self) -> &str {
        &self.default_model
    }

    fn config(&self) -> ProviderSnapshot {
        ProviderSnapshot {
            provider: self.provider.clone(),
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

        debug!(provider = %self.provider, model = %self.model, turns = history.len(), "chat request");

        let request = self.completions_request(&body).timeout(self.config.timeout);
        let response = self.send(request).await?;
        let parsed: ChatCompletionResponse = read_json(&self.provider, response).await?;
        Ok(self.parse_response(parsed)?)
    }

    fn stream_chat<'a>(
        &'a self,
        history: &'a [Message],
        system_instruction: Option<&'a str>,
    ) -> FragmentStream<'a> {
        let body = self.build_request_body(history, system_instruction, true);

        debug!(provider = %self.provider, model = %self.model, turns = history.len(), "streaming request");

        self.fragments(body).boxed()
    }

    async fn check_credential(&self) -> Result<(), AiError> {
        let request = self
            .http
            .get(self.url("models"))
            .bearer_auth(&self.config.credential)
            .timeout(self.config.timeout);
        self.send(request).await?;
        Ok(())
    }
}
