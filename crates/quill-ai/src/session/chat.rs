//! Async turn submission for Session (blocking + streaming).

use futures_util::StreamExt;
use tracing::debug;

use crate::{AiError, Message};

use super::manager::Session;

impl Session {
    /// Send a user turn and return the assistant's reply.
    ///
    /// The user turn is recorded before the call. If the provider fails it
    /// stays in history and the error is returned unchanged, so the next
    /// submit resends it unless the caller resets.
    pub async fn submit(&mut self, user_text: impl Into<String>) -> Result<String, AiError> {
        self.messages.push(Message::user(user_text));

        debug!(
            session = %self.id.short(),
            provider = %self.provider.name(),
            turns = self.messages.len(),
            "submitting turn"
        );

        let response = self
            .provider
            .chat(&self.messages, self.system_prompt.as_deref())
            .await?;

        self.tracker
            .record(self.provider.name(), response.usage.as_ref());
        self.messages.push(Message::assistant(response.content.clone()));

        Ok(response.content)
    }

    /// Like [`submit`](Session::submit), but hands each fragment to
    /// `on_fragment` as it arrives.
    ///
    /// The assistant turn is appended only once the stream completes. A
    /// failure part-way leaves just the user turn, as with `submit`.
    pub async fn submit_streaming(
        &mut self,
        user_text: impl Into<String>,
        mut on_fragment: impl FnMut(&str),
    ) -> Result<String, AiError> {
        self.messages.push(Message::user(user_text));

        debug!(
            session = %self.id.short(),
            provider = %self.provider.name(),
            turns = self.messages.len(),
            "submitting streaming turn"
        );

        let mut content = String::new();
        {
            let mut fragments = self
                .provider
                .stream_chat(&self.messages, self.system_prompt.as_deref());

            while let Some(fragment) = fragments.next().await {
                let fragment = fragment?;
                on_fragment(&fragment);
                content.push_str(&fragment);
            }
        }

        self.tracker.record(self.provider.name(), None);
        self.messages.push(Message::assistant(content.clone()));

        Ok(content)
    }
}
