//! Session struct and history management.

use std::sync::Arc;

use quill_common::SessionId;
use tracing::debug;

use crate::token_tracker::TokenTracker;
use crate::{ChatProvider, Message};

/// A conversation with one provider at a time.
pub struct Session {
    pub(super) id: SessionId,
    pub(super) provider: Arc<dyn ChatProvider>,
    /// Sent with every turn; never stored in `messages`.
    pub(super) system_prompt: Option<String>,
    /// Chronological user/assistant turns.
    pub(super) messages: Vec<Message>,
    pub(super) tracker: TokenTracker,
}

impl Session {
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        Self {
            id: SessionId::new(),
            provider,
            system_prompt: None,
            messages: Vec::new(),
            tracker: TokenTracker::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn provider(&self) -> &dyn ChatProvider {
        self.provider.as_ref()
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Route later turns to another backend. History is kept as-is.
    pub fn switch_provider(&mut self, provider: Arc<dyn ChatProvider>) {
        debug!(
            session = %self.id.short(),
            from = %self.provider.name(),
            to = %provider.name(),
            "switching provider"
        );
        self.provider = provider;
    }

    /// Copy of the conversation so far.
    pub fn history(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Forget the conversation. Usage totals are kept.
    pub fn reset(&mut self) {
        self.messages = Vec::new();
    }

    pub fn tracker(&self) -> &TokenTracker {
        &self.tracker
    }
}
