//! Anthropic Messages API adapter.
//!
//! Implements `ChatProvider` for Claude models via
//! `POST {base}/v1/messages`. The message array carries only user and
//! assistant turns; the system instruction travels in the top-level
//! `system` field. Streaming uses typed SSE events.

mod api;
mod client;

pub use client::{AnthropicClient, AuthMethod, DEFAULT_BASE_URL, DEFAULT_MODEL, PROVIDER_NAME};
