//! OpenAI-compatible chat completions adapter.
//!
//! Serves any backend speaking the `POST {base}/chat/completions` shape
//! (OpenAI itself, DeepSeek, gateways). The system instruction is injected
//! as the first message. Streaming is line-oriented SSE ending in
//! `data: [DONE]`.

mod api;
mod client;

pub use client::{OpenAiClient, OPENAI_BASE_URL, OPENAI_DEFAULT_MODEL};
