//! Incremental decoding of streamed HTTP bodies.
//!
//! Both backends stream over Server-Sent Events, but they frame it
//! differently: OpenAI-compatible endpoints are handled line by line,
//! Anthropic sends typed `event:` / `data:` blocks. The pieces here are
//! independent of the network so they can be fed literal byte chunks:
//!
//! - [`LineBuffer`] turns arbitrary byte chunks into complete lines
//! - [`SseEventDecoder`] groups lines into [`SseEvent`]s
//! - [`byte_lines`] / [`sse_events`] lift both over a byte stream

use std::future::Future;

use async_stream::try_stream;
use futures_util::{stream, Stream, StreamExt};

use crate::error::BackendError;
use crate::{AiError, FragmentStream, ModelResponse};

/// Carries an incomplete trailing line between reads.
///
/// Re-entrant: each [`push`](LineBuffer::push) returns only the lines the
/// chunk completed; the remainder waits for the next chunk. Splitting on the
/// `\n` byte never cuts a UTF-8 sequence, so decoding happens per line.
#[derive(Debug, Default)]
pub struct LineBuffer {
    carryover: Vec<u8>,
    /// Prefix of `carryover` already known to hold no newline.
    scanned: usize,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and drain every line it completes (without `\r\n`).
    pub fn push(&mut self, chunk: &[u8]) -> Vec<String> {
        self.carryover.extend_from_slice(chunk);

        let mut lines = Vec::new();
        let mut start = 0;
        let mut from = self.scanned;
        while let Some(offset) = self.carryover[from..].iter().position(|&b| b == b'\n') {
            let end = from + offset;
            lines.push(decode_line(&self.carryover[start..end]));
            start = end + 1;
            from = start;
        }

        self.carryover.drain(..start);
        self.scanned = self.carryover.len();
        lines
    }

    /// Flush a final line that arrived without a trailing newline.
    pub fn finish(&mut self) -> Option<String> {
        self.scanned = 0;
        if self.carryover.is_empty() {
            return None;
        }
        let raw = std::mem::take(&mut self.carryover);
        Some(decode_line(&raw))
    }

    /// Bytes held back waiting for a newline.
    pub fn pending(&self) -> usize {
        self.carryover.len()
    }
}

fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

/// A single SSE event parsed from the stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    /// The event type (e.g., "message_start", "content_block_delta").
    pub event: Option<String>,
    /// The event data; multiple `data:` lines are joined with `\n`.
    pub data: String,
}

/// Groups SSE lines into events; an empty line ends the current event.
#[derive(Debug, Default)]
pub struct SseEventDecoder {
    current_event: Option<String>,
    current_data: String,
}

impl SseEventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one complete line; returns an event when the line closes one.
    pub fn feed_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.take_event();
        }

        // Comment lines (keep-alives) start with a colon.
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.current_event = Some(value.to_string()),
            "data" => {
                if !self.current_data.is_empty() {
                    self.current_data.push('\n');
                }
                self.current_data.push_str(value);
            }
            // id:, retry: and unknown fields carry nothing we use
            _ => {}
        }
        None
    }

    /// Flush an event left open when the body ended without a blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        self.take_event()
    }

    fn take_event(&mut self) -> Option<SseEvent> {
        let event = self.current_event.take();
        if self.current_data.is_empty() {
            return None;
        }
        Some(SseEvent {
            event,
            data: std::mem::take(&mut self.current_data),
        })
    }
}

/// What one decoded unit of a stream contributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StreamStep {
    Fragment(String),
    Skip,
    Done,
}

/// Complete lines from a byte stream, read only as the consumer polls.
pub(crate) fn byte_lines<S, B>(
    provider: String,
    bytes: S,
) -> impl Stream<Item = Result<String, BackendError>> + Send
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send,
    B: AsRef<[u8]> + Send,
{
    try_stream! {
        let mut buffer = LineBuffer::new();
        futures_util::pin_mut!(bytes);

        while let Some(chunk) = bytes.next().await {
            let chunk = chunk.map_err(|e| BackendError::from_reqwest(&provider, e))?;
            for line in buffer.push(chunk.as_ref()) {
                yield line;
            }
        }

        if let Some(line) = buffer.finish() {
            yield line;
        }
    }
}

/// SSE events from a byte stream.
pub(crate) fn sse_events<S, B>(
    provider: String,
    bytes: S,
) -> impl Stream<Item = Result<SseEvent, BackendError>> + Send
where
    S: Stream<Item = Result<B, reqwest::Error>> + Send,
    B: AsRef<[u8]> + Send,
{
    try_stream! {
        let mut decoder = SseEventDecoder::new();
        let lines = byte_lines(provider, bytes);
        futures_util::pin_mut!(lines);

        while let Some(line) = lines.next().await {
            if let Some(event) = decoder.feed_line(&line?) {
                yield event;
            }
        }

        if let Some(event) = decoder.finish() {
            yield event;
        }
    }
}

/// Fallback streaming for backends without incremental transport.
///
/// Runs `chat` when first polled and yields its whole content as a single
/// fragment, so every provider works behind one streaming call site.
pub fn stream_from_chat<'a, F>(chat: F) -> FragmentStream<'a>
where
    F: Future<Output = Result<ModelResponse, AiError>> + Send + 'a,
{
    stream::once(chat)
        .map(|result| result.map(|response| response.content))
        .boxed()
}
