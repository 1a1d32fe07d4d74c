//! Tests for session history handling against scripted providers.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures_util::stream;

use super::*;
use crate::{
    AiError, BackendError, BackendErrorKind, ChatProvider, FragmentStream, Message,
    ModelResponse, ProviderSnapshot, Role, TokenUsage,
};

type Call = (Vec<Message>, Option<String>);

/// Replies from a queue and records every request it receives.
struct ScriptedProvider {
    name: &'static str,
    replies: Mutex<VecDeque<Result<String, AiError>>>,
    calls: Arc<Mutex<Vec<Call>>>,
}

impl ScriptedProvider {
    fn new(name: &'static str, replies: Vec<Result<String, AiError>>) -> Self {
        Self {
            name,
            replies: Mutex::new(replies.into()),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    fn calls(&self) -> Arc<Mutex<Vec<Call>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &str {
        self.name
    }

    fn default_model(&self) -> &str {
        "scripted-1"
    }

    fn config(&self) -> ProviderSnapshot {
        ProviderSnapshot {
            provider: self.name.to_string(),
            model: "scripted-1".into(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }

    async fn chat(
        &self,
        history: &[Message],
        system_instruction: Option<&str>,
    ) -> Result<ModelResponse, AiError> {
        self.calls
            .lock()
            .unwrap()
            .push((history.to_vec(), system_instruction.map(str::to_string)));
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .expect("script exhausted")?;
        Ok(ModelResponse {
            content: reply,
            model: "scripted-1".into(),
            usage: Some(TokenUsage::from_counts(4, 2)),
        })
    }

    async fn check_credential(&self) -> Result<(), AiError> {
        Ok(())
    }
}

/// Streams fixed fragments, optionally failing after them.
struct ChunkedProvider {
    fragments: Vec<&'static str>,
    fail_after: bool,
}

#[async_trait]
impl ChatProvider for ChunkedProvider {
    fn name(&self) -> &str {
        "chunked"
    }

    fn default_model(&self) -> &str {
        "chunked-1"
    }

    fn config(&self) -> ProviderSnapshot {
        ProviderSnapshot {
            provider: "chunked".into(),
            model: "chunked-1".into(),
            max_tokens: 4096,
            temperature: 0.7,
        }
    }

    async fn chat(&self, _: &[Message], _: Option<&str>) -> Result<ModelResponse, AiError> {
        Ok(ModelResponse {
            content: self.fragments.concat(),
            model: "chunked-1".into(),
            usage: None,
        })
    }

    fn stream_chat<'a>(&'a self, _: &'a [Message], _: Option<&'a str>) -> FragmentStream<'a> {
        let mut items: Vec<Result<String, AiError>> =
            self.fragments.iter().map(|f| Ok(f.to_string())).collect();
        if self.fail_after {
            items.push(Err(backend_error("connection reset").into()));
        }
        Box::pin(stream::iter(items))
    }

    async fn check_credential(&self) -> Result<(), AiError> {
        Ok(())
    }
}

fn backend_error(message: &str) -> BackendError {
    BackendError::new("scripted", BackendErrorKind::Network, message)
}

fn roles(messages: &[Message]) -> Vec<Role> {
    messages.iter().map(|m| m.role).collect()
}

#[tokio::test]
async fn successful_submits_alternate_user_and_assistant() {
    let provider = ScriptedProvider::new(
        "scripted",
        vec![Ok("one".into()), Ok("two".into()), Ok("three".into())],
    );
    let mut session = Session::new(Arc::new(provider));

    for (i, text) in ["a", "b", "c"].into_iter().enumerate() {
        session.submit(text).await.unwrap();
        assert_eq!(session.history().len(), 2 * (i + 1));
    }

    let history = session.history();
    assert_eq!(
        roles(&history),
        vec![
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant,
            Role::User,
            Role::Assistant
        ]
    );
    assert_eq!(history[0].content, "a");
    assert_eq!(history[5].content, "three");
}

#[tokio::test]
async fn provider_sees_full_history_and_system_prompt() {
    let provider = ScriptedProvider::new("scripted", vec![Ok("r1".into()), Ok("r2".into())]);
    let calls = provider.calls();
    let mut session = Session::new(Arc::new(provider)).with_system_prompt("Stay in character");

    session.submit("first").await.unwrap();
    session.submit("second").await.unwrap();

    let calls = calls.lock().unwrap();
    assert_eq!(calls.len(), 2);
    let (history, system) = &calls[1];
    assert_eq!(system.as_deref(), Some("Stay in character"));
    assert_eq!(
        history,
        &vec![
            Message::user("first"),
            Message::assistant("r1"),
            Message::user("second")
        ]
    );
}

#[tokio::test]
async fn failed_submit_keeps_user_turn_and_propagates() {
    let provider = ScriptedProvider::new(
        "scripted",
        vec![Err(backend_error("unreachable").into()), Ok("recovered".into())],
    );
    let calls = provider.calls();
    let mut session = Session::new(Arc::new(provider));

    let err = session.submit("lost?").await.unwrap_err();
    assert_eq!(err.backend().unwrap().message, "unreachable");
    assert_eq!(session.history(), vec![Message::user("lost?")]);

    // Retrying resends the failed turn.
    session.submit("again").await.unwrap();
    let calls = calls.lock().unwrap();
    assert_eq!(
        calls[1].0,
        vec![Message::user("lost?"), Message::user("again")]
    );
}

#[tokio::test]
async fn reset_empties_history_idempotently() {
    let provider = ScriptedProvider::new("scripted", vec![Ok("ok".into())]);
    let mut session = Session::new(Arc::new(provider));

    session.reset();
    assert!(session.history().is_empty());

    session.submit("hello").await.unwrap();
    session.reset();
    session.reset();
    assert!(session.history().is_empty());
    assert_eq!(session.message_count(), 0);
}

#[tokio::test]
async fn history_is_a_defensive_copy() {
    let provider = ScriptedProvider::new("scripted", vec![Ok("ok".into())]);
    let mut session = Session::new(Arc::new(provider));
    session.submit("hello").await.unwrap();

    let mut copy = session.history();
    copy.clear();
    copy.push(Message::system("injected"));

    assert_eq!(session.message_count(), 2);
    assert_eq!(session.history()[0], Message::user("hello"));
}

#[tokio::test]
async fn usage_is_tracked_per_provider() {
    let provider = ScriptedProvider::new("scripted", vec![Ok("x".into()), Ok("y".into())]);
    let mut session = Session::new(Arc::new(provider));
    session.submit("1").await.unwrap();
    session.submit("2").await.unwrap();

    let tracker = session.tracker();
    assert_eq!(tracker.call_count(), 2);
    assert_eq!(tracker.for_provider("scripted").unwrap().total_tokens, 12);
}

#[tokio::test]
async fn switching_provider_keeps_history_shape() {
    let first = ScriptedProvider::new("first", vec![Ok("from first".into())]);
    let second = ScriptedProvider::new("second", vec![Ok("from second".into())]);
    let second_calls = second.calls();

    let mut session = Session::new(Arc::new(first));
    session.submit("q1").await.unwrap();
    session.switch_provider(Arc::new(second));
    assert_eq!(session.provider().name(), "second");
    session.submit("q2").await.unwrap();

    let calls = second_calls.lock().unwrap();
    assert_eq!(
        roles(&calls[0].0),
        vec![Role::User, Role::Assistant, Role::User]
    );
    assert_eq!(
        roles(&session.history()),
        vec![Role::User, Role::Assistant, Role::User, Role::Assistant]
    );
}

#[tokio::test]
async fn streaming_submit_forwards_fragments_and_records_reply() {
    let provider = ChunkedProvider {
        fragments: vec!["Once ", "upon ", "a time"],
        fail_after: false,
    };
    let mut session = Session::new(Arc::new(provider));

    let mut seen = Vec::new();
    let reply = session
        .submit_streaming("tell me", |f| seen.push(f.to_string()))
        .await
        .unwrap();

    assert_eq!(seen, vec!["Once ", "upon ", "a time"]);
    assert_eq!(reply, "Once upon a time");
    assert_eq!(
        session.history(),
        vec![Message::user("tell me"), Message::assistant("Once upon a time")]
    );
    assert_eq!(session.tracker().unreported_calls(), 1);
}

#[tokio::test]
async fn streaming_failure_leaves_only_user_turn() {
    let provider = ChunkedProvider {
        fragments: vec!["partial"],
        fail_after: true,
    };
    let mut session = Session::new(Arc::new(provider));

    let mut seen = Vec::new();
    let err = session
        .submit_streaming("go", |f| seen.push(f.to_string()))
        .await
        .unwrap_err();

    assert!(matches!(err, AiError::Backend(_)));
    assert_eq!(seen, vec!["partial"]);
    assert_eq!(session.history(), vec![Message::user("go")]);
}

#[tokio::test]
async fn default_stream_falls_back_to_chat() {
    let provider = ScriptedProvider::new("scripted", vec![Ok("all at once".into())]);
    let mut session = Session::new(Arc::new(provider));

    let mut seen = Vec::new();
    session
        .submit_streaming("hi", |f| seen.push(f.to_string()))
        .await
        .unwrap();
    assert_eq!(seen, vec!["all at once"]);
}
