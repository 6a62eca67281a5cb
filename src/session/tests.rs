use super::*;
use crate::api::{ConversationHandle, FragmentStream, InferenceClient};
use crate::config::ModelChangePolicy;
use crate::conversation::{Message, Role};
use crate::error::{ChatError, Result};
use crate::model_config::ModelId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone)]
enum Step {
    Text(&'static str),
    Empty,
    Fail(&'static str),
}

/// Replies come from a shared queue of scripts, one script per `send`
#[derive(Clone, Default)]
struct ScriptedClient {
    scripts: Arc<Mutex<VecDeque<Vec<Step>>>>,
    created: Arc<Mutex<Vec<(ModelId, Vec<Message>)>>>,
    fail_create: Arc<Mutex<bool>>,
    send_fails: Arc<Mutex<bool>>,
}

impl ScriptedClient {
    fn script(&self, steps: Vec<Step>) {
        self.scripts.lock().unwrap().push_back(steps);
    }

    fn created(&self) -> Vec<(ModelId, Vec<Message>)> {
        self.created.lock().unwrap().clone()
    }
}

#[async_trait]
impl InferenceClient for ScriptedClient {
    async fn create_session(
        &self,
        model: ModelId,
        history: Vec<Message>,
    ) -> Result<Box<dyn ConversationHandle>> {
        if *self.fail_create.lock().unwrap() {
            return Err(ChatError::Api("model not found".to_string()));
        }
        self.created.lock().unwrap().push((model, history.clone()));
        Ok(Box::new(ScriptedHandle {
            model,
            history,
            created_at: Utc::now(),
            client: self.clone(),
        }))
    }
}

struct ScriptedHandle {
    model: ModelId,
    history: Vec<Message>,
    created_at: DateTime<Utc>,
    client: ScriptedClient,
}

#[async_trait]
impl ConversationHandle for ScriptedHandle {
    fn model(&self) -> ModelId {
        self.model
    }

    fn history(&self) -> &[Message] {
        &self.history
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    async fn send(&self, _prompt: &str) -> Result<FragmentStream> {
        if *self.client.send_fails.lock().unwrap() {
            return Err(ChatError::Api("quota exceeded".to_string()));
        }
        let steps = self
            .client
            .scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| vec![Step::Text("ok")]);
        let items: Vec<Result<Option<String>>> = steps
            .into_iter()
            .map(|step| match step {
                Step::Text(t) => Ok(Some(t.to_string())),
                Step::Empty => Ok(None),
                Step::Fail(msg) => Err(ChatError::Api(msg.to_string())),
            })
            .collect();
        Ok(Box::pin(futures::stream::iter(items)))
    }

    fn record_turn(&mut self, prompt: Message, reply: Message) {
        self.history.push(prompt);
        self.history.push(reply);
    }
}

fn setup(policy: ModelChangePolicy) -> (ScriptedClient, SessionManager<ScriptedClient>) {
    let client = ScriptedClient::default();
    (client.clone(), SessionManager::new(client, policy))
}

#[tokio::test]
async fn test_first_reconcile_creates_handle() {
    let (client, manager) = setup(ModelChangePolicy::Clear);
    let mut state = SessionState::new(Some(ModelId::GeminiPro));

    let outcome = manager.reconcile(&mut state).await.unwrap();
    assert_eq!(
        outcome,
        Reconciliation::Replace {
            previous: None,
            current: ModelId::GeminiPro,
            cleared: 0
        }
    );
    assert!(!outcome.is_model_change());
    assert_eq!(state.bound_model(), Some(ModelId::GeminiPro));
    assert_eq!(client.created().len(), 1);

    let again = manager.reconcile(&mut state).await.unwrap();
    assert_eq!(again, Reconciliation::Keep);
    assert_eq!(client.created().len(), 1);
}

#[tokio::test]
async fn test_handle_always_matches_selection() {
    let (_client, manager) = setup(ModelChangePolicy::Clear);
    let mut state = SessionState::new(Some(ModelId::GeminiPro));
    let selections = [
        ModelId::GeminiPro,
        ModelId::Gemini15ProLatest,
        ModelId::Gemini15ProLatest,
        ModelId::GeminiPro,
        ModelId::Gemini15ProLatest,
    ];

    for model in selections {
        state.select_model(model);
        manager.reconcile(&mut state).await.unwrap();
        assert_eq!(state.bound_model(), Some(model));
        manager.send_prompt(&mut state, "ping", |_| {}).await.unwrap();
    }
}

#[tokio::test]
async fn test_send_prompt_concatenates_fragments() {
    let (client, manager) = setup(ModelChangePolicy::Clear);
    let mut state = SessionState::new(Some(ModelId::GeminiPro));
    manager.reconcile(&mut state).await.unwrap();
    client.script(vec![
        Step::Text("Hel"),
        Step::Empty,
        Step::Text(""),
        Step::Text("lo"),
        Step::Text(" there"),
    ]);

    let mut seen = Vec::new();
    let reply = manager
        .send_prompt(&mut state, "hello", |f| seen.push(f.to_string()))
        .await
        .unwrap();

    assert_eq!(reply, "Hello there");
    assert_eq!(seen, vec!["Hel", "lo", " there"]);
    assert_eq!(
        state.transcript().messages(),
        &[Message::user("hello"), Message::assistant("Hello there")]
    );
    let handle = state.handle().unwrap();
    assert_eq!(handle.history(), state.transcript().messages());
}

#[tokio::test]
async fn test_mid_stream_failure_drops_turn() {
    let (client, manager) = setup(ModelChangePolicy::Clear);
    let mut state = SessionState::new(Some(ModelId::GeminiPro));
    manager.reconcile(&mut state).await.unwrap();
    client.script(vec![Step::Text("Hel"), Step::Text("lo"), Step::Fail("connection reset")]);

    let err = manager
        .send_prompt(&mut state, "hello", |_| {})
        .await
        .unwrap_err();

    match err {
        ChatError::Inference(msg) => assert!(msg.contains("connection reset")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(state.transcript().messages(), &[Message::user("hello")]);
    assert!(state.handle().unwrap().history().is_empty());

    client.script(vec![Step::Text("Hi!")]);
    manager.send_prompt(&mut state, "hello", |_| {}).await.unwrap();
    assert_eq!(
        state.transcript().messages(),
        &[
            Message::user("hello"),
            Message::user("hello"),
            Message::assistant("Hi!")
        ]
    );
}

#[tokio::test]
async fn test_send_failure_keeps_user_message() {
    let (client, manager) = setup(ModelChangePolicy::Clear);
    let mut state = SessionState::new(Some(ModelId::GeminiPro));
    manager.reconcile(&mut state).await.unwrap();
    *client.send_fails.lock().unwrap() = true;

    let err = manager
        .send_prompt(&mut state, "hello", |_| {})
        .await
        .unwrap_err();

    assert!(matches!(err, ChatError::Inference(_)));
    assert_eq!(state.transcript().len(), 1);
    assert_eq!(state.transcript().messages()[0].role, Role::User);
}

#[tokio::test]
async fn test_model_change_clears_transcript() {
    let (client, manager) = setup(ModelChangePolicy::Clear);
    let mut state = SessionState::new(Some(ModelId::GeminiPro));
    manager.reconcile(&mut state).await.unwrap();
    manager.send_prompt(&mut state, "one", |_| {}).await.unwrap();

    state.select_model(ModelId::Gemini15ProLatest);
    let outcome = manager.reconcile(&mut state).await.unwrap();

    assert_eq!(
        outcome,
        Reconciliation::Replace {
            previous: Some(ModelId::GeminiPro),
            current: ModelId::Gemini15ProLatest,
            cleared: 2
        }
    );
    assert!(outcome.is_model_change());
    assert!(state.transcript().is_empty());
    let (model, seed) = client.created().pop().unwrap();
    assert_eq!(model, ModelId::Gemini15ProLatest);
    assert!(seed.is_empty());
}

#[tokio::test]
async fn test_model_change_preserves_transcript() {
    let (client, manager) = setup(ModelChangePolicy::Preserve);
    let mut state = SessionState::new(Some(ModelId::GeminiPro));
    manager.reconcile(&mut state).await.unwrap();
    client.script(vec![Step::Text("answer")]);
    manager.send_prompt(&mut state, "question", |_| {}).await.unwrap();
    client.script(vec![Step::Fail("timeout")]);
    let _ = manager.send_prompt(&mut state, "lost", |_| {}).await;

    state.select_model(ModelId::Gemini15ProLatest);
    let outcome = manager.reconcile(&mut state).await.unwrap();

    assert!(matches!(outcome, Reconciliation::Replace { cleared: 0, .. }));
    assert_eq!(state.transcript().len(), 3);
    let (_, seed) = client.created().pop().unwrap();
    assert_eq!(
        seed,
        vec![Message::user("question"), Message::assistant("answer")]
    );
}

#[tokio::test]
async fn test_reset_then_reconcile_starts_fresh() {
    let (client, manager) = setup(ModelChangePolicy::Preserve);
    let mut state = SessionState::new(Some(ModelId::GeminiPro));
    manager.reconcile(&mut state).await.unwrap();
    manager.send_prompt(&mut state, "hello", |_| {}).await.unwrap();

    manager.reset(&mut state);
    assert!(state.handle().is_none());

    let outcome = manager.reconcile(&mut state).await.unwrap();
    assert!(matches!(outcome, Reconciliation::Replace { previous: None, .. }));
    assert!(state.transcript().is_empty());
    assert!(state.handle().unwrap().history().is_empty());
    assert_eq!(client.created().len(), 2);
}

#[tokio::test]
async fn test_missing_selection_fails_session_creation() {
    let (client, manager) = setup(ModelChangePolicy::Clear);
    let mut state = SessionState::new(None);

    let err = manager.reconcile(&mut state).await.unwrap_err();
    assert!(matches!(err, ChatError::SessionCreation(_)));
    assert!(state.handle().is_none());
    assert!(client.created().is_empty());
}

#[tokio::test]
async fn test_creation_failure_keeps_transcript() {
    let (client, manager) = setup(ModelChangePolicy::Clear);
    let mut state = SessionState::new(Some(ModelId::GeminiPro));
    manager.reconcile(&mut state).await.unwrap();
    manager.send_prompt(&mut state, "hello", |_| {}).await.unwrap();

    *client.fail_create.lock().unwrap() = true;
    state.select_model(ModelId::Gemini15ProLatest);
    let err = manager.reconcile(&mut state).await.unwrap_err();

    match err {
        ChatError::SessionCreation(msg) => assert!(msg.contains("model not found")),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(state.transcript().len(), 2);
    assert_eq!(state.bound_model(), Some(ModelId::GeminiPro));

    // The stale handle must not be used
    let err = manager
        .send_prompt(&mut state, "again", |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::NoActiveSession(_)));
    assert_eq!(state.transcript().len(), 2);
}

#[tokio::test]
async fn test_send_requires_reconciled_handle() {
    let (_client, manager) = setup(ModelChangePolicy::Clear);
    let mut state = SessionState::new(Some(ModelId::GeminiPro));

    let err = manager
        .send_prompt(&mut state, "hello", |_| {})
        .await
        .unwrap_err();
    assert!(matches!(err, ChatError::NoActiveSession(_)));
    assert!(state.transcript().is_empty());
}

#[tokio::test]
async fn test_empty_prompt_is_rejected() {
    let (_client, manager) = setup(ModelChangePolicy::Clear);
    let mut state = SessionState::new(Some(ModelId::GeminiPro));
    manager.reconcile(&mut state).await.unwrap();

    let err = manager.send_prompt(&mut state, "   ", |_| {}).await.unwrap_err();
    assert!(matches!(err, ChatError::InvalidInput(_)));
    assert!(state.transcript().is_empty());
}

#[tokio::test]
async fn test_snapshot_serializes_state() {
    let (_client, manager) = setup(ModelChangePolicy::Clear);
    let mut state = SessionState::new(Some(ModelId::GeminiPro));
    manager.reconcile(&mut state).await.unwrap();
    manager.send_prompt(&mut state, "hello", |_| {}).await.unwrap();

    let value = serde_json::to_value(state.snapshot()).unwrap();
    assert_eq!(value["selected_model"], "gemini-pro");
    assert_eq!(value["handle"]["model"], "gemini-pro");
    assert_eq!(value["handle"]["history_len"], 2);
    assert_eq!(value["messages"][0]["role"], "user");
    assert_eq!(value["messages"][1]["content"], "ok");
}
