//! Integration tests for the chat session.
//!
//! These drive [`SessionState`] through a scripted [`Transport`], both
//! sequentially and through the background [`Dispatcher`].

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use modumentor_chat::notice;
use modumentor_chat::{
    Action, ChatReply, ClearReply, Dispatcher, MessageKind, Outcome, SessionState, ToolResult,
    ToolStatus, ToolTestReply, Transport, TransportError,
};

// ═══════════════════════════════════════════════════════════════════════
//  Scripted transport
// ═══════════════════════════════════════════════════════════════════════

#[derive(Default)]
struct Scripted {
    chat: Mutex<VecDeque<modumentor_chat::Result<ChatReply>>>,
    delays: Mutex<BTreeMap<&'static str, Duration>>,
    calls: Mutex<Vec<String>>,
}

impl Scripted {
    fn with_chat(replies: Vec<modumentor_chat::Result<ChatReply>>) -> Self {
        Self {
            chat: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    fn delay(self, call: &'static str, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(call, delay);
        self
    }

    async fn record(&self, call: &'static str, detail: String) {
        self.calls.lock().unwrap().push(detail);
        let delay = self.delays.lock().unwrap().get(call).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Transport for Scripted {
    async fn chat(&self, message: &str, user_id: &str) -> modumentor_chat::Result<ChatReply> {
        self.record("chat", format!("chat:{user_id}:{message}")).await;
        self.chat
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ChatReply::Response("default".into())))
    }

    async fn clear_history(&self, user_id: &str) -> modumentor_chat::Result<ClearReply> {
        self.record("clear", format!("clear:{user_id}")).await;
        Ok(ClearReply::Success(true))
    }

    async fn help(&self, user_id: &str) -> modumentor_chat::Result<ChatReply> {
        self.record("help", format!("help:{user_id}")).await;
        Ok(ChatReply::Response("**Commands**: weather, lyrics".into()))
    }

    async fn test_tools(&self, user_id: &str) -> modumentor_chat::Result<ToolTestReply> {
        self.record("test_tools", format!("test_tools:{user_id}")).await;
        let mut results = BTreeMap::new();
        results.insert(
            "weather".to_owned(),
            ToolResult {
                status: ToolStatus::Success,
                response: "Delhi 31C".into(),
            },
        );
        Ok(ToolTestReply::Results(results))
    }

    async fn analyze_conversation(&self, user_id: &str) -> modumentor_chat::Result<ChatReply> {
        self.record("analyze", format!("analyze:{user_id}")).await;
        Err(TransportError::Timeout { seconds: 30 })
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Sequential sends
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn successful_send_appends_user_then_bot() {
    let transport = Scripted::with_chat(vec![Ok(ChatReply::Response("hello".into()))]);
    let mut state = SessionState::new();

    let outcome = state.send_user_message(&transport, "web-user", "hi").await;

    assert_eq!(outcome, Outcome::Replied);
    let msgs = state.messages();
    assert_eq!(msgs.len(), 2);
    assert_eq!((msgs[0].kind(), msgs[0].text()), (MessageKind::User, "hi"));
    assert_eq!((msgs[1].kind(), msgs[1].text()), (MessageKind::Bot, "hello"));
    assert!(!state.is_pending());
    assert_eq!(*transport.calls.lock().unwrap(), ["chat:web-user:hi"]);
}

#[tokio::test]
async fn application_error_becomes_system_message() {
    let transport = Scripted::with_chat(vec![Ok(ChatReply::Error("boom".into()))]);
    let mut state = SessionState::new();

    let outcome = state.send_user_message(&transport, "web-user", "hi").await;

    assert_eq!(outcome, Outcome::Rejected);
    let last = state.last_message().unwrap();
    assert_eq!(last.kind(), MessageKind::System);
    assert!(last.text().contains("boom"));
    assert!(!state.is_pending());
}

#[tokio::test]
async fn transport_failure_becomes_generic_system_message() {
    let transport = Scripted::with_chat(vec![Err(TransportError::Connect {
        reason: "connection refused".into(),
    })]);
    let mut state = SessionState::new();

    let outcome = state.send_user_message(&transport, "web-user", "hi").await;

    assert_eq!(outcome, Outcome::Failed);
    assert_eq!(state.messages().len(), 2);
    assert_eq!(state.last_message().unwrap().text(), notice::SEND_FAILED);
    assert!(!state.is_pending());
}

#[tokio::test]
async fn blank_sends_are_ignored_without_calling_the_transport() {
    let transport = Scripted::default();
    let mut state = SessionState::new();

    assert_eq!(
        state.send_user_message(&transport, "web-user", "").await,
        Outcome::Ignored
    );
    assert_eq!(
        state.send_user_message(&transport, "web-user", "   ").await,
        Outcome::Ignored
    );
    assert!(state.messages().is_empty());
    assert!(!state.is_pending());
    assert!(transport.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn send_while_pending_is_ignored() {
    let transport = Scripted::default();
    let mut state = SessionState::new();
    state.set_pending(true);

    let outcome = state.send_user_message(&transport, "web-user", "hi").await;

    assert_eq!(outcome, Outcome::Ignored);
    assert!(state.messages().is_empty());
    assert!(state.is_pending());
    assert!(transport.calls.lock().unwrap().is_empty());
}

#[tokio::test]
async fn session_stays_usable_after_failures() {
    let transport = Scripted::with_chat(vec![
        Err(TransportError::Timeout { seconds: 30 }),
        Ok(ChatReply::Response("back online".into())),
    ]);
    let mut state = SessionState::new();

    state.send_user_message(&transport, "web-user", "one").await;
    let outcome = state.send_user_message(&transport, "web-user", "two").await;

    assert_eq!(outcome, Outcome::Replied);
    assert_eq!(state.messages().len(), 4);
    assert_eq!(state.last_message().unwrap().text(), "back online");
}

// ═══════════════════════════════════════════════════════════════════════
//  Utility actions
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn each_utility_action_appends_exactly_one_message() {
    let transport = Scripted::default();
    let mut state = SessionState::new();

    for action in [Action::Help, Action::TestTools, Action::AnalyzeConversation] {
        let before = state.messages().len();
        state.run_action(&transport, "web-user", action).await;
        assert_eq!(state.messages().len(), before + 1);
    }

    let msgs = state.messages();
    assert_eq!(msgs[0].kind(), MessageKind::Bot);
    assert!(msgs[1].text().starts_with(notice::TOOL_REPORT_HEADER));
    assert!(msgs[1].text().contains("✅ **weather**: Delhi 31C"));
    assert_eq!(msgs[2].text(), notice::ANALYZE_FAILED);
}

#[tokio::test]
async fn clear_action_resets_log_to_the_notice() {
    let transport = Scripted::default();
    let mut state = SessionState::new();
    state.send_user_message(&transport, "web-user", "hi").await;

    let outcome = state
        .run_action(&transport, "web-user", Action::ClearHistory)
        .await;

    assert_eq!(outcome, Outcome::Replied);
    assert_eq!(state.messages().len(), 1);
    assert_eq!(state.messages()[0].text(), notice::HISTORY_CLEARED);
}

// ═══════════════════════════════════════════════════════════════════════
//  Background dispatch
// ═══════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn replies_appear_in_completion_order() {
    let transport = Arc::new(
        Scripted::with_chat(vec![Ok(ChatReply::Response("fast chat".into()))])
            .delay("help", Duration::from_millis(150)),
    );
    let (dispatcher, mut rx) = Dispatcher::new(transport, "web-user");
    let mut state = SessionState::new();

    // Help is issued first but settles last.
    dispatcher.spawn(Action::Help);
    let chat = state.begin_chat("hi").unwrap();
    dispatcher.spawn(chat);

    for _ in 0..2 {
        let event = rx.recv().await.unwrap();
        state.apply(event);
    }

    let texts: Vec<&str> = state.messages().iter().map(|m| m.text()).collect();
    assert_eq!(texts, ["hi", "fast chat", "**Commands**: weather, lyrics"]);
    assert!(!state.is_pending());
}

#[tokio::test]
async fn in_flight_call_after_teardown_is_a_no_op() {
    let transport = Arc::new(Scripted::default().delay("chat", Duration::from_millis(50)));
    let (dispatcher, rx) = Dispatcher::new(transport, "web-user");
    let mut state = SessionState::new();

    let chat = state.begin_chat("bye").unwrap();
    let handle = dispatcher.spawn(chat);
    drop(rx);

    handle.await.unwrap();
    assert_eq!(state.messages().len(), 1);
}
