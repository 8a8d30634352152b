//! In-memory chat session state.
//!
//! [`SessionState`] is owned by exactly one controller (the TUI loop or a
//! one-shot CLI command) and mutated only through the methods below.  The
//! message log is append-only: the single exception is [`SessionState::clear`],
//! which empties it entirely.
//!
//! A user chat request runs in two phases so that an event loop can keep
//! processing input and push events while the request is in flight:
//!
//! 1. [`SessionState::begin_chat`] checks the preconditions, appends the user
//!    message, sets `pending`, and returns the [`Action`] to dispatch.
//! 2. [`SessionState::settle`] applies the eventual [`Settlement`], appending
//!    exactly one reply and clearing `pending`.
//!
//! [`SessionState::send_user_message`] composes both phases for callers that
//! can simply await the transport.

use chrono::Utc;
use tracing::debug;

use crate::action::{Action, Outcome, Settlement};
use crate::event::{PushEvent, SessionEvent};
use crate::message::{Message, MessageId, MessageKind};
use crate::notice;
use crate::transport::Transport;

/// Process-local chat session state.
#[derive(Debug, Default)]
pub struct SessionState {
    messages: Vec<Message>,
    connected: bool,
    pending: bool,
    sidebar_open: bool,
    /// Raw value of the most recently issued id.
    last_id: u64,
}

impl SessionState {
    /// Create an empty, disconnected session.
    pub fn new() -> Self {
        Self::default()
    }

    // -- Accessors ----------------------------------------------------------

    /// All messages, in creation order.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    /// Whether a user chat request is outstanding.
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn is_sidebar_open(&self) -> bool {
        self.sidebar_open
    }

    // -- Log operations -----------------------------------------------------

    /// Append a new message stamped with a fresh id and the current time.
    pub fn append_message(&mut self, text: impl Into<String>, kind: MessageKind) -> &Message {
        let now = Utc::now();
        let millis = u64::try_from(now.timestamp_millis()).unwrap_or_default();
        let id = millis.max(self.last_id + 1);
        self.last_id = id;

        self.messages
            .push(Message::new(MessageId::new(id), text.into(), kind, now));
        debug!(id, kind = %kind, "message appended");

        let last = self.messages.len() - 1;
        &self.messages[last]
    }

    /// Empty the message log.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    // -- Flags --------------------------------------------------------------

    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }

    pub fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }

    pub fn set_sidebar_open(&mut self, open: bool) {
        self.sidebar_open = open;
    }

    pub fn toggle_sidebar(&mut self) {
        self.sidebar_open = !self.sidebar_open;
    }

    // -- User chat ----------------------------------------------------------

    /// Start a user chat request.
    ///
    /// Returns `None`, leaving the state untouched, when the trimmed text is
    /// empty or a request is already pending.
    pub fn begin_chat(&mut self, text: &str) -> Option<Action> {
        let text = text.trim();
        if text.is_empty() || self.pending {
            return None;
        }

        self.append_message(text, MessageKind::User);
        self.pending = true;
        Some(Action::Chat(text.to_owned()))
    }

    /// Apply a settled action: append its single message and, for chat,
    /// clear `pending`.
    pub fn settle(&mut self, settlement: Settlement) -> Outcome {
        if settlement.is_chat() {
            self.pending = false;
        }

        let resolution = settlement.resolve();
        if resolution.clear_log {
            self.clear();
        }
        self.append_message(resolution.text, resolution.kind);
        resolution.outcome
    }

    /// Send a user chat message and wait for its reply.
    pub async fn send_user_message(
        &mut self,
        transport: &dyn Transport,
        user_id: &str,
        text: &str,
    ) -> Outcome {
        let Some(action) = self.begin_chat(text) else {
            return Outcome::Ignored;
        };
        let settlement = action.dispatch(transport, user_id).await;
        self.settle(settlement)
    }

    /// Run a utility action (help, tool test, analysis, clear) to completion.
    ///
    /// Utility actions ignore `pending`.  A chat action passed here goes
    /// through the same preconditions as [`SessionState::send_user_message`].
    pub async fn run_action(
        &mut self,
        transport: &dyn Transport,
        user_id: &str,
        action: Action,
    ) -> Outcome {
        match action {
            Action::Chat(text) => self.send_user_message(transport, user_id, &text).await,
            other => {
                let settlement = other.dispatch(transport, user_id).await;
                self.settle(settlement)
            }
        }
    }

    // -- Push events --------------------------------------------------------

    /// Apply a notification from the push channel.
    pub fn apply_push(&mut self, event: PushEvent) {
        match event {
            PushEvent::Connected => {
                self.set_connected(true);
                self.append_message(notice::WELCOME, MessageKind::System);
            }
            PushEvent::Disconnected => {
                self.set_connected(false);
                self.append_message(notice::CONNECTION_LOST, MessageKind::System);
            }
            PushEvent::Message(text) => {
                self.append_message(text, MessageKind::Bot);
            }
        }
    }

    /// Apply any session event.  Returns the outcome for settlements.
    pub fn apply(&mut self, event: SessionEvent) -> Option<Outcome> {
        match event {
            SessionEvent::Push(push) => {
                self.apply_push(push);
                None
            }
            SessionEvent::Settled(settlement) => Some(self.settle(settlement)),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
