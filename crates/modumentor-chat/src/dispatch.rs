//! Background dispatch of actions for an event-loop owner.
//!
//! [`Dispatcher::spawn`] runs an [`Action`] on a tokio task and delivers its
//! [`Settlement`] over an unbounded channel.  The owner drains the matching
//! receiver each loop iteration and applies the events to its
//! [`SessionState`](crate::session::SessionState).
//!
//! Dropping the receiver ends the session: any call still in flight finishes
//! on its own, finds the channel closed, and its settlement is discarded.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::action::Action;
use crate::event::SessionEvent;
use crate::transport::Transport;

/// Spawns transport calls and routes their settlements back to the owner.
#[derive(Clone)]
pub struct Dispatcher {
    transport: Arc<dyn Transport>,
    user_id: Arc<str>,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl Dispatcher {
    /// Create a dispatcher and the receiver its events arrive on.
    pub fn new(
        transport: Arc<dyn Transport>,
        user_id: impl Into<Arc<str>>,
    ) -> (Self, mpsc::UnboundedReceiver<SessionEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Self {
            transport,
            user_id: user_id.into(),
            tx,
        };
        (dispatcher, rx)
    }

    /// A sender for other event sources, such as the push channel.
    pub fn sender(&self) -> mpsc::UnboundedSender<SessionEvent> {
        self.tx.clone()
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Issue `action` in the background.
    pub fn spawn(&self, action: Action) -> JoinHandle<()> {
        let transport = Arc::clone(&self.transport);
        let user_id = Arc::clone(&self.user_id);
        let tx = self.tx.clone();

        tokio::spawn(async move {
            let name = action.name();
            let settlement = action.dispatch(transport.as_ref(), &user_id).await;
            if tx.send(SessionEvent::Settled(settlement)).is_err() {
                debug!(action = name, "session closed before settlement, dropping");
            }
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
