//! Events delivered to the session owner from outside the input loop.

use crate::action::Settlement;

/// A notification from the persistent push channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    /// The link to the service was established.
    Connected,
    /// The link was lost.
    Disconnected,
    /// The service pushed a message outside any request.
    Message(String),
}

/// Anything the session owner applies to its state between key presses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Push(PushEvent),
    Settled(Settlement),
}

impl From<PushEvent> for SessionEvent {
    fn from(event: PushEvent) -> Self {
        Self::Push(event)
    }
}

impl From<Settlement> for SessionEvent {
    fn from(settlement: Settlement) -> Self {
        Self::Settled(settlement)
    }
}
