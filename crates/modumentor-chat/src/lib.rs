//! Chat session core for ModuMentor.
//!
//! This crate holds everything about a chat session that does not touch the
//! network or the terminal:
//!
//! - [`markup`] -- inline formatting (links, bold, italic, code, line
//!   breaks) rendered as escaped HTML or as tokens for other views.
//! - [`session`] -- the append-only message log and the connected, pending,
//!   and sidebar flags.
//! - [`action`] -- user actions and the single message each one settles into.
//! - [`transport`] -- the [`Transport`] trait implemented by the HTTP client.
//! - [`dispatch`] -- runs actions on tokio tasks and routes their settlements
//!   back to the session owner.

pub mod action;
pub mod dispatch;
pub mod error;
pub mod event;
pub mod markup;
pub mod message;
pub mod notice;
pub mod protocol;
pub mod session;
pub mod transport;

pub use action::{Action, Outcome, Settlement};
pub use dispatch::Dispatcher;
pub use error::{Result, TransportError};
pub use event::{PushEvent, SessionEvent};
pub use markup::{Inline, format};
pub use message::{Message, MessageId, MessageKind};
pub use protocol::{ChatReply, ClearReply, ToolResult, ToolStatus, ToolTestReply};
pub use session::SessionState;
pub use transport::Transport;
