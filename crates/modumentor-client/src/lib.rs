//! Network side of the ModuMentor chat client.
//!
//! - [`HttpTransport`] implements [`modumentor_chat::Transport`] over
//!   JSON/HTTP using `reqwest`.
//! - [`PushChannel`] keeps a WebSocket open for server-pushed
//!   notifications.
//! - [`ClientConfig`] holds the urls, user id, and timeouts both need.

pub mod config;
pub mod error;
pub mod http;
pub mod push;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use http::HttpTransport;
pub use push::PushChannel;
