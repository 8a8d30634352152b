//! Persistent push channel over WebSocket.
//!
//! [`PushChannel::spawn`] starts a background task that keeps a WebSocket
//! open to the assistant service and forwards what happens on it as
//! [`PushEvent`]s:
//!
//! - handshake completed: [`PushEvent::Connected`]
//! - text frame `{"message": "..."}`: [`PushEvent::Message`]
//! - close or read error after connecting: [`PushEvent::Disconnected`]
//!
//! After a disconnect or a failed connect attempt the task waits for the
//! reconnect delay and tries again.  It stops when the event receiver is
//! dropped, when reconnects are disabled, or when the channel is shut down.

use std::time::Duration;

use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};
use url::Url;

use modumentor_chat::protocol::PushFrame;
use modumentor_chat::{PushEvent, SessionEvent};

/// Handle to the background push task.  Dropping it stops the task.
#[derive(Debug)]
pub struct PushChannel {
    handle: JoinHandle<()>,
}

/// Why a connected read loop ended.
enum ReadEnd {
    /// The server closed the socket or it failed.
    Disconnected,
    /// Nobody is listening for events any more.
    ReceiverGone,
}

impl PushChannel {
    /// Start the push task.
    ///
    /// `reconnect_delay` of `None` means a single connection attempt.
    pub fn spawn(
        url: Url,
        reconnect_delay: Option<Duration>,
        tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        let handle = tokio::spawn(run(url, reconnect_delay, tx));
        Self { handle }
    }

    /// Stop the task.  No events are delivered afterwards.
    pub fn shutdown(&self) {
        self.handle.abort();
    }

    /// Whether the task has stopped on its own or been shut down.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for PushChannel {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn run(url: Url, reconnect_delay: Option<Duration>, tx: mpsc::UnboundedSender<SessionEvent>) {
    loop {
        if tx.is_closed() {
            break;
        }

        match connect_async(url.as_str()).await {
            Ok((mut stream, _response)) => {
                info!(url = %url, "push channel connected");
                if tx.send(PushEvent::Connected.into()).is_err() {
                    break;
                }

                if let ReadEnd::ReceiverGone = read_frames(&mut stream, &tx).await {
                    break;
                }

                info!(url = %url, "push channel disconnected");
                if tx.send(PushEvent::Disconnected.into()).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!(url = %url, error = %e, "push channel connect failed");
            }
        }

        match reconnect_delay {
            Some(delay) => tokio::time::sleep(delay).await,
            None => break,
        }
    }

    debug!(url = %url, "push channel task finished");
}

async fn read_frames<S>(stream: &mut S, tx: &mpsc::UnboundedSender<SessionEvent>) -> ReadEnd
where
    S: futures::Stream<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    while let Some(frame) = stream.next().await {
        match frame {
            Ok(Message::Text(text)) => match serde_json::from_str::<PushFrame>(text.as_str()) {
                Ok(push) => {
                    if tx.send(PushEvent::Message(push.message).into()).is_err() {
                        return ReadEnd::ReceiverGone;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "ignoring unparsable push frame");
                }
            },
            Ok(Message::Close(_)) => break,
            // Ping, pong, and binary frames carry no notifications.
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "push channel read failed");
                break;
            }
        }
    }
    ReadEnd::Disconnected
}
