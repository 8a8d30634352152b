//! Transport error types.
//!
//! A [`TransportError`] means the call itself failed: the request never
//! reached the assistant, or what came back could not be understood.
//! Application-level errors reported by the assistant are *not* errors at
//! this level; they travel inside the reply payloads in
//! [`protocol`](crate::protocol).

/// Failure of a single transport call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request exceeded its time limit.
    #[error("request timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// The assistant service could not be reached.
    #[error("connection failed: {reason}")]
    Connect { reason: String },

    /// The request failed for any other transport reason.
    #[error("request failed: {reason}")]
    Request { reason: String },

    /// The response body was not a payload this client understands.
    #[error("malformed response: {reason}")]
    MalformedResponse { reason: String },
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        Self::MalformedResponse {
            reason: e.to_string(),
        }
    }
}

/// Convenience alias used throughout the chat crate.
pub type Result<T> = std::result::Result<T, TransportError>;
