//! Request and reply payloads exchanged with the assistant service.
//!
//! Every reply is either a success payload or `{ "error": "..." }`.  The
//! raw JSON shapes are decoded into closed enums here so that the session
//! layer never has to inspect optional fields.  A body that matches neither
//! shape is a [`TransportError::MalformedResponse`].

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{Result, TransportError};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// Body of `POST /api/chat`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
}

/// Body of the utility endpoints, which only identify the user.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserRequest {
    pub user_id: String,
}

// ---------------------------------------------------------------------------
// Replies
// ---------------------------------------------------------------------------

/// Reply to chat, help, and conversation-analysis requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatReply {
    /// The assistant's answer.
    Response(String),
    /// The assistant reported an application-level error.
    Error(String),
}

/// Reply to a clear-history request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClearReply {
    /// Whether the server-side history was cleared.
    Success(bool),
    /// The assistant reported an application-level error.
    Error(String),
}

/// Reply to a tool self-test request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolTestReply {
    /// Per-tool results keyed by tool name.
    Results(BTreeMap<String, ToolResult>),
    /// The assistant reported an application-level error.
    Error(String),
}

/// Outcome of one tool in a self-test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolResult {
    #[serde(default, deserialize_with = "lenient_status")]
    pub status: ToolStatus,
    #[serde(default, deserialize_with = "lenient_string")]
    pub response: String,
}

/// Status reported for a tool.  Anything other than `success` is a failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolStatus {
    Success,
    #[default]
    #[serde(other)]
    Failure,
}

/// A server-pushed notification frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushFrame {
    pub message: String,
}

#[derive(Deserialize)]
struct RawChatReply {
    response: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct RawClearReply {
    success: Option<bool>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct RawToolTestReply {
    test_results: Option<BTreeMap<String, ToolResult>>,
    error: Option<String>,
}

impl ChatReply {
    /// Decode a reply body.
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: RawChatReply = serde_json::from_str(body)?;
        match (raw.response, raw.error) {
            (Some(response), _) if !response.is_empty() => Ok(Self::Response(response)),
            (_, Some(error)) => Ok(Self::Error(error)),
            _ => Err(missing_fields("response")),
        }
    }
}

impl ClearReply {
    /// Decode a reply body.
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: RawClearReply = serde_json::from_str(body)?;
        match (raw.success, raw.error) {
            (Some(success), _) => Ok(Self::Success(success)),
            (None, Some(error)) => Ok(Self::Error(error)),
            (None, None) => Err(missing_fields("success")),
        }
    }
}

impl ToolTestReply {
    /// Decode a reply body.
    pub fn from_json(body: &str) -> Result<Self> {
        let raw: RawToolTestReply = serde_json::from_str(body)?;
        match (raw.test_results, raw.error) {
            (Some(results), _) => Ok(Self::Results(results)),
            (None, Some(error)) => Ok(Self::Error(error)),
            (None, None) => Err(missing_fields("test_results")),
        }
    }
}

fn missing_fields(success_field: &str) -> TransportError {
    TransportError::MalformedResponse {
        reason: format!("reply carried neither `{success_field}` nor `error`"),
    }
}

/// Accept any JSON value for a display string; non-strings are rendered as
/// compact JSON.
fn lenient_string<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => s,
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// A missing, null, or non-string status counts as a failure.
fn lenient_status<'de, D>(deserializer: D) -> std::result::Result<ToolStatus, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) if s == "success" => ToolStatus::Success,
        _ => ToolStatus::Failure,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
