//! User-initiated actions and their settlements.
//!
//! An [`Action`] is issued against a [`Transport`] and produces exactly one
//! [`Settlement`], whatever happens on the wire.  [`Settlement::resolve`]
//! turns a settlement into the single message the session appends for it.

use std::collections::BTreeMap;
use std::time::Instant;

use tracing::{debug, warn};

use crate::error::Result;
use crate::message::MessageKind;
use crate::notice;
use crate::protocol::{ChatReply, ClearReply, ToolResult, ToolStatus, ToolTestReply};
use crate::transport::Transport;

/// A request the user can trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Send a chat message (already trimmed).
    Chat(String),
    /// Clear the conversation history on the server and locally.
    ClearHistory,
    /// Show help and available commands.
    Help,
    /// Run the tool self-test.
    TestTools,
    /// Analyze the conversation so far.
    AnalyzeConversation,
}

/// The settled result of an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Settlement {
    Chat(Result<ChatReply>),
    ClearHistory(Result<ClearReply>),
    Help(Result<ChatReply>),
    TestTools(Result<ToolTestReply>),
    AnalyzeConversation(Result<ChatReply>),
}

/// How a user action ended, as seen by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A precondition failed and nothing was sent.
    Ignored,
    /// The assistant answered successfully.
    Replied,
    /// The assistant answered with an application-level error.
    Rejected,
    /// The call failed at the transport level.
    Failed,
}

/// The single session mutation a settlement calls for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Empty the local log before appending.
    pub clear_log: bool,
    pub kind: MessageKind,
    pub text: String,
    pub outcome: Outcome,
}

impl Action {
    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Chat(_) => "chat",
            Self::ClearHistory => "clear_history",
            Self::Help => "help",
            Self::TestTools => "test_tools",
            Self::AnalyzeConversation => "analyze_conversation",
        }
    }

    /// Issue the action and wait for it to settle.
    pub async fn dispatch(self, transport: &dyn Transport, user_id: &str) -> Settlement {
        let name = self.name();
        let started = Instant::now();

        let settlement = match self {
            Self::Chat(message) => Settlement::Chat(transport.chat(&message, user_id).await),
            Self::ClearHistory => Settlement::ClearHistory(transport.clear_history(user_id).await),
            Self::Help => Settlement::Help(transport.help(user_id).await),
            Self::TestTools => Settlement::TestTools(transport.test_tools(user_id).await),
            Self::AnalyzeConversation => {
                Settlement::AnalyzeConversation(transport.analyze_conversation(user_id).await)
            }
        };

        debug!(
            action = name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "action settled"
        );
        settlement
    }
}

impl Settlement {
    /// Whether this settles a user chat request (and so ends `pending`).
    pub fn is_chat(&self) -> bool {
        matches!(self, Self::Chat(_))
    }

    /// Decide the message to append for this settlement.
    pub fn resolve(self) -> Resolution {
        match self {
            Self::Chat(result) => resolve_text(result, notice::SEND_FAILED, "chat"),
            Self::Help(result) => resolve_text(result, notice::HELP_FAILED, "help"),
            Self::AnalyzeConversation(result) => {
                resolve_text(result, notice::ANALYZE_FAILED, "analyze_conversation")
            }
            Self::TestTools(result) => match result {
                Ok(ToolTestReply::Results(results)) => bot(tool_report(&results)),
                Ok(ToolTestReply::Error(error)) => rejected(notice::app_error(&error)),
                Err(e) => failed(notice::TEST_TOOLS_FAILED, "test_tools", &e),
            },
            Self::ClearHistory(result) => match result {
                Ok(ClearReply::Success(true)) => Resolution {
                    clear_log: true,
                    kind: MessageKind::System,
                    text: notice::HISTORY_CLEARED.to_owned(),
                    outcome: Outcome::Replied,
                },
                Ok(ClearReply::Success(false)) | Ok(ClearReply::Error(_)) => {
                    rejected(notice::CLEAR_FAILED.to_owned())
                }
                Err(e) => failed(notice::CLEAR_FAILED, "clear_history", &e),
            },
        }
    }
}

/// Build the bot message listing tool self-test results.
pub fn tool_report(results: &BTreeMap<String, ToolResult>) -> String {
    let lines: Vec<String> = results
        .iter()
        .map(|(tool, result)| {
            let mark = match result.status {
                ToolStatus::Success => "✅",
                ToolStatus::Failure => "❌",
            };
            format!("{mark} **{tool}**: {}", result.response)
        })
        .collect();
    format!("{}\n\n{}", notice::TOOL_REPORT_HEADER, lines.join("\n"))
}

fn resolve_text(result: Result<ChatReply>, failure: &str, action: &str) -> Resolution {
    match result {
        Ok(ChatReply::Response(text)) => bot(text),
        Ok(ChatReply::Error(error)) => rejected(notice::app_error(&error)),
        Err(e) => failed(failure, action, &e),
    }
}

fn bot(text: String) -> Resolution {
    Resolution {
        clear_log: false,
        kind: MessageKind::Bot,
        text,
        outcome: Outcome::Replied,
    }
}

fn rejected(text: String) -> Resolution {
    Resolution {
        clear_log: false,
        kind: MessageKind::System,
        text,
        outcome: Outcome::Rejected,
    }
}

fn failed(text: &str, action: &str, error: &crate::error::TransportError) -> Resolution {
    warn!(action, error = %error, "transport call failed");
    Resolution {
        clear_log: false,
        kind: MessageKind::System,
        text: text.to_owned(),
        outcome: Outcome::Failed,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
