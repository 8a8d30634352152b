//! The transport seam between the chat session and the assistant service.
//!
//! [`Transport`] is implemented by the HTTP client in `modumentor-client`
//! and by scripted fakes in tests.  Every method is a single attempt: no
//! retries happen at this layer.

use async_trait::async_trait;

use crate::error::Result;
use crate::protocol::{ChatReply, ClearReply, ToolTestReply};

/// Request/response calls offered by the assistant service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a user chat message.
    async fn chat(&self, message: &str, user_id: &str) -> Result<ChatReply>;

    /// Ask the service to forget this user's conversation history.
    async fn clear_history(&self, user_id: &str) -> Result<ClearReply>;

    /// Fetch help and command information.
    async fn help(&self, user_id: &str) -> Result<ChatReply>;

    /// Run the service's tool self-test.
    async fn test_tools(&self, user_id: &str) -> Result<ToolTestReply>;

    /// Ask for an analysis of the conversation so far.
    async fn analyze_conversation(&self, user_id: &str) -> Result<ChatReply>;
}
