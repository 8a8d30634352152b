//! Fixed texts of the system and bot notices the session appends.

pub const WELCOME: &str = "🎉 Welcome to ModuMentor AI Assistant! I'm here to help you with \
                           weather, lyrics, web searches, emails, and much more. How can I \
                           assist you today?";

pub const CONNECTION_LOST: &str = "⚠️ Connection lost. Trying to reconnect...";

pub const SEND_FAILED: &str = "❌ Failed to send message. Please try again.";
pub const HELP_FAILED: &str = "❌ Failed to get help information";
pub const TEST_TOOLS_FAILED: &str = "❌ Failed to test tools";
pub const ANALYZE_FAILED: &str = "❌ Failed to analyze conversation";
pub const CLEAR_FAILED: &str = "❌ Failed to clear chat history";

pub const HISTORY_CLEARED: &str = "🗑️ Chat history cleared successfully!";

pub const TOOL_REPORT_HEADER: &str = "🔧 **Tool Test Results:**";

/// Prefix an application-level error reported by the assistant.
pub fn app_error(error: &str) -> String {
    format!("❌ Error: {error}")
}
