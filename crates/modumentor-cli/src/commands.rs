//! Subcommand implementations.
//!
//! One-shot commands run a single action against a fresh session and print
//! every message it ends with.  Action failures are printed like any other
//! message; only setup problems make a command fail.

use std::io::{self, Read};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use modumentor_chat::{Action, Message, SessionState, markup};
use modumentor_client::{ClientConfig, HttpTransport};
use tracing::info;

// ---------------------------------------------------------------------------
// Subcommand: tui
// ---------------------------------------------------------------------------

pub async fn cmd_tui(config: &ClientConfig) -> Result<()> {
    let transport = HttpTransport::new(config).context("failed to build HTTP client")?;
    modumentor_tui::run_tui(config, Arc::new(transport))
        .await
        .context("terminal UI failed")
}

// ---------------------------------------------------------------------------
// One-shot actions
// ---------------------------------------------------------------------------

pub async fn cmd_action(config: &ClientConfig, action: Action) -> Result<()> {
    let transport = HttpTransport::new(config).context("failed to build HTTP client")?;
    let mut state = SessionState::new();

    let name = action.name();
    let outcome = state.run_action(&transport, &config.user_id, action).await;
    info!(action = name, ?outcome, "action finished");

    for message in state.messages() {
        println!("{}", render_message(message));
    }
    Ok(())
}

/// `[HH:MM:SS] kind: text`, with markup flattened to plain text.
fn render_message(message: &Message) -> String {
    let text = markup::render_plain(&markup::parse(message.text()));
    format!("[{}] {}: {}", message.local_time(), message.kind(), text)
}

// ---------------------------------------------------------------------------
// Subcommand: format
// ---------------------------------------------------------------------------

pub fn cmd_format(input: Option<&Path>) -> Result<()> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut raw = String::new();
            io::stdin()
                .read_to_string(&mut raw)
                .context("failed to read stdin")?;
            raw
        }
    };

    println!("{}", markup::format(raw.trim_end_matches('\n')));
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
