//! CLI entry point for ModuMentor.
//!
//! This binary provides the `modumentor` command: the interactive terminal
//! UI by default, plus one-shot subcommands for each assistant action and a
//! markup formatter.

mod cli;
mod commands;
mod helpers;

use anyhow::Result;
use clap::Parser;
use modumentor_chat::Action;
use tracing::warn;

use crate::cli::{Cli, Commands};
use crate::helpers::{
    init_file_tracing, init_tracing, init_tui_tracing, load_dotenv, resolve_config,
};

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.clone().unwrap_or(Commands::Tui);

    // `.env` may set RUST_LOG, so it is read before tracing starts.
    let dotenv_error = load_dotenv(None);

    match (&command, cli.log_file.as_deref()) {
        (_, Some(path)) => init_file_tracing(path)?,
        (Commands::Tui, None) => init_tui_tracing(),
        _ => init_tracing("warn"),
    }

    if let Some(e) = dotenv_error {
        warn!(error = %e, "failed to read .env");
    }

    let action = match command {
        Commands::Format { input } => return commands::cmd_format(input.as_deref()),
        Commands::Tui => {
            let config = resolve_config(&cli)?;
            return commands::cmd_tui(&config).await;
        }
        Commands::Send { message } => Action::Chat(message),
        Commands::Help => Action::Help,
        Commands::TestTools => Action::TestTools,
        Commands::Analyze => Action::AnalyzeConversation,
        Commands::Clear => Action::ClearHistory,
    };

    let config = resolve_config(&cli)?;
    commands::cmd_action(&config, action).await
}
