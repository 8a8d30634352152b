//! CLI argument definitions for ModuMentor.
//!
//! All `clap` structures live here so that `main.rs` stays focused on
//! dispatching subcommands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ModuMentor -- terminal client for the ModuMentor AI assistant.
#[derive(Parser, Debug)]
#[command(
    name = "modumentor",
    version,
    about = "ModuMentor -- chat with the ModuMentor AI assistant",
    long_about = "A terminal client for the ModuMentor assistant service. Without a \
                  subcommand it starts the interactive chat UI.",
    // `help` is an assistant action here; `--help` still prints usage.
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Config file (defaults to config/modumentor.toml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Assistant service base url, overriding config and environment.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// User id sent with every request.
    #[arg(long, global = true)]
    pub user_id: Option<String>,

    /// Write logs to this file.
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Start the interactive terminal UI (default).
    Tui,

    /// Send one chat message and print the reply.
    Send {
        /// The message text.
        message: String,
    },

    /// Ask the assistant for its help text.
    Help,

    /// Run the assistant's tool self-test.
    TestTools,

    /// Ask the assistant to analyze the conversation so far.
    Analyze,

    /// Clear the conversation history on the server.
    Clear,

    /// Render chat markup as HTML.
    Format {
        /// Read from this file instead of stdin.
        #[arg(long, short)]
        input: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
