//! Shared helper functions used across CLI subcommands.
//!
//! Includes tracing initialization and configuration resolution.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use modumentor_client::ClientConfig;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize the tracing subscriber with the given default log level.
pub fn init_tracing(default_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(default_level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

/// Initialize tracing that appends to `path` without ANSI colours.
pub fn init_file_tracing(path: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("failed to open log file {}", path.display()))?;

    tracing_subscriber::fmt()
        .with_env_filter(env_filter("info"))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .compact()
        .init();
    Ok(())
}

/// Initialize tracing for the terminal UI when no log file is given.
///
/// The UI owns the screen, so logs are written to stderr only if `RUST_LOG`
/// asks for them.
pub fn init_tui_tracing() {
    if std::env::var_os("RUST_LOG").is_some() {
        init_tracing("off");
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Load a `.env` file into the process environment: `path`, or `.env` in
/// the working directory or a parent.  A missing file is not an error.
///
/// Runs before tracing is initialized so that `RUST_LOG` and the
/// `MODUMENTOR_*` overrides in it take effect.
pub fn load_dotenv(path: Option<&Path>) -> Option<dotenvy::Error> {
    let loaded = match path {
        Some(path) => dotenvy::from_path(path),
        None => dotenvy::dotenv().map(|_| ()),
    };
    loaded.err().filter(|e| !e.not_found())
}

/// Resolve the client config: file, environment (including a loaded
/// `.env`), then CLI flags.
pub fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config =
        ClientConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    apply_flags(&mut config, cli);
    config.validate().context("invalid configuration")?;
    Ok(config)
}

fn apply_flags(config: &mut ClientConfig, cli: &Cli) {
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(user_id) = &cli.user_id {
        config.user_id = user_id.clone();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
