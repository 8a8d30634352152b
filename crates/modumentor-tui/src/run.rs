//! Main event loop for the terminal UI.
//!
//! Sets up the terminal in raw mode with an alternate screen, starts the
//! push channel, runs the draw-and-poll loop, and restores the terminal on
//! exit.

use std::io::{self, IsTerminal};
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;

use modumentor_chat::Transport;
use modumentor_client::{ClientConfig, PushChannel};

use crate::app::{AppAction, TuiApp};
use crate::error::{Result, TuiError};
use crate::ui;

/// Run the terminal UI event loop.
///
/// This function takes ownership of the terminal for the duration of the
/// session.  It enables raw mode and switches to an alternate screen buffer
/// so the user's existing terminal content is preserved.
///
/// # Errors
///
/// Returns a [`TuiError`] if stdout is not a terminal, the push url is
/// invalid, or terminal setup, drawing, or event handling fails.
pub async fn run_tui(config: &ClientConfig, transport: Arc<dyn Transport>) -> Result<()> {
    if !io::stdout().is_terminal() {
        return Err(TuiError::Terminal("stdout is not a terminal".into()));
    }

    let mut app = TuiApp::new(transport, &config.user_id, config.compact_width);
    let push = PushChannel::spawn(
        config.push_url()?,
        config.reconnect_delay(),
        app.event_sender(),
    );

    // Set up the terminal.
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (width, _) = crossterm::terminal::size()?;
    app.set_width(width);

    tracing::info!(user_id = %config.user_id, "TUI event loop started");

    let result = event_loop(&mut terminal, &mut app).await;

    // Restore the terminal regardless of whether the loop succeeded.
    push.shutdown();
    crossterm::terminal::disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("TUI event loop ended");

    result
}

/// The inner event loop, separated so terminal cleanup always runs.
async fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut TuiApp,
) -> Result<()> {
    loop {
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Poll with a short timeout so settlements and push events are
        // applied promptly.
        if event::poll(Duration::from_millis(50))? {
            match event::read()? {
                Event::Key(key)
                    if key.kind == KeyEventKind::Press
                        && app.handle_key(key) == AppAction::Quit =>
                {
                    break;
                }
                Event::Resize(width, _) => app.set_width(width),
                _ => {}
            }
        }

        app.check_events();

        // Yield so spawned dispatch and push tasks make progress on a
        // current-thread runtime.
        tokio::task::yield_now().await;
    }

    Ok(())
}
