//! Main TUI application state and input handling.
//!
//! [`TuiApp`] owns the [`SessionState`] together with the input buffer,
//! scroll state, and layout mode.  Actions run on background tasks through a
//! [`Dispatcher`]; their settlements and push channel events arrive on a
//! [`tokio::sync::mpsc`] channel that [`TuiApp::check_events`] drains.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;

use modumentor_chat::{Action, Dispatcher, SessionEvent, SessionState, Transport};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Actions the UI loop should take after processing a key event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppAction {
    /// Continue the main loop.
    Continue,
    /// Exit the application.
    Quit,
}

// ---------------------------------------------------------------------------
// TuiApp
// ---------------------------------------------------------------------------

/// The main TUI application state.
pub struct TuiApp {
    /// Chat log and session flags.
    state: SessionState,
    /// Current text in the input field.
    input: String,
    /// Cursor position within the input field, in characters.
    cursor_pos: usize,
    /// Vertical scroll offset for the messages area, counted from the bottom.
    scroll_offset: u16,
    /// Whether the terminal is at most `compact_width` columns wide.
    compact: bool,
    compact_width: u16,
    /// Issues actions on background tasks.
    dispatcher: Dispatcher,
    /// Settlements and push events waiting to be applied.
    event_rx: mpsc::UnboundedReceiver<SessionEvent>,
}

impl TuiApp {
    /// Create a TUI application talking to `transport` as `user_id`.
    pub fn new(transport: Arc<dyn Transport>, user_id: &str, compact_width: u16) -> Self {
        let (dispatcher, event_rx) = Dispatcher::new(transport, user_id);
        Self {
            state: SessionState::new(),
            input: String::new(),
            cursor_pos: 0,
            scroll_offset: 0,
            compact: false,
            compact_width,
            dispatcher,
            event_rx,
        }
    }

    // -- Accessors ----------------------------------------------------------

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Return the current input text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Return the cursor position within the input, in characters.
    pub fn cursor_pos(&self) -> usize {
        self.cursor_pos
    }

    /// Return the current scroll offset.
    pub fn scroll_offset(&self) -> u16 {
        self.scroll_offset
    }

    pub fn user_id(&self) -> &str {
        self.dispatcher.user_id()
    }

    pub fn is_compact(&self) -> bool {
        self.compact
    }

    /// The sidebar is always shown in wide mode and on demand in compact mode.
    pub fn sidebar_visible(&self) -> bool {
        !self.compact || self.state.is_sidebar_open()
    }

    /// A sender for events from outside the app, such as the push channel.
    pub fn event_sender(&self) -> mpsc::UnboundedSender<SessionEvent> {
        self.dispatcher.sender()
    }

    // -- Layout -------------------------------------------------------------

    /// Record the terminal width.  Entering compact mode closes the sidebar.
    pub fn set_width(&mut self, width: u16) {
        let compact = width <= self.compact_width;
        if compact && !self.compact {
            self.state.set_sidebar_open(false);
        }
        self.compact = compact;
    }

    // -- Key handling -------------------------------------------------------

    /// Handle a key event and return the action the UI should take.
    pub fn handle_key(&mut self, key: KeyEvent) -> AppAction {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && key.code == KeyCode::Char('c') {
            return AppAction::Quit;
        }
        if key.code == KeyCode::Esc {
            // In compact mode Esc first dismisses the sidebar overlay.
            if self.compact && self.state.is_sidebar_open() {
                self.state.set_sidebar_open(false);
                return AppAction::Continue;
            }
            return AppAction::Quit;
        }

        match key.code {
            KeyCode::Char('b') if ctrl => self.state.toggle_sidebar(),
            KeyCode::Char('l') if ctrl => self.run_action(Action::ClearHistory),
            KeyCode::F(1) => self.run_action(Action::Help),
            KeyCode::F(2) => self.run_action(Action::TestTools),
            KeyCode::F(3) => self.run_action(Action::AnalyzeConversation),
            KeyCode::F(4) => self.run_action(Action::ClearHistory),
            KeyCode::Up => self.scroll_up(1),
            KeyCode::Down => self.scroll_down(1),
            KeyCode::PageUp => self.scroll_up(10),
            KeyCode::PageDown => self.scroll_down(10),
            _ if self.state.is_pending() => {}
            KeyCode::Enter
                if key
                    .modifiers
                    .intersects(KeyModifiers::ALT | KeyModifiers::SHIFT) =>
            {
                self.insert_char('\n');
            }
            KeyCode::Enter => self.submit_input(),
            KeyCode::Char(c) if !ctrl => self.insert_char(c),
            KeyCode::Backspace => {
                if self.cursor_pos > 0 {
                    self.cursor_pos -= 1;
                    let at = self.byte_index(self.cursor_pos);
                    self.input.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor_pos < self.input_len() {
                    let at = self.byte_index(self.cursor_pos);
                    self.input.remove(at);
                }
            }
            KeyCode::Left => {
                self.cursor_pos = self.cursor_pos.saturating_sub(1);
            }
            KeyCode::Right => {
                if self.cursor_pos < self.input_len() {
                    self.cursor_pos += 1;
                }
            }
            KeyCode::Home => {
                self.cursor_pos = 0;
            }
            KeyCode::End => {
                self.cursor_pos = self.input_len();
            }
            _ => {}
        }

        AppAction::Continue
    }

    // -- Input editing ------------------------------------------------------

    fn insert_char(&mut self, c: char) {
        let at = self.byte_index(self.cursor_pos);
        self.input.insert(at, c);
        self.cursor_pos += 1;
    }

    fn input_len(&self) -> usize {
        self.input.chars().count()
    }

    /// Byte offset of the `char_pos`-th character of the input.
    fn byte_index(&self, char_pos: usize) -> usize {
        self.input
            .char_indices()
            .nth(char_pos)
            .map_or(self.input.len(), |(i, _)| i)
    }

    // -- Scrolling ----------------------------------------------------------

    fn scroll_up(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_add(lines);
    }

    fn scroll_down(&mut self, lines: u16) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    // -- Dispatch -----------------------------------------------------------

    /// Submit the current input as a chat message.
    fn submit_input(&mut self) {
        let Some(action) = self.state.begin_chat(&self.input) else {
            return;
        };

        self.input.clear();
        self.cursor_pos = 0;
        self.scroll_offset = 0;
        if self.compact {
            self.state.set_sidebar_open(false);
        }
        self.dispatcher.spawn(action);
    }

    fn run_action(&mut self, action: Action) {
        tracing::debug!(action = action.name(), "utility action requested");
        self.scroll_offset = 0;
        self.dispatcher.spawn(action);
    }

    // -- Event polling ------------------------------------------------------

    /// Apply every settlement and push event that has arrived.
    ///
    /// Should be called on every iteration of the main UI loop.
    pub fn check_events(&mut self) {
        while let Ok(event) = self.event_rx.try_recv() {
            self.apply(event);
        }
    }

    fn apply(&mut self, event: SessionEvent) {
        if let Some(outcome) = self.state.apply(event) {
            tracing::debug!(?outcome, "action settled");
        }
        self.scroll_offset = 0;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
