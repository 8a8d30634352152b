//! Rendering functions for the TUI layout.
//!
//! The layout consists of three vertically stacked areas:
//!
//! 1. **Header** (1 line) -- app name, connection status, and key hints.
//! 2. **Body** (fills remaining space) -- scrollable chat history, with the
//!    action sidebar on the right.  In compact mode the sidebar is an
//!    overlay drawn only while open.
//! 3. **Input** (3 to 7 lines) -- bordered, multi-line text input field.

use modumentor_chat::markup::{self, Inline};
use modumentor_chat::{Message, MessageKind};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::app::TuiApp;

const SIDEBAR_WIDTH: u16 = 30;
const MAX_INPUT_LINES: u16 = 5;

/// Shown in place of the log while it is empty.
const WELCOME_CARD: &str = "**🎉 Welcome to ModuMentor AI Assistant!**\n\n\
I'm your intelligent AI companion with powerful capabilities:\n\n\
🌤️ **Weather Information** - Get real-time weather data\n\
🎵 **Lyrics Search** - Find song lyrics with professional guidance\n\
🔍 **Web Search** - Professional analysis with clickable links\n\
📧 **Email Management** - Send professional emails\n\
📊 **Conversation Analysis** - Get detailed chat insights\n\n\
*Try asking me anything! For example:*\n\
• \"weather of delhi\"\n\
• \"lyrics of shape of you\"\n\
• \"tell me about artificial intelligence\"\n\
• \"send email to john about project update\"";

/// Sidebar entries: key hint and label.
const ACTIONS: &[(&str, &str)] = &[
    ("F1", "❓ Help & Commands"),
    ("F2", "🔧 Test Tools"),
    ("F3", "📊 Analyze Chat"),
    ("F4", "🗑️ Clear Chat"),
];

// ---------------------------------------------------------------------------
// Public entry point
// ---------------------------------------------------------------------------

/// Draw the entire TUI frame.
pub fn draw(frame: &mut Frame, app: &TuiApp) {
    let input_lines = (app.input().split('\n').count() as u16).clamp(1, MAX_INPUT_LINES);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),               // header
            Constraint::Min(1),                  // body
            Constraint::Length(input_lines + 2), // input
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);

    if app.is_compact() {
        draw_messages(frame, app, chunks[1]);
        if app.sidebar_visible() {
            let width = SIDEBAR_WIDTH.min(chunks[1].width);
            let overlay = Rect {
                x: chunks[1].x + chunks[1].width - width,
                width,
                ..chunks[1]
            };
            frame.render_widget(Clear, overlay);
            draw_sidebar(frame, app, overlay);
        }
    } else {
        let body = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(1), Constraint::Length(SIDEBAR_WIDTH)])
            .split(chunks[1]);
        draw_messages(frame, app, body[0]);
        draw_sidebar(frame, app, body[1]);
    }

    draw_input(frame, app, chunks[2]);
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

fn connection_span(connected: bool) -> Span<'static> {
    if connected {
        Span::styled("🟢 Connected", Style::default().fg(Color::Green))
    } else {
        Span::styled("🔴 Disconnected", Style::default().fg(Color::Red))
    }
}

/// Draw the header bar showing app name, connection, and keybinding hints.
fn draw_header(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let status = if app.state().is_pending() {
        Span::styled(" Typing... ", Style::default().fg(Color::Yellow))
    } else {
        Span::styled(" Ready ", Style::default().fg(Color::Green))
    };

    let header = Line::from(vec![
        Span::styled(
            " 💬 ModuMentor Chat ",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("| "),
        connection_span(app.state().is_connected()),
        Span::raw(" |"),
        status,
        Span::raw("| Ctrl+B menu | Esc to quit "),
    ]);

    let header_widget = Paragraph::new(header).style(Style::default().bg(Color::DarkGray));

    frame.render_widget(header_widget, area);
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

fn kind_prefix(kind: MessageKind) -> (&'static str, Style) {
    match kind {
        MessageKind::User => ("[You] ", Style::default().fg(Color::Cyan)),
        MessageKind::Bot => ("[AI]  ", Style::default().fg(Color::Green)),
        MessageKind::System => (
            "[System] ",
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::DIM),
        ),
    }
}

/// Turn formatted message text into styled terminal lines.
///
/// Links to blocked url schemes keep their label but do not show the url.
pub fn inline_lines(nodes: &[Inline], base: Style) -> Vec<Line<'static>> {
    let mut lines = vec![Vec::new()];
    push_spans(nodes, base, &mut lines);
    lines.into_iter().map(Line::from).collect()
}

fn push_spans(nodes: &[Inline], style: Style, lines: &mut Vec<Vec<Span<'static>>>) {
    for node in nodes {
        match node {
            Inline::Text(text) => current(lines).push(Span::styled(text.clone(), style)),
            Inline::Strong(children) => {
                push_spans(children, style.add_modifier(Modifier::BOLD), lines);
            }
            Inline::Emphasis(children) => {
                push_spans(children, style.add_modifier(Modifier::ITALIC), lines);
            }
            Inline::Code(code) => current(lines).push(Span::styled(
                code.clone(),
                style.fg(Color::Yellow).bg(Color::Black),
            )),
            Inline::Link { label, url } => {
                if markup::is_safe_url(url) {
                    let link = style.fg(Color::Blue).add_modifier(Modifier::UNDERLINED);
                    push_spans(label, link, lines);
                    current(lines).push(Span::styled(
                        format!(" ({url})"),
                        Style::default().fg(Color::DarkGray),
                    ));
                } else {
                    push_spans(label, style, lines);
                }
            }
            Inline::LineBreak => lines.push(Vec::new()),
        }
    }
}

fn current<'a>(lines: &'a mut Vec<Vec<Span<'static>>>) -> &'a mut Vec<Span<'static>> {
    if lines.is_empty() {
        lines.push(Vec::new());
    }
    let last = lines.len() - 1;
    &mut lines[last]
}

/// Lines for one message: a prefix line with the local time, then the
/// formatted text indented below it.
pub fn message_lines(message: &Message) -> Vec<Line<'static>> {
    let (prefix, style) = kind_prefix(message.kind());
    let mut lines = vec![Line::from(vec![
        Span::styled(prefix, style.add_modifier(Modifier::BOLD)),
        Span::styled(message.local_time(), Style::default().fg(Color::DarkGray)),
    ])];

    for line in inline_lines(&markup::parse(message.text()), style) {
        let mut spans = vec![Span::raw("  ")];
        spans.extend(line.spans);
        lines.push(Line::from(spans));
    }
    lines
}

/// Draw the scrollable messages area.
fn draw_messages(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let mut lines: Vec<Line<'_>> = Vec::new();

    let messages = app.state().messages();
    if messages.is_empty() {
        lines.extend(inline_lines(
            &markup::parse(WELCOME_CARD),
            Style::default().fg(Color::Green),
        ));
        lines.push(Line::from(""));
    }

    for message in messages {
        lines.extend(message_lines(message));
        // Add a blank line between messages for readability.
        lines.push(Line::from(""));
    }

    if app.state().is_pending() {
        lines.push(Line::from(vec![Span::styled(
            "  ModuMentor is typing...",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )]));
    }

    // Show the bottom of the conversation by default, with the ability to
    // scroll up.  Rows are counted after wrapping to the inner width.
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false });
    let inner_width = area.width.saturating_sub(2); // account for borders
    let total_rows = u16::try_from(paragraph.line_count(inner_width)).unwrap_or(u16::MAX);
    let visible_height = area.height.saturating_sub(2);
    let max_scroll = total_rows.saturating_sub(visible_height);
    let effective_scroll = max_scroll.saturating_sub(app.scroll_offset());

    let messages_block = Block::default()
        .borders(Borders::ALL)
        .title(" Chat ")
        .border_style(Style::default().fg(Color::DarkGray));

    let messages_widget = paragraph
        .block(messages_block)
        .scroll((effective_scroll, 0));

    frame.render_widget(messages_widget, area);
}

// ---------------------------------------------------------------------------
// Sidebar
// ---------------------------------------------------------------------------

fn draw_sidebar(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let key_style = Style::default()
        .fg(Color::Cyan)
        .add_modifier(Modifier::BOLD);

    let mut lines = vec![
        Line::from(Span::styled(
            "🤖 ModuMentor",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Intelligent AI Assistant",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
    ];
    for (key, label) in ACTIONS {
        lines.push(Line::from(vec![
            Span::styled(format!("{key:<3}"), key_style),
            Span::raw(*label),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(connection_span(app.state().is_connected())));
    lines.push(Line::from(Span::styled(
        format!("User: {}", app.user_id()),
        Style::default().fg(Color::DarkGray),
    )));

    let sidebar = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Actions ")
            .border_style(Style::default().fg(Color::DarkGray)),
    );

    frame.render_widget(sidebar, area);
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Line and column of the cursor within the input text.
fn cursor_location(input: &str, cursor_pos: usize) -> (u16, u16) {
    let before: String = input.chars().take(cursor_pos).collect();
    let row = before.matches('\n').count();
    let col = before
        .rsplit('\n')
        .next()
        .map_or(0, |line| line.chars().count());
    (row as u16, col as u16)
}

/// Vertical and horizontal scroll that keep the cursor cell inside a box of
/// `rows` by `cols`.
fn input_scroll((row, col): (u16, u16), rows: u16, cols: u16) -> (u16, u16) {
    ((row + 1).saturating_sub(rows), (col + 1).saturating_sub(cols))
}

/// Draw the text input area at the bottom.
fn draw_input(frame: &mut Frame, app: &TuiApp, area: Rect) {
    let pending = app.state().is_pending();
    let input_block = Block::default()
        .borders(Borders::ALL)
        .title(if pending {
            " Waiting for reply... "
        } else {
            " Message (Enter to send, Alt+Enter for new line) "
        })
        .border_style(if pending {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default().fg(Color::Cyan)
        });

    let (row, col) = cursor_location(app.input(), app.cursor_pos());
    let (scroll, hscroll) = input_scroll(
        (row, col),
        area.height.saturating_sub(2),
        area.width.saturating_sub(2),
    );

    let input_widget = Paragraph::new(app.input())
        .block(input_block)
        .style(Style::default().fg(Color::White))
        .scroll((scroll, hscroll));

    frame.render_widget(input_widget, area);

    if !pending {
        // +1 for the border offset on each axis.
        let cursor_x = (area.x + 1 + col).saturating_sub(hscroll);
        let cursor_y = (area.y + 1 + row).saturating_sub(scroll);
        frame.set_cursor_position(Position::new(cursor_x, cursor_y));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
