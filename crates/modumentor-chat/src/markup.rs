//! Lightweight inline formatting for chat text.
//!
//! Message text uses a small markdown-like syntax:
//!
//! | Syntax          | Result                               |
//! |-----------------|--------------------------------------|
//! | `[label](url)`  | link opening in a new browsing context |
//! | `**text**`      | strong emphasis                      |
//! | `*text*`        | emphasis                             |
//! | `` `text` ``    | inline code                          |
//! | `\n`            | line break                           |
//!
//! [`parse`] scans the input once, trying the longest delimiter first at each
//! position (`[`, then `**`, then `*`, then `` ` ``), so `**x**` is always
//! strong and never two empty emphasis spans.  Strong, emphasis, and link
//! labels are parsed recursively; code spans are literal.  A delimiter that
//! is unclosed, empty, or would span a line break is kept as literal text.
//!
//! [`format`] renders the tokens as HTML.  All text and attribute values are
//! escaped, and links with an executable url scheme lose their anchor, so
//! untrusted assistant output can be passed in directly.

/// One inline element of formatted chat text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inline {
    /// Plain text.
    Text(String),
    /// `**...**`
    Strong(Vec<Inline>),
    /// `*...*`
    Emphasis(Vec<Inline>),
    /// `` `...` ``, content kept verbatim.
    Code(String),
    /// `[label](url)`
    Link { label: Vec<Inline>, url: String },
    /// A `\n` in the source.
    LineBreak,
}

/// Url schemes that are never rendered as a clickable anchor.
const BLOCKED_SCHEMES: &[&str] = &["javascript:", "vbscript:", "data:"];

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Tokenize raw message text into inline elements.
pub fn parse(raw: &str) -> Vec<Inline> {
    let mut out = Vec::new();
    let mut text = String::new();
    let mut i = 0;

    while i < raw.len() {
        let rest = &raw[i..];
        let matched = match rest.as_bytes()[0] {
            b'[' => parse_link(rest),
            b'*' if rest.starts_with("**") => match delimited(rest, "**") {
                Some((inner, len)) => Some((Inline::Strong(parse(inner)), len)),
                None => {
                    // An unmatched `**` must not be reread as two `*`.
                    text.push_str("**");
                    i += 2;
                    continue;
                }
            },
            b'*' => delimited(rest, "*").map(|(inner, len)| (Inline::Emphasis(parse(inner)), len)),
            b'`' => delimited(rest, "`").map(|(inner, len)| (Inline::Code(inner.to_owned()), len)),
            b'\n' => Some((Inline::LineBreak, 1)),
            _ => None,
        };

        match matched {
            Some((node, len)) => {
                flush_text(&mut text, &mut out);
                out.push(node);
                i += len;
            }
            None => {
                let ch = rest.chars().next().unwrap_or_default();
                text.push(ch);
                i += ch.len_utf8().max(1);
            }
        }
    }

    flush_text(&mut text, &mut out);
    out
}

fn flush_text(text: &mut String, out: &mut Vec<Inline>) {
    if !text.is_empty() {
        out.push(Inline::Text(std::mem::take(text)));
    }
}

/// Match `delim inner delim` at the start of `rest`.
///
/// Returns the inner slice and the total matched length in bytes.
fn delimited<'a>(rest: &'a str, delim: &str) -> Option<(&'a str, usize)> {
    let body = &rest[delim.len()..];
    let end = body.find(delim)?;
    let inner = &body[..end];
    if inner.is_empty() || inner.contains('\n') {
        return None;
    }
    Some((inner, delim.len() * 2 + inner.len()))
}

/// Match `[label](url)` at the start of `rest`.
fn parse_link(rest: &str) -> Option<(Inline, usize)> {
    let body = &rest[1..];
    let label_end = body.find(']')?;
    let label = &body[..label_end];
    if label.is_empty() || label.contains('\n') {
        return None;
    }

    let after = body[label_end + 1..].strip_prefix('(')?;
    let url_end = after.find(')')?;
    let url = &after[..url_end];
    if url.is_empty() || url.contains('\n') {
        return None;
    }

    let len = 1 + label.len() + 2 + url.len() + 1;
    Some((
        Inline::Link {
            label: parse(label),
            url: url.to_owned(),
        },
        len,
    ))
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Convert raw message text into display-safe HTML markup.
pub fn format(raw: &str) -> String {
    render_html(&parse(raw))
}

/// Render parsed inline elements as HTML.
pub fn render_html(nodes: &[Inline]) -> String {
    let mut out = String::new();
    write_html(nodes, &mut out);
    out
}

fn write_html(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text(text) => escape_into(text, out),
            Inline::Strong(children) => {
                out.push_str("<strong>");
                write_html(children, out);
                out.push_str("</strong>");
            }
            Inline::Emphasis(children) => {
                out.push_str("<em>");
                write_html(children, out);
                out.push_str("</em>");
            }
            Inline::Code(code) => {
                out.push_str("<code>");
                escape_into(code, out);
                out.push_str("</code>");
            }
            Inline::Link { label, url } => {
                if is_safe_url(url) {
                    out.push_str("<a href=\"");
                    escape_into(url, out);
                    out.push_str(
                        "\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"chat-link\">",
                    );
                    write_html(label, out);
                    out.push_str("</a>");
                } else {
                    write_html(label, out);
                }
            }
            Inline::LineBreak => out.push_str("<br>"),
        }
    }
}

/// Render parsed inline elements as plain terminal text.
///
/// Delimiters are dropped and links become `label (url)`.
pub fn render_plain(nodes: &[Inline]) -> String {
    let mut out = String::new();
    write_plain(nodes, &mut out);
    out
}

fn write_plain(nodes: &[Inline], out: &mut String) {
    for node in nodes {
        match node {
            Inline::Text(text) | Inline::Code(text) => out.push_str(text),
            Inline::Strong(children) | Inline::Emphasis(children) => write_plain(children, out),
            Inline::Link { label, url } => {
                write_plain(label, out);
                out.push_str(" (");
                out.push_str(url);
                out.push(')');
            }
            Inline::LineBreak => out.push('\n'),
        }
    }
}

/// Whether a link target may be rendered as an anchor.
pub fn is_safe_url(url: &str) -> bool {
    let normalized: String = url
        .trim_start()
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .take(16)
        .collect::<String>()
        .to_ascii_lowercase();
    !BLOCKED_SCHEMES
        .iter()
        .any(|scheme| normalized.starts_with(scheme))
}

fn escape_into(text: &str, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
