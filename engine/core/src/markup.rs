//! Assistant Markup Formatting
//!
//! Turns raw assistant text into structured lines that any surface can
//! render. Only two constructs are recognized:
//!
//! - numbered list items (`1. Do the thing`)
//! - bold runs delimited by paired double asterisks (`**like this**`)
//!
//! Everything else is passed through as plain text. Formatting is pure:
//! the same input always yields the same output, and the source text is
//! never modified.
//!
//! # Example
//!
//! ```
//! use docdesk_engine::markup::{format, LineKind, Span};
//!
//! let lines = format("1. **Go** to the store");
//! assert_eq!(lines.len(), 1);
//! assert_eq!(lines[0].kind, LineKind::NumberedItem { index: "1".to_string() });
//! assert_eq!(
//!     lines[0].spans,
//!     vec![Span::emphasized("Go"), Span::plain(" to the store")]
//! );
//! ```

use once_cell::sync::Lazy;
use regex::Regex;

/// `<digits>. <rest>` with at least one space and one trailing character
static NUMBERED_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([0-9]+)\.\s+(.+)$").expect("Invalid regex pattern for numbered list item")
});

/// Non-greedy `**...**` run
static BOLD_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\*\*.*?\*\*").expect("Invalid regex pattern for bold run"));

const BOLD_DELIMITER: &str = "**";

/// A run of text with uniform emphasis
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Span {
    /// Text to display, with bold delimiters already stripped
    pub text: String,
    /// Whether the run should be rendered with emphasis
    pub emphasized: bool,
}

impl Span {
    /// Create an unemphasized span
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: false,
        }
    }

    /// Create an emphasized span
    pub fn emphasized(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            emphasized: true,
        }
    }
}

/// What kind of line a [`RenderedLine`] is
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LineKind {
    /// Ordinary text line
    Plain,
    /// Numbered list item
    NumberedItem {
        /// The digits that prefixed the item, without the trailing period
        index: String,
    },
}

/// One line of formatted assistant output
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedLine {
    /// Line kind (plain text or numbered item)
    pub kind: LineKind,
    /// Inline spans, in display order
    pub spans: Vec<Span>,
}

impl RenderedLine {
    /// List index for numbered items, `None` for plain lines
    #[must_use]
    pub fn index(&self) -> Option<&str> {
        match &self.kind {
            LineKind::NumberedItem { index } => Some(index),
            LineKind::Plain => None,
        }
    }

    /// Whether this line is a numbered list item
    #[must_use]
    pub fn is_numbered(&self) -> bool {
        matches!(self.kind, LineKind::NumberedItem { .. })
    }

    /// Concatenated span text with emphasis dropped
    ///
    /// Numbered items are prefixed with their index (`"1. "`) so text-only
    /// surfaces keep the list numbering.
    #[must_use]
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        if let Some(index) = self.index() {
            out.push_str(index);
            out.push_str(". ");
        }
        for span in &self.spans {
            out.push_str(&span.text);
        }
        out
    }
}

/// Format assistant content into rendered lines
///
/// Produces exactly one [`RenderedLine`] per `\n`-delimited segment of
/// `content`, in order. Empty segments yield plain lines with no spans.
#[must_use]
pub fn format(content: &str) -> Vec<RenderedLine> {
    content.split('\n').map(format_line).collect()
}

fn format_line(line: &str) -> RenderedLine {
    if let Some(caps) = NUMBERED_ITEM.captures(line) {
        let index = caps.get(1).map_or("", |m| m.as_str()).to_string();
        let rest = caps.get(2).map_or("", |m| m.as_str());
        return RenderedLine {
            kind: LineKind::NumberedItem { index },
            spans: parse_bold(rest),
        };
    }

    RenderedLine {
        kind: LineKind::Plain,
        spans: parse_bold(line),
    }
}

/// Split a line into emphasized and plain spans
///
/// The line is cut around every complete `**...**` run, keeping the runs as
/// their own pieces. Empty pieces are dropped since they render as nothing.
fn parse_bold(text: &str) -> Vec<Span> {
    let mut pieces = Vec::new();
    let mut last = 0;

    for run in BOLD_RUN.find_iter(text) {
        pieces.push(&text[last..run.start()]);
        pieces.push(run.as_str());
        last = run.end();
    }
    pieces.push(&text[last..]);

    pieces
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .map(classify_piece)
        .collect()
}

fn classify_piece(piece: &str) -> Span {
    let delimited = piece.len() >= BOLD_DELIMITER.len() * 2
        && piece.starts_with(BOLD_DELIMITER)
        && piece.ends_with(BOLD_DELIMITER);

    if delimited {
        let inner = &piece[BOLD_DELIMITER.len()..piece.len() - BOLD_DELIMITER.len()];
        Span::emphasized(inner)
    } else {
        Span::plain(piece)
    }
}

/// Shorten `text` to at most `max_chars` characters, marking the cut with `...`
///
/// Text that already fits is returned unchanged.
#[must_use]
pub fn truncate_preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}
