//! View: the logical screen handed to the renderer.
//!
//! Modes never draw. They fill in a [`View`]: already-clipped text rows, an
//! optional highlighted row, the status line, the prompt, the message and
//! where the cursor goes. The binary paints that onto a terminal frame, so
//! this crate stays independent of the terminal backend.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │ rows[0]                      │  text area (size.height rows)
//! │ rows[1]   ← highlight        │
//! │ ...                          │
//! │ NORMAL  status   status_right│  status row
//! │ prompt / message             │  last row
//! └──────────────────────────────┘
//! ```
//!
//! Horizontal layout works in display columns: tabs expand to the next tab
//! stop and wide characters take two columns.

use unicode_width::UnicodeWidthChar;

use crate::document::Document;
use crate::mode::{CursorShape, ModeKind};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Display column of char index `char_col` within `chars`.
///
/// Columns past the end of the text continue one display column per char,
/// so a cursor sitting at end of line lands just after the last glyph.
#[must_use]
pub fn display_col<I: Iterator<Item = char>>(chars: I, char_col: usize, tab_width: usize) -> usize {
    let tab_w = tab_width.max(1);
    let mut col = 0;
    let mut seen = 0;

    for ch in chars.take(char_col) {
        col = advance(col, ch, tab_w);
        seen += 1;
    }

    col + (char_col - seen)
}

/// Display width of all of `chars`.
#[must_use]
pub fn display_width<I: Iterator<Item = char>>(chars: I, tab_width: usize) -> usize {
    let tab_w = tab_width.max(1);
    chars.fold(0, |col, ch| advance(col, ch, tab_w))
}

const fn tab_stop(col: usize, tab_w: usize) -> usize {
    (col / tab_w + 1) * tab_w
}

fn advance(col: usize, ch: char, tab_w: usize) -> usize {
    if ch == '\t' {
        tab_stop(col, tab_w)
    } else {
        col + ch.width().unwrap_or(0)
    }
}

/// The slice of `chars` visible between display columns `left` and
/// `left + width`, with tabs expanded to spaces.
///
/// A wide char cut by either edge is replaced by a space so the result is
/// never wider than `width`.
#[must_use]
pub fn clip<I: Iterator<Item = char>>(chars: I, left: usize, width: usize, tab_width: usize) -> String {
    let tab_w = tab_width.max(1);
    let right = left + width;
    let mut out = String::new();
    let mut col = 0;

    for ch in chars {
        if col >= right {
            break;
        }
        if ch == '\t' {
            let next = tab_stop(col, tab_w);
            for c in col..next {
                if c >= left && c < right {
                    out.push(' ');
                }
            }
            col = next;
            continue;
        }

        let w = ch.width().unwrap_or(0);
        if w == 0 {
            continue;
        }
        let end = col + w;
        if col >= left && end <= right {
            out.push(ch);
        } else if end > left {
            // Straddles an edge: pad the visible part.
            for c in col..end {
                if c >= left && c < right {
                    out.push(' ');
                }
            }
        }
        col = end;
    }

    out
}

// ---------------------------------------------------------------------------
// Viewport
// ---------------------------------------------------------------------------

/// Dimensions of the text area, in rows and display columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Size {
    pub width: usize,
    pub height: usize,
}

impl Size {
    #[inline]
    #[must_use]
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// Scroll offsets: the first visible row and the first visible display
/// column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Viewport {
    top: usize,
    left: usize,
}

impl Viewport {
    #[must_use]
    pub const fn new() -> Self {
        Self { top: 0, left: 0 }
    }

    #[inline]
    #[must_use]
    pub const fn top(&self) -> usize {
        self.top
    }

    #[inline]
    #[must_use]
    pub const fn left(&self) -> usize {
        self.left
    }

    pub const fn set_left(&mut self, left: usize) {
        self.left = left;
    }

    /// Scroll the least amount needed to show (`row`, `col`), keeping
    /// `margin` rows of context above and below when the area allows it.
    pub fn follow(&mut self, row: usize, col: usize, size: Size, margin: usize) {
        if size.height == 0 || size.width == 0 {
            return;
        }
        let margin = margin.min(size.height.saturating_sub(1) / 2);

        if row < self.top + margin {
            self.top = row.saturating_sub(margin);
        }
        if row + margin >= self.top + size.height {
            self.top = row + margin + 1 - size.height;
        }

        if col < self.left {
            self.left = col;
        }
        if col >= self.left + size.width {
            self.left = col + 1 - size.width;
        }
    }
}

// ---------------------------------------------------------------------------
// View
// ---------------------------------------------------------------------------

/// Severity of a message-line note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Error,
}

/// A note for the message line. Cleared by the next key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub text: String,
}

impl Message {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: MessageKind::Error,
            text: text.into(),
        }
    }
}

/// Where the terminal cursor goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorPlacement {
    /// In the text area, relative to its top-left corner.
    Text { row: usize, col: usize },
    /// On the prompt line, after `col` display columns of prompt text.
    Prompt { col: usize },
    Hidden,
}

/// Everything the renderer needs for one frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub size: Size,
    pub mode: ModeKind,
    /// Visible text rows, already clipped to `size.width`. May be shorter
    /// than `size.height`.
    pub rows: Vec<String>,
    /// Row (index into `rows`) drawn highlighted.
    pub highlight: Option<usize>,
    pub status: String,
    pub status_right: String,
    pub prompt: String,
    pub message: Option<Message>,
    pub cursor: CursorPlacement,
}

impl View {
    #[must_use]
    pub const fn new(size: Size, mode: ModeKind) -> Self {
        Self {
            size,
            mode,
            rows: Vec::new(),
            highlight: None,
            status: String::new(),
            status_right: String::new(),
            prompt: String::new(),
            message: None,
            cursor: CursorPlacement::Hidden,
        }
    }

    #[inline]
    #[must_use]
    pub const fn cursor_shape(&self) -> CursorShape {
        self.mode.cursor_shape()
    }
}

/// Fill `view` with the document's visible lines, scrolling `viewport` to
/// keep the cursor on screen.
pub fn render_document(
    doc: &Document,
    viewport: &mut Viewport,
    view: &mut View,
    tab_width: usize,
    scroll_margin: usize,
) {
    let buf = doc.buffer();
    let pos = buf.position();
    let cursor_col = buf
        .line(pos.line)
        .map_or(pos.col, |line| display_col(line.chars(), pos.col, tab_width));
    viewport.follow(pos.line, cursor_col, view.size, scroll_margin);

    let last = (viewport.top() + view.size.height).min(buf.line_count());
    view.rows = (viewport.top()..last)
        .filter_map(|i| buf.line(i))
        .map(|line| clip(line.chars(), viewport.left(), view.size.width, tab_width))
        .collect();

    view.cursor = CursorPlacement::Text {
        row: pos.line.saturating_sub(viewport.top()),
        col: cursor_col.saturating_sub(viewport.left()),
    };

    view.status = doc.path().display().to_string();
    if doc.is_changed() {
        view.status.push_str(" [+]");
    }
    view.status_right = format!("{pos}  {}", doc.line_ending());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
