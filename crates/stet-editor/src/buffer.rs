//! Text buffer: lines of characters plus the cursor position.
//!
//! A `Buffer` wraps a [`ropey::Rope`] holding every line joined by `\n`,
//! and the current cursor [`Position`]. It is a *value*: edit primitives
//! take the buffer by value and hand back the edited one, so a clone taken
//! before an edit stays intact. Cloning is cheap because ropey shares tree
//! nodes between clones, which is what makes snapshot-based undo affordable.
//!
//! # Design choices
//!
//! - **LF only inside the rope.** ropey is built without `cr_lines` and
//!   `unicode_lines`, so `\n` is the only line break it recognises. Text is
//!   normalised on the way in; the file's own line ending is remembered by
//!   the document and restored on save.
//!
//! - **At least one line.** An empty rope is one empty line. There is no
//!   "zero lines" state to special-case.
//!
//! - **Columns are char offsets.** Byte offsets never leak into the API.
//!
//! - **Total primitives.** Every primitive accepts any position. Out of range
//!   requests are no-ops, except [`extend_to`](Buffer::extend_to) which grows
//!   the text to reach the position.

use std::fmt;

use ropey::{Rope, RopeSlice};

use crate::position::Position;

/// Character used to pad a line when inserting past its end.
pub const FILL: char = ' ';

// ---------------------------------------------------------------------------
// Line ending detection
// ---------------------------------------------------------------------------

/// Line ending style of a file.
///
/// Detected on load by scanning the first occurrence. Defaults to `Lf` for
/// new files.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// `\n`: Unix, macOS, Linux.
    #[default]
    Lf,
    /// `\r\n`: Windows, DOS.
    CrLf,
    /// `\r`: Classic Mac. Rare but we handle it.
    Cr,
}

impl LineEnding {
    /// The string representation of this line ending.
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Detect the line ending of `text` from its first occurrence. Returns
    /// `Lf` if there is none.
    #[must_use]
    pub fn detect(text: &str) -> Self {
        let bytes = text.as_bytes();
        for (i, &byte) in bytes.iter().enumerate() {
            match byte {
                b'\n' => return Self::Lf,
                b'\r' if bytes.get(i + 1) == Some(&b'\n') => return Self::CrLf,
                b'\r' => return Self::Cr,
                _ => {}
            }
        }
        Self::Lf
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lf => f.write_str("LF"),
            Self::CrLf => f.write_str("CRLF"),
            Self::Cr => f.write_str("CR"),
        }
    }
}

/// Rewrite every `\r\n`, `\r` and `\n` in `text` as `target`.
#[must_use]
pub fn normalize_line_endings(text: &str, target: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\r' => {
                result.push_str(target);
                // \r\n is one line ending, not two.
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
            }
            '\n' => result.push_str(target),
            _ => result.push(ch),
        }
    }

    result
}

// ---------------------------------------------------------------------------
// Buffer
// ---------------------------------------------------------------------------

/// Lines of text and a cursor position.
///
/// See the [module docs](self) for the invariants. Two buffers compare equal
/// when both their text and their cursor position match.
#[derive(Clone, PartialEq, Eq)]
pub struct Buffer {
    rope: Rope,
    position: Position,
}

impl Buffer {
    // -- Construction -------------------------------------------------------

    /// One empty line, cursor at the origin.
    #[must_use]
    pub fn new() -> Self {
        Self {
            rope: Rope::new(),
            position: Position::ZERO,
        }
    }

    /// Build a buffer from raw text. Any line ending style is accepted and
    /// stored as `\n`.
    #[must_use]
    pub fn from_text(text: &str) -> Self {
        let rope = if text.contains('\r') {
            Rope::from_str(&normalize_line_endings(text, "\n"))
        } else {
            Rope::from_str(text)
        };
        Self {
            rope,
            position: Position::ZERO,
        }
    }

    /// Build a buffer from individual lines (without line endings).
    #[must_use]
    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = lines
            .into_iter()
            .map(|line| line.as_ref().to_owned())
            .collect::<Vec<_>>()
            .join("\n");
        Self::from_text(&joined)
    }

    // -- Text access --------------------------------------------------------

    /// The underlying rope (lines joined by `\n`).
    #[inline]
    #[must_use]
    pub const fn rope(&self) -> &Rope {
        &self.rope
    }

    /// Number of lines. Never zero.
    #[inline]
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    /// True when the buffer is a single empty line.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rope.len_chars() == 0
    }

    /// Content of a line, without its line break. `None` past the last line.
    #[must_use]
    pub fn line(&self, line: usize) -> Option<RopeSlice<'_>> {
        if line >= self.rope.len_lines() {
            return None;
        }
        let slice = self.rope.line(line);
        let len = slice.len_chars();
        if len > 0 && slice.char(len - 1) == '\n' {
            Some(slice.slice(..len - 1))
        } else {
            Some(slice)
        }
    }

    /// Number of chars in a line, excluding the line break. `None` past the
    /// last line.
    #[inline]
    #[must_use]
    pub fn line_len(&self, line: usize) -> Option<usize> {
        self.line(line).map(|l| l.len_chars())
    }

    /// The character at `pos`, or `None` if `pos` does not sit on one (past
    /// the last line, or at/after the end of its line).
    #[must_use]
    pub fn char_at(&self, pos: Position) -> Option<char> {
        let line = self.line(pos.line)?;
        (pos.col < line.len_chars()).then(|| line.char(pos.col))
    }

    /// Iterate over every line's content.
    pub fn lines(&self) -> impl Iterator<Item = RopeSlice<'_>> + '_ {
        (0..self.line_count()).filter_map(|i| self.line(i))
    }

    /// Collect every line into owned strings.
    #[must_use]
    pub fn to_lines(&self) -> Vec<String> {
        self.lines().map(|l| l.to_string()).collect()
    }

    /// The text with lines joined by `ending`. No line ending is appended
    /// after the last line.
    #[must_use]
    pub fn text_with(&self, ending: LineEnding) -> String {
        match ending {
            LineEnding::Lf => self.rope.to_string(),
            other => {
                let mut out = String::with_capacity(self.rope.len_bytes());
                for (i, line) in self.lines().enumerate() {
                    if i > 0 {
                        out.push_str(other.as_str());
                    }
                    out.extend(line.chars());
                }
                out
            }
        }
    }

    // -- Cursor -------------------------------------------------------------

    /// The cursor position.
    #[inline]
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Nearest position that satisfies the buffer invariants: line clamped
    /// to the last line, column clamped to that line's length.
    #[must_use]
    pub fn clamp(&self, pos: Position) -> Position {
        let line = pos.line.min(self.line_count() - 1);
        let col = pos.col.min(self.line_len(line).unwrap_or(0));
        Position::new(line, col)
    }

    /// The same text with the cursor moved to `pos`, clamped.
    #[must_use]
    pub fn place(mut self, pos: Position) -> Self {
        self.position = self.clamp(pos);
        self
    }

    /// The same text with the cursor set to `pos` exactly, even if it lies
    /// past the text. Edits resolve such positions by clamping or extension.
    #[must_use]
    pub const fn at(mut self, pos: Position) -> Self {
        self.position = pos;
        self
    }

    /// True when the cursor satisfies the invariants (see [`clamp`](Self::clamp)).
    #[must_use]
    pub fn position_is_valid(&self) -> bool {
        self.clamp(self.position) == self.position
    }

    // -- Coordinate conversion ----------------------------------------------

    /// Absolute char index of `pos` in the rope, if `pos` is within the text
    /// (a column equal to the line length is allowed).
    #[must_use]
    pub fn char_idx(&self, pos: Position) -> Option<usize> {
        let len = self.line_len(pos.line)?;
        (pos.col <= len).then(|| self.rope.line_to_char(pos.line) + pos.col)
    }

    // -- Edit primitives ----------------------------------------------------
    //
    // These touch only the text. Cursor bookkeeping belongs to `Change`.

    /// Grow the text until `pos` is a valid insertion point: append empty
    /// lines up to `pos.line`, then pad that line with [`FILL`] up to
    /// `pos.col`. A position already inside the text is left alone.
    #[must_use]
    pub fn extend_to(mut self, pos: Position) -> Self {
        while self.line_count() <= pos.line {
            let end = self.rope.len_chars();
            self.rope.insert_char(end, '\n');
        }
        let len = self.line_len(pos.line).unwrap_or(0);
        if pos.col > len {
            let idx = self.rope.line_to_char(pos.line) + len;
            let pad: String = std::iter::repeat_n(FILL, pos.col - len).collect();
            self.rope.insert(idx, &pad);
        }
        self
    }

    /// Insert `ch` at `pos`, extending the text first if needed.
    #[must_use]
    pub fn insert_char(self, pos: Position, ch: char) -> Self {
        let mut buf = self.extend_to(pos);
        if let Some(idx) = buf.char_idx(pos) {
            buf.rope.insert_char(idx, ch);
        }
        buf
    }

    /// Remove the char at `pos`. No-op if `pos` is not on a char.
    #[must_use]
    pub fn remove_char(mut self, pos: Position) -> Self {
        if self.char_at(pos).is_some() {
            if let Some(idx) = self.char_idx(pos) {
                self.rope.remove(idx..=idx);
            }
        }
        self
    }

    /// Remove a whole line, including its line break. Removing the only line
    /// leaves a single empty line. No-op past the last line.
    #[must_use]
    pub fn remove_line(mut self, line: usize) -> Self {
        let count = self.line_count();
        if line >= count {
            return self;
        }
        if count == 1 {
            self.rope = Rope::new();
            return self;
        }

        let start = self.rope.line_to_char(line);
        if line + 1 < count {
            let end = self.rope.line_to_char(line + 1);
            self.rope.remove(start..end);
        } else {
            // Last line: take the preceding break with it.
            let end = self.rope.len_chars();
            self.rope.remove(start - 1..end);
        }
        self
    }

    /// Break the line at `pos`. The column is clamped to the line length;
    /// past the last line this is a no-op.
    #[must_use]
    pub fn split_line(mut self, pos: Position) -> Self {
        let Some(len) = self.line_len(pos.line) else {
            return self;
        };
        let at = pos.with_col(pos.col.min(len));
        if let Some(idx) = self.char_idx(at) {
            self.rope.insert_char(idx, '\n');
        }
        self
    }

    /// Join `line` with the line after it. No-op on or past the last line.
    #[must_use]
    pub fn join_line(mut self, line: usize) -> Self {
        if line + 1 >= self.line_count() {
            return self;
        }
        let idx = self.rope.line_to_char(line + 1) - 1;
        self.rope.remove(idx..=idx);
        self
    }
}

impl Default for Buffer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("lines", &self.to_lines())
            .field("position", &self.position)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
