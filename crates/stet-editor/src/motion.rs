//! Motions: where the cursor goes next, computed without touching text.
//!
//! A [`Motion`] is a small value. [`Motion::target`] reads a [`Buffer`]
//! snapshot and returns a [`Position`]; the caller decides whether to write
//! it back (the editor does so through [`Buffer::place`], which clamps).
//!
//! | Motion | Normal key | Target |
//! |--------|------------|--------|
//! | `Left` / `Up` | `h` / `k` | one column / line back, stops at 0 |
//! | `Right` / `Down` | `l` / `j` | one column / line ahead, unclamped |
//! | `LineStart` / `LineEnd` | `0` / `$` | column 0 / end of line |
//! | `Word(dir)` | `w` / `b` | next word start in `dir` |
//! | `Paragraph(dir)` | `}` / `{` | next paragraph start in `dir` |
//!
//! # Words and paragraphs
//!
//! A **word start** is a letter or digit that sits in column 0 or right after
//! a non-alphanumeric char. Punctuation is never a word on its own.
//!
//! A **paragraph start** is a non-empty line that is the first line of the
//! buffer or follows an empty line.
//!
//! Both scans step first and test after, so a motion that starts on a
//! boundary finds the next one. Reaching the edge of the buffer without a
//! hit returns the starting position unchanged.

use crate::buffer::Buffer;
use crate::position::{Direction, Position};

// ---------------------------------------------------------------------------
// Motion
// ---------------------------------------------------------------------------

/// A cursor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    LineStart,
    LineEnd,
    Word(Direction),
    Paragraph(Direction),
}

impl Motion {
    /// Compute the target position from the buffer's current cursor.
    #[must_use]
    pub fn target(self, buf: &Buffer) -> Position {
        let pos = buf.position();
        match self {
            Self::Left => pos.with_col(pos.col.saturating_sub(1)),
            Self::Right => pos.with_col(pos.col + 1),
            Self::Up => pos.with_line(pos.line.saturating_sub(1)),
            Self::Down => pos.with_line(pos.line + 1),
            Self::LineStart => pos.with_col(0),
            Self::LineEnd => pos.with_col(buf.line_len(pos.line).unwrap_or(0)),
            Self::Word(dir) => scan(buf, pos, dir, Boundary::Word),
            Self::Paragraph(dir) => scan(buf, pos, dir, Boundary::Paragraph),
        }
    }
}

// ---------------------------------------------------------------------------
// Boundary scanning
// ---------------------------------------------------------------------------

/// What a scan is looking for, and how it steps while looking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Boundary {
    /// Char steps; stop on a word start.
    Word,
    /// Line steps; stop on a paragraph start.
    Paragraph,
}

impl Boundary {
    fn step(self, buf: &Buffer, pos: Position, dir: Direction) -> Option<Position> {
        match self {
            Self::Word => next_char(buf, pos, dir),
            Self::Paragraph => next_line(buf, pos, dir).map(|p| p.with_col(0)),
        }
    }

    fn holds(self, buf: &Buffer, pos: Position) -> bool {
        match self {
            Self::Word => at_word_start(buf, pos),
            Self::Paragraph => at_paragraph_start(buf, pos),
        }
    }
}

/// Step from `start` until `boundary` holds. Soft-fails to `start`.
fn scan(buf: &Buffer, start: Position, dir: Direction, boundary: Boundary) -> Position {
    let mut pos = start;
    loop {
        match boundary.step(buf, pos, dir) {
            Some(next) if boundary.holds(buf, next) => return next,
            Some(next) => pos = next,
            None => return start,
        }
    }
}

/// One character in `dir`, wrapping across line boundaries.
///
/// Forward off the end of a line lands on column 0 of the next line.
/// Backward off column 0 lands on the last char of the previous line (column
/// 0 when that line is empty). Returns `None` at the buffer edge.
fn next_char(buf: &Buffer, pos: Position, dir: Direction) -> Option<Position> {
    if let (Some(len), Some(col)) = (buf.line_len(pos.line), dir.advance(pos.col)) {
        if col < len {
            return Some(pos.with_col(col));
        }
    }

    let next = next_line(buf, pos, dir)?;
    let col = match dir {
        Direction::Forward => 0,
        Direction::Backward => buf.line_len(next.line).map_or(0, |len| len.saturating_sub(1)),
    };
    Some(next.with_col(col))
}

/// One line in `dir`, keeping the column. `None` at the buffer edge.
fn next_line(buf: &Buffer, pos: Position, dir: Direction) -> Option<Position> {
    let line = dir.advance(pos.line)?;
    (line < buf.line_count()).then(|| pos.with_line(line))
}

/// True when `ch` is part of a word.
#[inline]
fn is_word_char(ch: char) -> bool {
    ch.is_alphanumeric()
}

/// A word char in column 0 or after a non-word char.
fn at_word_start(buf: &Buffer, pos: Position) -> bool {
    if !buf.char_at(pos).is_some_and(is_word_char) {
        return false;
    }
    pos.col == 0
        || !buf
            .char_at(pos.with_col(pos.col - 1))
            .is_some_and(is_word_char)
}

/// A non-empty line that is line 0 or follows an empty line.
fn at_paragraph_start(buf: &Buffer, pos: Position) -> bool {
    if buf.line_len(pos.line).unwrap_or(0) == 0 {
        return false;
    }
    pos.line == 0 || buf.line_len(pos.line - 1) == Some(0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
