//! Cursor coordinates and stepping direction.
//!
//! All coordinates are **0-indexed**. Columns count Unicode scalar values
//! (chars), not bytes, which is how `ropey` indexes text. Display layers
//! convert to 1-indexed for the user; that conversion never belongs here.

use std::fmt;

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// A position in a buffer: (line, column), both 0-indexed.
///
/// `col` may equal the line's length; that is the end-of-line insertion
/// point. Positions are plain values: motions return a new one and the
/// editor writes it back explicitly.
///
/// # Ordering
///
/// Lexicographic: line first, then column.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    /// The origin: line 0, column 0.
    pub const ZERO: Self = Self { line: 0, col: 0 };

    /// Create a new position.
    #[inline]
    #[must_use]
    pub const fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }

    /// Same line, different column.
    #[inline]
    #[must_use]
    pub const fn with_col(self, col: usize) -> Self {
        Self { line: self.line, col }
    }

    /// Same column, different line.
    #[inline]
    #[must_use]
    pub const fn with_line(self, line: usize) -> Self {
        Self { line, col: self.col }
    }
}

impl Ord for Position {
    #[inline]
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.line
            .cmp(&other.line)
            .then(self.col.cmp(&other.col))
    }
}

impl PartialOrd for Position {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Pos({}:{})", self.line, self.col)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // 1-indexed for the status line.
        write!(f, "{}:{}", self.line + 1, self.col + 1)
    }
}

// ---------------------------------------------------------------------------
// Direction
// ---------------------------------------------------------------------------

/// Which way a word or paragraph motion travels.
///
/// Represented as a signed step so boundary scans are written once and
/// serve both directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// `+1` for forward, `-1` for backward.
    #[inline]
    #[must_use]
    pub const fn step(self) -> isize {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }

    /// Apply one step to `index`. Returns `None` when stepping backward
    /// from zero.
    #[inline]
    #[must_use]
    pub const fn advance(self, index: usize) -> Option<usize> {
        index.checked_add_signed(self.step())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
