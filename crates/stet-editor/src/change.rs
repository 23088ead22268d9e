//! Changes: discrete edits from one buffer state to the next.
//!
//! A [`Change`] is a value; [`Change::apply`] reads a [`Buffer`] and returns
//! a new one. The input is never modified, so the previous state can simply
//! be kept around for undo (see [`History`](crate::history::History)).
//!
//! Every change is total: any buffer, including one whose cursor sits past
//! the text, yields a buffer whose cursor is back inside it. Only
//! [`InsertChar`](Change::InsertChar) grows the text to reach the cursor;
//! everything else clamps.
//!
//! No change rewrites a char in place. The text either stays the same or
//! its length in chars moves, which lets callers detect an edit without
//! comparing whole ropes.

use crate::buffer::Buffer;
use crate::position::Position;

/// An editing operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    /// Insert a char at the cursor and move past it. Inserting past the text
    /// first appends empty lines and pads the line with spaces. `'\n'`
    /// splits the line instead.
    InsertChar(char),
    /// Delete the char under the cursor. No-op at end of line.
    DeleteChar,
    /// Delete the char left of the cursor. No-op in column 0.
    DeletePreviousChar,
    /// Delete the cursor's line. The cursor keeps its line index, clamped.
    DeleteLine,
    /// Break the line at the cursor; the cursor moves to the new line.
    SplitLine,
    /// Pull the next line up onto the cursor's line.
    JoinLine,
}

impl Change {
    /// Apply the change to `buf`, returning the edited buffer.
    #[must_use]
    pub fn apply(self, buf: &Buffer) -> Buffer {
        match self {
            Self::InsertChar('\n') | Self::SplitLine => split_line(buf),
            Self::InsertChar(ch) => insert_char(buf, ch),
            Self::DeleteChar => delete_char(buf),
            Self::DeletePreviousChar => delete_previous_char(buf),
            Self::DeleteLine => delete_line(buf),
            Self::JoinLine => join_line(buf),
        }
    }
}

fn insert_char(buf: &Buffer, ch: char) -> Buffer {
    let pos = buf.position();
    buf.clone()
        .insert_char(pos, ch)
        .at(pos.with_col(pos.col + 1))
}

fn delete_char(buf: &Buffer) -> Buffer {
    let pos = buf.position();
    buf.clone().remove_char(pos).place(pos)
}

fn delete_previous_char(buf: &Buffer) -> Buffer {
    let pos = buf.clamp(buf.position());
    if pos.col == 0 {
        return buf.clone().place(pos);
    }
    let prev = pos.with_col(pos.col - 1);
    buf.clone().remove_char(prev).at(prev)
}

fn delete_line(buf: &Buffer) -> Buffer {
    let pos = buf.position();
    buf.clone().remove_line(pos.line).place(pos)
}

fn split_line(buf: &Buffer) -> Buffer {
    let pos = buf.clamp(buf.position());
    buf.clone()
        .split_line(pos)
        .at(Position::new(pos.line + 1, 0))
}

fn join_line(buf: &Buffer) -> Buffer {
    let pos = buf.clamp(buf.position());
    if pos.line + 1 >= buf.line_count() {
        return buf.clone().place(pos);
    }
    let len = buf.line_len(pos.line).unwrap_or(0);
    buf.clone().join_line(pos.line).at(pos.with_col(len))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
