//! Undo/redo history: snapshot-based.
//!
//! Every [`Change`](crate::change::Change) produces a new [`Buffer`] and
//! leaves the old one intact, so history does not need reversible edit
//! records. It keeps two stacks of whole-buffer snapshots:
//!
//! - **undo**: the buffer as it was *before* each committed change
//! - **redo**: buffers that were undone, newest on top
//!
//! ```text
//! history.record(&before);   // just before committing a change
//! let restored = history.undo(current)?;
//! let again    = history.redo(restored)?;
//! ```
//!
//! Snapshots are cheap: ropey shares unchanged tree nodes between clones.
//! The undo stack is capped; once full, the oldest snapshot is dropped.

use std::collections::VecDeque;

use crate::buffer::Buffer;

/// Default number of undo steps kept.
pub const DEFAULT_LIMIT: usize = 1000;

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------

/// Undo/redo stacks of buffer snapshots.
///
/// Recording a new snapshot clears the redo stack; there is no branching
/// history.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Buffer>,
    redo_stack: Vec<Buffer>,
    limit: usize,
}

impl History {
    /// Empty history with the default limit.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT)
    }

    /// Empty history keeping at most `limit` undo steps. A limit of zero is
    /// raised to one.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// Maximum undo depth.
    #[inline]
    #[must_use]
    pub const fn limit(&self) -> usize {
        self.limit
    }

    /// Push the buffer as it was before a change. Clears the redo stack.
    pub fn record(&mut self, before: &Buffer) {
        if self.undo_stack.len() == self.limit {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(before.clone());
        self.redo_stack.clear();
    }

    /// Step back. `current` goes onto the redo stack and the newest snapshot
    /// comes back. `None` when there is nothing to undo.
    pub fn undo(&mut self, current: &Buffer) -> Option<Buffer> {
        let previous = self.undo_stack.pop_back()?;
        self.redo_stack.push(current.clone());
        Some(previous)
    }

    /// Step forward again after an undo.
    pub fn redo(&mut self, current: &Buffer) -> Option<Buffer> {
        let next = self.redo_stack.pop()?;
        if self.undo_stack.len() == self.limit {
            self.undo_stack.pop_front();
        }
        self.undo_stack.push_back(current.clone());
        Some(next)
    }

    /// True when [`undo`](Self::undo) would return a snapshot.
    #[inline]
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// True when [`redo`](Self::redo) would return a snapshot.
    #[inline]
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo steps available.
    #[inline]
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redo steps available.
    #[inline]
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
