//! Document: a buffer bound to a file.
//!
//! A [`Document`] owns the current [`Buffer`], its undo [`History`], the
//! path it was loaded from and what the disk looked like at the time:
//!
//! - `line_ending`: detected on load, used again on save
//! - `disk_time`: modification time seen at the last load or save, `None`
//!   while the file does not exist yet
//! - `changed`: the text differs from what was last loaded or saved
//!
//! Staleness is decided by comparing `disk_time` against the file's current
//! modification time. [`refresh`](Document::refresh) reloads a stale file
//! and [`save`](Document::save) writes when either side moved on. A reload
//! archives the old buffer in history, so it can be undone like an edit.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info};

use crate::buffer::{Buffer, LineEnding};
use crate::change::Change;
use crate::error::Result;
use crate::fs::Filesystem;
use crate::history::History;
use crate::motion::Motion;

/// A buffer plus its file.
#[derive(Debug, Clone)]
pub struct Document {
    path: PathBuf,
    buffer: Buffer,
    history: History,
    line_ending: LineEnding,
    disk_time: Option<SystemTime>,
    changed: bool,
}

impl Document {
    // -- Construction -------------------------------------------------------

    /// Open `path`. A file that does not exist yet opens as one empty line
    /// and is created by the first save.
    pub fn open(
        fs: &dyn Filesystem,
        path: impl Into<PathBuf>,
        history_limit: usize,
    ) -> Result<Self> {
        let mut doc = Self::scratch(path, history_limit);
        match fs.load(&doc.path) {
            Ok(loaded) => {
                doc.line_ending = LineEnding::detect(&loaded.text);
                doc.buffer = Buffer::from_text(&loaded.text);
                doc.disk_time = Some(loaded.modified);
                info!(path = %doc.path.display(), lines = doc.buffer.line_count(), "opened");
            }
            Err(e) if e.is_not_found() => {
                info!(path = %doc.path.display(), "new file");
            }
            Err(e) => return Err(e),
        }
        Ok(doc)
    }

    /// An empty document for `path` that has never touched the disk.
    #[must_use]
    pub fn scratch(path: impl Into<PathBuf>, history_limit: usize) -> Self {
        Self {
            path: path.into(),
            buffer: Buffer::new(),
            history: History::with_limit(history_limit),
            line_ending: LineEnding::default(),
            disk_time: None,
            changed: false,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[inline]
    #[must_use]
    pub const fn buffer(&self) -> &Buffer {
        &self.buffer
    }

    #[inline]
    #[must_use]
    pub const fn history(&self) -> &History {
        &self.history
    }

    #[inline]
    #[must_use]
    pub const fn line_ending(&self) -> LineEnding {
        self.line_ending
    }

    /// Modification time seen at the last load or save.
    #[inline]
    #[must_use]
    pub const fn disk_time(&self) -> Option<SystemTime> {
        self.disk_time
    }

    /// True when the text differs from what was last loaded or saved.
    #[inline]
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        self.changed
    }

    // -- Editing ------------------------------------------------------------

    /// Apply `change`, recording the previous buffer for undo. Returns false
    /// (and records nothing) when the change has no effect.
    pub fn apply(&mut self, change: Change) -> bool {
        let next = change.apply(&self.buffer);
        // Changes only insert or remove chars: same length means same text.
        let edited = next.rope().len_chars() != self.buffer.rope().len_chars();
        if !edited && next.position() == self.buffer.position() {
            return false;
        }
        debug!(?change, position = ?next.position(), "change");
        self.history.record(&self.buffer);
        self.changed |= edited;
        self.buffer = next;
        true
    }

    /// Move the cursor to the motion's target, clamped into the text.
    pub fn move_by(&mut self, motion: Motion) {
        let target = motion.target(&self.buffer);
        self.buffer = self.buffer.clone().place(target);
    }

    /// Restore the state before the last change. Returns false when there is
    /// nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.history.undo(&self.buffer) else {
            return false;
        };
        self.buffer = previous;
        self.changed = true;
        true
    }

    /// Re-apply the last undone change.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.history.redo(&self.buffer) else {
            return false;
        };
        self.buffer = next;
        self.changed = true;
        true
    }

    // -- Disk ---------------------------------------------------------------

    /// Reload from disk if the file changed since it was last seen, or
    /// unconditionally when `force` is set. Returns true when the buffer was
    /// replaced.
    ///
    /// The cursor keeps its position, clamped into the new text. A file
    /// that disappeared leaves the buffer alone and marks it changed so the
    /// next save writes it back.
    pub fn refresh(&mut self, fs: &dyn Filesystem, force: bool) -> Result<bool> {
        let on_disk = fs.modified(&self.path)?;
        if on_disk.is_none() {
            if self.disk_time.take().is_some() {
                info!(path = %self.path.display(), "file removed on disk");
                self.changed = true;
            }
            return Ok(false);
        }
        if on_disk == self.disk_time && !force {
            return Ok(false);
        }

        let loaded = fs.load(&self.path)?;
        let next = Buffer::from_text(&loaded.text).place(self.buffer.position());
        if next != self.buffer {
            self.history.record(&self.buffer);
        }
        self.buffer = next;
        self.line_ending = LineEnding::detect(&loaded.text);
        self.disk_time = Some(loaded.modified);
        self.changed = false;
        info!(path = %self.path.display(), force, "reloaded");
        Ok(true)
    }

    /// Write the buffer if it changed or the file on disk moved on (or does
    /// not exist yet). Returns false when there was nothing to write.
    pub fn save(&mut self, fs: &dyn Filesystem) -> Result<bool> {
        let on_disk = fs.modified(&self.path)?;
        let stale = on_disk.is_none() || on_disk != self.disk_time;
        if !self.changed && !stale {
            return Ok(false);
        }

        let text = self.buffer.text_with(self.line_ending);
        let time = fs.save(&self.path, &text)?;
        self.disk_time = Some(time);
        self.changed = false;
        info!(path = %self.path.display(), bytes = text.len(), "saved");
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
