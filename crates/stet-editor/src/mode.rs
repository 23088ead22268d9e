//! Modal input dispatch.
//!
//! The editor is always in exactly one mode. Each mode interprets keys on
//! its own:
//!
//! | Mode   | Cursor shape | Purpose                              |
//! |--------|--------------|--------------------------------------|
//! | Normal | Block        | Motions, line edits, undo, save      |
//! | Input  | Bar          | Typing text                          |
//! | Switch | Bar (prompt) | Fuzzy-picking another file to edit   |
//!
//! A mode is an object implementing [`Mode`]. The [`Modes`] registry holds
//! one instance of each and knows which is active. Handlers never switch
//! modes themselves; they return a [`Transition`] and the editor performs it
//! once the handler is done, through [`Modes::switch_to`].

use std::fmt;

use tracing::{debug, warn};

use crate::editor::Session;
use crate::error::Result;
use crate::input::Input;
use crate::normal::Normal;
use crate::switch::Switch;
use crate::view::View;

// ---------------------------------------------------------------------------
// Key
// ---------------------------------------------------------------------------

/// A non-printable key. Printable characters arrive as runes instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Up,
    Down,
    Left,
    Right,
    Backspace,
    Delete,
    Enter,
    Tab,
    Escape,
    /// Ctrl plus a lowercase letter.
    Ctrl(char),
}

// ---------------------------------------------------------------------------
// ModeKind
// ---------------------------------------------------------------------------

/// Which mode is active.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModeKind {
    #[default]
    Normal,
    Input,
    Switch,
}

impl ModeKind {
    /// Name shown in the status line.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Normal => "NORMAL",
            Self::Input => "INPUT",
            Self::Switch => "SWITCH",
        }
    }

    /// The terminal cursor shape for this mode.
    #[must_use]
    pub const fn cursor_shape(self) -> CursorShape {
        match self {
            Self::Normal => CursorShape::SteadyBlock,
            Self::Input | Self::Switch => CursorShape::SteadyBar,
        }
    }
}

impl fmt::Display for ModeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Cursor shape, mirrored here so this crate does not depend on the
/// terminal backend. The binary maps it to the terminal's own enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CursorShape {
    SteadyBlock,
    SteadyBar,
}

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// What the editor should do after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Stay,
    Switch(ModeKind),
    Quit,
}

/// One interaction mode.
///
/// Handlers report their own failures on the session's message line, so
/// they return only the transition to perform.
pub trait Mode {
    /// Called when the mode becomes active. A failure keeps the previous
    /// mode active.
    fn show(&mut self, session: &mut Session) -> Result<()>;

    /// Called when the mode stops being active. A failure cancels the
    /// switch.
    fn hide(&mut self, session: &mut Session) -> Result<()>;

    /// Handle a non-printable key.
    fn key(&mut self, session: &mut Session, key: Key) -> Transition;

    /// Handle a printable character.
    fn rune(&mut self, session: &mut Session, ch: char) -> Transition;

    /// Fill `view` for the next frame.
    fn render(&mut self, session: &mut Session, view: &mut View);
}

// ---------------------------------------------------------------------------
// Modes
// ---------------------------------------------------------------------------

/// The three modes and which of them is active.
pub struct Modes {
    active: ModeKind,
    normal: Box<dyn Mode>,
    input: Box<dyn Mode>,
    switch: Box<dyn Mode>,
}

impl Modes {
    /// A registry over the given instances, starting in Normal.
    #[must_use]
    pub fn new(normal: Box<dyn Mode>, input: Box<dyn Mode>, switch: Box<dyn Mode>) -> Self {
        Self {
            active: ModeKind::Normal,
            normal,
            input,
            switch,
        }
    }

    /// The editor's own modes.
    #[must_use]
    pub fn standard() -> Self {
        Self::new(
            Box::new(Normal),
            Box::new(Input),
            Box::new(Switch::new()),
        )
    }

    #[inline]
    #[must_use]
    pub const fn active(&self) -> ModeKind {
        self.active
    }

    /// The active mode.
    pub fn current(&mut self) -> &mut dyn Mode {
        let kind = self.active;
        self.get(kind)
    }

    fn get(&mut self, kind: ModeKind) -> &mut dyn Mode {
        match kind {
            ModeKind::Normal => self.normal.as_mut(),
            ModeKind::Input => self.input.as_mut(),
            ModeKind::Switch => self.switch.as_mut(),
        }
    }

    /// Make `next` the active mode.
    ///
    /// Either the switch completes or the old mode is still active: a failed
    /// `hide` leaves everything as it was, a failed `show` re-shows the old
    /// mode. The error is returned in both cases.
    pub fn switch_to(&mut self, session: &mut Session, next: ModeKind) -> Result<()> {
        let prev = self.active;
        if next == prev {
            return Ok(());
        }

        self.get(prev).hide(session)?;
        if let Err(e) = self.get(next).show(session) {
            warn!(from = %prev, to = %next, error = %e, "mode switch failed");
            if let Err(again) = self.get(prev).show(session) {
                warn!(mode = %prev, error = %again, "re-showing mode failed");
            }
            return Err(e);
        }

        self.active = next;
        debug!(from = %prev, to = %next, "mode switch");
        Ok(())
    }
}

impl fmt::Debug for Modes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Modes").field("active", &self.active).finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
