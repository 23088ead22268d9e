//! Input mode: typing text into the buffer.
//!
//! Printable characters are inserted at the cursor. Enter splits the line,
//! Backspace and Delete remove the char before / under the cursor, arrows
//! move. Escape or Tab go back to Normal; Ctrl-S saves without leaving.

use crate::change::Change;
use crate::editor::Session;
use crate::error::Result;
use crate::mode::{Key, Mode, ModeKind, Transition};
use crate::motion::Motion;
use crate::view::View;

/// Input mode. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct Input;

impl Mode for Input {
    fn show(&mut self, _: &mut Session) -> Result<()> {
        Ok(())
    }

    fn hide(&mut self, _: &mut Session) -> Result<()> {
        Ok(())
    }

    fn key(&mut self, session: &mut Session, key: Key) -> Transition {
        let doc = session.document_mut();
        match key {
            Key::Enter => {
                doc.apply(Change::SplitLine);
            }
            Key::Backspace => {
                doc.apply(Change::DeletePreviousChar);
            }
            Key::Delete => {
                doc.apply(Change::DeleteChar);
            }
            Key::Left => doc.move_by(Motion::Left),
            Key::Right => doc.move_by(Motion::Right),
            Key::Up => doc.move_by(Motion::Up),
            Key::Down => doc.move_by(Motion::Down),
            Key::Escape | Key::Tab => return Transition::Switch(ModeKind::Normal),
            Key::Ctrl('s') => session.save(),
            Key::Ctrl(_) => {}
        }
        Transition::Stay
    }

    fn rune(&mut self, session: &mut Session, ch: char) -> Transition {
        if !ch.is_control() {
            session.document_mut().apply(Change::InsertChar(ch));
        }
        Transition::Stay
    }

    fn render(&mut self, session: &mut Session, view: &mut View) {
        session.render_document(view);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
