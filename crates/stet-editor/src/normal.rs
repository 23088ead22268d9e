//! Normal mode: motions, line edits, history and file commands.
//!
//! | Key                      | Effect                        |
//! |--------------------------|-------------------------------|
//! | `h` `j` `k` `l`, arrows  | move one char / line          |
//! | `w` `b`                  | next / previous word start    |
//! | `}` `{`                  | next / previous paragraph     |
//! | `0` `$`                  | line start / end              |
//! | `x`, Delete              | delete char under cursor      |
//! | `X`                      | delete char before cursor     |
//! | `d`                      | delete line                   |
//! | `J`                      | join with next line           |
//! | `i` `a` `o`              | enter Input (here / after / new line) |
//! | `u`, `U` / Ctrl-R        | undo, redo                    |
//! | `s` / Ctrl-S             | save                          |
//! | `r` / Ctrl-L             | reload from disk              |
//! | Tab                      | file switcher                 |
//! | `q` / Ctrl-Q             | quit                          |
//!
//! Anything else is ignored.

use crate::change::Change;
use crate::editor::Session;
use crate::error::Result;
use crate::mode::{Key, Mode, ModeKind, Transition};
use crate::motion::Motion;
use crate::position::Direction;
use crate::view::View;

/// Normal mode. Stateless: everything lives in the session.
#[derive(Debug, Clone, Copy, Default)]
pub struct Normal;

fn motion(session: &mut Session, motion: Motion) -> Transition {
    session.document_mut().move_by(motion);
    Transition::Stay
}

fn change(session: &mut Session, change: Change) -> Transition {
    session.document_mut().apply(change);
    Transition::Stay
}

impl Mode for Normal {
    fn show(&mut self, _: &mut Session) -> Result<()> {
        Ok(())
    }

    fn hide(&mut self, _: &mut Session) -> Result<()> {
        Ok(())
    }

    fn key(&mut self, session: &mut Session, key: Key) -> Transition {
        match key {
            Key::Left => motion(session, Motion::Left),
            Key::Right => motion(session, Motion::Right),
            Key::Up => motion(session, Motion::Up),
            Key::Down => motion(session, Motion::Down),
            Key::Delete => change(session, Change::DeleteChar),
            Key::Tab => Transition::Switch(ModeKind::Switch),
            Key::Ctrl('r') => {
                session.redo();
                Transition::Stay
            }
            Key::Ctrl('s') => {
                session.save();
                Transition::Stay
            }
            Key::Ctrl('l') => {
                session.reload(true);
                Transition::Stay
            }
            Key::Ctrl('q') => Transition::Quit,
            _ => Transition::Stay,
        }
    }

    fn rune(&mut self, session: &mut Session, ch: char) -> Transition {
        match ch {
            'h' => motion(session, Motion::Left),
            'l' => motion(session, Motion::Right),
            'k' => motion(session, Motion::Up),
            'j' => motion(session, Motion::Down),
            'w' => motion(session, Motion::Word(Direction::Forward)),
            'b' => motion(session, Motion::Word(Direction::Backward)),
            '}' => motion(session, Motion::Paragraph(Direction::Forward)),
            '{' => motion(session, Motion::Paragraph(Direction::Backward)),
            '0' => motion(session, Motion::LineStart),
            '$' => motion(session, Motion::LineEnd),
            'x' => change(session, Change::DeleteChar),
            'X' => change(session, Change::DeletePreviousChar),
            'd' => change(session, Change::DeleteLine),
            'J' => change(session, Change::JoinLine),
            'i' => Transition::Switch(ModeKind::Input),
            'a' => {
                session.document_mut().move_by(Motion::Right);
                Transition::Switch(ModeKind::Input)
            }
            'o' => {
                let doc = session.document_mut();
                doc.move_by(Motion::LineEnd);
                doc.apply(Change::SplitLine);
                Transition::Switch(ModeKind::Input)
            }
            'u' => {
                session.undo();
                Transition::Stay
            }
            'U' => {
                session.redo();
                Transition::Stay
            }
            's' => {
                session.save();
                Transition::Stay
            }
            'r' => {
                session.reload(true);
                Transition::Stay
            }
            'q' => Transition::Quit,
            _ => Transition::Stay,
        }
    }

    fn render(&mut self, session: &mut Session, view: &mut View) {
        session.render_document(view);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
