//! The editor: session state plus mode dispatch.
//!
//! [`Session`] is everything a mode may touch: the open [`Document`], the
//! [`Filesystem`], the [`Config`], the text viewport and the message line.
//! [`Editor`] pairs a session with the [`Modes`] registry and is what the
//! event loop talks to:
//!
//! ```text
//! key / rune ──▶ Editor ──▶ refresh stale document
//!                        ──▶ active mode handler ──▶ Transition
//!                        ──▶ Modes::switch_to / quit
//! size       ──▶ Editor::view ──▶ active mode render ──▶ View
//! ```

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::Config;
use crate::document::Document;
use crate::error::{Error, Result};
use crate::fs::Filesystem;
use crate::mode::{Key, ModeKind, Modes, Transition};
use crate::view::{self, Message, Size, View, Viewport};

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

/// State shared by every mode.
pub struct Session {
    document: Document,
    fs: Box<dyn Filesystem>,
    config: Config,
    viewport: Viewport,
    message: Option<Message>,
}

impl Session {
    #[must_use]
    pub fn new(fs: Box<dyn Filesystem>, config: Config, document: Document) -> Self {
        Self {
            document,
            fs,
            config,
            viewport: Viewport::new(),
            message: None,
        }
    }

    // -- Accessors ----------------------------------------------------------

    #[inline]
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    #[inline]
    pub const fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    #[inline]
    #[must_use]
    pub fn fs(&self) -> &dyn Filesystem {
        self.fs.as_ref()
    }

    #[inline]
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[inline]
    #[must_use]
    pub const fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    // -- Message line -------------------------------------------------------

    /// Show an informational note.
    pub fn inform(&mut self, text: impl Into<String>) {
        self.message = Some(Message::info(text));
    }

    /// Show an error and log it.
    pub fn fail(&mut self, err: &Error) {
        warn!(error = %err, "reported");
        self.message = Some(Message::error(err.to_string()));
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }

    // -- Document commands --------------------------------------------------

    /// Write the document, reporting the outcome.
    pub fn save(&mut self) {
        match self.document.save(self.fs.as_ref()) {
            Ok(true) => {
                let path = self.document.path().display().to_string();
                self.inform(format!("wrote {path}"));
            }
            Ok(false) => self.inform("unchanged"),
            Err(e) => self.fail(&e),
        }
    }

    /// Reload the document if it is stale, or always when `force` is set.
    pub fn reload(&mut self, force: bool) {
        match self.document.refresh(self.fs.as_ref(), force) {
            Ok(true) => {
                let path = self.document.path().display().to_string();
                self.inform(format!("reloaded {path}"));
            }
            Ok(false) if force => self.inform("nothing on disk to reload"),
            Ok(false) => {}
            Err(e) => self.fail(&e),
        }
    }

    pub fn undo(&mut self) {
        if !self.document.undo() {
            self.inform("already at oldest change");
        }
    }

    pub fn redo(&mut self) {
        if !self.document.redo() {
            self.inform("already at newest change");
        }
    }

    /// Replace the document with the file at `path`. Unsaved changes are
    /// written first; if that fails the current document stays open.
    pub fn open(&mut self, path: impl Into<PathBuf>) -> Result<()> {
        let path = path.into();
        if self.document.is_changed() {
            self.document.save(self.fs.as_ref())?;
        }
        let doc = Document::open(self.fs.as_ref(), path, self.config.editor.history_limit)?;
        info!(path = %doc.path().display(), "switched document");
        self.inform(format!("opened {}", doc.path().display()));
        self.document = doc;
        self.viewport = Viewport::new();
        Ok(())
    }

    /// Fill `view` with the document text and its status.
    pub fn render_document(&mut self, view: &mut View) {
        let editor = &self.config.editor;
        view::render_document(
            &self.document,
            &mut self.viewport,
            view,
            editor.tab_width,
            editor.scroll_margin,
        );
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("document", &self.document.path())
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Editor
// ---------------------------------------------------------------------------

/// Whether the event loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// A session driven through the mode state machine.
#[derive(Debug)]
pub struct Editor {
    session: Session,
    modes: Modes,
}

impl Editor {
    /// Open `path` with the standard modes, starting in Normal.
    pub fn open(fs: Box<dyn Filesystem>, config: Config, path: impl Into<PathBuf>) -> Result<Self> {
        let document = Document::open(fs.as_ref(), path, config.editor.history_limit)?;
        Self::with_modes(Session::new(fs, config, document), Modes::standard())
    }

    /// Drive `session` through `modes`, showing the initially active one.
    pub fn with_modes(mut session: Session, mut modes: Modes) -> Result<Self> {
        modes.current().show(&mut session)?;
        Ok(Self { session, modes })
    }

    #[inline]
    #[must_use]
    pub const fn mode(&self) -> ModeKind {
        self.modes.active()
    }

    #[inline]
    #[must_use]
    pub const fn session(&self) -> &Session {
        &self.session
    }

    #[inline]
    pub const fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Handle a non-printable key.
    pub fn key(&mut self, key: Key) -> Flow {
        self.before_event();
        let transition = self.modes.current().key(&mut self.session, key);
        self.perform(transition)
    }

    /// Handle a printable character.
    pub fn rune(&mut self, ch: char) -> Flow {
        self.before_event();
        let transition = self.modes.current().rune(&mut self.session, ch);
        self.perform(transition)
    }

    /// Build the frame for a text area of `size`.
    pub fn view(&mut self, size: Size) -> View {
        let mut view = View::new(size, self.modes.active());
        self.modes.current().render(&mut self.session, &mut view);
        view.message = self.session.message.clone();
        view
    }

    fn before_event(&mut self) {
        self.session.clear_message();
        self.session.reload(false);
    }

    fn perform(&mut self, transition: Transition) -> Flow {
        match transition {
            Transition::Stay => Flow::Continue,
            Transition::Quit => Flow::Quit,
            Transition::Switch(next) => {
                if let Err(e) = self.modes.switch_to(&mut self.session, next) {
                    self.session.fail(&e);
                }
                Flow::Continue
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::{Disk, Loaded};
    use crate::position::Position;
    use crate::view::{CursorPlacement, MessageKind};
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::io;
    use std::path::Path;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn editor_on(content: &str) -> (TempDir, Editor) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        fs::write(&path, content).unwrap();
        let ed = Editor::open(Box::new(Disk), Config::default(), path).unwrap();
        (dir, ed)
    }

    fn lines(ed: &Editor) -> Vec<String> {
        ed.session().document().buffer().to_lines()
    }

    fn type_str(ed: &mut Editor, s: &str) {
        for ch in s.chars() {
            ed.rune(ch);
        }
    }

    // -- Normal / Input round trip ------------------------------------------

    #[test]
    fn insert_text_and_return_to_normal() {
        let (_dir, mut ed) = editor_on("world");
        assert_eq!(ed.mode(), ModeKind::Normal);
        ed.rune('i');
        assert_eq!(ed.mode(), ModeKind::Input);
        type_str(&mut ed, "hello ");
        ed.key(Key::Escape);
        assert_eq!(ed.mode(), ModeKind::Normal);
        assert_eq!(lines(&ed), vec!["hello world"]);
    }

    #[test]
    fn quit_key() {
        let (_dir, mut ed) = editor_on("x");
        assert_eq!(ed.rune('q'), Flow::Quit);
        assert_eq!(ed.key(Key::Ctrl('q')), Flow::Quit);
    }

    #[test]
    fn save_reports_and_writes() {
        let (dir, mut ed) = editor_on("ab");
        ed.rune('x');
        ed.rune('s');
        assert_eq!(fs::read_to_string(dir.path().join("file.txt")).unwrap(), "b");
        let msg = ed.session().message().unwrap();
        assert_eq!(msg.kind, MessageKind::Info);
        assert!(msg.text.starts_with("wrote "));

        ed.key(Key::Ctrl('s'));
        assert_eq!(ed.session().message().unwrap().text, "unchanged");
    }

    #[test]
    fn message_clears_on_next_key() {
        let (_dir, mut ed) = editor_on("ab");
        ed.rune('u');
        assert!(ed.session().message().is_some());
        ed.rune('l');
        assert!(ed.session().message().is_none());
    }

    #[test]
    fn undo_redo_through_keys() {
        let (_dir, mut ed) = editor_on("abc");
        ed.rune('x');
        ed.rune('x');
        assert_eq!(lines(&ed), vec!["c"]);
        ed.rune('u');
        assert_eq!(lines(&ed), vec!["bc"]);
        ed.key(Key::Ctrl('r'));
        assert_eq!(lines(&ed), vec!["c"]);
        ed.rune('u');
        ed.rune('u');
        assert_eq!(lines(&ed), vec!["abc"]);
        ed.rune('U');
        assert_eq!(lines(&ed), vec!["bc"]);
    }

    #[test]
    fn stale_file_reloads_before_next_key() {
        let (dir, mut ed) = editor_on("before");
        let path = dir.path().join("file.txt");
        fs::write(&path, "after").unwrap();
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(SystemTime::now() + std::time::Duration::from_secs(10))
            .unwrap();

        ed.rune('l');
        assert_eq!(lines(&ed), vec!["after"]);
        assert!(ed.session().message().unwrap().text.starts_with("reloaded"));
    }

    // -- View ---------------------------------------------------------------

    #[test]
    fn view_in_normal_mode() {
        let (_dir, mut ed) = editor_on("one\ntwo");
        ed.rune('j');
        ed.rune('$');
        let view = ed.view(Size::new(40, 10));
        assert_eq!(view.mode, ModeKind::Normal);
        assert_eq!(view.rows, vec!["one", "two"]);
        assert_eq!(view.cursor, CursorPlacement::Text { row: 1, col: 3 });
        assert!(view.status.ends_with("file.txt"));
        assert_eq!(view.status_right, "2:4  LF");
    }

    // -- Switch mode --------------------------------------------------------

    /// Filesystem whose directory listing always fails.
    struct NoWalk;

    impl Filesystem for NoWalk {
        fn load(&self, path: &Path) -> Result<Loaded> {
            Disk.load(path)
        }
        fn save(&self, path: &Path, text: &str) -> Result<SystemTime> {
            Disk.save(path, text)
        }
        fn modified(&self, path: &Path) -> Result<Option<SystemTime>> {
            Disk.modified(path)
        }
        fn walk(&self, root: &Path, _: &[String]) -> Result<Vec<String>> {
            Err(Error::Walk {
                path: root.to_path_buf(),
                source: io::Error::from(io::ErrorKind::PermissionDenied),
            })
        }
        fn working_dir(&self) -> Result<PathBuf> {
            Ok(PathBuf::from("/nowhere"))
        }
    }

    #[test]
    fn failed_switch_keeps_normal_and_reports() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("f.txt");
        let mut ed = Editor::open(Box::new(NoWalk), Config::default(), path).unwrap();
        ed.key(Key::Tab);
        assert_eq!(ed.mode(), ModeKind::Normal);
        assert_eq!(ed.session().message().unwrap().kind, MessageKind::Error);
    }

    #[test]
    fn open_saves_pending_changes_first() {
        let dir = tempfile::tempdir().unwrap();
        let first = dir.path().join("first.txt");
        let second = dir.path().join("second.txt");
        fs::write(&first, "1").unwrap();
        fs::write(&second, "2").unwrap();

        let mut ed = Editor::open(Box::new(Disk), Config::default(), &first).unwrap();
        ed.rune('x');
        ed.session_mut().open(&second).unwrap();

        assert_eq!(fs::read_to_string(&first).unwrap(), "");
        assert_eq!(lines(&ed), vec!["2"]);
        assert_eq!(ed.session().document().buffer().position(), Position::ZERO);
    }
}
