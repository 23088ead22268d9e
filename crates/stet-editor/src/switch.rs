//! Switch mode: fuzzy file picker.
//!
//! On entry the working directory is walked for regular files. Typing
//! narrows the list to paths containing the query's characters in order
//! (not necessarily adjacent); Enter opens the highlighted path.
//!
//! ```text
//! query "brc"
//!
//!   src/buffer/core.rs     ← b…r…c  match
//!   src/main.rs                     no match
//! ```
//!
//! | Key          | Effect                                          |
//! |--------------|-------------------------------------------------|
//! | Up / Down    | move the highlight (clamped, no wrap)           |
//! | Left / Right | scroll the list horizontally                    |
//! | Backspace    | drop the last query char                        |
//! | Enter        | open the highlighted path, or the query itself  |
//! | Tab / Escape | back to Normal without opening                  |

use std::path::PathBuf;

use tracing::debug;

use crate::editor::Session;
use crate::error::Result;
use crate::mode::{Key, Mode, ModeKind, Transition};
use crate::view::{self, CursorPlacement, View, Viewport};

/// Display columns scrolled per Left / Right press.
const SCROLL_STEP: usize = 8;

/// True when every char of `query` occurs in `path`, in order.
/// Case-sensitive. The empty query matches everything.
#[must_use]
pub fn matches(path: &str, query: &str) -> bool {
    let mut wanted = query.chars().peekable();
    for ch in path.chars() {
        if wanted.peek() == Some(&ch) {
            wanted.next();
        }
    }
    wanted.peek().is_none()
}

/// Switch mode state.
#[derive(Debug, Clone, Default)]
pub struct Switch {
    query: String,
    paths: Vec<String>,
    selection: Vec<String>,
    cursor: usize,
    viewport: Viewport,
    root: PathBuf,
}

impl Switch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Paths matching the query, in listing order.
    #[inline]
    #[must_use]
    pub fn selection(&self) -> &[String] {
        &self.selection
    }

    /// Index of the highlighted entry in [`selection`](Self::selection).
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the candidate list and start over with an empty query.
    pub fn load(&mut self, root: PathBuf, paths: Vec<String>) {
        self.root = root;
        self.paths = paths;
        self.query.clear();
        self.viewport = Viewport::new();
        self.filter();
    }

    fn filter(&mut self) {
        self.selection = self
            .paths
            .iter()
            .filter(|path| matches(path, &self.query))
            .cloned()
            .collect();
        self.cursor = 0;
    }

    pub fn push(&mut self, ch: char) {
        self.query.push(ch);
        self.filter();
    }

    pub fn pop(&mut self) {
        if self.query.pop().is_some() {
            self.filter();
        }
    }

    pub const fn up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn down(&mut self) {
        if self.cursor + 1 < self.selection.len() {
            self.cursor += 1;
        }
    }

    fn scroll_left(&mut self) {
        let left = self.viewport.left().saturating_sub(SCROLL_STEP);
        self.viewport.set_left(left);
    }

    fn scroll_right(&mut self) {
        let widest = self
            .selection
            .iter()
            .map(|p| view::display_width(p.chars(), 1))
            .max()
            .unwrap_or(0);
        let left = (self.viewport.left() + SCROLL_STEP).min(widest.saturating_sub(1));
        self.viewport.set_left(left);
    }

    /// The path Enter would open: the highlighted entry, or the query when
    /// nothing matches.
    #[must_use]
    pub fn target(&self) -> &str {
        self.selection
            .get(self.cursor)
            .map_or(self.query.as_str(), String::as_str)
    }
}

impl Mode for Switch {
    fn show(&mut self, session: &mut Session) -> Result<()> {
        let root = session.fs().working_dir()?;
        let paths = session.fs().walk(&root, &session.config().switch.ignore)?;
        debug!(root = %root.display(), files = paths.len(), "listing");
        self.load(root, paths);
        Ok(())
    }

    fn hide(&mut self, _: &mut Session) -> Result<()> {
        Ok(())
    }

    fn key(&mut self, session: &mut Session, key: Key) -> Transition {
        match key {
            Key::Up => self.up(),
            Key::Down => self.down(),
            Key::Left => self.scroll_left(),
            Key::Right => self.scroll_right(),
            Key::Backspace => self.pop(),
            Key::Enter => {
                let target = self.target().to_owned();
                if !target.is_empty() {
                    if let Err(e) = session.open(target) {
                        session.fail(&e);
                    }
                }
                return Transition::Switch(ModeKind::Normal);
            }
            Key::Tab | Key::Escape => return Transition::Switch(ModeKind::Normal),
            Key::Delete | Key::Ctrl(_) => {}
        }
        Transition::Stay
    }

    fn rune(&mut self, _: &mut Session, ch: char) -> Transition {
        if !ch.is_control() {
            self.push(ch);
        }
        Transition::Stay
    }

    fn render(&mut self, _: &mut Session, view: &mut View) {
        let size = view.size;
        let left = self.viewport.left();
        self.viewport.follow(self.cursor, left, size, 0);

        let top = self.viewport.top();
        view.rows = self
            .selection
            .iter()
            .skip(top)
            .take(size.height)
            .map(|path| view::clip(path.chars(), left, size.width, 1))
            .collect();
        view.highlight = (!self.selection.is_empty()).then(|| self.cursor.saturating_sub(top));
        view.status = self.root.display().to_string();
        view.status_right = format!("{}/{}", self.selection.len(), self.paths.len());
        view.prompt.clone_from(&self.query);
        view.cursor = CursorPlacement::Prompt {
            col: view::display_width(self.query.chars(), 1),
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::document::Document;
    use crate::error::Error;
    use crate::fs::{Disk, Filesystem, Loaded};
    use crate::view::{MessageKind, Size};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use std::fs;
    use std::io;
    use std::path::Path;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn picker(paths: &[&str]) -> Switch {
        let mut s = Switch::new();
        s.load(
            PathBuf::from("/work"),
            paths.iter().map(|p| (*p).to_owned()).collect(),
        );
        s
    }

    // -- matches ------------------------------------------------------------

    #[test]
    fn subsequence_matches() {
        assert!(matches("src/buffer/core.go", "brc"));
        assert!(!matches("src/buffer/core.go", "xyz"));
        assert!(matches("anything", ""));
        assert!(matches("", ""));
        assert!(!matches("", "a"));
    }

    #[test]
    fn match_is_ordered_and_case_sensitive() {
        assert!(!matches("abc", "cb"));
        assert!(!matches("README", "readme"));
        assert!(matches("café/menu", "éu"));
    }

    // -- Filtering ----------------------------------------------------------

    #[test]
    fn typing_filters_and_resets_cursor() {
        let mut s = picker(&["Cargo.toml", "src/lib.rs", "src/main.rs"]);
        assert_eq!(s.selection().len(), 3);
        s.down();
        s.down();
        assert_eq!(s.cursor(), 2);

        s.push('s');
        s.push('r');
        s.push('c');
        assert_eq!(s.selection(), ["src/lib.rs", "src/main.rs"]);
        assert_eq!(s.cursor(), 0);

        s.push('m');
        assert_eq!(s.selection(), ["src/main.rs"]);
        s.pop();
        assert_eq!(s.query(), "src");
        assert_eq!(s.selection().len(), 2);
    }

    #[test]
    fn cursor_clamps_without_wrapping() {
        let mut s = picker(&["a", "b"]);
        s.up();
        assert_eq!(s.cursor(), 0);
        s.down();
        s.down();
        s.down();
        assert_eq!(s.cursor(), 1);
    }

    #[test]
    fn target_falls_back_to_query() {
        let mut s = picker(&["a.txt"]);
        assert_eq!(s.target(), "a.txt");
        for ch in "new.txt".chars() {
            s.push(ch);
        }
        assert!(s.selection().is_empty());
        assert_eq!(s.target(), "new.txt");
    }

    // -- Render -------------------------------------------------------------

    #[test]
    fn render_scrolls_to_cursor_and_highlights() {
        let paths: Vec<String> = (0..10).map(|i| format!("file{i}")).collect();
        let mut s = Switch::new();
        s.load(PathBuf::from("/work"), paths);
        s.push('f');

        let mut view = View::new(Size::new(20, 4), ModeKind::Switch);
        for _ in 0..6 {
            s.down();
        }
        s.render_into(&mut view);

        assert_eq!(view.rows, vec!["file3", "file4", "file5", "file6"]);
        assert_eq!(view.highlight, Some(3));
        assert_eq!(view.status, "/work");
        assert_eq!(view.status_right, "10/10");
        assert_eq!(view.prompt, "f");
        assert_eq!(view.cursor, CursorPlacement::Prompt { col: 1 });
    }

    #[test]
    fn render_empty_selection_has_no_highlight() {
        let mut s = picker(&["a"]);
        s.push('z');
        let mut view = View::new(Size::new(20, 4), ModeKind::Switch);
        s.render_into(&mut view);
        assert!(view.rows.is_empty());
        assert_eq!(view.highlight, None);
    }

    #[test]
    fn horizontal_scroll() {
        let mut s = picker(&["a/very/long/path/name.txt"]);
        s.scroll_right();
        let mut view = View::new(Size::new(6, 2), ModeKind::Switch);
        s.render_into(&mut view);
        assert_eq!(view.rows, vec!["ong/pa"]);
        s.scroll_left();
        s.scroll_left();
        s.render_into(&mut view);
        assert_eq!(view.rows, vec!["a/very"]);
    }

    impl Switch {
        /// Render without a session; the switcher never reads it.
        fn render_into(&mut self, view: &mut View) {
            let mut session = crate::editor::Session::new(
                Box::new(crate::fs::Disk),
                crate::config::Config::default(),
                crate::document::Document::scratch("unused", 1),
            );
            self.render(&mut session, view);
        }
    }

    // -- Mode handlers ------------------------------------------------------

    /// Disk access with relative paths resolved against a fixed root, and
    /// one file that can never be read.
    struct Rooted {
        root: PathBuf,
    }

    impl Rooted {
        fn resolve(&self, path: &Path) -> PathBuf {
            self.root.join(path)
        }
    }

    impl Filesystem for Rooted {
        fn load(&self, path: &Path) -> Result<Loaded> {
            if path.ends_with("locked.txt") {
                return Err(Error::Open {
                    path: path.to_path_buf(),
                    source: io::Error::from(io::ErrorKind::PermissionDenied),
                });
            }
            Disk.load(&self.resolve(path))
        }
        fn save(&self, path: &Path, text: &str) -> Result<SystemTime> {
            Disk.save(&self.resolve(path), text)
        }
        fn modified(&self, path: &Path) -> Result<Option<SystemTime>> {
            Disk.modified(&self.resolve(path))
        }
        fn walk(&self, root: &Path, ignore: &[String]) -> Result<Vec<String>> {
            Disk.walk(root, ignore)
        }
        fn working_dir(&self) -> Result<PathBuf> {
            Ok(self.root.clone())
        }
    }

    fn session_in(files: &[(&str, &str)]) -> (TempDir, Session) {
        let dir = tempfile::tempdir().unwrap();
        for (name, content) in files {
            let path = dir.path().join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
        let mut config = Config::default();
        config.switch.ignore = vec!["target".to_owned()];
        let session = Session::new(
            Box::new(Rooted {
                root: dir.path().to_path_buf(),
            }),
            config,
            Document::scratch(dir.path().join("start.txt"), 10),
        );
        (dir, session)
    }

    fn shown(files: &[(&str, &str)]) -> (TempDir, Session, Switch) {
        let (dir, mut session) = session_in(files);
        let mut s = Switch::new();
        s.show(&mut session).unwrap();
        (dir, session, s)
    }

    const FILES: [(&str, &str); 4] = [
        ("alpha.txt", "A"),
        ("beta.txt", "B"),
        ("sub/gamma.txt", "G"),
        ("target/debug.log", "skip"),
    ];

    #[test]
    fn show_walks_working_dir_and_resets_query() {
        let (dir, mut session, mut s) = shown(&FILES);
        assert_eq!(s.selection(), ["alpha.txt", "beta.txt", "sub/gamma.txt"]);
        assert_eq!(s.root, dir.path());

        s.rune(&mut session, 'g');
        s.down();
        fs::write(dir.path().join("delta.txt"), "D").unwrap();
        s.show(&mut session).unwrap();

        assert_eq!(s.query(), "");
        assert_eq!(s.cursor(), 0);
        assert_eq!(s.selection().len(), 4);
    }

    #[test]
    fn enter_opens_highlighted_path() {
        let (_dir, mut session, mut s) = shown(&FILES);
        assert_eq!(s.rune(&mut session, 'b'), Transition::Stay);
        assert_eq!(s.selection(), ["beta.txt", "sub/gamma.txt"]);

        assert_eq!(s.key(&mut session, Key::Enter), Transition::Switch(ModeKind::Normal));
        assert_eq!(session.document().path(), Path::new("beta.txt"));
        assert_eq!(session.document().buffer().to_lines(), vec!["B"]);
        assert_eq!(session.message().unwrap().text, "opened beta.txt");
    }

    #[test]
    fn enter_with_no_match_opens_query() {
        let (_dir, mut session, mut s) = shown(&FILES);
        for ch in "zzz".chars() {
            s.rune(&mut session, ch);
        }
        assert!(s.selection().is_empty());

        assert_eq!(s.key(&mut session, Key::Enter), Transition::Switch(ModeKind::Normal));
        assert_eq!(session.document().path(), Path::new("zzz"));
        assert!(session.document().buffer().is_empty());
        assert_eq!(session.message().unwrap().text, "opened zzz");
    }

    #[test]
    fn failed_open_reports_and_still_leaves() {
        let (_dir, mut session, mut s) = shown(&[("locked.txt", "secret")]);
        assert_eq!(s.selection(), ["locked.txt"]);

        assert_eq!(s.key(&mut session, Key::Enter), Transition::Switch(ModeKind::Normal));
        assert!(session.document().path().ends_with("start.txt"));
        assert_eq!(session.message().unwrap().kind, MessageKind::Error);
    }

    #[test]
    fn tab_and_escape_leave_without_opening() {
        let (_dir, mut session, mut s) = shown(&FILES);
        for key in [Key::Tab, Key::Escape] {
            assert_eq!(s.key(&mut session, key), Transition::Switch(ModeKind::Normal));
            assert!(session.document().path().ends_with("start.txt"));
            assert!(session.message().is_none());
        }
    }

    #[test]
    fn backspace_key_refilters() {
        let (_dir, mut session, mut s) = shown(&FILES);
        s.rune(&mut session, 'b');
        s.rune(&mut session, 'q');
        assert!(s.selection().is_empty());

        assert_eq!(s.key(&mut session, Key::Backspace), Transition::Stay);
        assert_eq!(s.query(), "b");
        assert_eq!(s.selection(), ["beta.txt", "sub/gamma.txt"]);
    }

    #[test]
    fn arrows_move_highlight_through_key() {
        let (_dir, mut session, mut s) = shown(&FILES);
        s.key(&mut session, Key::Down);
        s.key(&mut session, Key::Down);
        s.key(&mut session, Key::Down);
        assert_eq!(s.cursor(), 2);
        s.key(&mut session, Key::Up);
        assert_eq!(s.target(), "beta.txt");
    }

    #[test]
    fn control_runes_are_ignored() {
        let (_dir, mut session, mut s) = shown(&FILES);
        assert_eq!(s.rune(&mut session, '\u{7}'), Transition::Stay);
        assert_eq!(s.rune(&mut session, '\t'), Transition::Stay);
        assert_eq!(s.query(), "");
        assert_eq!(s.selection().len(), 3);
    }

    // -- Properties ---------------------------------------------------------

    proptest! {
        #[test]
        fn cursor_stays_in_selection(
            count in 0usize..6,
            moves in prop::collection::vec(any::<bool>(), 0..40),
        ) {
            let paths: Vec<String> = (0..count).map(|i| format!("p{i}")).collect();
            let mut s = Switch::new();
            s.load(PathBuf::new(), paths);
            for down in moves {
                if down { s.down() } else { s.up() }
                prop_assert!(s.cursor() == 0 || s.cursor() < s.selection().len());
            }
        }
    }
}
