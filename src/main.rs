// SPDX-License-Identifier: MIT
//
// stet: a small modal text editor for the terminal.
//
// The binary wires the two crates together:
//
//   stet-term   → raw terminal, key parsing, frame diffing, event loop
//   stet-editor → buffer, motions, changes, history, modes, file switcher
//
// `Stet` implements the terminal's `App`. Each key event is translated into
// the editor's `Key` or a printable rune; on paint the editor builds a
// logical `View` for the text area and this file lays it out:
//
//   ┌──────────────────────────────┐
//   │ text rows / switcher list    │  ← h - 2 rows
//   ├──────────────────────────────┤
//   │ MODE  path [+]      l:c  LF  │  ← status row (inverse)
//   ├──────────────────────────────┤
//   │ message, or switcher prompt  │  ← 1 row
//   └──────────────────────────────┘

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use tracing::{error, info};

use stet_editor::config::Config;
use stet_editor::editor::{Editor, Flow};
use stet_editor::fs::Disk;
use stet_editor::mode::{self, Key, ModeKind};
use stet_editor::view::{self, CursorPlacement, MessageKind, View};

use stet_term::ansi::{Attr, Color, CursorShape, Style};
use stet_term::event_loop::{Action, App, EventLoop};
use stet_term::frame::Frame;
use stet_term::input::{Event, KeyCode, KeyEvent, Modifiers};
use stet_term::terminal;

/// Opened when no file is named; created on first save.
const DEFAULT_FILE: &str = "untitled.txt";

/// Drawn before the switcher query on the bottom row.
const PROMPT: &str = "> ";

// ─── Command line ───────────────────────────────────────────────────────────

/// A small modal text editor with a fuzzy file switcher.
#[derive(Debug, Parser)]
#[command(name = "stet", version, about)]
struct Args {
    /// File to edit. It is created on first save if it doesn't exist.
    #[arg(default_value = DEFAULT_FILE)]
    file: PathBuf,

    /// Config file [default: <config dir>/stet/config.toml]
    #[arg(long, value_name = "PATH", env = "STET_CONFIG")]
    config: Option<PathBuf>,

    /// Write logs here instead of the per-process file in the data dir.
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// More log detail (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

// ─── Key translation ────────────────────────────────────────────────────────

/// One editor input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stroke {
    Key(Key),
    Rune(char),
}

/// Map a terminal key event to an editor input. Keys the editor has no use
/// for (function keys, Alt chords, paging) map to `None`.
fn translate(event: &KeyEvent) -> Option<Stroke> {
    let ctrl = event.modifiers.contains(Modifiers::CTRL);
    let alt = event.modifiers.contains(Modifiers::ALT);
    let key = match event.code {
        KeyCode::Char(_) if alt => return None,
        KeyCode::Char(c) if ctrl => {
            return c
                .is_ascii_alphabetic()
                .then(|| Stroke::Key(Key::Ctrl(c.to_ascii_lowercase())));
        }
        KeyCode::Char(c) => return Some(Stroke::Rune(c)),
        KeyCode::Up => Key::Up,
        KeyCode::Down => Key::Down,
        KeyCode::Left => Key::Left,
        KeyCode::Right => Key::Right,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab if !event.modifiers.contains(Modifiers::SHIFT) => Key::Tab,
        KeyCode::Escape => Key::Escape,
        _ => return None,
    };
    Some(Stroke::Key(key))
}

// ─── Styles ─────────────────────────────────────────────────────────────────

const INVERSE: Style = Style::PLAIN.attrs(Attr::INVERSE);

const ERROR: Style = Style::PLAIN.fg(Color::RED).attrs(Attr::BOLD);

/// Mode badge at the left of the status row.
const fn badge(mode: ModeKind) -> Style {
    let accent = match mode {
        ModeKind::Normal => Color::BLUE,
        ModeKind::Input => Color::GREEN,
        ModeKind::Switch => Color::MAGENTA,
    };
    Style::PLAIN.fg(Color::BLACK).bg(accent).attrs(Attr::BOLD)
}

const fn cursor_shape(shape: mode::CursorShape) -> CursorShape {
    match shape {
        mode::CursorShape::SteadyBlock => CursorShape::SteadyBlock,
        mode::CursorShape::SteadyBar => CursorShape::SteadyBar,
    }
}

fn to_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

// ─── App ────────────────────────────────────────────────────────────────────

struct Stet {
    editor: Editor,
    cursor: Option<(u16, u16, CursorShape)>,
}

impl Stet {
    const fn new(editor: Editor) -> Self {
        Self {
            editor,
            cursor: None,
        }
    }

    fn paint_rows(frame: &mut Frame, view: &View) {
        for (y, row) in view.rows.iter().enumerate() {
            let y = to_u16(y);
            let style = if view.highlight == Some(usize::from(y)) {
                frame.fill(0, y, frame.width(), INVERSE);
                INVERSE
            } else {
                Style::PLAIN
            };
            frame.paint_text(0, y, row, style);
        }
    }

    fn paint_status(frame: &mut Frame, view: &View, y: u16) {
        let width = frame.width();
        frame.fill(0, y, width, INVERSE);

        let name = format!(" {} ", view.mode.display_name());
        let mut x = frame.paint_text(0, y, &name, badge(view.mode));
        x += frame.paint_text(x, y, " ", INVERSE);
        frame.paint_text(x, y, &view.status, INVERSE);

        let right = format!("{} ", view.status_right);
        let right_width = to_u16(view::display_width(right.chars(), 1));
        if right_width < width {
            frame.paint_text(width - right_width, y, &right, INVERSE);
        }
    }

    /// Paint the bottom row. Returns where a prompt cursor would go.
    fn paint_bottom(frame: &mut Frame, view: &View, y: u16) -> u16 {
        if view.mode == ModeKind::Switch {
            let x = frame.paint_text(0, y, PROMPT, Style::PLAIN);
            frame.paint_text(x, y, &view.prompt, Style::PLAIN);
            return x;
        }
        if let Some(message) = &view.message {
            let style = match message.kind {
                MessageKind::Info => Style::PLAIN,
                MessageKind::Error => ERROR,
            };
            frame.paint_text(0, y, &message.text, style);
        }
        0
    }
}

impl App for Stet {
    fn on_event(&mut self, event: &Event) -> Action {
        let Event::Key(key) = event;
        let flow = match translate(key) {
            Some(Stroke::Key(key)) => self.editor.key(key),
            Some(Stroke::Rune(ch)) => self.editor.rune(ch),
            None => Flow::Continue,
        };
        match flow {
            Flow::Continue => Action::Continue,
            Flow::Quit => Action::Quit,
        }
    }

    fn paint(&mut self, frame: &mut Frame) {
        let (width, height) = (frame.width(), frame.height());
        let text_height = height.saturating_sub(2);
        let view = self.editor.view(view::Size::new(
            usize::from(width),
            usize::from(text_height),
        ));

        Self::paint_rows(frame, &view);
        if height >= 2 {
            Self::paint_status(frame, &view, height - 2);
        }
        let prompt_x = if height >= 1 {
            Self::paint_bottom(frame, &view, height - 1)
        } else {
            0
        };

        let shape = cursor_shape(view.cursor_shape());
        self.cursor = match view.cursor {
            CursorPlacement::Text { row, col } if row < usize::from(text_height) && col < usize::from(width) => {
                Some((to_u16(col), to_u16(row), shape))
            }
            CursorPlacement::Prompt { col } if height >= 1 => {
                let x = prompt_x.saturating_add(to_u16(col)).min(width.saturating_sub(1));
                Some((x, height - 1, shape))
            }
            _ => None,
        };
    }

    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        self.cursor
    }
}

// ─── Entry point ────────────────────────────────────────────────────────────

fn run(args: &Args) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if !terminal::is_tty() {
        bail!("stdin is not a terminal");
    }

    let editor = Editor::open(Box::new(Disk), config, &args.file)
        .with_context(|| format!("opening {}", args.file.display()))?;
    let mut app = Stet::new(editor);

    EventLoop::new().run(&mut app).context("terminal")
}

/// Turn the outcome of [`run`] into an exit code, logging failures.
fn report(result: Result<()>) -> ExitCode {
    match result {
        Ok(()) => {
            info!("exiting");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e:#}");
            eprintln!("stet: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    // Held until the end of `main`: dropping it flushes the log file.
    let log = match logging::init(args.log_file.as_deref(), args.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("stet: {e:#}");
            return ExitCode::FAILURE;
        }
    };
    info!(log = %log.path.display(), file = %args.file.display(), "starting");

    report(run(&args))
}

// ─── Tests ──────────────────────────────────────────────────────────────────
