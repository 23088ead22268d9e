// SPDX-License-Identifier: MIT
//
// Event loop: wait for stdin, parse, dispatch, repaint.
//
// sigaction, poll and read on fd 0 go through libc. Each unsafe block wraps
// a single call.
#![allow(unsafe_code)]
//
// Everything runs on one thread. The loop sleeps in poll(2) on stdin. When
// bytes arrive they are parsed and every event is handed to the `App` before
// anything is drawn; then the frame is painted once and diffed out. The poll
// timeout is short only while the parser holds an unfinished sequence: if
// nothing follows within `ESCAPE_TIMEOUT`, the held bytes are flushed (a
// lone ESC becomes the Escape key).
//
// Resizes arrive as SIGWINCH. The handler only sets a flag; poll returns
// EINTR, and the loop picks up the new size on its next pass.

use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{debug, trace};

use crate::ansi::{self, CursorShape};
use crate::frame::{Frame, Renderer};
use crate::input::{Event, Parser};
use crate::terminal::{Size, Terminal};

/// How long a partial escape sequence may wait for its remaining bytes.
pub const ESCAPE_TIMEOUT: Duration = Duration::from_millis(25);

/// Poll timeout with nothing pending. Only bounds how late a missed resize
/// signal can be noticed.
const IDLE_TIMEOUT: Duration = Duration::from_millis(500);

const READ_CHUNK: usize = 1024;

// ─── SIGWINCH ───────────────────────────────────────────────────────────────

static RESIZED: AtomicBool = AtomicBool::new(false);

#[cfg(unix)]
fn install_resize_handler() {
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_sigwinch as *const () as usize;
        libc::sigemptyset(&raw mut action.sa_mask);
        libc::sigaction(libc::SIGWINCH, &raw const action, std::ptr::null_mut());
    }
}

#[cfg(unix)]
extern "C" fn on_sigwinch(_: libc::c_int) {
    RESIZED.store(true, Ordering::Relaxed);
}

#[cfg(not(unix))]
fn install_resize_handler() {}

// ─── stdin ──────────────────────────────────────────────────────────────────

/// What one wait on stdin produced.
#[derive(Debug, PartialEq, Eq)]
enum Input {
    Bytes(Vec<u8>),
    /// Timed out, or interrupted by a signal.
    Idle,
    /// stdin was closed.
    Closed,
}

#[cfg(unix)]
fn wait_for_input(timeout: Duration) -> io::Result<Input> {
    let mut fds = libc::pollfd {
        fd: libc::STDIN_FILENO,
        events: libc::POLLIN,
        revents: 0,
    };
    let millis = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);
    let ready = unsafe { libc::poll(&raw mut fds, 1, millis) };
    if ready < 0 {
        let err = io::Error::last_os_error();
        return if err.kind() == io::ErrorKind::Interrupted {
            Ok(Input::Idle)
        } else {
            Err(err)
        };
    }
    if ready == 0 {
        return Ok(Input::Idle);
    }

    let mut buf = [0u8; READ_CHUNK];
    let n = unsafe { libc::read(libc::STDIN_FILENO, buf.as_mut_ptr().cast(), buf.len()) };
    match n {
        n if n > 0 => Ok(Input::Bytes(buf[..n.unsigned_abs()].to_vec())),
        0 if fds.revents & libc::POLLHUP != 0 => Ok(Input::Closed),
        // Readable but empty with VMIN = 0: nothing there after all.
        0 => Ok(Input::Idle),
        _ => {
            let err = io::Error::last_os_error();
            match err.kind() {
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock => Ok(Input::Idle),
                _ => Err(err),
            }
        }
    }
}

#[cfg(not(unix))]
fn wait_for_input(_: Duration) -> io::Result<Input> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "terminal input needs a unix tty",
    ))
}

// ─── App ────────────────────────────────────────────────────────────────────

/// What the application wants after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Continue,
    Quit,
}

/// A terminal application driven by [`EventLoop`].
///
/// Per pass the loop calls [`on_event`](App::on_event) for each parsed
/// event, [`on_resize`](App::on_resize) after a size change, then
/// [`paint`](App::paint) into a blank frame and [`cursor`](App::cursor) to
/// place the hardware cursor.
pub trait App {
    fn on_event(&mut self, event: &Event) -> Action;

    fn on_resize(&mut self, _size: Size) {}

    fn paint(&mut self, frame: &mut Frame);

    /// Where to show the cursor after painting, or `None` to hide it.
    fn cursor(&self) -> Option<(u16, u16, CursorShape)> {
        None
    }
}

/// Hand `events` to the app in order, stopping at the first quit.
fn dispatch(app: &mut impl App, events: &[Event]) -> Action {
    for event in events {
        trace!(?event, "dispatch");
        if app.on_event(event) == Action::Quit {
            return Action::Quit;
        }
    }
    Action::Continue
}

const fn poll_timeout(pending: bool) -> Duration {
    if pending { ESCAPE_TIMEOUT } else { IDLE_TIMEOUT }
}

// ─── EventLoop ──────────────────────────────────────────────────────────────

/// Owns the terminal, the input parser and the renderer.
pub struct EventLoop {
    terminal: Terminal,
    parser: Parser,
    renderer: Renderer,
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        Self {
            terminal: Terminal::new(),
            parser: Parser::new(),
            renderer: Renderer::new(),
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.terminal.size()
    }

    /// Take over the terminal and run until the app quits or stdin closes.
    /// The terminal is restored whatever the outcome.
    ///
    /// # Errors
    ///
    /// Terminal setup, stdin and stdout failures.
    pub fn run(&mut self, app: &mut impl App) -> io::Result<()> {
        self.terminal.enter()?;
        install_resize_handler();
        let result = self.run_inner(app);
        let left = self.terminal.leave();
        result.and(left)
    }

    fn run_inner(&mut self, app: &mut impl App) -> io::Result<()> {
        let size = self.terminal.size();
        let mut frame = Frame::new(size.cols, size.rows);
        app.on_resize(size);
        let mut dirty = true;

        loop {
            if RESIZED.swap(false, Ordering::Relaxed) {
                let size = self.terminal.refresh_size();
                debug!(cols = size.cols, rows = size.rows, "resized");
                frame.resize(size.cols, size.rows);
                self.renderer.force_redraw();
                app.on_resize(size);
                dirty = true;
            }

            if dirty {
                self.draw(app, &mut frame)?;
                dirty = false;
            }

            let events = match wait_for_input(poll_timeout(self.parser.has_pending()))? {
                Input::Bytes(bytes) => self.parser.advance(&bytes),
                Input::Idle if self.parser.has_pending() => self.parser.flush(),
                Input::Idle => continue,
                Input::Closed => {
                    debug!("stdin closed");
                    return Ok(());
                }
            };
            if dispatch(app, &events) == Action::Quit {
                return Ok(());
            }
            dirty |= !events.is_empty();
        }
    }

    fn draw(&mut self, app: &mut impl App, frame: &mut Frame) -> io::Result<()> {
        frame.clear();
        app.paint(frame);
        self.renderer.render(frame);

        let stdout = io::stdout();
        let mut lock = stdout.lock();
        self.renderer.flush_to(&mut lock)?;
        match app.cursor() {
            Some((x, y, shape)) => {
                ansi::cursor_to(&mut lock, x, y)?;
                ansi::set_cursor_shape(&mut lock, shape)?;
                ansi::cursor_show(&mut lock)?;
            }
            None => ansi::cursor_hide(&mut lock)?,
        }
        lock.flush()
    }
}

impl Default for EventLoop {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
