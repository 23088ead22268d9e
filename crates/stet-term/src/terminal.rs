// SPDX-License-Identifier: MIT
//
// Owning the tty while stet runs.
//
// `enter` puts stdin in raw mode and draws on the alternate screen; `leave`
// (also run on drop) writes the teardown bytes and hands the cooked termios
// back. A panic takes a third path: the hook renders the same teardown into
// a Vec and writes it with write(2) on fd 1, since the panicking thread may
// be holding the stdout lock.
//
// Raw mode uses VMIN = 0 and VTIME = 0. Reads never block; the event loop
// waits in poll(2) instead.
//
// tcgetattr, tcsetattr, cfmakeraw, ioctl, isatty and write come from libc.
// Each unsafe block holds one call.
#![allow(unsafe_code)]

use std::io::{self, Write};
#[cfg(unix)]
use std::sync::Mutex;
use std::sync::Once;

use tracing::debug;

use crate::ansi::{self, CursorShape};

// ─── Size ───────────────────────────────────────────────────────────────────

/// Terminal dimensions in cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub cols: u16,
    pub rows: u16,
}

impl Size {
    /// Assumed when stdout is not a tty.
    pub const FALLBACK: Self = Self { cols: 80, rows: 24 };
}

/// Window size of stdout, if it is a tty with a non-zero size.
#[cfg(unix)]
#[must_use]
pub fn get_size() -> Option<Size> {
    let mut ws = unsafe { std::mem::zeroed::<libc::winsize>() };
    if unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) } != 0 {
        return None;
    }
    match (ws.ws_col, ws.ws_row) {
        (0, _) | (_, 0) => None,
        (cols, rows) => Some(Size { cols, rows }),
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn get_size() -> Option<Size> {
    None
}

#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) == 1 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Teardown ───────────────────────────────────────────────────────────────

/// Give the screen back to the shell. The alternate screen is left last so
/// the restored shell contents come back with default styling.
fn write_teardown(w: &mut impl Write) -> io::Result<()> {
    ansi::end_sync(w)?;
    ansi::reset(w)?;
    ansi::set_cursor_shape(w, CursorShape::Default)?;
    ansi::cursor_show(w)?;
    ansi::exit_alt_screen(w)
}

fn teardown_bytes() -> Vec<u8> {
    let mut bytes = Vec::with_capacity(32);
    // Writes into a Vec cannot fail.
    let _ = write_teardown(&mut bytes);
    bytes
}

// ─── Raw mode ───────────────────────────────────────────────────────────────

/// Cooked settings while raw mode is on. Read by the panic hook.
#[cfg(unix)]
static COOKED: Mutex<Option<libc::termios>> = Mutex::new(None);

#[cfg(unix)]
fn set_attrs(settings: &libc::termios, when: libc::c_int) -> io::Result<()> {
    if unsafe { libc::tcsetattr(libc::STDIN_FILENO, when, settings) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

/// Stdin switched to raw mode, remembering what to switch back to.
#[cfg(unix)]
struct RawMode {
    cooked: libc::termios,
}

#[cfg(unix)]
impl RawMode {
    /// `None` when stdin is not a tty and there is nothing to switch.
    fn enable() -> io::Result<Option<Self>> {
        if !is_tty() {
            return Ok(None);
        }
        let mut cooked = unsafe { std::mem::zeroed::<libc::termios>() };
        if unsafe { libc::tcgetattr(libc::STDIN_FILENO, &raw mut cooked) } != 0 {
            return Err(io::Error::last_os_error());
        }

        let mut settings = cooked;
        unsafe { libc::cfmakeraw(&raw mut settings) };
        settings.c_cc[libc::VMIN] = 0;
        settings.c_cc[libc::VTIME] = 0;
        set_attrs(&settings, libc::TCSAFLUSH)?;

        if let Ok(mut slot) = COOKED.lock() {
            *slot = Some(cooked);
        }
        Ok(Some(Self { cooked }))
    }

    fn restore(self) -> io::Result<()> {
        if let Ok(mut slot) = COOKED.lock() {
            *slot = None;
        }
        set_attrs(&self.cooked, libc::TCSAFLUSH)
    }
}

#[cfg(not(unix))]
struct RawMode;

#[cfg(not(unix))]
impl RawMode {
    #[allow(clippy::unnecessary_wraps)]
    const fn enable() -> io::Result<Option<Self>> {
        Ok(None)
    }

    #[allow(clippy::unnecessary_wraps)]
    const fn restore(self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Panic hook ─────────────────────────────────────────────────────────────

static PANIC_HOOK: Once = Once::new();

fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_teardown();
            previous(info);
        }));
    });
}

#[cfg(unix)]
fn emergency_teardown() {
    let bytes = teardown_bytes();
    unsafe {
        let _ = libc::write(libc::STDOUT_FILENO, bytes.as_ptr().cast(), bytes.len());
    }
    if let Ok(slot) = COOKED.lock() {
        if let Some(cooked) = slot.as_ref() {
            let _ = set_attrs(cooked, libc::TCSANOW);
        }
    }
}

#[cfg(not(unix))]
fn emergency_teardown() {
    let _ = io::stdout().write_all(&teardown_bytes());
}

// ─── Terminal ───────────────────────────────────────────────────────────────

/// Handle on the controlling terminal. Cooked until [`enter`](Self::enter);
/// dropping an entered handle leaves again.
pub struct Terminal {
    raw: Option<RawMode>,
    size: Size,
    active: bool,
}

impl Terminal {
    #[must_use]
    pub fn new() -> Self {
        Self {
            raw: None,
            size: get_size().unwrap_or(Size::FALLBACK),
            active: false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Query the size again after SIGWINCH. A failed query keeps the old one.
    pub fn refresh_size(&mut self) -> Size {
        self.size = get_size().unwrap_or(self.size);
        self.size
    }

    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// Switch to raw mode on a blank alternate screen with the cursor
    /// hidden. Entering twice does nothing.
    ///
    /// # Errors
    ///
    /// termios or stdout failures. Raw mode that was already switched on is
    /// undone by [`leave`](Self::leave) or drop.
    pub fn enter(&mut self) -> io::Result<()> {
        if self.active {
            return Ok(());
        }
        install_panic_hook();
        self.raw = RawMode::enable()?;
        self.active = true;

        let mut out = io::stdout().lock();
        ansi::enter_alt_screen(&mut out)?;
        ansi::cursor_hide(&mut out)?;
        ansi::clear_screen(&mut out)?;
        out.flush()?;

        debug!(
            cols = self.size.cols,
            rows = self.size.rows,
            raw = self.raw.is_some(),
            "entered terminal"
        );
        Ok(())
    }

    /// Write the teardown and restore cooked mode. Both are attempted even
    /// if the first fails. Leaving an inactive terminal does nothing.
    ///
    /// # Errors
    ///
    /// The first stdout or termios failure.
    pub fn leave(&mut self) -> io::Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let written = {
            let mut out = io::stdout().lock();
            write_teardown(&mut out).and_then(|()| out.flush())
        };
        let restored = self.raw.take().map_or(Ok(()), RawMode::restore);
        debug!("left terminal");
        written.and(restored)
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Terminal {
    fn drop(&mut self) {
        let _ = self.leave();
    }
}

// ─── Tests ──────────────────────────────────────────────────────────────────
