// SPDX-License-Identifier: MIT
//
// Input parsing: raw stdin bytes to key events.
//
// The parser is incremental. Bytes arrive in arbitrary chunks, so a chunk may
// end halfway through an escape sequence or a UTF-8 character; the leftover
// is kept until the next `advance`. A lone ESC is the one real ambiguity (the
// Escape key, or the first byte of a sequence still in flight). The parser
// holds it, and the event loop calls `flush` once stdin has been quiet for a
// few milliseconds, turning it into a plain Escape press.
//
// Recognised encodings:
//
//   0x01..=0x1A         Ctrl+letter (except Tab, Enter)
//   0x08, 0x7F          Backspace
//   0x09 / 0x0A, 0x0D   Tab / Enter
//   ESC [ ... final     CSI: arrows, Home/End, editing keys, F-keys, with
//                       xterm modifier parameters (`ESC [ 1 ; 5 A`)
//   ESC O x             SS3: arrows, Home/End, F1–F4
//   ESC <byte>          Alt+key
//   UTF-8               printable characters

use bitflags::bitflags;

// ─── Events ─────────────────────────────────────────────────────────────────

/// A terminal input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
}

/// A key press with its modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: KeyCode,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn plain(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: Modifiers::empty(),
        }
    }

    #[must_use]
    pub const fn with(code: KeyCode, modifiers: Modifiers) -> Self {
        Self { code, modifiers }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    Char(char),
    Enter,
    Tab,
    Backspace,
    Escape,
    Delete,
    Insert,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,
    /// Function key F1–F12.
    F(u8),
}

bitflags! {
    /// Modifier keys held with a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 1 << 0;
        const ALT   = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

// ─── Parser ─────────────────────────────────────────────────────────────────

/// Incremental byte-to-event parser.
#[derive(Debug, Default)]
pub struct Parser {
    pending: Vec<u8>,
}

enum Parsed {
    /// An event, consuming this many bytes.
    Event(Event, usize),
    /// Need more bytes to decide.
    Incomplete,
    /// Unrecognised, drop this many bytes.
    Skip(usize),
}

impl Parser {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    /// Feed bytes and return every complete event. An incomplete tail stays
    /// buffered for the next call.
    pub fn advance(&mut self, bytes: &[u8]) -> Vec<Event> {
        self.pending.extend_from_slice(bytes);

        let mut events = Vec::new();
        let mut pos = 0;
        while pos < self.pending.len() {
            match parse(&self.pending[pos..]) {
                Parsed::Event(event, used) => {
                    events.push(event);
                    pos += used;
                }
                Parsed::Skip(used) => pos += used.max(1),
                Parsed::Incomplete => break,
            }
        }
        self.pending.drain(..pos);
        events
    }

    /// Whether bytes are held back waiting for the rest of a sequence.
    #[inline]
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Resolve held bytes after an input pause. A leading ESC becomes the
    /// Escape key and whatever follows is parsed again; a truncated UTF-8
    /// character is dropped.
    pub fn flush(&mut self) -> Vec<Event> {
        let mut events = Vec::new();
        while !self.pending.is_empty() {
            if self.pending[0] == 0x1B {
                events.push(Event::Key(KeyEvent::plain(KeyCode::Escape)));
                self.pending.remove(0);
                let rest = std::mem::take(&mut self.pending);
                events.extend(self.advance(&rest));
            } else {
                self.pending.clear();
            }
        }
        events
    }
}

// ─── Decoding ───────────────────────────────────────────────────────────────

const fn key(code: KeyCode, modifiers: Modifiers) -> Event {
    Event::Key(KeyEvent::with(code, modifiers))
}

const fn plain(code: KeyCode) -> Event {
    Event::Key(KeyEvent::plain(code))
}

/// Ctrl+letter for bytes 0x01..=0x1A.
const fn control(byte: u8) -> KeyCode {
    KeyCode::Char((byte - 1 + b'a') as char)
}

fn parse(buf: &[u8]) -> Parsed {
    let Some(&first) = buf.first() else {
        return Parsed::Skip(0);
    };
    match first {
        0x1B => parse_escape(buf),
        0x00 => Parsed::Event(key(KeyCode::Char(' '), Modifiers::CTRL), 1),
        0x08 | 0x7F => Parsed::Event(plain(KeyCode::Backspace), 1),
        0x09 => Parsed::Event(plain(KeyCode::Tab), 1),
        0x0A | 0x0D => Parsed::Event(plain(KeyCode::Enter), 1),
        b @ 0x01..=0x1A => Parsed::Event(key(control(b), Modifiers::CTRL), 1),
        b @ 0x20..=0x7E => Parsed::Event(plain(KeyCode::Char(b as char)), 1),
        0xC0..=0xFF => parse_utf8(buf),
        _ => Parsed::Skip(1),
    }
}

fn parse_escape(buf: &[u8]) -> Parsed {
    let Some(&second) = buf.get(1) else {
        return Parsed::Incomplete;
    };
    match second {
        b'[' => parse_csi(buf),
        b'O' => parse_ss3(buf),
        0x1B => Parsed::Event(key(KeyCode::Escape, Modifiers::ALT), 2),
        0x7F => Parsed::Event(key(KeyCode::Backspace, Modifiers::ALT), 2),
        0x0D => Parsed::Event(key(KeyCode::Enter, Modifiers::ALT), 2),
        b @ 0x01..=0x1A => Parsed::Event(key(control(b), Modifiers::ALT | Modifiers::CTRL), 2),
        b @ 0x20..=0x7E => Parsed::Event(key(KeyCode::Char(b as char), Modifiers::ALT), 2),
        _ => Parsed::Event(plain(KeyCode::Escape), 1),
    }
}

fn parse_csi(buf: &[u8]) -> Parsed {
    // Parameter and intermediate bytes run until a final byte in 0x40..=0x7E.
    let mut end = 2;
    loop {
        let Some(&b) = buf.get(end) else {
            return Parsed::Incomplete;
        };
        if (0x40..=0x7E).contains(&b) {
            break;
        }
        if !(0x20..=0x3F).contains(&b) {
            return Parsed::Skip(end + 1);
        }
        end += 1;
    }

    let used = end + 1;
    let params = parse_params(&buf[2..end]);
    let modifiers = params.get(1).map_or(Modifiers::empty(), |&m| decode_modifiers(m));

    let code = match buf[end] {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        b'Z' => return Parsed::Event(key(KeyCode::Tab, Modifiers::SHIFT), used),
        b'~' => match params.first().copied().unwrap_or(0) {
            1 | 7 => KeyCode::Home,
            2 => KeyCode::Insert,
            3 => KeyCode::Delete,
            4 | 8 => KeyCode::End,
            5 => KeyCode::PageUp,
            6 => KeyCode::PageDown,
            n @ 11..=15 => KeyCode::F(n - 10),
            n @ 17..=21 => KeyCode::F(n - 11),
            n @ 23..=24 => KeyCode::F(n - 12),
            _ => return Parsed::Skip(used),
        },
        _ => return Parsed::Skip(used),
    };
    Parsed::Event(key(code, modifiers), used)
}

fn parse_ss3(buf: &[u8]) -> Parsed {
    let Some(&b) = buf.get(2) else {
        return Parsed::Incomplete;
    };
    let code = match b {
        b'A' => KeyCode::Up,
        b'B' => KeyCode::Down,
        b'C' => KeyCode::Right,
        b'D' => KeyCode::Left,
        b'H' => KeyCode::Home,
        b'F' => KeyCode::End,
        b'P' => KeyCode::F(1),
        b'Q' => KeyCode::F(2),
        b'R' => KeyCode::F(3),
        b'S' => KeyCode::F(4),
        _ => return Parsed::Skip(3),
    };
    Parsed::Event(plain(code), 3)
}

fn parse_utf8(buf: &[u8]) -> Parsed {
    let len = match buf[0] {
        0xC0..=0xDF => 2,
        0xE0..=0xEF => 3,
        0xF0..=0xF7 => 4,
        _ => return Parsed::Skip(1),
    };
    if buf.len() < len {
        return Parsed::Incomplete;
    }
    std::str::from_utf8(&buf[..len])
        .ok()
        .and_then(|s| s.chars().next())
        .map_or(Parsed::Skip(1), |ch| Parsed::Event(plain(KeyCode::Char(ch)), len))
}

/// Semicolon-separated decimal parameters. Empty fields read as 0; any
/// colon sub-parameter is ignored.
fn parse_params(raw: &[u8]) -> Vec<u8> {
    if raw.is_empty() {
        return Vec::new();
    }
    raw.split(|&b| b == b';')
        .map(|field| {
            field
                .iter()
                .take_while(|b| b.is_ascii_digit())
                .fold(0u8, |n, &d| n.saturating_mul(10).saturating_add(d - b'0'))
        })
        .collect()
}

/// xterm modifier parameter: 1 + (shift | alt << 1 | ctrl << 2).
fn decode_modifiers(param: u8) -> Modifiers {
    Modifiers::from_bits_truncate(param.saturating_sub(1))
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn keys(bytes: &[u8]) -> Vec<KeyEvent> {
        Parser::new()
            .advance(bytes)
            .into_iter()
            .map(|Event::Key(k)| k)
            .collect()
    }

    fn one(bytes: &[u8]) -> KeyEvent {
        let all = keys(bytes);
        assert_eq!(all.len(), 1, "expected one event from {bytes:?}, got {all:?}");
        all[0]
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::with(KeyCode::Char(c), Modifiers::CTRL)
    }

    // ── Single bytes ────────────────────────────────────────────

    #[test]
    fn printable_ascii() {
        assert_eq!(
            keys(b"aZ~"),
            vec![
                KeyEvent::plain(KeyCode::Char('a')),
                KeyEvent::plain(KeyCode::Char('Z')),
                KeyEvent::plain(KeyCode::Char('~')),
            ]
        );
    }

    #[test]
    fn control_bytes() {
        assert_eq!(one(b"\x01"), ctrl('a'));
        assert_eq!(one(b"\x13"), ctrl('s'));
        assert_eq!(one(b"\x11"), ctrl('q'));
        assert_eq!(one(b"\x1A"), ctrl('z'));
        assert_eq!(one(b"\x09"), KeyEvent::plain(KeyCode::Tab));
        assert_eq!(one(b"\x0D"), KeyEvent::plain(KeyCode::Enter));
        assert_eq!(one(b"\x0A"), KeyEvent::plain(KeyCode::Enter));
        assert_eq!(one(b"\x7F"), KeyEvent::plain(KeyCode::Backspace));
        assert_eq!(one(b"\x08"), KeyEvent::plain(KeyCode::Backspace));
    }

    // ── Escape sequences ────────────────────────────────────────

    #[test]
    fn csi_arrows() {
        assert_eq!(one(b"\x1b[A"), KeyEvent::plain(KeyCode::Up));
        assert_eq!(one(b"\x1b[B"), KeyEvent::plain(KeyCode::Down));
        assert_eq!(one(b"\x1b[C"), KeyEvent::plain(KeyCode::Right));
        assert_eq!(one(b"\x1b[D"), KeyEvent::plain(KeyCode::Left));
    }

    #[test]
    fn ss3_arrows() {
        assert_eq!(one(b"\x1bOA"), KeyEvent::plain(KeyCode::Up));
        assert_eq!(one(b"\x1bOD"), KeyEvent::plain(KeyCode::Left));
        assert_eq!(one(b"\x1bOP"), KeyEvent::plain(KeyCode::F(1)));
    }

    #[test]
    fn modified_arrows() {
        assert_eq!(one(b"\x1b[1;5C"), KeyEvent::with(KeyCode::Right, Modifiers::CTRL));
        assert_eq!(
            one(b"\x1b[1;4A"),
            KeyEvent::with(KeyCode::Up, Modifiers::SHIFT | Modifiers::ALT)
        );
    }

    #[test]
    fn tilde_keys() {
        assert_eq!(one(b"\x1b[3~"), KeyEvent::plain(KeyCode::Delete));
        assert_eq!(one(b"\x1b[2~"), KeyEvent::plain(KeyCode::Insert));
        assert_eq!(one(b"\x1b[1~"), KeyEvent::plain(KeyCode::Home));
        assert_eq!(one(b"\x1b[4~"), KeyEvent::plain(KeyCode::End));
        assert_eq!(one(b"\x1b[5~"), KeyEvent::plain(KeyCode::PageUp));
        assert_eq!(one(b"\x1b[6~"), KeyEvent::plain(KeyCode::PageDown));
        assert_eq!(one(b"\x1b[15~"), KeyEvent::plain(KeyCode::F(5)));
        assert_eq!(one(b"\x1b[24~"), KeyEvent::plain(KeyCode::F(12)));
        assert_eq!(one(b"\x1b[3;5~"), KeyEvent::with(KeyCode::Delete, Modifiers::CTRL));
    }

    #[test]
    fn back_tab() {
        assert_eq!(one(b"\x1b[Z"), KeyEvent::with(KeyCode::Tab, Modifiers::SHIFT));
    }

    #[test]
    fn alt_keys() {
        assert_eq!(one(b"\x1bx"), KeyEvent::with(KeyCode::Char('x'), Modifiers::ALT));
        assert_eq!(
            one(b"\x1b\x01"),
            KeyEvent::with(KeyCode::Char('a'), Modifiers::ALT | Modifiers::CTRL)
        );
    }

    #[test]
    fn unknown_csi_is_skipped() {
        assert_eq!(keys(b"\x1b[99~a"), vec![KeyEvent::plain(KeyCode::Char('a'))]);
        assert_eq!(keys(b"\x1b[?1uq"), vec![KeyEvent::plain(KeyCode::Char('q'))]);
    }

    // ── UTF-8 ───────────────────────────────────────────────────

    #[test]
    fn utf8_characters() {
        assert_eq!(
            keys("é中🦀".as_bytes()),
            vec![
                KeyEvent::plain(KeyCode::Char('é')),
                KeyEvent::plain(KeyCode::Char('中')),
                KeyEvent::plain(KeyCode::Char('🦀')),
            ]
        );
    }

    #[test]
    fn invalid_utf8_is_skipped() {
        assert_eq!(keys(b"\xC3(a"), vec![
            KeyEvent::plain(KeyCode::Char('(')),
            KeyEvent::plain(KeyCode::Char('a')),
        ]);
        assert_eq!(keys(b"\x80"), vec![]);
    }

    // ── Chunking ────────────────────────────────────────────────

    #[test]
    fn split_sequence_waits_for_rest() {
        let mut p = Parser::new();
        assert_eq!(p.advance(b"\x1b["), vec![]);
        assert!(p.has_pending());
        assert_eq!(p.advance(b"A"), vec![Event::Key(KeyEvent::plain(KeyCode::Up))]);
        assert!(!p.has_pending());
    }

    #[test]
    fn split_utf8_waits_for_rest() {
        let bytes = "中".as_bytes();
        let mut p = Parser::new();
        assert_eq!(p.advance(&bytes[..1]), vec![]);
        assert_eq!(p.advance(&bytes[1..]), vec![Event::Key(KeyEvent::plain(KeyCode::Char('中')))]);
    }

    #[test]
    fn lone_escape_resolves_on_flush() {
        let mut p = Parser::new();
        assert_eq!(p.advance(b"\x1b"), vec![]);
        assert!(p.has_pending());
        assert_eq!(p.flush(), vec![Event::Key(KeyEvent::plain(KeyCode::Escape))]);
        assert!(!p.has_pending());
    }

    #[test]
    fn flush_reparses_after_escape() {
        let mut p = Parser::new();
        assert_eq!(p.advance(b"\x1b[1;"), vec![]);
        assert_eq!(p.flush(), vec![
            Event::Key(KeyEvent::plain(KeyCode::Escape)),
            Event::Key(KeyEvent::plain(KeyCode::Char('['))),
            Event::Key(KeyEvent::plain(KeyCode::Char('1'))),
            Event::Key(KeyEvent::plain(KeyCode::Char(';'))),
        ]);
    }

    #[test]
    fn double_escape_is_alt_escape() {
        assert_eq!(keys(b"\x1b\x1b["), vec![
            KeyEvent::with(KeyCode::Escape, Modifiers::ALT),
            KeyEvent::plain(KeyCode::Char('[')),
        ]);
    }

    #[test]
    fn flush_drops_truncated_utf8() {
        let mut p = Parser::new();
        p.advance(&"中".as_bytes()[..2]);
        assert_eq!(p.flush(), vec![]);
        assert!(!p.has_pending());
    }

    #[test]
    fn modifier_decoding() {
        assert_eq!(decode_modifiers(1), Modifiers::empty());
        assert_eq!(decode_modifiers(2), Modifiers::SHIFT);
        assert_eq!(decode_modifiers(5), Modifiers::CTRL);
        assert_eq!(decode_modifiers(8), Modifiers::all());
        assert_eq!(decode_modifiers(0), Modifiers::empty());
    }

    #[test]
    fn params() {
        assert_eq!(parse_params(b""), Vec::<u8>::new());
        assert_eq!(parse_params(b"1;5"), vec![1, 5]);
        assert_eq!(parse_params(b";3"), vec![0, 3]);
        assert_eq!(parse_params(b"3:1"), vec![3]);
    }
}
