// SPDX-License-Identifier: MIT
//
// Frame: a grid of styled cells, and the renderer that puts it on screen.
//
// The application paints a whole `Frame` every time something changes. The
// `Renderer` keeps the frame it drew last and compares row by row: a row
// equal to its previous version costs nothing, a changed row is rewritten
// from column 0 with the minimum of SGR switches. A resize (or the very first
// frame) clears the screen and draws everything. All output for one frame
// goes into a byte buffer wrapped in synchronized-output markers and reaches
// the terminal in a single write.
//
// Wide characters (CJK, most emoji) take two columns. The first cell holds
// the character; the second is a continuation cell that the renderer skips,
// since the terminal already advanced over it.

use std::io::{self, Write};

use unicode_width::UnicodeWidthChar;

use crate::ansi::{self, Style};

// ─── Cell ───────────────────────────────────────────────────────────────────

/// One screen position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

impl Cell {
    /// A space with terminal-default colors.
    pub const BLANK: Self = Self {
        ch: ' ',
        style: Style::PLAIN,
    };

    #[must_use]
    pub const fn new(ch: char, style: Style) -> Self {
        Self { ch, style }
    }

    /// The right half of a wide character.
    #[must_use]
    pub const fn continuation(style: Style) -> Self {
        Self { ch: '\0', style }
    }

    #[inline]
    #[must_use]
    pub const fn is_continuation(&self) -> bool {
        self.ch == '\0'
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self::BLANK
    }
}

// ─── Frame ──────────────────────────────────────────────────────────────────

/// A `width × height` grid of cells, row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    width: u16,
    height: u16,
    cells: Vec<Cell>,
}

impl Frame {
    #[must_use]
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            width,
            height,
            cells: vec![Cell::BLANK; usize::from(width) * usize::from(height)],
        }
    }

    #[inline]
    #[must_use]
    pub const fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    #[must_use]
    pub const fn height(&self) -> u16 {
        self.height
    }

    /// Change dimensions. Contents are blanked.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        self.cells.clear();
        self.cells
            .resize(usize::from(width) * usize::from(height), Cell::BLANK);
    }

    /// Blank every cell.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    const fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[must_use]
    pub fn get(&self, x: u16, y: u16) -> Option<&Cell> {
        (x < self.width && y < self.height).then(|| &self.cells[self.index(x, y)])
    }

    #[must_use]
    pub fn row(&self, y: u16) -> Option<&[Cell]> {
        if y >= self.height {
            return None;
        }
        let start = self.index(0, y);
        Some(&self.cells[start..start + usize::from(self.width)])
    }

    /// Write one cell. Returns false when `(x, y)` is off the grid.
    ///
    /// A wide character cut in half by the write loses its other half,
    /// which becomes a blank in the same style.
    pub fn set(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if x >= self.width || y >= self.height {
            return false;
        }
        self.split_wide(x, y);
        let idx = self.index(x, y);
        self.cells[idx] = cell;
        true
    }

    fn split_wide(&mut self, x: u16, y: u16) {
        let idx = self.index(x, y);
        if self.cells[idx].is_continuation() && x > 0 {
            self.cells[idx - 1].ch = ' ';
        }
        if x + 1 < self.width && self.cells[idx + 1].is_continuation() {
            self.cells[idx + 1].ch = ' ';
        }
    }

    /// Paint `count` blanks in `style` starting at `(x, y)`, clipped to the
    /// row.
    pub fn fill(&mut self, x: u16, y: u16, count: u16, style: Style) {
        let end = x.saturating_add(count).min(self.width);
        for col in x..end {
            self.set(col, y, Cell::new(' ', style));
        }
    }

    /// Paint `text` left to right from `(x, y)`, clipped at the right edge.
    /// Zero-width and control characters are skipped; a wide character that
    /// would straddle the edge is painted as a blank. Returns the number of
    /// columns used.
    pub fn paint_text(&mut self, x: u16, y: u16, text: &str, style: Style) -> u16 {
        if y >= self.height {
            return 0;
        }
        let mut col = x;
        for ch in text.chars() {
            if col >= self.width {
                break;
            }
            if ch.is_control() {
                continue;
            }
            match ch.width() {
                Some(1) => {
                    self.set(col, y, Cell::new(ch, style));
                    col += 1;
                }
                Some(2) if col + 1 < self.width => {
                    self.set(col, y, Cell::new(ch, style));
                    self.set(col + 1, y, Cell::continuation(style));
                    col += 2;
                }
                Some(2) => {
                    self.set(col, y, Cell::new(' ', style));
                    col += 1;
                    break;
                }
                _ => {}
            }
        }
        col - x
    }

    /// The characters of row `y` as a string, continuation cells left out.
    #[must_use]
    pub fn row_text(&self, y: u16) -> String {
        self.row(y)
            .unwrap_or_default()
            .iter()
            .filter(|c| !c.is_continuation())
            .map(|c| c.ch)
            .collect()
    }
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Frame({}x{})", self.width, self.height)
    }
}

// ─── Renderer ───────────────────────────────────────────────────────────────

/// Row-diffing frame renderer.
#[derive(Debug, Default)]
pub struct Renderer {
    previous: Option<Frame>,
    out: Vec<u8>,
}

impl Renderer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `frame` against the previously rendered one. Returns the
    /// number of rows that were redrawn. The bytes wait in the renderer
    /// until [`flush_to`](Self::flush_to).
    pub fn render(&mut self, frame: &Frame) -> usize {
        self.out.clear();
        if frame.width() == 0 || frame.height() == 0 {
            self.previous = Some(frame.clone());
            return 0;
        }

        let full = self
            .previous
            .as_ref()
            .is_none_or(|prev| prev.width() != frame.width() || prev.height() != frame.height());

        // Writes into a Vec can't fail.
        let _ = ansi::begin_sync(&mut self.out);
        if full {
            let _ = ansi::reset(&mut self.out);
            let _ = ansi::clear_screen(&mut self.out);
        }

        let mut drawn = 0;
        for y in 0..frame.height() {
            let Some(row) = frame.row(y) else { break };
            let unchanged = !full
                && self
                    .previous
                    .as_ref()
                    .and_then(|prev| prev.row(y))
                    .is_some_and(|prev| prev == row);
            if unchanged {
                continue;
            }
            let _ = encode_row(&mut self.out, y, row);
            drawn += 1;
        }

        let _ = ansi::reset(&mut self.out);
        let _ = ansi::end_sync(&mut self.out);

        match &mut self.previous {
            Some(prev) if prev.width() == frame.width() && prev.height() == frame.height() => {
                prev.cells.copy_from_slice(&frame.cells);
            }
            _ => self.previous = Some(frame.clone()),
        }
        drawn
    }

    /// Bytes produced by the last [`render`](Self::render).
    #[must_use]
    pub fn output(&self) -> &[u8] {
        &self.out
    }

    /// Write the pending output and empty the buffer.
    ///
    /// # Errors
    ///
    /// Propagates write errors from `w`.
    pub fn flush_to(&mut self, w: &mut impl Write) -> io::Result<()> {
        if self.out.is_empty() {
            return Ok(());
        }
        w.write_all(&self.out)?;
        w.flush()?;
        self.out.clear();
        Ok(())
    }

    /// Forget the previous frame so the next render draws everything.
    pub fn force_redraw(&mut self) {
        self.previous = None;
    }
}

/// Rewrite one row from column 0, switching SGR only where the style
/// changes.
fn encode_row(out: &mut Vec<u8>, y: u16, row: &[Cell]) -> io::Result<()> {
    ansi::cursor_to(out, 0, y)?;
    let mut current: Option<Style> = None;
    for cell in row {
        if cell.is_continuation() {
            continue;
        }
        if current != Some(cell.style) {
            ansi::style(out, cell.style)?;
            current = Some(cell.style);
        }
        let mut utf8 = [0u8; 4];
        out.extend_from_slice(cell.ch.encode_utf8(&mut utf8).as_bytes());
    }
    Ok(())
}

// ─── Tests ──────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ansi::{Attr, Color};
    use pretty_assertions::assert_eq;

    fn output(r: &Renderer) -> String {
        String::from_utf8_lossy(r.output()).into_owned()
    }

    // ── Frame ───────────────────────────────────────────────────

    #[test]
    fn new_frame_is_blank() {
        let f = Frame::new(4, 2);
        assert_eq!(f.row_text(0), "    ");
        assert_eq!(f.row_text(1), "    ");
        assert_eq!(f.get(4, 0), None);
        assert_eq!(f.row(2), None);
    }

    #[test]
    fn paint_text_clips_at_edge() {
        let mut f = Frame::new(5, 1);
        assert_eq!(f.paint_text(2, 0, "hello", Style::PLAIN), 3);
        assert_eq!(f.row_text(0), "  hel");
        assert_eq!(f.paint_text(0, 3, "x", Style::PLAIN), 0);
    }

    #[test]
    fn wide_chars_take_two_cells() {
        let mut f = Frame::new(6, 1);
        assert_eq!(f.paint_text(0, 0, "a中b", Style::PLAIN), 4);
        assert!(f.get(2, 0).unwrap().is_continuation());
        assert_eq!(f.row_text(0), "a中b  ");
    }

    #[test]
    fn wide_char_at_edge_becomes_blank() {
        let mut f = Frame::new(3, 1);
        assert_eq!(f.paint_text(0, 0, "ab中", Style::PLAIN), 3);
        assert_eq!(f.row_text(0), "ab ");
    }

    #[test]
    fn overwriting_half_a_wide_char_blanks_the_other_half() {
        let mut f = Frame::new(4, 1);
        f.paint_text(0, 0, "中", Style::PLAIN);
        f.set(1, 0, Cell::new('x', Style::PLAIN));
        assert_eq!(f.row_text(0), " x  ");

        f.paint_text(2, 0, "中", Style::PLAIN);
        f.set(2, 0, Cell::new('y', Style::PLAIN));
        assert_eq!(f.row_text(0), " xy ");
    }

    #[test]
    fn control_chars_are_skipped() {
        let mut f = Frame::new(4, 1);
        assert_eq!(f.paint_text(0, 0, "a\tb", Style::PLAIN), 2);
        assert_eq!(f.row_text(0), "ab  ");
    }

    #[test]
    fn fill_paints_styled_blanks() {
        let inverse = Style::PLAIN.attrs(Attr::INVERSE);
        let mut f = Frame::new(4, 1);
        f.fill(1, 0, 10, inverse);
        assert_eq!(f.get(0, 0).unwrap().style, Style::PLAIN);
        assert_eq!(f.get(3, 0).unwrap(), &Cell::new(' ', inverse));
    }

    #[test]
    fn resize_blanks() {
        let mut f = Frame::new(2, 2);
        f.paint_text(0, 0, "ab", Style::PLAIN);
        f.resize(3, 1);
        assert_eq!((f.width(), f.height()), (3, 1));
        assert_eq!(f.row_text(0), "   ");
    }

    // ── Renderer ────────────────────────────────────────────────

    #[test]
    fn first_render_clears_and_draws_every_row() {
        let mut r = Renderer::new();
        let mut f = Frame::new(3, 2);
        f.paint_text(0, 0, "hi", Style::PLAIN);
        assert_eq!(r.render(&f), 2);

        let out = output(&r);
        assert!(out.starts_with("\x1b[?2026h"));
        assert!(out.contains("\x1b[2J"));
        assert!(out.contains("\x1b[1;1H\x1b[0;39;49mhi "));
        assert!(out.contains("\x1b[2;1H"));
        assert!(out.ends_with("\x1b[0m\x1b[?2026l"));
    }

    #[test]
    fn unchanged_frame_draws_nothing() {
        let mut r = Renderer::new();
        let f = Frame::new(3, 2);
        r.render(&f);
        assert_eq!(r.render(&f), 0);
        assert!(!output(&r).contains('H'));
    }

    #[test]
    fn only_changed_rows_are_redrawn() {
        let mut r = Renderer::new();
        let mut f = Frame::new(3, 3);
        r.render(&f);
        f.paint_text(0, 1, "x", Style::PLAIN);
        assert_eq!(r.render(&f), 1);
        let out = output(&r);
        assert!(out.contains("\x1b[2;1H"));
        assert!(!out.contains("\x1b[1;1H"));
        assert!(!out.contains("\x1b[2J"));
    }

    #[test]
    fn resize_forces_full_redraw() {
        let mut r = Renderer::new();
        r.render(&Frame::new(3, 2));
        assert_eq!(r.render(&Frame::new(4, 2)), 2);
        assert!(output(&r).contains("\x1b[2J"));
    }

    #[test]
    fn force_redraw_draws_everything() {
        let mut r = Renderer::new();
        let f = Frame::new(3, 2);
        r.render(&f);
        r.force_redraw();
        assert_eq!(r.render(&f), 2);
    }

    #[test]
    fn style_switches_only_on_change() {
        let red = Style::PLAIN.fg(Color::RED);
        let mut f = Frame::new(4, 1);
        f.paint_text(0, 0, "ab", red);
        let mut r = Renderer::new();
        r.render(&f);
        let out = output(&r);
        assert!(out.contains("\x1b[0;31;49mab\x1b[0;39;49m  "));
    }

    #[test]
    fn continuation_cells_are_not_emitted() {
        let mut f = Frame::new(3, 1);
        f.paint_text(0, 0, "中x", Style::PLAIN);
        let mut r = Renderer::new();
        r.render(&f);
        assert!(output(&r).contains("中x"));
        assert!(!output(&r).contains('\0'));
    }

    #[test]
    fn flush_writes_and_empties() {
        let mut r = Renderer::new();
        r.render(&Frame::new(2, 1));
        let mut sink = Vec::new();
        r.flush_to(&mut sink).unwrap();
        assert!(!sink.is_empty());
        assert!(r.output().is_empty());
    }

    #[test]
    fn zero_size_frame_emits_nothing() {
        let mut r = Renderer::new();
        assert_eq!(r.render(&Frame::new(0, 0)), 0);
        assert!(r.output().is_empty());
    }
}
