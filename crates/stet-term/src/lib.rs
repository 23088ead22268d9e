// SPDX-License-Identifier: MIT
//
// stet-term: the terminal layer under stet.
//
// Raw termios, a handful of ANSI writers, a byte-stream key parser, a cell
// frame with a row-level diff renderer, and a synchronous poll(2) event
// loop. No TUI framework in between: the editor core hands over a logical
// view, the binary paints it into a `Frame`, and only rows that changed
// since the last frame reach the terminal.

pub mod ansi;
pub mod event_loop;
pub mod frame;
pub mod input;
pub mod terminal;
