//! # stet-editor: editor core for stet
//!
//! The text model and the modal input machine, with no terminal code:
//!
//! - **[`position`]**: `Position` (line, col) and `Direction`
//! - **[`buffer`]**: `Buffer`, lines plus cursor as a cheap-to-clone value
//! - **[`motion`]**: `Motion`, cursor targets computed without editing
//! - **[`change`]**: `Change`, edits from one buffer to the next
//! - **[`history`]**: snapshot-based undo/redo
//! - **[`document`]**: a buffer bound to a file, with staleness tracking
//! - **[`fs`]**: the filesystem seam and its `std::fs` implementation
//! - **[`mode`]**, **[`normal`]**, **[`input`]**, **[`switch`]**: modes
//! - **[`editor`]**: session state and event dispatch
//! - **[`view`]**: the logical frame handed to the renderer
//! - **[`config`]**: TOML settings

pub mod buffer;
pub mod change;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod fs;
pub mod history;
pub mod input;
pub mod mode;
pub mod motion;
pub mod normal;
pub mod position;
pub mod switch;
pub mod view;

pub use error::{Error, Result};
