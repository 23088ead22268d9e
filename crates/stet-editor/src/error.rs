//! Error type for editor operations that touch the outside world.
//!
//! Edits and motions never fail: out-of-range positions are clamped. Only
//! file I/O, directory walks and configuration can go wrong, and every
//! variant carries the path involved so the message line can say where.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// Editor error.
#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("cannot read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("cannot write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },

    #[error("cannot stat {}: {source}", path.display())]
    Stat { path: PathBuf, source: io::Error },

    #[error("cannot list {}: {source}", path.display())]
    Walk { path: PathBuf, source: io::Error },

    #[error("cannot determine working directory: {0}")]
    WorkingDir(#[source] io::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// True when the underlying cause is a missing file.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::Open { source, .. }
            | Self::Read { source, .. }
            | Self::Write { source, .. }
            | Self::Stat { source, .. }
            | Self::Walk { source, .. }
            | Self::WorkingDir(source) => source.kind() == io::ErrorKind::NotFound,
            Self::Config(_) => false,
        }
    }
}

/// Editor result.
pub type Result<T> = std::result::Result<T, Error>;
