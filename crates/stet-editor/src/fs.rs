//! Filesystem access: loading, saving, staleness checks and directory walks.
//!
//! The editor never calls `std::fs` directly. Everything goes through the
//! [`Filesystem`] trait so documents and the file switcher can be driven by
//! a fake in tests. [`Disk`] is the real implementation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use crate::error::{Error, Result};

/// File contents plus the modification time observed when reading them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loaded {
    pub text: String,
    pub modified: SystemTime,
}

/// The operations the editor needs from a filesystem.
pub trait Filesystem {
    /// Read a whole file. A missing file is an [`Error::Open`] whose
    /// [`is_not_found`](Error::is_not_found) is true.
    fn load(&self, path: &Path) -> Result<Loaded>;

    /// Replace the file's contents with `text`, creating it if needed.
    /// Returns the new modification time.
    fn save(&self, path: &Path, text: &str) -> Result<SystemTime>;

    /// Current modification time, or `None` if the file does not exist.
    fn modified(&self, path: &Path) -> Result<Option<SystemTime>>;

    /// Every regular file below `root`, as `/`-separated paths relative to
    /// `root`, sorted. Directories named in `ignore` are skipped entirely.
    fn walk(&self, root: &Path, ignore: &[String]) -> Result<Vec<String>>;

    /// The directory relative paths are resolved against.
    fn working_dir(&self) -> Result<PathBuf>;
}

// ---------------------------------------------------------------------------
// Disk
// ---------------------------------------------------------------------------

/// [`Filesystem`] backed by `std::fs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disk;

impl Filesystem for Disk {
    fn load(&self, path: &Path) -> Result<Loaded> {
        let bytes = fs::read(path).map_err(|source| Error::Open {
            path: path.to_path_buf(),
            source,
        })?;
        let text = String::from_utf8(bytes).map_err(|e| Error::Read {
            path: path.to_path_buf(),
            source: io::Error::new(io::ErrorKind::InvalidData, e),
        })?;
        let modified = mtime(path)?;
        Ok(Loaded { text, modified })
    }

    fn save(&self, path: &Path, text: &str) -> Result<SystemTime> {
        fs::write(path, text).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
        mtime(path)
    }

    fn modified(&self, path: &Path) -> Result<Option<SystemTime>> {
        match mtime(path) {
            Ok(time) => Ok(Some(time)),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn walk(&self, root: &Path, ignore: &[String]) -> Result<Vec<String>> {
        let entries = fs::read_dir(root).map_err(|source| Error::Walk {
            path: root.to_path_buf(),
            source,
        })?;
        let mut paths = Vec::new();
        collect(entries, "", ignore, &mut paths);
        paths.sort();
        Ok(paths)
    }

    fn working_dir(&self) -> Result<PathBuf> {
        std::env::current_dir().map_err(Error::WorkingDir)
    }
}

fn mtime(path: &Path) -> Result<SystemTime> {
    fs::metadata(path)
        .and_then(|meta| meta.modified())
        .map_err(|source| Error::Stat {
            path: path.to_path_buf(),
            source,
        })
}

/// Depth-first walk. Unreadable subdirectories are skipped rather than
/// failing the whole listing.
fn collect(entries: fs::ReadDir, prefix: &str, ignore: &[String], out: &mut Vec<String>) {
    for entry in entries.flatten() {
        let Ok(kind) = entry.file_type() else {
            continue;
        };
        let name = entry.file_name();
        let name = name.to_string_lossy();
        let rel = if prefix.is_empty() {
            name.to_string()
        } else {
            format!("{prefix}/{name}")
        };

        if kind.is_dir() {
            if ignore.iter().any(|skip| skip.as_str() == name.as_ref()) {
                continue;
            }
            match fs::read_dir(entry.path()) {
                Ok(children) => collect(children, &rel, ignore, out),
                Err(e) => debug!(path = %rel, error = %e, "skipping unreadable directory"),
            }
        } else if kind.is_file() {
            out.push(rel);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
