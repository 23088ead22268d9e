//! Editor configuration.
//!
//! Settings live in a TOML file with one table per concern:
//!
//! ```toml
//! [editor]
//! history_limit = 1000
//! tab_width = 4
//! scroll_margin = 2
//!
//! [switch]
//! ignore = [".git", "target"]
//! ```
//!
//! Every section and field is `#[serde(default)]`, so a file only needs the
//! keys it changes. A missing default file means defaults; a file that
//! exists but does not parse is an error.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::history;

/// Top-level settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Buffer and viewport behavior.
    pub editor: EditorConfig,

    /// File switcher behavior.
    pub switch: SwitchConfig,
}

impl Config {
    /// Load from `path`.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// `<config dir>/stet/config.toml`.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(dir.join("stet").join("config.toml"))
    }

    /// Parse TOML text.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Buffer and viewport settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Undo steps kept per document.
    pub history_limit: usize,

    /// Display columns per tab stop.
    pub tab_width: usize,

    /// Rows kept visible above and below the cursor when scrolling.
    pub scroll_margin: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_limit: history::DEFAULT_LIMIT,
            tab_width: 4,
            scroll_margin: 2,
        }
    }
}

/// File switcher settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SwitchConfig {
    /// Directory names never descended into.
    pub ignore: Vec<String>,
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config directory not found")]
    NoConfigDir,

    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let config = Config::default();
        assert_eq!(config.editor.history_limit, 1000);
        assert_eq!(config.editor.tab_width, 4);
        assert_eq!(config.editor.scroll_margin, 2);
        assert!(config.switch.ignore.is_empty());
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::parse("").unwrap(), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::parse("[editor]\ntab_width = 8\n").unwrap();
        assert_eq!(config.editor.tab_width, 8);
        assert_eq!(config.editor.history_limit, 1000);
    }

    #[test]
    fn ignore_list() {
        let config = Config::parse("[switch]\nignore = [\".git\", \"target\"]\n").unwrap();
        assert_eq!(config.switch.ignore, vec![".git", "target"]);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[editor\n").unwrap();
        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load_from(dir.path().join("nope.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn serializes_back() {
        let text = toml::to_string(&Config::default()).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), Config::default());
    }
}
