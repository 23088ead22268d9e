// SPDX-License-Identifier: MIT
//
// Log setup. The terminal is in raw mode on the alternate screen while stet
// runs, so log lines go to a file only:
//
//   --log-file PATH                         if given
//   <data_local_dir>/stet/logs/stet-<pid>.log   otherwise
//
// Filter priority: STET_LOG, then RUST_LOG, then a default of `warn` that
// each `-v` raises one level for the stet crates. A bare level in STET_LOG
// (`STET_LOG=debug`) applies to the stet crates only; anything with
// directive syntax is passed through untouched.

use std::env;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const CRATES: [&str; 3] = ["stet", "stet_editor", "stet_term"];

/// Keeps the background log writer alive. Dropping it flushes the file.
pub struct LogGuard {
    _worker: WorkerGuard,
    pub path: PathBuf,
}

/// Install the global subscriber writing to `log_file` (or the default
/// location) at a level raised by `verbosity`.
pub fn init(log_file: Option<&Path>, verbosity: u8) -> Result<LogGuard> {
    let path = match log_file {
        Some(path) => path.to_path_buf(),
        None => default_path()?,
    };
    let dir = path.parent().filter(|d| !d.as_os_str().is_empty()).unwrap_or(Path::new("."));
    let name = path
        .file_name()
        .with_context(|| format!("log file path {} has no file name", path.display()))?;
    std::fs::create_dir_all(dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let appender = tracing_appender::rolling::never(dir, name);
    let (writer, worker) = tracing_appender::non_blocking(appender);

    tracing_subscriber::fmt()
        .with_env_filter(filter(
            env::var("STET_LOG").ok().as_deref(),
            env::var("RUST_LOG").ok().as_deref(),
            verbosity,
        ))
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow!(e))
        .context("installing the log subscriber")?;

    Ok(LogGuard {
        _worker: worker,
        path,
    })
}

fn default_path() -> Result<PathBuf> {
    let base = dirs::data_local_dir().context("no local data directory for logs")?;
    Ok(base
        .join("stet")
        .join("logs")
        .join(format!("stet-{}.log", std::process::id())))
}

fn level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// `warn,stet=<level>,stet_editor=<level>,stet_term=<level>`.
fn for_stet(level: &str) -> String {
    let mut directives = String::from("warn");
    for name in CRATES {
        directives.push_str(&format!(",{name}={level}"));
    }
    directives
}

fn directives(stet_log: Option<&str>, rust_log: Option<&str>, verbosity: u8) -> String {
    match (stet_log, rust_log) {
        (Some(value), _) if value.contains(['=', ',', ':']) => value.to_owned(),
        (Some(value), _) => for_stet(value),
        (None, Some(value)) => value.to_owned(),
        (None, None) => for_stet(level(verbosity)),
    }
}

fn filter(stet_log: Option<&str>, rust_log: Option<&str>, verbosity: u8) -> EnvFilter {
    let wanted = directives(stet_log, rust_log, verbosity);
    EnvFilter::try_new(&wanted).unwrap_or_else(|_| EnvFilter::new(for_stet(level(verbosity))))
}
