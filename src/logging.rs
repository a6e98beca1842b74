//! Tracing setup shared by the server and the index bootstrap tool.
//!
//! Events go to stdout and to an append-only log file written from a background worker.
//! `GEOPOST_LOG_FILE` overrides the file location. When the file cannot be opened, logging
//! continues on stdout alone.
use std::{
    fs::{self, OpenOptions},
    io,
    path::{Path, PathBuf},
    sync::OnceLock,
};

use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

const DEFAULT_FILTER: &str = "info";
const LOG_FILE_ENV: &str = "GEOPOST_LOG_FILE";
const DEFAULT_LOG_FILE: &str = "logs/geopost.log";

/// Flushes the file worker on drop, so it lives as long as the process.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Install the global subscriber. `RUST_LOG` controls filtering and defaults to `info`.
///
/// A second call leaves the first subscriber in place and reports that on stderr.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let path = log_file_path(std::env::var(LOG_FILE_ENV).ok());

    let (file_layer, guard) = match file_writer(&path) {
        Ok((writer, guard)) => {
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .compact();
            (Some(layer), Some(guard))
        }
        Err(err) => {
            eprintln!("File logging disabled, cannot open {}: {err}", path.display());
            (None, None)
        }
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .with(file_layer)
        .try_init();

    match installed {
        Ok(()) => {
            if let Some(guard) = guard {
                let _ = FILE_GUARD.set(guard);
            }
        }
        Err(err) => eprintln!("Tracing subscriber not installed: {err}"),
    }
}

/// Log file location: the configured path when non-blank, `logs/geopost.log` otherwise.
fn log_file_path(configured: Option<String>) -> PathBuf {
    configured
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

/// Open `path` for appending, creating its directory first, behind a non-blocking writer.
fn file_writer(path: &Path) -> io::Result<(NonBlocking, WorkerGuard)> {
    if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    Ok(tracing_appender::non_blocking(file))
}
