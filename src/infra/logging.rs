use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

const LOG_FILTER_ENV: &str = "ORBIT_TERMINAL_LOG";

#[derive(Debug, Error)]
pub enum InitLoggingError {
    #[error("failed to open log file {path}: {source}")]
    Open { path: String, source: io::Error },

    #[error("failed to install log subscriber: {0}")]
    Install(String),
}

pub fn log_file_path(state_dir: &Path) -> PathBuf {
    state_dir.join("terminal.log")
}

/// Routes `tracing` output to a file; the TUI owns stdout/stderr.
pub fn init_file_logging(state_dir: &Path) -> Result<PathBuf, InitLoggingError> {
    let path = log_file_path(state_dir);
    let open_error = |source| InitLoggingError::Open {
        path: path.display().to_string(),
        source,
    };

    fs::create_dir_all(state_dir).map_err(open_error)?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(open_error)?;

    let filter = EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .try_init()
        .map_err(|error| InitLoggingError::Install(error.to_string()))?;

    Ok(path)
}
