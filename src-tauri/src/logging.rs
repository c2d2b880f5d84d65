use std::{
    fs::{self, File, OpenOptions},
    path::{Path, PathBuf},
    sync::Mutex,
};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::DEFAULT_LOG_FILTER;

pub fn resolve_desktop_log_path(state_dir: Option<PathBuf>, log_file_name: &str) -> PathBuf {
    match state_dir {
        Some(dir) => dir.join("logs").join(log_file_name),
        None => std::env::temp_dir().join("polywhale").join(log_file_name),
    }
}

fn open_log_file(path: &Path) -> Result<File, String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|error| {
            format!(
                "Failed to create log directory {}: {}",
                parent.display(),
                error
            )
        })?;
    }

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|error| format!("Failed to open log file {}: {}", path.display(), error))
}

/// Installs the global subscriber: stderr plus an append-only desktop log file.
///
/// A log file that cannot be opened only disables the file layer.
pub fn init(log_path: &Path) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let (file_layer, file_error) = match open_log_file(log_path) {
        Ok(file) => (
            Some(
                fmt::layer()
                    .with_ansi(false)
                    .with_target(true)
                    .with_writer(Mutex::new(file)),
            ),
            None,
        ),
        Err(error) => (None, Some(error)),
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(file_layer)
        .try_init();
    if installed.is_err() {
        return;
    }

    if let Some(error) = file_error {
        tracing::warn!("{error}; logging to stderr only");
    }
}

pub fn append_desktop_log(message: &str) {
    tracing::info!(phase = "desktop", "{message}");
}

pub fn append_startup_log(message: &str) {
    tracing::info!(phase = "startup", "{message}");
}

pub fn append_shutdown_log(message: &str) {
    tracing::info!(phase = "shutdown", "{message}");
}

pub fn append_update_log(message: &str) {
    tracing::info!(phase = "update", "{message}");
}

pub fn append_backend_log(line: &str) {
    tracing::info!(phase = "backend", "[Backend] {line}");
}

pub fn append_backend_error_log(line: &str) {
    tracing::warn!(phase = "backend", "[Backend Error] {line}");
}
