use std::{
    env,
    path::{Path, PathBuf},
};

use tauri::{AppHandle, Manager};

use crate::STATE_DIR_ENV;

fn non_empty_env_path(key: &str) -> Option<PathBuf> {
    let value = env::var(key).ok()?;
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(PathBuf::from(trimmed))
}

/// Directory holding persisted preferences and the desktop log.
pub fn default_state_dir() -> Option<PathBuf> {
    non_empty_env_path(STATE_DIR_ENV).or_else(|| home::home_dir().map(|home| home.join(".polywhale")))
}

/// Checkout that contains `backend_server.py` during development. The shell crate
/// lives in `src-tauri/`, one level below it.
pub fn source_root_dir() -> PathBuf {
    if let Some(path) = non_empty_env_path("POLYWHALE_SOURCE_DIR") {
        return path;
    }

    let manifest = manifest_dir();
    let candidate = manifest
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or(manifest);
    candidate.canonicalize().unwrap_or(candidate)
}

pub fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

pub fn resource_dir(app_handle: &AppHandle) -> Option<PathBuf> {
    app_handle.path().resource_dir().ok()
}
