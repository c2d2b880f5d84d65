use std::{
    env,
    path::{Path, PathBuf},
};

use thiserror::Error;

use crate::{runtime_paths, startup_mode::RuntimeEnvironment};

const BACKEND_SCRIPT: &str = "backend_server.py";
const DEFAULT_PYTHON: &str = "python3";

#[cfg(target_os = "windows")]
const PACKAGED_BACKEND_BINARY: &str = "backend_server.exe";
#[cfg(not(target_os = "windows"))]
const PACKAGED_BACKEND_BINARY: &str = "backend_server";

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error("Backend binary not found: {}", .0.display())]
    BinaryMissing(PathBuf),
    #[error("Resource directory is unavailable: {0}")]
    ResourceDirUnavailable(String),
    #[error("Invalid POLYWHALE_BACKEND_CMD: {0}")]
    InvalidCustomCommand(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchPlan {
    pub cmd: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
    pub envs: Vec<(String, String)>,
    pub packaged_mode: bool,
}

impl LaunchPlan {
    pub fn debug_command(&self) -> Vec<String> {
        let mut parts = vec![self.cmd.clone()];
        parts.extend(self.args.iter().cloned());
        parts
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

pub fn resolve_launch_plan(
    environment: RuntimeEnvironment,
    resource_dir: Result<PathBuf, String>,
) -> Result<LaunchPlan, LaunchError> {
    if let Some(custom_cmd) = non_empty_env("POLYWHALE_BACKEND_CMD") {
        let cwd = non_empty_env("POLYWHALE_BACKEND_CWD")
            .map(PathBuf::from)
            .unwrap_or_else(runtime_paths::source_root_dir);
        return resolve_custom_launch(&custom_cmd, cwd);
    }

    match environment {
        RuntimeEnvironment::Development => {
            let python = non_empty_env("POLYWHALE_PYTHON").unwrap_or_else(|| DEFAULT_PYTHON.to_string());
            Ok(resolve_dev_launch(&python, runtime_paths::source_root_dir()))
        }
        RuntimeEnvironment::Packaged => {
            let resource_dir = resource_dir.map_err(LaunchError::ResourceDirUnavailable)?;
            resolve_packaged_launch(&resource_dir)
        }
    }
}

fn resolve_custom_launch(custom_cmd: &str, cwd: PathBuf) -> Result<LaunchPlan, LaunchError> {
    let mut pieces = shlex::split(custom_cmd)
        .ok_or_else(|| LaunchError::InvalidCustomCommand(custom_cmd.to_string()))?;
    if pieces.is_empty() {
        return Err(LaunchError::InvalidCustomCommand(custom_cmd.to_string()));
    }

    let cmd = pieces.remove(0);
    Ok(LaunchPlan {
        cmd,
        args: pieces,
        cwd,
        envs: vec![("PYTHONUNBUFFERED".to_string(), "1".to_string())],
        packaged_mode: false,
    })
}

fn resolve_dev_launch(python: &str, source_root: PathBuf) -> LaunchPlan {
    let script = source_root.join(BACKEND_SCRIPT);
    LaunchPlan {
        cmd: python.to_string(),
        args: vec![script.to_string_lossy().to_string()],
        envs: vec![
            ("PYTHONUNBUFFERED".to_string(), "1".to_string()),
            (
                "PYTHONPATH".to_string(),
                source_root.to_string_lossy().to_string(),
            ),
        ],
        cwd: source_root,
        packaged_mode: false,
    }
}

fn resolve_packaged_launch(resource_dir: &Path) -> Result<LaunchPlan, LaunchError> {
    let binary = resource_dir.join(PACKAGED_BACKEND_BINARY);
    if !binary.is_file() {
        return Err(LaunchError::BinaryMissing(binary));
    }

    Ok(LaunchPlan {
        cmd: binary.to_string_lossy().to_string(),
        args: Vec::new(),
        cwd: resource_dir.to_path_buf(),
        envs: vec![("PYTHONUNBUFFERED".to_string(), "1".to_string())],
        packaged_mode: true,
    })
}
