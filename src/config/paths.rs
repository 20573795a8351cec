use crate::config::ConfigError;
use std::path::{Path, PathBuf};

pub const CONFIG_DIR_ENV: &str = "DISPATCHCTL_CONFIG_DIR";
pub const PROJECTS_FILE_NAME: &str = "projects.yaml";
pub const TUNABLES_FILE_NAME: &str = "config.yaml";
pub const CONTAINER_CONFIG_DIR: &str = "/app";
pub const USER_CONFIG_DIR: &str = ".config/dispatchctl";
pub const STATE_ROOT_DIR: &str = ".dispatchctl";
pub const LOG_FILE_NAME: &str = "dispatchctl.log";

/// Lookup order for a config file: explicit env dir, working directory,
/// container mount, then the user config dir.
pub fn config_candidates(file_name: &str) -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        if !dir.is_empty() {
            candidates.push(PathBuf::from(dir).join(file_name));
        }
    }
    candidates.push(PathBuf::from(file_name));
    candidates.push(Path::new(CONTAINER_CONFIG_DIR).join(file_name));
    if let Some(home) = std::env::var_os("HOME") {
        candidates.push(PathBuf::from(home).join(USER_CONFIG_DIR).join(file_name));
    }
    candidates
}

pub fn first_existing(candidates: &[PathBuf]) -> Option<&Path> {
    candidates
        .iter()
        .find(|path| path.is_file())
        .map(PathBuf::as_path)
}

pub fn default_log_path() -> Result<PathBuf, ConfigError> {
    let home = std::env::var_os("HOME").ok_or(ConfigError::HomeDirectoryUnavailable)?;
    Ok(PathBuf::from(home)
        .join(STATE_ROOT_DIR)
        .join("logs")
        .join(LOG_FILE_NAME))
}
