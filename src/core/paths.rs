// src/core/paths.rs

use crate::constants::{
    APP_DIR, CONFIG_EXTENSION, CONFIG_SUBDIR, HOME_ENV_VAR, LAUNCH_FILE_SUFFIX, LOGS_SUBDIR,
    SETTINGS_FILENAME,
};
use lazy_static::lazy_static;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;

lazy_static! {
    static ref APP_CONFIG_DIR: Mutex<Option<PathBuf>> = Mutex::new(None);
}

#[derive(Error, Debug)]
pub enum PathError {
    #[error("Could not find system config directory.")]
    ConfigDirNotFound,
    #[error("Could not find system cache directory.")]
    CacheDirNotFound,
    #[error("Could not create directory at '{path}': {source}")]
    DirCreation {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to expand path '{template}': {reason}")]
    Expansion { template: String, reason: String },
    #[error("'{0}' has no file name to derive a configuration from.")]
    NoFileName(String),
}

fn ensure_dir(path: &Path) -> Result<(), PathError> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| PathError::DirCreation {
            path: path.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

/// Returns the path to the rlaunch configuration directory (`~/.config/rlaunch`),
/// or `$RLAUNCH_HOME` when set. Creates it if it doesn't exist.
///
/// Memoized: the first call computes and caches the path.
pub fn get_app_config_dir() -> Result<PathBuf, PathError> {
    let mut cached_path_guard = APP_CONFIG_DIR
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());

    if let Some(path) = &*cached_path_guard {
        return Ok(path.clone());
    }

    let config_path = match std::env::var_os(HOME_ENV_VAR) {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => dirs::config_dir()
            .ok_or(PathError::ConfigDirNotFound)?
            .join(APP_DIR),
    };

    ensure_dir(&config_path)?;
    *cached_path_guard = Some(config_path.clone());
    Ok(config_path)
}

/// Returns the path to the global `settings.toml` file.
pub fn get_settings_path() -> Result<PathBuf, PathError> {
    get_app_config_dir().map(|dir| dir.join(SETTINGS_FILENAME))
}

/// The directory holding override documents when `settings.toml` does not name one.
pub fn get_default_config_dir() -> Result<PathBuf, PathError> {
    get_app_config_dir().map(|dir| dir.join(CONFIG_SUBDIR))
}

/// Returns (and creates) the directory receiving launch output logs.
pub fn get_log_dir() -> Result<PathBuf, PathError> {
    let dir = dirs::cache_dir()
        .ok_or(PathError::CacheDirNotFound)?
        .join(APP_DIR)
        .join(LOGS_SUBDIR);
    ensure_dir(&dir)?;
    Ok(dir)
}

/// Expands `~` and environment variables in a user-provided path.
pub fn expand_path(template: &str) -> Result<PathBuf, PathError> {
    let expanded = shellexpand::full(template).map_err(|e| PathError::Expansion {
        template: template.to_string(),
        reason: e.to_string(),
    })?;
    Ok(PathBuf::from(expanded.into_owned()))
}

/// Derives the override document for a launch file: `<config_dir>/<file name>.yaml`.
///
/// Two launch files with the same name in different packages share a document.
pub fn config_path_for(launch_file: &Path, config_dir: &Path) -> Result<PathBuf, PathError> {
    let file_name = launch_file
        .file_name()
        .ok_or_else(|| PathError::NoFileName(launch_file.display().to_string()))?;
    let mut name = file_name.to_os_string();
    name.push(".");
    name.push(CONFIG_EXTENSION);
    Ok(config_dir.join(name))
}

/// A log file name for one launch: `<launch file stem>_<unix millis>.log`.
pub fn log_path_for(launch_file: &Path, log_dir: &Path) -> PathBuf {
    let stem = launch_file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let stem = stem.trim_end_matches(LAUNCH_FILE_SUFFIX).trim_end_matches(".xml");
    let timestamp = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    log_dir.join(format!("{}_{}.log", stem, timestamp))
}

/// Canonicalizes a launch file path without UNC prefixes on Windows.
pub fn canonical_launch_path(path: &Path) -> std::io::Result<PathBuf> {
    dunce::canonicalize(path)
}
