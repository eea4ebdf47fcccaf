use std::{fs, path::Path, path::PathBuf};
use thiserror::Error;

use crate::{
    core::paths::{self, PathError},
    models::LauncherSettings,
};

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("Filesystem Error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Path(#[from] PathError),
    #[error("Failed to parse settings.toml: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Failed to serialize settings to TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Loads `settings.toml` from the application config directory, writing the defaults
/// there on first use.
pub fn load_settings() -> Result<LauncherSettings, SettingsError> {
    let settings_path = paths::get_settings_path()?;
    load_settings_from(&settings_path)
}

pub fn load_settings_from(settings_path: &Path) -> Result<LauncherSettings, SettingsError> {
    if !settings_path.exists() {
        let default_settings = LauncherSettings::default();
        let toml_string = toml::to_string_pretty(&default_settings)?;
        fs::write(settings_path, toml_string)?;
        log::info!("Created default settings at {}", settings_path.display());
        Ok(default_settings)
    } else {
        let content = fs::read_to_string(settings_path)?;
        Ok(toml::from_str(&content)?)
    }
}

/// Directory holding override documents: `config_dir` from the settings, expanded, or
/// the default one next to `settings.toml`.
pub fn resolve_config_dir(settings: &LauncherSettings) -> Result<PathBuf, SettingsError> {
    match &settings.config_dir {
        Some(template) => Ok(paths::expand_path(template)?),
        None => Ok(paths::get_default_config_dir()?),
    }
}

/// Root directory for the launch file picker.
pub fn resolve_search_dir(settings: &LauncherSettings) -> Result<PathBuf, SettingsError> {
    match &settings.search_dir {
        Some(template) => Ok(paths::expand_path(template)?),
        None => Ok(dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))),
    }
}
