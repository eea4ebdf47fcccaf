//! # Override Store
//!
//! Owns the persisted [`Configuration`] of one launch file: the declarations seen so far
//! and the user's overrides. The document is YAML, written with keys in insertion order
//! so that it diffs cleanly between runs.
use crate::{
    core::{launch_parser, paths},
    models::{ArgumentDeclaration, Configuration, OverrideEntry},
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Could not read configuration '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not write configuration '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Configuration '{path}' is corrupt: {source}")]
    Corrupt {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Failed to serialize configuration: {0}")]
    Serialize(#[from] serde_yaml::Error),
    #[error(transparent)]
    Path(#[from] paths::PathError),
    #[error(transparent)]
    Parse(#[from] launch_parser::ParseError),
}

/// Loads the configuration at `path`.
///
/// A missing file is a first run: `fallback` is written to `path` and returned.
/// An unreadable or unparseable file is an error.
pub fn load(path: &Path, fallback: Configuration) -> Result<Configuration, StoreError> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            log::info!(
                "No configuration at {}, creating it with defaults.",
                path.display()
            );
            save(path, &fallback)?;
            return Ok(fallback);
        }
        Err(e) => {
            return Err(StoreError::Read {
                path: path.display().to_string(),
                source: e,
            });
        }
    };

    serde_yaml::from_str(&content).map_err(|e| StoreError::Corrupt {
        path: path.display().to_string(),
        source: e,
    })
}

/// Writes the whole configuration to `path`, replacing any previous content.
pub fn save(path: &Path, config: &Configuration) -> Result<(), StoreError> {
    log::info!("Saving configuration: {}", path.display());
    let yaml = serde_yaml::to_string(config)?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Write {
                path: parent.display().to_string(),
                source: e,
            })?;
        }
    }
    fs::write(path, yaml).map_err(|e| StoreError::Write {
        path: path.display().to_string(),
        source: e,
    })
}

/// Adds every declaration whose name is not yet known. Existing entries, and their
/// overrides, are left untouched, so the first declaration seen for a name wins.
///
/// Returns how many entries were added.
pub fn reconcile(config: &mut Configuration, declarations: Vec<ArgumentDeclaration>) -> usize {
    let mut added = 0;
    for declaration in declarations {
        if config.args.contains_key(&declaration.name) {
            log::trace!("Keeping stored entry for '{}'.", declaration.name);
            continue;
        }
        config
            .args
            .insert(declaration.name.clone(), OverrideEntry::new(declaration));
        added += 1;
    }
    added
}

/// The configuration of the launch file currently open, together with where it lives.
#[derive(Debug)]
pub struct OverrideStore {
    path: PathBuf,
    config: Configuration,
}

impl OverrideStore {
    /// Opens the store for `launch_file`: loads (or creates) its document under
    /// `config_dir`, then merges in the launch file's current declarations.
    pub fn open(
        launch_file: &Path,
        source_file: &Path,
        config_dir: &Path,
    ) -> Result<Self, StoreError> {
        let path = paths::config_path_for(launch_file, config_dir)?;
        let fallback =
            Configuration::empty(launch_file.to_path_buf(), source_file.to_path_buf());
        let config = load(&path, fallback)?;

        let mut store = Self { path, config };
        store.config.launch_file = launch_file.to_path_buf();
        store.reload()?;
        Ok(store)
    }

    /// Re-parses the launch file and reconciles it into the in-memory configuration.
    /// Returns how many new arguments appeared.
    pub fn reload(&mut self) -> Result<usize, StoreError> {
        let declarations = launch_parser::parse_launch_file(&self.config.launch_file)?;
        let added = reconcile(&mut self.config, declarations);
        if added > 0 {
            log::debug!("{} new argument(s) merged into the configuration.", added);
        }
        Ok(added)
    }

    pub fn save(&self) -> Result<(), StoreError> {
        save(&self.path, &self.config)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut Configuration {
        &mut self.config
    }

    /// Clears the override of every named argument, or of all arguments when `names` is
    /// empty. Returns the names that actually lost an override.
    pub fn clear_overrides(&mut self, names: &[String]) -> Vec<String> {
        self.config
            .args
            .iter_mut()
            .filter(|(name, _)| names.is_empty() || names.contains(name))
            .filter_map(|(name, entry)| entry.value.take().map(|_| name.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::launch_parser::parse_launch_str;
    use tempfile::tempdir;

    const TWO_ARGS: &str =
        r#"<launch><arg name="a" default="1"/><arg name="b" default="true"/></launch>"#;

    fn sample_config() -> Configuration {
        let mut config = Configuration::empty(
            PathBuf::from("/ws/demo.launch.xml"),
            PathBuf::from("/opt/ros/humble/setup.bash"),
        );
        reconcile(&mut config, parse_launch_str(TWO_ARGS).unwrap());
        config
    }

    #[test]
    fn test_reconcile_into_empty_configuration() {
        let config = sample_config();
        assert_eq!(config.args.len(), 2);
        assert!(config.args.values().all(|entry| entry.value.is_none()));
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("override"));
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let once = sample_config();
        let mut twice = once.clone();
        let added = reconcile(&mut twice, parse_launch_str(TWO_ARGS).unwrap());
        assert_eq!(added, 0);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_reconcile_keeps_existing_overrides() {
        let mut config = sample_config();
        config.args.get_mut("a").unwrap().value = Some("5".to_string());

        let grown = r#"<launch><arg name="a" default="2"/><arg name="c" default="x"/></launch>"#;
        let added = reconcile(&mut config, parse_launch_str(grown).unwrap());

        assert_eq!(added, 1);
        let a = &config.args["a"];
        assert_eq!(a.value.as_deref(), Some("5"));
        assert_eq!(a.declaration.default.as_deref(), Some("1"));
        let names: Vec<&str> = config.args.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_reconcile_first_seen_wins_within_document() {
        let mut config = Configuration::default();
        let xml = r#"<launch><arg name="a" default="1"/><arg name="a" default="2"/></launch>"#;
        reconcile(&mut config, parse_launch_str(xml).unwrap());
        assert_eq!(config.args.len(), 1);
        assert_eq!(config.args["a"].declaration.default.as_deref(), Some("1"));
    }

    #[test]
    fn test_save_then_load_round_trip_preserves_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("demo.launch.xml.yaml");

        let mut config = sample_config();
        config.args.get_mut("b").unwrap().value = Some("false".to_string());
        config.args.move_index(1, 0);
        save(&path, &config).unwrap();

        let loaded = load(&path, Configuration::default()).unwrap();
        assert_eq!(loaded, config);
        let order: Vec<&String> = loaded.args.keys().collect();
        assert_eq!(order, vec!["b", "a"]);

        let text = fs::read_to_string(&path).unwrap();
        let launch_at = text.find("launch_file").unwrap();
        let path_at = text.find("path:").unwrap();
        let args_at = text.find("args:").unwrap();
        assert!(launch_at < path_at && path_at < args_at);
    }

    #[test]
    fn test_first_load_creates_file_with_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("first.launch.xml.yaml");
        let fallback = Configuration::empty(
            PathBuf::from("/ws/first.launch.xml"),
            PathBuf::from("/opt/ros/humble/setup.bash"),
        );

        let loaded = load(&path, fallback.clone()).unwrap();
        assert_eq!(loaded, fallback);
        assert!(path.exists());

        let reread = load(&path, Configuration::default()).unwrap();
        assert_eq!(reread, fallback);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        fs::write(&path, "launch_file: [unterminated\n").unwrap();

        let err = load(&path, Configuration::default()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        // The corrupt file is left as it was.
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "launch_file: [unterminated\n"
        );
    }

    #[test]
    fn test_store_open_creates_and_merges() {
        let dir = tempdir().unwrap();
        let launch = dir.path().join("demo.launch.xml");
        fs::write(&launch, TWO_ARGS).unwrap();
        let config_dir = dir.path().join("config");

        let store = OverrideStore::open(&launch, Path::new("/setup.bash"), &config_dir).unwrap();
        assert_eq!(store.path(), config_dir.join("demo.launch.xml.yaml"));
        assert!(store.path().exists());
        assert_eq!(store.config().args.len(), 2);
        assert_eq!(store.config().source_file, PathBuf::from("/setup.bash"));
    }

    #[test]
    fn test_store_open_keeps_saved_overrides() {
        let dir = tempdir().unwrap();
        let launch = dir.path().join("demo.launch.xml");
        fs::write(&launch, TWO_ARGS).unwrap();
        let config_dir = dir.path().join("config");

        let mut store = OverrideStore::open(&launch, Path::new("/setup.bash"), &config_dir).unwrap();
        store.config_mut().args.get_mut("a").unwrap().value = Some("7".to_string());
        store.save().unwrap();

        let reopened =
            OverrideStore::open(&launch, Path::new("/other.bash"), &config_dir).unwrap();
        assert_eq!(reopened.config().args["a"].value.as_deref(), Some("7"));
        assert_eq!(reopened.config().source_file, PathBuf::from("/setup.bash"));
    }

    #[test]
    fn test_store_open_with_malformed_launch_file() {
        let dir = tempdir().unwrap();
        let launch = dir.path().join("broken.launch.xml");
        fs::write(&launch, "<launch><arg default=\"1\"/></launch>").unwrap();

        let err = OverrideStore::open(&launch, Path::new("/setup.bash"), dir.path()).unwrap_err();
        assert!(matches!(err, StoreError::Parse(_)));
    }

    #[test]
    fn test_clear_overrides() {
        let mut config = sample_config();
        config.args.get_mut("a").unwrap().value = Some("5".to_string());
        config.args.get_mut("b").unwrap().value = Some("false".to_string());
        let mut store = OverrideStore {
            path: PathBuf::from("unused.yaml"),
            config,
        };

        assert_eq!(store.clear_overrides(&["a".to_string()]), vec!["a"]);
        assert!(store.config().args["a"].value.is_none());
        assert_eq!(store.clear_overrides(&[]), vec!["b"]);
        assert!(store.clear_overrides(&[]).is_empty());
    }
}
