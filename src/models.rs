// src/models.rs

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::constants::{DEFAULT_LAUNCH_RUNNER, DEFAULT_SHELL, DEFAULT_SOURCE_FILE};

// --- LAUNCH ARGUMENT MODELS ---

/// How an argument is presented and edited.
///
/// Decided once, from the declared default, when the declaration is built.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ArgKind {
    /// `default` is literally `"true"` or `"false"`: a two-state selector.
    Boolean,
    /// Anything else: free text, with the description as hint.
    Text,
}

impl ArgKind {
    /// Infers the kind from a declared default value.
    pub fn from_default(default: Option<&str>) -> Self {
        match default {
            Some("true") | Some("false") => Self::Boolean,
            _ => Self::Text,
        }
    }
}

/// Attributes of an `<arg>` element with a meaning of their own.
const NAME_KEY: &str = "name";
const DEFAULT_KEY: &str = "default";
const DESCRIPTION_KEY: &str = "description";

/// A single `<arg>` declared by a launch description.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "DeclarationRecord", into = "DeclarationRecord")]
pub struct ArgumentDeclaration {
    pub name: String,
    pub default: Option<String>,
    pub description: Option<String>,
    /// Every other attribute, verbatim and in document order.
    pub attributes: IndexMap<String, String>,
    kind: ArgKind,
    // Attribute names as they appeared, so the stored entry keeps the element's layout.
    key_order: Vec<String>,
}

impl ArgumentDeclaration {
    pub fn new(
        name: impl Into<String>,
        default: Option<String>,
        description: Option<String>,
        attributes: IndexMap<String, String>,
    ) -> Self {
        let mut key_order = vec![NAME_KEY.to_string()];
        if default.is_some() {
            key_order.push(DEFAULT_KEY.to_string());
        }
        if description.is_some() {
            key_order.push(DESCRIPTION_KEY.to_string());
        }
        key_order.extend(attributes.keys().cloned());

        let kind = ArgKind::from_default(default.as_deref());
        Self {
            name: name.into(),
            default,
            description,
            attributes,
            kind,
            key_order,
        }
    }

    /// Builds a declaration from all of an element's attributes, in the order they were
    /// written. `None` when there is no `name`.
    pub fn from_attributes(mut attributes: IndexMap<String, String>) -> Option<Self> {
        let key_order: Vec<String> = attributes.keys().cloned().collect();
        let name = attributes.shift_remove(NAME_KEY)?;
        let default = attributes.shift_remove(DEFAULT_KEY);
        let description = attributes.shift_remove(DESCRIPTION_KEY);
        let kind = ArgKind::from_default(default.as_deref());
        Some(Self {
            name,
            default,
            description,
            attributes,
            kind,
            key_order,
        })
    }

    pub fn kind(&self) -> ArgKind {
        self.kind
    }

    /// The declared default, or the empty string when none was declared.
    pub fn default_value(&self) -> &str {
        self.default.as_deref().unwrap_or_default()
    }

    pub fn description_text(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }
}

/// The on-disk shape of a declaration: its attributes, in document order.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(transparent)]
struct DeclarationRecord(IndexMap<String, String>);

impl TryFrom<DeclarationRecord> for ArgumentDeclaration {
    type Error = String;

    fn try_from(record: DeclarationRecord) -> Result<Self, Self::Error> {
        Self::from_attributes(record.0).ok_or_else(|| "argument entry has no `name`".to_string())
    }
}

impl From<ArgumentDeclaration> for DeclarationRecord {
    fn from(decl: ArgumentDeclaration) -> Self {
        let ArgumentDeclaration {
            name,
            mut default,
            mut description,
            mut attributes,
            key_order,
            ..
        } = decl;
        let mut name = Some(name);

        let mut record = IndexMap::with_capacity(key_order.len());
        for key in key_order {
            let value = match key.as_str() {
                NAME_KEY => name.take(),
                DEFAULT_KEY => default.take(),
                DESCRIPTION_KEY => description.take(),
                _ => attributes.shift_remove(&key),
            };
            if let Some(value) = value {
                record.insert(key, value);
            }
        }

        // Values set after the declaration was read go last.
        for (key, value) in [
            (NAME_KEY, name),
            (DEFAULT_KEY, default),
            (DESCRIPTION_KEY, description),
        ] {
            if let Some(value) = value {
                record.insert(key.to_string(), value);
            }
        }
        record.extend(attributes);
        Self(record)
    }
}

/// A declaration as stored in the override document, plus the user's override, if any.
///
/// `value` is only ever `Some` when it differs from the default and is non-empty.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct OverrideEntry {
    #[serde(flatten)]
    pub declaration: ArgumentDeclaration,
    #[serde(rename = "override", default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl OverrideEntry {
    pub fn new(declaration: ArgumentDeclaration) -> Self {
        Self {
            declaration,
            value: None,
        }
    }

    /// The value a form field should start with: the override, else the default.
    pub fn effective_value(&self) -> &str {
        self.value
            .as_deref()
            .unwrap_or_else(|| self.declaration.default_value())
    }
}

/// The persisted state for one launch file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, Default)]
pub struct Configuration {
    pub launch_file: PathBuf,
    /// The environment script sourced before launching.
    #[serde(rename = "path", alias = "source_file", default)]
    pub source_file: PathBuf,
    #[serde(default)]
    pub args: IndexMap<String, OverrideEntry>,
}

impl Configuration {
    /// A configuration with no arguments yet, as written on the first load of a launch file.
    pub fn empty(launch_file: PathBuf, source_file: PathBuf) -> Self {
        Self {
            launch_file,
            source_file,
            args: IndexMap::new(),
        }
    }
}

// --- SETTINGS MODELS (settings.toml) ---

fn default_source_file() -> String {
    DEFAULT_SOURCE_FILE.to_string()
}

fn default_launch_runner() -> String {
    DEFAULT_LAUNCH_RUNNER.to_string()
}

fn default_shell() -> PathBuf {
    PathBuf::from(DEFAULT_SHELL)
}

fn default_log_output() -> bool {
    true
}

/// Global launcher settings, read from `settings.toml`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct LauncherSettings {
    /// Script sourced before every launch. May contain `~` and `$VARS`.
    #[serde(default = "default_source_file")]
    pub source_file: String,
    /// The command that receives the launch file and `name:=value` tokens.
    #[serde(default = "default_launch_runner")]
    pub launch_runner: String,
    /// Shell used to interpret the launch command (`<shell> -c <command>`).
    #[serde(default = "default_shell")]
    pub shell: PathBuf,
    /// Where override documents live. Defaults to `<config dir>/rlaunch/config`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_dir: Option<String>,
    /// Root directory scanned by the picker. Defaults to the home directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_dir: Option<String>,
    /// Send launch output from the panel to a log file instead of the terminal.
    #[serde(default = "default_log_output")]
    pub log_output: bool,
}

impl Default for LauncherSettings {
    fn default() -> Self {
        Self {
            source_file: default_source_file(),
            launch_runner: default_launch_runner(),
            shell: default_shell(),
            config_dir: None,
            search_dir: None,
            log_output: default_log_output(),
        }
    }
}
