// src/cli/handlers/commons.rs

// Shared pieces used by several handlers.

use anyhow::{Context, Result, anyhow};
use colored::*;
use dialoguer::{Select, theme::ColorfulTheme};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::{
    constants::LAUNCH_FILE_SUFFIX,
    core::{
        form::{ArgField, FieldState},
        paths,
        session::LaunchSession,
    },
    models::{ArgKind, LauncherSettings},
    system::{process::OutputTarget, settings},
};

lazy_static! {
    // `name=value` or `name:=value`; the value may be empty.
    static ref ASSIGNMENT: Regex =
        Regex::new(r"^(?P<name>[A-Za-z_][A-Za-z0-9_\-./]*):?=(?P<value>.*)$")
            .expect("assignment pattern is valid");
}

/// Settings plus the resolved override directory, as every launch-file command needs them.
#[derive(Debug)]
pub struct Environment {
    pub settings: LauncherSettings,
    pub config_dir: PathBuf,
}

pub fn load_environment() -> Result<Environment> {
    let settings = settings::load_settings().context("Could not load settings")?;
    let config_dir = settings::resolve_config_dir(&settings)?;
    log::debug!("Override documents live in {}", config_dir.display());
    Ok(Environment {
        settings,
        config_dir,
    })
}

/// Opens a launch session, expanding `~` and variables in both paths.
pub fn open_session(
    env: &Environment,
    launch_file: &str,
    source_file: Option<&str>,
) -> Result<LaunchSession> {
    let launch_path = paths::expand_path(launch_file)?;
    let source_path = source_file.map(paths::expand_path).transpose()?;
    Ok(LaunchSession::open(
        &launch_path,
        source_path,
        &env.settings,
        &env.config_dir,
    )?)
}

/// Where the launch's output should go: a fresh timestamped log file, or the terminal.
pub fn output_target(launch_file: &Path, to_log: bool) -> Result<OutputTarget> {
    if !to_log {
        return Ok(OutputTarget::Inherit);
    }
    let log_dir = paths::get_log_dir()?;
    Ok(OutputTarget::LogFile(paths::log_path_for(
        launch_file,
        &log_dir,
    )))
}

/// Splits `name=value` (or `name:=value`).
pub fn parse_assignment(raw: &str) -> Result<(String, String)> {
    let caps = ASSIGNMENT
        .captures(raw)
        .ok_or_else(|| anyhow!("Expected 'name=value', got '{}'.", raw))?;
    let group = |name: &str| caps.name(name).map_or("", |m| m.as_str()).to_string();
    Ok((group("name"), group("value")))
}

/// A field's value styled after its state: dim when empty, plain at the default,
/// green when it differs.
pub fn styled_value(field: &ArgField) -> ColoredString {
    match field.state() {
        FieldState::Empty => {
            let hint = if field.description().is_empty() {
                "<empty>"
            } else {
                field.description()
            };
            hint.dimmed().italic()
        }
        FieldState::Default => field.current_value().normal(),
        FieldState::Modified => field.current_value().green().bold(),
    }
}

/// One line per argument: name, kind, current value.
pub fn field_line(field: &ArgField, name_width: usize) -> String {
    let kind = match field.kind() {
        ArgKind::Boolean => "bool",
        ArgKind::Text => "text",
    };
    format!(
        "{:<width$}  {}  {}",
        field.name(),
        kind.dimmed(),
        styled_value(field),
        width = name_width
    )
}

pub fn name_width(fields: &[ArgField]) -> usize {
    fields.iter().map(|f| f.name().len()).max().unwrap_or(0)
}

/// Prints the session's arguments as a table.
pub fn print_arguments(session: &LaunchSession) {
    let fields = session.form().fields();
    if fields.is_empty() {
        println!("  {}", t!("panel.info.no_arguments").dimmed());
        return;
    }
    let width = name_width(fields);
    for field in fields {
        println!("  {}", field_line(field, width));
        if field.state() == FieldState::Modified {
            println!(
                "  {:<width$}  {} {}",
                "",
                "default:".dimmed(),
                field.default().dimmed(),
                width = width + 6
            );
        }
    }
}

/// Every `*.launch.xml` below `root`, sorted.
pub fn find_launch_files(root: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|e| {
            // Skip hidden directories and colcon build trees.
            let name = e.file_name().to_string_lossy();
            e.depth() == 0
                || !(name.starts_with('.') || name == "build" || name == "log")
        })
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                log::debug!("Skipping unreadable entry: {}", err);
                None
            }
        })
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_string_lossy().ends_with(LAUNCH_FILE_SUFFIX))
        .map(|e| e.into_path())
        .collect();
    found.sort();
    found
}

/// Lets the user pick a launch file below `root`. `Ok(None)` when they cancel.
pub fn choose_launch_file(root: &Path) -> Result<Option<PathBuf>> {
    println!(
        "{}",
        format!(t!("pick.info.scanning"), dir = root.display()).dimmed()
    );
    let candidates = find_launch_files(root);
    if candidates.is_empty() {
        return Err(anyhow!(t!("pick.error.none_found"), dir = root.display()));
    }

    let items: Vec<String> = candidates
        .iter()
        .map(|p| {
            p.strip_prefix(root)
                .unwrap_or(p)
                .display()
                .to_string()
        })
        .collect();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("pick.prompt"))
        .items(&items)
        .default(0)
        .interact_opt()?;

    Ok(selection.and_then(|idx| candidates.get(idx).cloned()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_parse_assignment_forms() {
        assert_eq!(
            parse_assignment("rate=10").unwrap(),
            ("rate".to_string(), "10".to_string())
        );
        assert_eq!(
            parse_assignment("use_sim_time:=true").unwrap(),
            ("use_sim_time".to_string(), "true".to_string())
        );
        assert_eq!(
            parse_assignment("label=a=b").unwrap(),
            ("label".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_assignment("cleared=").unwrap(),
            ("cleared".to_string(), String::new())
        );
    }

    #[test]
    fn test_parse_assignment_rejects_bare_words() {
        assert!(parse_assignment("rate").is_err());
        assert!(parse_assignment("=10").is_err());
    }

    #[test]
    fn test_find_launch_files_skips_hidden_and_build_dirs() {
        let dir = tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/pkg/launch")).unwrap();
        fs::create_dir_all(root.join("build/pkg")).unwrap();
        fs::create_dir_all(root.join(".git")).unwrap();
        fs::write(root.join("src/pkg/launch/robot.launch.xml"), "<launch/>").unwrap();
        fs::write(root.join("src/pkg/launch/robot.launch.py"), "").unwrap();
        fs::write(root.join("build/pkg/copy.launch.xml"), "<launch/>").unwrap();
        fs::write(root.join(".git/x.launch.xml"), "<launch/>").unwrap();
        fs::write(root.join("top.launch.xml"), "<launch/>").unwrap();

        let found = find_launch_files(root);
        assert_eq!(
            found,
            vec![
                root.join("src/pkg/launch/robot.launch.xml"),
                root.join("top.launch.xml"),
            ]
        );
    }

    #[test]
    fn test_output_target_inherit() {
        assert_eq!(
            output_target(Path::new("/ws/a.launch.xml"), false).unwrap(),
            OutputTarget::Inherit
        );
    }
}
