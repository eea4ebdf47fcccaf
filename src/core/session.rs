//! # Launch Session
//!
//! Everything one open launch file needs: its override store, the form built from it,
//! and the controller that runs it. A session is what the panel shows; the one-shot
//! subcommands open a session, act once, and drop it.
use crate::{
    core::{
        form::{ArgForm, FormError},
        override_store::{OverrideStore, StoreError},
        paths::{self, PathError},
    },
    models::LauncherSettings,
    system::process::{
        LaunchSpec, OutputTarget, ProcessController, ProcessError, ProcessHandle,
        compute_command,
    },
};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("{0}")]
    MissingInput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Process(#[from] ProcessError),
    #[error(transparent)]
    Form(#[from] FormError),
    #[error(transparent)]
    Path(#[from] PathError),
}

#[derive(Debug)]
pub struct LaunchSession {
    store: OverrideStore,
    form: ArgForm,
    controller: ProcessController,
    source_file: PathBuf,
    launch_runner: String,
}

impl LaunchSession {
    /// Opens `launch_file` with its stored overrides.
    ///
    /// The source script is, in order of preference: `source_override`, the script stored
    /// with the launch file's configuration, the one from `settings`.
    pub fn open(
        launch_file: &Path,
        source_override: Option<PathBuf>,
        settings: &LauncherSettings,
        config_dir: &Path,
    ) -> Result<Self, SessionError> {
        let launch_file = paths::canonical_launch_path(launch_file).map_err(|_| {
            SessionError::MissingInput(format!(
                "Launch file '{}' does not exist.",
                launch_file.display()
            ))
        })?;

        let default_source = if settings.source_file.trim().is_empty() {
            PathBuf::new()
        } else {
            paths::expand_path(&settings.source_file)?
        };
        let store = OverrideStore::open(&launch_file, &default_source, config_dir)?;

        let stored_source = store.config().source_file.clone();
        let source_file = match source_override {
            Some(path) => path,
            None if !stored_source.as_os_str().is_empty() => stored_source,
            None => default_source,
        };

        let form = ArgForm::from_config(store.config());
        Ok(Self {
            store,
            form,
            controller: ProcessController::new(settings.shell.clone()),
            source_file,
            launch_runner: settings.launch_runner.clone(),
        })
    }

    pub fn launch_file(&self) -> &Path {
        &self.store.config().launch_file
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn set_source_file(&mut self, source_file: PathBuf) {
        self.source_file = source_file;
    }

    pub fn store(&self) -> &OverrideStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut OverrideStore {
        &mut self.store
    }

    pub fn form(&self) -> &ArgForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut ArgForm {
        &mut self.form
    }

    pub fn controller(&self) -> &ProcessController {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut ProcessController {
        &mut self.controller
    }

    pub fn is_running(&self) -> bool {
        self.controller.is_running()
    }

    /// Rebuilds the form from the stored configuration, discarding unsaved edits.
    pub fn refresh_form(&mut self) {
        self.form = ArgForm::from_config(self.store.config());
    }

    /// Re-parses the launch file. Arguments that appeared are added with their defaults;
    /// values already typed into the form are kept.
    pub fn reload(&mut self) -> Result<usize, SessionError> {
        let added = self.store.reload()?;
        let previous = std::mem::take(&mut self.form);
        self.refresh_form();
        for field in previous.fields() {
            if let Some(current) = self.form.get_mut(field.name()) {
                if let Err(e) = current.set_value(field.current_value()) {
                    log::debug!("Discarding edited value after reload: {}", e);
                }
            }
        }
        Ok(added)
    }

    fn check_inputs(&self) -> Result<(), SessionError> {
        if self.source_file.as_os_str().is_empty() {
            return Err(SessionError::MissingInput(
                "No source script selected.".to_string(),
            ));
        }
        if !self.source_file.is_file() {
            return Err(SessionError::MissingInput(format!(
                "Source script '{}' does not exist.",
                self.source_file.display()
            )));
        }
        if !self.launch_file().is_file() {
            return Err(SessionError::MissingInput(format!(
                "Launch file '{}' does not exist.",
                self.launch_file().display()
            )));
        }
        Ok(())
    }

    /// Folds the form into the stored overrides and returns the launch command.
    /// Nothing is written to disk.
    pub fn apply_form(&mut self) -> Result<String, SessionError> {
        let config = self.store.config_mut();
        config.source_file = self.source_file.clone();
        let launch_file = config.launch_file.clone();
        let spec = LaunchSpec {
            source_file: &self.source_file,
            launch_runner: &self.launch_runner,
            launch_file: &launch_file,
        };
        Ok(compute_command(&spec, &mut config.args, &self.form)?)
    }

    /// The command `start` would run, leaving the stored overrides untouched.
    pub fn preview_command(&self) -> Result<String, SessionError> {
        let mut args = self.store.config().args.clone();
        let spec = LaunchSpec {
            source_file: &self.source_file,
            launch_runner: &self.launch_runner,
            launch_file: self.launch_file(),
        };
        Ok(compute_command(&spec, &mut args, &self.form)?)
    }

    /// Applies the form, persists the configuration, and launches.
    ///
    /// Fails without side effects when a launch is already running or an input path is
    /// missing.
    pub fn start(&mut self, output: &OutputTarget) -> Result<ProcessHandle, SessionError> {
        if let Some(handle) = self.controller.handle() {
            return Err(ProcessError::AlreadyRunning { pid: handle.pid }.into());
        }
        self.check_inputs()?;

        let command = self.apply_form()?;
        self.store.save()?;
        Ok(self.controller.start(&command, output)?)
    }

    /// Interrupts the running launch, if any.
    pub fn stop(&mut self) -> Result<Option<ProcessHandle>, SessionError> {
        Ok(self.controller.stop()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::{TempDir, tempdir};

    const LAUNCH: &str = r#"<launch>
  <arg name="a" default="foo"/>
  <arg name="b" default="true"/>
</launch>"#;

    // `source` is a bash builtin; plain `sh` may not have it.
    const BASH: &str = "/bin/bash";

    fn has_bash() -> bool {
        Path::new(BASH).is_file()
    }

    struct Fixture {
        dir: TempDir,
        launch: PathBuf,
        source: PathBuf,
        settings: LauncherSettings,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempdir().unwrap();
            let launch = dir.path().join("demo.launch.xml");
            fs::write(&launch, LAUNCH).unwrap();
            let source = dir.path().join("setup.sh");
            fs::write(&source, "").unwrap();
            let settings = LauncherSettings {
                source_file: source.display().to_string(),
                shell: PathBuf::from(BASH),
                launch_runner: "true".to_string(),
                ..LauncherSettings::default()
            };
            Self {
                dir,
                launch,
                source,
                settings,
            }
        }

        fn config_dir(&self) -> PathBuf {
            self.dir.path().join("config")
        }

        fn open(&self) -> LaunchSession {
            LaunchSession::open(&self.launch, None, &self.settings, &self.config_dir()).unwrap()
        }
    }

    #[test]
    fn test_open_uses_settings_source() {
        let fx = Fixture::new();
        let session = fx.open();
        assert_eq!(session.source_file(), fx.source.as_path());
        assert_eq!(session.form().fields().len(), 2);
        assert!(!session.is_running());
    }

    #[test]
    fn test_open_missing_launch_file() {
        let fx = Fixture::new();
        let err = LaunchSession::open(
            &fx.dir.path().join("nope.launch.xml"),
            None,
            &fx.settings,
            &fx.config_dir(),
        )
        .unwrap_err();
        assert!(matches!(err, SessionError::MissingInput(_)));
    }

    #[test]
    fn test_preview_does_not_touch_store() {
        let fx = Fixture::new();
        let mut session = fx.open();
        session.form_mut().set("a", "bar").unwrap();

        let command = session.preview_command().unwrap();
        assert!(command.ends_with(" a:=bar"));
        assert!(session.store().config().args["a"].value.is_none());
    }

    #[test]
    fn test_start_without_source_script_spawns_nothing() {
        let fx = Fixture::new();
        let mut session = LaunchSession::open(
            &fx.launch,
            Some(fx.dir.path().join("missing.bash")),
            &fx.settings,
            &fx.config_dir(),
        )
        .unwrap();
        session.form_mut().set("a", "bar").unwrap();
        let before = fs::read_to_string(session.store().path()).unwrap();

        let err = session.start(&OutputTarget::Inherit).unwrap_err();
        assert!(matches!(err, SessionError::MissingInput(_)));
        assert!(!session.is_running());
        assert_eq!(fs::read_to_string(session.store().path()).unwrap(), before);
    }

    #[cfg(unix)]
    #[test]
    fn test_start_persists_overrides_and_stop_returns_to_idle() {
        if !has_bash() {
            return;
        }
        let fx = Fixture::new();
        let mut session = fx.open();
        session.form_mut().set("a", "bar").unwrap();
        session.form_mut().set("b", "false").unwrap();

        let handle = session.start(&OutputTarget::Inherit).unwrap();
        assert!(session.is_running());

        let reopened = fx.open();
        let args = &reopened.store().config().args;
        assert_eq!(args["a"].value.as_deref(), Some("bar"));
        assert_eq!(args["b"].value.as_deref(), Some("false"));

        assert!(matches!(
            session.start(&OutputTarget::Inherit),
            Err(SessionError::Process(ProcessError::AlreadyRunning { .. }))
        ));

        assert_eq!(session.stop().unwrap(), Some(handle));
        assert!(!session.is_running());
        assert_eq!(session.stop().unwrap(), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_restart_with_default_clears_override() {
        if !has_bash() {
            return;
        }
        let fx = Fixture::new();
        let mut session = fx.open();
        session.form_mut().set("a", "bar").unwrap();
        session.start(&OutputTarget::Inherit).unwrap();
        session.stop().unwrap();

        session.form_mut().set("a", "foo").unwrap();
        session.start(&OutputTarget::Inherit).unwrap();
        session.stop().unwrap();

        let text = fs::read_to_string(session.store().path()).unwrap();
        assert!(!text.contains("override"));
    }

    #[cfg(unix)]
    #[test]
    fn test_launch_sees_sourced_environment_and_quoted_tokens() {
        use std::time::{Duration, Instant};

        if !has_bash() {
            return;
        }
        let fx = Fixture::new();
        let launch = fx.dir.path().join("my demo.launch.xml");
        fs::write(&launch, LAUNCH).unwrap();
        fs::write(&fx.source, "export RLAUNCH_TEST_ENV=sourced\n").unwrap();
        let settings = LauncherSettings {
            launch_runner: r#"printf '%s|' "$RLAUNCH_TEST_ENV""#.to_string(),
            ..fx.settings.clone()
        };

        let mut session =
            LaunchSession::open(&launch, None, &settings, &fx.config_dir()).unwrap();
        session.form_mut().set("a", "two words").unwrap();
        session.form_mut().set("b", "false").unwrap();

        let log = fx.dir.path().join("launch.log");
        session.start(&OutputTarget::LogFile(log.clone())).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut status = None;
        while status.is_none() && Instant::now() < deadline {
            status = session.controller_mut().exit_status();
            std::thread::sleep(Duration::from_millis(20));
        }
        assert!(status.flatten().is_some_and(|s| s.success()));

        let output = fs::read_to_string(&log).unwrap();
        let expected = format!(
            "sourced|{}|a:=two words|b:=false|",
            session.launch_file().display()
        );
        assert_eq!(output, expected);

        let stored = fs::read_to_string(session.store().path()).unwrap();
        assert!(stored.contains("override: two words"));
        assert!(stored.contains("override: 'false'"));
        session.stop().unwrap();
    }

    #[test]
    fn test_reload_keeps_typed_values_and_adds_new_args() {
        let fx = Fixture::new();
        let mut session = fx.open();
        session.form_mut().set("a", "typed").unwrap();

        fs::write(
            &fx.launch,
            r#"<launch><arg name="a" default="foo"/><arg name="b" default="true"/><arg name="c" default="3"/></launch>"#,
        )
        .unwrap();

        assert_eq!(session.reload().unwrap(), 1);
        assert_eq!(session.form().value_of("a"), Some("typed"));
        assert_eq!(session.form().value_of("c"), Some("3"));
    }
}
