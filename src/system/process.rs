// src/system/process.rs

use crate::{
    constants::ARG_ASSIGN,
    core::form::ArgForm,
    models::OverrideEntry,
};
use indexmap::IndexMap;
use std::borrow::Cow;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("A launch is already running (PID {pid}). Stop it first.")]
    AlreadyRunning { pid: u32 },
    #[error("Could not start '{shell}': {source}")]
    Spawn {
        shell: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not create log file '{path}': {source}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Value '{0}' cannot be passed through the shell.")]
    Unquotable(String),
    #[error("Failed to signal process group {pgid}: {source}")]
    Signal {
        pgid: u32,
        #[source]
        source: std::io::Error,
    },
    #[error("Process ID {0} is out of range.")]
    InvalidPid(u32),
    #[error("Process groups are not supported on this platform.")]
    Unsupported,
}

/// What the launch command is built from, besides the arguments.
#[derive(Debug, Clone, Copy)]
pub struct LaunchSpec<'a> {
    /// Environment script sourced first.
    pub source_file: &'a Path,
    /// Command prefix that receives the launch file (e.g. `ros2 launch`).
    pub launch_runner: &'a str,
    pub launch_file: &'a Path,
}

fn quote(value: &str) -> Result<Cow<'_, str>, ProcessError> {
    shlex::try_quote(value).map_err(|_| ProcessError::Unquotable(value.to_string()))
}

/// Builds `source <script> && exec <runner> <launch file> [name:=value]*`.
///
/// For each argument, the current form value becomes a `name:=value` token and the
/// entry's override when it is non-empty and differs from the default; otherwise the
/// argument is left out and any stored override is cleared.
pub fn compute_command(
    spec: &LaunchSpec<'_>,
    args: &mut IndexMap<String, OverrideEntry>,
    form: &ArgForm,
) -> Result<String, ProcessError> {
    let source = spec.source_file.to_string_lossy();
    let launch = spec.launch_file.to_string_lossy();
    let mut command = format!(
        "source {} && exec {} {}",
        quote(&source)?,
        spec.launch_runner.trim(),
        quote(&launch)?
    );

    for (name, entry) in args.iter_mut() {
        let current = form
            .value_of(name)
            .map(str::to_string)
            .unwrap_or_else(|| entry.effective_value().to_string());

        if !current.is_empty() && current != entry.declaration.default_value() {
            command.push(' ');
            command.push_str(&quote(name)?);
            command.push_str(ARG_ASSIGN);
            command.push_str(&quote(&current)?);
            entry.value = Some(current);
        } else if entry.value.take().is_some() {
            log::debug!("Dropping stale override for '{}'.", name);
        }
    }

    Ok(command)
}

/// The process group of a running launch. The shell is the group leader, so `pgid == pid`
/// for launches started here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessHandle {
    pub pid: u32,
    pub pgid: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessState {
    Idle,
    Running,
}

/// Where the launch's stdout/stderr go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    Inherit,
    LogFile(PathBuf),
}

#[derive(Debug)]
struct Tracked {
    handle: ProcessHandle,
    // `None` for groups adopted from another invocation.
    child: Option<Child>,
}

/// Starts one launch at a time in its own process group and interrupts that group on stop.
///
/// The state only changes on `start`/`stop`; a launch that exits by itself keeps the
/// controller `Running` until the next `stop`.
#[derive(Debug)]
pub struct ProcessController {
    shell: PathBuf,
    tracked: Option<Tracked>,
    // Stopped launches not yet reaped.
    retired: Vec<Child>,
}

impl ProcessController {
    pub fn new(shell: impl Into<PathBuf>) -> Self {
        Self {
            shell: shell.into(),
            tracked: None,
            retired: Vec::new(),
        }
    }

    pub fn state(&self) -> ProcessState {
        if self.tracked.is_some() {
            ProcessState::Running
        } else {
            ProcessState::Idle
        }
    }

    pub fn is_running(&self) -> bool {
        self.state() == ProcessState::Running
    }

    pub fn handle(&self) -> Option<ProcessHandle> {
        self.tracked.as_ref().map(|t| t.handle)
    }

    /// Runs `<shell> -c <command>` as the leader of a new process group.
    pub fn start(
        &mut self,
        command: &str,
        output: &OutputTarget,
    ) -> Result<ProcessHandle, ProcessError> {
        if let Some(handle) = self.handle() {
            return Err(ProcessError::AlreadyRunning { pid: handle.pid });
        }
        self.reap_retired();

        let (stdout, stderr) = match output {
            OutputTarget::Inherit => (Stdio::inherit(), Stdio::inherit()),
            OutputTarget::LogFile(path) => {
                let log_err = |e| ProcessError::LogFile {
                    path: path.display().to_string(),
                    source: e,
                };
                let file = File::create(path).map_err(log_err)?;
                let file_err = file.try_clone().map_err(log_err)?;
                (Stdio::from(file), Stdio::from(file_err))
            }
        };

        let mut cmd = Command::new(&self.shell);
        cmd.arg("-c")
            .arg(command)
            .stdin(Stdio::null())
            .stdout(stdout)
            .stderr(stderr);
        detach(&mut cmd)?;

        log::info!("Starting launch: {}", command);
        let child = cmd.spawn().map_err(|e| ProcessError::Spawn {
            shell: self.shell.display().to_string(),
            source: e,
        })?;

        let pid = child.id();
        let handle = ProcessHandle { pid, pgid: pid };
        log::debug!("Launch running as PID {} (group {}).", pid, pid);
        self.tracked = Some(Tracked {
            handle,
            child: Some(child),
        });
        Ok(handle)
    }

    /// Tracks a process group started elsewhere, so that `stop` can signal it.
    pub fn adopt(&mut self, handle: ProcessHandle) -> Result<(), ProcessError> {
        if let Some(current) = self.handle() {
            return Err(ProcessError::AlreadyRunning { pid: current.pid });
        }
        self.tracked = Some(Tracked {
            handle,
            child: None,
        });
        Ok(())
    }

    /// Sends SIGINT to the tracked process group and forgets it.
    ///
    /// Without a tracked group this does nothing. A group that no longer exists is not
    /// an error. Termination is not awaited; the shell is reaped later, without blocking.
    ///
    /// Once every member of a group has exited the kernel may hand its id to a new
    /// group, so a launch seen as exited should be stopped promptly.
    pub fn stop(&mut self) -> Result<Option<ProcessHandle>, ProcessError> {
        let Some(tracked) = self.tracked.take() else {
            return Ok(None);
        };
        let handle = tracked.handle;
        log::info!("Stopping launch group {}.", handle.pgid);
        let signalled = interrupt_group(handle.pgid);
        if let Some(child) = tracked.child {
            self.retired.push(child);
        }
        self.reap_retired();
        signalled?;
        Ok(Some(handle))
    }

    /// Collects the exit status of stopped launches that have finished.
    fn reap_retired(&mut self) {
        self.retired.retain_mut(|child| match child.try_wait() {
            Ok(Some(status)) => {
                log::debug!("Reaped PID {} ({}).", child.id(), status);
                false
            }
            Ok(None) => true,
            Err(e) => {
                log::warn!("Could not reap PID {}: {}", child.id(), e);
                false
            }
        });
    }

    /// Checks, without blocking or changing state, whether the tracked launch has exited.
    /// Finished stopped launches are reaped on the way.
    ///
    /// Returns the exit status when it is known (launches started by this controller),
    /// `Some(None)` when an adopted group has disappeared, and `None` while it still runs
    /// or when nothing is tracked.
    pub fn exit_status(&mut self) -> Option<Option<ExitStatus>> {
        self.reap_retired();
        let tracked = self.tracked.as_mut()?;
        match tracked.child.as_mut() {
            Some(child) => match child.try_wait() {
                Ok(Some(status)) => Some(Some(status)),
                Ok(None) => None,
                Err(e) => {
                    log::warn!("Could not query PID {}: {}", tracked.handle.pid, e);
                    None
                }
            },
            None => (!group_exists(tracked.handle.pgid)).then_some(None),
        }
    }
}

#[cfg(unix)]
fn detach(cmd: &mut Command) -> Result<(), ProcessError> {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
    Ok(())
}

#[cfg(not(unix))]
fn detach(_cmd: &mut Command) -> Result<(), ProcessError> {
    Err(ProcessError::Unsupported)
}

#[cfg(unix)]
fn group_pid(pgid: u32) -> Result<nix::unistd::Pid, ProcessError> {
    match i32::try_from(pgid) {
        Ok(raw) if raw > 1 => Ok(nix::unistd::Pid::from_raw(raw)),
        _ => Err(ProcessError::InvalidPid(pgid)),
    }
}

#[cfg(unix)]
fn interrupt_group(pgid: u32) -> Result<(), ProcessError> {
    use nix::errno::Errno;
    use nix::sys::signal::{Signal, killpg};

    match killpg(group_pid(pgid)?, Signal::SIGINT) {
        Ok(()) => Ok(()),
        Err(Errno::ESRCH) => {
            log::debug!("Process group {} is already gone.", pgid);
            Ok(())
        }
        Err(errno) => Err(ProcessError::Signal {
            pgid,
            source: std::io::Error::from(errno),
        }),
    }
}

#[cfg(not(unix))]
fn interrupt_group(_pgid: u32) -> Result<(), ProcessError> {
    Err(ProcessError::Unsupported)
}

#[cfg(unix)]
fn group_exists(pgid: u32) -> bool {
    match group_pid(pgid) {
        Ok(pid) => nix::sys::signal::killpg(pid, None::<nix::sys::signal::Signal>).is_ok(),
        Err(_) => false,
    }
}

#[cfg(not(unix))]
fn group_exists(_pgid: u32) -> bool {
    false
}
