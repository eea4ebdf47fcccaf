//! # System Interaction Layer
//!
//! The boundary between launch logic and the operating system.
//!
//! ## Modules
//!
//! - **`process`**: Builds the launch command line and runs it as a detached process
//!   group that can be interrupted as a unit.
//! - **`settings`**: Loads `settings.toml`, which names the source script, the launch
//!   runner, the shell and the directories used by `rlaunch`.

pub mod process;
pub mod settings;
