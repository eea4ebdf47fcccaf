// src/constants.rs

/// The name of the application directory inside the system config and cache directories.
pub const APP_DIR: &str = "rlaunch";

/// Environment variable that, when set, replaces the application config directory.
pub const HOME_ENV_VAR: &str = "RLAUNCH_HOME";

/// The name of the global settings file (in ~/.config/rlaunch/).
pub const SETTINGS_FILENAME: &str = "settings.toml";

/// The name of the directory holding one override document per launch file.
pub const CONFIG_SUBDIR: &str = "config";

/// Extension appended to a launch file's name to derive its override document.
pub const CONFIG_EXTENSION: &str = "yaml";

/// The name of the directory (inside the cache dir) that receives launch output.
pub const LOGS_SUBDIR: &str = "logs";

/// File suffix the picker looks for.
pub const LAUNCH_FILE_SUFFIX: &str = ".launch.xml";

/// The tag of a top-level argument declaration in a launch description.
pub const ARG_TAG: &str = "arg";

/// Separator between an argument name and its value on the launch command line.
pub const ARG_ASSIGN: &str = ":=";

pub const DEFAULT_SOURCE_FILE: &str = "/opt/ros/humble/setup.bash";
pub const DEFAULT_LAUNCH_RUNNER: &str = "ros2 launch";
pub const DEFAULT_SHELL: &str = "/bin/bash";
