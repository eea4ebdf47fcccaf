//! `rlaunch`: pick a ROS launch description, override its arguments from a terminal panel,
//! persist the overrides per launch file, and run the launch as a detached process group.
include!(concat!(env!("OUT_DIR"), "/translations.rs"));

pub mod cli;
pub mod constants;
pub mod core;
pub mod models;
pub mod system;
