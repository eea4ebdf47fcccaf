// src/cli/handlers/stop.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{
    constants::DEFAULT_SHELL,
    system::process::{ProcessController, ProcessHandle},
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Sends SIGINT to a launch started with `rlaunch start`."
)]
struct StopArgs {
    /// The process group printed by `start`.
    pgid: u32,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let stop_args = StopArgs::try_parse_from(&args)?;

    // The group was started by another invocation; adopt it so it can be signalled.
    let mut controller = ProcessController::new(DEFAULT_SHELL);
    controller.adopt(ProcessHandle {
        pid: stop_args.pgid,
        pgid: stop_args.pgid,
    })?;

    if controller.exit_status().is_some() {
        println!(
            "{}",
            format!(t!("stop.info.gone"), pgid = stop_args.pgid).dimmed()
        );
        return Ok(());
    }

    if let Some(handle) = controller.stop()? {
        println!(
            "{}",
            format!(t!("stop.info.sent"), pgid = handle.pgid).yellow()
        );
    }
    Ok(())
}
