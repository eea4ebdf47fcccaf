// src/cli/handlers/start.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::{cli::handlers::commons, system::process::OutputTarget};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Starts a launch file in the background with its stored overrides."
)]
struct StartArgs {
    /// The launch file.
    launch_file: String,

    /// Environment script to source instead of the stored one. It is stored for next time.
    #[arg(long, short)]
    source: Option<String>,

    /// Write the launch output to a log file, whatever the settings say.
    #[arg(long, conflicts_with = "no_log")]
    log: bool,

    /// Leave the launch output on this terminal, whatever the settings say.
    #[arg(long)]
    no_log: bool,
}

impl StartArgs {
    fn to_log(&self, configured: bool) -> bool {
        (configured || self.log) && !self.no_log
    }
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let start_args = StartArgs::try_parse_from(&args)?;
    let env = commons::load_environment()?;
    let mut session = commons::open_session(
        &env,
        &start_args.launch_file,
        start_args.source.as_deref(),
    )?;

    let output = commons::output_target(
        session.launch_file(),
        start_args.to_log(env.settings.log_output),
    )?;
    let handle = session.start(&output)?;

    println!(
        "{}",
        format!(t!("panel.info.started"), pid = handle.pid, pgid = handle.pgid).green()
    );
    if let OutputTarget::LogFile(path) = &output {
        println!(
            "{}",
            format!(t!("panel.info.logging"), path = path.display()).dimmed()
        );
    }
    println!(
        "{}",
        format!(t!("start.info.hint"), pgid = handle.pgid).dimmed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_flags_override_settings() {
        let plain = StartArgs::try_parse_from(["a.launch.xml"]).unwrap();
        assert!(plain.to_log(true));
        assert!(!plain.to_log(false));

        let forced = StartArgs::try_parse_from(["a.launch.xml", "--log"]).unwrap();
        assert!(forced.to_log(false));

        let quiet = StartArgs::try_parse_from(["a.launch.xml", "--no-log"]).unwrap();
        assert!(!quiet.to_log(true));

        assert!(StartArgs::try_parse_from(["a.launch.xml", "--log", "--no-log"]).is_err());
    }
}
