// src/cli/handlers/command.rs

use anyhow::Result;
use clap::Parser;

use crate::cli::handlers::commons;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Prints the command a start would run with the stored overrides."
)]
struct CommandArgs {
    /// The launch file.
    launch_file: String,

    /// Environment script to source instead of the stored one.
    #[arg(long, short)]
    source: Option<String>,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let command_args = CommandArgs::try_parse_from(&args)?;
    let env = commons::load_environment()?;
    let session = commons::open_session(
        &env,
        &command_args.launch_file,
        command_args.source.as_deref(),
    )?;

    // Plain output so it can be piped or pasted.
    println!("{}", session.preview_command()?);
    Ok(())
}
