// src/cli/handlers/reset.rs

use anyhow::{Result, anyhow};
use clap::Parser;
use colored::*;

use crate::cli::handlers::commons;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Clears stored overrides so the launch file defaults apply again."
)]
struct ResetArgs {
    /// The launch file.
    launch_file: String,

    /// Arguments to reset. All of them when omitted.
    names: Vec<String>,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let reset_args = ResetArgs::try_parse_from(&args)?;
    let env = commons::load_environment()?;
    let mut session = commons::open_session(&env, &reset_args.launch_file, None)?;

    let known = &session.store().config().args;
    let unknown: Vec<&str> = reset_args
        .names
        .iter()
        .filter(|name| !known.contains_key(name.as_str()))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(anyhow!("Unknown argument(s): {}", unknown.join(", ")));
    }

    let cleared = session.store_mut().clear_overrides(&reset_args.names);
    session.store().save()?;
    session.refresh_form();

    log::debug!("Cleared overrides: {:?}", cleared);
    println!(
        "{}",
        format!(t!("reset.info.cleared"), count = cleared.len()).green()
    );
    Ok(())
}
