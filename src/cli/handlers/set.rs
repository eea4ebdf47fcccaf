// src/cli/handlers/set.rs

use anyhow::Result;
use clap::Parser;
use colored::*;

use crate::cli::handlers::commons;

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Stores override values for a launch file without starting it."
)]
struct SetArgs {
    /// The launch file.
    launch_file: String,

    /// One or more `name=value` (or `name:=value`) pairs.
    #[arg(required = true, num_args = 1..)]
    assignments: Vec<String>,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let set_args = SetArgs::try_parse_from(&args)?;

    // Validate every pair before anything is written.
    let assignments = set_args
        .assignments
        .iter()
        .map(|raw| commons::parse_assignment(raw))
        .collect::<Result<Vec<_>>>()?;

    let env = commons::load_environment()?;
    let mut session = commons::open_session(&env, &set_args.launch_file, None)?;
    for (name, value) in &assignments {
        session.form_mut().set(name, value)?;
    }

    session.apply_form()?;
    session.store().save()?;

    let stored = session
        .store()
        .config()
        .args
        .values()
        .filter(|entry| entry.value.is_some())
        .count();
    println!(
        "{}",
        format!(
            t!("set.info.applied"),
            count = stored,
            path = session.store().path().display()
        )
        .green()
    );
    commons::print_arguments(&session);
    Ok(())
}
