// src/cli/handlers/args.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    cli::handlers::commons,
    core::session::LaunchSession,
    models::ArgKind,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Lists the arguments of a launch file with their defaults and overrides."
)]
struct ArgsArgs {
    /// The launch file.
    launch_file: String,

    /// Print a JSON array instead of a table.
    #[arg(long)]
    json: bool,
}

/// One argument as printed by `args --json`.
#[derive(Serialize, Debug)]
struct ArgumentView<'a> {
    name: &'a str,
    kind: ArgKind,
    default: Option<&'a str>,
    description: Option<&'a str>,
    #[serde(rename = "override")]
    value: Option<&'a str>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    attributes: &'a IndexMap<String, String>,
}

fn argument_views(session: &LaunchSession) -> Vec<ArgumentView<'_>> {
    session
        .store()
        .config()
        .args
        .values()
        .map(|entry| ArgumentView {
            name: &entry.declaration.name,
            kind: entry.declaration.kind(),
            default: entry.declaration.default.as_deref(),
            description: entry.declaration.description.as_deref(),
            value: entry.value.as_deref(),
            attributes: &entry.declaration.attributes,
        })
        .collect()
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let args_args = ArgsArgs::try_parse_from(&args)?;
    let env = commons::load_environment()?;
    let session = commons::open_session(&env, &args_args.launch_file, None)?;

    if args_args.json {
        println!("{}", serde_json::to_string_pretty(&argument_views(&session))?);
        return Ok(());
    }

    println!(
        "\n--- {} ---",
        format!(t!("args.info.header"), file = session.launch_file().display()).yellow()
    );
    commons::print_arguments(&session);
    println!(
        "\n{}",
        format!(t!("args.info.config"), path = session.store().path().display()).dimmed()
    );
    Ok(())
}
