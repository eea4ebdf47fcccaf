// src/bin/rlaunch.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use rlaunch::cli::{Cli, handlers};

// --- Command Definition and Registry ---

/// A command, its aliases, and its handler. Every handler receives the arguments that
/// follow the command name.
struct CommandDefinition {
    name: &'static str,
    aliases: &'static [&'static str],
    handler: fn(Vec<String>) -> Result<()>,
}

static COMMAND_REGISTRY: &[CommandDefinition] = &[
    CommandDefinition {
        name: "args",
        aliases: &["ls"],
        handler: handlers::args::handle,
    },
    CommandDefinition {
        name: "command",
        aliases: &["cmd"],
        handler: handlers::command::handle,
    },
    CommandDefinition {
        name: "panel",
        aliases: &["ui", "open"],
        handler: handlers::panel::handle,
    },
    CommandDefinition {
        name: "pick",
        aliases: &[],
        handler: handlers::pick::handle,
    },
    CommandDefinition {
        name: "reset",
        aliases: &[],
        handler: handlers::reset::handle,
    },
    CommandDefinition {
        name: "set",
        aliases: &[],
        handler: handlers::set::handle,
    },
    CommandDefinition {
        name: "start",
        aliases: &[],
        handler: handlers::start::handle,
    },
    CommandDefinition {
        name: "stop",
        aliases: &[],
        handler: handlers::stop::handle,
    },
];

fn find_command(name: &str) -> Option<&'static CommandDefinition> {
    COMMAND_REGISTRY
        .iter()
        .find(|cmd| cmd.name == name || cmd.aliases.contains(&name))
}

fn main() {
    env_logger::init();

    if let Err(e) = run_cli(Cli::parse()) {
        // Argument errors from the per-command parsers carry their own formatting.
        if let Some(clap_err) = e.downcast_ref::<clap::Error>() {
            clap_err.exit();
        }
        eprintln!("\n{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

/// Routes `rlaunch <command> [args...]` to its handler. Anything that is not a command
/// is taken as a launch file for the panel, and no arguments at all open the picker.
fn run_cli(cli: Cli) -> Result<()> {
    log::debug!("CLI args parsed: {:?}", cli);

    let mut args = cli.args.into_iter();
    let Some(first) = args.next() else {
        return handlers::panel::handle(Vec::new());
    };
    let rest: Vec<String> = args.collect();

    match find_command(&first) {
        Some(command) => (command.handler)(rest),
        None => {
            let mut panel_args = vec![first];
            panel_args.extend(rest);
            handlers::panel::handle(panel_args)
        }
    }
}
