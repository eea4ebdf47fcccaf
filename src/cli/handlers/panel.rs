// src/cli/handlers/panel.rs

use anyhow::Result;
use clap::Parser;
use colored::*;
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};

use crate::{
    cli::handlers::commons::{self, Environment},
    core::{paths, session::LaunchSession},
    models::ArgKind,
    system::{process::OutputTarget, settings},
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Edits the arguments of a launch file and starts or stops it."
)]
struct PanelArgs {
    /// The launch file to open. Asked for interactively when omitted.
    launch_file: Option<String>,

    /// Environment script to source instead of the stored one.
    #[arg(long, short)]
    source: Option<String>,

    /// Where the picker looks for launch files.
    #[arg(long, short)]
    dir: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Start,
    Stop,
    Edit,
    Reset,
    Source,
    Command,
    Reload,
    Open,
    Quit,
}

impl Action {
    fn label(self) -> &'static str {
        match self {
            Self::Start => t!("panel.item.start"),
            Self::Stop => t!("panel.item.stop"),
            Self::Edit => t!("panel.item.edit"),
            Self::Reset => t!("panel.item.reset"),
            Self::Source => t!("panel.item.source"),
            Self::Command => t!("panel.item.command"),
            Self::Reload => t!("panel.item.reload"),
            Self::Open => t!("panel.item.open"),
            Self::Quit => t!("panel.item.quit"),
        }
    }
}

/// The toggle comes first so that Enter starts or stops the launch.
fn menu(running: bool) -> Vec<Action> {
    let toggle = if running { Action::Stop } else { Action::Start };
    vec![
        toggle,
        Action::Edit,
        Action::Reset,
        Action::Source,
        Action::Command,
        Action::Reload,
        Action::Open,
        Action::Quit,
    ]
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let panel_args = PanelArgs::try_parse_from(&args)?;
    let env = commons::load_environment()?;

    let launch_file = match panel_args.launch_file {
        Some(file) => file,
        None => {
            let root = match &panel_args.dir {
                Some(dir) => paths::expand_path(dir)?,
                None => settings::resolve_search_dir(&env.settings)?,
            };
            match commons::choose_launch_file(&root)? {
                Some(path) => path.display().to_string(),
                None => return Ok(()),
            }
        }
    };

    let session = commons::open_session(&env, &launch_file, panel_args.source.as_deref())?;
    run(&env, session)
}

/// The interactive loop over one session at a time.
pub fn run(env: &Environment, mut session: LaunchSession) -> Result<()> {
    let theme = ColorfulTheme::default();

    loop {
        print_header(&mut session);
        commons::print_arguments(&session);
        println!();

        let actions = menu(session.is_running());
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let choice = Select::with_theme(&theme)
            .with_prompt(t!("panel.prompt.action"))
            .items(&labels)
            .default(0)
            .interact_opt()?;
        let action = choice
            .and_then(|idx| actions.get(idx).copied())
            .unwrap_or(Action::Quit);
        log::debug!("Panel action: {:?}", action);

        let outcome = match action {
            Action::Start => start(env, &mut session),
            Action::Stop => stop(&mut session),
            Action::Edit => edit_argument(&mut session, &theme),
            Action::Reset => {
                reset_form(&mut session);
                Ok(())
            }
            Action::Source => change_source(&mut session, &theme),
            Action::Command => session.preview_command().map_err(anyhow::Error::from).map(|command| {
                println!("\n{}", command.cyan());
            }),
            Action::Reload => session.reload().map_err(anyhow::Error::from).map(|added| {
                println!(
                    "\n{}",
                    format!(t!("panel.info.reloaded"), count = added).green()
                );
            }),
            Action::Open => match switch_launch_file(env, &mut session, &theme) {
                Ok(Some(next)) => {
                    session = next;
                    Ok(())
                }
                Ok(None) => Ok(()),
                Err(e) => Err(e),
            },
            Action::Quit => {
                if session.is_running()
                    && Confirm::with_theme(&theme)
                        .with_prompt(t!("panel.confirm.stop_on_quit"))
                        .default(true)
                        .interact()?
                {
                    stop(&mut session)?;
                }
                return Ok(());
            }
        };

        // A failed action is reported and the panel stays open.
        if let Err(e) = outcome {
            eprintln!("\n{}: {}", "Error".red().bold(), e);
        }
    }
}

fn print_header(session: &mut LaunchSession) {
    let name = session
        .launch_file()
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    println!("\n--- {} ---", name.yellow().bold());
    println!(
        "  {:<8} {}",
        t!("panel.label.launch").blue(),
        session.launch_file().display()
    );
    let source = session.source_file().display().to_string();
    println!(
        "  {:<8} {}",
        t!("panel.label.source").blue(),
        if source.is_empty() {
            "-".dimmed()
        } else {
            source.normal()
        }
    );

    let handle = session.controller().handle();
    let status = match handle {
        Some(handle) => {
            if session.controller_mut().exit_status().is_some() {
                t!("panel.status.exited").yellow()
            } else {
                format!(t!("panel.status.running"), pid = handle.pid)
                    .green()
                    .bold()
            }
        }
        None => t!("panel.status.idle").dimmed(),
    };
    println!("  {:<8} {}\n", t!("panel.label.status").blue(), status);
}

fn start(env: &Environment, session: &mut LaunchSession) -> Result<()> {
    let output = commons::output_target(session.launch_file(), env.settings.log_output)?;
    let handle = session.start(&output)?;
    println!(
        "\n{}",
        format!(t!("panel.info.started"), pid = handle.pid, pgid = handle.pgid).green()
    );
    if let OutputTarget::LogFile(path) = &output {
        println!(
            "{}",
            format!(t!("panel.info.logging"), path = path.display()).dimmed()
        );
    }
    Ok(())
}

fn stop(session: &mut LaunchSession) -> Result<()> {
    match session.stop()? {
        Some(handle) => println!(
            "\n{}",
            format!(t!("panel.info.stopped"), pgid = handle.pgid).yellow()
        ),
        None => println!("\n{}", t!("common.error.not_running").dimmed()),
    }
    Ok(())
}

fn edit_argument(session: &mut LaunchSession, theme: &ColorfulTheme) -> Result<()> {
    let fields = session.form().fields();
    if fields.is_empty() {
        println!("\n{}", t!("panel.info.no_arguments").dimmed());
        return Ok(());
    }

    let width = commons::name_width(fields);
    let mut items: Vec<String> = fields
        .iter()
        .map(|f| commons::field_line(f, width))
        .collect();
    items.push(t!("panel.item.back").to_string());

    let Some(idx) = Select::with_theme(theme)
        .with_prompt(t!("panel.prompt.argument"))
        .items(&items)
        .default(0)
        .interact_opt()?
    else {
        return Ok(());
    };
    let Some(field) = fields.get(idx) else {
        // "back"
        return Ok(());
    };

    let name = field.name().to_string();
    let value = match field.kind() {
        ArgKind::Boolean => {
            let options = ["true", "false"];
            let current = usize::from(field.current_value() != "true");
            let Some(choice) = Select::with_theme(theme)
                .with_prompt(&name)
                .items(&options)
                .default(current)
                .interact_opt()?
            else {
                return Ok(());
            };
            options.get(choice).copied().unwrap_or("false").to_string()
        }
        ArgKind::Text => {
            let prompt = if field.description().is_empty() {
                name.clone()
            } else {
                format!("{} ({})", name, field.description())
            };
            Input::<String>::with_theme(theme)
                .with_prompt(prompt)
                .with_initial_text(field.current_value())
                .allow_empty(true)
                .interact_text()?
        }
    };

    let state = session.form_mut().set(&name, &value)?;
    log::debug!("'{}' is now {:?}", name, state);
    Ok(())
}

/// Puts every field back to its declared default. Saved on the next start.
fn reset_form(session: &mut LaunchSession) {
    let names: Vec<String> = session
        .form()
        .fields()
        .iter()
        .map(|f| f.name().to_string())
        .collect();
    for name in names {
        if let Some(field) = session.form_mut().get_mut(&name) {
            field.reset();
        }
    }
}

fn change_source(session: &mut LaunchSession, theme: &ColorfulTheme) -> Result<()> {
    let current = session.source_file().display().to_string();
    let input: String = Input::with_theme(theme)
        .with_prompt(t!("panel.item.source"))
        .with_initial_text(current)
        .interact_text()?;
    session.set_source_file(paths::expand_path(input.trim())?);
    Ok(())
}

/// Asks for another launch file and opens it. A running launch has to be stopped first,
/// since the new session would lose track of it.
fn switch_launch_file(
    env: &Environment,
    session: &mut LaunchSession,
    theme: &ColorfulTheme,
) -> Result<Option<LaunchSession>> {
    if session.is_running() {
        if !Confirm::with_theme(theme)
            .with_prompt(t!("panel.confirm.stop_to_switch"))
            .default(true)
            .interact()?
        {
            return Ok(None);
        }
        stop(session)?;
    }

    let root = settings::resolve_search_dir(&env.settings)?;
    let Some(path) = commons::choose_launch_file(&root)? else {
        return Ok(None);
    };
    let next = commons::open_session(env, &path.display().to_string(), None)?;
    Ok(Some(next))
}
