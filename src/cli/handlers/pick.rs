// src/cli/handlers/pick.rs

use anyhow::Result;
use clap::Parser;

use crate::{
    cli::handlers::{commons, panel},
    core::paths,
    system::settings,
};

#[derive(Parser, Debug, Default)]
#[command(
    no_binary_name = true,
    about = "Finds launch files below a directory and opens the chosen one in the panel."
)]
struct PickArgs {
    /// Where to search. Defaults to `search_dir` from the settings, or the home directory.
    #[arg(long, short)]
    dir: Option<String>,
}

pub fn handle(args: Vec<String>) -> Result<()> {
    let pick_args = PickArgs::try_parse_from(&args)?;
    let env = commons::load_environment()?;

    let root = match pick_args.dir {
        Some(dir) => paths::expand_path(&dir)?,
        None => settings::resolve_search_dir(&env.settings)?,
    };

    let Some(launch_file) = commons::choose_launch_file(&root)? else {
        return Ok(());
    };
    let session = commons::open_session(&env, &launch_file.display().to_string(), None)?;
    panel::run(&env, session)
}
