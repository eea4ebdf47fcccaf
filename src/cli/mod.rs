use clap::Parser;

pub mod handlers;

/// Markup tags of the help template and the SGR codes they stand for.
const HELP_STYLES: &[(&str, &str)] = &[
    ("title", "1;33"),
    ("group", "1;32"),
    ("cmd", "36"),
    ("hl", "1;36"),
    ("hi", "1"),
    ("err", "91"),
    ("dim", "2"),
];

/// Replaces `<tag>`/`</tag>` markup with ANSI escapes, or strips it when colours are off.
fn render_help(template: &str, use_colors: bool) -> String {
    HELP_STYLES
        .iter()
        .fold(template.to_string(), |text, (tag, sgr)| {
            let (open, close) = if use_colors {
                (format!("\x1b[{sgr}m"), "\x1b[0m")
            } else {
                (String::new(), "")
            };
            text.replace(&format!("<{tag}>"), &open)
                .replace(&format!("</{tag}>"), close)
        })
}

fn build_help_string() -> &'static str {
    let use_colors = colored::control::SHOULD_COLORIZE.should_colorize();
    // clap keeps the template for the whole run.
    Box::leak(render_help(t!("cli.help.template"), use_colors).into_boxed_str())
}

/// rlaunch: override ROS launch arguments and run the launch as one process group.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    help_template = { build_help_string() },
    styles = clap::builder::Styles::styled()
        .header(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .usage(clap::builder::styling::AnsiColor::Yellow.on_default().bold())
        .literal(clap::builder::styling::AnsiColor::Cyan.on_default().bold())
        .placeholder(clap::builder::styling::AnsiColor::Green.on_default()),
)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Either a command followed by its arguments, or a launch file to open in the panel.
    #[arg(trailing_var_arg = true)]
    pub args: Vec<String>,
}
