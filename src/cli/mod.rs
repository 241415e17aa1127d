pub mod args;
pub mod commands;

pub use args::{CheckArgs, ListArgs, UpdateArgs};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
WORKFLOW COMMANDS:\n{subcommands}\n";

#[derive(Parser, Debug)]
#[command(name = "ghactions")]
#[command(version = crate::VERSION)]
#[command(about = "Keep GitHub Actions workflows in sync with upstream templates")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Typical flow: check what a template update would change, then update. Mark a step with 'github-actions-managed: false' to keep your edits."
)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Repository root containing ghactions.toml and the workflows directory
    #[arg(long, global = true, default_value = ".", value_name = "PATH")]
    pub path: PathBuf,

    /// Template base URL; `{ref}` is replaced with the template revision
    #[arg(long, global = true, value_name = "URL")]
    pub template_url: Option<String>,

    /// Template revision (tag, branch or commit)
    #[arg(long = "ref", global = true, value_name = "REF")]
    pub git_ref: Option<String>,

    /// Emit machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        about = "Show what updating would change",
        long_about = "Check downloads the templates, merges them with the local workflows in memory and reports every change without writing anything. Exits with status 1 when a workflow has errors.",
        after_help = "Example:\n    ghactions check on_push_check --template-url https://example.com/{ref}/workflows/"
    )]
    Check(CheckArgs),
    #[command(
        about = "Create or update local workflows from templates",
        long_about = "Update merges each template into the local workflow. Managed steps follow the template, unmanaged and user-added steps are kept. Workflow and job level fields change only with --force.",
        after_help = "Example:\n    ghactions update on_push_check --force --diff"
    )]
    Update(UpdateArgs),
    #[command(
        about = "List workflows and whether they exist locally",
        after_help = "Example:\n    ghactions list --json"
    )]
    List(ListArgs),
}

pub async fn run(args: Args) -> crate::Result<ExitCode> {
    let settings = commands::Settings::resolve(&args)?;
    match args.command {
        Command::Check(check_args) => commands::check(&settings, check_args).await,
        Command::Update(update_args) => commands::update(&settings, update_args).await,
        Command::List(list_args) => commands::list(&settings, list_args),
    }
}
