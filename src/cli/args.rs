use clap::Args;

#[derive(Args, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Workflow names to check (default: [workflows] names, else every local <name>.yml)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct UpdateArgs {
    /// Workflow names to create or update (default: [workflows] names, else every local <name>.yml)
    #[arg(value_name = "NAME")]
    pub names: Vec<String>,

    /// Also overwrite workflow and job level fields and remove jobs missing from the template
    #[arg(long, short = 'f')]
    pub force: bool,

    /// Print old and new values of every applied change
    #[arg(long)]
    pub diff: bool,

    /// Report what would change without writing any file
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Only list workflows present in the workflows directory
    #[arg(long)]
    pub local: bool,
}
