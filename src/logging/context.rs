use crate::cli::Args;
use std::env;

/// Execution contexts that influence how logging is routed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecutionContext {
    /// A developer running the tool in a terminal.
    Interactive,
    /// Output is consumed by another program (`--json`), so the console stays quiet.
    Machine,
    /// Running inside a CI job, where stderr ends up in the job log.
    Ci,
}

impl ExecutionContext {
    /// Returns `true` when console sinks should be disabled.
    pub fn disables_console(self) -> bool {
        matches!(self, ExecutionContext::Machine)
    }
}

/// Derive the active execution context from the parsed CLI arguments and environment.
pub fn detect_context(args: &Args) -> ExecutionContext {
    if args.json {
        return ExecutionContext::Machine;
    }
    if ci_detected() {
        return ExecutionContext::Ci;
    }
    ExecutionContext::Interactive
}

fn ci_detected() -> bool {
    ["CI", "GITHUB_ACTIONS"].iter().any(|name| {
        env::var(name)
            .map(|value| matches!(value.trim(), "1" | "true"))
            .unwrap_or(false)
    })
}
