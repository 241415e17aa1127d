use crate::{
    cli::args::{CheckArgs, ListArgs, UpdateArgs},
    cli::Args,
    core::{
        sync::{self, diff_lines, SyncReport, SyncStatus},
        workflow::Action,
        AppError, ConfigLoader, ConfigValidator, DefaultErrorReporter, ErrorReporter,
        ResourceProvider, SyncConfig, TemplateSource, WorkflowResource,
    },
    Result,
};
use anyhow::{anyhow, Context};
use serde::Serialize;
use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

/// Configuration merged from ghactions.toml, environment and command line flags.
#[derive(Debug, Clone)]
pub struct Settings {
    pub root: PathBuf,
    pub config: SyncConfig,
    pub json: bool,
}

impl Settings {
    pub fn resolve(args: &Args) -> Result<Self> {
        let mut config = ConfigLoader::load_from_workspace(&args.path)?;
        if let Some(url) = &args.template_url {
            config.templates.url = Some(url.clone());
        }
        if let Some(git_ref) = &args.git_ref {
            config.templates.git_ref = git_ref.clone();
        }
        ConfigValidator::validate(&config)?;
        Ok(Self {
            root: args.path.clone(),
            config,
            json: args.json,
        })
    }

    pub fn workflows_dir(&self) -> PathBuf {
        self.root.join(&self.config.workflows.dir)
    }

    fn template_source(&self) -> Result<TemplateSource> {
        let url = self.config.templates.resolved_url().ok_or_else(|| {
            anyhow!("no template URL configured; pass --template-url or set templates.url in ghactions.toml")
        })?;
        Ok(TemplateSource::new(&url, self.workflows_dir())?)
    }

    /// Names from the command line, else from the config, else every local `<name>.yml`.
    fn workflow_names(&self, requested: &[String]) -> Result<Vec<String>> {
        let names = if !requested.is_empty() {
            requested.to_vec()
        } else if !self.config.workflows.names.is_empty() {
            self.config.workflows.names.clone()
        } else {
            discover_local_workflows(&self.workflows_dir())?
        };
        for name in &names {
            ConfigValidator::validate_workflow_name(name)?;
        }
        Ok(names)
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    report: &'a SyncReport,
    path: String,
    summary: String,
    written: bool,
}

#[derive(Serialize)]
struct JsonFailure {
    name: String,
    error: String,
}

#[derive(Serialize, Default)]
struct JsonOutput<'a> {
    workflows: Vec<JsonReport<'a>>,
    failures: Vec<JsonFailure>,
}

/// Dry run: print what an update would change.
pub async fn check(settings: &Settings, args: CheckArgs) -> Result<ExitCode> {
    let source = settings.template_source()?;
    let names = settings.workflow_names(&args.names)?;
    let force = settings.config.sync.force;
    let reporter = DefaultErrorReporter::new();
    warn_if_empty(settings, &reporter, &names);
    let results = sync::run_batch(&source, &names, force).await;

    let mut has_errors = false;
    let mut output = JsonOutput::default();
    for (name, result) in &results {
        let path = source.local_path(name);
        match result {
            Ok(report) => {
                has_errors |= report.has_errors();
                if settings.json {
                    output.workflows.push(json_report(report, &path, false));
                } else {
                    print_check_report(report, &path, force);
                }
            }
            Err(err) => {
                has_errors = true;
                record_failure(&reporter, &mut output, settings.json, name, err);
            }
        }
    }

    if settings.json {
        print_json(&output)?;
    } else if !has_errors && !results.is_empty() {
        println!("All checks passed, run `ghactions update` to apply changes.");
    }
    Ok(exit_code(has_errors))
}

/// Create missing workflows and write merged ones.
pub async fn update(settings: &Settings, args: UpdateArgs) -> Result<ExitCode> {
    let source = settings.template_source()?;
    let names = settings.workflow_names(&args.names)?;
    let force = args.force || settings.config.sync.force;
    let diff = args.diff || settings.config.sync.diff;
    let reporter = DefaultErrorReporter::new();
    warn_if_empty(settings, &reporter, &names);
    let results = sync::run_batch(&source, &names, force).await;

    let mut has_errors = false;
    let mut output = JsonOutput::default();
    for (name, result) in &results {
        let path = source.local_path(name);
        let report = match result {
            Ok(report) => report,
            Err(err) => {
                has_errors = true;
                record_failure(&reporter, &mut output, settings.json, name, err);
                continue;
            }
        };
        has_errors |= report.has_errors();

        let written = if args.dry_run {
            false
        } else {
            match sync::apply(&source, report).await {
                Ok(written) => written,
                Err(err) => {
                    has_errors = true;
                    record_failure(&reporter, &mut output, settings.json, name, &err);
                    continue;
                }
            }
        };

        if settings.json {
            output.workflows.push(json_report(report, &path, written));
        } else {
            print_update_report(report, &path, force, diff, written);
        }
    }

    if settings.json {
        print_json(&output)?;
    }
    Ok(exit_code(has_errors))
}

#[derive(Serialize)]
struct ListEntry {
    name: String,
    path: String,
    exists: bool,
}

/// Print configured and local workflows with their local presence.
pub fn list(settings: &Settings, args: ListArgs) -> Result<ExitCode> {
    let dir = settings.workflows_dir();
    let mut names = settings.config.workflows.names.clone();
    for name in discover_local_workflows(&dir)? {
        if !names.contains(&name) {
            names.push(name);
        }
    }

    let entries: Vec<ListEntry> = names
        .into_iter()
        .map(|name| {
            let path = dir.join(WorkflowResource::file_name_for(&name));
            ListEntry {
                exists: path.is_file(),
                path: path.display().to_string(),
                name,
            }
        })
        .filter(|entry| !args.local || entry.exists)
        .collect();

    if settings.json {
        print_json(&entries)?;
        return Ok(ExitCode::SUCCESS);
    }
    if entries.is_empty() {
        println!("No workflows found in {}", dir.display());
    }
    for entry in &entries {
        let marker = if entry.exists { "✓" } else { "✎" };
        let state = if entry.exists { "" } else { " (not created yet)" };
        println!("  {}  {} : {}{}", marker, entry.name, entry.path, state);
    }
    Ok(ExitCode::SUCCESS)
}

fn print_check_report(report: &SyncReport, path: &Path, force: bool) {
    println!("{} : {}", path.display(), report.summary());
    for check in &report.checks {
        if check.needs_force(force) {
            println!("{}", check.no_force_message());
        } else if check.action != Action::Equal {
            println!("  {}", check.check_message());
        }
    }
}

fn print_update_report(report: &SyncReport, path: &Path, force: bool, diff: bool, written: bool) {
    let verb = match (report.status, written) {
        (SyncStatus::Create, true) => "created",
        (SyncStatus::Update, true) => "updated",
        _ => "unchanged",
    };
    println!("{} : {}, {}", path.display(), report.summary(), verb);
    for check in &report.checks {
        if check.is_error() {
            println!("  {}", check.check_message());
        } else if check.needs_force(force) {
            println!("{}", check.no_force_message());
        } else if check.is_applied(force) {
            println!("  {}", check.update_message());
            if diff {
                for line in diff_lines(check) {
                    println!("      {}", line);
                }
            }
        }
    }
}

fn json_report<'a>(report: &'a SyncReport, path: &Path, written: bool) -> JsonReport<'a> {
    JsonReport {
        report,
        path: path.display().to_string(),
        summary: report.summary(),
        written,
    }
}

fn warn_if_empty(settings: &Settings, reporter: &DefaultErrorReporter, names: &[String]) {
    if names.is_empty() && !settings.json {
        reporter.report_warning(
            "no workflows to reconcile",
            Some(format!(
                "name workflows on the command line or in ghactions.toml; none found in {}",
                settings.workflows_dir().display()
            )),
        );
    }
}

fn record_failure(
    reporter: &DefaultErrorReporter,
    output: &mut JsonOutput<'_>,
    json: bool,
    name: &str,
    err: &AppError,
) {
    tracing::error!(workflow = %name, category = %err.category, "{}", err.message);
    if json {
        output.failures.push(JsonFailure {
            name: name.to_string(),
            error: err.to_string(),
        });
    } else {
        reporter.report_error(err);
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_json::to_string_pretty(value).context("failed to serialize output")?;
    println!("{}", text);
    Ok(())
}

fn exit_code(has_errors: bool) -> ExitCode {
    if has_errors {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Stems of `*.yml` files in `dir`, sorted. A missing directory has none.
pub fn discover_local_workflows(dir: &Path) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some("yml") {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
            names.push(stem.to_string());
        }
    }
    names.sort();
    Ok(names)
}
