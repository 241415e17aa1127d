//! Per-workflow report and batch driver.

#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::resource::ResourceProvider;
use crate::core::workflow::{
    codec, make_managed, Check, Checker, Merger, Workflow, DEFAULT_HEADER,
};
use futures::future::join_all;
use serde::Serialize;

/// Result of comparing one local workflow with its template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// No local copy yet; the template will be installed.
    Create,
    /// Nothing to apply.
    UpToDate,
    /// Changes apply with the current force setting.
    Update,
    /// Only force-gated changes are pending.
    ForceRequired,
    /// Template could not be fetched; local checks only.
    RemoteUnavailable,
    /// Validation errors block the merge.
    Invalid,
}

/// Outcome of reconciling one workflow.
#[derive(Debug, Clone, Serialize)]
pub struct SyncReport {
    pub name: String,
    pub status: SyncStatus,
    pub checks: Vec<Check>,
    /// Text to write when `status` is `Create` or `Update`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl SyncReport {
    fn new(name: &str, status: SyncStatus, checks: Vec<Check>, content: Option<String>) -> Self {
        Self {
            name: name.to_string(),
            status,
            checks,
            content,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.status == SyncStatus::Invalid || self.checks.iter().any(Check::is_error)
    }

    /// Whether there is something to write.
    pub fn is_writable(&self) -> bool {
        self.content.is_some()
    }

    /// Checks that writing with `force` changes.
    pub fn applied_checks(&self, force: bool) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(move |check| check.is_applied(force))
    }

    pub fn summary(&self) -> String {
        match self.status {
            SyncStatus::Create => "not present locally, will be created".to_string(),
            SyncStatus::UpToDate => "up to date".to_string(),
            SyncStatus::Update => match self.applied_checks(true).count() {
                0 => "has layout changes".to_string(),
                count => format!("has {} changes", count),
            },
            SyncStatus::ForceRequired => format!(
                "has {} changes that need --force",
                self.checks.iter().filter(|check| check.needs_force(false)).count()
            ),
            SyncStatus::RemoteUnavailable => {
                "template unavailable, only local checks were run".to_string()
            }
            SyncStatus::Invalid => "has errors".to_string(),
        }
    }
}

/// Reconcile one workflow from its local and template text.
///
/// Checks are computed against a forced merge so held-back changes are still reported; the
/// written content is the merge with the caller's `force` setting.
pub fn reconcile(
    name: &str,
    local: Option<&str>,
    remote: Option<&str>,
    force: bool,
) -> Result<SyncReport, AppError> {
    let local = local.map(|text| parse_named(name, text, "local")).transpose()?;
    let remote = remote
        .map(|text| parse_named(name, text, "template"))
        .transpose()?
        .map(with_default_header);

    let (local, remote) = match (local, remote) {
        (None, None) => {
            return Ok(SyncReport::new(
                name,
                SyncStatus::RemoteUnavailable,
                Vec::new(),
                None,
            ))
        }
        (Some(local), None) => {
            let errors = Checker::new(&local).get_errors();
            let status = if errors.is_empty() {
                SyncStatus::RemoteUnavailable
            } else {
                SyncStatus::Invalid
            };
            return Ok(SyncReport::new(name, status, errors, None));
        }
        (None, Some(remote)) => {
            let errors = template_errors(&remote);
            if !errors.is_empty() {
                return Ok(SyncReport::new(name, SyncStatus::Invalid, errors, None));
            }
            let content = codec::render(&install(&remote))?;
            tracing::info!(workflow = %name, "workflow will be created from template");
            return Ok(SyncReport::new(
                name,
                SyncStatus::Create,
                Vec::new(),
                Some(content),
            ));
        }
        (Some(local), Some(remote)) => (local, remote),
    };

    let mut errors = Checker::new(&local).get_errors();
    errors.extend(template_errors(&remote));
    if !errors.is_empty() {
        tracing::warn!(workflow = %name, errors = errors.len(), "workflow has validation errors");
        return Ok(SyncReport::new(name, SyncStatus::Invalid, errors, None));
    }

    let candidate = Merger::new(true).merge(&local, &remote);
    let checks = Checker::new(&local).get_checks(&candidate);

    // Some merges change the document without an applied check, e.g. a blank `env: {}`
    // removed by a forced merge.
    let merged = Merger::new(force).merge(&local, &remote);
    let changed = merged != local || checks.iter().any(|check| check.is_applied(force));
    let (status, content) = if changed {
        (SyncStatus::Update, Some(codec::render(&merged)?))
    } else if checks.iter().any(|check| check.needs_force(force)) {
        (SyncStatus::ForceRequired, None)
    } else {
        (SyncStatus::UpToDate, None)
    };
    tracing::debug!(workflow = %name, ?status, checks = checks.len(), "reconciled workflow");
    Ok(SyncReport::new(name, status, checks, content))
}

/// Template turned into a fresh local workflow: every step managed.
pub fn install(remote: &Workflow) -> Workflow {
    let mut installed = with_default_header(remote.clone());
    for (name, mut job) in remote.jobs() {
        let steps = job.steps().iter().map(make_managed).collect();
        job.set_steps(steps);
        installed.set_job(&name, job);
    }
    installed
}

/// Templates without a comment block provide [`DEFAULT_HEADER`].
pub fn with_default_header(mut workflow: Workflow) -> Workflow {
    if workflow.comment_lines().is_empty() {
        workflow.set_comment_lines(DEFAULT_HEADER.iter().map(|line| line.to_string()).collect());
    }
    workflow
}

/// Fetch and reconcile several workflows. Templates are downloaded concurrently and a
/// failure in one workflow is reported in its own slot.
pub async fn run_batch(
    provider: &dyn ResourceProvider,
    names: &[String],
    force: bool,
) -> Vec<(String, Result<SyncReport, AppError>)> {
    let fetches = names.iter().map(|name| async move {
        let local = provider.local(name).await;
        let remote = provider.remote(name).await;
        (name.clone(), local, remote)
    });

    join_all(fetches)
        .await
        .into_iter()
        .map(|(name, local, remote)| {
            let result = local.and_then(|local| {
                reconcile(&name, local.as_deref(), remote.as_deref(), force)
            });
            (name, result)
        })
        .collect()
}

/// Write the reconciled content, if any. Returns whether a file was written.
pub async fn apply(
    provider: &dyn ResourceProvider,
    report: &SyncReport,
) -> Result<bool, AppError> {
    match &report.content {
        Some(content) => {
            provider.store(&report.name, content).await?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Old and new value of a check as YAML lines prefixed with `-` and `+`.
pub fn diff_lines(check: &Check) -> Vec<String> {
    let mut lines = Vec::new();
    for (prefix, value) in [("-", &check.old_value), ("+", &check.new_value)] {
        let Some(value) = value else {
            continue;
        };
        let text = match value {
            serde_yaml::Value::String(text) => text.clone(),
            other => serde_yaml::to_string(other).unwrap_or_default(),
        };
        lines.extend(
            text.trim_end_matches('\n')
                .split('\n')
                .map(|line| format!("{} {}", prefix, line).trim_end().to_string()),
        );
    }
    lines
}

fn parse_named(name: &str, text: &str, side: &str) -> Result<Workflow, AppError> {
    codec::parse(text).map_err(|mut err| {
        err.add_context("workflow", name);
        err.add_context("source", side);
        err
    })
}

fn template_errors(remote: &Workflow) -> Vec<Check> {
    Checker::new(remote)
        .get_errors()
        .into_iter()
        .map(|check| Check::error(format!("template {}", check.title())))
        .collect()
}
