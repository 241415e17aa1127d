use async_trait::async_trait;
use ghactions::core::error::AppError;
use ghactions::core::resource::ResourceProvider;
use ghactions::core::sync::{self, reconcile, SyncStatus};
use ghactions::core::types::ErrorCategory;
use ghactions::core::workflow::{codec, is_managed, Action, DEFAULT_HEADER};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

const TEMPLATE: &str = "\
name: Check
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - id: checkout
        uses: actions/checkout@v4
      - id: test
        run: npm test
";

/// In-memory provider standing in for the filesystem and the template server.
#[derive(Default)]
struct MemoryProvider {
    local: Mutex<HashMap<String, String>>,
    remote: HashMap<String, String>,
    broken: Vec<String>,
}

impl MemoryProvider {
    fn with_remote(mut self, name: &str, content: &str) -> Self {
        self.remote.insert(name.to_string(), content.to_string());
        self
    }

    fn with_local(self, name: &str, content: &str) -> Self {
        self.local
            .lock()
            .unwrap()
            .insert(name.to_string(), content.to_string());
        self
    }

    fn stored(&self, name: &str) -> Option<String> {
        self.local.lock().unwrap().get(name).cloned()
    }
}

#[async_trait]
impl ResourceProvider for MemoryProvider {
    async fn local(&self, name: &str) -> Result<Option<String>, AppError> {
        if self.broken.iter().any(|broken| broken == name) {
            return Err(AppError::new(ErrorCategory::IoError, "permission denied"));
        }
        Ok(self.local.lock().unwrap().get(name).cloned())
    }

    async fn remote(&self, name: &str) -> Option<String> {
        self.remote.get(name).cloned()
    }

    async fn store(&self, name: &str, content: &str) -> Result<(), AppError> {
        self.local
            .lock()
            .unwrap()
            .insert(name.to_string(), content.to_string());
        Ok(())
    }

    fn local_path(&self, name: &str) -> PathBuf {
        PathBuf::from(format!("{}.yml", name))
    }
}

fn installed_template() -> String {
    reconcile("ci", None, Some(TEMPLATE), false)
        .unwrap()
        .content
        .unwrap()
}

#[test]
fn test_missing_local_workflow_is_created() {
    let report = reconcile("ci", None, Some(TEMPLATE), false).unwrap();
    assert_eq!(report.status, SyncStatus::Create);

    let created = codec::parse(report.content.as_deref().unwrap()).unwrap();
    assert_eq!(created.comment_lines().len(), DEFAULT_HEADER.len());
    assert!(created.job("build").unwrap().steps().iter().all(is_managed));
}

#[test]
fn test_fresh_install_is_up_to_date() {
    let installed = installed_template();
    let report = reconcile("ci", Some(&installed), Some(TEMPLATE), false).unwrap();
    assert_eq!(report.status, SyncStatus::UpToDate);
    assert!(report.content.is_none());
    assert_eq!(report.summary(), "up to date");
}

#[test]
fn test_template_change_updates_managed_step() {
    let installed = installed_template();
    let newer = TEMPLATE.replace("npm test", "npm run test:ci");

    let report = reconcile("ci", Some(&installed), Some(&newer), false).unwrap();
    assert_eq!(report.status, SyncStatus::Update);
    let updated: Vec<_> = report
        .checks
        .iter()
        .filter(|check| check.action == Action::Updated)
        .map(|check| check.title())
        .collect();
    assert_eq!(updated, vec!["step test"]);
    assert_eq!(report.summary(), "has 1 changes");

    let merged = codec::parse(report.content.as_deref().unwrap()).unwrap();
    let steps = merged.job("build").unwrap().steps();
    assert_eq!(
        steps[1].run(),
        Some("# github-actions-managed: true\nnpm run test:ci")
    );

    let again = reconcile("ci", report.content.as_deref(), Some(&newer), false).unwrap();
    assert_eq!(again.status, SyncStatus::UpToDate);
}

#[test]
fn test_workflow_level_change_needs_force() {
    let installed = installed_template();
    let renamed = TEMPLATE.replace("name: Check", "name: Check and lint");

    let gentle = reconcile("ci", Some(&installed), Some(&renamed), false).unwrap();
    assert_eq!(gentle.status, SyncStatus::ForceRequired);
    assert!(gentle.content.is_none());
    assert_eq!(gentle.summary(), "has 1 changes that need --force");

    let forced = reconcile("ci", Some(&installed), Some(&renamed), true).unwrap();
    assert_eq!(forced.status, SyncStatus::Update);
    let merged = codec::parse(forced.content.as_deref().unwrap()).unwrap();
    assert_eq!(merged.name(), "Check and lint");
}

#[test]
fn test_reordered_template_moves_managed_steps() {
    let installed = installed_template();
    let reordered = "\
name: Check
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - id: test
        run: npm test
      - id: checkout
        uses: actions/checkout@v4
";

    let report = reconcile("ci", Some(&installed), Some(reordered), false).unwrap();
    assert_eq!(report.status, SyncStatus::Update);
    let moved: Vec<String> = report.applied_checks(false).map(|check| check.title()).collect();
    assert_eq!(moved, vec!["job build step order"]);

    let merged = codec::parse(report.content.as_deref().unwrap()).unwrap();
    let ids: Vec<String> = merged
        .job("build")
        .unwrap()
        .steps()
        .iter()
        .map(|step| step.id().unwrap_or_default().to_string())
        .collect();
    assert_eq!(ids, vec!["test", "checkout"]);

    let again = reconcile("ci", report.content.as_deref(), Some(reordered), false).unwrap();
    assert_eq!(again.status, SyncStatus::UpToDate);
}

#[test]
fn test_forced_merge_drops_blank_job_env() {
    let installed = installed_template();
    let with_env = installed.replace(
        "    runs-on: ubuntu-latest\n",
        "    runs-on: ubuntu-latest\n    env: {}\n",
    );
    assert_ne!(with_env, installed);

    let gentle = reconcile("ci", Some(&with_env), Some(TEMPLATE), false).unwrap();
    assert_eq!(gentle.status, SyncStatus::UpToDate);

    let forced = reconcile("ci", Some(&with_env), Some(TEMPLATE), true).unwrap();
    assert_eq!(forced.status, SyncStatus::Update);
    assert_eq!(forced.summary(), "has layout changes");
    let merged = codec::parse(forced.content.as_deref().unwrap()).unwrap();
    assert!(merged.job("build").unwrap().env().is_none());
}

#[test]
fn test_duplicate_ids_block_the_merge() {
    let local = TEMPLATE.replace("id: test", "id: checkout");
    let report = reconcile("ci", Some(&local), Some(TEMPLATE), true).unwrap();
    assert_eq!(report.status, SyncStatus::Invalid);
    assert!(report.has_errors());
    assert!(report.content.is_none());
    assert!(report.checks.iter().all(|check| check.is_error()));
}

#[test]
fn test_broken_template_is_reported() {
    let installed = installed_template();
    let broken = TEMPLATE.replace("id: test", "id: checkout");
    let report = reconcile("ci", Some(&installed), Some(&broken), false).unwrap();
    assert_eq!(report.status, SyncStatus::Invalid);
    assert!(report.checks[0].title().starts_with("template "));
}

#[test]
fn test_unreachable_template_runs_local_checks_only() {
    let installed = installed_template();
    let report = reconcile("ci", Some(&installed), None, false).unwrap();
    assert_eq!(report.status, SyncStatus::RemoteUnavailable);
    assert!(!report.has_errors());
}

#[tokio::test]
async fn test_run_batch_isolates_failures() {
    let provider = MemoryProvider {
        broken: vec!["locked".to_string()],
        ..MemoryProvider::default()
    }
    .with_remote("ci", TEMPLATE)
    .with_remote("locked", TEMPLATE)
    .with_remote("bad", "name: [oops")
    .with_local("bad", TEMPLATE);

    let names: Vec<String> = ["ci", "locked", "bad"].iter().map(|s| s.to_string()).collect();
    let results = sync::run_batch(&provider, &names, false).await;

    let order: Vec<&str> = results.iter().map(|(name, _)| name.as_str()).collect();
    assert_eq!(order, vec!["ci", "locked", "bad"]);
    assert_eq!(results[0].1.as_ref().unwrap().status, SyncStatus::Create);
    assert_eq!(
        results[1].1.as_ref().unwrap_err().category,
        ErrorCategory::IoError
    );
    assert_eq!(
        results[2].1.as_ref().unwrap_err().category,
        ErrorCategory::ParseError
    );
}

#[tokio::test]
async fn test_apply_writes_only_reports_with_content() {
    let provider = MemoryProvider::default().with_remote("ci", TEMPLATE);
    let names = vec!["ci".to_string()];

    let results = sync::run_batch(&provider, &names, false).await;
    let report = results[0].1.as_ref().unwrap();
    assert!(sync::apply(&provider, report).await.unwrap());
    let stored = provider.stored("ci").unwrap();

    let results = sync::run_batch(&provider, &names, false).await;
    let report = results[0].1.as_ref().unwrap();
    assert_eq!(report.status, SyncStatus::UpToDate);
    assert!(!sync::apply(&provider, report).await.unwrap());
    assert_eq!(provider.stored("ci").unwrap(), stored);
}
