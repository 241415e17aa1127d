use ghactions::core::workflow::{codec, is_managed, Merger, Step, StepAction, Workflow};
use serde_yaml::Value;

fn workflow(steps: &str) -> Workflow {
    let text = format!(
        "name: Check\non: push\njobs:\n  build:\n    runs-on: ubuntu-latest\n    steps: {}\n",
        steps
    );
    codec::parse(&text).unwrap()
}

fn build_steps(workflow: &Workflow) -> Vec<Step> {
    workflow.job("build").unwrap().steps()
}

fn ids(steps: &[Step]) -> Vec<&str> {
    steps.iter().map(Step::display_name).collect()
}

#[test]
fn test_added_remote_step_is_appended_managed() {
    let local = workflow("[{id: a}]");
    let remote = workflow("[{id: a}, {id: b}]");

    let merged = Merger::new(false).merge(&local, &remote);
    let steps = build_steps(&merged);
    assert_eq!(ids(&steps), vec!["a", "b"]);
    assert!(!is_managed(&steps[0]));
    assert!(is_managed(&steps[1]));
}

#[test]
fn test_local_step_without_id_is_preserved() {
    let local = workflow("[{name: custom, run: make}]");
    let remote = workflow("[{id: x, uses: actions/checkout@v4}]");

    let merged = Merger::new(false).merge(&local, &remote);
    let steps = build_steps(&merged);
    assert_eq!(ids(&steps), vec!["custom", "x"]);
    assert_eq!(steps[0].run(), Some("make"));
}

#[test]
fn test_stale_managed_step_is_removed() {
    let local = workflow("[{id: a, uses: old/action@v1, with: {github-actions-managed: true}}]");
    let remote = workflow("[]");

    let merged = Merger::new(false).merge(&local, &remote);
    assert!(build_steps(&merged).is_empty());
}

#[test]
fn test_unmanaged_local_copy_wins() {
    let local = workflow(
        "[{id: a, uses: some/action@v1, with: {github-actions-managed: false, key: local}}]",
    );
    let remote = workflow("[{id: a, uses: some/action@v2, with: {key: remote}}]");

    let merged = Merger::new(true).merge(&local, &remote);
    let steps = build_steps(&merged);
    assert_eq!(steps, build_steps(&local));
}

#[test]
fn test_managed_step_follows_template() {
    let local = workflow("[{id: test, run: \"# github-actions-managed: true\\nnpm test\"}]");
    let remote = workflow("[{id: test, run: \"npm run test:ci\"}]");

    let merged = Merger::new(false).merge(&local, &remote);
    let steps = build_steps(&merged);
    assert_eq!(
        steps[0].run(),
        Some("# github-actions-managed: true\nnpm run test:ci")
    );
}

#[test]
fn test_user_steps_between_template_steps_keep_position() {
    let local = workflow(
        "[{id: checkout, uses: actions/checkout@v4, with: {github-actions-managed: true}}, {id: mine, run: echo local}, {id: test, run: \"# github-actions-managed: true\\nmake test\"}]",
    );
    let remote = workflow("[{id: checkout, uses: actions/checkout@v4}, {id: test, run: make test}]");

    let merged = Merger::new(false).merge(&local, &remote);
    assert_eq!(merged, local);
}

#[test]
fn test_document_fields_change_only_with_force() {
    let local = codec::parse(
        "\
name: Check
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    env:
      CI: \"true\"
    strategy:
      matrix:
        node: [18]
    if: github.ref == 'refs/heads/main'
    steps: []
",
    )
    .unwrap();
    let remote = codec::parse(
        "\
# header
name: Check v2
on: [push, pull_request]
jobs:
  build:
    runs-on: macos-latest
    strategy:
      matrix:
        node: [20, 22]
    if: github.event_name == 'push'
    steps: []
",
    )
    .unwrap();
    let local_job = local.job("build").unwrap();
    let remote_job = remote.job("build").unwrap();

    let gentle = Merger::new(false).merge(&local, &remote);
    assert_eq!(gentle, local);

    let forced = Merger::new(true).merge(&local, &remote);
    assert_eq!(forced.name(), "Check v2");
    assert_eq!(forced.comment_lines().to_vec(), vec!["header".to_string()]);
    assert_eq!(forced.triggers(), remote.triggers());
    let job = forced.job("build").unwrap();
    assert_eq!(job.runs_on(), Some(&Value::from("macos-latest")));
    assert_eq!(job.strategy(), remote_job.strategy());
    assert_eq!(job.runs_if(), remote_job.runs_if());
    assert!(local_job.env().is_some());
    assert!(job.env().is_none());
    assert!(!job.data().contains_key("env"));
}

#[test]
fn test_merge_does_not_mutate_inputs() {
    let local = workflow("[{id: a, with: {github-actions-managed: true}}]");
    let remote = workflow("[{id: b}]");
    let local_before = local.clone();
    let remote_before = remote.clone();

    let _ = Merger::new(true).merge(&local, &remote);
    assert_eq!(local, local_before);
    assert_eq!(remote, remote_before);
}

#[test]
fn test_merge_is_idempotent() {
    let local = workflow(
        "[{name: custom, run: make}, {id: a, run: echo a}, {id: gone, with: {github-actions-managed: true}}]",
    );
    let remote = workflow("[{id: a, run: echo A}, {id: b, uses: actions/setup-node@v4}]");

    for force in [false, true] {
        let merger = Merger::new(force);
        let once = merger.merge(&local, &remote);
        let twice = merger.merge(&once, &remote);
        assert_eq!(twice, once, "force = {}", force);
    }
}

#[test]
fn test_jobs_added_and_removed() {
    let local = codec::parse(
        "name: Check\non: push\njobs:\n  build:\n    runs-on: ubuntu-latest\n  docs:\n    runs-on: ubuntu-latest\n",
    )
    .unwrap();
    let remote = codec::parse(
        "name: Check\non: push\njobs:\n  build:\n    runs-on: ubuntu-latest\n  lint:\n    runs-on: ubuntu-latest\n    steps:\n      - run: make lint\n",
    )
    .unwrap();

    let gentle = Merger::new(false).merge(&local, &remote);
    assert_eq!(gentle.job_names(), vec!["build", "docs", "lint"]);
    assert!(build_steps_of(&gentle, "lint").iter().all(is_managed));

    let forced = Merger::new(true).merge(&local, &remote);
    assert_eq!(forced.job_names(), vec!["build", "lint"]);
}

#[test]
fn test_step_outcomes_describe_every_decision() {
    let current: Vec<Step> = serde_yaml::from_str(
        "[{id: same, with: {github-actions-managed: true}}, {id: pinned, run: mine}, {id: stale, with: {github-actions-managed: true}}, {name: extra}]",
    )
    .unwrap();
    let update: Vec<Step> = serde_yaml::from_str(
        "[{id: same, with: {github-actions-managed: true}}, {id: pinned, run: theirs, with: {github-actions-managed: true}}, {id: new, with: {github-actions-managed: true}}]",
    )
    .unwrap();

    let outcomes = Merger::merge_step_outcomes(&current, &update);
    let actions: Vec<StepAction> = outcomes.iter().map(|outcome| outcome.action).collect();
    assert_eq!(
        actions,
        vec![
            StepAction::Same,
            StepAction::Keep,
            StepAction::Delete,
            StepAction::Local,
            StepAction::Add,
        ]
    );
}

fn build_steps_of(workflow: &Workflow, job: &str) -> Vec<Step> {
    workflow.job(job).unwrap().steps()
}
