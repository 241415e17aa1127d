use ghactions::core::types::ErrorCategory;
use ghactions::core::workflow::codec::{parse, parse_comment_lines, render};
use ghactions::core::workflow::{make_managed, Workflow};

const WORKFLOW: &str = "\
# Managed by ghactions
#
# Edit freely
name: Check
on:
  push:
    branches: [main]
jobs:
  build:
    runs-on: ubuntu-latest
    env:
      NODE_ENV: test
    steps:
      - id: checkout
        uses: actions/checkout@v4
      - id: test
        name: Run tests
        run: |
          npm ci
          npm test
";

#[test]
fn test_comment_block_becomes_comment_lines() {
    let workflow = parse(WORKFLOW).unwrap();
    assert_eq!(
        workflow.comment_lines().to_vec(),
        vec!["Managed by ghactions", "", "Edit freely"]
    );
    assert_eq!(workflow.name(), "Check");
    assert_eq!(workflow.job_names(), vec!["build"]);
}

#[test]
fn test_render_then_parse_preserves_document() {
    let workflow = parse(WORKFLOW).unwrap();
    let rendered = render(&workflow).unwrap();
    assert!(rendered.starts_with("# Managed by ghactions\n#\n# Edit freely\n\n"));

    let reparsed = parse(&rendered).unwrap();
    assert_eq!(reparsed, workflow);
}

#[test]
fn test_managed_multiline_run_survives_render() {
    let mut workflow = parse(WORKFLOW).unwrap();
    let mut job = workflow.job("build").unwrap();
    let steps = job.steps().iter().map(make_managed).collect();
    job.set_steps(steps);
    workflow.set_job("build", job);

    let reparsed = parse(&render(&workflow).unwrap()).unwrap();
    let run = reparsed.job("build").unwrap().steps()[1]
        .run()
        .map(str::to_string);
    assert_eq!(
        run.as_deref(),
        Some("\n# github-actions-managed: true\nnpm ci\nnpm test\n")
    );
}

#[test]
fn test_comments_after_body_are_not_header() {
    let lines = parse_comment_lines("\n\n# one\n# two\nname: x\n# trailing\n");
    assert_eq!(lines, vec!["one", "two"]);
    assert!(parse_comment_lines("name: x\n# not a header\n").is_empty());
    assert!(parse_comment_lines("#!shebang-like\nname: x\n").is_empty());
}

#[test]
fn test_document_without_comments_renders_body_only() {
    let workflow = parse("name: Check\non: push\njobs: {}\n").unwrap();
    let rendered = render(&workflow).unwrap();
    assert!(rendered.starts_with("name: Check\n"));
    let reparsed: Workflow = parse(&rendered).unwrap();
    assert_eq!(reparsed, workflow);
}

#[test]
fn test_invalid_documents_are_rejected() {
    let not_mapping = parse("- just\n- a list\n").unwrap_err();
    assert_eq!(not_mapping.category, ErrorCategory::ParseError);

    let broken = parse("name: [unterminated\n").unwrap_err();
    assert_eq!(broken.category, ErrorCategory::ParseError);

    let nameless = parse("on: push\njobs: {}\n").unwrap_err();
    assert!(nameless.message.contains("no name"));

    let bad_steps = parse("name: x\njobs:\n  build:\n    steps: nope\n").unwrap_err();
    assert!(bad_steps.context.values().any(|value| value == "build"));
}

#[test]
fn test_rerender_is_stable_for_awkward_scalars() {
    let workflow = parse(
        "\
name: Check
on: push
jobs:
  build:
    runs-on: ubuntu-latest
    steps:
      - id: tabs
        run: \"make\\tbuild\"
      - id: unicode
        name: \"Déploiement ✓\"
        run: echo 日本
      - id: trailing
        run: \"npm test\\n\\n\\n\"
      - id: indented
        run: \"  indented\\n    more\\n\"
",
    )
    .unwrap();

    let rendered = render(&workflow).unwrap();
    let reparsed = parse(&rendered).unwrap();
    assert_eq!(reparsed, workflow);
    assert_eq!(render(&reparsed).unwrap(), rendered);

    let steps = reparsed.job("build").unwrap().steps();
    assert_eq!(steps[0].run(), Some("make\tbuild"));
    assert_eq!(steps[2].run(), Some("npm test\n\n\n"));
    assert_eq!(steps[3].run(), Some("  indented\n    more\n"));
}
