use ghactions::core::workflow::marker::{decode, MarkerEncoding, RUN_SENTINEL, SCRIPT_SENTINEL};
use ghactions::core::workflow::{is_managed, make_managed, make_non_managed, Step};

fn step(yaml: &str) -> Step {
    serde_yaml::from_str(yaml).unwrap()
}

#[test]
fn test_flag_marks_uses_step() {
    let plain = step("id: checkout\nuses: actions/checkout@v4\n");
    assert!(!is_managed(&plain));

    let managed = make_managed(&plain);
    assert!(is_managed(&managed));
    assert_eq!(decode(&managed), vec![MarkerEncoding::Flag]);
    assert_eq!(
        managed.with().unwrap().get("github-actions-managed"),
        Some(&serde_yaml::Value::Bool(true))
    );
}

#[test]
fn test_run_step_gets_sentinel_line() {
    let single = make_managed(&step("id: test\nrun: npm test\n"));
    assert_eq!(single.run(), Some(format!("{}\nnpm test", RUN_SENTINEL).as_str()));
    assert!(single.with().is_none());

    let multi = make_managed(&step("id: build\nrun: |\n  npm ci\n  npm run build\n"));
    assert_eq!(
        multi.run(),
        Some(format!("\n{}\nnpm ci\nnpm run build\n", RUN_SENTINEL).as_str())
    );
}

#[test]
fn test_script_step_gets_js_sentinel() {
    let plain = step(
        "id: label\nuses: actions/github-script@v7\nwith:\n  github-token: token\n  script: core.info('hi')\n",
    );
    let managed = make_managed(&plain);
    assert_eq!(decode(&managed), vec![MarkerEncoding::Script]);
    assert_eq!(
        managed.script(),
        Some(format!("{}\ncore.info('hi')", SCRIPT_SENTINEL).as_str())
    );
    assert_eq!(make_non_managed(&managed), plain);
}

#[test]
fn test_sentinel_with_surrounding_whitespace_is_recognised() {
    let indented = step(&format!("run: \"echo a\\n   {}  \\necho b\"\n", RUN_SENTINEL));
    assert!(is_managed(&indented));
}

#[test]
fn test_explicit_false_flag_is_not_managed() {
    let pinned = step("id: lint\nuses: some/action@v1\nwith:\n  github-actions-managed: false\n");
    assert!(!is_managed(&pinned));
    assert!(decode(&pinned).is_empty());
}

#[test]
fn test_make_managed_is_idempotent() {
    for yaml in [
        "id: a\nuses: actions/setup-node@v4\n",
        "id: b\nrun: make\n",
        "id: c\nrun: |\n  make\n  make test\n",
    ] {
        let once = make_managed(&step(yaml));
        assert_eq!(make_managed(&once), once);
    }
}

#[test]
fn test_make_non_managed_restores_original() {
    for yaml in [
        "id: a\nuses: actions/setup-node@v4\n",
        "id: b\nuses: actions/setup-node@v4\nwith:\n  node-version: 20\n",
        "id: c\nrun: make\n",
        "id: d\nrun: |\n  make\n  make test\n",
        "id: e\nrun: \"\\nleading\"\n",
    ] {
        let original = step(yaml);
        assert_eq!(make_non_managed(&make_managed(&original)), original, "{}", yaml);
    }
}

#[test]
fn test_unmarking_removes_every_encoding() {
    let doubly = step(&format!(
        "run: \"{}\\necho hi\"\nwith:\n  github-actions-managed: true\n",
        RUN_SENTINEL
    ));
    assert_eq!(decode(&doubly), vec![MarkerEncoding::Flag, MarkerEncoding::Run]);

    let cleared = make_non_managed(&doubly);
    assert!(!is_managed(&cleared));
    assert_eq!(cleared.run(), Some("echo hi"));
    assert!(cleared.with().is_none());
}

#[test]
fn test_step_identity() {
    let a = step("id: a\nname: First\n");
    let also_a = step("id: a\nrun: other\n");
    let unnamed = step("run: echo\n");
    let empty_id = step("id: ''\nrun: echo\n");

    assert!(a.has_same_id(&also_a));
    assert!(!unnamed.has_same_id(&empty_id));
    assert_eq!(a.display_name(), "First");
    assert_eq!(also_a.display_name(), "a");
    assert_eq!(unnamed.display_name(), "unnamed");
    assert_eq!(also_a.find_index(&[unnamed.clone(), a.clone()]), Some(1));
}
