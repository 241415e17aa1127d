//! Ownership marker of a step.
//!
//! A step is "managed" when the tool may overwrite it on the next sync. The flag has three
//! encodings: a `with` input, a shell comment line in `run`, or a JavaScript comment line in
//! `with.script`. Everything outside this module treats it as one boolean.

use crate::core::workflow::step::Step;
use serde_yaml::Value;

/// `with` input that marks a step as managed.
pub const MANAGED_FLAG: &str = "github-actions-managed";
/// Sentinel line recognised inside `run` scripts.
pub const RUN_SENTINEL: &str = "# github-actions-managed: true";
/// Sentinel line recognised inside `with.script` scripts.
pub const SCRIPT_SENTINEL: &str = "// github-actions-managed: true";

/// Where a step stores its ownership marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerEncoding {
    Flag,
    Run,
    Script,
}

/// Every encoding currently present on the step, flag first.
pub fn decode(step: &Step) -> Vec<MarkerEncoding> {
    let mut found = Vec::new();
    if has_flag(step) {
        found.push(MarkerEncoding::Flag);
    }
    if step.run().is_some_and(|run| has_sentinel(run, RUN_SENTINEL)) {
        found.push(MarkerEncoding::Run);
    }
    if step
        .script()
        .is_some_and(|script| has_sentinel(script, SCRIPT_SENTINEL))
    {
        found.push(MarkerEncoding::Script);
    }
    found
}

pub fn is_managed(step: &Step) -> bool {
    if has_flag(step) {
        return true;
    }
    if step.run().is_some_and(|run| has_sentinel(run, RUN_SENTINEL)) {
        return true;
    }
    step.script()
        .is_some_and(|script| has_sentinel(script, SCRIPT_SENTINEL))
}

/// Encoding `make_managed` picks for a step that is not managed yet.
pub fn natural_encoding(step: &Step) -> MarkerEncoding {
    if step.run().is_some_and(|run| !run.is_empty()) {
        MarkerEncoding::Run
    } else if step.script().is_some_and(|script| !script.is_empty()) {
        MarkerEncoding::Script
    } else {
        MarkerEncoding::Flag
    }
}

/// Return the managed version of `step`. Already managed steps come back unchanged.
pub fn make_managed(step: &Step) -> Step {
    if is_managed(step) {
        return step.clone();
    }
    let mut result = step.clone();
    match natural_encoding(step) {
        MarkerEncoding::Run => {
            let run = step.run().unwrap_or_default();
            result.set_run(Some(insert_sentinel(run, RUN_SENTINEL)));
        }
        MarkerEncoding::Script => {
            let script = step.script().unwrap_or_default();
            result.set_script(insert_sentinel(script, SCRIPT_SENTINEL));
        }
        MarkerEncoding::Flag => {
            let mut with = step.with().cloned().unwrap_or_default();
            with.insert(Value::from(MANAGED_FLAG), Value::Bool(true));
            result.set_with(Some(with));
        }
    }
    result
}

/// Return `step` with every marker encoding removed.
pub fn make_non_managed(step: &Step) -> Step {
    let mut result = step.clone();
    for encoding in decode(step) {
        match encoding {
            MarkerEncoding::Flag => {
                let mut with = result.with().cloned().unwrap_or_default();
                with.shift_remove(MANAGED_FLAG);
                result.set_with(Some(with));
            }
            MarkerEncoding::Run => {
                let run = result.run().unwrap_or_default();
                let stripped = remove_sentinel(run, RUN_SENTINEL);
                result.set_run(Some(stripped));
            }
            MarkerEncoding::Script => {
                let script = result.script().unwrap_or_default();
                let stripped = remove_sentinel(script, SCRIPT_SENTINEL);
                result.set_script(stripped);
            }
        }
    }
    result
}

fn has_flag(step: &Step) -> bool {
    step.with()
        .and_then(|with| with.get(MANAGED_FLAG))
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn has_sentinel(text: &str, sentinel: &str) -> bool {
    text.split('\n').any(|line| line.trim() == sentinel)
}

// Multi-line scripts get a blank separator line before the sentinel, single-line ones do not.
fn insert_sentinel(text: &str, sentinel: &str) -> String {
    if text.contains('\n') {
        format!("\n{}\n{}", sentinel, text)
    } else {
        format!("{}\n{}", sentinel, text)
    }
}

fn remove_sentinel(text: &str, sentinel: &str) -> String {
    let mut lines: Vec<&str> = text.split('\n').collect();
    let Some(index) = lines.iter().position(|line| line.trim() == sentinel) else {
        return text.to_string();
    };
    lines.remove(index);
    if index == 1 && lines.first().is_some_and(|line| line.is_empty()) {
        lines.remove(0);
    }
    lines.join("\n")
}
