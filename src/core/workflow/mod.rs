//! Workflow reconciliation engine: document model, ownership marker, checker and merger.

pub mod check;
pub mod checker;
pub mod codec;
pub mod document;
pub mod job;
pub mod marker;
pub mod merger;
pub mod pairing;
pub mod step;

pub use check::{Action, Check, JobField, Subject};
pub use checker::Checker;
pub use document::Workflow;
pub use job::Job;
pub use marker::{is_managed, make_managed, make_non_managed};
pub use merger::{Merger, StepAction, StepOutcome};
pub use step::Step;

/// Comment block placed on workflows created from templates that ship without one.
pub const DEFAULT_HEADER: &[&str] = &[
    "This workflow is managed by ghactions",
    "",
    "--- How to modify this workflow and still get updates ---",
    "- Set 'github-actions-managed' to false on manual edit to prevent step overwrite on update",
    "- User-added steps survive update as well",
    "- Steps removed from the template are removed locally unless they are unmanaged",
    "- Comments in yaml are removed on update, only this header is kept",
];
