use serde::Serialize;
use serde_yaml::Value;
use std::fmt;

/// What a detected difference will do to the local workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Equal,
    Added,
    Updated,
    Deleted,
    Kept,
    Error,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Equal => "equal",
            Action::Added => "added",
            Action::Updated => "updated",
            Action::Deleted => "deleted",
            Action::Kept => "kept",
            Action::Error => "error",
        };
        f.write_str(label)
    }
}

/// Job-level scalar fields compared by the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JobField {
    Env,
    RunsOn,
    Strategy,
    RunsIf,
}

impl JobField {
    pub fn label(&self) -> &'static str {
        match self {
            JobField::Env => "environment",
            JobField::RunsOn => "runner",
            JobField::Strategy => "strategy",
            JobField::RunsIf => "run condition",
        }
    }
}

/// The unit of the document a check talks about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Subject {
    TopComment,
    WorkflowName,
    Triggers,
    Job { job: String },
    JobField { job: String, field: JobField },
    Step { job: String, step: String },
    StepOrder { job: String },
    Error { message: String },
}

/// One classified difference between the local workflow and a candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Check {
    pub subject: Subject,
    pub action: Action,
    /// Applying this check needs the force flag.
    pub force: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,
}

impl Check {
    pub fn new(
        subject: Subject,
        action: Action,
        force: bool,
        old_value: Option<Value>,
        new_value: Option<Value>,
    ) -> Self {
        Self {
            subject,
            action,
            force,
            old_value,
            new_value,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(
            Subject::Error {
                message: message.into(),
            },
            Action::Error,
            false,
            None,
            None,
        )
    }

    pub fn is_error(&self) -> bool {
        self.action == Action::Error
    }

    pub fn title(&self) -> String {
        match &self.subject {
            Subject::TopComment => "top comment".to_string(),
            Subject::WorkflowName => "workflow name".to_string(),
            Subject::Triggers => "trigger".to_string(),
            Subject::Job { job } => format!("job {}", job),
            Subject::JobField { job, field } => format!("job {} {}", job, field.label()),
            Subject::Step { step, .. } => format!("step {}", step),
            Subject::StepOrder { job } => format!("job {} step order", job),
            Subject::Error { message } => message.clone(),
        }
    }

    pub fn icon(&self) -> &'static str {
        match self.action {
            Action::Equal | Action::Kept => "✓",
            Action::Updated => "↻",
            Action::Deleted => "✖",
            Action::Added => "✎",
            Action::Error => "✗",
        }
    }

    fn message_postfix(&self) -> &'static str {
        if self.action == Action::Kept {
            ", because it is not managed"
        } else {
            ""
        }
    }

    /// Dry-run wording: what will happen on update.
    pub fn check_message(&self) -> String {
        if self.is_error() {
            return format!("{}  {}", self.icon(), self.title());
        }
        format!(
            "{}  {} will be {}{}",
            self.icon(),
            self.title(),
            self.action,
            self.message_postfix()
        )
    }

    /// Wording for a change held back because `--force` was not given.
    pub fn no_force_message(&self) -> String {
        format!(
            "  {}  {} can be {}, use --force flag to apply",
            self.icon(),
            self.title(),
            self.action
        )
    }

    /// Past-tense wording printed after the update was written.
    pub fn update_message(&self) -> String {
        format!(
            "{}  {} {}{}",
            self.icon(),
            self.title(),
            self.action,
            self.message_postfix()
        )
    }

    /// Whether writing the merge with `force` actually changes this unit.
    pub fn is_applied(&self, force: bool) -> bool {
        if !force && self.force {
            return false;
        }
        !matches!(self.action, Action::Equal | Action::Kept | Action::Error)
    }

    /// Changes that only happen with `--force`.
    pub fn needs_force(&self, force: bool) -> bool {
        !force && self.force && !matches!(self.action, Action::Equal | Action::Kept | Action::Error)
    }
}
