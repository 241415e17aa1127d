use crate::core::workflow::check::{Action, Check, JobField, Subject};
use crate::core::workflow::document::Workflow;
use crate::core::workflow::job::Job;
use crate::core::workflow::marker::is_managed;
use crate::core::workflow::pairing::{pair_jobs, JobPair};
use crate::core::workflow::step::Step;
use serde_yaml::Value;
use std::collections::HashMap;

/// Classifies the differences between the local workflow and a candidate merge.
pub struct Checker<'a> {
    current: &'a Workflow,
}

impl<'a> Checker<'a> {
    pub fn new(current: &'a Workflow) -> Self {
        Self { current }
    }

    /// All checks for `update`, or only the validation errors when there are any.
    pub fn get_checks(&self, update: &Workflow) -> Vec<Check> {
        let errors = self.get_errors();
        if !errors.is_empty() {
            return errors;
        }
        let mut checks = self.get_workflow_checks(update);
        checks.extend(self.get_jobs_checks(update));
        checks
    }

    /// Problems that make the current document unsafe to merge.
    pub fn get_errors(&self) -> Vec<Check> {
        let mut errors = Vec::new();
        for (job_name, job) in self.current.jobs() {
            errors.extend(step_errors(&job_name, &job.steps()).into_iter().map(Check::error));
        }
        errors
    }

    /// Classify a value pair: equal, added (old blank), deleted (new blank), else updated.
    pub fn get_action(old_value: Option<&Value>, new_value: Option<&Value>) -> Action {
        if old_value == new_value {
            return Action::Equal;
        }
        if is_blank(old_value) && is_blank(new_value) {
            return Action::Equal;
        }
        if is_blank(old_value) {
            return Action::Added;
        }
        if is_blank(new_value) {
            return Action::Deleted;
        }
        Action::Updated
    }

    fn get_workflow_checks(&self, update: &Workflow) -> Vec<Check> {
        let old_comment = comment_value(self.current.comment_lines());
        let new_comment = comment_value(update.comment_lines());
        let old_name = Value::from(self.current.name());
        let new_name = Value::from(update.name());
        vec![
            scalar_check(Subject::TopComment, Some(&old_comment), Some(&new_comment)),
            scalar_check(Subject::WorkflowName, Some(&old_name), Some(&new_name)),
            scalar_check(
                Subject::Triggers,
                self.current.triggers(),
                update.triggers(),
            ),
        ]
    }

    fn get_jobs_checks(&self, update: &Workflow) -> Vec<Check> {
        let mut checks = Vec::new();
        for pair in pair_jobs(self.current, update) {
            match pair {
                JobPair::Matched {
                    name,
                    current,
                    update,
                } => checks.extend(Self::get_job_checks(&name, &current, &update)),
                JobPair::Added { name, update } => checks.push(Check::new(
                    Subject::Job { job: name },
                    Action::Added,
                    false,
                    None,
                    Some(Value::Mapping(update.into_data())),
                )),
                JobPair::Deleted { name, current } => checks.push(Check::new(
                    Subject::Job { job: name },
                    Action::Deleted,
                    true,
                    Some(Value::Mapping(current.into_data())),
                    None,
                )),
            }
        }
        checks
    }

    fn get_job_checks(job_name: &str, current: &Job, update: &Job) -> Vec<Check> {
        let field = |field: JobField, old: Option<&Value>, new: Option<&Value>| {
            scalar_check(
                Subject::JobField {
                    job: job_name.to_string(),
                    field,
                },
                old,
                new,
            )
        };
        let mut checks = vec![
            field(JobField::Env, current.env(), update.env()),
            field(JobField::RunsOn, current.runs_on(), update.runs_on()),
            field(JobField::Strategy, current.strategy(), update.strategy()),
            field(JobField::RunsIf, current.runs_if(), update.runs_if()),
        ];
        checks.extend(Self::get_step_checks(
            job_name,
            &current.steps(),
            &update.steps(),
        ));
        checks
    }

    /// Step checks: local steps missing from the update first, then every update step, then
    /// the step order when paired steps moved.
    ///
    /// Pairing id-less steps by identical content only affects what is reported; the merge
    /// never pairs them.
    pub fn get_step_checks(job_name: &str, current: &[Step], update: &[Step]) -> Vec<Check> {
        let matches = match_steps(current, update);
        let mut matched_current = vec![false; current.len()];
        for index in matches.iter().flatten() {
            matched_current[*index] = true;
        }

        let step_check = |step: &Step, action: Action, old: Option<&Step>, new: Option<&Step>| {
            Check::new(
                Subject::Step {
                    job: job_name.to_string(),
                    step: step.display_name().to_string(),
                },
                action,
                false,
                old.map(step_value),
                new.map(step_value),
            )
        };

        let mut checks: Vec<Check> = current
            .iter()
            .zip(&matched_current)
            .filter(|(_, matched)| !**matched)
            .map(|(step, _)| step_check(step, Action::Deleted, Some(step), None))
            .collect();

        for (update_step, matched) in update.iter().zip(&matches) {
            let check = match matched {
                None => step_check(update_step, Action::Added, None, Some(update_step)),
                Some(index) => {
                    let local_step = &current[*index];
                    let action = if !is_managed(local_step) {
                        Action::Kept
                    } else if local_step == update_step {
                        Action::Equal
                    } else {
                        Action::Updated
                    };
                    step_check(update_step, action, Some(local_step), Some(update_step))
                }
            };
            checks.push(check);
        }
        checks.extend(order_check(job_name, current, &matches));
        checks
    }
}

/// Reported when paired steps appear in a different relative order in the update.
fn order_check(job_name: &str, current: &[Step], matches: &[Option<usize>]) -> Option<Check> {
    let new_order: Vec<usize> = matches.iter().flatten().copied().collect();
    if new_order.windows(2).all(|pair| pair[0] < pair[1]) {
        return None;
    }
    let mut old_order = new_order.clone();
    old_order.sort_unstable();
    let names = |order: &[usize]| {
        Value::Sequence(
            order
                .iter()
                .map(|index| Value::from(current[*index].display_name()))
                .collect(),
        )
    };
    Some(Check::new(
        Subject::StepOrder {
            job: job_name.to_string(),
        },
        Action::Updated,
        false,
        Some(names(&old_order)),
        Some(names(&new_order)),
    ))
}

/// For every update step, the index of its counterpart in `current`.
///
/// Steps with an id pair by id. Steps without one can only pair with an identical, still
/// unpaired step without id, so untouched local-only steps are not reported as changes.
pub fn match_steps(current: &[Step], update: &[Step]) -> Vec<Option<usize>> {
    let mut used = vec![false; current.len()];
    update
        .iter()
        .map(|update_step| {
            let found = match update_step.id() {
                Some(_) => update_step.find_index(current),
                None => current
                    .iter()
                    .enumerate()
                    .position(|(index, step)| {
                        !used[index] && step.id().is_none() && step == update_step
                    }),
            };
            if let Some(index) = found {
                used[index] = true;
            }
            found
        })
        .collect()
}

fn step_errors(job_name: &str, steps: &[Step]) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    let mut errors = Vec::new();
    for step in steps {
        let Some(id) = step.id() else { continue };
        let count = seen.entry(id).or_insert(0);
        *count += 1;
        if *count == 2 {
            errors.push(format!(
                "{} : {} step has duplicate id {}",
                job_name,
                step.display_name(),
                id
            ));
        }
    }
    errors
}

fn scalar_check(subject: Subject, old_value: Option<&Value>, new_value: Option<&Value>) -> Check {
    Check::new(
        subject,
        Checker::get_action(old_value, new_value),
        true,
        old_value.cloned(),
        new_value.cloned(),
    )
}

fn comment_value(lines: &[String]) -> Value {
    Value::from(lines.join("\n"))
}

fn step_value(step: &Step) -> Value {
    Value::Mapping(step.data().clone())
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.is_empty(),
        Some(Value::Sequence(items)) => items.is_empty(),
        Some(Value::Mapping(map)) => map.is_empty(),
        Some(_) => false,
    }
}
