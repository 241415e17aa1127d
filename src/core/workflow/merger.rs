use crate::core::workflow::document::Workflow;
use crate::core::workflow::job::Job;
use crate::core::workflow::marker::{is_managed, make_managed};
use crate::core::workflow::pairing::{pair_jobs, JobPair};
use crate::core::workflow::step::Step;
use serde::Serialize;
use std::collections::HashSet;

/// What the step merge did with one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StepAction {
    /// Matched and identical on both sides.
    Same,
    /// Matched, but the local copy is not managed and stays as it is.
    Keep,
    /// Matched and managed locally; the update replaces it.
    Update,
    /// Only in the update.
    Add,
    /// Managed local step the update no longer has; dropped.
    Delete,
    /// Unmanaged local step the update does not have; kept in place.
    Local,
}

/// A step together with the decision taken for it.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    pub step: Step,
    pub action: StepAction,
}

impl StepOutcome {
    fn new(step: Step, action: StepAction) -> Self {
        Self { step, action }
    }

    /// Whether the step ends up in the merged list.
    pub fn is_kept(&self) -> bool {
        self.action != StepAction::Delete
    }
}

/// Combines a local workflow with its upstream template.
///
/// Document and job scalars (comment block, name, triggers, runner, env, strategy, condition)
/// only follow the update when `force` is set. Steps follow their ownership marker.
#[derive(Debug, Clone, Copy, Default)]
pub struct Merger {
    force: bool,
}

impl Merger {
    pub fn new(force: bool) -> Self {
        Self { force }
    }

    pub fn force(&self) -> bool {
        self.force
    }

    /// Merge `update` into a copy of `current`. Neither input is modified.
    pub fn merge(&self, current: &Workflow, update: &Workflow) -> Workflow {
        let mut result = current.clone();
        self.merge_workflow(&mut result, update);

        for pair in pair_jobs(current, update) {
            match pair {
                JobPair::Matched {
                    name,
                    current: current_job,
                    update: update_job,
                } => {
                    let mut job = current_job.clone();
                    self.merge_job(&mut job, &update_job);
                    let current_steps = current_job.steps();
                    let merged = Self::merge_steps(&current_steps, &managed_steps(&update_job));
                    if merged != current_steps {
                        job.set_steps(merged);
                    }
                    result.set_job(&name, job);
                }
                JobPair::Added { name, update } => {
                    let mut job = update.clone();
                    job.set_steps(managed_steps(&update));
                    tracing::debug!(workflow = %current.name(), job = %name, "adding job from template");
                    result.set_job(&name, job);
                }
                JobPair::Deleted { name, .. } => {
                    if self.force {
                        tracing::debug!(workflow = %current.name(), job = %name, "removing job missing from template");
                        result.remove_job(&name);
                    }
                }
            }
        }
        result
    }

    /// Copy document-level fields when forced.
    pub fn merge_workflow(&self, current: &mut Workflow, update: &Workflow) {
        if !self.force {
            return;
        }
        current.set_comment_lines(update.comment_lines().to_vec());
        current.set_name(update.name());
        current.set_triggers(update.triggers().cloned());
    }

    /// Copy job-level scalar fields when forced.
    pub fn merge_job(&self, current: &mut Job, update: &Job) {
        if !self.force {
            return;
        }
        current.set_env(update.env().cloned());
        current.set_runs_on(update.runs_on().cloned());
        current.set_runs_if(update.runs_if().cloned());
        current.set_strategy(update.strategy().cloned());
    }

    /// Reconcile the local step list with managed update steps.
    pub fn merge_steps(current: &[Step], update: &[Step]) -> Vec<Step> {
        Self::merge_step_outcomes(current, update)
            .into_iter()
            .filter(StepOutcome::is_kept)
            .map(|outcome| outcome.step)
            .collect()
    }

    /// Step merge with the decision taken for every step, dropped ones included.
    ///
    /// Update steps are walked from last to first. A match by id consumes the local step and
    /// every unconsumed local step after it: unmanaged ones stay as local extras, managed ones
    /// are dropped. The accumulated list is reversed at the end.
    pub fn merge_step_outcomes(current: &[Step], update: &[Step]) -> Vec<StepOutcome> {
        let mut remaining: Vec<Step> = current.to_vec();
        let mut kept_ids: HashSet<String> = HashSet::new();
        let mut result: Vec<StepOutcome> = Vec::new();

        for update_step in update.iter().rev() {
            let Some(index) = update_step.find_index(&remaining) else {
                // The local copy was already kept as an extra further down; do not duplicate it.
                if let Some(id) = update_step.id().filter(|id| kept_ids.contains(*id)) {
                    if let Some(outcome) = result
                        .iter_mut()
                        .find(|outcome| outcome.step.id() == Some(id))
                    {
                        outcome.action = StepAction::Keep;
                    }
                    continue;
                }
                result.push(StepOutcome::new(update_step.clone(), StepAction::Add));
                continue;
            };

            let mut consumed = remaining.split_off(index);
            let local_step = consumed.remove(0);
            for extra in consumed.into_iter().rev() {
                push_extra(&mut result, &mut kept_ids, extra);
            }

            let outcome = if local_step == *update_step {
                StepOutcome::new(local_step, StepAction::Same)
            } else if is_managed(&local_step) {
                StepOutcome::new(update_step.clone(), StepAction::Update)
            } else {
                StepOutcome::new(local_step, StepAction::Keep)
            };
            result.push(outcome);
        }

        for extra in remaining.into_iter().rev() {
            push_extra(&mut result, &mut kept_ids, extra);
        }
        result.reverse();
        result
    }
}

fn managed_steps(job: &Job) -> Vec<Step> {
    job.steps().iter().map(make_managed).collect()
}

fn push_extra(result: &mut Vec<StepOutcome>, kept_ids: &mut HashSet<String>, step: Step) {
    if is_managed(&step) {
        result.push(StepOutcome::new(step, StepAction::Delete));
        return;
    }
    if let Some(id) = step.id() {
        kept_ids.insert(id.to_string());
    }
    result.push(StepOutcome::new(step, StepAction::Local));
}
