use crate::core::workflow::document::Workflow;
use crate::core::workflow::job::Job;

/// How a job of the current document lines up with the update document.
#[derive(Debug, Clone, PartialEq)]
pub enum JobPair {
    /// Present on both sides. `name` is the current job name.
    Matched { name: String, current: Job, update: Job },
    /// Only the update has it.
    Added { name: String, update: Job },
    /// Only the current document has it.
    Deleted { name: String, current: Job },
}

/// Pair jobs of both documents.
///
/// Two single-job documents are paired regardless of the job names; otherwise jobs pair by
/// name. Order follows the update document, then current-only jobs in their own order.
pub fn pair_jobs(current: &Workflow, update: &Workflow) -> Vec<JobPair> {
    let current_jobs = current.jobs();
    let update_jobs = update.jobs();

    if let ([(name, current_job)], [(_, update_job)]) =
        (current_jobs.as_slice(), update_jobs.as_slice())
    {
        return vec![JobPair::Matched {
            name: name.clone(),
            current: current_job.clone(),
            update: update_job.clone(),
        }];
    }

    let mut pairs = Vec::new();
    for (name, update_job) in &update_jobs {
        match current_jobs.iter().find(|(current_name, _)| current_name == name) {
            Some((_, current_job)) => pairs.push(JobPair::Matched {
                name: name.clone(),
                current: current_job.clone(),
                update: update_job.clone(),
            }),
            None => pairs.push(JobPair::Added {
                name: name.clone(),
                update: update_job.clone(),
            }),
        }
    }
    for (name, current_job) in &current_jobs {
        if !update_jobs.iter().any(|(update_name, _)| update_name == name) {
            pairs.push(JobPair::Deleted {
                name: name.clone(),
                current: current_job.clone(),
            });
        }
    }
    pairs
}
