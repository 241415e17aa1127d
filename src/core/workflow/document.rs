#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::core::workflow::job::Job;
use serde_yaml::{Mapping, Value};

/// A parsed workflow document: the YAML body plus its leading comment block.
#[derive(Debug, Clone, PartialEq)]
pub struct Workflow {
    data: Mapping,
    comment_lines: Vec<String>,
}

impl Workflow {
    /// Build a workflow from a top-level mapping, validating the parts the engine relies on.
    pub fn from_parts(data: Mapping, comment_lines: Vec<String>) -> Result<Self, AppError> {
        match data.get("name") {
            Some(Value::String(name)) if !name.trim().is_empty() => {}
            Some(Value::String(_)) | None => {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    "workflow has no name",
                )
                .with_suggestion("add a top-level `name:` to the workflow"))
            }
            Some(_) => {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    "workflow name must be a string",
                ))
            }
        }

        match data.get("jobs") {
            None | Some(Value::Null) => {}
            Some(Value::Mapping(jobs)) => {
                for (name, job) in jobs {
                    let name = job_name(name)?;
                    let Some(job) = job.as_mapping() else {
                        return Err(AppError::new(
                            ErrorCategory::ValidationError,
                            format!("job '{}' must be a mapping", name),
                        ));
                    };
                    Job::from_mapping(job.clone()).map_err(|mut err| {
                        err.add_context("job", &name);
                        err
                    })?;
                }
            }
            Some(_) => {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    "workflow jobs must be a mapping",
                ))
            }
        }

        Ok(Self {
            data,
            comment_lines,
        })
    }

    pub fn data(&self) -> &Mapping {
        &self.data
    }

    pub fn name(&self) -> &str {
        self.data
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
    }

    /// Rename the workflow; blank names are ignored so the document always keeps one.
    pub fn set_name(&mut self, name: &str) {
        if name.trim().is_empty() {
            return;
        }
        self.data.insert(Value::from("name"), Value::from(name));
    }

    /// The `on:` block, kept verbatim.
    pub fn triggers(&self) -> Option<&Value> {
        self.data.get("on")
    }

    pub fn set_triggers(&mut self, triggers: Option<Value>) {
        match triggers {
            Some(triggers) => {
                self.data.insert(Value::from("on"), triggers);
            }
            None => {
                self.data.shift_remove("on");
            }
        }
    }

    pub fn comment_lines(&self) -> &[String] {
        &self.comment_lines
    }

    pub fn set_comment_lines(&mut self, lines: Vec<String>) {
        self.comment_lines = lines;
    }

    pub fn job_names(&self) -> Vec<String> {
        self.jobs_mapping()
            .map(|jobs| jobs.keys().filter_map(Value::as_str).map(String::from).collect())
            .unwrap_or_default()
    }

    pub fn job(&self, name: &str) -> Option<Job> {
        self.jobs_mapping()
            .and_then(|jobs| jobs.get(name))
            .and_then(Value::as_mapping)
            .cloned()
            .and_then(|data| Job::from_mapping(data).ok())
    }

    /// Jobs in document order.
    pub fn jobs(&self) -> Vec<(String, Job)> {
        self.job_names()
            .into_iter()
            .filter_map(|name| self.job(&name).map(|job| (name, job)))
            .collect()
    }

    /// Insert or replace a job, keeping its position when it already exists.
    pub fn set_job(&mut self, name: &str, job: Job) {
        let jobs = self
            .data
            .entry(Value::from("jobs"))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if !jobs.is_mapping() {
            *jobs = Value::Mapping(Mapping::new());
        }
        if let Value::Mapping(jobs) = jobs {
            jobs.insert(Value::from(name), Value::Mapping(job.into_data()));
        }
    }

    pub fn remove_job(&mut self, name: &str) -> Option<Job> {
        let removed = match self.data.get_mut("jobs") {
            Some(Value::Mapping(jobs)) => jobs.shift_remove(name),
            _ => None,
        };
        removed
            .and_then(|value| value.as_mapping().cloned())
            .and_then(|data| Job::from_mapping(data).ok())
    }

    fn jobs_mapping(&self) -> Option<&Mapping> {
        self.data.get("jobs").and_then(Value::as_mapping)
    }
}

fn job_name(key: &Value) -> Result<String, AppError> {
    match key {
        Value::String(name) => Ok(name.clone()),
        other => Err(AppError::new(
            ErrorCategory::ValidationError,
            format!("job name {:?} is not a string", other),
        )),
    }
}
