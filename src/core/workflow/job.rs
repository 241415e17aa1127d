#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::core::workflow::step::Step;
use serde_yaml::{Mapping, Value};

/// A workflow job backed by its ordered key map.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    data: Mapping,
}

impl Job {
    /// Wrap a job mapping, rejecting step lists that are not sequences of mappings.
    pub fn from_mapping(data: Mapping) -> Result<Self, AppError> {
        match data.get("steps") {
            None | Some(Value::Null) => {}
            Some(Value::Sequence(steps)) => {
                if let Some(position) = steps.iter().position(|step| !step.is_mapping()) {
                    return Err(AppError::new(
                        ErrorCategory::ValidationError,
                        format!("step #{} is not a mapping", position + 1),
                    ));
                }
            }
            Some(_) => {
                return Err(AppError::new(
                    ErrorCategory::ValidationError,
                    "job steps must be a list",
                ))
            }
        }
        Ok(Self { data })
    }

    pub fn data(&self) -> &Mapping {
        &self.data
    }

    pub fn into_data(self) -> Mapping {
        self.data
    }

    pub fn runs_on(&self) -> Option<&Value> {
        self.data.get("runs-on")
    }

    pub fn set_runs_on(&mut self, runs_on: Option<Value>) {
        self.set_field("runs-on", runs_on);
    }

    pub fn env(&self) -> Option<&Value> {
        self.data.get("env")
    }

    pub fn set_env(&mut self, env: Option<Value>) {
        self.set_field("env", env);
    }

    pub fn strategy(&self) -> Option<&Value> {
        self.data.get("strategy")
    }

    pub fn set_strategy(&mut self, strategy: Option<Value>) {
        self.set_field("strategy", strategy);
    }

    /// The job `if:` condition.
    pub fn runs_if(&self) -> Option<&Value> {
        self.data.get("if")
    }

    pub fn set_runs_if(&mut self, condition: Option<Value>) {
        self.set_field("if", condition);
    }

    pub fn steps(&self) -> Vec<Step> {
        match self.data.get("steps") {
            Some(Value::Sequence(steps)) => steps
                .iter()
                .filter_map(Value::as_mapping)
                .cloned()
                .map(Step::new)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn set_steps(&mut self, steps: Vec<Step>) {
        let steps = steps
            .into_iter()
            .map(|step| Value::Mapping(step.into_data()))
            .collect();
        self.data.insert(Value::from("steps"), Value::Sequence(steps));
    }

    // Absent values (and null) remove the key so rendering does not emit `key: null`.
    fn set_field(&mut self, key: &str, value: Option<Value>) {
        match value {
            Some(value) if !value.is_null() => {
                self.data.insert(Value::from(key), value);
            }
            _ => {
                self.data.shift_remove(key);
            }
        }
    }
}
