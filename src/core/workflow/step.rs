use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

/// Placeholder shown for steps that carry neither a name nor an id.
pub const UNNAMED_STEP: &str = "unnamed";

/// A single job step.
///
/// The step keeps every key it was parsed with, in document order; the typed accessors read
/// and write into that map so unknown keys survive a merge untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Step {
    data: Mapping,
}

impl Step {
    pub fn new(data: Mapping) -> Self {
        Self { data }
    }

    pub fn data(&self) -> &Mapping {
        &self.data
    }

    pub fn into_data(self) -> Mapping {
        self.data
    }

    /// Step id used for identity matching; empty ids are treated as absent.
    pub fn id(&self) -> Option<&str> {
        self.str_field("id").filter(|id| !id.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.str_field("name").filter(|name| !name.is_empty())
    }

    /// Name used in reports: the step name, then its id, then a placeholder.
    pub fn display_name(&self) -> &str {
        self.name().or_else(|| self.id()).unwrap_or(UNNAMED_STEP)
    }

    pub fn run(&self) -> Option<&str> {
        self.str_field("run")
    }

    pub fn set_run(&mut self, run: Option<String>) {
        self.set_field("run", run.map(Value::String));
    }

    pub fn with(&self) -> Option<&Mapping> {
        self.data.get("with").and_then(Value::as_mapping)
    }

    /// Replace the `with` block; an empty block is removed entirely.
    pub fn set_with(&mut self, with: Option<Mapping>) {
        let with = with.filter(|with| !with.is_empty());
        self.set_field("with", with.map(Value::Mapping));
    }

    /// Inline script of `actions/github-script` style steps.
    pub fn script(&self) -> Option<&str> {
        self.with()
            .and_then(|with| with.get("script"))
            .and_then(Value::as_str)
    }

    pub fn set_script(&mut self, script: String) {
        let mut with = self.with().cloned().unwrap_or_default();
        with.insert(Value::from("script"), Value::String(script));
        self.set_with(Some(with));
    }

    pub fn env(&self) -> Option<&Mapping> {
        self.data.get("env").and_then(Value::as_mapping)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// True when both steps carry the same non-empty id.
    pub fn has_same_id(&self, other: &Step) -> bool {
        match (self.id(), other.id()) {
            (Some(left), Some(right)) => left == right,
            _ => false,
        }
    }

    /// Position of the step with the same id in `steps`.
    pub fn find_index(&self, steps: &[Step]) -> Option<usize> {
        steps.iter().position(|step| self.has_same_id(step))
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }

    fn set_field(&mut self, key: &str, value: Option<Value>) {
        match value {
            Some(value) => {
                self.data.insert(Value::from(key), value);
            }
            None => {
                self.data.shift_remove(key);
            }
        }
    }
}

impl From<Mapping> for Step {
    fn from(data: Mapping) -> Self {
        Step::new(data)
    }
}
