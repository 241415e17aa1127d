pub mod loader;
pub mod validation;

pub use loader::ConfigLoader;
pub use validation::ConfigValidator;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Config file looked up at the repository root.
pub const CONFIG_FILE_NAME: &str = "ghactions.toml";

/// Main configuration loaded from ghactions.toml
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SyncConfig {
    /// Where templates come from
    #[serde(default)]
    pub templates: TemplatesConfig,

    /// Which local workflows are synced
    #[serde(default)]
    pub workflows: WorkflowsConfig,

    /// Merge behaviour
    #[serde(default)]
    pub sync: SyncOptions,
}

/// Template source configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TemplatesConfig {
    /// Base URL of the template directory; `{ref}` is replaced with `git_ref`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Template revision
    #[serde(rename = "ref", default = "default_git_ref")]
    pub git_ref: String,
}

/// Local workflow configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WorkflowsConfig {
    /// Directory holding `<name>.yml` workflow files, relative to the repository root
    #[serde(default = "default_workflows_dir")]
    pub dir: PathBuf,

    /// Workflow names synced when none are given on the command line
    #[serde(default)]
    pub names: Vec<String>,
}

/// Merge options
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SyncOptions {
    /// Overwrite workflow and job level fields with the template values
    #[serde(default)]
    pub force: bool,

    /// Print old and new values of every change
    #[serde(default)]
    pub diff: bool,
}

fn default_git_ref() -> String {
    "main".to_string()
}

fn default_workflows_dir() -> PathBuf {
    PathBuf::from(".github/workflows")
}

impl Default for TemplatesConfig {
    fn default() -> Self {
        TemplatesConfig {
            url: None,
            git_ref: default_git_ref(),
        }
    }
}

impl Default for WorkflowsConfig {
    fn default() -> Self {
        WorkflowsConfig {
            dir: default_workflows_dir(),
            names: Vec::new(),
        }
    }
}

impl TemplatesConfig {
    /// Template URL with the `{ref}` placeholder resolved.
    pub fn resolved_url(&self) -> Option<String> {
        self.url
            .as_ref()
            .map(|url| url.replace("{ref}", &self.git_ref))
    }
}
