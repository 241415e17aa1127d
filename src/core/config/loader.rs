#![allow(clippy::result_large_err)]

use super::{SyncConfig, CONFIG_FILE_NAME};
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use std::env;
use std::path::{Path, PathBuf};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config from the repository root (root/ghactions.toml)
    /// Environment variables override config file values
    /// A missing file yields defaults + env vars
    pub fn load_from_workspace(workspace_path: &Path) -> Result<SyncConfig, AppError> {
        let config_path = workspace_path.join(CONFIG_FILE_NAME);
        let mut config = Self::load_from_file(&config_path)?.unwrap_or_default();
        Self::apply_env_overrides(&mut config);
        tracing::debug!(path = %config_path.display(), "loaded sync configuration");
        Ok(config)
    }

    /// Load config from specific file path
    /// Returns Ok(None) if file doesn't exist
    pub fn load_from_file(path: &Path) -> Result<Option<SyncConfig>, AppError> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::new(
                ErrorCategory::IoError,
                format!("Failed to read config file {}: {}", path.display(), e),
            )
        })?;

        let config: SyncConfig = toml::from_str(&content).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("Failed to parse config file {}: {}", path.display(), e),
            )
        })?;

        Ok(Some(config))
    }

    /// Apply environment variable overrides to the configuration
    /// Environment variables take precedence over config file values
    fn apply_env_overrides(config: &mut SyncConfig) {
        if let Ok(url) = env::var("GHACTIONS_TEMPLATE_URL") {
            if !url.trim().is_empty() {
                config.templates.url = Some(url);
            }
        }

        if let Ok(git_ref) = env::var("GHACTIONS_REF") {
            if !git_ref.trim().is_empty() {
                config.templates.git_ref = git_ref;
            }
        }

        if let Ok(dir) = env::var("GHACTIONS_WORKFLOWS_DIR") {
            config.workflows.dir = PathBuf::from(dir);
        }

        if let Ok(force_str) = env::var("GHACTIONS_FORCE") {
            if let Ok(force) = force_str.parse::<bool>() {
                config.sync.force = force;
            }
        }
    }

    /// Get documentation for supported environment variables
    pub fn env_var_documentation() -> &'static [&'static str] {
        &[
            "GHACTIONS_TEMPLATE_URL - Override the template base URL ({ref} is substituted)",
            "GHACTIONS_REF - Override the template revision (default: main)",
            "GHACTIONS_WORKFLOWS_DIR - Override the local workflows directory (default: .github/workflows)",
            "GHACTIONS_FORCE - Force workflow and job level updates (true/false)",
        ]
    }
}
