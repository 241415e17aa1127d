#![allow(clippy::result_large_err)]

use super::SyncConfig;
use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use regex::Regex;
use std::sync::OnceLock;
use url::Url;

fn workflow_name_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]*$").expect("valid regex"))
}

pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate configuration rules
    pub fn validate(config: &SyncConfig) -> Result<(), AppError> {
        if let Some(url) = config.templates.resolved_url() {
            Url::parse(&url).map_err(|e| {
                AppError::new(
                    ErrorCategory::ConfigError,
                    format!("templates.url '{}' is not a valid URL: {}", url, e),
                )
            })?;
        }

        if config.templates.git_ref.trim().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "templates.ref cannot be empty",
            ));
        }

        if config.workflows.dir.as_os_str().is_empty() {
            return Err(AppError::new(
                ErrorCategory::ConfigError,
                "workflows.dir cannot be empty",
            ));
        }

        for name in &config.workflows.names {
            Self::validate_workflow_name(name)?;
        }

        Ok(())
    }

    /// Workflow names become file stems, so they must not contain path separators.
    pub fn validate_workflow_name(name: &str) -> Result<(), AppError> {
        if workflow_name_pattern().is_match(name) && !name.ends_with(".yml") {
            return Ok(());
        }
        Err(AppError::new(
            ErrorCategory::ValidationError,
            format!("invalid workflow name '{}'", name),
        )
        .with_suggestion("use the file name without directory or .yml extension"))
    }
}
