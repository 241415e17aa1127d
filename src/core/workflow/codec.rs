//! Text boundary of the workflow model.
//!
//! The leading `#` comment block of a workflow file is data: it is split off into
//! [`Workflow::comment_lines`] on parse and written back in front of the YAML body on render.

#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use crate::core::workflow::document::Workflow;
use serde_yaml::Value;

/// Parse workflow text into the document model.
pub fn parse(content: &str) -> Result<Workflow, AppError> {
    let comment_lines = parse_comment_lines(content);
    let value: Value = serde_yaml::from_str(content)?;
    let Value::Mapping(data) = value else {
        return Err(AppError::new(
            ErrorCategory::ParseError,
            "workflow document must be a YAML mapping",
        ));
    };
    Workflow::from_parts(data, comment_lines)
}

/// Render the document back to text: comment block, blank line, YAML body.
pub fn render(workflow: &Workflow) -> Result<String, AppError> {
    let comment = render_comment_lines(workflow.comment_lines());
    let body = serde_yaml::to_string(workflow.data()).map_err(|err| {
        AppError::new(
            ErrorCategory::SerializationError,
            format!("failed to render workflow '{}': {}", workflow.name(), err),
        )
    })?;
    let parts: Vec<&str> = [comment.as_str(), body.as_str()]
        .into_iter()
        .filter(|part| !part.is_empty())
        .collect();
    Ok(parts.join("\n\n"))
}

/// Leading comment block: consecutive lines that are `#` or start with `# `.
/// Blank lines before the block are skipped; the block ends at the first other line.
pub fn parse_comment_lines(content: &str) -> Vec<String> {
    let mut lines = Vec::new();
    for line in content.lines() {
        if line == "#" {
            lines.push(String::new());
        } else if let Some(text) = line.strip_prefix("# ") {
            lines.push(text.to_string());
        } else if line.trim().is_empty() && lines.is_empty() {
            continue;
        } else {
            break;
        }
    }
    lines
}

pub fn render_comment_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| {
            if line.is_empty() {
                "#".to_string()
            } else {
                format!("# {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
