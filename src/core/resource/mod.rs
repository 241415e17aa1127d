//! Local and remote copies of a workflow.
//!
//! The reconciliation engine never touches the filesystem or the network; everything it
//! needs comes through [`ResourceProvider`].

#![allow(clippy::result_large_err)]

use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Error types for template downloads.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Server returned {status} for {url}")]
    Status { status: u16, url: String },
    #[error("Invalid template URL: {0}")]
    InvalidUrl(String),
    #[error("Read error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        FetchError::Network(err.to_string())
    }
}

/// Narrow interface between the sync layer and storage.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Local workflow text, `None` when the file does not exist.
    async fn local(&self, name: &str) -> Result<Option<String>, AppError>;

    /// Template text, `None` when it could not be fetched.
    async fn remote(&self, name: &str) -> Option<String>;

    /// Persist the workflow text locally.
    async fn store(&self, name: &str, content: &str) -> Result<(), AppError>;

    /// Where the local copy lives, for reporting.
    fn local_path(&self, name: &str) -> PathBuf;
}

/// One workflow: its local file and its template URL.
#[derive(Debug, Clone)]
pub struct WorkflowResource {
    name: String,
    path: PathBuf,
    url: Url,
}

impl WorkflowResource {
    pub fn new(name: &str, workflows_dir: &Path, template_base: &Url) -> Result<Self, FetchError> {
        let file_name = Self::file_name_for(name);
        let url = directory_url(template_base)
            .join(&file_name)
            .map_err(|e| FetchError::InvalidUrl(format!("{}: {}", template_base, e)))?;
        Ok(Self {
            name: name.to_string(),
            path: workflows_dir.join(file_name),
            url,
        })
    }

    pub fn file_name_for(name: &str) -> String {
        format!("{}.yml", name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub async fn get_local(&self) -> Result<Option<String>, AppError> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => {
                let mut error = AppError::from(e);
                error.add_context("path", &self.path.display().to_string());
                Err(error)
            }
        }
    }

    pub async fn set_local(&self, content: &str) -> Result<(), AppError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&self.path, content).await?;
        tracing::info!(workflow = %self.name, path = %self.path.display(), "wrote workflow");
        Ok(())
    }

    /// Download the template. `file://` URLs are read directly.
    pub async fn fetch_remote(&self, client: &reqwest::Client) -> Result<String, FetchError> {
        if self.url.scheme() == "file" {
            let path = self
                .url
                .to_file_path()
                .map_err(|_| FetchError::InvalidUrl(self.url.to_string()))?;
            return Ok(tokio::fs::read_to_string(path).await?);
        }

        let response = client.get(self.url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: self.url.to_string(),
            });
        }
        Ok(response.text().await?)
    }

    /// Template text, or `None` after logging why the download failed.
    pub async fn get_remote(&self, client: &reqwest::Client) -> Option<String> {
        match self.fetch_remote(client).await {
            Ok(content) => {
                tracing::debug!(workflow = %self.name, url = %self.url, "fetched template");
                Some(content)
            }
            Err(err) => {
                tracing::warn!(workflow = %self.name, url = %self.url, "template download failed: {}", err);
                None
            }
        }
    }
}

/// Templates under a base URL, local copies under a workflows directory.
#[derive(Debug)]
pub struct TemplateSource {
    client: reqwest::Client,
    base_url: Url,
    workflows_dir: PathBuf,
}

impl TemplateSource {
    pub fn new(base_url: &str, workflows_dir: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            AppError::new(
                ErrorCategory::ConfigError,
                format!("invalid template URL '{}': {}", base_url, e),
            )
        })?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::with_source(
                    ErrorCategory::ResourceError,
                    "failed to build HTTP client",
                    Box::new(e),
                )
            })?;
        Ok(Self {
            client,
            base_url,
            workflows_dir: workflows_dir.into(),
        })
    }

    pub fn resource(&self, name: &str) -> Result<WorkflowResource, AppError> {
        WorkflowResource::new(name, &self.workflows_dir, &self.base_url).map_err(|e| {
            AppError::new(ErrorCategory::ConfigError, e.to_string())
        })
    }
}

#[async_trait]
impl ResourceProvider for TemplateSource {
    async fn local(&self, name: &str) -> Result<Option<String>, AppError> {
        self.resource(name)?.get_local().await
    }

    async fn remote(&self, name: &str) -> Option<String> {
        match self.resource(name) {
            Ok(resource) => resource.get_remote(&self.client).await,
            Err(err) => {
                tracing::warn!(workflow = %name, "{}", err);
                None
            }
        }
    }

    async fn store(&self, name: &str, content: &str) -> Result<(), AppError> {
        self.resource(name)?.set_local(content).await
    }

    fn local_path(&self, name: &str) -> PathBuf {
        self.workflows_dir.join(WorkflowResource::file_name_for(name))
    }
}

// A base without a trailing slash would lose its last segment on join.
fn directory_url(base: &Url) -> Url {
    if base.path().ends_with('/') {
        return base.clone();
    }
    let mut url = base.clone();
    let path = format!("{}/", base.path());
    url.set_path(&path);
    url
}
