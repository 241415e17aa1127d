pub mod config;
pub mod error;
pub mod resource;
pub mod sync;
pub mod types;
pub mod workflow;

pub use config::{ConfigLoader, ConfigValidator, SyncConfig};
pub use error::{AppError, DefaultErrorReporter, ErrorReporter};
pub use resource::{FetchError, ResourceProvider, TemplateSource, WorkflowResource};
pub use sync::{SyncReport, SyncStatus};
pub use types::*;
