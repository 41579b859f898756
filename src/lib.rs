pub mod cancel;
pub mod config;
pub mod error;
pub mod github;
pub mod models;
pub mod pipeline;
pub mod report;

pub use cancel::{cancellation, CancelHandle, Cancellation};
pub use config::{Config, PipelineConfig};
pub use error::{Error, Result};
pub use github::GitHubClient;
pub use pipeline::ReportPipeline;
pub use report::OutputFormat;
