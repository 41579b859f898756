use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::github::DEFAULT_API_URL;
use crate::models::RepoId;
use crate::report::{OutputFormat, DEFAULT_OUTPUT};

pub const MAX_PER_PAGE: u32 = 100;

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub api_url: String,
    pub repository: RepoId,
    pub output_path: PathBuf,
    pub format: OutputFormat,
    pub per_page: u32,
    pub show_progress: bool,
}

impl Config {
    /// Builds the run configuration from CLI values, falling back to
    /// `GITHUB_TOKEN` and `GITHUB_API_URL` from the environment.
    pub fn resolve(github_repo: Option<&str>, api_key: Option<&str>) -> Result<Self> {
        Self::resolve_with(github_repo, api_key, |key| env::var(key).ok())
    }

    pub fn resolve_with(
        github_repo: Option<&str>,
        api_key: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let repository: RepoId = github_repo
            .ok_or_else(|| {
                Error::Config(
                    "Missing GitHub repo argument. It should be in the format user/repo".to_string(),
                )
            })?
            .parse()?;

        let github_token = api_key
            .map(str::to_string)
            .or_else(|| env("GITHUB_TOKEN"))
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::Config("Missing GitHub API key argument".to_string()))?;

        let api_url = env("GITHUB_API_URL")
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            github_token,
            api_url,
            repository,
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            format: OutputFormat::Html,
            per_page: MAX_PER_PAGE,
            show_progress: true,
        })
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        self.output_path = path.into();
        self.format = format;
        self
    }

    pub fn with_per_page(mut self, per_page: u32) -> Result<Self> {
        if per_page == 0 || per_page > MAX_PER_PAGE {
            return Err(Error::Config(format!(
                "per-page must be between 1 and {}, got {}",
                MAX_PER_PAGE, per_page
            )));
        }
        self.per_page = per_page;
        Ok(self)
    }
}

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub per_page: u32,
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            per_page: MAX_PER_PAGE,
            show_progress: false,
        }
    }
}

impl From<&Config> for PipelineConfig {
    fn from(config: &Config) -> Self {
        Self {
            per_page: config.per_page,
            show_progress: config.show_progress,
        }
    }
}
