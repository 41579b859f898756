use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    #[error("Rate limit exceeded, resets in {reset_in} seconds")]
    RateLimited { reset_in: u64 },

    #[error("GitHub API rate limit has been reached, resets in {0} seconds")]
    RateLimitExhausted(u64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid repository '{0}': expected owner/name or a GitHub URL")]
    InvalidRepo(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Repository not found: {0}")]
    RepoNotFound(String),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] reqwest::header::InvalidHeaderValue),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Errors the fetch loop recovers from by sleeping until the quota resets.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited { .. })
    }

    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::InvalidRepo(_))
    }
}
