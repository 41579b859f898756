use reqwest::{header, Client, Response};

use crate::error::{Error, Result};
use crate::github::paginator::Paginator;
use crate::github::rate_limiter::RateLimiter;
use crate::models::{CommentResponse, RateLimitCore, RateLimitResponse, RepoId, RepositoryResponse};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

pub struct GitHubClient {
    client: Client,
    rate_limiter: RateLimiter,
    base_url: String,
}

impl GitHubClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_API_URL)
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            header::HeaderValue::from_static("2022-11-28"),
        );
        headers.insert(
            header::USER_AGENT,
            header::HeaderValue::from_static(concat!("gh-issues-report/", env!("CARGO_PKG_VERSION"))),
        );

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn get_rate_limit(&self) -> Result<RateLimitCore> {
        let url = format!("{}/rate_limit", self.base_url);

        let response = self.client.get(&url).send().await?;
        let response = ensure_success(response, &self.rate_limiter, "rate limit").await?;
        let body: RateLimitResponse = response.json().await?;

        self.rate_limiter.record(&body.resources.core).await;
        Ok(body.resources.core)
    }

    /// Refuses to start a run when the quota is already spent.
    pub async fn preflight(&self) -> Result<u32> {
        let core = self.get_rate_limit().await?;
        tracing::debug!("Rate limit remaining: {}", core.remaining);

        if core.remaining == 0 {
            let reset_in = self.rate_limiter.seconds_until_reset().await;
            return Err(Error::RateLimitExhausted(reset_in));
        }
        Ok(core.remaining)
    }

    pub async fn get_repo(&self, repo: &RepoId) -> Result<RepositoryResponse> {
        let url = format!("{}/repos/{}/{}", self.base_url, repo.owner, repo.name);
        tracing::debug!("Fetching repository: {}", repo);

        let response = self.client.get(&url).send().await?;
        self.rate_limiter.update_from_response(&response).await;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::RepoNotFound(repo.full_name()));
        }

        let response = ensure_success(response, &self.rate_limiter, &repo.full_name()).await?;
        Ok(response.json().await?)
    }

    /// Open issues, oldest first, fetched lazily page by page.
    pub fn open_issues(&self, repo: &RepoId, per_page: u32) -> Paginator<'_> {
        let url = format!(
            "{}/repos/{}/{}/issues?state=open&sort=created&direction=asc",
            self.base_url, repo.owner, repo.name
        );
        Paginator::new(&self.client, &self.rate_limiter, url, per_page)
    }

    pub async fn get_issue_comments(
        &self,
        repo: &RepoId,
        number: u64,
        per_page: u32,
    ) -> Result<Vec<CommentResponse>> {
        let url = format!(
            "{}/repos/{}/{}/issues/{}/comments",
            self.base_url, repo.owner, repo.name, number
        );
        tracing::debug!("Fetching comments for issue #{}", number);
        Paginator::new(&self.client, &self.rate_limiter, url, per_page)
            .fetch_all()
            .await
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.rate_limiter
    }
}

/// Maps a non-success response onto the crate error.
///
/// Quota exhaustion becomes the recoverable `Error::RateLimited`; anything
/// else is a fatal `Error::GitHubApi` carrying the status and body.
pub(crate) async fn ensure_success(
    response: Response,
    rate_limiter: &RateLimiter,
    context: &str,
) -> Result<Response> {
    if response.status().is_success() {
        return Ok(response);
    }

    if RateLimiter::is_quota_exceeded(&response) {
        rate_limiter.update_from_response(&response).await;
        let reset_in = rate_limiter.seconds_until_reset().await;
        return Err(Error::RateLimited { reset_in });
    }

    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    Err(Error::GitHubApi(format!(
        "Failed to fetch {}: {} - {}",
        context, status, body
    )))
}
