use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use crate::cancel::Cancellation;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::github::GitHubClient;
use crate::models::{FetchOutcome, FetchStatus, Issue, IssueResponse, RepoId, ReportData};

/// Gathers the open issues of one repository, with their comments.
pub struct ReportPipeline {
    github: GitHubClient,
    config: PipelineConfig,
    cancel: Cancellation,
}

impl ReportPipeline {
    pub fn new(github: GitHubClient, config: PipelineConfig, cancel: Cancellation) -> Self {
        Self {
            github,
            config,
            cancel,
        }
    }

    /// Fetches issues oldest first until the listing ends, Ctrl-C is
    /// pressed, or the quota runs out.
    ///
    /// Interrupted and rate-limited runs still return what was gathered.
    /// Any other API failure discards the partial data.
    pub async fn fetch_report(&self, repo: &RepoId) -> Result<FetchOutcome> {
        let mut data = ReportData::new(repo.clone());

        let status = match self.gather(repo, &mut data).await {
            Ok(status) => status,
            Err(e) if e.is_rate_limited() => {
                tracing::error!("Rate limit exceeded after {} issues: {}", data.issues.len(), e);
                self.wait_for_reset().await;
                FetchStatus::RateLimited
            }
            Err(e) => {
                tracing::error!("Error fetching issues: {}", e);
                return Err(e);
            }
        };

        tracing::info!(
            "Fetched {} issues and {} comments ({})",
            data.issues.len(),
            data.comment_count(),
            status
        );

        Ok(FetchOutcome { data, status })
    }

    async fn gather(&self, repo: &RepoId, data: &mut ReportData) -> Result<FetchStatus> {
        // Step 1: Make sure there is quota to spend
        let remaining = self.github.preflight().await?;
        tracing::info!("Rate limit remaining: {}", remaining);

        // Step 2: Confirm the repository exists
        let repository = self.github.get_repo(repo).await?;
        tracing::info!(
            "Fetching {} open issues from {}",
            repository.open_issues_count,
            repository.full_name
        );

        // Step 3: Walk the issues
        self.collect_issues(repo, data).await
    }

    async fn collect_issues(&self, repo: &RepoId, data: &mut ReportData) -> Result<FetchStatus> {
        let pb = self.progress_bar();
        let mut pages = self.github.open_issues(repo, self.config.per_page);

        while let Some(page) = pages.next_page::<IssueResponse>().await? {
            for issue in page {
                if self.cancel.is_cancelled() {
                    pb.abandon_with_message("Interrupted");
                    return Ok(FetchStatus::Interrupted);
                }

                let comments = self
                    .github
                    .get_issue_comments(repo, issue.number, self.config.per_page)
                    .await?;
                let issue = Issue::from_response(issue, comments);

                tracing::debug!("Issue fetched: {}", issue.title);
                if let Some(remaining) = self.github.rate_limiter().remaining().await {
                    tracing::debug!("Rate limit remaining: {}", remaining);
                }

                pb.set_message(format!("#{} {}", issue.number, issue.title));
                pb.inc(1);
                data.issues.push(issue);
            }

            if self.cancel.is_cancelled() {
                pb.abandon_with_message("Interrupted");
                return Ok(FetchStatus::Interrupted);
            }
        }

        pb.finish_with_message("Fetched all issues");
        Ok(FetchStatus::Complete)
    }

    /// Single blocking pause until the quota window resets; Ctrl-C cuts it short.
    async fn wait_for_reset(&self) {
        let reset_in = self.github.rate_limiter().seconds_until_reset().await;
        if reset_in == 0 {
            return;
        }

        tracing::error!("Waiting {} seconds before trying again...", reset_in);
        tokio::select! {
            _ = tokio::time::sleep(Duration::from_secs(reset_in)) => {}
            _ = self.cancel.cancelled() => {
                tracing::warn!("Wait for rate limit reset interrupted");
            }
        }
    }

    fn progress_bar(&self) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} [{elapsed_precise}] {pos} issues {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    }
}
