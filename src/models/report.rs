use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::issue::Issue;
use super::repo::RepoId;

/// Snapshot of everything gathered in one run, handed from fetch to render.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportData {
    pub repository: RepoId,
    pub generated_at: DateTime<Utc>,
    pub issues: Vec<Issue>,
}

impl ReportData {
    pub fn new(repository: RepoId) -> Self {
        Self {
            repository,
            generated_at: Utc::now(),
            issues: Vec::new(),
        }
    }

    pub fn comment_count(&self) -> usize {
        self.issues.iter().map(|i| i.comments.len()).sum()
    }
}

/// How the fetch loop finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStatus {
    Complete,
    /// Stopped early on Ctrl-C.
    Interrupted,
    /// Quota ran out mid-fetch; the run slept until reset and stopped.
    RateLimited,
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchStatus::Complete => write!(f, "complete"),
            FetchStatus::Interrupted => write!(f, "interrupted"),
            FetchStatus::RateLimited => write!(f, "rate limited"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FetchOutcome {
    pub data: ReportData,
    pub status: FetchStatus,
}

impl FetchOutcome {
    pub fn is_partial(&self) -> bool {
        self.status != FetchStatus::Complete
    }
}

/// One `<tr>` of the report table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    /// Hyperlinked title; `None` on comment continuation rows.
    pub title: Option<String>,
    pub description: String,
    pub comments: String,
}
