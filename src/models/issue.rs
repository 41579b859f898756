use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The subset of `GET /repos/{owner}/{repo}` used to confirm the repository exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryResponse {
    pub full_name: String,
    pub html_url: String,
    #[serde(default)]
    pub open_issues_count: u32,
}

/// An issue as returned by `GET /repos/{owner}/{repo}/issues`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueResponse {
    pub number: u64,
    pub title: String,
    pub body: Option<String>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
}

/// A comment as returned by `GET /repos/{owner}/{repo}/issues/{number}/comments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentResponse {
    pub body: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResponse {
    pub resources: RateLimitResources,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitResources {
    pub core: RateLimitCore,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitCore {
    pub limit: u32,
    pub remaining: u32,
    /// Unix timestamp in seconds.
    pub reset: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub body: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    pub number: u64,
    pub title: String,
    pub description: String,
    pub url: String,
    pub comments: Vec<Comment>,
}

impl Issue {
    pub fn from_response(issue: IssueResponse, comments: Vec<CommentResponse>) -> Self {
        Self {
            number: issue.number,
            title: issue.title,
            description: issue.body.unwrap_or_default(),
            url: issue.html_url,
            comments: comments.into_iter().map(Comment::from).collect(),
        }
    }
}

impl From<CommentResponse> for Comment {
    fn from(comment: CommentResponse) -> Self {
        Self {
            body: comment.body.unwrap_or_default(),
            created_at: comment.created_at,
        }
    }
}
