use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use gh_issues_report::models::{FetchStatus, RepoId};
use gh_issues_report::report::{build_rows, write_report, OutputFormat};
use gh_issues_report::{cancellation, Error, GitHubClient, PipelineConfig, ReportPipeline};

const REPO_PATH: &str = "/repos/octocat/Hello-World";

fn now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

fn repo() -> RepoId {
    RepoId::new("octocat", "Hello-World")
}

fn issue_json(number: u64, title: &str, body: Option<&str>) -> Value {
    json!({
        "number": number,
        "title": title,
        "body": body,
        "html_url": format!("https://github.com/octocat/Hello-World/issues/{}", number),
        "created_at": format!("2024-01-0{}T10:00:00Z", number),
    })
}

fn comment_json(body: &str) -> Value {
    json!({ "body": body, "created_at": "2024-02-01T10:00:00Z" })
}

async fn mock_rate_limit(server: &MockServer, remaining: u32) {
    Mock::given(method("GET"))
        .and(path("/rate_limit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resources": {
                "core": { "limit": 5000, "remaining": remaining, "reset": now() + 3600 }
            }
        })))
        .mount(server)
        .await;
}

async fn mock_repo(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path(REPO_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "full_name": "octocat/Hello-World",
            "html_url": "https://github.com/octocat/Hello-World",
            "open_issues_count": 2
        })))
        .mount(server)
        .await;
}

async fn mock_comments(server: &MockServer, number: u64, comments: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("{}/issues/{}/comments", REPO_PATH, number)))
        .respond_with(ResponseTemplate::new(200).set_body_json(Value::Array(comments)))
        .mount(server)
        .await;
}

fn pipeline(server: &MockServer, per_page: u32) -> (gh_issues_report::CancelHandle, ReportPipeline) {
    let github = GitHubClient::with_base_url("test-token", &server.uri()).unwrap();
    let (handle, cancel) = cancellation();
    let config = PipelineConfig {
        per_page,
        show_progress: false,
    };
    (handle, ReportPipeline::new(github, config, cancel))
}

#[tokio::test]
async fn test_zero_quota_fails_before_listing_issues() {
    let server = MockServer::start().await;
    mock_rate_limit(&server, 0).await;

    Mock::given(method("GET"))
        .and(path(format!("{}/issues", REPO_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (_handle, pipeline) = pipeline(&server, 100);
    let err = pipeline.fetch_report(&repo()).await.unwrap_err();

    assert!(matches!(err, Error::RateLimitExhausted(_)), "got {err:?}");
}

#[tokio::test]
async fn test_hello_world_report() {
    let server = MockServer::start().await;
    mock_rate_limit(&server, 4999).await;
    mock_repo(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{}/issues", REPO_PATH)))
        .and(query_param("state", "open"))
        .and(query_param("sort", "created"))
        .and(query_param("direction", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            issue_json(1, "First", Some("first body")),
            issue_json(2, "Second", None),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    mock_comments(&server, 1, vec![comment_json("**Metadata Update from X**")]).await;
    mock_comments(&server, 2, vec![]).await;

    let (_handle, pipeline) = pipeline(&server, 100);
    let outcome = pipeline.fetch_report(&repo()).await.unwrap();

    assert_eq!(outcome.status, FetchStatus::Complete);
    assert_eq!(outcome.data.issues.len(), 2);
    assert_eq!(outcome.data.issues[1].description, "");
    assert_eq!(outcome.data.issues[0].comments.len(), 1);

    let rows = build_rows(&outcome.data);
    assert_eq!(rows.len(), 2);
}

#[tokio::test]
async fn test_follows_link_header_pages() {
    let server = MockServer::start().await;
    mock_rate_limit(&server, 4999).await;
    mock_repo(&server).await;

    let next = format!(
        "<{}{}/issues?page=2>; rel=\"next\"",
        server.uri(),
        REPO_PATH
    );
    Mock::given(method("GET"))
        .and(path(format!("{}/issues", REPO_PATH)))
        .and(query_param("page", "1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([issue_json(1, "First", Some("a"))]))
                .insert_header("link", next.as_str()),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/issues", REPO_PATH)))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([issue_json(2, "Second", Some("b"))])))
        .mount(&server)
        .await;

    mock_comments(&server, 1, vec![comment_json("reply one"), comment_json("reply two")]).await;
    mock_comments(&server, 2, vec![]).await;

    let (_handle, pipeline) = pipeline(&server, 1);
    let outcome = pipeline.fetch_report(&repo()).await.unwrap();

    let titles: Vec<_> = outcome.data.issues.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, ["First", "Second"]);
    assert_eq!(outcome.data.comment_count(), 2);
    assert_eq!(build_rows(&outcome.data).len(), 4);
}

#[tokio::test]
async fn test_quota_exhausted_mid_fetch_keeps_gathered_issues() {
    let server = MockServer::start().await;
    mock_rate_limit(&server, 2).await;
    mock_repo(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{}/issues", REPO_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            issue_json(1, "First", Some("a")),
            issue_json(2, "Second", Some("b")),
        ])))
        .mount(&server)
        .await;
    mock_comments(&server, 1, vec![]).await;

    // Reset already in the past so the pipeline does not sleep.
    Mock::given(method("GET"))
        .and(path(format!("{}/issues/2/comments", REPO_PATH)))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "1")
                .set_body_json(json!({ "message": "API rate limit exceeded" })),
        )
        .mount(&server)
        .await;

    let (_handle, pipeline) = pipeline(&server, 100);
    let outcome = pipeline.fetch_report(&repo()).await.unwrap();

    assert_eq!(outcome.status, FetchStatus::RateLimited);
    assert!(outcome.is_partial());
    assert_eq!(outcome.data.issues.len(), 1);
    assert_eq!(outcome.data.issues[0].title, "First");
}

#[tokio::test]
async fn test_other_api_errors_are_fatal() {
    let server = MockServer::start().await;
    mock_rate_limit(&server, 4999).await;
    mock_repo(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{}/issues", REPO_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([issue_json(1, "First", Some("a"))])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/issues/1/comments", REPO_PATH)))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let (_handle, pipeline) = pipeline(&server, 100);
    let err = pipeline.fetch_report(&repo()).await.unwrap_err();

    assert!(matches!(err, Error::GitHubApi(ref msg) if msg.contains("500")), "got {err:?}");
}

#[tokio::test]
async fn test_quota_exhausted_on_repo_lookup_returns_empty_report() {
    let server = MockServer::start().await;
    mock_rate_limit(&server, 1).await;

    Mock::given(method("GET"))
        .and(path(REPO_PATH))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "1"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/issues", REPO_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (_handle, pipeline) = pipeline(&server, 100);
    let outcome = pipeline.fetch_report(&repo()).await.unwrap();

    assert_eq!(outcome.status, FetchStatus::RateLimited);
    assert!(outcome.data.issues.is_empty());
}

#[tokio::test]
async fn test_rate_limited_preflight_returns_empty_report() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rate_limit"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("x-ratelimit-remaining", "0")
                .insert_header("x-ratelimit-reset", "1"),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(REPO_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let (_handle, pipeline) = pipeline(&server, 100);
    let outcome = pipeline.fetch_report(&repo()).await.unwrap();

    assert_eq!(outcome.status, FetchStatus::RateLimited);
    assert!(outcome.data.issues.is_empty());
}

#[tokio::test]
async fn test_permission_403_is_not_a_rate_limit() {
    let server = MockServer::start().await;
    mock_rate_limit(&server, 4999).await;

    Mock::given(method("GET"))
        .and(path(REPO_PATH))
        .respond_with(
            ResponseTemplate::new(403)
                .insert_header("x-ratelimit-remaining", "4990")
                .set_body_string("Resource not accessible by integration"),
        )
        .mount(&server)
        .await;

    let (_handle, pipeline) = pipeline(&server, 100);
    let err = pipeline.fetch_report(&repo()).await.unwrap_err();
    assert!(matches!(err, Error::GitHubApi(_)), "got {err:?}");
}

#[tokio::test]
async fn test_missing_repository() {
    let server = MockServer::start().await;
    mock_rate_limit(&server, 4999).await;

    Mock::given(method("GET"))
        .and(path(REPO_PATH))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let (_handle, pipeline) = pipeline(&server, 100);
    let err = pipeline.fetch_report(&repo()).await.unwrap_err();
    assert!(matches!(err, Error::RepoNotFound(ref name) if name == "octocat/Hello-World"));
}

#[tokio::test]
async fn test_cancelled_run_returns_without_fetching_comments() {
    let server = MockServer::start().await;
    mock_rate_limit(&server, 4999).await;
    mock_repo(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{}/issues", REPO_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([issue_json(1, "First", Some("a"))])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("{}/issues/1/comments", REPO_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&server)
        .await;

    let (handle, pipeline) = pipeline(&server, 100);
    handle.cancel();
    let outcome = pipeline.fetch_report(&repo()).await.unwrap();

    assert_eq!(outcome.status, FetchStatus::Interrupted);
    assert!(outcome.data.issues.is_empty());
}

#[tokio::test]
async fn test_report_file_is_overwritten() {
    let server = MockServer::start().await;
    mock_rate_limit(&server, 4999).await;
    mock_repo(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{}/issues", REPO_PATH)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([issue_json(1, "First", Some("line\\nbreak"))])))
        .mount(&server)
        .await;
    mock_comments(&server, 1, vec![]).await;

    let (_handle, pipeline) = pipeline(&server, 100);
    let outcome = pipeline.fetch_report(&repo()).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("github_report.html");
    std::fs::write(&path, "stale contents").unwrap();

    write_report(&outcome.data, &path, OutputFormat::Html).unwrap();
    let html = std::fs::read_to_string(&path).unwrap();
    assert!(!html.contains("stale contents"));
    assert!(html.contains("line<br>break"));

    let json_path = dir.path().join("report.json");
    write_report(&outcome.data, &json_path, OutputFormat::Json).unwrap();
    let parsed: Value = serde_json::from_str(&std::fs::read_to_string(&json_path).unwrap()).unwrap();
    assert_eq!(parsed["repository"]["owner"], "octocat");
    assert_eq!(parsed["issues"][0]["title"], "First");
}
