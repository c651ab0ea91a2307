//! GitHub REST API registry.
//!
//! ## Endpoints
//!
//! ```text
//! GET  {api_base}/repos/{owner}/{repo}/issues?state=&per_page=&page=
//! POST {api_base}/repos/{owner}/{repo}/issues   {"title", "labels", "body"}
//! ```

use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client, Response};
use serde::Deserialize;

use crate::error::{AppError, Result};
use crate::models::{Config, Issue, NewIssue};
use crate::pipeline::retry::{ErrorKind, RetryPolicy};
use crate::registry::IssueRegistry;

const GITHUB_ACCEPT: &str = "application/vnd.github+json";

/// Error body returned by the GitHub API.
#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

/// Issue registry backed by a GitHub repository.
pub struct GithubRegistry {
    client: Client,
    issues_url: String,
    token: String,
    state: String,
    per_page: u32,
    max_pages: u32,
    retry: RetryPolicy,
}

impl GithubRegistry {
    /// Create a registry for the repository named in `config`.
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            issues_url: config.issues_url(),
            token: config.github.token.clone(),
            state: config.github.state.clone(),
            per_page: config.github.per_page,
            max_pages: config.github.max_pages,
            retry: RetryPolicy::from_config(&config.http),
        }
    }

    fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            "x-github-api-version",
            HeaderValue::from_static("2022-11-28"),
        );
        headers
    }

    /// Fetch one page of the issue listing.
    async fn list_page(&self, page: u32) -> Result<Vec<Issue>> {
        let response = self
            .client
            .get(&self.issues_url)
            .headers(self.headers())
            .header(AUTHORIZATION, format!("token {}", self.token))
            .query(&[
                ("state", self.state.clone()),
                ("per_page", self.per_page.to_string()),
                ("page", page.to_string()),
            ])
            .send()
            .await?;

        let response = check_api_status(&self.issues_url, response).await?;
        Ok(response.json().await?)
    }

    async fn post_issue(&self, issue: &NewIssue) -> Result<Issue> {
        let response = self
            .client
            .post(&self.issues_url)
            .headers(self.headers())
            .header(AUTHORIZATION, format!("token {}", self.token))
            .json(issue)
            .send()
            .await?;

        let response = check_api_status(&self.issues_url, response).await?;
        Ok(response.json().await?)
    }
}

#[async_trait]
impl IssueRegistry for GithubRegistry {
    async fn list_issues(&self) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();

        for page in 1..=self.max_pages {
            let batch = self
                .retry
                .run("list issues", || self.list_page(page))
                .await?;
            let batch_len = batch.len();
            issues.extend(batch.into_iter().filter(|issue| !issue.is_pull_request()));

            log::debug!("Issue page {} returned {} entries", page, batch_len);

            if batch_len < self.per_page as usize {
                return Ok(issues);
            }
        }

        log::warn!(
            "Issue listing stopped after {} pages; raise github.max_pages if threads are missing",
            self.max_pages
        );
        Ok(issues)
    }

    async fn create_issue(&self, issue: &NewIssue) -> Result<Issue> {
        self.retry
            .run_classified("create issue", create_retry_kind, || self.post_issue(issue))
            .await
    }
}

/// Retry classification for issue creation.
///
/// Only failures where the POST cannot have landed are retried: refused
/// connections and throttling. Timeouts, dropped requests and 5xx answers may
/// follow a write that went through, and a retry would open a second thread.
fn create_retry_kind(error: &AppError) -> ErrorKind {
    match error {
        AppError::Http(e) if e.is_connect() => ErrorKind::Connection,
        _ => match error.retry_kind() {
            ErrorKind::Throttled => ErrorKind::Throttled,
            _ => ErrorKind::Other,
        },
    }
}

/// Map a non-success API response to an error.
async fn check_api_status(url: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let code = status.as_u16();
    if code == 401 || code == 403 {
        let message = response
            .json::<ApiMessage>()
            .await
            .map(|m| m.message)
            .unwrap_or_else(|_| status.to_string());
        return Err(AppError::Auth {
            status: code,
            message,
        });
    }

    Err(AppError::Status {
        url: url.to_string(),
        status: code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CommentKind;
    use crate::utils::http::create_async_client;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_json, header, method, path, query_param},
    };

    const ISSUES_PATH: &str = "/repos/zhangzwd/gitalk/issues";

    fn test_config(server: &MockServer, per_page: u32) -> Config {
        let mut config = Config::default();
        config.github.owner = "zhangzwd".to_string();
        config.github.token = "t0ken".to_string();
        config.github.api_base = server.uri();
        config.github.per_page = per_page;
        config.http.retry_base_ms = 1;
        config.http.retry_max_ms = 2;
        config
    }

    fn registry(config: &Config) -> GithubRegistry {
        let client = create_async_client(&config.http).unwrap();
        GithubRegistry::new(config, client)
    }

    fn issue_json(number: u64, labels: &[&str]) -> serde_json::Value {
        json!({
            "number": number,
            "title": format!("Issue {number}"),
            "labels": labels.iter().map(|name| json!({"name": name})).collect::<Vec<_>>(),
        })
    }

    #[tokio::test]
    async fn test_list_issues_follows_pages_and_drops_pull_requests() {
        let server = MockServer::start().await;
        let mut pr = issue_json(3, &[]);
        pr["pull_request"] = json!({"url": "https://api.github.com/pulls/3"});

        Mock::given(method("GET"))
            .and(path(ISSUES_PATH))
            .and(query_param("page", "1"))
            .and(query_param("per_page", "2"))
            .and(query_param("state", "all"))
            .and(header("authorization", "token t0ken"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([issue_json(1, &["Gitalk", "aa"]), pr])),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ISSUES_PATH))
            .and(query_param("page", "2"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!([issue_json(2, &["bb"])])),
            )
            .mount(&server)
            .await;

        let config = test_config(&server, 2);
        let issues = registry(&config).list_issues().await.unwrap();

        let numbers: Vec<u64> = issues.iter().map(|i| i.number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(issues[0].labels[1].name, "aa");
    }

    #[tokio::test]
    async fn test_list_issues_stops_at_max_pages() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ISSUES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([issue_json(1, &["x"])])))
            .expect(3)
            .mount(&server)
            .await;

        let mut config = test_config(&server, 1);
        config.github.max_pages = 3;
        let issues = registry(&config).list_issues().await.unwrap();
        assert_eq!(issues.len(), 3);
    }

    #[tokio::test]
    async fn test_bad_token_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ISSUES_PATH))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({"message": "Bad credentials"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server, 100);
        let err = registry(&config).list_issues().await.unwrap_err();
        match err {
            AppError::Auth { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Bad credentials");
            }
            other => panic!("expected auth error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(ISSUES_PATH))
            .respond_with(ResponseTemplate::new(502))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(ISSUES_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        let config = test_config(&server, 100);
        let issues = registry(&config).list_issues().await.unwrap();
        assert!(issues.is_empty());
    }

    #[tokio::test]
    async fn test_create_issue_posts_labels() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ISSUES_PATH))
            .and(body_json(json!({
                "title": "Hello",
                "labels": ["Gitalk", "ff00"],
                "body": "https://x/hello/"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(issue_json(7, &["Gitalk", "ff00"])))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server, 100);
        let payload = NewIssue::thread(
            CommentKind::Gitalk,
            "ff00",
            "Hello",
            Some("https://x/hello/".to_string()),
        );
        let created = registry(&config).create_issue(&payload).await.unwrap();
        assert_eq!(created.number, 7);
    }

    #[tokio::test]
    async fn test_create_issue_not_retried_on_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ISSUES_PATH))
            .respond_with(ResponseTemplate::new(502))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server, 100);
        let payload = NewIssue::thread(CommentKind::Gitalk, "ff00", "Hello", None);
        let err = registry(&config).create_issue(&payload).await.unwrap_err();
        assert!(matches!(err, AppError::Status { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_create_issue_retried_when_throttled() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ISSUES_PATH))
            .respond_with(ResponseTemplate::new(429))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(ISSUES_PATH))
            .respond_with(ResponseTemplate::new(201).set_body_json(issue_json(8, &["Gitalk", "ff00"])))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server, 100);
        let payload = NewIssue::thread(CommentKind::Gitalk, "ff00", "Hello", None);
        let created = registry(&config).create_issue(&payload).await.unwrap();
        assert_eq!(created.number, 8);
    }

    #[test]
    fn test_create_retry_classification() {
        let status = |status| AppError::Status {
            url: "https://api.github.com".into(),
            status,
        };
        assert_eq!(create_retry_kind(&status(502)), ErrorKind::Other);
        assert_eq!(create_retry_kind(&status(429)), ErrorKind::Throttled);
        assert_eq!(
            create_retry_kind(&AppError::Auth {
                status: 403,
                message: "Forbidden".into()
            }),
            ErrorKind::Other
        );
    }

    #[tokio::test]
    async fn test_create_issue_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(ISSUES_PATH))
            .respond_with(ResponseTemplate::new(422))
            .expect(1)
            .mount(&server)
            .await;

        let config = test_config(&server, 100);
        let payload = NewIssue::thread(CommentKind::Gitalk, "ff00", "Hello", None);
        let err = registry(&config).create_issue(&payload).await.unwrap_err();
        assert!(matches!(err, AppError::Status { status: 422, .. }));
    }
}
