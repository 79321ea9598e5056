use std::path::{Path, PathBuf};

use critic_core::{CriticError, GitHubConfig, PullRequestRef};
use reqwest::StatusCode;

const USER_AGENT: &str = "critic";

const DISCLAIMER: &str =
    "*This review was generated by AI and is advisory only. Verify before acting on it.*";

/// One way of finding the pull-request number for the current run.
///
/// Resolvers are tried in order and the first `Some` wins; see
/// [`resolve_pull_request`].
pub trait PullRequestResolver {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Attempt to resolve the pull-request number.
    fn resolve(&self) -> Option<PullRequestRef>;
}

/// Explicit number from configuration (`PR_NUMBER`).
///
/// # Examples
///
/// ```
/// use critic_core::PullRequestRef;
/// use critic_review::github::{ExplicitNumber, PullRequestResolver};
///
/// let resolver = ExplicitNumber(Some("17".into()));
/// assert_eq!(resolver.resolve(), Some(PullRequestRef(17)));
/// assert_eq!(ExplicitNumber(Some("abc".into())).resolve(), None);
/// ```
pub struct ExplicitNumber(pub Option<String>);

impl PullRequestResolver for ExplicitNumber {
    fn name(&self) -> &'static str {
        "PR_NUMBER"
    }

    fn resolve(&self) -> Option<PullRequestRef> {
        let raw = self.0.as_deref()?.trim();
        match raw.parse::<u64>() {
            Ok(n) if n > 0 => Some(PullRequestRef(n)),
            _ => {
                tracing::warn!(value = %raw, "PR_NUMBER is not a pull request number, ignoring");
                None
            }
        }
    }
}

/// Number read from the CI event payload (`GITHUB_EVENT_PATH`).
///
/// Reads `pull_request.number`, falling back to a top-level `number`.
pub struct EventDocument(pub Option<PathBuf>);

impl PullRequestResolver for EventDocument {
    fn name(&self) -> &'static str {
        "GITHUB_EVENT_PATH"
    }

    fn resolve(&self) -> Option<PullRequestRef> {
        let path = self.0.as_deref()?;
        match read_event_number(path) {
            Ok(number) => number,
            Err(e) => {
                tracing::warn!(path = %path.display(), "could not read event document: {e}");
                None
            }
        }
    }
}

fn read_event_number(path: &Path) -> Result<Option<PullRequestRef>, CriticError> {
    let content = std::fs::read_to_string(path)?;
    let event: serde_json::Value = serde_json::from_str(&content)?;
    let number = event
        .get("pull_request")
        .and_then(|pr| pr.get("number"))
        .or_else(|| event.get("number"))
        .and_then(|n| n.as_u64())
        .filter(|n| *n > 0);
    Ok(number.map(PullRequestRef))
}

/// Try each resolver in order and return the first number found.
///
/// # Errors
///
/// Returns [`CriticError::MissingPullRequest`] if no resolver yields a number.
///
/// # Examples
///
/// ```
/// use critic_core::PullRequestRef;
/// use critic_review::github::{resolve_pull_request, EventDocument, ExplicitNumber, PullRequestResolver};
///
/// let chain: Vec<Box<dyn PullRequestResolver>> = vec![
///     Box::new(ExplicitNumber(None)),
///     Box::new(EventDocument(None)),
/// ];
/// assert!(resolve_pull_request(&chain).is_err());
///
/// let chain: Vec<Box<dyn PullRequestResolver>> = vec![Box::new(ExplicitNumber(Some("9".into())))];
/// assert_eq!(resolve_pull_request(&chain).unwrap(), PullRequestRef(9));
/// ```
pub fn resolve_pull_request(
    resolvers: &[Box<dyn PullRequestResolver>],
) -> Result<PullRequestRef, CriticError> {
    for resolver in resolvers {
        if let Some(pr) = resolver.resolve() {
            tracing::debug!(source = resolver.name(), pr = %pr, "resolved pull request");
            return Ok(pr);
        }
    }
    Err(CriticError::MissingPullRequest)
}

/// The standard resolver chain: explicit number, then event document.
pub fn default_resolvers(config: &GitHubConfig) -> Vec<Box<dyn PullRequestResolver>> {
    vec![
        Box::new(ExplicitNumber(config.pr_number.clone())),
        Box::new(EventDocument(config.event_path.clone())),
    ]
}

/// Format the comment body posted for one reviewed file.
///
/// # Examples
///
/// ```
/// use critic_review::github::format_comment;
///
/// let body = format_comment("src/app.ts", "No issues found.");
/// assert!(body.starts_with("## "));
/// assert!(body.contains("`src/app.ts`"));
/// assert!(body.contains("advisory"));
/// ```
pub fn format_comment(path: &str, review_text: &str) -> String {
    format!(
        "## \u{1f916} AI code review: `{path}`\n\n{}\n\n---\n{DISCLAIMER}\n",
        review_text.trim_end()
    )
}

/// Posts one review comment per file to a pull request's discussion thread.
///
/// The pull-request number is resolved once, when the publisher is built,
/// and reused for every comment.
pub struct CommentPublisher {
    http: reqwest::Client,
    api_url: String,
    repository: String,
    token: String,
    pull_request: Option<PullRequestRef>,
}

impl CommentPublisher {
    /// Create a publisher, resolving the pull request through `resolvers`.
    ///
    /// A run without a resolvable pull request still builds a publisher;
    /// each [`publish`](Self::publish) then fails without a network call.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Config`] if the token or repository is missing.
    pub fn new(
        config: &GitHubConfig,
        resolvers: &[Box<dyn PullRequestResolver>],
    ) -> Result<Self, CriticError> {
        let token = config
            .token
            .clone()
            .ok_or_else(|| CriticError::Config("GITHUB_TOKEN not set".into()))?;
        let repository = config
            .repository
            .clone()
            .ok_or_else(|| CriticError::Config("GITHUB_REPOSITORY not set".into()))?;

        let pull_request = match resolve_pull_request(resolvers) {
            Ok(pr) => Some(pr),
            Err(e) => {
                tracing::warn!("{e}; comments will not be posted");
                None
            }
        };

        Ok(Self {
            http: reqwest::Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            repository,
            token,
            pull_request,
        })
    }

    /// The pull request comments go to, if one was resolved.
    pub fn pull_request(&self) -> Option<PullRequestRef> {
        self.pull_request
    }

    /// Post the review for `path` as a pull-request comment.
    ///
    /// Success means the platform answered `201 Created`.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::MissingPullRequest`] without any network call
    /// when no pull request was resolved, or [`CriticError::Publish`] on a
    /// transport failure or any status other than 201.
    pub async fn publish(&self, path: &str, review_text: &str) -> Result<(), CriticError> {
        let PullRequestRef(number) = self.pull_request.ok_or(CriticError::MissingPullRequest)?;
        let url = format!(
            "{}/repos/{}/issues/{number}/comments",
            self.api_url, self.repository
        );
        tracing::debug!(%url, "posting review comment");

        let body = serde_json::json!({ "body": format_comment(path, review_text) });
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .json(&body)
            .send()
            .await
            .map_err(|e| CriticError::Publish {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if status != StatusCode::CREATED {
            let message = response.text().await.unwrap_or_default();
            return Err(CriticError::Publish {
                status: Some(status.as_u16()),
                message,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn github_config(server: &MockServer) -> GitHubConfig {
        GitHubConfig {
            api_url: server.uri(),
            token: Some("ghs_test".into()),
            repository: Some("octocat/hello-world".into()),
            pr_number: Some("7".into()),
            event_path: None,
        }
    }

    fn event_file(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn explicit_number_rejects_zero_and_garbage() {
        assert_eq!(ExplicitNumber(Some("0".into())).resolve(), None);
        assert_eq!(ExplicitNumber(Some("12a".into())).resolve(), None);
        assert_eq!(ExplicitNumber(None).resolve(), None);
        assert_eq!(ExplicitNumber(Some(" 5 ".into())).resolve(), Some(PullRequestRef(5)));
    }

    #[test]
    fn event_document_reads_pull_request_number() {
        let file = event_file(r#"{"action":"opened","pull_request":{"number":314}}"#);
        let resolver = EventDocument(Some(file.path().to_path_buf()));
        assert_eq!(resolver.resolve(), Some(PullRequestRef(314)));
    }

    #[test]
    fn event_document_falls_back_to_top_level_number() {
        let file = event_file(r#"{"number":27,"pull_request":{"title":"x"}}"#);
        let resolver = EventDocument(Some(file.path().to_path_buf()));
        assert_eq!(resolver.resolve(), Some(PullRequestRef(27)));
    }

    #[test]
    fn malformed_or_incomplete_event_document_resolves_nothing() {
        let malformed = event_file("{not json");
        let no_field = event_file(r#"{"ref":"refs/heads/main"}"#);
        assert_eq!(EventDocument(Some(malformed.path().to_path_buf())).resolve(), None);
        assert_eq!(EventDocument(Some(no_field.path().to_path_buf())).resolve(), None);
        assert_eq!(EventDocument(Some(PathBuf::from("/no/such/event.json"))).resolve(), None);
    }

    #[test]
    fn explicit_number_takes_precedence_over_event() {
        let file = event_file(r#"{"pull_request":{"number":1}}"#);
        let chain: Vec<Box<dyn PullRequestResolver>> = vec![
            Box::new(ExplicitNumber(Some("2".into()))),
            Box::new(EventDocument(Some(file.path().to_path_buf()))),
        ];
        assert_eq!(resolve_pull_request(&chain).unwrap(), PullRequestRef(2));
    }

    #[test]
    fn invalid_explicit_number_falls_through_to_event() {
        let file = event_file(r#"{"pull_request":{"number":1}}"#);
        let chain: Vec<Box<dyn PullRequestResolver>> = vec![
            Box::new(ExplicitNumber(Some("latest".into()))),
            Box::new(EventDocument(Some(file.path().to_path_buf()))),
        ];
        assert_eq!(resolve_pull_request(&chain).unwrap(), PullRequestRef(1));
    }

    #[test]
    fn comment_has_heading_review_and_footer() {
        let body = format_comment("api/db.py", "### Performance\nNo issues found.\n\n");
        assert_eq!(
            body,
            "## \u{1f916} AI code review: `api/db.py`\n\n### Performance\nNo issues found.\n\n---\n\
             *This review was generated by AI and is advisory only. Verify before acting on it.*\n"
        );
    }

    #[test]
    fn publisher_requires_token() {
        let config = GitHubConfig {
            token: None,
            repository: Some("a/b".into()),
            ..GitHubConfig::default()
        };
        let err = CommentPublisher::new(&config, &[]).err().unwrap();
        assert!(err.to_string().contains("GITHUB_TOKEN"));
    }

    #[tokio::test]
    async fn publish_succeeds_on_201() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/repos/octocat/hello-world/issues/7/comments"))
            .and(header("authorization", "Bearer ghs_test"))
            .and(header("user-agent", "critic"))
            .and(body_partial_json(serde_json::json!({
                "body": format_comment("a.py", "fine")
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({ "id": 1 })))
            .expect(1)
            .mount(&server)
            .await;

        let config = github_config(&server);
        let publisher = CommentPublisher::new(&config, &default_resolvers(&config)).unwrap();
        assert_eq!(publisher.pull_request(), Some(PullRequestRef(7)));
        publisher.publish("a.py", "fine").await.unwrap();
    }

    #[tokio::test]
    async fn publish_fails_on_200_and_errors() {
        for status in [200_u16, 403, 404, 422, 500] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(status).set_body_string("nope"))
                .mount(&server)
                .await;

            let config = github_config(&server);
            let publisher = CommentPublisher::new(&config, &default_resolvers(&config)).unwrap();
            let err = publisher.publish("a.py", "fine").await.unwrap_err();
            assert!(
                matches!(err, CriticError::Publish { status: Some(s), .. } if s == status),
                "status {status} should be a publish failure, got {err:?}"
            );
        }
    }

    #[tokio::test]
    async fn missing_pull_request_makes_no_http_call() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(201))
            .expect(0)
            .mount(&server)
            .await;

        let malformed = event_file("[]");
        let config = GitHubConfig {
            pr_number: None,
            event_path: Some(malformed.path().to_path_buf()),
            ..github_config(&server)
        };
        let publisher = CommentPublisher::new(&config, &default_resolvers(&config)).unwrap();
        assert_eq!(publisher.pull_request(), None);

        let err = publisher.publish("a.py", "fine").await.unwrap_err();
        assert!(matches!(err, CriticError::MissingPullRequest));
    }
}
