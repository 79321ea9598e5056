use std::fmt;
use std::path::Path;

use critic_core::{CriticConfig, CriticError, LoadOutcome};
use serde::Serialize;

use crate::github::{self, CommentPublisher};
use crate::llm::LlmClient;
use crate::loader::ContentLoader;
use crate::select::FileSelector;

/// What happened to one selected file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "reason")]
pub enum FileStatus {
    /// Review posted as a comment.
    Commented,
    /// Too short to review; not counted as attempted.
    Skipped,
    /// The file could not be read.
    ReadFailed(String),
    /// The review request failed.
    ReviewFailed(String),
    /// The comment could not be posted.
    PublishFailed(String),
}

/// Outcome for a single selected file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    /// Path as supplied to the run.
    pub path: String,
    /// What happened to it.
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Tally of a review run.
///
/// # Examples
///
/// ```
/// use critic_review::pipeline::ReviewStats;
///
/// let stats = ReviewStats {
///     selected: 3,
///     skipped: 1,
///     attempted: 2,
///     succeeded: 1,
///     read_failures: 0,
///     review_failures: 1,
///     publish_failures: 0,
/// };
/// assert_eq!(stats.failed(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewStats {
    /// Files that passed the selector.
    pub selected: usize,
    /// Files skipped as too short.
    pub skipped: usize,
    /// Files that went through load, review, and publish.
    pub attempted: usize,
    /// Files that ended with a posted comment.
    pub succeeded: usize,
    /// Files that could not be read.
    pub read_failures: usize,
    /// Files whose review request failed.
    pub review_failures: usize,
    /// Files whose comment could not be posted.
    pub publish_failures: usize,
}

impl ReviewStats {
    /// Attempted files without a posted comment.
    pub fn failed(&self) -> usize {
        self.read_failures + self.review_failures + self.publish_failures
    }

    fn record(&mut self, status: &FileStatus) {
        match status {
            FileStatus::Skipped => {
                self.skipped += 1;
                return;
            }
            FileStatus::Commented => self.succeeded += 1,
            FileStatus::ReadFailed(_) => self.read_failures += 1,
            FileStatus::ReviewFailed(_) => self.review_failures += 1,
            FileStatus::PublishFailed(_) => self.publish_failures += 1,
        }
        self.attempted += 1;
    }
}

/// Result of a completed run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Per-file outcomes in processing order.
    pub files: Vec<FileReport>,
    /// Run totals.
    pub stats: ReviewStats,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for file in &self.files {
            let label = match &file.status {
                FileStatus::Commented => "commented".to_string(),
                FileStatus::Skipped => "skipped (too short)".to_string(),
                FileStatus::ReadFailed(r) => format!("read failed: {r}"),
                FileStatus::ReviewFailed(r) => format!("review failed: {r}"),
                FileStatus::PublishFailed(r) => format!("publish failed: {r}"),
            };
            writeln!(f, "  {}: {label}", file.path)?;
        }
        write!(
            f,
            "Review complete: {}/{} files commented",
            self.stats.succeeded, self.stats.attempted
        )?;
        if self.stats.skipped > 0 {
            write!(f, " ({} skipped)", self.stats.skipped)?;
        }
        Ok(())
    }
}

/// Drives selection, loading, review, and publishing over the changed files.
///
/// Files are processed one at a time, in input order. A failure on one file
/// is logged and recorded; the run always continues with the next file.
pub struct ReviewPipeline {
    selector: FileSelector,
    loader: ContentLoader,
    llm: LlmClient,
    publisher: CommentPublisher,
}

impl ReviewPipeline {
    /// Assemble a pipeline from its components.
    pub fn new(
        selector: FileSelector,
        loader: ContentLoader,
        llm: LlmClient,
        publisher: CommentPublisher,
    ) -> Self {
        Self {
            selector,
            loader,
            llm,
            publisher,
        }
    }

    /// Build every component from a validated run configuration.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Config`] if the LLM or GitHub settings are
    /// incomplete.
    pub fn from_config(config: &CriticConfig) -> Result<Self, CriticError> {
        let resolvers = github::default_resolvers(&config.github);
        Ok(Self::new(
            FileSelector::from_config(&config.review),
            ContentLoader::from_config(&config.review),
            LlmClient::new(&config.llm)?,
            CommentPublisher::new(&config.github, &resolvers)?,
        ))
    }

    /// Review every selected file among `changed_files`.
    pub async fn run(&self, changed_files: &[String]) -> RunReport {
        let selected = self.selector.select(changed_files);
        tracing::info!(
            changed = changed_files.len(),
            selected = selected.len(),
            "selected files for review"
        );

        let mut stats = ReviewStats {
            selected: selected.len(),
            ..ReviewStats::default()
        };
        let mut files = Vec::with_capacity(selected.len());

        for path in selected {
            let status = self.process(&path).await;
            stats.record(&status);
            files.push(FileReport { path, status });
        }

        RunReport { files, stats }
    }

    async fn process(&self, path: &str) -> FileStatus {
        tracing::info!(path, "reviewing");

        let file = match self.loader.load(Path::new(path)).await {
            Ok(LoadOutcome::Usable(file)) => file,
            Ok(LoadOutcome::Skip { size, .. }) => {
                tracing::info!(path, size, "skipping: too short to review");
                return FileStatus::Skipped;
            }
            Err(e) => {
                tracing::warn!(path, "{e}");
                return FileStatus::ReadFailed(e.to_string());
            }
        };
        if file.truncated {
            tracing::info!(
                path,
                size = file.size,
                kept = file.content.len(),
                "truncated for review"
            );
        }

        let text = match self.llm.review(&file).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(path, "{e}");
                return FileStatus::ReviewFailed(e.to_string());
            }
        };
        self.publish(path, &text).await
    }

    async fn publish(&self, path: &str, text: &str) -> FileStatus {
        match self.publisher.publish(path, text).await {
            Ok(()) => {
                tracing::info!(path, "comment posted");
                FileStatus::Commented
            }
            Err(e) => {
                log_publish_failure(path, &e);
                FileStatus::PublishFailed(e.to_string())
            }
        }
    }
}

fn log_publish_failure(path: &str, err: &CriticError) {
    match err {
        CriticError::MissingPullRequest => tracing::warn!(path, "{err}"),
        CriticError::Publish {
            status: Some(status),
            message,
        } => tracing::warn!(path, status, response = %message, "comment was not created"),
        _ => tracing::warn!(path, "{err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skipped_files_are_not_attempted() {
        let mut stats = ReviewStats::default();
        stats.record(&FileStatus::Skipped);
        stats.record(&FileStatus::Commented);
        stats.record(&FileStatus::ReviewFailed("boom".into()));
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.attempted, 2);
        assert_eq!(stats.succeeded, 1);
        assert_eq!(stats.failed(), 1);
    }

    #[test]
    fn display_prints_tally() {
        let report = RunReport {
            files: vec![
                FileReport {
                    path: "a.py".into(),
                    status: FileStatus::Commented,
                },
                FileReport {
                    path: "c.ts".into(),
                    status: FileStatus::PublishFailed("HTTP 403".into()),
                },
            ],
            stats: ReviewStats {
                selected: 2,
                attempted: 2,
                succeeded: 1,
                publish_failures: 1,
                ..ReviewStats::default()
            },
        };
        let text = report.to_string();
        assert!(text.contains("a.py: commented"));
        assert!(text.contains("c.ts: publish failed: HTTP 403"));
        assert!(text.ends_with("Review complete: 1/2 files commented"));
    }

    #[test]
    fn report_serializes_status_tag() {
        let report = FileReport {
            path: "a.py".into(),
            status: FileStatus::ReadFailed("gone".into()),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["path"], "a.py");
        assert_eq!(json["status"], "readFailed");
        assert_eq!(json["reason"], "gone");
    }
}
