use std::path::PathBuf;

/// Errors that can occur across the critic workspace.
///
/// The per-file variants ([`CriticError::Read`], [`CriticError::Review`],
/// [`CriticError::MissingPullRequest`], [`CriticError::Publish`]) are
/// recovered by the review pipeline; only [`CriticError::Config`] and the
/// ambient I/O and parsing variants are meant to stop a run.
///
/// # Examples
///
/// ```
/// use critic_core::CriticError;
///
/// let err = CriticError::Config("missing API key".into());
/// assert!(err.to_string().contains("missing API key"));
/// ```
#[derive(Debug, thiserror::Error, miette::Diagnostic)]
pub enum CriticError {
    /// Filesystem I/O failure outside of file loading.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    #[diagnostic(help("see `critic --help` for the environment variables a run needs"))]
    Config(String),

    /// A changed file could not be read as UTF-8 text.
    #[error("failed to read {}: {message}", .path.display())]
    Read {
        /// Path of the file that failed to load.
        path: PathBuf,
        /// Underlying cause.
        message: String,
    },

    /// The generative-text API call failed.
    #[error("review request failed: {0}")]
    Review(String),

    /// No pull-request number could be resolved for this run.
    #[error("no pull request number available (set PR_NUMBER or GITHUB_EVENT_PATH)")]
    MissingPullRequest,

    /// The comment could not be posted.
    #[error("failed to post comment{}: {message}", .status.map(|s| format!(" (HTTP {s})")).unwrap_or_default())]
    Publish {
        /// HTTP status returned by the platform, if a response arrived.
        status: Option<u16>,
        /// Response body or transport error text.
        message: String,
    },

    /// JSON serialization / deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML deserialization failure.
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
