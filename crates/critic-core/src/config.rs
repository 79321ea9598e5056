use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CriticError;

/// Top-level configuration for a single review run.
///
/// Built once at start-up and handed to every pipeline component.
/// Supports layered resolution: CLI flags > env vars > `.critic.toml` > defaults.
///
/// # Examples
///
/// ```
/// use critic_core::CriticConfig;
///
/// let config = CriticConfig::default();
/// assert_eq!(config.review.max_bytes, 20_000);
/// assert_eq!(config.llm.provider, "gemini");
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CriticConfig {
    /// Generative-text provider settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// File selection and payload shaping.
    #[serde(default)]
    pub review: ReviewConfig,
    /// Hosting platform settings.
    #[serde(default)]
    pub github: GitHubConfig,
}

impl CriticConfig {
    /// Load configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Io`] if the file cannot be read, or
    /// [`CriticError::Toml`] if the content is not valid TOML.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use critic_core::CriticConfig;
    /// use std::path::Path;
    ///
    /// let config = CriticConfig::from_file(Path::new(".critic.toml")).unwrap();
    /// ```
    pub fn from_file(path: &Path) -> Result<Self, CriticError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Toml`] if parsing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use critic_core::CriticConfig;
    ///
    /// let toml = r#"
    /// [review]
    /// min_bytes = 10
    /// "#;
    /// let config = CriticConfig::from_toml(toml).unwrap();
    /// assert_eq!(config.review.min_bytes, 10);
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, CriticError> {
        let config: Self = toml::from_str(content)?;
        Ok(config)
    }

    /// Overlay values from the environment.
    ///
    /// `lookup` is usually `|key| std::env::var(key).ok()`. Empty values are
    /// treated as unset. An API key already present in the config file wins
    /// over the environment.
    ///
    /// # Examples
    ///
    /// ```
    /// use critic_core::CriticConfig;
    ///
    /// let mut config = CriticConfig::default();
    /// config.apply_env(|key| match key {
    ///     "GITHUB_REPOSITORY" => Some("octocat/hello-world".into()),
    ///     "PR_NUMBER" => Some("42".into()),
    ///     _ => None,
    /// });
    /// assert_eq!(config.github.repository.as_deref(), Some("octocat/hello-world"));
    /// assert_eq!(config.github.pr_number.as_deref(), Some("42"));
    /// ```
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.llm.api_key.is_none() {
            self.llm.api_key = get(self.llm.api_key_env());
        }
        if let Some(token) = get("GITHUB_TOKEN") {
            self.github.token = Some(token);
        }
        if let Some(repo) = get("GITHUB_REPOSITORY") {
            self.github.repository = Some(repo);
        }
        if let Some(number) = get("PR_NUMBER") {
            self.github.pr_number = Some(number);
        }
        if let Some(path) = get("GITHUB_EVENT_PATH") {
            self.github.event_path = Some(PathBuf::from(path));
        }
        if let Some(url) = get("GITHUB_API_URL") {
            self.github.api_url = url;
        }
    }

    /// Check that the credentials a run needs are present.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Config`] naming the first missing or invalid
    /// setting.
    ///
    /// # Examples
    ///
    /// ```
    /// use critic_core::CriticConfig;
    ///
    /// let err = CriticConfig::default().validate().unwrap_err();
    /// assert!(err.to_string().contains("GEMINI_API_KEY"));
    /// ```
    pub fn validate(&self) -> Result<(), CriticError> {
        if !matches!(self.llm.provider.as_str(), "gemini" | "openai") {
            return Err(CriticError::Config(format!(
                "unknown LLM provider '{}', expected \"gemini\" or \"openai\"",
                self.llm.provider
            )));
        }
        if self.llm.api_key.is_none() {
            return Err(CriticError::Config(format!(
                "{} not set. Export it or add api_key under [llm] in .critic.toml",
                self.llm.api_key_env()
            )));
        }
        if self.github.token.is_none() {
            return Err(CriticError::Config("GITHUB_TOKEN not set".into()));
        }
        let Some(repo) = self.github.repository.as_deref() else {
            return Err(CriticError::Config(
                "GITHUB_REPOSITORY not set (expected owner/repo)".into(),
            ));
        };
        match repo.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(())
            }
            _ => Err(CriticError::Config(format!(
                "invalid GITHUB_REPOSITORY '{repo}', expected owner/repo"
            ))),
        }
    }
}

/// Generative-text provider configuration.
///
/// # Examples
///
/// ```
/// use critic_core::LlmConfig;
///
/// let config = LlmConfig::default();
/// assert_eq!(config.model, "gemini-1.5-flash");
/// assert_eq!(config.max_output_tokens, 1024);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider name: `"gemini"` or `"openai"`.
    #[serde(default = "default_provider")]
    pub provider: String,
    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// API key for the provider.
    pub api_key: Option<String>,
    /// Custom base URL for API requests.
    pub base_url: Option<String>,
    /// Sampling temperature; kept low so reviews are repeatable.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Upper bound on generated tokens per review.
    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,
}

impl LlmConfig {
    /// Environment variable holding the API key for the configured provider.
    pub fn api_key_env(&self) -> &'static str {
        match self.provider.as_str() {
            "openai" => "OPENAI_API_KEY",
            _ => "GEMINI_API_KEY",
        }
    }
}

fn default_provider() -> String {
    "gemini".into()
}

fn default_model() -> String {
    "gemini-1.5-flash".into()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_output_tokens() -> u32 {
    1024
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
            max_output_tokens: default_max_output_tokens(),
        }
    }
}

/// File selection and content shaping configuration.
///
/// # Examples
///
/// ```
/// use critic_core::ReviewConfig;
///
/// let config = ReviewConfig::default();
/// assert!(config.extensions.contains(&".py".to_string()));
/// assert_eq!(config.max_bytes, 20_000);
/// assert_eq!(config.min_bytes, 50);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewConfig {
    /// File extensions eligible for review, e.g. `".ts"`.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Glob patterns excluded even when the extension matches.
    #[serde(default)]
    pub skip_patterns: Vec<String>,
    /// Content beyond this many bytes is cut before review (default: 20000).
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
    /// Files smaller than this many bytes are skipped (default: 50).
    #[serde(default = "default_min_bytes")]
    pub min_bytes: usize,
}

fn default_extensions() -> Vec<String> {
    [
        ".py", ".js", ".jsx", ".ts", ".tsx", ".sql", ".json", ".css", ".scss",
    ]
    .iter()
    .map(|e| (*e).to_string())
    .collect()
}

fn default_max_bytes() -> usize {
    20_000
}

fn default_min_bytes() -> usize {
    50
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            skip_patterns: Vec::new(),
            max_bytes: default_max_bytes(),
            min_bytes: default_min_bytes(),
        }
    }
}

/// Hosting platform configuration.
///
/// Only `api_url` is usually set from the config file; the rest comes
/// from the CI environment through [`CriticConfig::apply_env`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubConfig {
    /// REST API base (default: `https://api.github.com`).
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Access token used for comment creation.
    #[serde(skip_serializing)]
    pub token: Option<String>,
    /// Repository in `owner/repo` form.
    pub repository: Option<String>,
    /// Explicit pull-request number, unparsed.
    pub pr_number: Option<String>,
    /// Path to the CI event payload.
    pub event_path: Option<PathBuf>,
}

fn default_api_url() -> String {
    "https://api.github.com".into()
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            repository: None,
            pr_number: None,
            event_path: None,
        }
    }
}
