//! Changed-file selection by extension allow-list.
//!
//! Matching is a case-sensitive suffix test on the dot-prefixed extension,
//! so `x.pyx` never matches `.py` and `App.JS` never matches `.js`. Glob
//! skip patterns then drop noise (bundles, vendored code) before anything
//! is read from disk.

use std::collections::HashSet;

use critic_core::ReviewConfig;

/// Filter `paths` down to those ending in one of `allowed_extensions`.
///
/// Input order is preserved and the result is idempotent:
/// `select(&select(x, e), e) == select(x, e)`.
///
/// # Examples
///
/// ```
/// use critic_review::select::select;
///
/// let paths = ["a.py", "b.txt", "c.ts"].map(String::from);
/// let exts = [".py", ".ts"].map(String::from);
/// assert_eq!(select(&paths, &exts), vec!["a.py", "c.ts"]);
/// ```
pub fn select(paths: &[String], allowed_extensions: &[String]) -> Vec<String> {
    let suffixes: Vec<String> = allowed_extensions
        .iter()
        .filter_map(|e| normalize_extension(e))
        .collect();
    paths
        .iter()
        .filter(|p| suffixes.iter().any(|s| p.ends_with(s.as_str())))
        .cloned()
        .collect()
}

/// Allow-list entries may be written with or without the leading dot.
fn normalize_extension(ext: &str) -> Option<String> {
    let ext = ext.trim();
    if ext.is_empty() || ext == "." {
        return None;
    }
    if ext.starts_with('.') {
        Some(ext.to_string())
    } else {
        Some(format!(".{ext}"))
    }
}

/// Extension allow-list plus glob exclusions, built from [`ReviewConfig`].
///
/// # Examples
///
/// ```
/// use critic_core::ReviewConfig;
/// use critic_review::select::FileSelector;
///
/// let config = ReviewConfig {
///     skip_patterns: vec!["dist/**".into()],
///     ..ReviewConfig::default()
/// };
/// let selector = FileSelector::from_config(&config);
/// let paths = ["src/app.ts", "dist/app.js", "README.md"].map(String::from);
/// assert_eq!(selector.select(&paths), vec!["src/app.ts"]);
/// ```
pub struct FileSelector {
    extensions: Vec<String>,
    skip_patterns: Vec<glob::Pattern>,
}

impl FileSelector {
    /// Create a selector that only applies the extension allow-list.
    pub fn new(extensions: Vec<String>) -> Self {
        Self {
            extensions,
            skip_patterns: Vec::new(),
        }
    }

    /// Create a selector from review configuration.
    ///
    /// Invalid glob patterns are logged and ignored.
    pub fn from_config(config: &ReviewConfig) -> Self {
        let mut skip_patterns = Vec::new();
        for pat in &config.skip_patterns {
            match glob::Pattern::new(pat) {
                Ok(p) => skip_patterns.push(p),
                Err(e) => tracing::warn!(pattern = %pat, "ignoring invalid skip pattern: {e}"),
            }
        }
        Self {
            extensions: config.extensions.clone(),
            skip_patterns,
        }
    }

    /// Select reviewable paths, dropping skip-pattern matches and repeated
    /// paths. The first occurrence of a path keeps its position.
    pub fn select(&self, paths: &[String]) -> Vec<String> {
        let mut seen = HashSet::new();
        select(paths, &self.extensions)
            .into_iter()
            .filter(|p| {
                let skipped = self.skip_patterns.iter().any(|pat| pat.matches(p));
                if skipped {
                    tracing::debug!(path = %p, "skipped by pattern");
                }
                !skipped
            })
            .filter(|p| seen.insert(p.clone()))
            .collect()
    }
}

/// Split the CI-provided changed-file argument on whitespace.
///
/// # Examples
///
/// ```
/// use critic_review::select::parse_changed_files;
///
/// assert_eq!(parse_changed_files(" a.py\n b.txt  c.ts "), vec!["a.py", "b.txt", "c.ts"]);
/// ```
pub fn parse_changed_files(arg: &str) -> Vec<String> {
    arg.split_whitespace().map(str::to_string).collect()
}
