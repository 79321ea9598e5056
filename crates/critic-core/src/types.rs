use std::borrow::Cow;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// A changed file read from disk and shaped for review.
///
/// `content` holds raw bytes so that a truncation cut stays exactly at the
/// byte budget, even when it lands inside a multi-byte character.
///
/// # Examples
///
/// ```
/// use critic_core::LoadedFile;
/// use std::path::PathBuf;
///
/// let file = LoadedFile {
///     path: PathBuf::from("src/app.ts"),
///     content: b"export const x = 1;".to_vec(),
///     truncated: false,
///     size: 19,
/// };
/// assert_eq!(file.text(), "export const x = 1;");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedFile {
    /// Path as it was supplied to the run.
    pub path: PathBuf,
    /// File content, possibly cut to the byte budget.
    pub content: Vec<u8>,
    /// Whether `content` is shorter than the file on disk.
    pub truncated: bool,
    /// Byte length of the whole file on disk.
    pub size: usize,
}

impl LoadedFile {
    /// Content as text. A character split by truncation is replaced with
    /// `U+FFFD`.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}

/// What the content loader decided about a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Worth sending for review.
    Usable(LoadedFile),
    /// Too short to be worth reviewing.
    Skip {
        /// Path of the skipped file.
        path: PathBuf,
        /// Byte length of the file.
        size: usize,
    },
}

/// Pull-request number within a repository.
///
/// Resolved once per run and shared read-only by every comment posting.
///
/// # Examples
///
/// ```
/// use critic_core::PullRequestRef;
///
/// let pr = PullRequestRef(42);
/// assert_eq!(pr.to_string(), "#42");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullRequestRef(pub u64);

impl fmt::Display for PullRequestRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
