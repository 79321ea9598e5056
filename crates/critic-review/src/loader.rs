use std::path::Path;

use critic_core::{CriticError, LoadOutcome, LoadedFile, ReviewConfig};

/// Reads changed files and shapes them to the review byte budget.
///
/// # Examples
///
/// ```
/// use critic_review::loader::ContentLoader;
///
/// let loader = ContentLoader::new(100, 5);
/// assert_eq!(loader.max_bytes(), 100);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct ContentLoader {
    max_bytes: usize,
    min_bytes: usize,
}

impl ContentLoader {
    /// Create a loader with explicit byte limits.
    pub fn new(max_bytes: usize, min_bytes: usize) -> Self {
        Self {
            max_bytes,
            min_bytes,
        }
    }

    /// Create a loader from review configuration.
    pub fn from_config(config: &ReviewConfig) -> Self {
        Self::new(config.max_bytes, config.min_bytes)
    }

    /// Byte budget for a single file.
    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Read `path` and classify it.
    ///
    /// Content smaller than `min_bytes`, or that is only whitespace, is a
    /// [`LoadOutcome::Skip`]. Content over `max_bytes` is
    /// cut to exactly `max_bytes` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`CriticError::Read`] if the file is missing, unreadable, or
    /// not valid UTF-8.
    pub async fn load(&self, path: &Path) -> Result<LoadOutcome, CriticError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| CriticError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        self.shape(path, bytes)
    }

    fn shape(&self, path: &Path, mut bytes: Vec<u8>) -> Result<LoadOutcome, CriticError> {
        let text = std::str::from_utf8(&bytes).map_err(|e| CriticError::Read {
            path: path.to_path_buf(),
            message: format!("not valid UTF-8: {e}"),
        })?;

        let size = bytes.len();
        if size < self.min_bytes || text.trim().is_empty() {
            return Ok(LoadOutcome::Skip {
                path: path.to_path_buf(),
                size,
            });
        }

        let truncated = size > self.max_bytes;
        if truncated {
            bytes.truncate(self.max_bytes);
        }

        Ok(LoadOutcome::Usable(LoadedFile {
            path: path.to_path_buf(),
            content: bytes,
            truncated,
            size,
        }))
    }
}
