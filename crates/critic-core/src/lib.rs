//! Core types, configuration, and error handling for critic.
//!
//! This crate provides the shared foundation used by the review pipeline
//! and the `critic` binary:
//! - [`CriticError`] — unified error type using `thiserror`
//! - [`CriticConfig`] — configuration loaded from `.critic.toml` and the CI environment
//! - Shared types: [`LoadedFile`], [`LoadOutcome`], [`PullRequestRef`]

mod config;
mod error;
mod types;

pub use config::{CriticConfig, GitHubConfig, LlmConfig, ReviewConfig};
pub use error::CriticError;
pub use types::{LoadOutcome, LoadedFile, PullRequestRef};

/// A convenience `Result` type for critic operations.
pub type Result<T> = std::result::Result<T, CriticError>;
