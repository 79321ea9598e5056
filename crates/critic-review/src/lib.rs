//! Per-file AI review for pull requests.
//!
//! Provides the review pipeline: changed-file selection, content loading
//! and truncation, the LLM client and prompts, and GitHub comment posting.

pub mod github;
pub mod llm;
pub mod loader;
pub mod pipeline;
pub mod prompt;
pub mod select;
