//! Defines the custom error type for the `core` module.

use std::path::PathBuf;
use thiserror::Error;

/// The primary error type for the `core` module.
///
/// Only `Read` and `ContentUnavailable` occur per file; the batch processor
/// absorbs them and records the file with zero lines. Every other variant
/// aborts the current run or source collection.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The content of a single file could not be read.
    #[error("Failed to read file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A remote file was listed without its content being fetched.
    #[error("Content was not fetched for {0}")]
    ContentUnavailable(String),

    /// Represents an I/O error, typically from file system operations.
    #[error("I/O error for path {1}: {0}")]
    Io(#[source] std::io::Error, PathBuf),

    /// The directory walker failed while enumerating a local source.
    #[error("Directory walk failed: {0}")]
    Walk(#[from] ignore::Error),

    /// Represents an error that occurred when a Tokio task was joined.
    /// This is often due to a task panicking or being cancelled.
    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),

    /// A repository reference did not match any accepted form.
    #[error("Invalid repository URL: {0}")]
    InvalidRepositoryUrl(String),
}

impl CoreError {
    /// `true` for failures that only affect a single file's content.
    pub fn is_per_file(&self) -> bool {
        matches!(self, CoreError::Read { .. } | CoreError::ContentUnavailable(_))
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
