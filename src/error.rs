//! Error type shared by every command.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, GraphError>;

/// Structural failures that end a command.
///
/// File-level problems (one unreadable source, one failed embedding) are
/// logged and skipped where they happen and never become a `GraphError`.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A required input file or directory does not exist.
    #[error("Missing input: {}", .0.display())]
    MissingInput(PathBuf),

    /// An input exists but could not be read or decoded.
    #[error("Malformed input {}: {reason}", path.display())]
    MalformedInput {
        /// Offending file.
        path: PathBuf,
        /// What was wrong with it.
        reason: String,
    },

    /// An output could not be written.
    #[error("Failed to write {}: {reason}", path.display())]
    Write {
        /// Target file.
        path: PathBuf,
        /// Underlying failure.
        reason: String,
    },

    /// The embedding service, vector store or git failed.
    #[error("Remote error: {0}")]
    Remote(String),

    /// Invalid command-line usage or configuration.
    #[error("{0}")]
    Usage(String),
}

impl GraphError {
    /// Builds a [`GraphError::MalformedInput`].
    pub fn malformed(path: &Path, reason: impl ToString) -> Self {
        Self::MalformedInput { path: path.to_path_buf(), reason: reason.to_string() }
    }

    /// Builds a [`GraphError::Write`].
    pub fn write(path: &Path, reason: impl ToString) -> Self {
        Self::Write { path: path.to_path_buf(), reason: reason.to_string() }
    }

    /// Builds a [`GraphError::Remote`] with context.
    pub fn remote(context: &str, reason: impl std::fmt::Display) -> Self {
        Self::Remote(format!("{context}: {reason}"))
    }

    /// Process exit code for this failure.
    ///
    /// The verifier maps input problems to 2 itself; everywhere else any
    /// failure is 1 and usage errors are 2, matching clap.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Usage(_) => ExitCode::from(2),
            _ => ExitCode::FAILURE,
        }
    }
}
