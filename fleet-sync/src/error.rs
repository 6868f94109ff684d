//! Error types for fleet-sync.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use fleet_core::types::ProjectPath;

/// A git invocation that failed outside its modelled success/failure contract.
///
/// Recorded inline in the report of the affected repository or branch.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("git {operation} failed in {path}: {message}")]
pub struct GitError {
    pub operation: String,
    pub path: PathBuf,
    pub message: String,
}

impl GitError {
    pub fn new(
        operation: impl Into<String>,
        path: impl Into<PathBuf>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation: operation.into(),
            path: path.into(),
            message: message.into(),
        }
    }
}

/// All errors that abort a sync-level command.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Cloning a repository failed; the update flow stops here.
    #[error("failed to clone {path}: {source}")]
    Clone {
        path: ProjectPath,
        #[source]
        source: GitError,
    },

    /// The worker pool could not be created.
    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}
