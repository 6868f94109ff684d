//! # fleet-sync
//!
//! Git facade, per-repository sync state machine and workspace aggregation.
//!
//! Call [`pipeline::run`] to reconcile every active repository in a workspace,
//! or [`engine::reconcile`] for a single one. [`update::update_with`] clones
//! repositories that are declared but absent.

pub mod engine;
pub mod error;
pub mod git;
pub mod pipeline;
pub mod update;
pub mod verdict;

#[cfg(test)]
pub(crate) mod fake;

pub use engine::{BranchReport, Mode, RepositoryReport, SyncState, WorkingTreeState};
pub use error::{GitError, SyncError};
pub use git::{Git, SystemGit};
pub use verdict::WorkspaceVerdict;
