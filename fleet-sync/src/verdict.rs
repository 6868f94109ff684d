//! Folding many repository reports into one workspace verdict.

use serde::Serialize;

use crate::engine::{BranchReport, RepositoryReport, SyncState};

/// Workspace-level outcome of a status-type command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WorkspaceVerdict {
    pub up_to_date: bool,
}

impl WorkspaceVerdict {
    /// Process exit status: `0` when up to date, `1` otherwise.
    pub fn exit_code(self) -> u8 {
        if self.up_to_date {
            0
        } else {
            1
        }
    }
}

impl BranchReport {
    /// Clean (or not the checked-out branch), in sync or benignly unknown, no error.
    pub fn is_up_to_date(&self) -> bool {
        let tree_ok = self.working_tree.map_or(true, |state| state.is_clean());
        let sync_ok = !matches!(self.sync, Some(SyncState::OutOfSync | SyncState::NoRemote));
        tree_ok && sync_ok && self.error.is_none()
    }
}

impl RepositoryReport {
    pub fn is_up_to_date(&self) -> bool {
        self.exists && self.error.is_none() && self.branches.iter().all(BranchReport::is_up_to_date)
    }
}

/// `up_to_date` is false if any repository is missing, any working tree is
/// dirty, any branch is `OutOfSync`/`NoRemote`, or any git call failed.
pub fn aggregate<'a, I>(reports: I) -> WorkspaceVerdict
where
    I: IntoIterator<Item = &'a RepositoryReport>,
{
    WorkspaceVerdict {
        up_to_date: reports.into_iter().all(RepositoryReport::is_up_to_date),
    }
}
