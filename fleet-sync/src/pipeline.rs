//! Shared entrypoint for the status-type commands (`status`, `fetch`, `ff`).

use std::path::Path;

use rayon::prelude::*;

use fleet_core::{
    paths::{is_sub_path, IgnorePatterns},
    registry::Registry,
    types::ProjectPath,
};

use crate::engine::{reconcile, Mode, RepositoryReport};
use crate::error::SyncError;
use crate::git::Git;
use crate::verdict::{aggregate, WorkspaceVerdict};

/// Which projects a run covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every registered, non-ignored project.
    All,
    /// Only the named projects and anything registered below them.
    Only(Vec<ProjectPath>),
}

impl Scope {
    /// Active paths for this scope, in lexicographic order.
    pub fn select(&self, registry: &Registry, ignore: &IgnorePatterns) -> Vec<ProjectPath> {
        let active = registry.active_paths(ignore);
        match self {
            Scope::All => active,
            Scope::Only(wanted) => active
                .into_iter()
                .filter(|path| {
                    wanted
                        .iter()
                        .any(|w| w == path || is_sub_path(path.as_str(), w.as_str()))
                })
                .collect(),
        }
    }
}

/// Reports for every visited repository plus the folded verdict.
#[derive(Debug, Clone)]
pub struct WorkspaceStatus {
    pub reports: Vec<RepositoryReport>,
    pub verdict: WorkspaceVerdict,
}

/// Reconcile `paths` under `root`.
///
/// With `jobs > 1` repositories are processed on a bounded rayon pool; the
/// reports come back in the order of `paths` either way.
pub fn run<G>(
    git: &G,
    root: &Path,
    paths: &[ProjectPath],
    mode: Mode,
    jobs: usize,
) -> Result<WorkspaceStatus, SyncError>
where
    G: Git + ?Sized,
{
    let reports: Vec<RepositoryReport> = if jobs <= 1 || paths.len() <= 1 {
        paths
            .iter()
            .map(|path| reconcile(git, root, path, mode))
            .collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.min(paths.len()))
            .build()?;
        pool.install(|| {
            paths
                .par_iter()
                .map(|path| reconcile(git, root, path, mode))
                .collect()
        })
    };

    let verdict = aggregate(&reports);
    tracing::debug!(
        repositories = reports.len(),
        up_to_date = verdict.up_to_date,
        mode = ?mode,
        "workspace reconciled"
    );
    Ok(WorkspaceStatus { reports, verdict })
}
