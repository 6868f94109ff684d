//! Clone declared repositories that are absent on disk.
//!
//! Fail-fast: the first clone failure stops the flow, leaving later projects
//! unvisited. Failing to add the upstream remote of a fresh clone is recorded
//! on that entry and does not stop the flow.

use std::path::Path;

use fleet_core::{registry::Registry, types::ProjectPath};

use crate::error::{GitError, SyncError};
use crate::git::{Git, UPSTREAM};

/// What happened to one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// Directory already present; nothing done.
    AlreadyPresent,
    /// Freshly cloned. `upstream` is `None` when no upstream is declared.
    Cloned {
        upstream: Option<Result<(), GitError>>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateEntry {
    pub path: ProjectPath,
    pub outcome: UpdateOutcome,
}

/// Clone every project in `paths` that is missing under `root`.
///
/// `on_entry` sees each entry as soon as it is done, so callers can report
/// progress before a later failure aborts the run.
pub fn update_with<G, F>(
    git: &G,
    root: &Path,
    registry: &Registry,
    paths: &[ProjectPath],
    mut on_entry: F,
) -> Result<Vec<UpdateEntry>, SyncError>
where
    G: Git + ?Sized,
    F: FnMut(&UpdateEntry),
{
    let mut entries = Vec::with_capacity(paths.len());
    for path in paths {
        let Some(project) = registry.get(path) else {
            tracing::warn!(path = %path, "not a registered project; skipping");
            continue;
        };

        let dir = path.to_path(root);
        let outcome = if dir.exists() {
            UpdateOutcome::AlreadyPresent
        } else {
            git.clone_repo(&project.origin_url, &dir)
                .map_err(|source| SyncError::Clone {
                    path: path.clone(),
                    source,
                })?;
            let upstream = project
                .upstream_url
                .as_deref()
                .map(|url| git.add_remote(&dir, UPSTREAM, url));
            UpdateOutcome::Cloned { upstream }
        };

        let entry = UpdateEntry {
            path: path.clone(),
            outcome,
        };
        on_entry(&entry);
        entries.push(entry);
    }
    Ok(entries)
}
