//! Repository discovery for `fleet-detector`.
//!
//! `discover_repositories(root)` walks the workspace and returns every
//! directory that directly contains a `.git` directory, keeping only the
//! outermost one when repositories are nested.

use std::path::{Component, Path, PathBuf};

use fleet_core::paths::dedup_nested;
use fleet_core::types::ProjectPath;
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Name of the git control directory.
pub const GIT_DIR: &str = ".git";

// ---------------------------------------------------------------------------
// Public types
// ---------------------------------------------------------------------------

/// Errors from repository discovery.
#[derive(Debug, Error)]
pub enum DetectError {
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("path {path} is not valid UTF-8")]
    NonUtf8Path { path: PathBuf },
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Find every repository below `root` (the root itself excluded), deduplicated
/// so that no returned path lies inside another one. Output is sorted.
pub fn discover_repositories(root: &Path) -> Result<Vec<ProjectPath>, DetectError> {
    let mut candidates = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !is_git_dir(e));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            // Unreadable subtrees are skipped rather than failing the whole walk.
            Err(err) if err.depth() > 0 && err.io_error().is_some() => {
                tracing::warn!(error = %err, "skipping unreadable directory");
                continue;
            }
            Err(source) => {
                return Err(DetectError::Walk {
                    path: root.to_path_buf(),
                    source,
                })
            }
        };
        if entry.depth() == 0 || !entry.file_type().is_dir() {
            continue;
        }
        if entry.path().join(GIT_DIR).is_dir() {
            let rel = relative_project_path(root, entry.path())?;
            tracing::debug!(path = %rel, "found repository");
            candidates.push(rel);
        }
    }

    Ok(dedup_nested(candidates))
}

/// `true` when `dir` directly contains a `.git` directory.
pub fn is_repository(dir: &Path) -> bool {
    dir.join(GIT_DIR).is_dir()
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn is_git_dir(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name() == GIT_DIR
}

/// `/`-joined path of `path` relative to `root`.
fn relative_project_path(root: &Path, path: &Path) -> Result<ProjectPath, DetectError> {
    let rel = path.strip_prefix(root).unwrap_or(path);
    let mut parts = Vec::new();
    for component in rel.components() {
        if let Component::Normal(part) = component {
            let part = part.to_str().ok_or_else(|| DetectError::NonUtf8Path {
                path: path.to_path_buf(),
            })?;
            parts.push(part);
        }
    }
    Ok(ProjectPath::from(parts.join("/")))
}
