//! Locating the workspace root.

use std::path::{Path, PathBuf};

use crate::config::WorkspaceConfig;
use crate::error::RegistryError;

/// Walk from `start` up to the filesystem root and return the first directory
/// holding the project list.
///
/// Returns [`RegistryError::NotAWorkspace`] when none is found.
pub fn find_root(start: &Path, config: &WorkspaceConfig) -> Result<PathBuf, RegistryError> {
    for dir in start.ancestors() {
        if config.project_file_path(dir).is_file() {
            tracing::debug!(root = %dir.display(), "found workspace root");
            return Ok(dir.to_path_buf());
        }
    }
    Err(RegistryError::NotAWorkspace {
        start: start.to_path_buf(),
        project_file: config.project_file.clone(),
    })
}
