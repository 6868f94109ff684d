pub mod check;
pub mod clone;
pub mod init;
pub mod status;
pub mod update;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use fleet_core::{config, registry, workspace, IgnorePatterns, Registry, WorkspaceConfig};

/// Everything a command needs about the workspace it runs in.
///
/// Built once per invocation: locate the root from the current directory,
/// layer the configuration, then read the project and ignore lists.
pub struct Workspace {
    pub root: PathBuf,
    pub config: WorkspaceConfig,
    pub registry: Registry,
    pub ignore: IgnorePatterns,
}

impl Workspace {
    pub fn open() -> Result<Self> {
        let cwd = std::env::current_dir().context("cannot determine current directory")?;
        Self::open_from(&cwd)
    }

    pub fn open_from(start: &Path) -> Result<Self> {
        let user = config::load_user().context("failed to load user configuration")?;
        let root = workspace::find_root(start, &user)?;
        let config = config::load(&root)
            .with_context(|| format!("failed to load configuration for {}", root.display()))?;
        let registry = registry::load_at(&root, &config).with_context(|| {
            format!(
                "failed to read project list {}",
                config.project_file_path(&root).display()
            )
        })?;
        let ignore = registry::load_ignore_at(&root, &config).with_context(|| {
            format!(
                "failed to read ignore list {}",
                config.ignore_file_path(&root).display()
            )
        })?;
        tracing::debug!(
            root = %root.display(),
            projects = registry.len(),
            patterns = ignore.len(),
            "workspace opened"
        );
        Ok(Self {
            root,
            config,
            registry,
            ignore,
        })
    }

    /// Worker count: `--jobs` if given, otherwise the configured value.
    pub fn jobs(&self, flag: Option<usize>) -> usize {
        flag.unwrap_or(self.config.jobs).max(1)
    }
}
