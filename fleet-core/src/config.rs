//! Layered workspace configuration.
//!
//! # Layers (later wins)
//!
//! ```text
//! built-in defaults
//! ~/.fleet/config.yaml        (user)
//! <workspace>/.fleet.yaml     (workspace)
//! command-line flags          (applied by the CLI)
//! ```
//!
//! Every layer is optional. A file only needs to name the keys it overrides.
//!
//! # API pattern
//!
//! As in [`crate::registry`], loaders come in two forms: `fn_at(home, …)` with
//! an explicit home directory for tests, and a convenience wrapper deriving
//! home from `dirs::home_dir()`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{io_err, RegistryError};

pub const DEFAULT_PROJECT_FILE: &str = ".projects.fleet";
pub const DEFAULT_IGNORE_FILE: &str = ".ignore.fleet";
pub const DEFAULT_SEPARATOR: char = '|';
pub const WORKSPACE_CONFIG_FILE: &str = ".fleet.yaml";

/// Resolved configuration bundle, built once at startup and passed by reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkspaceConfig {
    /// File name of the project list, relative to the workspace root.
    pub project_file: String,
    /// File name of the ignore list, relative to the workspace root.
    pub ignore_file: String,
    /// Field separator of project list records.
    pub separator: char,
    /// Worker count for status-type commands; `1` runs sequentially.
    pub jobs: usize,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            project_file: DEFAULT_PROJECT_FILE.to_string(),
            ignore_file: DEFAULT_IGNORE_FILE.to_string(),
            separator: DEFAULT_SEPARATOR,
            jobs: 1,
        }
    }
}

/// One on-disk layer; every key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigLayer {
    project_file: Option<String>,
    ignore_file: Option<String>,
    separator: Option<char>,
    jobs: Option<usize>,
}

impl WorkspaceConfig {
    fn apply(&mut self, layer: ConfigLayer) {
        if let Some(v) = layer.project_file {
            self.project_file = v;
        }
        if let Some(v) = layer.ignore_file {
            self.ignore_file = v;
        }
        if let Some(v) = layer.separator {
            self.separator = v;
        }
        if let Some(v) = layer.jobs {
            self.jobs = v;
        }
    }

    fn validate(self) -> Result<Self, RegistryError> {
        if self.separator.is_whitespace() || self.separator == '#' {
            return Err(RegistryError::InvalidSeparator(self.separator));
        }
        Ok(Self {
            jobs: self.jobs.max(1),
            ..self
        })
    }

    /// `<root>/<project_file>`
    pub fn project_file_path(&self, root: &Path) -> PathBuf {
        root.join(&self.project_file)
    }

    /// `<root>/<ignore_file>`
    pub fn ignore_file_path(&self, root: &Path) -> PathBuf {
        root.join(&self.ignore_file)
    }
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `<home>/.fleet/config.yaml`. Pure, no I/O.
pub fn user_config_path_at(home: &Path) -> PathBuf {
    home.join(".fleet").join("config.yaml")
}

/// `<root>/.fleet.yaml`. Pure, no I/O.
pub fn workspace_config_path(root: &Path) -> PathBuf {
    root.join(WORKSPACE_CONFIG_FILE)
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Defaults overlaid with the user layer only. Used before the workspace root
/// is known, since the project file name decides where the root is.
pub fn load_user_at(home: Option<&Path>) -> Result<WorkspaceConfig, RegistryError> {
    let mut config = WorkspaceConfig::default();
    if let Some(home) = home {
        if let Some(layer) = read_layer(&user_config_path_at(home))? {
            config.apply(layer);
        }
    }
    config.validate()
}

/// `load_user_at` convenience wrapper.
pub fn load_user() -> Result<WorkspaceConfig, RegistryError> {
    load_user_at(dirs::home_dir().as_deref())
}

/// Defaults, then the user layer, then `<root>/.fleet.yaml`.
pub fn load_at(home: Option<&Path>, root: &Path) -> Result<WorkspaceConfig, RegistryError> {
    let mut config = load_user_at(home)?;
    if let Some(layer) = read_layer(&workspace_config_path(root))? {
        config.apply(layer);
    }
    config.validate()
}

/// `load_at` convenience wrapper.
pub fn load(root: &Path) -> Result<WorkspaceConfig, RegistryError> {
    load_at(dirs::home_dir().as_deref(), root)
}

fn read_layer(path: &Path) -> Result<Option<ConfigLayer>, RegistryError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path).map_err(|e| io_err(path, e))?;
    if contents.trim().is_empty() {
        return Ok(Some(ConfigLayer::default()));
    }
    tracing::debug!(path = %path.display(), "loading config layer");
    serde_yaml::from_str(&contents)
        .map(Some)
        .map_err(|source| RegistryError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
