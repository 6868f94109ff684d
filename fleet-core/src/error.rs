//! Error types for fleet-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from registry, config and workspace operations.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Underlying I/O failure, annotated with the offending path.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on config load; includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// A line of the ignore list is not a valid regular expression.
    #[error("invalid ignore pattern on line {line}: '{pattern}': {source}")]
    InvalidPattern {
        line: usize,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// No project list was found walking up from `start` to the filesystem root.
    #[error("not inside a workspace: no {project_file} found above {start}")]
    NotAWorkspace { start: PathBuf, project_file: String },

    /// `init` refuses to overwrite an existing project list.
    #[error("project list already exists at {path}")]
    AlreadyInitialized { path: PathBuf },

    /// The field separator must be a single non-whitespace character.
    #[error("invalid field separator '{0}'")]
    InvalidSeparator(char),
}

/// Convenience constructor for [`RegistryError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> RegistryError {
    RegistryError::Io {
        path: path.into(),
        source,
    }
}
