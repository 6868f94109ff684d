//! Domain types for the fleet registry.
//!
//! Project identities are workspace-relative, `/`-separated strings wrapped in
//! [`ProjectPath`]; they are turned into filesystem paths only at the edges via
//! [`ProjectPath::to_path`].

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed, workspace-relative project path (e.g. `"libs/core"`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectPath(pub String);

impl ProjectPath {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Resolve against the workspace root.
    pub fn to_path(&self, root: &Path) -> PathBuf {
        self.0.split('/').fold(root.to_path_buf(), |acc, part| acc.join(part))
    }
}

impl fmt::Display for ProjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ProjectPath {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ProjectPath {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// One managed repository, as declared in the project list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub path: ProjectPath,
    pub origin_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upstream_url: Option<String>,
}

/// Verification outcome for a single path in `discovered ∪ registered`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    /// Registered, not ignored, present on disk.
    Known,
    /// Matches an ignore pattern.
    Ignored,
    /// Present on disk but never registered.
    Unknown,
    /// Registered, not ignored, absent on disk.
    Missing,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classification::Known => write!(f, "known"),
            Classification::Ignored => write!(f, "ignored"),
            Classification::Unknown => write!(f, "unknown"),
            Classification::Missing => write!(f, "missing"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
