//! Project registry backed by a plain-text project list.
//!
//! # Storage layout
//!
//! ```text
//! <workspace>/
//!   .projects.fleet     (project list, one record per line)
//!   .ignore.fleet       (ignore list, one regex per line, optional)
//!   .fleet.yaml         (workspace config, optional)
//! ```
//!
//! # Record format
//!
//! ```text
//! <path> | <origin url> | <upstream url>
//! ```
//!
//! The separator is configurable ([`WorkspaceConfig::separator`]), fields are
//! trimmed, the upstream field is optional. Records with an empty path or
//! origin are skipped. Blank lines and `#` lines are comments.
//!
//! # API pattern
//!
//! File-backed functions take the workspace root explicitly (`fn_at(root, …)`);
//! tests always pass a `TempDir`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use crate::config::WorkspaceConfig;
use crate::error::{io_err, RegistryError};
use crate::paths::IgnorePatterns;
use crate::types::{Classification, Project, ProjectPath};

// ---------------------------------------------------------------------------
// 1. Registry value
// ---------------------------------------------------------------------------

/// Typed, ordered view over the declared projects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    projects: BTreeMap<ProjectPath, Project>,
}

impl Registry {
    /// Build from already-parsed projects. A repeated path keeps the last entry.
    pub fn from_projects<I>(projects: I) -> Self
    where
        I: IntoIterator<Item = Project>,
    {
        let mut map = BTreeMap::new();
        for project in projects {
            if let Some(previous) = map.insert(project.path.clone(), project) {
                tracing::warn!(path = %previous.path, "duplicate project entry; keeping the last one");
            }
        }
        Self { projects: map }
    }

    /// Parse the full text of a project list.
    pub fn parse(text: &str, separator: char) -> Self {
        Self::from_projects(text.lines().filter_map(|line| parse_record(line, separator)))
    }

    pub fn len(&self) -> usize {
        self.projects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    pub fn contains(&self, path: &ProjectPath) -> bool {
        self.projects.contains_key(path)
    }

    pub fn get(&self, path: &ProjectPath) -> Option<&Project> {
        self.projects.get(path)
    }

    pub fn origin(&self, path: &ProjectPath) -> Option<&str> {
        self.get(path).map(|p| p.origin_url.as_str())
    }

    pub fn upstream(&self, path: &ProjectPath) -> Option<&str> {
        self.get(path).and_then(|p| p.upstream_url.as_deref())
    }

    /// All registered paths in lexicographic order.
    pub fn paths(&self) -> impl Iterator<Item = &ProjectPath> {
        self.projects.keys()
    }

    /// All registered projects in lexicographic path order.
    pub fn projects(&self) -> impl Iterator<Item = &Project> {
        self.projects.values()
    }

    /// Registered paths minus those matching an ignore pattern, sorted.
    pub fn active_paths(&self, ignore: &IgnorePatterns) -> Vec<ProjectPath> {
        ignore.exclude(self.paths())
    }

    /// Classify every path in `discovered ∪ registered`.
    ///
    /// Must run on the unfiltered registry so ignored entries stay
    /// distinguishable from unknown ones. Decision order per path:
    /// ignored → `Ignored`; registered and present → `Known`; registered and
    /// absent → `Missing`; otherwise `Unknown`. The output is sorted by path
    /// and contains each path exactly once.
    ///
    /// Ignore matching takes precedence over registration: a discovered path
    /// that was never registered but matches a pattern is `Ignored`, not
    /// `Unknown`.
    pub fn classify<F>(
        &self,
        discovered: &[ProjectPath],
        ignore: &IgnorePatterns,
        exists: F,
    ) -> Vec<(ProjectPath, Classification)>
    where
        F: Fn(&ProjectPath) -> bool,
    {
        let universe: BTreeSet<&ProjectPath> = discovered.iter().chain(self.paths()).collect();
        universe
            .into_iter()
            .map(|path| {
                let class = if ignore.is_ignored(path.as_str()) {
                    Classification::Ignored
                } else if self.contains(path) {
                    if exists(path) {
                        Classification::Known
                    } else {
                        Classification::Missing
                    }
                } else {
                    Classification::Unknown
                };
                (path.clone(), class)
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// 2. Record format
// ---------------------------------------------------------------------------

/// Parse one project list line. Returns `None` for comments and malformed records.
pub fn parse_record(line: &str, separator: char) -> Option<Project> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }

    let mut fields = trimmed.split(separator).map(str::trim);
    let path = fields.next().unwrap_or_default().trim_end_matches('/');
    let origin = fields.next().unwrap_or_default();
    let upstream = fields.next().unwrap_or_default();

    if path.is_empty() || origin.is_empty() {
        tracing::debug!(record = %trimmed, "skipping record without path or origin");
        return None;
    }

    Some(Project {
        path: ProjectPath::from(path),
        origin_url: origin.to_string(),
        upstream_url: (!upstream.is_empty()).then(|| upstream.to_string()),
    })
}

/// Render one record; the upstream field is omitted when absent.
pub fn render_record(project: &Project, separator: char) -> String {
    match &project.upstream_url {
        Some(upstream) => format!(
            "{} {separator} {} {separator} {}",
            project.path, project.origin_url, upstream
        ),
        None => format!("{} {separator} {}", project.path, project.origin_url),
    }
}

/// Render a whole project list, one record per line in path order.
pub fn render(registry: &Registry, separator: char) -> String {
    let mut out = String::new();
    for project in registry.projects() {
        out.push_str(&render_record(project, separator));
        out.push('\n');
    }
    out
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Load `<root>/<project_file>`.
pub fn load_at(root: &Path, config: &WorkspaceConfig) -> Result<Registry, RegistryError> {
    let path = config.project_file_path(root);
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    let registry = Registry::parse(&contents, config.separator);
    tracing::debug!(path = %path.display(), projects = registry.len(), "loaded project list");
    Ok(registry)
}

/// Load `<root>/<ignore_file>`; a missing file means no patterns.
pub fn load_ignore_at(root: &Path, config: &WorkspaceConfig) -> Result<IgnorePatterns, RegistryError> {
    let path = config.ignore_file_path(root);
    if !path.exists() {
        return Ok(IgnorePatterns::default());
    }
    let contents = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
    IgnorePatterns::parse(&contents)
}

// ---------------------------------------------------------------------------
// 4. Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically write the project list: render → `<file>.tmp` → `rename`.
pub fn save_at(
    root: &Path,
    config: &WorkspaceConfig,
    registry: &Registry,
) -> Result<(), RegistryError> {
    let path = config.project_file_path(root);
    let tmp_path = root.join(format!("{}.tmp", config.project_file));
    std::fs::write(&tmp_path, render(registry, config.separator)).map_err(|e| io_err(&tmp_path, e))?;
    std::fs::rename(&tmp_path, &path).map_err(|e| io_err(&path, e))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// 5. Init
// ---------------------------------------------------------------------------

/// Create the project list at `root` from `projects`.
///
/// Returns [`RegistryError::AlreadyInitialized`] if a project list is present.
pub fn init_at<I>(root: &Path, config: &WorkspaceConfig, projects: I) -> Result<Registry, RegistryError>
where
    I: IntoIterator<Item = Project>,
{
    let path = config.project_file_path(root);
    if path.exists() {
        return Err(RegistryError::AlreadyInitialized { path });
    }
    let registry = Registry::from_projects(projects);
    save_at(root, config, &registry)?;
    Ok(registry)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
