//! Path and pattern utilities.
//!
//! - [`dedup_nested`] keeps only the outermost repositories of a candidate set.
//! - [`IgnorePatterns`] removes paths matching any ignore pattern.

use regex::Regex;

use crate::error::RegistryError;
use crate::types::ProjectPath;

// ---------------------------------------------------------------------------
// Nested-path deduplication
// ---------------------------------------------------------------------------

/// `true` when `child` lies strictly below `parent` on a `/` boundary.
///
/// `"a/b"` is below `"a"`; `"ab"` is not.
pub fn is_sub_path(child: &str, parent: &str) -> bool {
    child.len() > parent.len() + 1
        && child.starts_with(parent)
        && child.as_bytes()[parent.len()] == b'/'
}

/// Return the maximal elements of `paths` under the "is a sub-directory of"
/// relation, sorted lexicographically and without duplicates.
///
/// Idempotent: `dedup_nested(dedup_nested(x)) == dedup_nested(x)`.
pub fn dedup_nested<I>(paths: I) -> Vec<ProjectPath>
where
    I: IntoIterator<Item = ProjectPath>,
{
    let mut sorted: Vec<ProjectPath> = paths.into_iter().collect();
    sorted.sort();
    sorted.dedup();

    let mut kept: Vec<ProjectPath> = Vec::with_capacity(sorted.len());
    for candidate in sorted {
        // Every ancestor sorts before its descendants, so only kept entries
        // need checking; a dropped entry's own ancestor is already in `kept`.
        let nested = kept
            .iter()
            .take_while(|b| b.0 <= candidate.0)
            .any(|b| is_sub_path(&candidate.0, &b.0));
        if nested {
            tracing::debug!(path = %candidate, "dropping nested repository");
            continue;
        }
        kept.push(candidate);
    }
    kept
}

// ---------------------------------------------------------------------------
// Ignore patterns
// ---------------------------------------------------------------------------

/// Compiled ignore list. Each pattern is searched unanchored in a project path.
#[derive(Debug, Clone, Default)]
pub struct IgnorePatterns {
    patterns: Vec<Regex>,
}

impl IgnorePatterns {
    /// Parse an ignore list: one pattern per line; blank and `#` lines skipped.
    pub fn parse(text: &str) -> Result<Self, RegistryError> {
        let mut patterns = Vec::new();
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let regex = Regex::new(line).map_err(|source| RegistryError::InvalidPattern {
                line: idx + 1,
                pattern: line.to_string(),
                source,
            })?;
            patterns.push(regex);
        }
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// `true` if at least one pattern matches anywhere in `path`.
    pub fn is_ignored(&self, path: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(path))
    }

    /// Remove every ignored path, preserving the order of the survivors.
    pub fn exclude<'a, I>(&self, paths: I) -> Vec<ProjectPath>
    where
        I: IntoIterator<Item = &'a ProjectPath>,
    {
        paths
            .into_iter()
            .filter(|p| !self.is_ignored(p.as_str()))
            .cloned()
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
