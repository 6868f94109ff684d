//! Per-repository / per-branch sync state machine.
//!
//! For one repository:
//! 1. Absent on disk → `exists = false`, nothing else evaluated.
//! 2. No branches → `empty = true`.
//! 3. Working tree of the checked-out branch, first match wins:
//!    unstaged → staged → untracked → clean.
//! 4. Mode pre-step: `Fetch` fetches once; `FastForward` advances each branch
//!    (`pull --ff-only` for the current one, `fetch origin b:b` for others).
//! 5. Sync state of every branch except a dirty current one:
//!    unresolvable local ref → `Unknown`; no `origin/<b>` → `NoRemote`;
//!    equal hashes → `InSync`; otherwise `OutOfSync`.
//!
//! Git failures are recorded in the owning report and never abort the run.

use std::fmt;
use std::path::Path;

use serde::Serialize;

use fleet_core::types::ProjectPath;

use crate::error::GitError;
use crate::git::{Branch, Git};

// ---------------------------------------------------------------------------
// Report types
// ---------------------------------------------------------------------------

/// Which optional side effect runs before classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Status,
    Fetch,
    FastForward,
}

/// Working-tree state of the checked-out branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkingTreeState {
    Clean,
    DirtyUnstaged,
    DirtyStaged,
    DirtyUntracked,
}

impl WorkingTreeState {
    pub fn is_clean(self) -> bool {
        matches!(self, WorkingTreeState::Clean)
    }
}

impl fmt::Display for WorkingTreeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkingTreeState::Clean => write!(f, "Clean"),
            WorkingTreeState::DirtyUnstaged => write!(f, "Changes not staged"),
            WorkingTreeState::DirtyStaged => write!(f, "Changes to be committed"),
            WorkingTreeState::DirtyUntracked => write!(f, "Untracked files"),
        }
    }
}

/// Local branch vs. `origin/<branch>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncState {
    InSync,
    OutOfSync,
    NoRemote,
    /// The local ref did not resolve; benign, not counted as a problem.
    Unknown,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncState::InSync => write!(f, "In sync"),
            SyncState::OutOfSync => write!(f, "Not in sync"),
            SyncState::NoRemote => write!(f, "No remote branch"),
            SyncState::Unknown => write!(f, "Unknown"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BranchReport {
    pub name: String,
    pub is_current: bool,
    /// Only set for the checked-out branch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub working_tree: Option<WorkingTreeState>,
    /// `None` when skipped (dirty current branch) or when classification failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sync: Option<SyncState>,
    pub fast_forwarded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<GitError>,
}

impl BranchReport {
    fn new(branch: &Branch) -> Self {
        Self {
            name: branch.name.clone(),
            is_current: branch.is_current,
            working_tree: None,
            sync: None,
            fast_forwarded: false,
            error: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryReport {
    pub path: ProjectPath,
    pub exists: bool,
    pub empty: bool,
    /// `Some(had_updates)` after a successful fetch in [`Mode::Fetch`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched: Option<bool>,
    pub branches: Vec<BranchReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<GitError>,
}

impl RepositoryReport {
    fn new(path: ProjectPath) -> Self {
        Self {
            path,
            exists: true,
            empty: false,
            fetched: None,
            branches: Vec::new(),
            error: None,
        }
    }

    /// Report for a repository declared but absent on disk.
    pub fn missing(path: ProjectPath) -> Self {
        Self {
            exists: false,
            ..Self::new(path)
        }
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

/// Reconcile the repository at `<root>/<path>`.
pub fn reconcile<G>(git: &G, root: &Path, path: &ProjectPath, mode: Mode) -> RepositoryReport
where
    G: Git + ?Sized,
{
    let dir = path.to_path(root);
    if !dir.exists() {
        tracing::debug!(path = %path, "repository missing");
        return RepositoryReport::missing(path.clone());
    }

    let mut report = RepositoryReport::new(path.clone());

    let branches = match git.list_branches(&dir) {
        Ok(branches) => branches,
        Err(err) => {
            report.error = Some(err);
            return report;
        }
    };
    if branches.is_empty() {
        report.empty = true;
        return report;
    }

    let current = match git.current_branch(&dir) {
        Ok(current) => current,
        Err(err) => {
            report.error = Some(err);
            return report;
        }
    };
    let tree = current.as_ref().map(|_| working_tree_state(git, &dir));

    if mode == Mode::Fetch {
        match git.fetch(&dir) {
            Ok(had_updates) => report.fetched = Some(had_updates),
            Err(err) => report.error = Some(err),
        }
    }

    for branch in &branches {
        let is_current = current.as_deref() == Some(branch.name.as_str());
        let mut entry = BranchReport::new(branch);
        entry.is_current = is_current;

        if is_current {
            match &tree {
                Some(Ok(state)) => {
                    entry.working_tree = Some(*state);
                    if !state.is_clean() {
                        // The dirty state already explains any divergence.
                        report.branches.push(entry);
                        continue;
                    }
                }
                Some(Err(err)) => {
                    entry.error = Some(err.clone());
                    report.branches.push(entry);
                    continue;
                }
                None => {}
            }
        }

        if mode == Mode::FastForward {
            match fast_forward(git, &dir, &branch.name, is_current) {
                Ok(moved) => entry.fast_forwarded = moved,
                Err(err) => entry.error = Some(err),
            }
        }

        match sync_state(git, &dir, &branch.name) {
            Ok(state) => entry.sync = Some(state),
            Err(err) => {
                entry.error.get_or_insert(err);
            }
        }
        report.branches.push(entry);
    }

    report
}

/// Probe the working tree in strict priority order.
pub fn working_tree_state<G>(git: &G, dir: &Path) -> Result<WorkingTreeState, GitError>
where
    G: Git + ?Sized,
{
    if git.has_unstaged_changes(dir)? {
        return Ok(WorkingTreeState::DirtyUnstaged);
    }
    if git.has_staged_changes(dir)? {
        return Ok(WorkingTreeState::DirtyStaged);
    }
    if git.has_untracked_files(dir)? {
        return Ok(WorkingTreeState::DirtyUntracked);
    }
    Ok(WorkingTreeState::Clean)
}

/// Compare `refs/heads/<branch>` with `origin/<branch>`.
pub fn sync_state<G>(git: &G, dir: &Path, branch: &str) -> Result<SyncState, GitError>
where
    G: Git + ?Sized,
{
    let Some(local) = git.local_commit(dir, branch)? else {
        tracing::debug!(repo = %dir.display(), branch, "local ref does not resolve");
        return Ok(SyncState::Unknown);
    };
    let Some(remote) = git.remote_commit(dir, branch)? else {
        return Ok(SyncState::NoRemote);
    };
    Ok(if local == remote {
        SyncState::InSync
    } else {
        SyncState::OutOfSync
    })
}

/// Advance one branch from origin. Branches without `origin/<branch>` are left alone.
fn fast_forward<G>(git: &G, dir: &Path, branch: &str, is_current: bool) -> Result<bool, GitError>
where
    G: Git + ?Sized,
{
    if git.remote_commit(dir, branch)?.is_none() {
        return Ok(false);
    }
    let moved = if is_current {
        git.fast_forward_current(dir, branch)?
    } else {
        git.fetch_branch_into(dir, branch)?
    };
    if moved {
        tracing::info!(repo = %dir.display(), branch, "fast-forwarded");
    }
    Ok(moved)
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeGit, FakeRepo};
    use tempfile::TempDir;

    fn workspace(repos: &[(&str, FakeRepo)]) -> (TempDir, FakeGit) {
        let root = TempDir::new().expect("root");
        let git = FakeGit::default();
        for (path, repo) in repos {
            let dir = root.path().join(path);
            std::fs::create_dir_all(&dir).expect("mkdir");
            git.insert(dir, repo.clone());
        }
        (root, git)
    }

    fn run(root: &TempDir, git: &FakeGit, path: &str, mode: Mode) -> RepositoryReport {
        reconcile(git, root.path(), &ProjectPath::from(path), mode)
    }

    #[test]
    fn missing_directory_short_circuits() {
        let (root, git) = workspace(&[]);
        let report = run(&root, &git, "lib", Mode::Status);
        assert!(!report.exists);
        assert!(report.branches.is_empty());
        assert!(git.calls().is_empty(), "no git call for a missing repository");
    }

    #[test]
    fn clean_in_sync_main() {
        let repo = FakeRepo::on("main").branch("main", "a1", Some("a1"));
        let (root, git) = workspace(&[("lib", repo)]);
        let report = run(&root, &git, "lib", Mode::Status);

        assert_eq!(report.branches.len(), 1);
        let main = &report.branches[0];
        assert!(main.is_current);
        assert_eq!(main.working_tree, Some(WorkingTreeState::Clean));
        assert_eq!(main.sync, Some(SyncState::InSync));
    }

    #[test]
    fn empty_repository_is_flagged() {
        let (root, git) = workspace(&[("lib", FakeRepo::on("main"))]);
        let report = run(&root, &git, "lib", Mode::Status);
        assert!(report.empty);
        assert!(report.branches.is_empty());
    }

    #[test]
    fn sync_states_are_determined_by_hashes() {
        let repo = FakeRepo::on("main")
            .branch("main", "a1", Some("a1"))
            .branch("feature", "b1", Some("b2"))
            .branch("local-only", "c1", None)
            .unresolvable("ghost");
        let (root, git) = workspace(&[("lib", repo)]);
        let report = run(&root, &git, "lib", Mode::Status);

        let states: Vec<(&str, Option<SyncState>)> = report
            .branches
            .iter()
            .map(|b| (b.name.as_str(), b.sync))
            .collect();
        assert_eq!(
            states,
            vec![
                ("feature", Some(SyncState::OutOfSync)),
                ("ghost", Some(SyncState::Unknown)),
                ("local-only", Some(SyncState::NoRemote)),
                ("main", Some(SyncState::InSync)),
            ]
        );
        assert!(report.branches.iter().all(|b| b.is_current == (b.name == "main")));
        assert!(report
            .branches
            .iter()
            .filter(|b| !b.is_current)
            .all(|b| b.working_tree.is_none()));
    }

    #[test]
    fn working_tree_priority_unstaged_first() {
        let repo = FakeRepo::on("main")
            .branch("main", "a1", Some("a2"))
            .dirty(true, true, true);
        let (root, git) = workspace(&[("lib", repo)]);
        let report = run(&root, &git, "lib", Mode::Status);
        let main = &report.branches[0];
        assert_eq!(main.working_tree, Some(WorkingTreeState::DirtyUnstaged));
        assert_eq!(main.sync, None, "dirty current branch skips sync classification");
    }

    #[test]
    fn working_tree_priority_staged_then_untracked() {
        let staged = FakeRepo::on("main").branch("main", "a", Some("a")).dirty(false, true, true);
        let untracked = FakeRepo::on("main").branch("main", "a", Some("a")).dirty(false, false, true);
        let (root, git) = workspace(&[("s", staged), ("u", untracked)]);
        assert_eq!(
            run(&root, &git, "s", Mode::Status).branches[0].working_tree,
            Some(WorkingTreeState::DirtyStaged)
        );
        assert_eq!(
            run(&root, &git, "u", Mode::Status).branches[0].working_tree,
            Some(WorkingTreeState::DirtyUntracked)
        );
    }

    #[test]
    fn fetch_mode_updates_tracking_refs_before_classification() {
        let repo = FakeRepo::on("main")
            .branch("main", "a1", Some("a1"))
            .origin_moves("main", "a2");
        let (root, git) = workspace(&[("lib", repo)]);

        let report = run(&root, &git, "lib", Mode::Fetch);
        assert_eq!(report.fetched, Some(true));
        assert_eq!(report.branches[0].sync, Some(SyncState::OutOfSync));
        assert!(!report.branches[0].fast_forwarded);
    }

    #[test]
    fn fast_forward_mode_advances_current_and_other_branches() {
        let repo = FakeRepo::on("main")
            .branch("main", "a1", Some("a1"))
            .origin_moves("main", "a2")
            .branch("release", "r1", Some("r2"))
            .branch("scratch", "s1", None);
        let (root, git) = workspace(&[("lib", repo)]);

        let report = run(&root, &git, "lib", Mode::FastForward);
        let by_name = |name: &str| {
            report
                .branches
                .iter()
                .find(|b| b.name == name)
                .expect("branch present")
        };
        assert!(by_name("main").fast_forwarded);
        assert_eq!(by_name("main").sync, Some(SyncState::InSync));
        assert!(by_name("release").fast_forwarded);
        assert_eq!(by_name("release").sync, Some(SyncState::InSync));
        assert!(!by_name("scratch").fast_forwarded);
        assert_eq!(by_name("scratch").sync, Some(SyncState::NoRemote));

        let calls = git.calls();
        assert!(calls.iter().any(|c| c == "pull main"));
        assert!(calls.iter().any(|c| c == "fetch-into release"));
        assert!(!calls.iter().any(|c| c.ends_with("scratch") && c.starts_with("fetch-into")));
    }

    #[test]
    fn fast_forward_skips_dirty_current_branch() {
        let repo = FakeRepo::on("main")
            .branch("main", "a1", Some("a1"))
            .origin_moves("main", "a2")
            .dirty(false, false, true);
        let (root, git) = workspace(&[("lib", repo)]);

        let report = run(&root, &git, "lib", Mode::FastForward);
        assert!(!report.branches[0].fast_forwarded);
        assert!(!git.calls().iter().any(|c| c == "pull main"));
    }

    #[test]
    fn refused_fast_forward_is_recorded_on_the_branch() {
        let repo = FakeRepo::on("main")
            .branch("main", "a1", Some("a2"))
            .failing("pull");
        let (root, git) = workspace(&[("lib", repo)]);

        let report = run(&root, &git, "lib", Mode::FastForward);
        let main = &report.branches[0];
        assert!(main.error.is_some());
        assert_eq!(main.sync, Some(SyncState::OutOfSync));
    }

    #[test]
    fn branch_listing_failure_is_recorded_on_the_repository() {
        let repo = FakeRepo::on("main").branch("main", "a", Some("a")).failing("branch");
        let (root, git) = workspace(&[("lib", repo)]);
        let report = run(&root, &git, "lib", Mode::Status);
        assert!(report.exists);
        assert_eq!(report.error.as_ref().map(|e| e.operation.as_str()), Some("branch"));
    }

    #[test]
    fn detached_head_reports_no_working_tree() {
        let repo = FakeRepo::detached().branch("main", "a", Some("a"));
        let (root, git) = workspace(&[("lib", repo)]);
        let report = run(&root, &git, "lib", Mode::Status);
        assert!(!report.branches[0].is_current);
        assert_eq!(report.branches[0].working_tree, None);
        assert_eq!(report.branches[0].sync, Some(SyncState::InSync));
    }
}
