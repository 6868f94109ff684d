//! In-memory [`Git`] used by unit tests.
//!
//! Each repository is keyed by its directory. `origin` is the state of the
//! remote itself; `tracking` is the locally known `origin/<branch>` refs that
//! `fetch` refreshes.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::GitError;
use crate::git::{Branch, Git, Remote};

#[derive(Debug, Clone, Default)]
pub struct FakeRepo {
    pub current: Option<String>,
    pub local: BTreeMap<String, String>,
    pub tracking: BTreeMap<String, String>,
    pub origin: BTreeMap<String, String>,
    pub unresolvable: BTreeSet<String>,
    pub unstaged: bool,
    pub staged: bool,
    pub untracked: bool,
    pub remotes: Vec<Remote>,
    pub failing: BTreeSet<String>,
}

impl FakeRepo {
    pub fn on(branch: &str) -> Self {
        Self {
            current: Some(branch.to_string()),
            ..Self::default()
        }
    }

    pub fn detached() -> Self {
        Self::default()
    }

    /// Local branch at `local`; when `tracking` is set, both `origin/<name>`
    /// and the remote itself point there.
    pub fn branch(mut self, name: &str, local: &str, tracking: Option<&str>) -> Self {
        self.local.insert(name.to_string(), local.to_string());
        if let Some(hash) = tracking {
            self.tracking.insert(name.to_string(), hash.to_string());
            self.origin.insert(name.to_string(), hash.to_string());
        }
        self
    }

    /// The remote advanced without the local tracking ref knowing.
    pub fn origin_moves(mut self, name: &str, hash: &str) -> Self {
        self.origin.insert(name.to_string(), hash.to_string());
        self
    }

    /// Listed by `git branch` but `rev-parse` fails on it.
    pub fn unresolvable(mut self, name: &str) -> Self {
        self.unresolvable.insert(name.to_string());
        self
    }

    pub fn dirty(mut self, unstaged: bool, staged: bool, untracked: bool) -> Self {
        self.unstaged = unstaged;
        self.staged = staged;
        self.untracked = untracked;
        self
    }

    pub fn remote(mut self, name: &str, url: &str) -> Self {
        self.remotes.push(Remote {
            name: name.to_string(),
            url: url.to_string(),
        });
        self
    }

    /// Make every call of `operation` fail.
    pub fn failing(mut self, operation: &str) -> Self {
        self.failing.insert(operation.to_string());
        self
    }
}

#[derive(Debug, Default)]
pub struct FakeGit {
    repos: Mutex<BTreeMap<PathBuf, FakeRepo>>,
    sources: Mutex<BTreeMap<String, FakeRepo>>,
    failing_urls: Mutex<BTreeSet<String>>,
    calls: Mutex<Vec<String>>,
}

impl FakeGit {
    pub fn insert(&self, dir: PathBuf, repo: FakeRepo) {
        self.repos.lock().expect("lock").insert(dir, repo);
    }

    /// What a clone of `url` produces.
    pub fn source(&self, url: &str, repo: FakeRepo) {
        self.sources.lock().expect("lock").insert(url.to_string(), repo);
    }

    pub fn fail_clone(&self, url: &str) {
        self.failing_urls.lock().expect("lock").insert(url.to_string());
    }

    pub fn repo(&self, dir: &Path) -> Option<FakeRepo> {
        self.repos.lock().expect("lock").get(dir).cloned()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("lock").clone()
    }

    fn with_repo<T>(
        &self,
        dir: &Path,
        operation: &str,
        call: String,
        f: impl FnOnce(&mut FakeRepo) -> Result<T, GitError>,
    ) -> Result<T, GitError> {
        self.calls.lock().expect("lock").push(call);
        let mut repos = self.repos.lock().expect("lock");
        let repo = repos
            .get_mut(dir)
            .ok_or_else(|| GitError::new(operation, dir, "not a git repository"))?;
        if repo.failing.contains(operation) {
            return Err(GitError::new(operation, dir, "simulated failure"));
        }
        f(repo)
    }
}

impl Git for FakeGit {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        self.calls.lock().expect("lock").push(format!("clone {url}"));
        if self.failing_urls.lock().expect("lock").contains(url) {
            return Err(GitError::new("clone", dest, format!("repository '{url}' not found")));
        }
        std::fs::create_dir_all(dest)
            .map_err(|err| GitError::new("clone", dest, err.to_string()))?;
        let mut repo = self
            .sources
            .lock()
            .expect("lock")
            .get(url)
            .cloned()
            .unwrap_or_default();
        repo.remotes.push(Remote {
            name: "origin".to_string(),
            url: url.to_string(),
        });
        self.insert(dest.to_path_buf(), repo);
        Ok(())
    }

    fn add_remote(&self, repo: &Path, name: &str, url: &str) -> Result<(), GitError> {
        self.with_repo(repo, "remote add", format!("remote add {name}"), |r| {
            r.remotes.push(Remote {
                name: name.to_string(),
                url: url.to_string(),
            });
            Ok(())
        })
    }

    fn remotes(&self, repo: &Path) -> Result<Vec<Remote>, GitError> {
        self.with_repo(repo, "remote -v", "remote -v".to_string(), |r| Ok(r.remotes.clone()))
    }

    fn fetch(&self, repo: &Path) -> Result<bool, GitError> {
        self.with_repo(repo, "fetch", "fetch".to_string(), |r| {
            let changed = r.tracking != r.origin;
            r.tracking = r.origin.clone();
            Ok(changed)
        })
    }

    fn fetch_branch_into(&self, repo: &Path, branch: &str) -> Result<bool, GitError> {
        self.with_repo(repo, "fetch-into", format!("fetch-into {branch}"), |r| {
            let hash = r
                .origin
                .get(branch)
                .cloned()
                .ok_or_else(|| GitError::new("fetch-into", repo, "couldn't find remote ref"))?;
            r.tracking.insert(branch.to_string(), hash.clone());
            let previous = r.local.insert(branch.to_string(), hash.clone());
            Ok(previous.as_deref() != Some(hash.as_str()))
        })
    }

    fn fast_forward_current(&self, repo: &Path, branch: &str) -> Result<bool, GitError> {
        self.with_repo(repo, "pull", format!("pull {branch}"), |r| {
            let hash = r
                .origin
                .get(branch)
                .cloned()
                .ok_or_else(|| GitError::new("pull", repo, "couldn't find remote ref"))?;
            r.tracking.insert(branch.to_string(), hash.clone());
            let previous = r.local.insert(branch.to_string(), hash.clone());
            Ok(previous.as_deref() != Some(hash.as_str()))
        })
    }

    fn current_branch(&self, repo: &Path) -> Result<Option<String>, GitError> {
        self.with_repo(repo, "symbolic-ref", "symbolic-ref".to_string(), |r| {
            Ok(r.current.clone())
        })
    }

    fn list_branches(&self, repo: &Path) -> Result<Vec<Branch>, GitError> {
        self.with_repo(repo, "branch", "branch".to_string(), |r| {
            let names: BTreeSet<&String> = r.local.keys().chain(r.unresolvable.iter()).collect();
            Ok(names
                .into_iter()
                .map(|name| Branch {
                    name: name.clone(),
                    is_current: r.current.as_ref() == Some(name),
                })
                .collect())
        })
    }

    fn has_unstaged_changes(&self, repo: &Path) -> Result<bool, GitError> {
        self.with_repo(repo, "diff", "diff".to_string(), |r| Ok(r.unstaged))
    }

    fn has_staged_changes(&self, repo: &Path) -> Result<bool, GitError> {
        self.with_repo(repo, "diff --cached", "diff --cached".to_string(), |r| Ok(r.staged))
    }

    fn has_untracked_files(&self, repo: &Path) -> Result<bool, GitError> {
        self.with_repo(repo, "status", "status".to_string(), |r| Ok(r.untracked))
    }

    fn local_commit(&self, repo: &Path, branch: &str) -> Result<Option<String>, GitError> {
        self.with_repo(repo, "rev-parse", format!("rev-parse {branch}"), |r| {
            if r.unresolvable.contains(branch) {
                return Ok(None);
            }
            Ok(r.local.get(branch).cloned())
        })
    }

    fn remote_commit(&self, repo: &Path, branch: &str) -> Result<Option<String>, GitError> {
        self.with_repo(repo, "rev-parse", format!("rev-parse origin/{branch}"), |r| {
            Ok(r.tracking.get(branch).cloned())
        })
    }
}
