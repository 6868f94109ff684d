//! Narrow, typed facade over the `git` executable.
//!
//! The sync engine depends only on the [`Git`] trait. [`SystemGit`] runs the
//! real toolchain with `git -C <repo> …`; tests substitute an in-memory fake.
//!
//! Exit-status contracts that carry meaning (e.g. `diff --exit-code` returning
//! 1, `rev-parse --verify -q` failing on a missing ref) are mapped to typed
//! values. Anything else becomes a [`GitError`].

use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use crate::error::GitError;

pub const ORIGIN: &str = "origin";
pub const UPSTREAM: &str = "upstream";

/// A local branch as listed by `git branch`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Branch {
    pub name: String,
    pub is_current: bool,
}

/// A configured remote (fetch URL).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remote {
    pub name: String,
    pub url: String,
}

/// Operations the sync engine, the update flow and `init` need from git.
pub trait Git: Send + Sync {
    /// `git clone <url> <dest>`
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError>;

    /// `git remote add <name> <url>`
    fn add_remote(&self, repo: &Path, name: &str, url: &str) -> Result<(), GitError>;

    /// `git remote -v`, fetch entries only.
    fn remotes(&self, repo: &Path) -> Result<Vec<Remote>, GitError>;

    /// `git fetch`; `true` if git reported anything (no output means no updates).
    fn fetch(&self, repo: &Path) -> Result<bool, GitError>;

    /// `git fetch origin <branch>:<branch>`; `true` if the local ref moved.
    fn fetch_branch_into(&self, repo: &Path, branch: &str) -> Result<bool, GitError>;

    /// `git pull --ff-only origin <branch>` on the checked-out branch;
    /// `false` when it was already up to date.
    fn fast_forward_current(&self, repo: &Path, branch: &str) -> Result<bool, GitError>;

    /// Checked-out branch, `None` on a detached HEAD.
    fn current_branch(&self, repo: &Path) -> Result<Option<String>, GitError>;

    /// Local branches in git's alphabetical order.
    fn list_branches(&self, repo: &Path) -> Result<Vec<Branch>, GitError>;

    fn has_unstaged_changes(&self, repo: &Path) -> Result<bool, GitError>;

    fn has_staged_changes(&self, repo: &Path) -> Result<bool, GitError>;

    fn has_untracked_files(&self, repo: &Path) -> Result<bool, GitError>;

    /// Hash of `refs/heads/<branch>`, `None` if it does not resolve.
    fn local_commit(&self, repo: &Path, branch: &str) -> Result<Option<String>, GitError>;

    /// Hash of `origin/<branch>`, `None` if it does not resolve.
    fn remote_commit(&self, repo: &Path, branch: &str) -> Result<Option<String>, GitError>;
}

// ---------------------------------------------------------------------------
// SystemGit
// ---------------------------------------------------------------------------

/// [`Git`] implementation that shells out to the `git` executable.
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: PathBuf,
}

impl Default for SystemGit {
    fn default() -> Self {
        Self {
            program: PathBuf::from("git"),
        }
    }
}

impl SystemGit {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `git -C <repo> <args>` and return the raw output, whatever the exit status.
    fn output<I, S>(&self, repo: &Path, operation: &str, args: I) -> Result<Output, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let mut cmd = Command::new(&self.program);
        cmd.arg("-C").arg(repo).args(args);
        tracing::debug!(repo = %repo.display(), operation, "running git");
        cmd.output()
            .map_err(|err| GitError::new(operation, repo, format!("failed to run git: {err}")))
    }

    /// Run and require success; returns stdout untouched, since leading
    /// columns carry meaning in `branch` and `status --porcelain` output.
    fn run<I, S>(&self, repo: &Path, operation: &str, args: I) -> Result<String, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.output(repo, operation, args)?;
        if !output.status.success() {
            return Err(failure(repo, operation, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// `diff --exit-code` style probe: 0 → `false`, 1 → `true`, else error.
    fn probe<I, S>(&self, repo: &Path, operation: &str, args: I) -> Result<bool, GitError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let output = self.output(repo, operation, args)?;
        match output.status.code() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(failure(repo, operation, &output)),
        }
    }

    /// `rev-parse --verify -q <reference>`: 0 → hash, 1 → `None`, else error.
    fn resolve(&self, repo: &Path, reference: &str) -> Result<Option<String>, GitError> {
        let output = self.output(repo, "rev-parse", ["rev-parse", "--verify", "-q", reference])?;
        match output.status.code() {
            Some(0) => Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string())),
            Some(1) => Ok(None),
            _ => Err(failure(repo, "rev-parse", &output)),
        }
    }
}

impl Git for SystemGit {
    fn clone_repo(&self, url: &str, dest: &Path) -> Result<(), GitError> {
        let output = Command::new(&self.program)
            .arg("clone")
            .arg(url)
            .arg(dest)
            .output()
            .map_err(|err| GitError::new("clone", dest, format!("failed to run git: {err}")))?;
        if !output.status.success() {
            return Err(failure(dest, "clone", &output));
        }
        tracing::info!(url, dest = %dest.display(), "cloned repository");
        Ok(())
    }

    fn add_remote(&self, repo: &Path, name: &str, url: &str) -> Result<(), GitError> {
        self.run(repo, "remote add", ["remote", "add", name, url])?;
        Ok(())
    }

    fn remotes(&self, repo: &Path) -> Result<Vec<Remote>, GitError> {
        let stdout = self.run(repo, "remote -v", ["remote", "-v"])?;
        Ok(parse_remotes(&stdout))
    }

    fn fetch(&self, repo: &Path) -> Result<bool, GitError> {
        let output = self.output(repo, "fetch", ["fetch"])?;
        if !output.status.success() {
            return Err(failure(repo, "fetch", &output));
        }
        // git reports ref updates on stderr.
        let had_updates = [&output.stdout, &output.stderr]
            .iter()
            .any(|stream| stream.iter().any(|b| !b.is_ascii_whitespace()));
        Ok(had_updates)
    }

    fn fetch_branch_into(&self, repo: &Path, branch: &str) -> Result<bool, GitError> {
        let before = self.local_commit(repo, branch)?;
        let refspec = format!("{branch}:{branch}");
        self.run(repo, "fetch branch", ["fetch", ORIGIN, refspec.as_str()])?;
        let after = self.local_commit(repo, branch)?;
        Ok(before != after)
    }

    fn fast_forward_current(&self, repo: &Path, branch: &str) -> Result<bool, GitError> {
        let before = self.local_commit(repo, branch)?;
        self.run(repo, "pull --ff-only", ["pull", "--ff-only", "--no-rebase", ORIGIN, branch])?;
        let after = self.local_commit(repo, branch)?;
        Ok(before != after)
    }

    fn current_branch(&self, repo: &Path) -> Result<Option<String>, GitError> {
        let output = self.output(repo, "symbolic-ref", ["symbolic-ref", "--short", "-q", "HEAD"])?;
        match output.status.code() {
            Some(0) => Ok(Some(String::from_utf8_lossy(&output.stdout).trim().to_string())),
            Some(1) => Ok(None),
            _ => Err(failure(repo, "symbolic-ref", &output)),
        }
    }

    fn list_branches(&self, repo: &Path) -> Result<Vec<Branch>, GitError> {
        let stdout = self.run(
            repo,
            "branch",
            ["branch", "--list", "--no-color", "--no-column"],
        )?;
        Ok(parse_branches(&stdout))
    }

    fn has_unstaged_changes(&self, repo: &Path) -> Result<bool, GitError> {
        self.probe(repo, "diff", ["diff", "--quiet", "--exit-code"])
    }

    fn has_staged_changes(&self, repo: &Path) -> Result<bool, GitError> {
        self.probe(repo, "diff --cached", ["diff", "--cached", "--quiet", "--exit-code"])
    }

    fn has_untracked_files(&self, repo: &Path) -> Result<bool, GitError> {
        let stdout = self.run(repo, "status", ["status", "--porcelain"])?;
        Ok(stdout.lines().any(|line| line.starts_with("??")))
    }

    fn local_commit(&self, repo: &Path, branch: &str) -> Result<Option<String>, GitError> {
        self.resolve(repo, &format!("refs/heads/{branch}"))
    }

    fn remote_commit(&self, repo: &Path, branch: &str) -> Result<Option<String>, GitError> {
        self.resolve(repo, &format!("refs/remotes/{ORIGIN}/{branch}"))
    }
}

// ---------------------------------------------------------------------------
// Output parsing
// ---------------------------------------------------------------------------

/// Parse `git branch --list` output. Each line starts with a two-column
/// marker: `* ` for the checked-out branch, `+ ` for one checked out in
/// another worktree, two spaces otherwise. Detached-HEAD pseudo entries are
/// skipped.
pub fn parse_branches(stdout: &str) -> Vec<Branch> {
    stdout
        .lines()
        .filter_map(|line| {
            let (is_current, name) = if let Some(name) = line.strip_prefix("* ") {
                (true, name)
            } else {
                let name = line
                    .strip_prefix("+ ")
                    .or_else(|| line.strip_prefix("  "))
                    .unwrap_or(line);
                (false, name)
            };
            let name = name.trim();
            if name.is_empty() || name.starts_with('(') {
                return None;
            }
            Some(Branch {
                name: name.to_string(),
                is_current,
            })
        })
        .collect()
}

/// Parse `git remote -v` output, keeping `(fetch)` URLs only.
pub fn parse_remotes(stdout: &str) -> Vec<Remote> {
    stdout
        .lines()
        .filter_map(|line| {
            let mut parts = line.split_whitespace();
            let name = parts.next()?;
            let url = parts.next()?;
            let kind = parts.next().unwrap_or("(fetch)");
            (kind == "(fetch)").then(|| Remote {
                name: name.to_string(),
                url: url.to_string(),
            })
        })
        .collect()
}

fn failure(repo: &Path, operation: &str, output: &Output) -> GitError {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let message = if stderr.is_empty() {
        format!("exited with {}", output.status)
    } else {
        stderr
    };
    GitError::new(operation, repo, message)
}
