//! Repository discovery tests for `fleet-detector`.
//!
//! Each test builds its own `TempDir` layout.

use fleet_core::types::ProjectPath;
use fleet_detector::{discover_repositories, is_repository, GIT_DIR};
use rstest::rstest;
use std::fs;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_dir() -> TempDir {
    TempDir::new().expect("tempdir")
}

fn make_repo(dir: &TempDir, rel: &str) {
    fs::create_dir_all(dir.path().join(rel).join(GIT_DIR)).expect("create repo");
}

fn names(found: &[ProjectPath]) -> Vec<&str> {
    found.iter().map(ProjectPath::as_str).collect()
}

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

#[rstest]
#[case(&["proj", "proj/vendor"], &["proj"])]
#[case(&["a", "a/b", "ab"], &["a", "ab"])]
#[case(&["work/x", "work/y", "tools/z/deep"], &["tools/z/deep", "work/x", "work/y"])]
fn discovery_deduplicates_nested_repositories(#[case] repos: &[&str], #[case] expected: &[&str]) {
    let dir = make_dir();
    for repo in repos {
        make_repo(&dir, repo);
    }
    let found = discover_repositories(dir.path()).expect("discover");
    assert_eq!(names(&found), expected);
}

#[test]
fn plain_directories_are_not_repositories() {
    let dir = make_dir();
    fs::create_dir_all(dir.path().join("docs/notes")).expect("mkdir");
    make_repo(&dir, "code");
    let found = discover_repositories(dir.path()).expect("discover");
    assert_eq!(names(&found), ["code"]);
    assert!(!is_repository(&dir.path().join("docs")));
}

#[test]
fn git_file_is_not_a_control_directory() {
    let dir = make_dir();
    fs::create_dir_all(dir.path().join("worktree")).expect("mkdir");
    fs::write(dir.path().join("worktree").join(GIT_DIR), "gitdir: elsewhere\n").expect("write");
    let found = discover_repositories(dir.path()).expect("discover");
    assert!(found.is_empty());
}

#[test]
fn contents_of_git_directories_are_not_walked() {
    let dir = make_dir();
    make_repo(&dir, "lib");
    // A directory inside .git that itself looks like a repository.
    fs::create_dir_all(dir.path().join("lib/.git/modules/sub/.git")).expect("mkdir");
    let found = discover_repositories(dir.path()).expect("discover");
    assert_eq!(names(&found), ["lib"]);
}

#[test]
fn empty_workspace_finds_nothing() {
    let dir = make_dir();
    let found = discover_repositories(dir.path()).expect("discover");
    assert!(found.is_empty());
}
