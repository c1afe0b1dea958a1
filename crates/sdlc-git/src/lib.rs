#![deny(unsafe_code)]
#![warn(missing_docs)]
//! sdlc-git
//!
//! Thin wrapper over the `git` subprocess for the VCS probing primitives the
//! lifecycle engine needs: HEAD commit, dirty flag, and the list of files
//! changed since a bead started. Never used for anything else — the engine
//! does not shell out to run user commands beyond acceptance checks, which
//! live in `sdlc-gates`/`sdlc-engine`, not here.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};

/// Initializes a git repo at `path` with a baseline commit if one does not
/// already exist. Used by test fixtures and first-run repo bootstrap; a
/// no-op if `.git` is already present.
pub fn ensure_git_repo(path: &Path) {
    if path.join(".git").exists() {
        return;
    }

    let _ = Command::new("git").args(["init", "-q"]).current_dir(path).status();
    let _ = Command::new("git").args(["add", "-A"]).current_dir(path).status();
    let _ = Command::new("git")
        .args([
            "-c",
            "user.name=sdlc",
            "-c",
            "user.email=sdlc@local",
            "commit",
            "-qm",
            "baseline",
        ])
        .current_dir(path)
        .status();
}

/// The current `HEAD` commit hash, if the repo has one.
pub fn head(repo_root: &Path) -> Option<String> {
    run_git(repo_root, &["rev-parse", "HEAD"]).ok().map(|s| s.trim().to_string())
}

/// `true` when the working tree has uncommitted changes (tracked or
/// untracked).
pub fn is_dirty(repo_root: &Path) -> Option<bool> {
    run_git(repo_root, &["status", "--porcelain=v1"]).ok().map(|s| !s.trim().is_empty())
}

/// Returns the porcelain v1 status output for the repo at `path`, if
/// available.
pub fn git_status(path: &Path) -> Option<String> {
    run_git(path, &["status", "--porcelain=v1"]).ok()
}

/// Returns the unified diff output for the repo at `path`, if available.
pub fn git_diff(path: &Path) -> Option<String> {
    run_git(path, &["diff", "--no-color"]).ok()
}

/// Normalized, repo-relative paths of files that differ between `since`
/// (a commit-ish) and the current working tree, including untracked files.
/// Returns `None` when `since` is unresolvable or `git` is unavailable.
pub fn changed_files_since(repo_root: &Path, since: &str) -> Option<Vec<String>> {
    let mut files = std::collections::BTreeSet::new();

    if let Ok(out) = run_git(repo_root, &["diff", "--name-only", since]) {
        files.extend(out.lines().filter(|l| !l.is_empty()).map(|l| l.to_string()));
    } else {
        return None;
    }

    if let Ok(out) = run_git(repo_root, &["ls-files", "--others", "--exclude-standard"]) {
        files.extend(out.lines().filter(|l| !l.is_empty()).map(|l| l.to_string()));
    }

    Some(files.into_iter().collect())
}

/// Normalized, repo-relative paths of every file currently touched relative
/// to `HEAD` (tracked changes plus untracked files) — used when no specific
/// starting commit is recorded.
pub fn changed_files_working_tree(repo_root: &Path) -> Option<Vec<String>> {
    changed_files_since(repo_root, "HEAD")
}

fn run_git(path: &Path, args: &[&str]) -> Result<String> {
    let out = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .with_context(|| format!("run git {args:?}"))?;

    if !out.status.success() {
        anyhow::bail!("git {:?} failed (code={:?})", args, out.status.code());
    }

    Ok(String::from_utf8_lossy(&out.stdout).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn init_repo() -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), "one").unwrap();
        ensure_git_repo(dir.path());
        dir
    }

    #[test]
    fn head_resolves_after_baseline_commit() {
        let dir = init_repo();
        assert!(head(dir.path()).is_some());
    }

    #[test]
    fn dirty_flag_reflects_working_tree_state() {
        let dir = init_repo();
        assert_eq!(is_dirty(dir.path()), Some(false));
        fs::write(dir.path().join("a.txt"), "changed").unwrap();
        assert_eq!(is_dirty(dir.path()), Some(true));
    }

    #[test]
    fn changed_files_includes_untracked() {
        let dir = init_repo();
        let head_commit = head(dir.path()).unwrap();
        fs::write(dir.path().join("b.txt"), "new file").unwrap();
        let files = changed_files_since(dir.path(), &head_commit).unwrap();
        assert!(files.contains(&"b.txt".to_string()));
    }

    #[test]
    fn missing_repo_returns_none() {
        let dir = tempdir().unwrap();
        assert_eq!(head(dir.path()), None);
    }
}
