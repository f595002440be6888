//! Git helpers for picking the commit to watch.

use std::path::Path;
use std::process::Command;

use crate::domain::{Result, WatchError};

/// Capture the HEAD commit SHA from a git repository.
///
/// Runs `git rev-parse HEAD` in the given directory. Returns an error if the
/// directory is not inside a git repository or if git is not available.
pub fn capture_head_sha(repo_dir: &Path) -> Result<String> {
    rev_parse(repo_dir, "HEAD")
}

/// Resolve the commit to watch.
///
/// A full 40-character SHA is used verbatim so the watcher also works outside
/// a checkout. Anything else (short SHA, branch, `HEAD~1`) is resolved with
/// `git rev-parse` in `repo_dir`; `None` means `HEAD`.
pub fn resolve_commit(repo_dir: &Path, revision: Option<&str>) -> Result<String> {
    match revision.map(str::trim) {
        Some(rev) if is_full_sha(rev) => Ok(rev.to_ascii_lowercase()),
        Some(rev) if !rev.is_empty() => rev_parse(repo_dir, &format!("{rev}^{{commit}}")),
        _ => capture_head_sha(repo_dir),
    }
}

fn is_full_sha(rev: &str) -> bool {
    rev.len() == 40 && rev.chars().all(|c| c.is_ascii_hexdigit())
}

fn rev_parse(repo_dir: &Path, rev: &str) -> Result<String> {
    let output = Command::new("git")
        .args(["rev-parse", "--verify", rev])
        .current_dir(repo_dir)
        .output()
        .map_err(|e| WatchError::GitError(format!("failed to run git: {e}")))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(WatchError::GitError(format!(
            "git rev-parse {rev} failed: {}",
            stderr.trim()
        )));
    }

    let sha = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if sha.is_empty() {
        return Err(WatchError::GitError(format!(
            "git rev-parse {rev} returned empty output"
        )));
    }

    Ok(sha)
}
