//! `gh run list` backend.
//!
//! Shells out to the GitHub CLI, which takes care of authentication and of
//! resolving the repository from the checkout it runs in.

use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use super::StatusSource;
use crate::domain::{Conclusion, Result, RunRecord, RunStatus, WatchError};

/// Fields requested from `gh run list --json`.
pub const GH_FIELDS: &str = "databaseId,status,conclusion,name,url";

/// Status source backed by the `gh` binary.
#[derive(Debug, Clone)]
pub struct GhCliSource {
    /// Path to the gh binary.
    pub binary_path: String,

    /// Explicit `owner/name`; when unset gh infers it from the checkout.
    pub repo: Option<String>,

    /// Directory gh runs in. Unset means the current directory.
    pub working_dir: Option<PathBuf>,
}

impl Default for GhCliSource {
    fn default() -> Self {
        Self {
            binary_path: "gh".to_string(),
            repo: None,
            working_dir: None,
        }
    }
}

/// One element of the `gh run list --json` array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GhRun {
    database_id: u64,
    status: String,
    #[serde(default)]
    conclusion: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    url: String,
}

impl From<GhRun> for RunRecord {
    fn from(run: GhRun) -> Self {
        RunRecord::new(
            run.database_id,
            RunStatus::from(run.status),
            Conclusion::parse_optional(run.conclusion.as_deref()),
            run.name,
            run.url,
        )
    }
}

impl GhCliSource {
    pub fn new(repo: Option<String>) -> Self {
        Self {
            repo,
            ..Self::default()
        }
    }

    /// Arguments passed to gh for one query.
    pub fn build_args(&self, commit: &str, limit: usize) -> Vec<String> {
        let mut args = vec![
            "run".to_string(),
            "list".to_string(),
            "--commit".to_string(),
            commit.to_string(),
            "--limit".to_string(),
            limit.to_string(),
            "--json".to_string(),
            GH_FIELDS.to_string(),
        ];
        if let Some(repo) = &self.repo {
            args.push("--repo".to_string());
            args.push(repo.clone());
        }
        args
    }

    /// Parse gh's JSON output into run records, preserving order.
    pub fn parse_runs(stdout: &str) -> Result<Vec<RunRecord>> {
        let trimmed = stdout.trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        let runs: Vec<GhRun> = serde_json::from_str(trimmed)?;
        Ok(runs.into_iter().map(RunRecord::from).collect())
    }
}

#[async_trait]
impl StatusSource for GhCliSource {
    async fn fetch(&self, commit: &str, limit: usize) -> Result<Vec<RunRecord>> {
        let mut command = Command::new(&self.binary_path);
        if let Some(dir) = &self.working_dir {
            command.current_dir(dir);
        }
        let output = command
            .args(self.build_args(commit, limit))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|source| WatchError::SourceSpawn {
                command: self.binary_path.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(WatchError::SourceFailed {
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Self::parse_runs(&String::from_utf8_lossy(&output.stdout))
    }
}
