//! GitHub REST backend.
//!
//! Queries `GET /repos/{owner}/{repo}/actions/runs?head_sha=...` directly,
//! for hosts where the `gh` binary is not installed.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::StatusSource;
use crate::domain::{Conclusion, Result, RunRecord, RunStatus, WatchError};

/// GitHub REST API configuration
#[derive(Debug, Clone)]
pub struct GithubApiConfig {
    /// API root, e.g. `https://api.github.com`
    pub api_url: String,
    /// Repository as `owner/name`
    pub repo: String,
    /// Bearer token (optional for public repositories)
    pub token: Option<String>,
}

impl GithubApiConfig {
    /// Build a config for `repo`, reading the token from `GH_TOKEN` or `GITHUB_TOKEN`
    /// and the API root from `GITHUB_API_URL`.
    pub fn from_env(repo: &str) -> Self {
        GithubApiConfig {
            api_url: std::env::var("GITHUB_API_URL")
                .unwrap_or_else(|_| "https://api.github.com".to_string()),
            repo: repo.to_string(),
            token: std::env::var("GH_TOKEN")
                .or_else(|_| std::env::var("GITHUB_TOKEN"))
                .ok(),
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }

    fn validate(&self) -> Result<()> {
        match self.repo.split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() => Ok(()),
            _ => Err(WatchError::InvalidConfig(format!(
                "repository must be owner/name, got {:?}",
                self.repo
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct WorkflowRunsPage {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct WorkflowRun {
    id: u64,
    status: Option<String>,
    conclusion: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    html_url: String,
}

impl From<WorkflowRun> for RunRecord {
    fn from(run: WorkflowRun) -> Self {
        RunRecord::new(
            run.id,
            RunStatus::from(run.status.unwrap_or_default()),
            Conclusion::parse_optional(run.conclusion.as_deref()),
            run.name.unwrap_or_default(),
            run.html_url,
        )
    }
}

/// Status source that talks to the GitHub REST API.
pub struct GithubApiSource {
    config: GithubApiConfig,
    http_client: reqwest::Client,
}

impl GithubApiSource {
    pub fn new(config: GithubApiConfig) -> Result<Self> {
        config.validate()?;
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("ciwatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(GithubApiSource {
            config,
            http_client,
        })
    }

    /// Endpoint listing the workflow runs of one repository.
    pub fn runs_url(&self) -> String {
        format!(
            "{}/repos/{}/actions/runs",
            self.config.api_url.trim_end_matches('/'),
            self.config.repo
        )
    }

    /// Parse one page of `workflow_runs`, preserving API order.
    pub fn parse_page(body: &str) -> Result<Vec<RunRecord>> {
        let page: WorkflowRunsPage = serde_json::from_str(body)?;
        Ok(page.workflow_runs.into_iter().map(RunRecord::from).collect())
    }
}

#[async_trait]
impl StatusSource for GithubApiSource {
    async fn fetch(&self, commit: &str, limit: usize) -> Result<Vec<RunRecord>> {
        let url = self.runs_url();
        debug!(url = %url, commit = %commit, "querying workflow runs");

        // The API caps per_page at 100.
        let per_page = limit.clamp(1, 100).to_string();
        let mut request = self
            .http_client
            .get(&url)
            .header("Accept", "application/vnd.github+json")
            .query(&[("head_sha", commit), ("per_page", per_page.as_str())]);
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let body = request.send().await?.error_for_status()?.text().await?;
        let mut runs = Self::parse_page(&body)?;
        runs.truncate(limit);
        Ok(runs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(repo: &str) -> GithubApiConfig {
        GithubApiConfig {
            api_url: "https://api.github.com/".to_string(),
            repo: repo.to_string(),
            token: None,
        }
    }

    #[test]
    fn test_runs_url() {
        let source = GithubApiSource::new(config("octo/widgets")).expect("source");
        assert_eq!(
            source.runs_url(),
            "https://api.github.com/repos/octo/widgets/actions/runs"
        );
    }

    #[test]
    fn test_rejects_repo_without_owner() {
        assert!(GithubApiSource::new(config("widgets")).is_err());
        assert!(GithubApiSource::new(config("/widgets")).is_err());
    }

    #[test]
    fn test_with_token() {
        let cfg = config("octo/widgets").with_token("ghp_test");
        assert_eq!(cfg.token.as_deref(), Some("ghp_test"));
    }

    #[test]
    fn test_parse_page() {
        let body = r#"{
            "total_count": 2,
            "workflow_runs": [
                {"id": 11, "status": "queued", "conclusion": null, "name": "CI", "html_url": "https://gh/11"},
                {"id": 12, "status": "completed", "conclusion": "cancelled", "name": "Docs", "html_url": "https://gh/12"}
            ]
        }"#;
        let runs = GithubApiSource::parse_page(body).expect("parse");
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].status, RunStatus::Queued);
        assert_eq!(runs[0].conclusion, None);
        assert_eq!(runs[1].conclusion, Some(Conclusion::Cancelled));
        assert_eq!(runs[1].url, "https://gh/12");
    }

    #[test]
    fn test_parse_page_without_runs() {
        let runs = GithubApiSource::parse_page(r#"{"total_count": 0}"#).expect("parse");
        assert!(runs.is_empty());
    }
}
