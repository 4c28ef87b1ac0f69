pub mod client;
pub mod types;

pub use client::RestClient;
pub use types::{
    ChangedFile, CommitState, CommitStatus, FileContent, FileStatus, IssueRef, PrUrl, RepoRef,
};

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    ApiRequest(#[from] reqwest::Error),

    #[error("GitHub resource not found: {0}")]
    NotFound(String),

    #[error("GitHub API returned {status} for {url}: {body}")]
    Status { status: u16, url: String, body: String },

    #[error("Invalid GitHub API URL: {0}")]
    InvalidApiUrl(String),

    #[error("Invalid PR URL: {0}")]
    InvalidUrl(String),

    #[error("GitHub token not found in config or environment")]
    MissingToken,
}

/// The slice of the GitHub REST API the release checker needs.
/// Implementations must be Send + Sync so the manifest fetches can run
/// concurrently via tokio::try_join!.
#[async_trait]
pub trait GitHubApi: Send + Sync {
    /// Files changed between two commits (`GET /repos/{o}/{r}/compare/{base}...{head}`).
    async fn compare_commits(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<Vec<ChangedFile>, GitHubError>;

    /// Encoded content of a file at a ref (`GET /repos/{o}/{r}/contents/{path}`).
    async fn get_content(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: &str,
    ) -> Result<FileContent, GitHubError>;

    async fn create_status(
        &self,
        repo: &RepoRef,
        sha: &str,
        status: &CommitStatus,
    ) -> Result<(), GitHubError>;

    async fn add_labels(&self, issue: &IssueRef, labels: &[&str]) -> Result<(), GitHubError>;

    /// Must report a label that is not on the issue as `GitHubError::NotFound`.
    async fn remove_label(&self, issue: &IssueRef, name: &str) -> Result<(), GitHubError>;
}

/// Parse a GitHub PR URL into its component parts.
/// Expected format: https://github.com/{owner}/{repo}/pull/{number}
pub fn parse_pr_url(url: &str) -> Result<PrUrl, GitHubError> {
    let invalid = || GitHubError::InvalidUrl(url.to_string());
    let parsed = reqwest::Url::parse(url).map_err(|_| invalid())?;

    if parsed.host_str() != Some("github.com") {
        return Err(invalid());
    }

    let segments: Vec<_> = parsed
        .path_segments()
        .ok_or_else(invalid)?
        .filter(|segment| !segment.is_empty())
        .collect();

    match segments.as_slice() {
        [owner, repo, "pull", number] => Ok(PrUrl {
            owner: owner.to_string(),
            repo: repo.to_string(),
            pr_number: number.parse::<u64>().map_err(|_| invalid())?,
        }),
        _ => Err(invalid()),
    }
}
