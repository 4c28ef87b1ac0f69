use async_trait::async_trait;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde_json::json;
use tracing::{debug, instrument};

use super::types::{ChangedFile, CommitStatus, Comparison, FileContent, IssueRef, PrUrl, RepoRef};
use super::{GitHubApi, GitHubError};
use crate::event::PullRequest;

const AGENT: &str = "release-labeler";
const API_VERSION: &str = "2022-11-28";

/// Authenticated GitHub REST client backed by reqwest.
pub struct RestClient {
    http: reqwest::Client,
    base: Url,
    token: String,
}

impl RestClient {
    pub fn new(api_url: &str, token: String) -> Result<Self, GitHubError> {
        let base =
            Url::parse(api_url).map_err(|_| GitHubError::InvalidApiUrl(api_url.to_string()))?;
        if base.cannot_be_a_base() {
            return Err(GitHubError::InvalidApiUrl(api_url.to_string()));
        }

        Ok(Self {
            http: reqwest::Client::new(),
            base,
            token,
        })
    }

    /// Append path segments to the API root, percent-encoding each one.
    fn endpoint<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(USER_AGENT, AGENT)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(&self.token)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, GitHubError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        debug!(status = status.as_u16(), url = %url, "GitHub API error response");
        Err(classify(status, url, body))
    }

    /// Fetch title and base/head commits of a pull request by number.
    #[instrument(skip(self), fields(owner = %pr_url.owner, repo = %pr_url.repo, pr = pr_url.pr_number))]
    pub async fn fetch_pull_request(&self, pr_url: &PrUrl) -> Result<PullRequest, GitHubError> {
        let number = pr_url.pr_number.to_string();
        let url = self.endpoint([
            "repos",
            pr_url.owner.as_str(),
            pr_url.repo.as_str(),
            "pulls",
            number.as_str(),
        ]);

        debug!("fetching PR metadata from GitHub API");
        let pull_request = self
            .send(self.request(Method::GET, url))
            .await?
            .json::<PullRequest>()
            .await?;
        debug!(title = %pull_request.title, head = %pull_request.head.sha, "received PR metadata");

        Ok(pull_request)
    }
}

/// Map a non-success response onto an error kind. 404 is kept distinct so
/// callers can tolerate missing resources.
fn classify(status: StatusCode, url: String, body: String) -> GitHubError {
    if status == StatusCode::NOT_FOUND {
        GitHubError::NotFound(url)
    } else {
        GitHubError::Status {
            status: status.as_u16(),
            url,
            body,
        }
    }
}

#[async_trait]
impl GitHubApi for RestClient {
    #[instrument(skip(self, repo), fields(repo = %repo))]
    async fn compare_commits(
        &self,
        repo: &RepoRef,
        base: &str,
        head: &str,
    ) -> Result<Vec<ChangedFile>, GitHubError> {
        let range = format!("{base}...{head}");
        let url = self.endpoint([
            "repos",
            repo.owner.as_str(),
            repo.repo.as_str(),
            "compare",
            range.as_str(),
        ]);

        let comparison = self
            .send(self.request(Method::GET, url))
            .await?
            .json::<Comparison>()
            .await?;
        debug!(files = comparison.files.len(), "received comparison");

        Ok(comparison.files)
    }

    #[instrument(skip(self, repo), fields(repo = %repo))]
    async fn get_content(
        &self,
        repo: &RepoRef,
        path: &str,
        git_ref: &str,
    ) -> Result<FileContent, GitHubError> {
        let mut url = self.endpoint(
            ["repos", repo.owner.as_str(), repo.repo.as_str(), "contents"]
                .into_iter()
                .chain(path.split('/')),
        );
        url.query_pairs_mut().append_pair("ref", git_ref);

        let file = self
            .send(self.request(Method::GET, url))
            .await?
            .json::<FileContent>()
            .await?;
        debug!(bytes = file.content.len(), encoding = ?file.encoding, "received file content");

        Ok(file)
    }

    #[instrument(skip(self, repo, status), fields(repo = %repo, state = %status.state))]
    async fn create_status(
        &self,
        repo: &RepoRef,
        sha: &str,
        status: &CommitStatus,
    ) -> Result<(), GitHubError> {
        let url = self.endpoint(["repos", repo.owner.as_str(), repo.repo.as_str(), "statuses", sha]);
        self.send(self.request(Method::POST, url).json(status)).await?;
        Ok(())
    }

    #[instrument(skip(self), fields(owner = %issue.owner, repo = %issue.repo, pr = issue.number))]
    async fn add_labels(&self, issue: &IssueRef, labels: &[&str]) -> Result<(), GitHubError> {
        let number = issue.number.to_string();
        let url = self.endpoint([
            "repos",
            issue.owner.as_str(),
            issue.repo.as_str(),
            "issues",
            number.as_str(),
            "labels",
        ]);
        self.send(
            self.request(Method::POST, url)
                .json(&json!({ "labels": labels })),
        )
        .await?;
        Ok(())
    }

    #[instrument(skip(self), fields(owner = %issue.owner, repo = %issue.repo, pr = issue.number))]
    async fn remove_label(&self, issue: &IssueRef, name: &str) -> Result<(), GitHubError> {
        let number = issue.number.to_string();
        let url = self.endpoint([
            "repos",
            issue.owner.as_str(),
            issue.repo.as_str(),
            "issues",
            number.as_str(),
            "labels",
            name,
        ]);
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}
