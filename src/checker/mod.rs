pub mod manifest;
pub mod title;

pub use title::parse_title;

use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::event::{CheckContext, EventKind, PullRequestEvent};
use crate::github::{CommitState, CommitStatus, FileStatus, GitHubApi, GitHubError, RepoRef};
use manifest::{decode_manifest, Manifest, ManifestError};

pub const RELEASE_LABEL: &str = "release";
pub const MANIFEST_PATH: &str = "package.json";
pub const STATUS_CONTEXT: &str = "Release label";

pub const PENDING_DESCRIPTION: &str = "Checking whether to apply or remove Release label";
pub const INVALID_TITLE_DESCRIPTION: &str = "Detected release PR, but invalid PR title";
pub const SUCCESS_DESCRIPTION: &str = "Release label has been set (or unset)";

#[derive(Debug, Error)]
pub enum CheckError {
    #[error(transparent)]
    GitHub(#[from] GitHubError),

    #[error("Failed to read package.json at {git_ref}: {source}")]
    Manifest {
        git_ref: String,
        #[source]
        source: ManifestError,
    },
}

/// What a completed check did to the pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// Version bump with a matching title; label added
    Labeled { version: String, prerelease: bool },
    /// Version bump, but the title does not name it; failure status left in place
    InvalidTitle { version: String },
    /// Not a release; `removed` is false when the label was not there
    Unlabeled { removed: bool },
}

/// Decides whether a pull request is a release and keeps its label and
/// commit status in sync with that decision.
pub struct ReleaseLabelChecker<'a> {
    ctx: CheckContext<'a>,
}

impl<'a> ReleaseLabelChecker<'a> {
    pub fn new(ctx: CheckContext<'a>) -> Self {
        Self { ctx }
    }

    #[instrument(skip(self), fields(
        repo = %self.ctx.event.repository,
        pr = self.ctx.event.pull_request.number,
        event = %self.ctx.event.kind,
    ))]
    pub async fn run(&self) -> Result<CheckOutcome, CheckError> {
        self.set_status(CommitState::Pending, PENDING_DESCRIPTION)
            .await?;

        let outcome = match self.release_version().await? {
            Some(version) => {
                let title = &self.ctx.pull_request().title;
                let expected = format!("v{version}");
                match parse_title(title) {
                    Some(parsed) if parsed.version == expected => {
                        info!(version = %version, prerelease = parsed.prerelease, "release PR detected, adding label");
                        self.ctx
                            .github
                            .add_labels(&self.ctx.issue(), &[RELEASE_LABEL])
                            .await?;
                        CheckOutcome::Labeled {
                            version,
                            prerelease: parsed.prerelease,
                        }
                    }
                    _ => {
                        warn!(version = %version, title = %title, "release PR title does not match version");
                        // The failure status is the final word for this run.
                        self.set_status(CommitState::Failure, INVALID_TITLE_DESCRIPTION)
                            .await?;
                        return Ok(CheckOutcome::InvalidTitle { version });
                    }
                }
            }
            None => {
                let removed = self.remove_label().await?;
                CheckOutcome::Unlabeled { removed }
            }
        };

        self.set_status(CommitState::Success, SUCCESS_DESCRIPTION)
            .await?;
        Ok(outcome)
    }

    /// The new version when the change is exactly a `version` bump in
    /// package.json, None otherwise.
    async fn release_version(&self) -> Result<Option<String>, CheckError> {
        let pr = self.ctx.pull_request();
        let repo = self.ctx.repo();

        let files = self
            .ctx
            .github
            .compare_commits(&repo, &pr.base.sha, &pr.head.sha)
            .await?;

        let [file] = files.as_slice() else {
            debug!(files = files.len(), "not a single-file change");
            return Ok(None);
        };
        if file.filename != MANIFEST_PATH || file.status != FileStatus::Modified {
            debug!(file = %file.filename, status = ?file.status, "single change is not a manifest edit");
            return Ok(None);
        }

        let (head, base) = tokio::try_join!(
            self.manifest_at(&repo, &pr.head.sha),
            self.manifest_at(&repo, &pr.base.sha),
        )?;

        if head.version == base.version {
            debug!(version = ?head.version, "manifest changed but version did not");
            return Ok(None);
        }
        debug!(from = ?base.version, to = ?head.version, "version bumped");
        // an emptied version field names no release
        Ok(head.version.filter(|version| !version.is_empty()))
    }

    async fn manifest_at(&self, repo: &RepoRef, git_ref: &str) -> Result<Manifest, CheckError> {
        let file = self
            .ctx
            .github
            .get_content(repo, MANIFEST_PATH, git_ref)
            .await?;
        decode_manifest(&file).map_err(|source| CheckError::Manifest {
            git_ref: git_ref.to_string(),
            source,
        })
    }

    /// Remove the release label. A label that is not there counts as removed
    /// already; any other failure aborts the run.
    async fn remove_label(&self) -> Result<bool, CheckError> {
        match self
            .ctx
            .github
            .remove_label(&self.ctx.issue(), RELEASE_LABEL)
            .await
        {
            Ok(()) => {
                info!("not a release PR, removed label");
                Ok(true)
            }
            Err(GitHubError::NotFound(_)) => {
                debug!("not a release PR, label was not present");
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn set_status(&self, state: CommitState, description: &str) -> Result<(), CheckError> {
        let status = CommitStatus {
            state,
            description: description.to_string(),
            context: STATUS_CONTEXT.to_string(),
        };
        self.ctx
            .github
            .create_status(&self.ctx.repo(), &self.ctx.pull_request().head.sha, &status)
            .await?;
        Ok(())
    }
}

/// Single entry point for subscribed pull request events.
pub async fn handle(
    event: &PullRequestEvent,
    github: &dyn GitHubApi,
) -> Result<CheckOutcome, CheckError> {
    match event.kind {
        EventKind::Opened | EventKind::Synchronize | EventKind::Labeled | EventKind::Unlabeled => {
            ReleaseLabelChecker::new(CheckContext::new(github, event))
                .run()
                .await
        }
    }
}
