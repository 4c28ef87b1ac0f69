pub mod types;

pub use types::{PullRequest, PullRequestPayload};

use thiserror::Error;
use tracing::debug;

use crate::github::{GitHubApi, IssueRef, RepoRef};

pub const PULL_REQUEST_EVENT: &str = "pull_request";

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Failed to read event payload: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse event payload: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Pull request lifecycle events that trigger a release label check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Opened,
    Synchronize,
    Labeled,
    Unlabeled,
}

impl EventKind {
    /// Map a `pull_request` action onto a subscribed event kind.
    /// Actions outside the subscription return None.
    pub fn from_action(action: &str) -> Option<EventKind> {
        match action {
            "opened" => Some(EventKind::Opened),
            // older webhook deliveries spell it "synchronized"
            "synchronize" | "synchronized" => Some(EventKind::Synchronize),
            "labeled" => Some(EventKind::Labeled),
            "unlabeled" => Some(EventKind::Unlabeled),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventKind::Opened => write!(f, "pull_request.opened"),
            EventKind::Synchronize => write!(f, "pull_request.synchronize"),
            EventKind::Labeled => write!(f, "pull_request.labeled"),
            EventKind::Unlabeled => write!(f, "pull_request.unlabeled"),
        }
    }
}

/// A subscribed pull request event, reduced to what the checker needs.
#[derive(Debug, Clone)]
pub struct PullRequestEvent {
    pub kind: EventKind,
    pub repository: RepoRef,
    pub pull_request: PullRequest,
}

/// Parse a delivered event. Returns Ok(None) for events the bot does not
/// subscribe to, so they can be acknowledged without doing any work.
pub fn parse_event(event_name: &str, payload: &str) -> Result<Option<PullRequestEvent>, EventError> {
    if event_name != PULL_REQUEST_EVENT {
        debug!(event = %event_name, "not a pull_request event");
        return Ok(None);
    }

    let payload: PullRequestPayload = serde_json::from_str(payload)?;
    let Some(kind) = EventKind::from_action(&payload.action) else {
        debug!(action = %payload.action, "unsubscribed pull_request action");
        return Ok(None);
    };

    Ok(Some(PullRequestEvent {
        kind,
        repository: RepoRef {
            owner: payload.repository.owner.login,
            repo: payload.repository.name,
        },
        pull_request: payload.pull_request,
    }))
}

/// Read and parse an event payload file as written by GitHub Actions.
pub fn load_event(
    event_name: &str,
    path: &std::path::Path,
) -> Result<Option<PullRequestEvent>, EventError> {
    let payload = std::fs::read_to_string(path)?;
    parse_event(event_name, &payload)
}

/// Everything one check run needs: the event and the authenticated client.
pub struct CheckContext<'a> {
    pub github: &'a dyn GitHubApi,
    pub event: &'a PullRequestEvent,
}

impl<'a> CheckContext<'a> {
    pub fn new(github: &'a dyn GitHubApi, event: &'a PullRequestEvent) -> Self {
        Self { github, event }
    }

    pub fn pull_request(&self) -> &PullRequest {
        &self.event.pull_request
    }

    /// Repository coordinates for repo-scoped endpoints.
    pub fn repo(&self) -> RepoRef {
        self.event.repository.clone()
    }

    /// Repository plus pull request number for issue-scoped endpoints.
    pub fn issue(&self) -> IssueRef {
        IssueRef {
            owner: self.event.repository.owner.clone(),
            repo: self.event.repository.repo.clone(),
            number: self.event.pull_request.number,
        }
    }
}
