mod checker;
mod config;
mod event;
mod github;
mod report;

use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info, info_span};
use tracing_subscriber::EnvFilter;

use event::{EventKind, PullRequestEvent};
use github::{GitHubError, RestClient};

/// Release labeler — applies the `release` label to pull requests that bump
/// the version in package.json, and checks that the title reads `Release v<version>`.
#[derive(Parser, Debug)]
#[command(name = "release-labeler", version, about)]
struct Cli {
    /// GitHub Pull Request URL to check directly (e.g., https://github.com/org/repo/pull/42)
    ///
    /// When omitted, the event named by --event-name is read from --event-path.
    pr_url: Option<String>,

    /// Webhook event name of the payload
    #[arg(long, env = "GITHUB_EVENT_NAME")]
    event_name: Option<String>,

    /// Path to the webhook event payload (JSON)
    #[arg(long, env = "GITHUB_EVENT_PATH")]
    event_path: Option<PathBuf>,

    /// Append a markdown summary to this file instead of printing to the terminal
    #[arg(long, env = "GITHUB_STEP_SUMMARY")]
    summary: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!("loading configuration");
    let config = config::Config::load()?;
    let token = config.github_token().ok_or(GitHubError::MissingToken)?;
    let client = RestClient::new(config.api_url(), token)?;
    debug!(api_url = %config.api_url(), "created GitHub client");

    let event = match cli.pr_url.as_deref() {
        Some(pr_url) => Some(event_from_url(&client, pr_url).await?),
        None => {
            let event_name = cli.event_name.as_deref().ok_or(
                "event name is required unless a PR URL is given. Usage: release-labeler <URL> or release-labeler --event-name pull_request --event-path event.json",
            )?;
            let event_path = cli
                .event_path
                .as_deref()
                .ok_or("event payload path is required unless a PR URL is given")?;
            info!(event = %event_name, path = %event_path.display(), "reading event payload");
            event::load_event(event_name, event_path)?
        }
    };

    let Some(event) = event else {
        info!("event does not concern the release label, nothing to do");
        return Ok(());
    };

    let _main_span = info_span!(
        "release_check",
        repo = %event.repository,
        pr = event.pull_request.number
    )
    .entered();

    info!(event = %event.kind, "checking pull request");
    let outcome = checker::handle(&event, &client).await?;
    info!(outcome = ?outcome, "check complete");

    let built_report = report::build(&outcome, &event);
    report::output(&built_report, cli.summary.as_deref())?;

    Ok(())
}

/// Build a synthetic synchronize event for a PR given by URL.
async fn event_from_url(
    client: &RestClient,
    pr_url: &str,
) -> Result<PullRequestEvent, GitHubError> {
    info!(pr_url = %pr_url, "parsing PR URL");
    let parsed_url = github::parse_pr_url(pr_url)?;
    debug!(owner = %parsed_url.owner, repo = %parsed_url.repo, pr = parsed_url.pr_number, "parsed PR URL");

    info!("fetching pull request from GitHub");
    let pull_request = client.fetch_pull_request(&parsed_url).await?;

    Ok(PullRequestEvent {
        kind: EventKind::Synchronize,
        repository: github::RepoRef {
            owner: parsed_url.owner,
            repo: parsed_url.repo,
        },
        pull_request,
    })
}
