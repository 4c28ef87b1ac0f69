pub mod types;

pub use types::{Report, Verdict};

use crate::checker::{CheckOutcome, RELEASE_LABEL};
use crate::event::PullRequestEvent;
use colored::Colorize;
use std::io::Write;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write summary file: {0}")]
    FileWrite(#[from] std::io::Error),
}

/// Build a Report from a check outcome and the event that triggered it.
pub fn build(outcome: &CheckOutcome, event: &PullRequestEvent) -> Report {
    let (verdict, detail) = match outcome {
        CheckOutcome::Labeled {
            version,
            prerelease: false,
        } => (
            Verdict::Labeled,
            format!("Release v{version} detected, added `{RELEASE_LABEL}` label"),
        ),
        CheckOutcome::Labeled {
            version,
            prerelease: true,
        } => (
            Verdict::Labeled,
            format!("Prerelease v{version} detected, added `{RELEASE_LABEL}` label"),
        ),
        CheckOutcome::InvalidTitle { version } => (
            Verdict::InvalidTitle,
            format!("Version bumped to {version}, but the title is not \"Release v{version}\""),
        ),
        CheckOutcome::Unlabeled { removed: true } => (
            Verdict::Unlabeled,
            format!("Not a release, removed `{RELEASE_LABEL}` label"),
        ),
        CheckOutcome::Unlabeled { removed: false } => {
            (Verdict::Unlabeled, "Not a release, nothing to change".to_string())
        }
    };

    Report {
        repository: event.repository.to_string(),
        pr_number: event.pull_request.number,
        pr_title: event.pull_request.title.clone(),
        event: event.kind.to_string(),
        verdict,
        detail,
    }
}

/// Output the report to terminal (default) or append it as markdown to a
/// file such as `$GITHUB_STEP_SUMMARY`.
#[instrument(skip(report), fields(pr = report.pr_number, verdict = %report.verdict))]
pub fn output(report: &Report, summary_path: Option<&Path>) -> Result<(), ReportError> {
    match summary_path {
        None => {
            debug!("writing report to terminal");
            print_terminal_report(report);
            Ok(())
        }
        Some(path) => {
            debug!(path = %path.display(), "appending report to summary file");
            append_markdown_report(report, path)
        }
    }
}

fn print_terminal_report(report: &Report) {
    println!(
        "{}#{} \"{}\" ({}): {} {}",
        report.repository,
        report.pr_number,
        report.pr_title,
        report.event,
        colorize_verdict(report.verdict),
        report.detail
    );
}

fn render_markdown(report: &Report) -> String {
    let mut md = String::new();
    md.push_str(&format!(
        "### Release label: {} #{}\n\n",
        report.repository, report.pr_number
    ));
    md.push_str(&format!("**Title:** {}  \n", report.pr_title));
    md.push_str(&format!("**Event:** `{}`  \n", report.event));
    md.push_str(&format!("**Result:** {}\n\n", report.verdict));
    md.push_str(&format!("{}\n", report.detail));
    md
}

/// Append rather than overwrite: the summary file is shared by every step of a job.
fn append_markdown_report(report: &Report, path: &Path) -> Result<(), ReportError> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)?;
    file.write_all(render_markdown(report).as_bytes())?;
    Ok(())
}

fn colorize_verdict(verdict: Verdict) -> colored::ColoredString {
    match verdict {
        Verdict::Labeled => "LABELED".green().bold(),
        Verdict::Unlabeled => "UNLABELED".cyan().bold(),
        Verdict::InvalidTitle => "INVALID TITLE".red().bold(),
    }
}
