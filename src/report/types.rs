/// Headline of a check run, used to pick colors and wording.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Labeled,
    Unlabeled,
    InvalidTitle,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Labeled => write!(f, "LABELED"),
            Verdict::Unlabeled => write!(f, "UNLABELED"),
            Verdict::InvalidTitle => write!(f, "INVALID TITLE"),
        }
    }
}

/// Summary of one release label check.
#[derive(Debug)]
pub struct Report {
    /// owner/repo
    pub repository: String,
    pub pr_number: u64,
    pub pr_title: String,
    /// Event that triggered the check (e.g. "pull_request.synchronize")
    pub event: String,
    pub verdict: Verdict,
    /// One-line explanation of what happened to the label
    pub detail: String,
}
