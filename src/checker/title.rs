use semver::Version;

const PREFIX: &str = "Release ";

/// Version named by a release pull request title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTitle {
    /// Version token as written in the title, leading `v` included
    pub version: String,
    pub prerelease: bool,
}

/// Parse a title of the form `Release v<semver>`.
///
/// Returns None unless the title starts with exactly `"Release "` and the rest
/// is a `v` followed by a strict semantic version.
pub fn parse_title(title: &str) -> Option<ParsedTitle> {
    let token = title.strip_prefix(PREFIX)?;
    let bare = token.strip_prefix('v')?;
    let version = Version::parse(bare).ok()?;

    Some(ParsedTitle {
        version: token.to_string(),
        prerelease: !version.pre.is_empty(),
    })
}
