//! Version parsing and change classification
//!
//! Parsing is deliberately loose: every range operator character is removed
//! from the string before the `major.minor.patch` triple is matched at the
//! start of the remainder. The remainder is not trimmed, so `>= 1.2.3` does
//! not parse.

use std::sync::LazyLock;

use regex::Regex;

/// Characters that express a range constraint rather than a version
pub const RANGE_OPERATORS: [char; 5] = ['^', '~', '>', '=', '<'];

static VERSION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\.(\d+)\.(\d+)(?:-([0-9A-Za-z.-]+))?").expect("version pattern is valid")
});

/// Decomposition of a version string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVersion {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    /// Pre-release identifier without the leading hyphen; empty for stable releases
    pub prerelease: String,
}

impl ParsedVersion {
    pub fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }

    pub fn is_prerelease(&self) -> bool {
        !self.prerelease.is_empty()
    }
}

/// Kind of change from a current version to the latest one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VersionChangeKind {
    None,
    Patch,
    Minor,
    Major,
}

impl VersionChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionChangeKind::None => "none",
            VersionChangeKind::Patch => "patch",
            VersionChangeKind::Minor => "minor",
            VersionChangeKind::Major => "major",
        }
    }
}

impl std::fmt::Display for VersionChangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remove every range operator character from a version string
///
/// Whitespace is kept as written.
pub fn strip_range_operators(version: &str) -> String {
    version
        .chars()
        .filter(|c| !RANGE_OPERATORS.contains(c))
        .collect()
}

/// Split a version string into its leading range prefix and the bare version
///
/// The prefix is the leading run of range operators and whitespace:
/// - "^1.2.3" -> ("^", "1.2.3")
/// - ">= 1.2.3" -> (">= ", "1.2.3")
/// - "1.2.3" -> ("", "1.2.3")
pub fn split_range_prefix(version: &str) -> (&str, &str) {
    let bare = version.trim_start_matches(|c: char| RANGE_OPERATORS.contains(&c) || c == ' ');
    version.split_at(version.len() - bare.len())
}

/// Parse a version string
///
/// Returns None when no `major.minor.patch` triple is found after stripping
/// range operators. Build metadata after `+` is ignored.
///
/// Examples:
/// - "1.2.3" -> 1.2.3
/// - "~2.0.0-beta.1" -> 2.0.0 with prerelease "beta.1"
/// - "latest" -> None
pub fn parse_version(version: &str) -> Option<ParsedVersion> {
    let stripped = strip_range_operators(version);
    let captures = VERSION_PATTERN.captures(&stripped)?;

    Some(ParsedVersion {
        major: captures[1].parse().ok()?,
        minor: captures[2].parse().ok()?,
        patch: captures[3].parse().ok()?,
        prerelease: captures
            .get(4)
            .map(|m| m.as_str().to_string())
            .unwrap_or_default(),
    })
}

/// Classify the change from `current` to `latest`
///
/// Only a latest version strictly ahead of the current one is reported, at the
/// coarsest differing component. A latest version behind the current one is
/// `None`.
pub fn classify(current: &ParsedVersion, latest: &ParsedVersion) -> VersionChangeKind {
    if latest.major > current.major {
        VersionChangeKind::Major
    } else if latest.major == current.major && latest.minor > current.minor {
        VersionChangeKind::Minor
    } else if latest.major == current.major
        && latest.minor == current.minor
        && latest.patch > current.patch
    {
        VersionChangeKind::Patch
    } else {
        VersionChangeKind::None
    }
}

/// Classify two version strings; unparseable input yields `None`
pub fn classify_versions(current: &str, latest: &str) -> VersionChangeKind {
    match (parse_version(current), parse_version(latest)) {
        (Some(current), Some(latest)) => classify(&current, &latest),
        _ => VersionChangeKind::None,
    }
}
