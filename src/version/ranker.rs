//! Candidate ranking for the interactive version picker
//!
//! Versions are ordered newest first: numeric triple descending, a stable
//! release before any prerelease of the same triple, prereleases by
//! descending identifier, and unparseable versions last in ascending raw
//! order. Remaining ties (build metadata) fall back to ascending raw text.
//! The entry matching the "latest" tag is then moved to rank 0.

use std::cmp::Ordering;

use serde::Serialize;

use crate::parser::position::utf16_len;
use crate::parser::types::{DependencyLocation, VersionSpan};
use crate::version::semver::{ParsedVersion, parse_version, split_range_prefix};

/// Minimum width of the zero-padded rank key
const RANK_WIDTH: usize = 5;

/// One entry of the picker, in display order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    /// Bare version shown to the user and inserted on selection
    pub version: String,
    pub filter_text: String,
    /// Zero-padded ordinal, used by the host as a stable sort token
    pub sort_text: String,
    pub is_current: bool,
    pub is_latest: bool,
    pub is_prerelease: bool,
}

impl Candidate {
    /// The latest entry is pre-selected when the picker opens
    pub fn preselect(&self) -> bool {
        self.is_latest
    }

    /// Detail text combining the annotation flags
    pub fn detail(&self) -> Option<String> {
        let labels: Vec<&str> = [
            (self.is_latest, "latest"),
            (self.is_current, "current"),
            (self.is_prerelease, "prerelease"),
        ]
        .into_iter()
        .filter_map(|(flag, label)| flag.then_some(label))
        .collect();

        (!labels.is_empty()).then(|| labels.join(", "))
    }
}

fn compare_parsed_desc(
    (parsed_a, a): (&Option<ParsedVersion>, &str),
    (parsed_b, b): (&Option<ParsedVersion>, &str),
) -> Ordering {
    match (parsed_a, parsed_b) {
        (Some(pa), Some(pb)) => pb
            .triple()
            .cmp(&pa.triple())
            .then_with(|| match (pa.is_prerelease(), pb.is_prerelease()) {
                (false, false) => Ordering::Equal,
                (false, true) => Ordering::Less,
                (true, false) => Ordering::Greater,
                (true, true) => pb.prerelease.cmp(&pa.prerelease),
            })
            .then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Produce the ordered candidate list for a dependency
///
/// # Arguments
/// * `all_versions` - Published versions in any order
/// * `latest_version` - Version of the "latest" distribution tag
/// * `current_version` - Version text as written, range prefix included
pub fn rank_candidates(
    all_versions: &[String],
    latest_version: &str,
    current_version: &str,
) -> Vec<Candidate> {
    let mut ordered: Vec<(Option<ParsedVersion>, &String)> = all_versions
        .iter()
        .map(|v| (parse_version(v), v))
        .collect();
    ordered.sort_by(|(pa, a), (pb, b)| {
        compare_parsed_desc((pa, a.as_str()), (pb, b.as_str()))
    });

    if let Some(index) = ordered.iter().position(|(_, v)| *v == latest_version) {
        let latest = ordered.remove(index);
        ordered.insert(0, latest);
    }

    let (_, current) = split_range_prefix(current_version);
    let width = RANK_WIDTH.max(ordered.len().to_string().len());

    ordered
        .into_iter()
        .enumerate()
        .map(|(rank, (parsed, version))| Candidate {
            version: version.clone(),
            filter_text: version.clone(),
            sort_text: format!("{rank:0width$}"),
            is_current: version == current,
            is_latest: version == latest_version,
            is_prerelease: parsed.is_some_and(|v| v.is_prerelease()),
        })
        .collect()
}

/// Drop prerelease candidates, keeping the current and latest entries
pub fn retain_stable(candidates: &mut Vec<Candidate>) {
    candidates.retain(|c| !c.is_prerelease || c.is_current || c.is_latest);
}

/// Span the picker replaces: the version text without its range prefix
pub fn replace_span(location: &DependencyLocation) -> VersionSpan {
    let (prefix, _) = split_range_prefix(&location.current_version_raw);
    let span = location.version_span();
    VersionSpan {
        start: (span.start + utf16_len(prefix)).min(span.end),
        ..span
    }
}
