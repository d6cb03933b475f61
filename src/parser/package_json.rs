//! package.json dependency scanner
//!
//! Dependency sections of a manifest are a well-known flat shape, so they are
//! located with targeted patterns instead of a full JSON parse. Every match is
//! re-located on its computed line before it is reported, and anything that
//! cannot be re-located is dropped.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::parser::position::{LineIndex, utf16_len};
use crate::parser::traits::{ScanError, Scanner};
use crate::parser::types::{DependencyLocation, DependencySection, is_package_json};

/// Version values pointing outside the registry
const NON_REGISTRY_PREFIXES: [&str; 7] = [
    "file:", "link:", "git:", "git+", "github:", "http:", "https:",
];

static SECTION_PATTERNS: LazyLock<Vec<(DependencySection, Regex)>> = LazyLock::new(|| {
    DependencySection::ALL
        .into_iter()
        .map(|section| {
            let pattern = format!(r#""{}"\s*:\s*\{{([^}}]*)\}}"#, section.as_str());
            let regex = Regex::new(&pattern).expect("section pattern is valid");
            (section, regex)
        })
        .collect()
});

static PAIR_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#""([^"\\\s]+)"\s*:\s*"([^"\\]*)""#).expect("pair pattern is valid")
});

/// Scanner for package.json files
pub struct PackageJsonScanner;

impl PackageJsonScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Default for PackageJsonScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for PackageJsonScanner {
    fn can_scan(&self, uri: &str) -> bool {
        is_package_json(uri)
    }

    fn scan(&self, content: &str) -> Vec<DependencyLocation> {
        let index = LineIndex::new(content);
        let mut results = Vec::new();
        let mut sections_found = 0;

        for (section, pattern) in SECTION_PATTERNS.iter() {
            for body in pattern.captures_iter(content).filter_map(|c| c.get(1)) {
                sections_found += 1;

                for pair in PAIR_PATTERN.captures_iter(body.as_str()) {
                    let (Some(name), Some(version)) = (pair.get(1), pair.get(2)) else {
                        continue;
                    };

                    if version.as_str().is_empty() || is_non_registry(version.as_str()) {
                        debug!(
                            "Skipping {} with non-registry version {:?}",
                            name.as_str(),
                            version.as_str()
                        );
                        continue;
                    }

                    match locate(
                        &index,
                        *section,
                        name.as_str(),
                        version.as_str(),
                        body.start() + version.start(),
                    ) {
                        Ok(location) => results.push(location),
                        Err(e) => warn!("Dropping dependency match: {}", e),
                    }
                }
            }
        }

        if sections_found == 0 {
            debug!("No dependency sections found in manifest");
        }

        results
    }
}

fn is_non_registry(version: &str) -> bool {
    NON_REGISTRY_PREFIXES
        .iter()
        .any(|prefix| version.starts_with(prefix))
}

/// Resolve a version match to its exact span on the line it sits on
fn locate(
    index: &LineIndex<'_>,
    section: DependencySection,
    name: &str,
    version: &str,
    version_offset: usize,
) -> Result<DependencyLocation, ScanError> {
    let out_of_range = || ScanError::OffsetOutOfRange(version_offset);

    let quote_offset = version_offset.checked_sub(1).ok_or_else(out_of_range)?;
    let (line, quote_column) = index.position(quote_offset).ok_or_else(out_of_range)?;
    let line_start = index.line_start(line).ok_or_else(out_of_range)?;
    let line_text = index.line(line).ok_or_else(out_of_range)?;

    let quoted = format!("\"{version}\"");
    let expected = quote_offset - line_start;

    let version_start = if line_text
        .get(expected..)
        .is_some_and(|rest| rest.starts_with(&quoted))
    {
        quote_column + 1
    } else {
        let quote_index =
            relocate(line_text, name, &quoted).ok_or_else(|| ScanError::SpanNotFound {
                package: name.to_string(),
                version: version.to_string(),
                line,
            })?;
        utf16_len(&line_text[..quote_index + 1])
    };

    Ok(DependencyLocation {
        package_name: name.to_string(),
        current_version_raw: version.to_string(),
        section,
        line,
        version_start,
        version_length: utf16_len(version),
    })
}

/// Find the quoted version following the package key on a line
fn relocate(line_text: &str, name: &str, quoted: &str) -> Option<usize> {
    let key = format!("\"{name}\"");
    let after_key = line_text.find(&key)? + key.len();
    line_text[after_key..]
        .find(quoted)
        .map(|index| after_key + index)
}
