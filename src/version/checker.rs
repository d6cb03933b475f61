//! Version status of a declared dependency against registry metadata

use semver::Version;

use crate::version::range::NpmRange;
use crate::version::semver::{VersionChangeKind, classify_versions, strip_range_operators};
use crate::version::types::PackageInfo;

/// Status of one dependency against its registry snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DependencyStatus {
    /// Change from the declared version to the latest tag
    pub kind: VersionChangeKind,
    /// Whether the declared version matches any published version
    pub found: bool,
}

/// Compare a declared version against the package's registry snapshot
pub fn check_dependency(current_version: &str, info: &PackageInfo) -> DependencyStatus {
    DependencyStatus {
        kind: classify_versions(current_version, &info.latest_version),
        found: version_exists(current_version, info),
    }
}

/// Check if a declared version matches any published version
///
/// The bare version (range operators removed) is looked up exactly first.
/// Otherwise the declaration is read as an npm range and matched against
/// every published version.
fn version_exists(current_version: &str, info: &PackageInfo) -> bool {
    if info.has_version(strip_range_operators(current_version).trim()) {
        return true;
    }

    let Some(range) = NpmRange::parse(current_version) else {
        return false;
    };

    info.all_versions
        .iter()
        .filter_map(|v| Version::parse(v).ok())
        .any(|v| range.matches(&v))
}
