//! Common types for the manifest scanner

/// Dependency section of a package.json manifest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DependencySection {
    Dependencies,
    DevDependencies,
    PeerDependencies,
    OptionalDependencies,
}

impl DependencySection {
    /// All recognized sections, in scan order
    pub const ALL: [DependencySection; 4] = [
        DependencySection::Dependencies,
        DependencySection::DevDependencies,
        DependencySection::PeerDependencies,
        DependencySection::OptionalDependencies,
    ];

    /// Returns the JSON key of the section
    pub fn as_str(&self) -> &'static str {
        match self {
            DependencySection::Dependencies => "dependencies",
            DependencySection::DevDependencies => "devDependencies",
            DependencySection::PeerDependencies => "peerDependencies",
            DependencySection::OptionalDependencies => "optionalDependencies",
        }
    }
}

impl std::fmt::Display for DependencySection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returns true when the URI names an npm manifest
pub fn is_package_json(uri: &str) -> bool {
    uri == "package.json" || uri.ends_with("/package.json") || uri.ends_with("\\package.json")
}

/// A single-line text span in (line, UTF-16 column) coordinates, end exclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionSpan {
    pub line: usize,
    pub start: usize,
    pub end: usize,
}

/// One declared dependency occurrence found in a manifest
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyLocation {
    /// Package name as written (e.g., "lodash", "@types/node")
    pub package_name: String,
    /// Version text exactly as written, including any range prefix
    pub current_version_raw: String,
    /// Section the dependency was declared in
    pub section: DependencySection,
    /// Line number (0-indexed)
    pub line: usize,
    /// Column of the first version character, in UTF-16 code units
    pub version_start: usize,
    /// Length of the version text in UTF-16 code units
    pub version_length: usize,
}

impl DependencyLocation {
    /// Span of the whole version text (prefix included, quotes excluded)
    pub fn version_span(&self) -> VersionSpan {
        VersionSpan {
            line: self.line,
            start: self.version_start,
            end: self.version_start + self.version_length,
        }
    }
}
