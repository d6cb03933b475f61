//! Common types for the version layer

/// Registry snapshot for one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Version pointed to by the "latest" distribution tag
    pub latest_version: String,
    /// Every published version, in the order the registry listed them
    pub all_versions: Vec<String>,
}

impl PackageInfo {
    pub fn new(latest_version: impl Into<String>, all_versions: Vec<String>) -> Self {
        Self {
            latest_version: latest_version.into(),
            all_versions,
        }
    }

    pub fn has_version(&self, version: &str) -> bool {
        self.all_versions.iter().any(|v| v == version)
    }
}
