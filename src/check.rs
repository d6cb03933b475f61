//! One-shot dependency report for the command line

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::parser::package_json::PackageJsonScanner;
use crate::parser::traits::Scanner;
use crate::parser::types::DependencyLocation;
use crate::version::checker::{DependencyStatus, check_dependency};
use crate::version::client::RegistryClient;
use crate::version::registry::Registry;

#[derive(Debug, Error)]
pub enum CheckError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// One dependency line of the report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckEntry {
    pub location: DependencyLocation,
    /// None when the registry had no info for the package
    pub latest_version: Option<String>,
    pub status: Option<DependencyStatus>,
}

/// Scan a manifest file, fetch every package and classify each dependency
pub async fn check_manifest(
    path: &Path,
    registry: Arc<dyn Registry>,
) -> Result<Vec<CheckEntry>, CheckError> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CheckError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let locations = PackageJsonScanner::new().scan(&content);
    debug!("Found {} dependencies in {}", locations.len(), path.display());

    let client = RegistryClient::new(registry);
    client
        .prefetch(locations.iter().map(|l| l.package_name.as_str()))
        .await;

    Ok(locations
        .into_iter()
        .map(|location| {
            let info = client.cached(&location.package_name);
            CheckEntry {
                status: info
                    .as_ref()
                    .map(|info| check_dependency(&location.current_version_raw, info)),
                latest_version: info.map(|info| info.latest_version.clone()),
                location,
            }
        })
        .collect())
}

/// `<section> <name> <current> -> <latest> [<kind>] [not found]`
pub fn format_entry(entry: &CheckEntry) -> String {
    let location = &entry.location;
    let mut line = format!(
        "{} {} {} -> {}",
        location.section,
        location.package_name,
        location.current_version_raw,
        entry.latest_version.as_deref().unwrap_or("?")
    );

    match entry.status {
        Some(status) => {
            line.push_str(&format!(" [{}]", status.kind));
            if !status.found {
                line.push_str(" [not found]");
            }
        }
        None => line.push_str(" [unavailable]"),
    }

    line
}

pub fn format_report(entries: &[CheckEntry]) -> String {
    entries
        .iter()
        .map(|entry| format_entry(entry) + "\n")
        .collect()
}
