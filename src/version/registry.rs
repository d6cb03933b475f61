//! Registry trait for fetching package metadata from a remote source

#[cfg(test)]
use mockall::automock;

use crate::version::error::RegistryError;
use crate::version::types::PackageInfo;

/// Trait for fetching package metadata from a registry
///
/// This is the transport seam of [`RegistryClient`](crate::version::client::RegistryClient):
/// one call is one outbound request.
#[cfg_attr(test, automock)]
#[async_trait::async_trait]
pub trait Registry: Send + Sync {
    /// Fetches the latest version and all published versions of a package
    ///
    /// # Arguments
    /// * `package_name` - The name of the package (e.g., "lodash", "@types/node")
    ///
    /// # Returns
    /// * `Ok(PackageInfo)` - Latest tag and versions in registry order
    /// * `Err(RegistryError::NotFound)` - The registry does not know the package
    /// * `Err(RegistryError)` - Any other failure
    async fn fetch_package_info(&self, package_name: &str) -> Result<PackageInfo, RegistryError>;
}
