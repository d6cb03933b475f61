//! Registry test utilities

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use version_lens::version::error::RegistryError;
use version_lens::version::registry::Registry;
use version_lens::version::types::PackageInfo;

/// In-memory registry that counts requests
#[derive(Default)]
pub struct MockRegistry {
    packages: HashMap<String, PackageInfo>,
    requests: AtomicUsize,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_package(mut self, name: &str, latest: &str, versions: Vec<&str>) -> Self {
        self.packages.insert(
            name.to_string(),
            PackageInfo::new(latest, versions.into_iter().map(str::to_string).collect()),
        );
        self
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl Registry for MockRegistry {
    async fn fetch_package_info(&self, package_name: &str) -> Result<PackageInfo, RegistryError> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.packages
            .get(package_name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(package_name.to_string()))
    }
}
