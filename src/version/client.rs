//! Cached, deduplicating registry client
//!
//! One `RegistryClient` is created per session and shared by reference with
//! every consumer. It owns two maps keyed by package name:
//!
//! - the cache: successful fetches, kept until [`RegistryClient::clear_cache`]
//! - the in-flight map: pending fetches, removed as soon as they settle
//!
//! Both live behind one lock, so "not cached and not in flight, start a
//! fetch" is a single atomic insert-if-absent and at most one request per
//! package name is outstanding at any instant.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt, Shared, join_all};
use tracing::{debug, info, warn};

use crate::config::FETCH_TIMEOUT_MS;
use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::types::PackageInfo;

type PendingFetch = Shared<BoxFuture<'static, Option<Arc<PackageInfo>>>>;

#[derive(Default)]
struct ClientState {
    cache: HashMap<String, Arc<PackageInfo>>,
    in_flight: HashMap<String, PendingFetch>,
}

pub struct RegistryClient {
    registry: Arc<dyn Registry>,
    state: Arc<Mutex<ClientState>>,
    timeout: Duration,
}

impl RegistryClient {
    pub fn new(registry: Arc<dyn Registry>) -> Self {
        Self::with_timeout(registry, Duration::from_millis(FETCH_TIMEOUT_MS))
    }

    /// Creates a client with a custom per-request timeout
    pub fn with_timeout(registry: Arc<dyn Registry>, timeout: Duration) -> Self {
        Self {
            registry,
            state: Arc::new(Mutex::new(ClientState::default())),
            timeout,
        }
    }

    fn lock_state(state: &Mutex<ClientState>) -> MutexGuard<'_, ClientState> {
        state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached snapshot for a package, without touching the network
    pub fn cached(&self, package_name: &str) -> Option<Arc<PackageInfo>> {
        Self::lock_state(&self.state).cache.get(package_name).cloned()
    }

    /// Get package info, fetching it if needed
    ///
    /// A cache hit resolves immediately. A caller arriving while a fetch for
    /// the same name is pending joins that fetch. Every failure is absorbed
    /// into `None`.
    pub async fn get_package_info(&self, package_name: &str) -> Option<Arc<PackageInfo>> {
        let pending = {
            let mut state = Self::lock_state(&self.state);

            if let Some(info) = state.cache.get(package_name) {
                return Some(Arc::clone(info));
            }

            match state.in_flight.get(package_name) {
                Some(pending) => {
                    debug!("Joining in-flight fetch for {}", package_name);
                    pending.clone()
                }
                None => {
                    let pending = self.start_fetch(package_name);
                    state
                        .in_flight
                        .insert(package_name.to_string(), pending.clone());
                    pending
                }
            }
        };

        pending.await
    }

    /// All published versions of a package; empty when no info is available
    pub async fn get_all_versions(&self, package_name: &str) -> Vec<String> {
        self.get_package_info(package_name)
            .await
            .map(|info| info.all_versions.clone())
            .unwrap_or_default()
    }

    /// Fetch every not-yet-cached package concurrently
    ///
    /// Completes once every fetch has settled. Individual failures are
    /// absorbed. Returns the names that resolved to info.
    pub async fn prefetch<'a, I>(&self, package_names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = HashSet::new();
        let to_fetch: Vec<&str> = package_names
            .into_iter()
            .filter(|name| seen.insert(*name))
            .filter(|name| self.cached(name).is_none())
            .collect();

        if to_fetch.is_empty() {
            debug!("All packages are already in cache");
            return Vec::new();
        }

        debug!("Prefetching {} packages", to_fetch.len());

        let results = join_all(to_fetch.iter().map(|name| self.get_package_info(name))).await;

        to_fetch
            .into_iter()
            .zip(results)
            .filter_map(|(name, info)| info.map(|_| name.to_string()))
            .collect()
    }

    /// Drop every cached snapshot; pending fetches are left to settle
    pub fn clear_cache(&self) {
        let mut state = Self::lock_state(&self.state);
        info!("Clearing {} cached packages", state.cache.len());
        state.cache.clear();
    }

    /// Spawn the single outbound request for a package
    ///
    /// The task runs to completion even if every caller stops waiting, so the
    /// in-flight entry is always removed.
    fn start_fetch(&self, package_name: &str) -> PendingFetch {
        let registry = Arc::clone(&self.registry);
        let state = Arc::clone(&self.state);
        let timeout = self.timeout;
        let name = package_name.to_string();

        let task = tokio::spawn(async move {
            let result = tokio::time::timeout(timeout, registry.fetch_package_info(&name))
                .await
                .unwrap_or_else(|_| {
                    Err(RegistryError::Timeout {
                        package: name.clone(),
                        timeout_ms: timeout.as_millis() as u64,
                    })
                });

            let info = match result {
                Ok(info) => {
                    info!(
                        "Fetched {}: latest {} ({} versions)",
                        name,
                        info.latest_version,
                        info.all_versions.len()
                    );
                    Some(Arc::new(info))
                }
                Err(RegistryError::NotFound(_)) => {
                    info!("Package not found in registry: {}", name);
                    None
                }
                Err(e) => {
                    warn!("Failed to fetch package info for {}: {}", name, e);
                    None
                }
            };

            let mut state = Self::lock_state(&state);
            if let Some(info) = &info {
                state.cache.insert(name.clone(), Arc::clone(info));
            }
            state.in_flight.remove(&name);

            info
        });

        task.map(|joined| {
            joined
                .inspect_err(|e| warn!("Fetch task failed: {}", e))
                .ok()
                .flatten()
        })
        .boxed()
        .shared()
    }

    #[cfg(test)]
    fn in_flight_count(&self) -> usize {
        Self::lock_state(&self.state).in_flight.len()
    }
}
