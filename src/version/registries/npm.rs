//! npm registry API implementation
//!
//! Requests the abbreviated ("corgi") metadata document, which carries
//! `dist-tags` and the `versions` map without per-version manifests.

use std::collections::HashMap;
use std::time::Duration;

use indexmap::IndexMap;
use reqwest::header::ACCEPT;
use serde::Deserialize;
use serde::de::IgnoredAny;
use tracing::{debug, warn};

use crate::config::{
    ABBREVIATED_METADATA_ACCEPT, DEFAULT_REGISTRY_URL, FETCH_TIMEOUT_MS, USER_AGENT,
};
use crate::version::error::RegistryError;
use crate::version::registry::Registry;
use crate::version::types::PackageInfo;

/// Abbreviated metadata document from the npm registry
#[derive(Debug, Deserialize)]
struct NpmAbbreviatedResponse {
    #[serde(rename = "dist-tags")]
    dist_tags: HashMap<String, String>,
    /// Keys are kept in document order
    versions: IndexMap<String, IgnoredAny>,
}

/// Registry implementation for the npm registry API
#[derive(Clone)]
pub struct NpmRegistry {
    client: reqwest::Client,
    base_url: String,
}

impl NpmRegistry {
    /// Creates a new NpmRegistry with a custom base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(Duration::from_millis(FETCH_TIMEOUT_MS))
                .build()
                .expect("Failed to create HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Encode package name for a URL path segment
    ///
    /// Scoped packages keep their leading `@` and encode the rest:
    /// `@scope/name` -> `@scope%2Fname`
    fn encode_package_name(package_name: &str) -> String {
        match package_name.strip_prefix('@') {
            Some(scoped) => format!("@{}", urlencoding::encode(scoped)),
            None => urlencoding::encode(package_name).into_owned(),
        }
    }

    fn map_send_error(package_name: &str, error: reqwest::Error) -> RegistryError {
        if error.is_timeout() {
            RegistryError::Timeout {
                package: package_name.to_string(),
                timeout_ms: FETCH_TIMEOUT_MS,
            }
        } else {
            RegistryError::Network(error)
        }
    }
}

impl Default for NpmRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY_URL)
    }
}

#[async_trait::async_trait]
impl Registry for NpmRegistry {
    async fn fetch_package_info(&self, package_name: &str) -> Result<PackageInfo, RegistryError> {
        let encoded_name = Self::encode_package_name(package_name);
        let url = format!("{}/{}", self.base_url, encoded_name);
        debug!("Fetching npm metadata: {}", url);

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, ABBREVIATED_METADATA_ACCEPT)
            .send()
            .await
            .map_err(|e| Self::map_send_error(package_name, e))?;

        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::NotFound(package_name.to_string()));
        }

        if status != reqwest::StatusCode::OK {
            warn!("npm registry returned status {}: {}", status, url);
            return Err(RegistryError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body: NpmAbbreviatedResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                return Self::map_send_error(package_name, e);
            }
            warn!("Failed to parse npm registry response: {}", e);
            RegistryError::InvalidResponse(e.to_string())
        })?;

        let NpmAbbreviatedResponse {
            mut dist_tags,
            versions,
        } = body;

        let latest = dist_tags.remove("latest").ok_or_else(|| {
            warn!("npm registry response for {} has no latest tag", package_name);
            RegistryError::InvalidResponse(format!("{package_name}: missing dist-tags.latest"))
        })?;

        Ok(PackageInfo::new(latest, versions.into_keys().collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use rstest::rstest;

    #[tokio::test]
    async fn fetch_package_info_returns_latest_and_versions_in_document_order() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/lodash")
            .match_header("accept", Matcher::Regex("vnd.npm.install-v1".to_string()))
            .match_header("user-agent", USER_AGENT)
            .with_status(200)
            .with_header("content-type", "application/vnd.npm.install-v1+json")
            .with_body(
                r#"{
                    "name": "lodash",
                    "dist-tags": { "latest": "4.17.21" },
                    "versions": {
                        "4.17.21": {},
                        "4.17.19": {},
                        "4.17.20": {}
                    }
                }"#,
            )
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.fetch_package_info("lodash").await.unwrap();

        mock.assert_async().await;
        assert_eq!(
            result,
            PackageInfo::new(
                "4.17.21",
                vec![
                    "4.17.21".to_string(),
                    "4.17.19".to_string(),
                    "4.17.20".to_string()
                ]
            )
        );
    }

    #[tokio::test]
    async fn fetch_package_info_returns_not_found_for_nonexistent_package() {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/nonexistent-package")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error": "Not found"}"#)
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.fetch_package_info("nonexistent-package").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(RegistryError::NotFound(_))));
    }

    #[tokio::test]
    async fn fetch_package_info_handles_scoped_package() {
        let mut server = Server::new_async().await;

        // Scoped packages use URL encoding: @types/node -> @types%2Fnode
        let mock = server
            .mock("GET", "/@types%2Fnode")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{
                    "name": "@types/node",
                    "dist-tags": { "latest": "20.0.0" },
                    "versions": {
                        "18.0.0": {},
                        "20.0.0": {}
                    }
                }"#,
            )
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.fetch_package_info("@types/node").await.unwrap();

        mock.assert_async().await;
        assert_eq!(result.latest_version, "20.0.0");
        assert_eq!(result.all_versions, vec!["18.0.0", "20.0.0"]);
    }

    #[rstest]
    #[case(500, r#"{"error": "internal"}"#)]
    #[case(403, r#"{"error": "forbidden"}"#)]
    #[case(502, "")]
    #[tokio::test]
    async fn fetch_package_info_fails_on_unexpected_status(
        #[case] status: usize,
        #[case] body: &str,
    ) {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/lodash")
            .with_status(status)
            .with_body(body)
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.fetch_package_info("lodash").await;

        assert!(matches!(
            result,
            Err(RegistryError::UnexpectedStatus { status: s, .. }) if s as usize == status
        ));
    }

    #[rstest]
    #[case::not_json("<html>oops</html>")]
    #[case::missing_versions(r#"{"dist-tags": {"latest": "1.0.0"}}"#)]
    #[case::missing_dist_tags(r#"{"versions": {"1.0.0": {}}}"#)]
    #[case::missing_latest_tag(r#"{"dist-tags": {"next": "2.0.0-rc.1"}, "versions": {"1.0.0": {}}}"#)]
    #[case::versions_not_an_object(r#"{"dist-tags": {"latest": "1.0.0"}, "versions": ["1.0.0"]}"#)]
    #[tokio::test]
    async fn fetch_package_info_rejects_malformed_documents(#[case] body: &str) {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/broken")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await;

        let registry = NpmRegistry::new(&server.url());
        let result = registry.fetch_package_info("broken").await;

        assert!(matches!(result, Err(RegistryError::InvalidResponse(_))));
    }

    #[rstest]
    #[case("lodash", "lodash")]
    #[case("@types/node", "@types%2Fnode")]
    #[case("@babel/plugin-transform-runtime", "@babel%2Fplugin-transform-runtime")]
    fn encode_package_name_preserves_scope_marker(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(NpmRegistry::encode_package_name(name), expected);
    }

    #[test]
    fn new_trims_trailing_slash_from_base_url() {
        let registry = NpmRegistry::new("https://registry.example.com/");
        assert_eq!(registry.base_url, "https://registry.example.com");
    }
}
