//! Manifest text to render plan, end to end

mod helper;

use helper::MockRegistry;
use version_lens::config::DecorationConfig;
use version_lens::lsp::render::{StyleBucket, plan_document};
use version_lens::lsp::zones::ZoneTracker;
use version_lens::parser::package_json::PackageJsonScanner;
use version_lens::parser::traits::Scanner;
use version_lens::version::client::RegistryClient;
use version_lens::version::semver::VersionChangeKind;

/// Style bucket of the change annotation rendered for a manifest
async fn change_bucket(manifest: &str, registry: MockRegistry) -> StyleBucket {
    let client = RegistryClient::new(registry.into_shared());
    let plan = plan_document(
        manifest,
        &PackageJsonScanner::new(),
        &client,
        &DecorationConfig::default(),
    )
    .await;

    plan.annotations
        .iter()
        .map(|a| a.bucket)
        .find(|bucket| *bucket != StyleBucket::Icon)
        .expect("Expected a change annotation")
}

#[tokio::test]
async fn patch_update_yields_one_zone_and_patch_bucket() {
    let manifest = r#"{
  "dependencies": {
    "lodash": "4.17.20"
  }
}"#;
    let scanner = PackageJsonScanner::new();
    let locations = scanner.scan(manifest);
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0].package_name, "lodash");
    assert_eq!(locations[0].line, 2);
    assert_eq!(locations[0].version_start, 15);

    let registry = MockRegistry::new()
        .with_package("lodash", "4.17.21", vec!["4.17.20", "4.17.21"])
        .into_shared();
    let client = RegistryClient::new(registry);
    let decorations = DecorationConfig::default();

    let plan = plan_document(manifest, &scanner, &client, &decorations).await;

    assert_eq!(plan.dependencies.len(), 1);
    assert_eq!(plan.dependencies[0].status.kind, VersionChangeKind::Patch);
    assert!(plan.dependencies[0].status.found);

    let mut zones = ZoneTracker::new();
    zones.rebuild(manifest, &plan.dependencies, &decorations);
    assert_eq!(zones.zones().len(), 1);
    assert!(zones.lookup(2, 15).is_some());

    let patch = change_bucket(
        manifest,
        MockRegistry::new().with_package("lodash", "4.17.21", vec!["4.17.20", "4.17.21"]),
    )
    .await;
    let major = change_bucket(
        manifest,
        MockRegistry::new().with_package("lodash", "5.0.0", vec!["4.17.20", "5.0.0"]),
    )
    .await;

    assert_eq!(patch, StyleBucket::Patch);
    assert_eq!(major, StyleBucket::Major);
    assert_ne!(patch, major);
}

#[tokio::test]
async fn duplicate_packages_are_fetched_once() {
    let manifest = r#"{
  "dependencies": { "react": "^18.0.0" },
  "peerDependencies": { "react": ">=17" }
}"#;
    let registry = MockRegistry::new()
        .with_package("react", "18.3.1", vec!["17.0.2", "18.0.0", "18.3.1"])
        .into_shared();
    let client = RegistryClient::new(registry.clone());

    let plan = plan_document(
        manifest,
        &PackageJsonScanner::new(),
        &client,
        &DecorationConfig::default(),
    )
    .await;

    assert_eq!(plan.dependencies.len(), 2);
    assert_eq!(registry.requests(), 1);
}

#[tokio::test]
async fn unknown_packages_are_left_unannotated() {
    let manifest = r#"{
  "dependencies": {
    "lodash": "4.17.21",
    "not-on-npm": "1.0.0",
    "local": "file:../local"
  }
}"#;
    let registry = MockRegistry::new()
        .with_package("lodash", "4.17.21", vec!["4.17.21"])
        .into_shared();
    let client = RegistryClient::new(registry.clone());

    let plan = plan_document(
        manifest,
        &PackageJsonScanner::new(),
        &client,
        &DecorationConfig::default(),
    )
    .await;

    assert_eq!(plan.dependencies.len(), 1);
    assert_eq!(plan.dependencies[0].status.kind, VersionChangeKind::None);
    // Only the icon; no change and no marker
    assert_eq!(plan.annotations.len(), 1);
    // The file: dependency never reaches the registry
    assert_eq!(registry.requests(), 2);
}
