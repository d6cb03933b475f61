//! `check` report over a manifest on disk

mod helper;

use std::io::Write;

use tempfile::NamedTempFile;

use helper::MockRegistry;
use version_lens::check::{CheckError, check_manifest, format_report};

#[tokio::test]
async fn reports_every_dependency() {
    let mut manifest = NamedTempFile::new().unwrap();
    write!(
        manifest,
        r#"{{
  "dependencies": {{
    "lodash": "^4.17.20",
    "gone": "1.0.0"
  }},
  "devDependencies": {{
    "typescript": "4.9.9"
  }}
}}"#
    )
    .unwrap();

    let registry = MockRegistry::new()
        .with_package("lodash", "4.17.21", vec!["4.17.20", "4.17.21"])
        .with_package("typescript", "5.4.5", vec!["4.9.5", "5.4.5"])
        .into_shared();

    let entries = check_manifest(manifest.path(), registry).await.unwrap();

    assert_eq!(
        format_report(&entries),
        "dependencies lodash ^4.17.20 -> 4.17.21 [patch]\n\
         dependencies gone 1.0.0 -> ? [unavailable]\n\
         devDependencies typescript 4.9.9 -> 5.4.5 [major] [not found]\n"
    );
}

#[tokio::test]
async fn missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("package.json");

    let err = check_manifest(&path, MockRegistry::new().into_shared())
        .await
        .unwrap_err();

    assert!(matches!(err, CheckError::Read { .. }));
    assert!(err.to_string().starts_with("Failed to read"));
}
