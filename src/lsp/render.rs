//! Render pipeline: document text -> annotations for every resolved dependency
//!
//! Every pass recomputes from the full document text; nothing is patched
//! incrementally, so results from a superseded pass are harmless.

use std::sync::Arc;

use tracing::debug;

use crate::config::DecorationConfig;
use crate::parser::position::utf16_len;
use crate::parser::traits::Scanner;
use crate::parser::types::DependencyLocation;
use crate::version::checker::{DependencyStatus, check_dependency};
use crate::version::client::RegistryClient;
use crate::version::semver::VersionChangeKind;
use crate::version::types::PackageInfo;

/// Affordance shown after every dependency with registry info
pub const PICKER_ICON: &str = "▾";

/// Marker shown when the declared version is not published
pub const NOT_FOUND_LABEL: &str = "⚠ version not found";

/// Independently styled decoration bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleBucket {
    Major,
    Minor,
    Patch,
    Invalid,
    Icon,
}

impl StyleBucket {
    pub fn as_str(&self) -> &'static str {
        match self {
            StyleBucket::Major => "major",
            StyleBucket::Minor => "minor",
            StyleBucket::Patch => "patch",
            StyleBucket::Invalid => "invalid",
            StyleBucket::Icon => "icon",
        }
    }

    fn for_change(kind: VersionChangeKind) -> Option<Self> {
        match kind {
            VersionChangeKind::None => None,
            VersionChangeKind::Patch => Some(StyleBucket::Patch),
            VersionChangeKind::Minor => Some(StyleBucket::Minor),
            VersionChangeKind::Major => Some(StyleBucket::Major),
        }
    }

    fn enabled(&self, decorations: &DecorationConfig) -> bool {
        match self {
            StyleBucket::Major => decorations.major,
            StyleBucket::Minor => decorations.minor,
            StyleBucket::Patch => decorations.patch,
            StyleBucket::Invalid => decorations.invalid,
            StyleBucket::Icon => decorations.icon,
        }
    }
}

/// Non-editable inline adornment placed after a dependency's version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub line: usize,
    /// Column right after the closing quote of the version
    pub column: usize,
    pub label: String,
    pub tooltip: String,
    pub bucket: StyleBucket,
}

/// A scanned dependency with registry info and its status
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDependency {
    pub location: DependencyLocation,
    pub latest_version: String,
    pub status: DependencyStatus,
}

/// Everything one render pass produces for a document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderPlan {
    pub dependencies: Vec<ResolvedDependency>,
    pub annotations: Vec<Annotation>,
}

/// Annotations for one dependency, in display order (icon, change, marker)
pub fn annotations_for(
    dependency: &ResolvedDependency,
    decorations: &DecorationConfig,
) -> Vec<Annotation> {
    let location = &dependency.location;
    let column = location.version_start + location.version_length + 1;

    let icon = Some((
        StyleBucket::Icon,
        PICKER_ICON.to_string(),
        format!("Choose a version of {}", location.package_name),
    ));
    let change = StyleBucket::for_change(dependency.status.kind).map(|bucket| {
        (
            bucket,
            format!("→ {}", dependency.latest_version),
            format!(
                "{} update available: {} → {}",
                dependency.status.kind, location.current_version_raw, dependency.latest_version
            ),
        )
    });
    let marker = (!dependency.status.found).then(|| {
        (
            StyleBucket::Invalid,
            NOT_FOUND_LABEL.to_string(),
            format!(
                "{} is not a published version of {}",
                location.current_version_raw, location.package_name
            ),
        )
    });

    [icon, change, marker]
        .into_iter()
        .flatten()
        .filter(|(bucket, _, _)| bucket.enabled(decorations))
        .map(|(bucket, label, tooltip)| Annotation {
            line: location.line,
            column,
            label,
            tooltip,
            bucket,
        })
        .collect()
}

/// Rendered width of a run of annotations, one separating space each
pub fn annotation_width(annotations: &[Annotation]) -> usize {
    annotations
        .iter()
        .map(|annotation| utf16_len(&annotation.label) + 1)
        .sum()
}

/// Build a render plan from scanned locations and a metadata lookup
///
/// Dependencies the lookup has no info for are left out entirely.
pub fn build_plan<F>(
    locations: Vec<DependencyLocation>,
    lookup: F,
    decorations: &DecorationConfig,
) -> RenderPlan
where
    F: Fn(&str) -> Option<Arc<PackageInfo>>,
{
    let dependencies: Vec<ResolvedDependency> = locations
        .into_iter()
        .filter_map(|location| {
            let info = lookup(&location.package_name)?;
            let status = check_dependency(&location.current_version_raw, &info);
            Some(ResolvedDependency {
                location,
                latest_version: info.latest_version.clone(),
                status,
            })
        })
        .collect();

    let annotations = dependencies
        .iter()
        .flat_map(|dependency| annotations_for(dependency, decorations))
        .collect();

    RenderPlan {
        dependencies,
        annotations,
    }
}

/// Plan a document using only metadata already in the cache
pub fn plan_cached(
    content: &str,
    scanner: &dyn Scanner,
    registry: &RegistryClient,
    decorations: &DecorationConfig,
) -> RenderPlan {
    build_plan(
        scanner.scan(content),
        |name| registry.cached(name),
        decorations,
    )
}

/// Scan a document, fetch missing metadata, and plan it
pub async fn plan_document(
    content: &str,
    scanner: &dyn Scanner,
    registry: &RegistryClient,
    decorations: &DecorationConfig,
) -> RenderPlan {
    let locations = scanner.scan(content);
    debug!("Scanned {} dependencies", locations.len());

    registry
        .prefetch(locations.iter().map(|l| l.package_name.as_str()))
        .await;

    build_plan(locations, |name| registry.cached(name), decorations)
}
