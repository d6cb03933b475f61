//! Clickable zones: the span a dependency's version plus its annotations
//! occupy on a line

use crate::config::DecorationConfig;
use crate::lsp::render::{ResolvedDependency, annotation_width, annotations_for};
use crate::parser::position::{LineIndex, byte_index, utf16_len};
use crate::parser::types::{DependencyLocation, VersionSpan};
use crate::version::ranker::replace_span;

/// Region that reacts to selection by opening the picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClickableZone {
    pub line: usize,
    pub start: usize,
    /// Exclusive
    pub end: usize,
    pub dependency: DependencyLocation,
    pub latest_version: String,
}

impl ClickableZone {
    /// `limit` is the first column owned by the next dependency on the line
    fn from_dependency(
        dependency: &ResolvedDependency,
        decorations: &DecorationConfig,
        limit: Option<usize>,
    ) -> Self {
        let location = &dependency.location;
        let annotations = annotations_for(dependency, decorations);
        // Closing quote, then the annotations
        let reach = location.version_start
            + location.version_length
            + 1
            + annotation_width(&annotations);
        let end = limit.map_or(reach, |limit| reach.min(limit));

        Self {
            line: location.line,
            start: location.version_start,
            end,
            dependency: location.clone(),
            latest_version: dependency.latest_version.clone(),
        }
    }

    pub fn contains(&self, line: usize, column: usize) -> bool {
        self.line == line && self.start <= column && column < self.end
    }

    /// Span a chosen version is written into
    pub fn replace_span(&self) -> VersionSpan {
        replace_span(&self.dependency)
    }
}

/// Zones of one document, replaced wholesale on every render
#[derive(Debug, Default)]
pub struct ZoneTracker {
    zones: Vec<ClickableZone>,
}

impl ZoneTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Zones never overlap: a zone stops where the next dependency on the
    /// same line starts its key.
    pub fn rebuild(
        &mut self,
        text: &str,
        dependencies: &[ResolvedDependency],
        decorations: &DecorationConfig,
    ) {
        let index = LineIndex::new(text);
        self.zones = dependencies
            .iter()
            .map(|dependency| {
                let limit = next_on_line(dependency, dependencies)
                    .map(|next| key_start(&index, &next.location));
                ClickableZone::from_dependency(dependency, decorations, limit)
            })
            .collect();
    }

    pub fn zones(&self) -> &[ClickableZone] {
        &self.zones
    }

    /// First zone containing the position, if any
    pub fn lookup(&self, line: usize, column: usize) -> Option<&ClickableZone> {
        self.zones.iter().find(|zone| zone.contains(line, column))
    }
}

/// Closest dependency declared after `dependency` on the same line
fn next_on_line<'a>(
    dependency: &ResolvedDependency,
    dependencies: &'a [ResolvedDependency],
) -> Option<&'a ResolvedDependency> {
    let location = &dependency.location;
    dependencies
        .iter()
        .filter(|other| {
            other.location.line == location.line
                && other.location.version_start > location.version_start
        })
        .min_by_key(|other| other.location.version_start)
}

/// Column of the opening quote of a dependency's key
///
/// Falls back to the opening quote of its version when the key is not found.
fn key_start(index: &LineIndex<'_>, location: &DependencyLocation) -> usize {
    let version_quote = location.version_start.saturating_sub(1);
    let key = format!("\"{}\"", location.package_name);

    index
        .line(location.line)
        .and_then(|line| {
            let before = &line[..byte_index(line, version_quote)?];
            before.rfind(&key).map(|found| utf16_len(&line[..found]))
        })
        .unwrap_or(version_quote)
}
