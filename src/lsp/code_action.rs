//! Code action generation for updating a dependency to its latest version

use std::collections::HashMap;

use tower_lsp::lsp_types::{CodeAction, CodeActionKind, Position, TextEdit, Url, WorkspaceEdit};

use crate::lsp::render::ResolvedDependency;
use crate::lsp::span_range;
use crate::version::ranker::replace_span;
use crate::version::semver::{VersionChangeKind, split_range_prefix};

/// Index of resolved dependencies grouped by line number for efficient lookup
pub struct DependencyIndex<'a> {
    by_line: HashMap<u32, Vec<&'a ResolvedDependency>>,
}

impl<'a> DependencyIndex<'a> {
    pub fn new(dependencies: &'a [ResolvedDependency]) -> Self {
        let mut by_line: HashMap<u32, Vec<&'a ResolvedDependency>> = HashMap::new();
        for dependency in dependencies {
            by_line
                .entry(dependency.location.line as u32)
                .or_default()
                .push(dependency);
        }
        Self { by_line }
    }

    /// Find the dependency whose version text holds the cursor
    ///
    /// The position right after the last version character still counts,
    /// since that is where the cursor sits after typing.
    pub fn find_at_position(&self, position: Position) -> Option<&'a ResolvedDependency> {
        let on_line = self.by_line.get(&position.line)?;

        on_line.iter().copied().find(|dependency| {
            let span = dependency.location.version_span();
            let character = position.character as usize;
            span.start <= character && character <= span.end
        })
    }
}

/// Generate the "update to latest" action for a dependency
///
/// The range prefix is kept; only the bare version is replaced.
///
/// Returns an empty Vec when the dependency is up to date and published.
pub fn generate_update_actions(dependency: &ResolvedDependency, uri: &Url) -> Vec<CodeAction> {
    let status = dependency.status;
    if status.kind == VersionChangeKind::None && status.found {
        return vec![];
    }

    let (prefix, _) = split_range_prefix(&dependency.location.current_version_raw);
    let new_version = format!("{prefix}{}", dependency.latest_version);
    if new_version == dependency.location.current_version_raw {
        return vec![];
    }

    let title = format!(
        "Update {} to {new_version}",
        dependency.location.package_name
    );

    vec![create_update_action(&title, dependency, uri)]
}

fn create_update_action(title: &str, dependency: &ResolvedDependency, uri: &Url) -> CodeAction {
    let text_edit = TextEdit {
        range: span_range(replace_span(&dependency.location)),
        new_text: dependency.latest_version.clone(),
    };

    let mut changes = HashMap::new();
    changes.insert(uri.clone(), vec![text_edit]);

    CodeAction {
        title: title.to_string(),
        kind: Some(CodeActionKind::QUICKFIX),
        is_preferred: Some(dependency.status.found),
        edit: Some(WorkspaceEdit {
            changes: Some(changes),
            ..Default::default()
        }),
        ..Default::default()
    }
}
