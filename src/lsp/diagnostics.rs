//! Diagnostics generation for version checking results

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity};

use crate::lsp::render::ResolvedDependency;
use crate::lsp::span_range;
use crate::version::semver::VersionChangeKind;

const PACKAGE_NAME: &str = env!("CARGO_PKG_NAME");

/// Generate diagnostics for every resolved dependency of a document
pub fn generate_diagnostics(dependencies: &[ResolvedDependency]) -> Vec<Diagnostic> {
    dependencies.iter().filter_map(create_diagnostic).collect()
}

/// Create a diagnostic from a resolved dependency
/// Returns None if the dependency is up to date and published
fn create_diagnostic(dependency: &ResolvedDependency) -> Option<Diagnostic> {
    let current = &dependency.location.current_version_raw;
    let latest = &dependency.latest_version;

    let (severity, message) = if !dependency.status.found {
        (
            DiagnosticSeverity::ERROR,
            format!("Version {current} not found in registry"),
        )
    } else {
        let severity = match dependency.status.kind {
            VersionChangeKind::None => return None,
            VersionChangeKind::Major => DiagnosticSeverity::WARNING,
            VersionChangeKind::Minor => DiagnosticSeverity::INFORMATION,
            VersionChangeKind::Patch => DiagnosticSeverity::HINT,
        };
        (
            severity,
            format!(
                "{} update available: {current} -> {latest}",
                capitalize(dependency.status.kind.as_str())
            ),
        )
    };

    Some(Diagnostic {
        range: span_range(dependency.location.version_span()),
        severity: Some(severity),
        message,
        source: Some(PACKAGE_NAME.to_string()),
        ..Default::default()
    })
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    chars
        .next()
        .map(|first| first.to_uppercase().chain(chars).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::{DependencyLocation, DependencySection};
    use crate::version::checker::DependencyStatus;
    use rstest::rstest;
    use tower_lsp::lsp_types::{Position, Range};

    fn resolved(version: &str, kind: VersionChangeKind, found: bool) -> ResolvedDependency {
        ResolvedDependency {
            location: DependencyLocation {
                package_name: "react".to_string(),
                current_version_raw: version.to_string(),
                section: DependencySection::Dependencies,
                line: 2,
                version_start: 14,
                version_length: version.len(),
            },
            latest_version: "19.0.0".to_string(),
            status: DependencyStatus { kind, found },
        }
    }

    #[rstest]
    #[case(
        "18.2.0",
        VersionChangeKind::Major,
        true,
        DiagnosticSeverity::WARNING,
        "Major update available: 18.2.0 -> 19.0.0"
    )]
    #[case(
        "^18.2.0",
        VersionChangeKind::Minor,
        true,
        DiagnosticSeverity::INFORMATION,
        "Minor update available: ^18.2.0 -> 19.0.0"
    )]
    #[case(
        "~18.2.0",
        VersionChangeKind::Patch,
        true,
        DiagnosticSeverity::HINT,
        "Patch update available: ~18.2.0 -> 19.0.0"
    )]
    #[case(
        "18.9.9",
        VersionChangeKind::Major,
        false,
        DiagnosticSeverity::ERROR,
        "Version 18.9.9 not found in registry"
    )]
    fn create_diagnostic_reports_status(
        #[case] version: &str,
        #[case] kind: VersionChangeKind,
        #[case] found: bool,
        #[case] severity: DiagnosticSeverity,
        #[case] message: &str,
    ) {
        let diagnostic = create_diagnostic(&resolved(version, kind, found)).unwrap();

        assert_eq!(diagnostic.severity, Some(severity));
        assert_eq!(diagnostic.message, message);
        assert_eq!(diagnostic.source.as_deref(), Some("version-lens"));
        assert_eq!(
            diagnostic.range,
            Range {
                start: Position { line: 2, character: 14 },
                end: Position {
                    line: 2,
                    character: 14 + version.len() as u32
                },
            }
        );
    }

    #[test]
    fn generate_diagnostics_skips_up_to_date_dependencies() {
        let dependencies = vec![
            resolved("19.0.0", VersionChangeKind::None, true),
            resolved("18.2.0", VersionChangeKind::Major, true),
        ];

        let diagnostics = generate_diagnostics(&dependencies);

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::WARNING));
    }
}
