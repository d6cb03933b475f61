//! Version picker: ranked candidates as completion items or a command payload

use serde::Serialize;
use tower_lsp::lsp_types::{
    CompletionItem, CompletionItemKind, CompletionTextEdit, Range, TextEdit,
};

use crate::lsp::span_range;
use crate::parser::types::DependencyLocation;
use crate::version::ranker::{Candidate, rank_candidates, replace_span, retain_stable};
use crate::version::types::PackageInfo;

/// Picker contents returned to clients that render their own list
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerPayload {
    pub package_name: String,
    /// Range a chosen version replaces
    pub range: Range,
    pub candidates: Vec<Candidate>,
}

/// Ranked candidates for a dependency
pub fn picker_candidates(
    location: &DependencyLocation,
    info: &PackageInfo,
    show_prerelease: bool,
) -> Vec<Candidate> {
    let mut candidates = rank_candidates(
        &info.all_versions,
        &info.latest_version,
        &location.current_version_raw,
    );
    if !show_prerelease {
        retain_stable(&mut candidates);
    }
    candidates
}

/// Picker payload, or None when the package has no published versions
pub fn picker_payload(
    location: &DependencyLocation,
    info: &PackageInfo,
    show_prerelease: bool,
) -> Option<PickerPayload> {
    let candidates = picker_candidates(location, info, show_prerelease);
    if candidates.is_empty() {
        return None;
    }

    Some(PickerPayload {
        package_name: location.package_name.clone(),
        range: span_range(replace_span(location)),
        candidates,
    })
}

/// Candidates as completion items that overwrite the bare version text
pub fn completion_items(
    location: &DependencyLocation,
    info: &PackageInfo,
    show_prerelease: bool,
) -> Vec<CompletionItem> {
    let range = span_range(replace_span(location));

    picker_candidates(location, info, show_prerelease)
        .into_iter()
        .map(|candidate| CompletionItem {
            label: candidate.version.clone(),
            kind: Some(CompletionItemKind::VALUE),
            detail: candidate.detail(),
            preselect: candidate.preselect().then_some(true),
            sort_text: Some(candidate.sort_text.clone()),
            filter_text: Some(candidate.filter_text.clone()),
            text_edit: Some(CompletionTextEdit::Edit(TextEdit {
                range,
                new_text: candidate.version,
            })),
            ..Default::default()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::DependencySection;
    use tower_lsp::lsp_types::Position;

    fn location(version: &str) -> DependencyLocation {
        DependencyLocation {
            package_name: "react".to_string(),
            current_version_raw: version.to_string(),
            section: DependencySection::Dependencies,
            line: 2,
            version_start: 14,
            version_length: version.len(),
        }
    }

    fn info() -> PackageInfo {
        PackageInfo::new(
            "18.2.0",
            vec![
                "17.0.2".to_string(),
                "18.2.0".to_string(),
                "19.0.0-rc.1".to_string(),
            ],
        )
    }

    #[test]
    fn completion_items_replace_version_after_prefix() {
        let items = completion_items(&location("^17.0.2"), &info(), true);

        let labels: Vec<_> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["18.2.0", "19.0.0-rc.1", "17.0.2"]);

        let latest = &items[0];
        assert_eq!(latest.preselect, Some(true));
        assert_eq!(latest.detail.as_deref(), Some("latest"));
        assert_eq!(latest.sort_text.as_deref(), Some("00000"));
        assert_eq!(
            latest.text_edit,
            Some(CompletionTextEdit::Edit(TextEdit {
                range: Range {
                    start: Position { line: 2, character: 15 },
                    end: Position { line: 2, character: 21 },
                },
                new_text: "18.2.0".to_string(),
            }))
        );

        assert_eq!(items[1].detail.as_deref(), Some("prerelease"));
        assert_eq!(items[2].detail.as_deref(), Some("current"));
        assert_eq!(items[2].preselect, None);
    }

    #[test]
    fn prereleases_can_be_hidden() {
        let candidates = picker_candidates(&location("17.0.2"), &info(), false);
        let versions: Vec<_> = candidates.iter().map(|c| c.version.as_str()).collect();
        assert_eq!(versions, vec!["18.2.0", "17.0.2"]);
    }

    #[test]
    fn picker_payload_serializes_in_camel_case() {
        let payload = picker_payload(&location("17.0.2"), &info(), false).unwrap();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["packageName"], "react");
        assert_eq!(json["range"]["start"]["character"], 14);
        assert_eq!(json["candidates"][0]["version"], "18.2.0");
        assert_eq!(json["candidates"][0]["isLatest"], true);
        assert_eq!(json["candidates"][1]["isCurrent"], true);
        assert_eq!(json["candidates"][1]["sortText"], "00002");
    }

    #[test]
    fn picker_payload_is_none_without_versions() {
        let empty = PackageInfo::new("1.0.0", vec![]);
        assert!(picker_payload(&location("1.0.0"), &empty, true).is_none());
    }
}
