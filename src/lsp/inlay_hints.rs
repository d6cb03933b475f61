//! Annotations rendered as inlay hints
//!
//! Each hint carries its style bucket in `data` so clients can color the
//! buckets independently.

use serde_json::json;
use tower_lsp::lsp_types::{InlayHint, InlayHintLabel, InlayHintTooltip, Position, Range};

use crate::lsp::render::Annotation;

/// Inlay hints for the annotations whose line falls inside `range`
pub fn inlay_hints(annotations: &[Annotation], range: Range) -> Vec<InlayHint> {
    annotations
        .iter()
        .filter(|a| {
            let line = a.line as u32;
            range.start.line <= line && line <= range.end.line
        })
        .map(|annotation| InlayHint {
            position: Position {
                line: annotation.line as u32,
                character: annotation.column as u32,
            },
            label: InlayHintLabel::String(annotation.label.clone()),
            kind: None,
            text_edits: None,
            tooltip: Some(InlayHintTooltip::String(annotation.tooltip.clone())),
            padding_left: Some(true),
            padding_right: None,
            data: Some(json!({ "bucket": annotation.bucket.as_str() })),
        })
        .collect()
}
