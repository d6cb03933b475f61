//! LSP (Language Server Protocol) implementation layer
//!
//! This module maps the render pipeline onto editor surfaces: inlay hints
//! for annotations, diagnostics for update status, completion as the
//! version picker, and code actions for direct updates.
//!
//! # Modules
//!
//! - [`backend`]: Main LSP backend implementing `LanguageServer` trait
//! - [`render`]: Document text to annotations, one full pass per change
//! - [`zones`]: Clickable zones derived from the last render
//! - [`interaction`]: When a selection change opens the picker
//! - [`commands`]: `workspace/executeCommand` surface
//! - [`server`]: LSP server initialization and lifecycle

use tower_lsp::lsp_types::{Position, Range};

use crate::parser::types::VersionSpan;

pub mod backend;
pub mod code_action;
pub mod commands;
pub mod completion;
pub mod diagnostics;
pub mod inlay_hints;
pub mod interaction;
pub mod render;
pub mod server;
pub mod zones;

pub(crate) fn span_range(span: VersionSpan) -> Range {
    Range {
        start: Position {
            line: span.line as u32,
            character: span.start as u32,
        },
        end: Position {
            line: span.line as u32,
            character: span.end as u32,
        },
    }
}
