#![allow(dead_code, unused_imports)]

mod lsp;
mod registry;

pub use lsp::*;
pub use registry::*;
