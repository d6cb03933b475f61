//! Scanner trait definition

#[cfg(test)]
use mockall::automock;

use crate::parser::types::DependencyLocation;

/// Trait for extracting dependency declarations from manifest text
///
/// Implementations never fail past this boundary: unparseable input yields
/// fewer (or zero) locations and a logged diagnostic.
#[cfg_attr(test, automock)]
pub trait Scanner: Send + Sync {
    /// Check if this scanner can handle the given URI
    fn can_scan(&self, uri: &str) -> bool;

    /// Scan the content: section order, then match order within a section
    fn scan(&self, content: &str) -> Vec<DependencyLocation>;
}

/// Reasons a matched dependency is dropped from scan output
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScanError {
    /// The match offset does not map to a position in the document
    #[error("Offset {0} is outside the document")]
    OffsetOutOfRange(usize),

    /// The quoted version could not be re-located on its computed line
    #[error("Version \"{version}\" of {package} not found on line {line}")]
    SpanNotFound {
        package: String,
        version: String,
        line: usize,
    },
}
