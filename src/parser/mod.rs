//! Parser layer
//! - traits.rs: Scanner trait definition
//! - types.rs: Common types (DependencyLocation, DependencySection, VersionSpan)
//! - position.rs: Offset <-> (line, column) conversion
//! - package_json.rs: package.json dependency scanner

pub mod package_json;
pub mod position;
pub mod traits;
pub mod types;

pub use package_json::PackageJsonScanner;
pub use position::LineIndex;
pub use traits::{ScanError, Scanner};
pub use types::{DependencyLocation, DependencySection, VersionSpan};
