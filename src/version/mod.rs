//! Version management layer for npm dependency annotations
//!
//! This module fetches package metadata from the npm registry, keeps it in an
//! in-memory cache, classifies version deltas and ranks candidate versions for
//! interactive selection.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────────┐     ┌─────────────┐
//! │  Registry   │────▶│ RegistryClient  │◀────│   Checker   │
//! │ (transport) │     │ (cache, dedup)  │     │  (status)   │
//! └─────────────┘     └─────────────────┘     └─────────────┘
//!        │                     │                     │
//!        ▼                     ▼                     ▼
//! ┌─────────────┐       ┌─────────────┐       ┌─────────────┐
//! │ registries  │       │   Ranker    │       │   Semver    │
//! │   (npm)     │       │ (candidates)│       │ (classify)  │
//! └─────────────┘       └─────────────┘       └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`client`]: Cached, deduplicating registry client
//! - [`checker`]: Per-dependency change kind and existence check
//! - [`range`]: npm range matching for the version-not-found check
//! - [`ranker`]: Ordered candidate list for the version picker
//! - [`registry`]: Registry trait for fetching metadata from remote sources
//! - [`registries`]: Concrete registry implementations
//! - [`error`]: Error types for registry operations
//! - [`semver`]: Version parsing and change classification
//! - [`types`]: Common types like `PackageInfo`

pub mod checker;
pub mod client;
pub mod error;
pub mod range;
pub mod ranker;
pub mod registries;
pub mod registry;
pub mod semver;
pub mod types;
