//! Registry implementations for fetching package metadata

pub mod npm;

pub use npm::NpmRegistry;
