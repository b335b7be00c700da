//! Schema module for QuickCompare
//!
//! This module handles object enumeration, snapshot comparison, and drop script generation.

pub mod diff;
pub mod generator;
pub mod provider;
pub mod snapshot;
pub mod types;

// Re-export key types
pub use diff::{CategoryDiff, SnapshotDiff};
pub use generator::DropScriptGenerator;
pub use provider::{CatalogObjectProvider, ModelObjectProvider, ObjectProvider};
pub use snapshot::Snapshot;
pub use types::{Category, ObjectSet, QualifiedName, SchemaSource};
