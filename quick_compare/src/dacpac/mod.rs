//! Dacpac module for QuickCompare
//!
//! This module reads compiled schema models.

pub mod model;

// Re-export key types
pub use model::{ModelElement, SchemaModel};
