//! Database module for QuickCompare
//!
//! This module handles SQL Server connections and catalog queries.

pub mod catalog;
pub mod connection;

// Re-export key types
pub use connection::{ConnectionSettings, DatabaseConnection};
