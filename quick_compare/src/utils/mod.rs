//! Utilities for QuickCompare
//!
//! This module provides utility functions used across the library.

pub mod logging;
pub mod quoting;

// Re-export key utility functions
pub use quoting::{escape_like, mask_connection_string, quote_identifier, quote_literal};
