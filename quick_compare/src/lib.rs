//! QuickCompare: find the objects a database has that its schema no longer defines
//!
//! QuickCompare reads the tables, views and stored procedures of two schema
//! sources, each a dacpac or a live SQL Server database, and writes a script
//! dropping everything the target has that the source does not.

pub mod compare;
pub mod config;
pub mod dacpac;
pub mod db;
pub mod error;
pub mod schema;
pub mod utils;
pub mod writer;

// Re-export main types for easier access
pub use compare::Comparator;
pub use config::Config;
pub use dacpac::SchemaModel;
pub use db::connection::{ConnectionSettings, DatabaseConnection};
pub use error::{Error, Result};
pub use schema::diff::SnapshotDiff;
pub use schema::generator::DropScriptGenerator;
pub use schema::snapshot::Snapshot;
pub use schema::types::{Category, QualifiedName, SchemaSource};
pub use writer::{OutputTarget, ScriptWriter};

/// Load a configuration file and run the comparison it describes
pub async fn run(config_path: &str) -> Result<SnapshotDiff> {
    let config = config::load_from_file(config_path)?;
    run_with_config(&config).await
}

/// Run the comparison described by an already loaded configuration
pub async fn run_with_config(config: &Config) -> Result<SnapshotDiff> {
    let mut comparator = config.build_comparator()?;
    comparator.compare().await
}
