//! Configuration handling for QuickCompare

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::compare::Comparator;
use crate::db::connection::ConnectionSettings;
use crate::error::{Error, Result};
use crate::schema::snapshot::Snapshot;
use crate::schema::types::{Category, SchemaSource};
use crate::writer::OutputTarget;

/// Load configuration from a TOML file, or YAML when the extension is `.yaml`/`.yml`
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let config_str = fs::read_to_string(path)
        .map_err(|e| Error::ConfigError(format!("Failed to read config file: {}", e)))?;

    let is_yaml = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"))
        .unwrap_or(false);

    let config: Config = if is_yaml {
        serde_yaml::from_str(&config_str)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?
    } else {
        toml::from_str(&config_str)
            .map_err(|e| Error::ConfigError(format!("Failed to parse config file: {}", e)))?
    };

    Ok(config)
}

/// Represents the complete QuickCompare configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    /// Script path, `-` for stdout
    pub output: Option<PathBuf>,
    /// Object types to compare; empty means all of them
    pub types: Vec<Category>,
    pub concurrent_refresh: bool,
    /// Desired state
    pub source: ConnectionModel,
    /// Current state to clean up
    pub target: ConnectionModel,
    pub logging: Option<LoggingConfig>,
}

/// One side of the comparison, as the user described it
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct ConnectionModel {
    pub dacpac: Option<PathBuf>,
    pub connection_string: Option<String>,
    pub server: Option<String>,
    pub database: Option<String>,
    pub connect_timeout_seconds: Option<u64>,
}

/// Logging configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
    pub format: String,
    pub stdout: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
            format: "text".to_string(),
            stdout: false,
        }
    }
}

impl ConnectionModel {
    /// Pick the schema source this side describes
    ///
    /// A dacpac path wins over connection details, and an explicit connection
    /// string wins over a server/database pair.
    pub fn resolve(&self) -> Result<SchemaSource> {
        if let Some(dacpac) = self.dacpac.as_ref().filter(|p| !p.as_os_str().is_empty()) {
            return Ok(SchemaSource::Dacpac(dacpac.clone()));
        }

        let settings = match (
            non_empty(&self.connection_string),
            non_empty(&self.server),
            non_empty(&self.database),
        ) {
            (Some(connection_string), _, _) => ConnectionSettings::new(connection_string),
            (None, Some(server), Some(database)) => ConnectionSettings::trusted(server, database),
            (None, Some(_), None) => {
                return Err(Error::ConfigError(
                    "A database server was given without a database name".to_string(),
                ))
            }
            (None, None, Some(_)) => {
                return Err(Error::ConfigError(
                    "A database name was given without a database server".to_string(),
                ))
            }
            (None, None, None) => {
                return Err(Error::ConfigError(
                    "Neither a dacpac file nor database connection details were given".to_string(),
                ))
            }
        };

        Ok(SchemaSource::Database(settings.with_connect_timeout(
            self.connect_timeout_seconds.map(Duration::from_secs),
        )))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl Config {
    /// Categories to compare, all of them when none are listed
    pub fn categories(&self) -> Vec<Category> {
        if self.types.is_empty() {
            Category::ALL.to_vec()
        } else {
            Category::canonical(&self.types)
        }
    }

    pub fn output_target(&self) -> Result<OutputTarget> {
        self.output
            .as_ref()
            .map(OutputTarget::from_path)
            .ok_or_else(|| Error::ConfigError("No output file was given".to_string()))
    }

    /// Build the comparator this configuration describes
    pub fn build_comparator(&self) -> Result<Comparator> {
        let categories = self.categories();
        let source = Snapshot::new(self.source.resolve().map_err(|e| side_error("source", e))?, &categories);
        let target = Snapshot::new(self.target.resolve().map_err(|e| side_error("target", e))?, &categories);

        Ok(Comparator::new(self.output_target()?, source, target)
            .with_concurrent_refresh(self.concurrent_refresh))
    }
}

fn side_error(side: &str, error: Error) -> Error {
    match error {
        Error::ConfigError(message) => Error::ConfigError(format!("{}: {}", side, message)),
        other => other,
    }
}
