//! Error types for QuickCompare

use thiserror::Error;

/// Result type for QuickCompare operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for QuickCompare
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Artifact error: {0}")]
    ArtifactError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl Error {
    /// True when the failure came from reading one of the two schema sources
    pub fn is_source_failure(&self) -> bool {
        matches!(self, Error::ConnectionError(_) | Error::ArtifactError(_))
    }
}

/// Convert SQL Server client errors to QuickCompare errors
impl From<tiberius::error::Error> for Error {
    fn from(error: tiberius::error::Error) -> Self {
        Error::ConnectionError(error.to_string())
    }
}

/// Convert dacpac archive errors to QuickCompare errors
impl From<zip::result::ZipError> for Error {
    fn from(error: zip::result::ZipError) -> Self {
        Error::ArtifactError(error.to_string())
    }
}

/// Convert model XML errors to QuickCompare errors
impl From<quick_xml::Error> for Error {
    fn from(error: quick_xml::Error) -> Self {
        Error::ArtifactError(error.to_string())
    }
}

/// Convert TOML deserialization errors to QuickCompare errors
impl From<toml::de::Error> for Error {
    fn from(error: toml::de::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}

/// Convert YAML deserialization errors to QuickCompare errors
impl From<serde_yaml::Error> for Error {
    fn from(error: serde_yaml::Error) -> Self {
        Error::ConfigError(error.to_string())
    }
}
