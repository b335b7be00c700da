//! Logging utilities for QuickCompare
//!
//! This module provides logging setup and configuration.

use std::fs::File;
use std::path::Path;
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::LoggingConfig;
use crate::error::{Error, Result};

/// Parse a level name, defaulting to INFO
pub fn parse_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Writer for the configured destination, and whether it takes ANSI colours
///
/// Logs go to the configured file, else to stdout when `stdout` is set, else
/// to stderr so they never mix with a script written to stdout.
pub fn make_writer(config: &LoggingConfig) -> Result<(BoxMakeWriter, bool)> {
    if let Some(file_path) = &config.file {
        if let Some(parent) = Path::new(file_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = File::create(file_path)?;
        return Ok((BoxMakeWriter::new(Mutex::new(file)), false));
    }

    if config.stdout {
        Ok((BoxMakeWriter::new(std::io::stdout), true))
    } else {
        Ok((BoxMakeWriter::new(std::io::stderr), true))
    }
}

/// Initialize logging based on configuration
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let level = parse_level(&config.level);
    let directive = format!("quick_compare={}", level)
        .parse()
        .map_err(|e| Error::ConfigError(format!("Invalid log level: {}", e)))?;
    let env_filter = EnvFilter::from_default_env().add_directive(directive);
    let (writer, ansi) = make_writer(config)?;

    let builder = fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_ansi(ansi)
        .with_writer(writer);

    let result = if config.format.eq_ignore_ascii_case("json") {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(builder.finish())
    };

    result.map_err(|e| Error::Unknown(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn level_names() {
        assert_eq!(parse_level("DEBUG"), Level::DEBUG);
        assert_eq!(parse_level("warn"), Level::WARN);
        assert_eq!(parse_level("chatty"), Level::INFO);
    }

    #[test]
    fn file_writer_creates_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs").join("qc.log");
        let config = LoggingConfig {
            file: Some(path.display().to_string()),
            ..Default::default()
        };

        let (writer, ansi) = make_writer(&config).unwrap();
        writer.make_writer().write_all(b"Reading schema metadata\n").unwrap();

        assert!(!ansi);
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "Reading schema metadata\n"
        );
    }

    #[test]
    fn console_writers_keep_colours() {
        let (_, ansi) = make_writer(&LoggingConfig::default()).unwrap();
        assert!(ansi);
    }
}
