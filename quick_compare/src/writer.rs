//! Script output
//!
//! Writes a finished drop script to a file or stdout. Files are written to a
//! temporary sibling and renamed into place, so a reader never sees a partial
//! script.

use std::fmt;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// Where the drop script goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
}

impl OutputTarget {
    /// `-` means stdout, anything else is a file path
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if path == Path::new("-") {
            OutputTarget::Stdout
        } else {
            OutputTarget::File(path.to_path_buf())
        }
    }
}

impl fmt::Display for OutputTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputTarget::File(path) => write!(f, "{}", path.display()),
            OutputTarget::Stdout => f.write_str("<stdout>"),
        }
    }
}

/// Serializes drop scripts to an [`OutputTarget`]
#[derive(Debug, Clone)]
pub struct ScriptWriter {
    target: OutputTarget,
}

impl ScriptWriter {
    pub fn new(target: OutputTarget) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    /// Replace the destination's content with `script`
    pub fn write(&self, script: &str) -> Result<()> {
        match &self.target {
            OutputTarget::File(path) => write_file_atomically(path, script),
            OutputTarget::Stdout => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(script.as_bytes())?;
                handle.flush()?;
                Ok(())
            }
        }
    }
}

fn write_file_atomically(path: &Path, contents: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&dir)?;

    let mut file = NamedTempFile::new_in(&dir)?;
    file.write_all(contents.as_bytes())?;
    file.as_file().sync_all()?;
    file.persist(path).map_err(|e| Error::IoError(e.error))?;

    tracing::debug!(path = %path.display(), bytes = contents.len(), "Wrote script");
    Ok(())
}
