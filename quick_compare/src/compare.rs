//! Snapshot comparison
//!
//! The comparator refreshes a desired-state source snapshot and a
//! current-state target snapshot, then writes a script dropping every target
//! object the source does not define.

use crate::error::Result;
use crate::schema::diff::SnapshotDiff;
use crate::schema::generator::DropScriptGenerator;
use crate::schema::snapshot::Snapshot;
use crate::writer::{OutputTarget, ScriptWriter};

/// Compares two snapshots and writes the drop script
pub struct Comparator {
    writer: ScriptWriter,
    source: Snapshot,
    target: Snapshot,
    generator: DropScriptGenerator,
    concurrent_refresh: bool,
}

impl Comparator {
    /// Create a comparator writing to `output`
    pub fn new(output: OutputTarget, source: Snapshot, target: Snapshot) -> Self {
        Self {
            writer: ScriptWriter::new(output),
            source,
            target,
            generator: DropScriptGenerator::new(),
            concurrent_refresh: false,
        }
    }

    /// Refresh both snapshots at the same time instead of source then target
    pub fn with_concurrent_refresh(mut self, concurrent: bool) -> Self {
        self.concurrent_refresh = concurrent;
        self
    }

    pub fn source(&self) -> &Snapshot {
        &self.source
    }

    pub fn target(&self) -> &Snapshot {
        &self.target
    }

    pub fn output(&self) -> &OutputTarget {
        self.writer.target()
    }

    /// Re-read both snapshots; fails if either side fails
    pub async fn refresh(&mut self) -> Result<()> {
        if self.concurrent_refresh {
            tokio::try_join!(self.source.read_metadata(), self.target.read_metadata())?;
        } else {
            self.source.read_metadata().await?;
            self.target.read_metadata().await?;
        }

        Ok(())
    }

    /// Refresh both sides, then write the drop script
    ///
    /// Nothing is written unless both refreshes succeed.
    pub async fn compare(&mut self) -> Result<SnapshotDiff> {
        self.refresh().await?;

        let diff = SnapshotDiff::generate(&self.source, &self.target);
        for category_diff in &diff.categories {
            if category_diff.source_matched {
                tracing::info!(
                    category = %category_diff.category,
                    drops = category_diff.objects_to_drop.len(),
                    "Compared category"
                );
            } else {
                tracing::warn!(
                    category = %category_diff.category,
                    "Source does not compare this category, no drops generated"
                );
            }
        }

        let script = self.generator.generate_script(&diff);
        self.writer.write(&script)?;

        tracing::info!(
            output = %self.writer.target(),
            drops = diff.drop_count(),
            "Drop script written"
        );

        Ok(diff)
    }
}
