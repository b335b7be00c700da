//! Snapshot difference calculator
//!
//! This module finds the objects a target snapshot has that the source
//! snapshot does not define.

use crate::schema::snapshot::Snapshot;
use crate::schema::types::{Category, QualifiedName};

/// Drops needed for one target category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryDiff {
    pub category: Category,
    /// Whether the source snapshot configures this category at all
    pub source_matched: bool,
    pub objects_to_drop: Vec<QualifiedName>,
}

/// Per-category drops, in the target's configuration order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub categories: Vec<CategoryDiff>,
}

impl SnapshotDiff {
    /// Compare a desired-state `source` with the current-state `target`
    ///
    /// Only the target's categories are visited. A target category the source
    /// does not configure yields no drops.
    pub fn generate(source: &Snapshot, target: &Snapshot) -> Self {
        let categories = target
            .categories()
            .iter()
            .map(|&category| {
                let target_objects = target.objects(category);

                match (source.objects(category), target_objects) {
                    (Some(source_objects), Some(target_objects)) => CategoryDiff {
                        category,
                        source_matched: true,
                        objects_to_drop: target_objects
                            .iter()
                            .filter(|name| !source_objects.contains(*name))
                            .cloned()
                            .collect(),
                    },
                    (source_objects, _) => CategoryDiff {
                        category,
                        source_matched: source_objects.is_some(),
                        objects_to_drop: Vec::new(),
                    },
                }
            })
            .collect();

        Self { categories }
    }

    /// Total number of objects to drop
    pub fn drop_count(&self) -> usize {
        self.categories
            .iter()
            .map(|diff| diff.objects_to_drop.len())
            .sum()
    }

    /// Check if the diff is empty (nothing to drop)
    pub fn is_empty(&self) -> bool {
        self.drop_count() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::types::{ObjectSet, SchemaSource};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn set(names: &[&str]) -> ObjectSet {
        names.iter().map(|name| QualifiedName::from(*name)).collect()
    }

    fn snapshot(entries: Vec<(Category, ObjectSet)>) -> Snapshot {
        Snapshot::from_objects(SchemaSource::Dacpac(PathBuf::from("test.dacpac")), entries)
    }

    #[test]
    fn extras_keep_target_order() {
        let source = snapshot(vec![(Category::Table, set(&["[dbo].[B]"]))]);
        let target = snapshot(vec![(
            Category::Table,
            set(&["[dbo].[C]", "[dbo].[B]", "[dbo].[A]"]),
        )]);

        let diff = SnapshotDiff::generate(&source, &target);

        assert_eq!(
            diff.categories,
            vec![CategoryDiff {
                category: Category::Table,
                source_matched: true,
                objects_to_drop: vec![QualifiedName::from("[dbo].[C]"), QualifiedName::from("[dbo].[A]")],
            }]
        );
        assert_eq!(diff.drop_count(), 2);
    }

    #[test]
    fn unmatched_target_category_drops_nothing() {
        let source = snapshot(vec![(Category::Table, set(&[]))]);
        let target = snapshot(vec![
            (Category::Table, set(&["[dbo].[A]"])),
            (Category::Procedure, set(&["[dbo].[usp_Old]"])),
        ]);

        let diff = SnapshotDiff::generate(&source, &target);

        assert_eq!(diff.categories.len(), 2);
        assert_eq!(diff.categories[1].category, Category::Procedure);
        assert!(!diff.categories[1].source_matched);
        assert!(diff.categories[1].objects_to_drop.is_empty());
        assert_eq!(diff.drop_count(), 1);
    }

    #[test]
    fn source_only_categories_are_never_visited() {
        let source = snapshot(vec![
            (Category::Table, set(&[])),
            (Category::View, set(&["[dbo].[V]"])),
        ]);
        let target = snapshot(vec![(Category::Table, set(&[]))]);

        let diff = SnapshotDiff::generate(&source, &target);

        assert_eq!(diff.categories.len(), 1);
        assert!(diff.is_empty());
    }

    #[test]
    fn identical_sets_are_empty() {
        let names = set(&["[dbo].[A]", "[dbo].[B]"]);
        let source = snapshot(vec![(Category::Table, names.clone())]);
        let target = snapshot(vec![(Category::Table, names)]);

        let diff = SnapshotDiff::generate(&source, &target);

        assert!(diff.categories[0].source_matched);
        assert!(diff.is_empty());
    }
}
