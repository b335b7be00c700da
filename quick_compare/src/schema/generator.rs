//! Drop script generator
//!
//! This module renders a snapshot diff as a T-SQL script: one comment header
//! per target category followed by one guarded DROP per extra object.

use crate::schema::diff::SnapshotDiff;
use crate::schema::types::{Category, QualifiedName};
use crate::utils::quoting::quote_literal;

/// Drop script SQL generator
#[derive(Debug, Default, Clone, Copy)]
pub struct DropScriptGenerator;

impl DropScriptGenerator {
    /// Create a new drop script generator
    pub fn new() -> Self {
        Self
    }

    /// Render the whole script, one statement per line
    pub fn generate_script(&self, diff: &SnapshotDiff) -> String {
        let mut script = String::new();

        for category_diff in &diff.categories {
            script.push_str(&self.generate_header(category_diff.category));
            script.push('\n');

            for name in &category_diff.objects_to_drop {
                script.push_str(&self.generate_drop_sql(category_diff.category, name));
                script.push('\n');
            }
        }

        script
    }

    /// Comment line introducing a category
    pub fn generate_header(&self, category: Category) -> String {
        format!("--{}", category.label())
    }

    /// Guarded DROP for one object
    pub fn generate_drop_sql(&self, category: Category, name: &QualifiedName) -> String {
        format!(
            "IF OBJECT_ID({}) IS NOT NULL DROP {} {};",
            quote_literal(name.as_str()),
            category.label(),
            name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::diff::CategoryDiff;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_headers_and_drops() {
        let diff = SnapshotDiff {
            categories: vec![
                CategoryDiff {
                    category: Category::Table,
                    source_matched: true,
                    objects_to_drop: vec![QualifiedName::from("[dbo].[B]")],
                },
                CategoryDiff {
                    category: Category::View,
                    source_matched: true,
                    objects_to_drop: Vec::new(),
                },
            ],
        };

        assert_eq!(
            DropScriptGenerator::new().generate_script(&diff),
            "--Table\nIF OBJECT_ID('[dbo].[B]') IS NOT NULL DROP Table [dbo].[B];\n--View\n"
        );
    }

    #[test]
    fn procedure_drop_uses_label() {
        let sql = DropScriptGenerator::new()
            .generate_drop_sql(Category::Procedure, &QualifiedName::from("[etl].[usp_Load]"));
        assert_eq!(
            sql,
            "IF OBJECT_ID('[etl].[usp_Load]') IS NOT NULL DROP Procedure [etl].[usp_Load];"
        );
    }

    #[test]
    fn quotes_in_names_stay_inside_the_literal() {
        let sql = DropScriptGenerator::new()
            .generate_drop_sql(Category::View, &QualifiedName::from("[dbo].[O'Brien]"));
        assert_eq!(
            sql,
            "IF OBJECT_ID('[dbo].[O''Brien]') IS NOT NULL DROP View [dbo].[O'Brien];"
        );
    }

    #[test]
    fn empty_diff_renders_nothing() {
        let diff = SnapshotDiff { categories: Vec::new() };
        assert_eq!(DropScriptGenerator::new().generate_script(&diff), "");
    }
}
