//! Type definitions for compared schema objects

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::db::connection::ConnectionSettings;
use crate::error::{Error, Result};
use crate::utils::quoting::{mask_connection_string, quote_identifier};

/// Unique qualified names of one category, in enumeration order
pub type ObjectSet = IndexSet<QualifiedName>;

/// Kind of database object that can be compared and dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(alias = "table", alias = "TABLE")]
    Table,
    #[serde(alias = "view", alias = "VIEW")]
    View,
    #[serde(alias = "procedure", alias = "PROCEDURE")]
    Procedure,
}

/// Per-category enumeration rules shared by both provider kinds
#[derive(Debug)]
pub struct CategoryRules {
    /// Label used in script headers, DROP statements and snapshot matching
    pub label: &'static str,
    /// `Type` attribute of the matching `<Element>` in a dacpac model
    pub element_type: &'static str,
    /// System catalog view listing the objects on a live server
    pub catalog_view: &'static str,
    /// Names starting with this prefix are never reported by a live server
    pub reserved_prefix: Option<&'static str>,
}

const TABLE_RULES: CategoryRules = CategoryRules {
    label: "Table",
    element_type: "SqlTable",
    catalog_view: "sys.tables",
    reserved_prefix: Some("__"),
};

const VIEW_RULES: CategoryRules = CategoryRules {
    label: "View",
    element_type: "SqlView",
    catalog_view: "sys.views",
    reserved_prefix: None,
};

const PROCEDURE_RULES: CategoryRules = CategoryRules {
    label: "Procedure",
    element_type: "SqlProcedure",
    catalog_view: "sys.procedures",
    reserved_prefix: Some("sp_"),
};

impl Category {
    /// Every category, in the order snapshots hold them
    pub const ALL: [Category; 3] = [Category::Table, Category::View, Category::Procedure];

    /// Enumeration rules for this category
    pub fn rules(&self) -> &'static CategoryRules {
        match self {
            Category::Table => &TABLE_RULES,
            Category::View => &VIEW_RULES,
            Category::Procedure => &PROCEDURE_RULES,
        }
    }

    /// Display label ("Table", "View", "Procedure")
    pub fn label(&self) -> &'static str {
        self.rules().label
    }

    /// Whether a live object name survives the category's reserved-prefix filter
    pub fn admits(&self, name: &str) -> bool {
        match self.rules().reserved_prefix {
            Some(prefix) => !name.starts_with(prefix),
            None => true,
        }
    }

    /// Canonical ordering of a requested category list, without duplicates
    pub fn canonical(requested: &[Category]) -> Vec<Category> {
        Category::ALL
            .iter()
            .copied()
            .filter(|category| requested.contains(category))
            .collect()
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Category::ALL
            .iter()
            .copied()
            .find(|category| category.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                Error::ConfigError(format!(
                    "Unknown object type '{}', expected one of Table, View, Procedure",
                    s
                ))
            })
    }
}

/// Schema-qualified object name in `[schema].[name]` form
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QualifiedName(String);

impl QualifiedName {
    /// Wrap a name that is already qualified, as a dacpac model reports it
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Build `[schema].[name]` from the unquoted parts a catalog query returns
    pub fn from_parts(schema: &str, name: &str) -> Self {
        Self(format!("{}.{}", quote_identifier(schema), quote_identifier(name)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QualifiedName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Where a snapshot reads its objects from
#[derive(Debug, Clone)]
pub enum SchemaSource {
    /// Compiled schema model on disk
    Dacpac(PathBuf),
    /// Live SQL Server database
    Database(ConnectionSettings),
}

impl SchemaSource {
    /// Short description safe for logs
    pub fn describe(&self) -> String {
        match self {
            SchemaSource::Dacpac(path) => format!("dacpac {}", path.display()),
            SchemaSource::Database(settings) => format!(
                "database {}",
                mask_connection_string(&settings.connection_string)
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Category::Table, "__staging", false)]
    #[case(Category::Table, "_single", true)]
    #[case(Category::Table, "Customer", true)]
    #[case(Category::Procedure, "sp_helper", false)]
    #[case(Category::Procedure, "usp_LoadCustomers", true)]
    #[case(Category::View, "sp_anything", true)]
    #[case(Category::View, "__anything", true)]
    fn reserved_prefixes_are_category_specific(
        #[case] category: Category,
        #[case] name: &str,
        #[case] admitted: bool,
    ) {
        assert_eq!(category.admits(name), admitted);
    }

    #[rstest]
    #[case("Table", Category::Table)]
    #[case("view", Category::View)]
    #[case(" PROCEDURE ", Category::Procedure)]
    fn labels_parse_case_insensitively(#[case] input: &str, #[case] expected: Category) {
        assert_eq!(input.parse::<Category>().unwrap(), expected);
    }

    #[test]
    fn unknown_label_is_a_config_error() {
        let err = "Function".parse::<Category>().unwrap_err();
        assert!(matches!(err, Error::ConfigError(_)));
    }

    #[test]
    fn canonical_order_ignores_request_order_and_duplicates() {
        let requested = [Category::Procedure, Category::Table, Category::Procedure];
        assert_eq!(
            Category::canonical(&requested),
            vec![Category::Table, Category::Procedure]
        );
    }

    #[test]
    fn qualified_name_from_parts() {
        assert_eq!(
            QualifiedName::from_parts("dbo", "Customer").as_str(),
            "[dbo].[Customer]"
        );
        assert_eq!(
            QualifiedName::from_parts("dbo", "odd]name").as_str(),
            "[dbo].[odd]]name]"
        );
    }
}
