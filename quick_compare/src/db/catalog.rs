//! System catalog queries
//!
//! Lists the user objects of one category on a live SQL Server database.

use tiberius::Row;

use crate::db::connection::{ConnectionSettings, DatabaseConnection};
use crate::error::{Error, Result};
use crate::schema::types::{Category, ObjectSet, QualifiedName};
use crate::utils::quoting::escape_like;

/// Build the catalog query for a category
pub fn catalog_query(category: Category) -> String {
    let rules = category.rules();
    let filter = match rules.reserved_prefix {
        Some(prefix) => format!(" WHERE t.name NOT LIKE '{}%'", escape_like(prefix)),
        None => String::new(),
    };

    format!(
        "SELECT t.name, s.name AS schemaname FROM {} t JOIN sys.schemas s ON t.schema_id = s.schema_id{} ORDER BY s.name, t.name",
        rules.catalog_view, filter
    )
}

/// Turn `(schema, name)` pairs into the category's object set
pub fn qualified_names<I, S>(category: Category, rows: I) -> ObjectSet
where
    I: IntoIterator<Item = (S, S)>,
    S: AsRef<str>,
{
    rows.into_iter()
        .filter(|(_, name)| category.admits(name.as_ref()))
        .map(|(schema, name)| QualifiedName::from_parts(schema.as_ref(), name.as_ref()))
        .collect()
}

/// Read every object of `category` over a connection scoped to this call
pub async fn read_catalog(settings: &ConnectionSettings, category: Category) -> Result<ObjectSet> {
    let mut connection = DatabaseConnection::connect(settings).await?;
    let rows = connection.query(&catalog_query(category)).await?;

    let pairs = rows
        .iter()
        .map(name_pair)
        .collect::<Result<Vec<_>>>()?;
    let objects = qualified_names(category, pairs);

    connection.close().await?;
    Ok(objects)
}

fn name_pair(row: &Row) -> Result<(&str, &str)> {
    let schema = row
        .try_get::<&str, _>("schemaname")?
        .ok_or_else(|| Error::ConnectionError("Catalog returned a NULL schema name".to_string()))?;
    let name = row
        .try_get::<&str, _>("name")?
        .ok_or_else(|| Error::ConnectionError("Catalog returned a NULL object name".to_string()))?;

    Ok((schema, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn table_query_skips_double_underscore_names() {
        assert_eq!(
            catalog_query(Category::Table),
            "SELECT t.name, s.name AS schemaname FROM sys.tables t JOIN sys.schemas s ON t.schema_id = s.schema_id WHERE t.name NOT LIKE '[_][_]%' ORDER BY s.name, t.name"
        );
    }

    #[test]
    fn view_query_has_no_filter() {
        assert_eq!(
            catalog_query(Category::View),
            "SELECT t.name, s.name AS schemaname FROM sys.views t JOIN sys.schemas s ON t.schema_id = s.schema_id ORDER BY s.name, t.name"
        );
    }

    #[test]
    fn procedure_query_skips_system_prefix() {
        assert!(catalog_query(Category::Procedure)
            .contains("FROM sys.procedures t JOIN sys.schemas s ON t.schema_id = s.schema_id WHERE t.name NOT LIKE 'sp[_]%'"));
    }

    #[test]
    fn rows_become_qualified_names() {
        let rows = vec![
            ("dbo", "Customer"),
            ("dbo", "__staging"),
            ("sales", "Order"),
            ("dbo", "Customer"),
        ];

        let names: Vec<String> = qualified_names(Category::Table, rows)
            .into_iter()
            .map(|n| n.to_string())
            .collect();

        assert_eq!(names, vec!["[dbo].[Customer]", "[sales].[Order]"]);
    }

    #[test]
    fn view_rows_keep_reserved_looking_names() {
        let procedures = qualified_names(Category::Procedure, vec![("dbo", "sp_helper")]);
        let views = qualified_names(Category::View, vec![("dbo", "sp_anything")]);

        assert!(procedures.is_empty());
        assert!(views.contains(&QualifiedName::from("[dbo].[sp_anything]")));
    }
}
