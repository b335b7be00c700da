//! Quoting utilities for QuickCompare
//!
//! T-SQL quoting helpers used when building catalog queries and drop statements.

/// Bracket-quote an identifier, doubling any closing bracket (same as `QUOTENAME`)
pub fn quote_identifier(identifier: &str) -> String {
    format!("[{}]", identifier.replace(']', "]]"))
}

/// Render a string literal, doubling embedded single quotes
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Escape a literal prefix for use in a `LIKE` pattern
///
/// `_`, `%` and `[` are wildcards in T-SQL patterns, so they are wrapped in
/// brackets to match themselves.
pub fn escape_like(prefix: &str) -> String {
    let mut escaped = String::with_capacity(prefix.len());
    for c in prefix.chars() {
        match c {
            '_' | '%' | '[' => {
                escaped.push('[');
                escaped.push(c);
                escaped.push(']');
            }
            '\'' => escaped.push_str("''"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Hide credentials in an ADO.NET style connection string
pub fn mask_connection_string(connection_string: &str) -> String {
    connection_string
        .split(';')
        .filter(|part| !part.trim().is_empty())
        .map(|part| match part.split_once('=') {
            Some((key, _)) if is_secret_key(key) => format!("{}=***", key.trim()),
            _ => part.trim().to_string(),
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn is_secret_key(key: &str) -> bool {
    matches!(
        key.trim().to_ascii_lowercase().as_str(),
        "password" | "pwd"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_are_bracketed() {
        assert_eq!(quote_identifier("dbo"), "[dbo]");
        assert_eq!(quote_identifier("a]b"), "[a]]b]");
    }

    #[test]
    fn literals_double_quotes() {
        assert_eq!(quote_literal("[dbo].[O'Brien]"), "'[dbo].[O''Brien]'");
    }

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("__"), "[_][_]");
        assert_eq!(escape_like("sp_"), "sp[_]");
        assert_eq!(escape_like("50%"), "50[%]");
    }

    #[test]
    fn passwords_are_masked() {
        assert_eq!(
            mask_connection_string("Server=db1;User Id=sa;Password=hunter2;"),
            "Server=db1;User Id=sa;Password=***"
        );
        assert_eq!(
            mask_connection_string("Data Source=db1;Trusted_Connection=True;"),
            "Data Source=db1;Trusted_Connection=True"
        );
    }
}
