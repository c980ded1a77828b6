//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use crate::types::{JdbcType, SqlTypeCode};

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: ANSI, HSQLDB, Postgres
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

// =============================================================================
// String Quoting
// =============================================================================

/// Quote string with single quotes (standard SQL).
/// Used by: All dialects
pub fn quote_string_single(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

// =============================================================================
// Boolean Formatting
// =============================================================================

/// Format boolean as literal true/false.
/// Used by: ANSI, HSQLDB, Postgres
pub fn format_bool_literal(b: bool) -> &'static str {
    if b {
        "true"
    } else {
        "false"
    }
}

/// Format boolean as numeric 1/0.
/// Used by: MySQL
pub fn format_bool_numeric(b: bool) -> &'static str {
    if b {
        "1"
    } else {
        "0"
    }
}

// =============================================================================
// Arrays
// =============================================================================

/// `ARRAY[a,b,c]`
/// Used by: ANSI, HSQLDB, Postgres
pub fn array_literal(elements: &[String]) -> String {
    format!("ARRAY[{}]", elements.join(","))
}

// =============================================================================
// Cast Type Names
// =============================================================================

fn character_type(name: &str, length: Option<u32>) -> String {
    match length {
        Some(n) => format!("{}({})", name, n),
        None => name.to_string(),
    }
}

/// Standard SQL type names; arrays use the `<element> array` form.
/// Used by: ANSI, HSQLDB
pub fn cast_type_name_ansi(jdbc_type: &JdbcType) -> String {
    match jdbc_type.code {
        SqlTypeCode::Boolean => "boolean".into(),
        SqlTypeCode::TinyInt => "tinyint".into(),
        SqlTypeCode::SmallInt => "smallint".into(),
        SqlTypeCode::Integer => "integer".into(),
        SqlTypeCode::BigInt => "bigint".into(),
        SqlTypeCode::Real => "real".into(),
        SqlTypeCode::Double => "double".into(),
        SqlTypeCode::Numeric => "numeric".into(),
        SqlTypeCode::Char => character_type("char", jdbc_type.length),
        SqlTypeCode::Varchar | SqlTypeCode::Other => {
            character_type("varchar", jdbc_type.length)
        }
        SqlTypeCode::Date => "date".into(),
        SqlTypeCode::Timestamp => "timestamp".into(),
        SqlTypeCode::Array => match jdbc_type.element_type() {
            Some(element) => format!("{} array", cast_type_name_ansi(element)),
            None => "array".into(),
        },
    }
}

/// Postgres type names; arrays use the `<element>[]` form.
pub fn cast_type_name_postgres(jdbc_type: &JdbcType) -> String {
    match jdbc_type.code {
        SqlTypeCode::TinyInt => "smallint".into(),
        SqlTypeCode::Double => "double precision".into(),
        SqlTypeCode::Array => match jdbc_type.element_type() {
            Some(element) => format!("{}[]", cast_type_name_postgres(element)),
            None => "anyarray".into(),
        },
        _ => cast_type_name_ansi(jdbc_type),
    }
}

/// MySQL only casts to a handful of target types.
pub fn cast_type_name_mysql(jdbc_type: &JdbcType) -> String {
    match jdbc_type.code {
        SqlTypeCode::Boolean
        | SqlTypeCode::TinyInt
        | SqlTypeCode::SmallInt
        | SqlTypeCode::Integer
        | SqlTypeCode::BigInt => "signed".into(),
        SqlTypeCode::Real | SqlTypeCode::Double => "double".into(),
        SqlTypeCode::Numeric => "decimal".into(),
        SqlTypeCode::Date => "date".into(),
        SqlTypeCode::Timestamp => "datetime".into(),
        SqlTypeCode::Char | SqlTypeCode::Varchar | SqlTypeCode::Other | SqlTypeCode::Array => {
            character_type("char", jdbc_type.length)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_double() {
        assert_eq!(quote_double("name"), "\"name\"");
        assert_eq!(quote_double("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_quote_string_single() {
        assert_eq!(quote_string_single("it's"), "'it''s'");
    }

    #[test]
    fn test_array_literal() {
        assert_eq!(array_literal(&[]), "ARRAY[]");
        assert_eq!(
            array_literal(&["1".to_string(), "NULL".to_string()]),
            "ARRAY[1,NULL]"
        );
    }

    #[test]
    fn test_nested_array_type_names() {
        let matrix = JdbcType::array(JdbcType::array(JdbcType::new(SqlTypeCode::SmallInt)));
        assert_eq!(cast_type_name_ansi(&matrix), "smallint array array");
        assert_eq!(cast_type_name_postgres(&matrix), "smallint[][]");
    }

    #[test]
    fn test_character_lengths() {
        assert_eq!(
            cast_type_name_ansi(&JdbcType::new(SqlTypeCode::Char).with_length(3)),
            "char(3)"
        );
        assert_eq!(
            cast_type_name_ansi(&JdbcType::new(SqlTypeCode::Varchar)),
            "varchar"
        );
    }
}
