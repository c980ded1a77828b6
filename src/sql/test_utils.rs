//! Test utilities for SQL emission validation.
//!
//! Provides helpers for validating that emitted SQL is syntactically correct
//! using sqlparser-rs for roundtrip validation.

use sqlparser::dialect::{GenericDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

use super::dialect::Dialect;

/// Validates that a SQL string is syntactically valid for the given dialect.
///
/// sqlparser has no HSQLDB dialect; HSQLDB and ANSI output is checked with
/// the generic dialect. Placeholders (`?`) are accepted by all of them.
///
/// # Example
///
/// ```ignore
/// use crate::sql::test_utils::validate_sql;
/// use crate::sql::dialect::Dialect;
///
/// let sql = "SELECT * FROM users";
/// validate_sql(sql, Dialect::Postgres).unwrap();
/// ```
pub fn validate_sql(sql: &str, dialect: Dialect) -> Result<(), String> {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::Hsql | Dialect::Ansi => Box::new(GenericDialect {}),
    };

    let sql = match dialect {
        Dialect::Postgres => numbered_placeholders(sql),
        _ => sql.to_string(),
    };

    Parser::parse_sql(&*parser_dialect, &sql)
        .map(|_| ())
        .map_err(|e| format!("Invalid SQL for {:?}: {}\nSQL: {}", dialect, e, sql))
}

/// Rewrites `?` placeholders outside string literals to `$1`, `$2`, ...
///
/// sqlparser reads a bare `?` as a JSON operator under its PostgreSQL dialect.
fn numbered_placeholders(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut in_string = false;
    let mut position = 0;
    for c in sql.chars() {
        match c {
            '\'' => {
                in_string = !in_string;
                out.push(c);
            }
            '?' if !in_string => {
                position += 1;
                out.push_str(&format!("${}", position));
            }
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::ast::*;
    use crate::sql::render::translate;
    use crate::types::JdbcMapping;

    #[test]
    fn test_validate_valid_sql() {
        validate_sql("SELECT * FROM users", Dialect::Postgres).unwrap();
        validate_sql("SELECT * FROM users", Dialect::MySql).unwrap();
        validate_sql("SELECT * FROM users", Dialect::Hsql).unwrap();
    }

    #[test]
    fn test_validate_invalid_sql() {
        let result = validate_sql("SELEC * FORM users", Dialect::Postgres);
        assert!(result.is_err());
    }

    #[test]
    fn test_translated_sql_parses() {
        let statement: Statement = QuerySpec::new()
            .select(vec![
                SelectItem::from(table_col("p", "id")),
                table_col("p", "name").alias("n"),
            ])
            .from(TableReference::new("person").with_alias("p"))
            .filter(and(vec![
                table_col("p", "id").gt(param("min", JdbcMapping::integer())),
                table_col("p", "name").is_not_null(),
            ]))
            .order_by(vec![SortSpecification::desc(table_col("p", "id"))])
            .into();

        for dialect in [Dialect::Postgres, Dialect::MySql, Dialect::Hsql, Dialect::Ansi] {
            let op = translate(&statement, dialect).unwrap();
            assert_eq!(op.parameters.len(), 1);
            validate_sql(&op.sql, dialect).unwrap();
        }
    }

    #[test]
    fn test_translated_hsql_rewrites_parse() {
        let statement: Statement = QuerySpec::new()
            .select(vec![col("a").modulo(lit_int(2))])
            .from(TableReference::new("t"))
            .filter(and(vec![
                not_boolean(col("active")),
                col("a")
                    .with_mapping(JdbcMapping::integer())
                    .distinct_from(param("p", JdbcMapping::integer())),
            ]))
            .order_by(vec![SortSpecification::asc(col("a")).nulls_first()])
            .offset(lit_int(20))
            .fetch(lit_int(10), FetchClauseType::RowsOnly)
            .into();

        let op = translate(&statement, Dialect::Hsql).unwrap();
        assert_eq!(
            op.sql,
            concat!(
                r#"SELECT mod("a", 2) FROM "t" WHERE not("active") AND "a" is distinct from cast(? as integer)"#,
                r#" ORDER BY "a" ASC NULLS FIRST OFFSET 20 ROWS FETCH FIRST 10 ROWS ONLY"#
            )
        );
        validate_sql(&op.sql, Dialect::Hsql).unwrap();

        let select_only: Statement = QuerySpec::new().select(vec![lit_int(1)]).into();
        let op = translate(&select_only, Dialect::Hsql).unwrap();
        validate_sql(&op.sql, Dialect::Hsql).unwrap();
    }

    #[test]
    fn test_postgres_placeholders_are_numbered() {
        assert_eq!(
            numbered_placeholders("SELECT ? WHERE a = '?' AND b = ?"),
            "SELECT $1 WHERE a = '?' AND b = $2"
        );
        validate_sql(r#"SELECT "id" FROM "t" WHERE "id" = ANY(?)"#, Dialect::Postgres).unwrap();
    }
}
