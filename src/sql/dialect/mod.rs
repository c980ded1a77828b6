//! SQL Dialect definitions and rendering rules.
//!
//! This module provides a trait-based abstraction for SQL dialect differences.
//! Each dialect implements `SqlDialect` in two layers:
//!
//! - **Capabilities**: fixed flags and spellings (identifier quoting, array
//!   constructors, row value constructors, offset/fetch syntax, FILTER,
//!   FROM-less selects, ...)
//! - **Rendering hooks**: override points the translator calls for the
//!   constructs dialects disagree on (comparisons, CASE typing, arithmetic,
//!   partition items, recursive search paths, in-list arrays, ...). Every
//!   hook has a default that delegates to the generic renderer.
//!
//! # Usage
//!
//! ```ignore
//! use quill::sql::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::Hsql;
//! let quoted = dialect.quote_identifier("user");  // "user"
//! ```
//!
//! # Capability Matrix
//!
//! | Feature | ANSI | HSQLDB | PostgreSQL | MySQL |
//! |---------|------|--------|------------|-------|
//! | Array constructor | ✓ | ✓ | ✓ | ❌ |
//! | In-list array binding | ❌ | `IN(UNNEST(?))` | `= ANY(?)` | ❌ |
//! | Row value constructor | ✓ | ❌ | ✓ | ✓ |
//! | WITH in subquery | ✓ | ❌ | ✓ | ✓ |
//! | Recursive path as array | ✓ | ❌ | ✓ | ❌ |
//! | OFFSET / FETCH | ✓ | ✓ | ✓ | ❌ (LIMIT) |
//! | FILTER clause | ✓ | ✓ | ✓ | ❌ |
//! | FROM-less SELECT | `` | `from (values(0))` | `` | `from dual` |
//!
//! Legend: ✓ = supported, ❌ = not supported (emulated or rejected)

mod ansi;
pub mod helpers;
mod hsql;
mod mysql;
mod postgres;

pub use ansi::Ansi;
pub use hsql::Hsql;
pub use mysql::MySql;
pub use postgres::Postgres;

use std::fmt;
use std::str::FromStr;

use super::ast::{
    BinaryArithmeticOperator, CaseSearched, CaseSimple, ComparisonOperator, Expression, Limit,
    SelectItem,
};
use super::error::TranslationError;
use super::render::{ArrayOperand, CaseResultRendering, SqlAstTranslator};
use super::token::Token;
use crate::types::JdbcType;

/// SQL dialect trait - defines how SQL constructs are rendered.
///
/// Implementations handle dialect-specific syntax differences.
/// The default implementations follow ANSI SQL where possible.
pub trait SqlDialect: std::fmt::Debug + Send + Sync {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier and Literal Quoting
    // =========================================================================

    /// Quote an identifier (table, column, alias).
    ///
    /// - ANSI/HSQLDB/PostgreSQL: `"identifier"`
    /// - MySQL: `` `identifier` ``
    fn quote_identifier(&self, ident: &str) -> String;

    /// Quote a string literal.
    ///
    /// All dialects use single quotes with `''` for escaping.
    fn quote_string(&self, s: &str) -> String {
        helpers::quote_string_single(s)
    }

    /// Format a boolean literal.
    ///
    /// - ANSI/HSQLDB/PostgreSQL: `true`/`false`
    /// - MySQL: `1`/`0`
    fn format_bool(&self, b: bool) -> &'static str;

    /// Format a NULL literal.
    fn format_null(&self) -> &'static str {
        "NULL"
    }

    /// Type name used in `cast(... as <type>)`.
    fn cast_type_name(&self, jdbc_type: &JdbcType) -> String {
        helpers::cast_type_name_ansi(jdbc_type)
    }

    /// Inline array literal from already formatted elements.
    fn format_array_literal(&self, elements: &[String]) -> String {
        helpers::array_literal(elements)
    }

    // =========================================================================
    // Operators
    // =========================================================================

    /// String concatenation operator.
    fn concat_operator(&self) -> &'static str {
        "||"
    }

    /// Whether this dialect supports the `||` concat operator.
    ///
    /// MySQL uses `||` as logical OR by default.
    fn supports_concat_operator(&self) -> bool {
        true
    }

    // =========================================================================
    // Capabilities
    // =========================================================================

    /// Whether `array[...]` constructors and array literals are available.
    fn supports_array_constructor(&self) -> bool {
        true
    }

    /// Whether a subquery may carry its own WITH clause. When it may not,
    /// nested CTEs are hoisted to the statement.
    fn supports_with_clause_in_subquery(&self) -> bool {
        true
    }

    /// Whether recursive CTEs may compute search paths as arrays.
    ///
    /// Without it, paths are built by string concatenation.
    fn supports_recursive_clause_array_and_row_emulation(&self) -> bool {
        true
    }

    /// Whether aggregates accept `FILTER (WHERE ...)`.
    fn supports_filter_clause(&self) -> bool {
        false
    }

    /// Whether `(a, b) = (x, y)` is valid syntax.
    fn supports_row_value_constructor_syntax(&self) -> bool {
        true
    }

    /// Whether `(a, b) IN ((x, y), ...)` is valid syntax.
    fn supports_row_value_constructor_syntax_in_in_list(&self) -> bool {
        true
    }

    /// Whether `(a, b) = (SELECT x, y ...)` is valid syntax.
    fn supports_row_value_constructor_syntax_in_quantified_predicates(&self) -> bool {
        true
    }

    /// Whether `OFFSET n ROWS FETCH FIRST m ROWS ONLY` is available.
    fn supports_offset_fetch_clause(&self) -> bool {
        true
    }

    /// Whether homogeneous IN lists may be bound as a single array parameter.
    fn supports_in_list_array_binding(&self) -> bool {
        false
    }

    /// Whether to emit RECURSIVE keyword for recursive CTEs.
    fn emit_recursive_keyword(&self) -> bool {
        true
    }

    /// Whether this dialect supports NULLS FIRST/LAST in ORDER BY.
    fn supports_nulls_ordering(&self) -> bool {
        true
    }

    /// Appended to a SELECT without tables (leading space included).
    fn from_dual(&self) -> &'static str {
        ""
    }

    /// Appended to a standalone SELECT without tables and clauses.
    fn from_dual_for_select_only(&self) -> &'static str {
        self.from_dual()
    }

    // =========================================================================
    // Rendering Hooks
    // =========================================================================

    /// Boolean-typed expression used as a predicate.
    ///
    /// - Default: `NOT <expr>` when negated
    /// - HSQLDB: `not(<expr>)`
    fn visit_boolean_expression_predicate(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        expression: &Expression,
        negated: bool,
    ) -> Result<(), TranslationError> {
        tr.render_boolean_expression_predicate_standard(expression, negated)
    }

    /// Seed of a string-mode recursive search path.
    ///
    /// - Default: the expression as-is
    /// - HSQLDB: `cast(<expr> as varchar(<size>))` when the size is known
    fn visit_recursive_path(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        path: &Expression,
        size_estimate: i32,
    ) -> Result<(), TranslationError> {
        let _ = size_estimate;
        tr.render_expression(path)
    }

    fn visit_case_searched(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        case: &CaseSearched,
    ) -> Result<(), TranslationError> {
        tr.visit_case_searched_standard(case, CaseResultRendering::Plain)
    }

    fn visit_case_simple(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        case: &CaseSimple,
    ) -> Result<(), TranslationError> {
        tr.visit_case_simple_standard(case, CaseResultRendering::Plain)
    }

    /// Item of the SELECT list.
    fn render_select_expression(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        expression: &Expression,
    ) -> Result<(), TranslationError> {
        tr.render_expression(expression)
    }

    /// Comparison of a subquery's select list against a tuple, used when row
    /// values cannot be compared to subqueries directly.
    fn render_select_tuple_comparison(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        selections: &[SelectItem],
        tuple: &[Expression],
        op: ComparisonOperator,
    ) -> Result<(), TranslationError> {
        tr.emulate_select_tuple_comparison(selections, tuple, op, false)
    }

    fn render_comparison(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        lhs: &Expression,
        op: ComparisonOperator,
        rhs: &Expression,
    ) -> Result<(), TranslationError> {
        tr.render_comparison_standard(lhs, op, rhs)
    }

    /// GROUP BY / PARTITION BY item.
    ///
    /// - Default: literal as `()`, summarizations as `rollup(...)` / `cube(...)`
    /// - HSQLDB: literal as `'0' || '0'`, summarizations rejected
    fn render_partition_item(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        expression: &Expression,
    ) -> Result<(), TranslationError> {
        tr.render_partition_item_standard(expression)
    }

    fn visit_binary_arithmetic(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        op: BinaryArithmeticOperator,
        lhs: &Expression,
        rhs: &Expression,
    ) -> Result<(), TranslationError> {
        tr.render_binary_arithmetic_standard(op, lhs, rhs)
    }

    /// Row limiting clauses.
    ///
    /// - Default: `OFFSET ... ROWS FETCH FIRST ...` when supported, else
    ///   `LIMIT ... OFFSET ...`
    fn visit_offset_fetch_clause(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        limit: Limit<'_>,
    ) -> Result<(), TranslationError> {
        if self.supports_offset_fetch_clause() {
            tr.render_offset_fetch_clause(limit, true)
        } else {
            tr.render_limit_offset_clause(limit)
        }
    }

    /// Membership of `test` in an array.
    ///
    /// - Default/PostgreSQL: `<test> = ANY(<array>)`, negated `<test> <> ALL(<array>)`
    /// - HSQLDB: `<test> IN(UNNEST(<array>))`
    fn visit_in_list_array(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        test: &Expression,
        array: &ArrayOperand<'_>,
        negated: bool,
    ) -> Result<(), TranslationError> {
        tr.render_expression(test)?;
        tr.append_sql(if negated { " <> ALL(" } else { " = ANY(" });
        tr.render_array_operand(array)?;
        tr.push(Token::RParen);
        Ok(())
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    Ansi,
    #[default]
    Hsql,
    Postgres,
    MySql,
}

impl Dialect {
    pub const ALL: [Dialect; 4] = [Dialect::Ansi, Dialect::Hsql, Dialect::Postgres, Dialect::MySql];

    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Ansi => &Ansi,
            Dialect::Hsql => &Hsql,
            Dialect::Postgres => &Postgres,
            Dialect::MySql => &MySql,
        }
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ansi" => Ok(Dialect::Ansi),
            "hsql" | "hsqldb" => Ok(Dialect::Hsql),
            "postgres" | "postgresql" | "pg" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::MySql),
            _ => Err(format!("Unknown dialect: {}", s)),
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn quote_string(&self, s: &str) -> String {
        self.dialect().quote_string(s)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        self.dialect().format_bool(b)
    }

    fn format_null(&self) -> &'static str {
        self.dialect().format_null()
    }

    fn cast_type_name(&self, jdbc_type: &JdbcType) -> String {
        self.dialect().cast_type_name(jdbc_type)
    }

    fn format_array_literal(&self, elements: &[String]) -> String {
        self.dialect().format_array_literal(elements)
    }

    fn concat_operator(&self) -> &'static str {
        self.dialect().concat_operator()
    }

    fn supports_concat_operator(&self) -> bool {
        self.dialect().supports_concat_operator()
    }

    fn supports_array_constructor(&self) -> bool {
        self.dialect().supports_array_constructor()
    }

    fn supports_with_clause_in_subquery(&self) -> bool {
        self.dialect().supports_with_clause_in_subquery()
    }

    fn supports_recursive_clause_array_and_row_emulation(&self) -> bool {
        self.dialect()
            .supports_recursive_clause_array_and_row_emulation()
    }

    fn supports_filter_clause(&self) -> bool {
        self.dialect().supports_filter_clause()
    }

    fn supports_row_value_constructor_syntax(&self) -> bool {
        self.dialect().supports_row_value_constructor_syntax()
    }

    fn supports_row_value_constructor_syntax_in_in_list(&self) -> bool {
        self.dialect()
            .supports_row_value_constructor_syntax_in_in_list()
    }

    fn supports_row_value_constructor_syntax_in_quantified_predicates(&self) -> bool {
        self.dialect()
            .supports_row_value_constructor_syntax_in_quantified_predicates()
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        self.dialect().supports_offset_fetch_clause()
    }

    fn supports_in_list_array_binding(&self) -> bool {
        self.dialect().supports_in_list_array_binding()
    }

    fn emit_recursive_keyword(&self) -> bool {
        self.dialect().emit_recursive_keyword()
    }

    fn supports_nulls_ordering(&self) -> bool {
        self.dialect().supports_nulls_ordering()
    }

    fn from_dual(&self) -> &'static str {
        self.dialect().from_dual()
    }

    fn from_dual_for_select_only(&self) -> &'static str {
        self.dialect().from_dual_for_select_only()
    }

    fn visit_boolean_expression_predicate(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        expression: &Expression,
        negated: bool,
    ) -> Result<(), TranslationError> {
        self.dialect()
            .visit_boolean_expression_predicate(tr, expression, negated)
    }

    fn visit_recursive_path(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        path: &Expression,
        size_estimate: i32,
    ) -> Result<(), TranslationError> {
        self.dialect().visit_recursive_path(tr, path, size_estimate)
    }

    fn visit_case_searched(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        case: &CaseSearched,
    ) -> Result<(), TranslationError> {
        self.dialect().visit_case_searched(tr, case)
    }

    fn visit_case_simple(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        case: &CaseSimple,
    ) -> Result<(), TranslationError> {
        self.dialect().visit_case_simple(tr, case)
    }

    fn render_select_expression(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        expression: &Expression,
    ) -> Result<(), TranslationError> {
        self.dialect().render_select_expression(tr, expression)
    }

    fn render_select_tuple_comparison(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        selections: &[SelectItem],
        tuple: &[Expression],
        op: ComparisonOperator,
    ) -> Result<(), TranslationError> {
        self.dialect()
            .render_select_tuple_comparison(tr, selections, tuple, op)
    }

    fn render_comparison(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        lhs: &Expression,
        op: ComparisonOperator,
        rhs: &Expression,
    ) -> Result<(), TranslationError> {
        self.dialect().render_comparison(tr, lhs, op, rhs)
    }

    fn render_partition_item(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        expression: &Expression,
    ) -> Result<(), TranslationError> {
        self.dialect().render_partition_item(tr, expression)
    }

    fn visit_binary_arithmetic(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        op: BinaryArithmeticOperator,
        lhs: &Expression,
        rhs: &Expression,
    ) -> Result<(), TranslationError> {
        self.dialect().visit_binary_arithmetic(tr, op, lhs, rhs)
    }

    fn visit_offset_fetch_clause(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        limit: Limit<'_>,
    ) -> Result<(), TranslationError> {
        self.dialect().visit_offset_fetch_clause(tr, limit)
    }

    fn visit_in_list_array(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        test: &Expression,
        array: &ArrayOperand<'_>,
        negated: bool,
    ) -> Result<(), TranslationError> {
        self.dialect().visit_in_list_array(tr, test, array, negated)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlTypeCode;

    #[test]
    fn test_dialect_display() {
        assert_eq!(Dialect::Ansi.to_string(), "ansi");
        assert_eq!(Dialect::Hsql.to_string(), "hsql");
        assert_eq!(Dialect::Postgres.to_string(), "postgres");
        assert_eq!(Dialect::MySql.to_string(), "mysql");
    }

    #[test]
    fn test_dialect_from_str() {
        assert_eq!("HSQLDB".parse::<Dialect>(), Ok(Dialect::Hsql));
        assert_eq!("pg".parse::<Dialect>(), Ok(Dialect::Postgres));
        assert!("oracle".parse::<Dialect>().is_err());
        for dialect in Dialect::ALL {
            assert_eq!(dialect.to_string().parse::<Dialect>(), Ok(dialect));
        }
    }

    #[test]
    fn test_quote_identifier() {
        assert_eq!(Dialect::Hsql.quote_identifier("users"), "\"users\"");
        assert_eq!(Dialect::Postgres.quote_identifier("users"), "\"users\"");
        assert_eq!(Dialect::MySql.quote_identifier("users"), "`users`");
    }

    #[test]
    fn test_quote_identifier_escaping() {
        assert_eq!(
            Dialect::Hsql.quote_identifier("weird\"name"),
            "\"weird\"\"name\""
        );
        assert_eq!(
            Dialect::MySql.quote_identifier("weird`name"),
            "`weird``name`"
        );
    }

    #[test]
    fn test_format_bool() {
        assert_eq!(Dialect::Hsql.format_bool(true), "true");
        assert_eq!(Dialect::Postgres.format_bool(false), "false");
        assert_eq!(Dialect::MySql.format_bool(false), "0");
    }

    #[test]
    fn test_hsql_capabilities() {
        let hsql = Dialect::Hsql;
        assert!(hsql.supports_array_constructor());
        assert!(hsql.supports_filter_clause());
        assert!(hsql.supports_offset_fetch_clause());
        assert!(hsql.supports_in_list_array_binding());
        assert!(!hsql.supports_with_clause_in_subquery());
        assert!(!hsql.supports_recursive_clause_array_and_row_emulation());
        assert!(!hsql.supports_row_value_constructor_syntax());
        assert!(!hsql.supports_row_value_constructor_syntax_in_in_list());
        assert!(!hsql.supports_row_value_constructor_syntax_in_quantified_predicates());
        assert_eq!(hsql.from_dual(), " from (values(0))");
        assert_eq!(hsql.from_dual_for_select_only(), " from (values(0))");
    }

    #[test]
    fn test_array_capabilities() {
        assert!(Dialect::Postgres.supports_in_list_array_binding());
        assert!(!Dialect::MySql.supports_in_list_array_binding());
        assert!(!Dialect::MySql.supports_array_constructor());
        assert!(!Dialect::Ansi.supports_in_list_array_binding());
    }

    #[test]
    fn test_cast_type_names() {
        let ints = JdbcType::array(JdbcType::new(SqlTypeCode::Integer));
        assert_eq!(Dialect::Hsql.cast_type_name(&ints), "integer array");
        assert_eq!(Dialect::Postgres.cast_type_name(&ints), "integer[]");

        let varchar = JdbcType::new(SqlTypeCode::Varchar).with_length(50);
        assert_eq!(Dialect::Hsql.cast_type_name(&varchar), "varchar(50)");
        assert_eq!(Dialect::MySql.cast_type_name(&varchar), "char(50)");
        assert_eq!(
            Dialect::MySql.cast_type_name(&JdbcType::new(SqlTypeCode::BigInt)),
            "signed"
        );
    }

    #[test]
    fn test_from_dual() {
        assert_eq!(Dialect::MySql.from_dual(), " from dual");
        assert_eq!(Dialect::MySql.from_dual_for_select_only(), "");
        assert_eq!(Dialect::Postgres.from_dual(), "");
    }
}
