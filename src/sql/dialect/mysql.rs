//! MySQL SQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - Boolean is TINYINT(1), returns 1/0
//! - `||` is logical OR by default (use CONCAT())
//! - LIMIT ... OFFSET ... for pagination, no FETCH FIRST
//! - No NULLS FIRST/LAST
//! - No arrays, so IN lists are always inlined
//! - No IS DISTINCT FROM (uses the null-safe `<=>`)
//! - No aggregate FILTER clause
//! - `from dual` for table-less selects with clauses

use super::helpers;
use super::SqlDialect;
use crate::sql::ast::{ComparisonOperator, Expression, Limit};
use crate::sql::error::TranslationError;
use crate::sql::render::{ArrayOperand, SqlAstTranslator};
use crate::types::JdbcType;

/// Largest row count MySQL accepts in LIMIT; used when only OFFSET is given.
const MAX_ROW_COUNT: &str = "18446744073709551615";

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_numeric(b)
    }

    fn cast_type_name(&self, jdbc_type: &JdbcType) -> String {
        helpers::cast_type_name_mysql(jdbc_type)
    }

    fn supports_concat_operator(&self) -> bool {
        // MySQL || is OR by default, use CONCAT() instead
        false
    }

    fn supports_nulls_ordering(&self) -> bool {
        false
    }

    fn supports_array_constructor(&self) -> bool {
        false
    }

    fn supports_recursive_clause_array_and_row_emulation(&self) -> bool {
        false
    }

    fn supports_row_value_constructor_syntax_in_quantified_predicates(&self) -> bool {
        false
    }

    fn supports_offset_fetch_clause(&self) -> bool {
        false
    }

    fn from_dual(&self) -> &'static str {
        " from dual"
    }

    fn from_dual_for_select_only(&self) -> &'static str {
        ""
    }

    fn render_comparison(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        lhs: &Expression,
        op: ComparisonOperator,
        rhs: &Expression,
    ) -> Result<(), TranslationError> {
        let scalar = !matches!(lhs, Expression::Tuple(_)) && !matches!(rhs, Expression::Tuple(_));
        match op {
            ComparisonOperator::NotDistinctFrom if scalar => {
                tr.render_expression(lhs)?;
                tr.append_sql(" <=> ");
                tr.render_expression(rhs)
            }
            ComparisonOperator::DistinctFrom if scalar => {
                tr.append_sql("not(");
                tr.render_expression(lhs)?;
                tr.append_sql(" <=> ");
                tr.render_expression(rhs)?;
                tr.append_sql(")");
                Ok(())
            }
            _ => tr.render_comparison_standard(lhs, op, rhs),
        }
    }

    fn visit_offset_fetch_clause(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        limit: Limit<'_>,
    ) -> Result<(), TranslationError> {
        match (limit.offset, limit.fetch) {
            (Some(offset), None) => {
                tr.append_sql(" LIMIT ");
                tr.append_sql(MAX_ROW_COUNT);
                tr.append_sql(" OFFSET ");
                tr.render_expression(offset)
            }
            _ => tr.render_limit_offset_clause(limit),
        }
    }

    fn visit_in_list_array(
        &self,
        _tr: &mut SqlAstTranslator<'_>,
        _test: &Expression,
        _array: &ArrayOperand<'_>,
        _negated: bool,
    ) -> Result<(), TranslationError> {
        Err(TranslationError::UnsupportedConstruct {
            construct: "Array membership".into(),
            dialect: self.name(),
        })
    }
}
