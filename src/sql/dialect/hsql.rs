//! HSQLDB SQL dialect.
//!
//! HSQLDB differences from ANSI:
//! - No row value constructors: tuple comparisons are expanded per component
//! - No WITH clause inside subqueries: nested CTEs move to the statement
//! - Recursive search paths are built as strings, not arrays
//! - Untyped parameters are rejected in several positions, so the rules
//!   below wrap them in `cast(? as <type>)`
//! - `mod(a, b)` instead of `%`
//! - `IN(UNNEST(?))` for array-bound IN lists
//! - `from (values(0))` for table-less selects
//! - Only `ROWS ONLY` in FETCH FIRST
//! - No rollup/cube in GROUP BY

use super::helpers;
use super::SqlDialect;
use crate::sql::ast::{
    BinaryArithmeticOperator, CaseSearched, CaseSimple, ComparisonOperator, Expression, Limit,
    SelectItem,
};
use crate::sql::error::TranslationError;
use crate::sql::render::{
    are_all_results_parameters, ArrayOperand, CaseResultRendering, RenderingMode,
    SqlAstTranslator,
};
use crate::types::SqlTypeCode;
use tracing::trace;

/// HSQLDB SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Hsql;

impl Hsql {
    /// First arm is cast when every result is a parameter (and parameters
    /// render plainly), or when every WHEN result is a plain parameter or a
    /// literal.
    fn case_rendering<'e>(
        tr: &SqlAstTranslator<'_>,
        results: &[&'e Expression],
        otherwise: Option<&'e Expression>,
    ) -> CaseResultRendering {
        let mode = tr.parameter_rendering_mode();
        if (mode == RenderingMode::Default && are_all_results_parameters(results, otherwise))
            || are_all_results_plain_parameters_or_literals(mode, results)
        {
            CaseResultRendering::CastFirst
        } else {
            CaseResultRendering::Plain
        }
    }
}

/// A parameter counts as plain only while parameters render as `?`.
fn are_all_results_plain_parameters_or_literals(
    mode: RenderingMode,
    results: &[&Expression],
) -> bool {
    let plain = |e: &Expression| {
        if e.is_parameter() {
            mode == RenderingMode::Default
        } else {
            e.is_literal()
        }
    };
    !results.is_empty() && results.iter().all(|e| plain(e))
}

impl SqlDialect for Hsql {
    fn name(&self) -> &'static str {
        "hsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn supports_with_clause_in_subquery(&self) -> bool {
        false
    }

    fn supports_recursive_clause_array_and_row_emulation(&self) -> bool {
        false
    }

    fn supports_filter_clause(&self) -> bool {
        true
    }

    fn supports_row_value_constructor_syntax(&self) -> bool {
        false
    }

    fn supports_row_value_constructor_syntax_in_in_list(&self) -> bool {
        false
    }

    fn supports_row_value_constructor_syntax_in_quantified_predicates(&self) -> bool {
        false
    }

    fn supports_in_list_array_binding(&self) -> bool {
        true
    }

    fn from_dual(&self) -> &'static str {
        " from (values(0))"
    }

    fn from_dual_for_select_only(&self) -> &'static str {
        self.from_dual()
    }

    fn visit_boolean_expression_predicate(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        expression: &Expression,
        negated: bool,
    ) -> Result<(), TranslationError> {
        if negated {
            tr.append_sql("not(");
            tr.render_expression(expression)?;
            tr.append_sql(")");
            Ok(())
        } else {
            tr.render_expression(expression)
        }
    }

    fn visit_recursive_path(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        path: &Expression,
        size_estimate: i32,
    ) -> Result<(), TranslationError> {
        if size_estimate == -1 {
            return tr.render_expression(path);
        }
        tr.append_sql("cast(");
        tr.render_expression(path)?;
        tr.append_sql(&format!(" as varchar({}))", size_estimate));
        Ok(())
    }

    fn visit_case_searched(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        case: &CaseSearched,
    ) -> Result<(), TranslationError> {
        let results: Vec<&Expression> = case.results().collect();
        let rendering = Hsql::case_rendering(tr, &results, case.otherwise.as_deref());
        tr.visit_case_searched_standard(case, rendering)
    }

    fn visit_case_simple(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        case: &CaseSimple,
    ) -> Result<(), TranslationError> {
        let results: Vec<&Expression> = case.results().collect();
        let rendering = Hsql::case_rendering(tr, &results, case.otherwise.as_deref());
        tr.visit_case_simple_standard(case, rendering)
    }

    fn render_select_expression(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        expression: &Expression,
    ) -> Result<(), TranslationError> {
        tr.render_select_expression_with_casted_or_inlined_plain_parameters(expression)
    }

    fn render_select_tuple_comparison(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        selections: &[SelectItem],
        tuple: &[Expression],
        op: ComparisonOperator,
    ) -> Result<(), TranslationError> {
        tr.emulate_select_tuple_comparison(selections, tuple, op, true)
    }

    fn render_comparison(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        lhs: &Expression,
        op: ComparisonOperator,
        rhs: &Expression,
    ) -> Result<(), TranslationError> {
        let Some(lhs_type) = lhs.expression_type() else {
            trace!(?op, "untyped comparison operand, using standard rendering");
            return tr.render_comparison_standard(lhs, op, rhs);
        };
        let jdbc_type = lhs_type.jdbc_type.clone();

        match op {
            ComparisonOperator::Equal | ComparisonOperator::NotEqual
                if jdbc_type.code == SqlTypeCode::Array =>
            {
                tr.render_expression(lhs)?;
                tr.append_sql(if op == ComparisonOperator::Equal {
                    " IN("
                } else {
                    " NOT IN("
                });
                tr.render_expression(rhs)?;
                tr.append_sql(")");
                Ok(())
            }
            ComparisonOperator::DistinctFrom | ComparisonOperator::NotDistinctFrom => {
                if jdbc_type.is_array_capable() {
                    // arrays compare with distinct-from semantics natively
                    tr.render_expression(lhs)?;
                    tr.append_sql(if op == ComparisonOperator::DistinctFrom {
                        "<>"
                    } else {
                        "="
                    });
                    tr.render_expression(rhs)
                } else {
                    tr.render(lhs, RenderingMode::NoPlainParameter)?;
                    tr.append_sql(" ");
                    tr.append_sql(op.sql_text());
                    tr.append_sql(" ");
                    tr.render(rhs, RenderingMode::NoPlainParameter)
                }
            }
            _ => tr.render_comparison_standard(lhs, op, rhs),
        }
    }

    fn render_partition_item(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        expression: &Expression,
    ) -> Result<(), TranslationError> {
        match expression {
            Expression::Literal { .. } => {
                tr.append_sql("'0' || '0'");
                Ok(())
            }
            Expression::Summarization { .. } => Err(TranslationError::UnsupportedConstruct {
                construct: "Summarization".into(),
                dialect: self.name(),
            }),
            _ => tr.render_expression(expression),
        }
    }

    fn visit_binary_arithmetic(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        op: BinaryArithmeticOperator,
        lhs: &Expression,
        rhs: &Expression,
    ) -> Result<(), TranslationError> {
        if op == BinaryArithmeticOperator::Modulo {
            tr.append_sql("mod(");
            tr.render_expression(lhs)?;
            tr.append_sql(", ");
            tr.render_expression(rhs)?;
            tr.append_sql(")");
            return Ok(());
        }
        tr.append_sql("(");
        tr.render(lhs, RenderingMode::NoPlainParameter)?;
        tr.append_sql(" ");
        tr.append_sql(op.sql_text());
        tr.append_sql(" ");
        tr.render(rhs, RenderingMode::NoPlainParameter)?;
        tr.append_sql(")");
        Ok(())
    }

    fn visit_offset_fetch_clause(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        limit: Limit<'_>,
    ) -> Result<(), TranslationError> {
        if self.supports_offset_fetch_clause() {
            tr.assert_rows_only_fetch_clause_type(limit)?;
            tr.render_offset_fetch_clause(limit, true)
        } else {
            tr.render_limit_offset_clause(limit)
        }
    }

    fn visit_in_list_array(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        test: &Expression,
        array: &ArrayOperand<'_>,
        negated: bool,
    ) -> Result<(), TranslationError> {
        tr.render_expression(test)?;
        tr.append_sql(if negated {
            " NOT IN(UNNEST("
        } else {
            " IN(UNNEST("
        });
        tr.render_array_operand(array)?;
        tr.append_sql("))");
        Ok(())
    }
}
