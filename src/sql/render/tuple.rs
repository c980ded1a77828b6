//! Row value emulation and IN lists.
//!
//! Databases without row value constructors get tuple comparisons expanded
//! into per-component comparisons. Every component goes back through the
//! dialect's `render_comparison`, so component rendering rules still apply.

use tracing::{debug, trace};

use super::{ArrayOperand, ParameterSource, SqlAstTranslator};
use crate::sql::ast::{ComparisonOperator, Cte, Expression, QueryPart, SelectItem};
use crate::sql::dialect::SqlDialect;
use crate::sql::error::TranslationError;
use crate::sql::token::Token;
use crate::types::{JdbcMapping, Value};

pub(super) fn arity_mismatch(left: usize, right: usize) -> TranslationError {
    TranslationError::InvalidExpression(format!(
        "cannot compare a tuple of {} elements with a tuple of {} elements",
        left, right
    ))
}

fn strict(op: ComparisonOperator) -> ComparisonOperator {
    match op {
        ComparisonOperator::LessThanOrEqual => ComparisonOperator::LessThan,
        ComparisonOperator::GreaterThanOrEqual => ComparisonOperator::GreaterThan,
        other => other,
    }
}

fn loose(op: ComparisonOperator) -> ComparisonOperator {
    match op {
        ComparisonOperator::LessThan => ComparisonOperator::LessThanOrEqual,
        ComparisonOperator::GreaterThan => ComparisonOperator::GreaterThanOrEqual,
        other => other,
    }
}

/// Array operand for an IN list whose items are all non-null scalar
/// literals or single-valued parameters of one type.
fn homogeneous_array_operand(list: &[Expression]) -> Option<ArrayOperand<'static>> {
    let element = list.first()?.expression_type()?.clone();
    if element.jdbc_type.is_array_capable() {
        return None;
    }

    let mut fixed = Vec::with_capacity(list.len());
    let mut sources = Vec::with_capacity(list.len());
    for item in list {
        match item {
            Expression::Literal { value, mapping }
                if *mapping == element && !value.is_null() && !value.is_plural() =>
            {
                fixed.push(value.clone());
                sources.push(ParameterSource::Fixed(value.clone()));
            }
            Expression::Parameter {
                name,
                mapping,
                multi_valued: false,
            } if *mapping == element => sources.push(ParameterSource::Named(name.clone())),
            _ => return None,
        }
    }

    let source = if fixed.len() == sources.len() {
        ParameterSource::Fixed(Value::Collection(fixed))
    } else {
        ParameterSource::Elements(sources)
    };
    Some(ArrayOperand::Bind { source, element })
}

fn bound_len(value: &Value) -> usize {
    match value {
        Value::Collection(values) => values.len(),
        Value::ReferenceArray(array) => array.len(),
        Value::PrimitiveArray(array) => array.len(),
        _ => 1,
    }
}

impl SqlAstTranslator<'_> {
    fn render_component_comparison(
        &mut self,
        lhs: &Expression,
        op: ComparisonOperator,
        rhs: &Expression,
    ) -> Result<(), TranslationError> {
        let d = self.dialect;
        d.render_comparison(self, lhs, op, rhs)
    }

    /// Expand `(l1, l2, ...) <op> (r1, r2, ...)` into component comparisons.
    ///
    /// Equality becomes a conjunction and inequality a disjunction. Ordering
    /// operators become a lexicographic chain; `index_optimized` repeats the
    /// leading component with the non-strict operator so an index on it can
    /// be used.
    pub fn emulate_tuple_comparison(
        &mut self,
        lhs: &[&Expression],
        rhs: &[&Expression],
        op: ComparisonOperator,
        index_optimized: bool,
    ) -> Result<(), TranslationError> {
        if lhs.len() != rhs.len() {
            return Err(arity_mismatch(lhs.len(), rhs.len()));
        }
        if lhs.is_empty() {
            return Err(TranslationError::InvalidExpression(
                "comparison of empty tuples".into(),
            ));
        }
        trace!(?op, arity = lhs.len(), index_optimized, "emulating tuple comparison");

        match op {
            ComparisonOperator::Equal | ComparisonOperator::NotDistinctFrom => {
                self.render_comparison_chain(lhs, rhs, op, Token::And)
            }
            ComparisonOperator::NotEqual | ComparisonOperator::DistinctFrom => {
                self.render_comparison_chain(lhs, rhs, op, Token::Or)
            }
            _ if index_optimized => {
                self.out.lparen();
                self.render_lexicographic_optimized(lhs, rhs, op, 0)?;
                self.out.rparen();
                Ok(())
            }
            _ => self.render_lexicographic(lhs, rhs, op, 0),
        }
    }

    fn render_comparison_chain(
        &mut self,
        lhs: &[&Expression],
        rhs: &[&Expression],
        op: ComparisonOperator,
        junction: Token,
    ) -> Result<(), TranslationError> {
        let wrap = lhs.len() > 1;
        if wrap {
            self.out.lparen();
        }
        for (i, (l, r)) in lhs.iter().zip(rhs).enumerate() {
            if i > 0 {
                self.out.space().push(junction.clone()).space();
            }
            self.render_component_comparison(l, op, r)?;
        }
        if wrap {
            self.out.rparen();
        }
        Ok(())
    }

    /// `(l1 < r1 OR l1 = r1 AND <rest>)`
    fn render_lexicographic(
        &mut self,
        lhs: &[&Expression],
        rhs: &[&Expression],
        op: ComparisonOperator,
        i: usize,
    ) -> Result<(), TranslationError> {
        if i == lhs.len() - 1 {
            return self.render_component_comparison(lhs[i], op, rhs[i]);
        }
        self.out.lparen();
        self.render_component_comparison(lhs[i], strict(op), rhs[i])?;
        self.out.space().push(Token::Or).space();
        self.render_component_comparison(lhs[i], ComparisonOperator::Equal, rhs[i])?;
        self.out.space().push(Token::And).space();
        self.render_lexicographic(lhs, rhs, op, i + 1)?;
        self.out.rparen();
        Ok(())
    }

    /// `l1 <= r1 AND (l1 < r1 OR <rest>)`
    fn render_lexicographic_optimized(
        &mut self,
        lhs: &[&Expression],
        rhs: &[&Expression],
        op: ComparisonOperator,
        i: usize,
    ) -> Result<(), TranslationError> {
        if i == lhs.len() - 1 {
            return self.render_component_comparison(lhs[i], op, rhs[i]);
        }
        self.render_component_comparison(lhs[i], loose(op), rhs[i])?;
        self.out.space().push(Token::And).space().lparen();
        self.render_component_comparison(lhs[i], strict(op), rhs[i])?;
        self.out.space().push(Token::Or).space();
        self.render_lexicographic_optimized(lhs, rhs, op, i + 1)?;
        self.out.rparen();
        Ok(())
    }

    /// Compare the select list of a subquery against `tuple` component-wise.
    pub fn emulate_select_tuple_comparison(
        &mut self,
        selections: &[SelectItem],
        tuple: &[Expression],
        op: ComparisonOperator,
        index_optimized: bool,
    ) -> Result<(), TranslationError> {
        let lhs: Vec<&Expression> = selections.iter().map(|s| &s.expression).collect();
        let rhs: Vec<&Expression> = tuple.iter().collect();
        self.emulate_tuple_comparison(&lhs, &rhs, op, index_optimized)
    }

    /// `(a, b) <op> (SELECT x, y ...)`, or without row value support
    /// `EXISTS (SELECT 1 FROM ... WHERE ... AND x <op'> a AND y <op'> b)`
    /// where `op'` is `op` with its operands swapped.
    pub(super) fn render_tuple_subquery_comparison(
        &mut self,
        tuple: &[Expression],
        op: ComparisonOperator,
        subquery: &QueryPart,
    ) -> Result<(), TranslationError> {
        let d = self.dialect;
        if d.supports_row_value_constructor_syntax_in_quantified_predicates() {
            self.out.lparen();
            self.render_list(tuple)?;
            self.out.rparen();
            self.append_sql(&format!(" {} ", op.sql_text()));
            self.out.lparen();
            self.render_subquery(subquery)?;
            self.out.rparen();
            return Ok(());
        }

        let QueryPart::Spec(spec) = subquery else {
            return Err(TranslationError::unsupported(
                "Tuple comparison against a set operation",
                d.name(),
            ));
        };
        if spec.offset.is_some() || spec.fetch.is_some() {
            return Err(TranslationError::unsupported(
                "Tuple comparison against a subquery with OFFSET or FETCH",
                d.name(),
            ));
        }
        if spec.select.len() != tuple.len() {
            return Err(arity_mismatch(tuple.len(), spec.select.len()));
        }
        // DISTINCT and ORDER BY do not change whether a matching row exists.
        debug!(dialect = %d, arity = tuple.len(), "emulating tuple subquery comparison with EXISTS");

        self.nested(|tr| {
            tr.out.push(Token::Exists).space().lparen();
            // without WITH support the subquery's CTEs were hoisted to the statement
            if d.supports_with_clause_in_subquery() {
                let ctes: Vec<&Cte> = spec.ctes.iter().collect();
                tr.render_with_clause(&ctes)?;
            }
            tr.out
                .push(Token::Select)
                .space()
                .push(Token::LitInt(1));
            tr.render_from_clause(spec, false)?;

            let (restriction, existing) = if spec.group_by.is_empty() {
                (Token::Where, spec.filter.as_ref())
            } else {
                if let Some(filter) = &spec.filter {
                    tr.out.space().push(Token::Where).space();
                    tr.render_predicate(filter)?;
                }
                tr.render_group_by(&spec.group_by)?;
                (Token::Having, spec.having.as_ref())
            };
            tr.out.space().push(restriction).space();
            if let Some(existing) = existing {
                tr.out.lparen();
                tr.render_predicate(existing)?;
                tr.out.rparen().space().push(Token::And).space();
            }
            d.render_select_tuple_comparison(tr, &spec.select, tuple, op.inverted())?;
            tr.out.rparen();
            Ok(())
        })
    }

    pub(super) fn render_in_list(
        &mut self,
        test: &Expression,
        list: &[Expression],
        negated: bool,
    ) -> Result<(), TranslationError> {
        let d = self.dialect;
        if list.is_empty() {
            self.render_empty_in_list(negated);
            return Ok(());
        }
        if let [Expression::Parameter {
            name,
            mapping,
            multi_valued: true,
        }] = list
        {
            return self.render_multi_valued_in_list(test, name, mapping, negated);
        }
        if let Expression::Tuple(components) = test {
            if !d.supports_row_value_constructor_syntax_in_in_list() {
                return self.emulate_tuple_in_list(components, list, negated);
            }
        }
        if self.in_list_array_binding_enabled() {
            if let Some(operand) = homogeneous_array_operand(list) {
                debug!(dialect = %d, len = list.len(), "binding IN list as a single array parameter");
                return d.visit_in_list_array(self, test, &operand, negated);
            }
        }

        self.render_expression(test)?;
        self.append_sql(if negated { " not in(" } else { " in(" });
        self.render_list(list)?;
        self.out.rparen();
        Ok(())
    }

    fn in_list_array_binding_enabled(&self) -> bool {
        self.options.in_list_array_binding && self.dialect.supports_in_list_array_binding()
    }

    /// A lone multi-valued parameter binds as one array where possible and
    /// otherwise expands to one placeholder per bound element.
    fn render_multi_valued_in_list(
        &mut self,
        test: &Expression,
        name: &str,
        element: &JdbcMapping,
        negated: bool,
    ) -> Result<(), TranslationError> {
        let d = self.dialect;
        if self.in_list_array_binding_enabled() {
            let operand = ArrayOperand::Bind {
                source: ParameterSource::Named(name.to_string()),
                element: element.clone(),
            };
            return d.visit_in_list_array(self, test, &operand, negated);
        }

        let count = self
            .bindings
            .and_then(|bindings| bindings.get(name))
            .map(bound_len)
            .ok_or_else(|| TranslationError::MissingParameterBinding(name.to_string()))?;
        if count == 0 {
            self.render_empty_in_list(negated);
            return Ok(());
        }
        trace!(parameter = %name, count, "expanding multi-valued parameter");

        self.render_expression(test)?;
        self.append_sql(if negated { " not in(" } else { " in(" });
        for index in 0..count {
            if index > 0 {
                self.out.comma().space();
            }
            self.render_parameter(
                ParameterSource::Element {
                    name: name.to_string(),
                    index,
                },
                element.clone(),
            );
        }
        self.out.rparen();
        Ok(())
    }

    /// `(a, b) IN ((1, 2), (3, 4))` as `((a = 1 AND b = 2) OR (a = 3 AND b = 4))`.
    fn emulate_tuple_in_list(
        &mut self,
        components: &[Expression],
        list: &[Expression],
        negated: bool,
    ) -> Result<(), TranslationError> {
        let (op, junction) = if negated {
            (ComparisonOperator::NotEqual, Token::And)
        } else {
            (ComparisonOperator::Equal, Token::Or)
        };
        let lhs: Vec<&Expression> = components.iter().collect();

        self.out.lparen();
        for (i, item) in list.iter().enumerate() {
            let Expression::Tuple(values) = item else {
                return Err(TranslationError::InvalidExpression(
                    "IN list of a tuple must contain tuples".into(),
                ));
            };
            if i > 0 {
                self.out.space().push(junction.clone()).space();
            }
            let rhs: Vec<&Expression> = values.iter().collect();
            self.emulate_tuple_comparison(&lhs, &rhs, op, false)?;
        }
        self.out.rparen();
        Ok(())
    }
}
