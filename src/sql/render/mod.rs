//! SQL AST translation.
//!
//! [`SqlAstTranslator`] walks a [`Statement`] once, appending tokens to a
//! [`TokenStream`] and recording a [`JdbcParameter`] for every `?` it emits,
//! in emission order. Dialects customize the walk through the hooks of
//! [`SqlDialect`]; the `*_standard` methods here are the generic behaviour
//! those hooks fall back to.
//!
//! # Example
//!
//! ```ignore
//! use quill::sql::{ast::*, Dialect, SqlAstTranslator};
//!
//! let query = QuerySpec::new()
//!     .select(vec![table_col("p", "id")])
//!     .from(TableReference::new("person").with_alias("p"))
//!     .filter(table_col("p", "id").eq(param("id", JdbcMapping::integer())));
//!
//! let op = SqlAstTranslator::new(Dialect::Hsql).translate(&query.into())?;
//! assert_eq!(op.sql, r#"SELECT "p"."id" FROM "person" AS "p" WHERE "p"."id" = ?"#);
//! ```

mod operation;
mod query;
mod tuple;

pub use operation::{BoundValue, JdbcOperation, JdbcParameter, ParameterBindings, ParameterSource};

use tracing::{debug, trace};

use super::ast::{
    Aggregate, BinaryArithmeticOperator, CaseSearched, CaseSimple, ComparisonOperator,
    Expression, JunctionKind, Over, Predicate, SortDirection, SortSpecification, Statement,
    NullPrecedence,
};
use super::dialect::{Dialect, SqlDialect};
use super::error::TranslationError;
use super::token::{Token, TokenStream};
use crate::types::{literal_token, BasicTypeRegistry, JdbcMapping, Value};

/// How parameters render in the current position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderingMode {
    /// `?`
    #[default]
    Default,
    /// `cast(? as <type>)`, for positions where the database cannot infer
    /// the parameter type.
    NoPlainParameter,
}

/// How the result arms of a CASE expression render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaseResultRendering {
    Plain,
    /// The first WHEN result is wrapped in a cast so the CASE gets a type.
    CastFirst,
}

/// Right-hand side of an array membership test.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayOperand<'e> {
    /// Array-valued expression from the AST.
    Expression(&'e Expression),
    /// A single array parameter built from an IN list.
    Bind {
        source: ParameterSource,
        element: JdbcMapping,
    },
}

/// Translation switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranslationOptions {
    /// Bind homogeneous IN lists as one array parameter where the dialect
    /// can.
    pub in_list_array_binding: bool,
}

impl Default for TranslationOptions {
    fn default() -> Self {
        Self {
            in_list_array_binding: true,
        }
    }
}

/// Whether every WHEN result and the ELSE result (if any) is a parameter.
pub fn are_all_results_parameters(results: &[&Expression], otherwise: Option<&Expression>) -> bool {
    !results.is_empty()
        && results.iter().all(|e| e.is_parameter())
        && otherwise.map_or(true, Expression::is_parameter)
}

/// Translate a statement with default options and the shared type registry.
pub fn translate(statement: &Statement, dialect: Dialect) -> Result<JdbcOperation, TranslationError> {
    SqlAstTranslator::new(dialect).translate(statement)
}

/// Single-use translator from the SQL AST to a [`JdbcOperation`].
pub struct SqlAstTranslator<'a> {
    dialect: Dialect,
    types: &'a BasicTypeRegistry,
    bindings: Option<&'a ParameterBindings>,
    options: TranslationOptions,
    out: TokenStream,
    parameters: Vec<JdbcParameter>,
    modes: Vec<RenderingMode>,
    query_depth: usize,
}

impl<'a> SqlAstTranslator<'a> {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            types: BasicTypeRegistry::shared(),
            bindings: None,
            options: TranslationOptions::default(),
            out: TokenStream::new(),
            parameters: vec![],
            modes: vec![],
            query_depth: 0,
        }
    }

    /// Use `types` instead of the shared registry for literals and arrays.
    #[must_use]
    pub fn with_types(mut self, types: &'a BasicTypeRegistry) -> Self {
        self.types = types;
        self
    }

    /// Bindings known at translation time; needed to expand multi-valued
    /// parameters when arrays cannot be bound.
    #[must_use]
    pub fn with_bindings(mut self, bindings: &'a ParameterBindings) -> Self {
        self.bindings = Some(bindings);
        self
    }

    #[must_use]
    pub fn with_options(mut self, options: TranslationOptions) -> Self {
        self.options = options;
        self
    }

    pub fn translate(mut self, statement: &Statement) -> Result<JdbcOperation, TranslationError> {
        self.render_statement(statement)?;
        debug_assert_eq!(self.out.param_count(), self.parameters.len());

        let sql = self.out.serialize(self.dialect);
        debug!(dialect = %self.dialect, parameters = self.parameters.len(), "translated statement");
        Ok(JdbcOperation {
            sql,
            parameters: self.parameters,
        })
    }

    // =========================================================================
    // Output Primitives
    // =========================================================================

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    pub fn parameter_rendering_mode(&self) -> RenderingMode {
        self.modes.last().copied().unwrap_or_default()
    }

    /// Append a trusted SQL fragment.
    pub fn append_sql(&mut self, sql: &str) {
        if !sql.is_empty() {
            self.out.raw(sql);
        }
    }

    pub fn push(&mut self, token: Token) {
        self.out.push(token);
    }

    /// Render `expression` with parameters in `mode`.
    pub fn render(&mut self, expression: &Expression, mode: RenderingMode) -> Result<(), TranslationError> {
        self.modes.push(mode);
        let result = self.render_expression(expression);
        self.modes.pop();
        result
    }

    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, TranslationError>,
    ) -> Result<T, TranslationError> {
        self.query_depth += 1;
        let result = f(self);
        self.query_depth -= 1;
        result
    }

    fn render_list(&mut self, items: &[Expression]) -> Result<(), TranslationError> {
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                self.out.comma().space();
            }
            self.render_expression(item)?;
        }
        Ok(())
    }

    fn push_parameter(&mut self, source: ParameterSource, mapping: JdbcMapping) {
        self.out.push(Token::Param);
        self.parameters.push(JdbcParameter { source, mapping });
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    pub fn render_expression(&mut self, expression: &Expression) -> Result<(), TranslationError> {
        let d = self.dialect;
        match expression {
            Expression::Column {
                qualifier, name, ..
            } => {
                self.out.push(Token::QualifiedIdent {
                    qualifier: qualifier.clone(),
                    name: name.clone(),
                });
                Ok(())
            }
            Expression::Literal { value, mapping } => self.render_literal(value, mapping),
            Expression::Parameter { name, mapping, .. } => {
                self.render_parameter(ParameterSource::Named(name.clone()), mapping.clone());
                Ok(())
            }
            Expression::BinaryArithmetic { op, lhs, rhs } => {
                d.visit_binary_arithmetic(self, *op, lhs, rhs)
            }
            Expression::CaseSearched(case) => d.visit_case_searched(self, case),
            Expression::CaseSimple(case) => d.visit_case_simple(self, case),
            Expression::Tuple(items) => {
                self.out.lparen();
                self.render_list(items)?;
                self.out.rparen();
                Ok(())
            }
            Expression::Summarization { kind, groupings } => {
                self.append_sql(kind.sql_text());
                self.out.lparen();
                self.render_list(groupings)?;
                self.out.rparen();
                Ok(())
            }
            Expression::Function { name, args, .. } => {
                self.out.push(Token::FunctionName(name.clone())).lparen();
                self.render_list(args)?;
                self.out.rparen();
                Ok(())
            }
            Expression::Aggregate(aggregate) => self.render_aggregate(aggregate),
            Expression::Over(over) => self.render_over(over),
            Expression::Subquery(query) => {
                self.out.lparen();
                self.render_subquery(query)?;
                self.out.rparen();
                Ok(())
            }
        }
    }

    fn render_literal(&mut self, value: &Value, mapping: &JdbcMapping) -> Result<(), TranslationError> {
        let d = self.dialect;
        if value.is_plural() {
            if !d.supports_array_constructor() {
                return Err(TranslationError::unsupported("Array literal", d.name()));
            }
            let element = mapping.element_type_name().ok_or_else(|| {
                TranslationError::InvalidExpression(format!(
                    "array literal typed as non-array '{}'",
                    mapping.type_name
                ))
            })?;
            let sql = self.types.array_of(element)?.format_literal(value, d)?;
            self.out.push(Token::Raw(sql));
            return Ok(());
        }

        let token = match self.types.get(&mapping.type_name) {
            Some(basic) => basic.literal_token(value)?,
            None => {
                trace!(type_name = %mapping.type_name, "literal of unregistered type");
                literal_token(value)?
            }
        };
        self.out.push(token);
        Ok(())
    }

    fn render_parameter(&mut self, source: ParameterSource, mapping: JdbcMapping) {
        match self.parameter_rendering_mode() {
            RenderingMode::Default => self.push_parameter(source, mapping),
            RenderingMode::NoPlainParameter => {
                let type_name = self.dialect.cast_type_name(&mapping.jdbc_type);
                self.append_sql("cast(");
                self.push_parameter(source, mapping);
                self.append_sql(&format!(" as {})", type_name));
            }
        }
    }

    /// `cast(<expression> as <type>)` using the expression's own type.
    pub fn render_casted(&mut self, expression: &Expression) -> Result<(), TranslationError> {
        let Some(mapping) = expression.expression_type() else {
            trace!("untyped expression, rendering without cast");
            return self.render_expression(expression);
        };
        let type_name = self.dialect.cast_type_name(&mapping.jdbc_type);
        self.append_sql("cast(");
        self.render(expression, RenderingMode::Default)?;
        self.append_sql(&format!(" as {})", type_name));
        Ok(())
    }

    /// SELECT item for databases that reject untyped parameters and NULLs in
    /// the select list.
    pub fn render_select_expression_with_casted_or_inlined_plain_parameters(
        &mut self,
        expression: &Expression,
    ) -> Result<(), TranslationError> {
        match expression {
            Expression::Literal {
                value: Value::Null, ..
            }
            | Expression::Parameter { .. } => self.render_casted(expression),
            _ => self.render_expression(expression),
        }
    }

    pub fn render_binary_arithmetic_standard(
        &mut self,
        op: BinaryArithmeticOperator,
        lhs: &Expression,
        rhs: &Expression,
    ) -> Result<(), TranslationError> {
        self.out.lparen();
        self.render_expression(lhs)?;
        self.append_sql(&format!(" {} ", op.sql_text()));
        self.render_expression(rhs)?;
        self.out.rparen();
        Ok(())
    }

    pub fn visit_case_searched_standard(
        &mut self,
        case: &CaseSearched,
        rendering: CaseResultRendering,
    ) -> Result<(), TranslationError> {
        if case.when.is_empty() {
            return Err(TranslationError::InvalidExpression(
                "CASE expression without WHEN arms".into(),
            ));
        }
        self.out.push(Token::Case);
        for (i, when) in case.when.iter().enumerate() {
            self.out.space().push(Token::When).space();
            self.render_predicate(&when.predicate)?;
            self.out.space().push(Token::Then).space();
            self.render_case_result(&when.result, i == 0 && rendering == CaseResultRendering::CastFirst)?;
        }
        self.render_case_end(case.otherwise.as_deref())
    }

    pub fn visit_case_simple_standard(
        &mut self,
        case: &CaseSimple,
        rendering: CaseResultRendering,
    ) -> Result<(), TranslationError> {
        if case.when.is_empty() {
            return Err(TranslationError::InvalidExpression(
                "CASE expression without WHEN arms".into(),
            ));
        }
        self.out.push(Token::Case).space();
        self.render_expression(&case.subject)?;
        for (i, when) in case.when.iter().enumerate() {
            self.out.space().push(Token::When).space();
            self.render_expression(&when.value)?;
            self.out.space().push(Token::Then).space();
            self.render_case_result(&when.result, i == 0 && rendering == CaseResultRendering::CastFirst)?;
        }
        self.render_case_end(case.otherwise.as_deref())
    }

    fn render_case_result(&mut self, result: &Expression, cast: bool) -> Result<(), TranslationError> {
        if cast {
            self.render_casted(result)
        } else {
            self.render_expression(result)
        }
    }

    fn render_case_end(&mut self, otherwise: Option<&Expression>) -> Result<(), TranslationError> {
        if let Some(otherwise) = otherwise {
            self.out.space().push(Token::Else).space();
            self.render_expression(otherwise)?;
        }
        self.out.space().push(Token::End);
        Ok(())
    }

    fn render_aggregate(&mut self, aggregate: &Aggregate) -> Result<(), TranslationError> {
        let d = self.dialect;
        let native_filter = d.supports_filter_clause();

        self.out
            .push(Token::FunctionName(aggregate.name.clone()))
            .lparen();
        if aggregate.distinct {
            self.out.push(Token::Distinct).space();
        }
        match aggregate.filter.as_deref() {
            Some(filter) if !native_filter => {
                trace!(aggregate = %aggregate.name, "emulating FILTER clause with CASE");
                if aggregate.args.is_empty() {
                    self.render_filtered_argument(filter, None)?;
                }
                for (i, arg) in aggregate.args.iter().enumerate() {
                    if i > 0 {
                        self.out.comma().space();
                    }
                    self.render_filtered_argument(filter, Some(arg))?;
                }
            }
            _ if aggregate.args.is_empty() => {
                self.out.push(Token::Star);
            }
            _ => self.render_list(&aggregate.args)?,
        }
        self.out.rparen();

        if let Some(filter) = aggregate.filter.as_deref().filter(|_| native_filter) {
            self.out
                .space()
                .push(Token::Filter)
                .space()
                .lparen()
                .push(Token::Where)
                .space();
            self.render_predicate(filter)?;
            self.out.rparen();
        }
        Ok(())
    }

    /// `CASE WHEN <filter> THEN <arg> ELSE NULL END`; a star argument counts
    /// as `1`.
    fn render_filtered_argument(
        &mut self,
        filter: &Predicate,
        arg: Option<&Expression>,
    ) -> Result<(), TranslationError> {
        self.out.push(Token::Case).space().push(Token::When).space();
        self.render_predicate(filter)?;
        self.out.space().push(Token::Then).space();
        match arg {
            Some(arg) => self.render_expression(arg)?,
            None => {
                self.out.push(Token::LitInt(1));
            }
        }
        self.out
            .space()
            .push(Token::Else)
            .space()
            .push(Token::Null)
            .space()
            .push(Token::End);
        Ok(())
    }

    fn render_over(&mut self, over: &Over) -> Result<(), TranslationError> {
        let d = self.dialect;
        self.render_expression(&over.function)?;
        self.out.space().push(Token::Over).space().lparen();
        if !over.partitions.is_empty() {
            self.out.push(Token::PartitionBy).space();
            for (i, partition) in over.partitions.iter().enumerate() {
                if i > 0 {
                    self.out.comma().space();
                }
                d.render_partition_item(self, partition)?;
            }
        }
        if !over.order.is_empty() {
            if !over.partitions.is_empty() {
                self.out.space();
            }
            self.out.push(Token::OrderBy).space();
            self.render_sort_list(&over.order)?;
        }
        self.out.rparen();
        Ok(())
    }

    /// GROUP BY / PARTITION BY item: a constant groups everything into one
    /// empty grouping set.
    pub fn render_partition_item_standard(
        &mut self,
        expression: &Expression,
    ) -> Result<(), TranslationError> {
        match expression {
            Expression::Literal { .. } => {
                self.out.lparen().rparen();
                Ok(())
            }
            _ => self.render_expression(expression),
        }
    }

    fn render_sort_list(&mut self, items: &[SortSpecification]) -> Result<(), TranslationError> {
        for (i, sort) in items.iter().enumerate() {
            if i > 0 {
                self.out.comma().space();
            }
            self.render_sort_specification(sort)?;
        }
        Ok(())
    }

    fn render_sort_specification(&mut self, sort: &SortSpecification) -> Result<(), TranslationError> {
        let native_nulls = self.dialect.supports_nulls_ordering();
        if let Some(nulls) = sort.nulls.filter(|_| !native_nulls) {
            // sort key that puts NULLs on the requested side
            let (null_rank, other_rank) = match nulls {
                NullPrecedence::First => (0, 1),
                NullPrecedence::Last => (1, 0),
            };
            self.out.push(Token::Case).space().push(Token::When).space();
            self.render_expression(&sort.expression)?;
            self.out
                .space()
                .push(Token::IsNull)
                .space()
                .push(Token::Then)
                .space()
                .push(Token::LitInt(null_rank))
                .space()
                .push(Token::Else)
                .space()
                .push(Token::LitInt(other_rank))
                .space()
                .push(Token::End)
                .comma()
                .space();
        }

        self.render_expression(&sort.expression)?;
        match sort.direction {
            SortDirection::Ascending => self.out.space().push(Token::Asc),
            SortDirection::Descending => self.out.space().push(Token::Desc),
        };
        if let Some(nulls) = sort.nulls.filter(|_| native_nulls) {
            self.out.space().push(match nulls {
                NullPrecedence::First => Token::NullsFirst,
                NullPrecedence::Last => Token::NullsLast,
            });
        }
        Ok(())
    }

    // =========================================================================
    // Predicates
    // =========================================================================

    pub fn render_predicate(&mut self, predicate: &Predicate) -> Result<(), TranslationError> {
        let d = self.dialect;
        match predicate {
            Predicate::BooleanExpression {
                expression,
                negated,
            } => d.visit_boolean_expression_predicate(self, expression, *negated),
            Predicate::Comparison { lhs, op, rhs } => d.render_comparison(self, lhs, *op, rhs),
            Predicate::InList {
                test,
                list,
                negated,
            } => self.render_in_list(test, list, *negated),
            Predicate::InListArray {
                test,
                array,
                negated,
            } => match array {
                Some(array) => {
                    d.visit_in_list_array(self, test, &ArrayOperand::Expression(array), *negated)
                }
                None => {
                    self.render_empty_in_list(*negated);
                    Ok(())
                }
            },
            Predicate::TupleSubqueryComparison {
                tuple,
                op,
                subquery,
            } => self.render_tuple_subquery_comparison(tuple, *op, subquery),
            Predicate::NullCheck {
                expression,
                negated,
            } => self.render_null_check(expression, *negated),
            Predicate::Junction { kind, predicates } => self.render_junction(*kind, predicates),
            Predicate::Negated(inner) => {
                self.out.push(Token::Not).space().lparen();
                self.render_predicate(inner)?;
                self.out.rparen();
                Ok(())
            }
        }
    }

    pub fn render_boolean_expression_predicate_standard(
        &mut self,
        expression: &Expression,
        negated: bool,
    ) -> Result<(), TranslationError> {
        if negated {
            self.out.push(Token::Not).space();
        }
        self.render_expression(expression)
    }

    /// `<lhs> <op> <rhs>`; row values are compared natively when the dialect
    /// allows it and component-wise otherwise.
    pub fn render_comparison_standard(
        &mut self,
        lhs: &Expression,
        op: ComparisonOperator,
        rhs: &Expression,
    ) -> Result<(), TranslationError> {
        match (lhs, rhs) {
            (Expression::Tuple(left), Expression::Tuple(right)) => {
                if left.len() != right.len() {
                    return Err(tuple::arity_mismatch(left.len(), right.len()));
                }
                if self.dialect.supports_row_value_constructor_syntax() {
                    self.render_plain_comparison(lhs, op, rhs)
                } else {
                    let left: Vec<&Expression> = left.iter().collect();
                    let right: Vec<&Expression> = right.iter().collect();
                    self.emulate_tuple_comparison(&left, &right, op, false)
                }
            }
            (Expression::Tuple(tuple), Expression::Subquery(query)) => {
                self.render_tuple_subquery_comparison(tuple, op, query)
            }
            (Expression::Tuple(_), _) | (_, Expression::Tuple(_)) => Err(
                TranslationError::InvalidExpression("tuple compared with a scalar".into()),
            ),
            _ => self.render_plain_comparison(lhs, op, rhs),
        }
    }

    fn render_plain_comparison(
        &mut self,
        lhs: &Expression,
        op: ComparisonOperator,
        rhs: &Expression,
    ) -> Result<(), TranslationError> {
        self.render_expression(lhs)?;
        self.append_sql(&format!(" {} ", op.sql_text()));
        self.render_expression(rhs)
    }

    fn render_null_check(&mut self, expression: &Expression, negated: bool) -> Result<(), TranslationError> {
        let check = if negated { Token::IsNotNull } else { Token::IsNull };
        match expression {
            Expression::Tuple(items) if !items.is_empty() => {
                self.out.lparen();
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.space().push(Token::And).space();
                    }
                    self.render_expression(item)?;
                    self.out.space().push(check.clone());
                }
                self.out.rparen();
            }
            _ => {
                self.render_expression(expression)?;
                self.out.space().push(check);
            }
        }
        Ok(())
    }

    fn render_junction(&mut self, kind: JunctionKind, predicates: &[Predicate]) -> Result<(), TranslationError> {
        match predicates {
            [] => {
                self.append_sql(match kind {
                    JunctionKind::Conjunction => "1=1",
                    JunctionKind::Disjunction => "1=0",
                });
                Ok(())
            }
            [single] => self.render_predicate(single),
            _ => {
                let separator = match kind {
                    JunctionKind::Conjunction => Token::And,
                    JunctionKind::Disjunction => Token::Or,
                };
                for (i, predicate) in predicates.iter().enumerate() {
                    if i > 0 {
                        self.out.space().push(separator.clone()).space();
                    }
                    let wrap = matches!(
                        predicate,
                        Predicate::Junction { kind: inner, predicates } if *inner != kind && predicates.len() > 1
                    );
                    if wrap {
                        self.out.lparen();
                    }
                    self.render_predicate(predicate)?;
                    if wrap {
                        self.out.rparen();
                    }
                }
                Ok(())
            }
        }
    }

    fn render_empty_in_list(&mut self, negated: bool) {
        self.append_sql(if negated { "1=1" } else { "1=0" });
    }

    /// Emit a placeholder for an array operand, or render the array
    /// expression.
    pub fn render_array_operand(&mut self, array: &ArrayOperand<'_>) -> Result<(), TranslationError> {
        match array {
            ArrayOperand::Expression(expression) => self.render_expression(expression),
            ArrayOperand::Bind { source, element } => {
                self.push_parameter(source.clone(), JdbcMapping::array_of(element));
                Ok(())
            }
        }
    }
}
