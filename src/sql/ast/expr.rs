//! Expression nodes.
//!
//! Expressions are immutable once built; the translator only reads them.
//! Every typed node carries a [`JdbcMapping`] so dialect rules can inspect
//! the resolved database type without a separate type-checking pass.

use serde::{Deserialize, Serialize};

use super::operator::{BinaryArithmeticOperator, ComparisonOperator, SummarizationKind};
use super::predicate::Predicate;
use super::query::{QueryPart, SelectItem, SortSpecification};
use crate::types::{JdbcMapping, Value};

// =============================================================================
// Expression AST
// =============================================================================

/// A SQL expression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// Column reference: optional_qualifier.name
    Column {
        #[serde(default)]
        qualifier: Option<String>,
        name: String,
        #[serde(default)]
        mapping: Option<JdbcMapping>,
    },

    Literal { value: Value, mapping: JdbcMapping },

    /// Bind parameter. A multi-valued parameter stands for a whole list
    /// when it is the only element of an IN list.
    Parameter {
        name: String,
        mapping: JdbcMapping,
        #[serde(default)]
        multi_valued: bool,
    },

    BinaryArithmetic {
        op: BinaryArithmeticOperator,
        lhs: Box<Expression>,
        rhs: Box<Expression>,
    },

    CaseSearched(CaseSearched),

    CaseSimple(CaseSimple),

    /// Row value: (a, b, ...)
    Tuple(Vec<Expression>),

    /// Grouping-set summarization: rollup(...) / cube(...)
    Summarization {
        kind: SummarizationKind,
        groupings: Vec<Expression>,
    },

    /// Scalar function call: name(args...)
    Function {
        name: String,
        #[serde(default)]
        args: Vec<Expression>,
        #[serde(default)]
        mapping: Option<JdbcMapping>,
    },

    Aggregate(Aggregate),

    Over(Over),

    /// Scalar or row subquery.
    Subquery(Box<QueryPart>),
}

/// `CASE WHEN <predicate> THEN <result> ... [ELSE <result>] END`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct CaseSearched {
    pub when: Vec<SearchedWhen>,
    #[serde(default)]
    pub otherwise: Option<Box<Expression>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchedWhen {
    pub predicate: Predicate,
    pub result: Expression,
}

/// `CASE <subject> WHEN <value> THEN <result> ... [ELSE <result>] END`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct CaseSimple {
    pub subject: Box<Expression>,
    pub when: Vec<SimpleWhen>,
    #[serde(default)]
    pub otherwise: Option<Box<Expression>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleWhen {
    pub value: Expression,
    pub result: Expression,
}

/// Aggregate function call with optional `DISTINCT` and `FILTER`.
///
/// An empty argument list renders as `*`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct Aggregate {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Expression>,
    #[serde(default)]
    pub distinct: bool,
    #[serde(default)]
    pub filter: Option<Box<Predicate>>,
    #[serde(default)]
    pub mapping: Option<JdbcMapping>,
}

/// Window function: `<function> OVER (PARTITION BY ... ORDER BY ...)`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[must_use = "builders have no effect until used"]
pub struct Over {
    pub function: Box<Expression>,
    #[serde(default)]
    pub partitions: Vec<Expression>,
    #[serde(default)]
    pub order: Vec<SortSpecification>,
}

impl Expression {
    /// Resolved type of this expression, if it has one.
    pub fn expression_type(&self) -> Option<&JdbcMapping> {
        match self {
            Expression::Column { mapping, .. } => mapping.as_ref(),
            Expression::Literal { mapping, .. } => Some(mapping),
            Expression::Parameter { mapping, .. } => Some(mapping),
            Expression::BinaryArithmetic { lhs, rhs, .. } => {
                lhs.expression_type().or_else(|| rhs.expression_type())
            }
            Expression::CaseSearched(case) => case
                .results()
                .find_map(Expression::expression_type),
            Expression::CaseSimple(case) => case
                .results()
                .find_map(Expression::expression_type),
            Expression::Tuple(_) | Expression::Summarization { .. } => None,
            Expression::Function { mapping, .. } => mapping.as_ref(),
            Expression::Aggregate(aggregate) => aggregate.mapping.as_ref(),
            Expression::Over(over) => over.function.expression_type(),
            Expression::Subquery(query) => query
                .first_spec()
                .and_then(|spec| spec.select.first())
                .and_then(|item| item.expression.expression_type()),
        }
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, Expression::Parameter { .. })
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Expression::Literal { .. })
    }

    /// Attach a resolved type to a column, function or aggregate.
    #[must_use]
    pub fn with_mapping(mut self, resolved: JdbcMapping) -> Self {
        match &mut self {
            Expression::Column { mapping, .. } | Expression::Function { mapping, .. } => {
                *mapping = Some(resolved)
            }
            Expression::Aggregate(aggregate) => aggregate.mapping = Some(resolved),
            _ => {}
        }
        self
    }

    /// Visit every subquery directly nested in this expression.
    ///
    /// Subqueries are not descended into; callers recurse as needed.
    pub fn for_each_subquery<'a>(&'a self, f: &mut dyn FnMut(&'a QueryPart)) {
        match self {
            Expression::Column { .. } | Expression::Literal { .. } | Expression::Parameter { .. } => {}
            Expression::BinaryArithmetic { lhs, rhs, .. } => {
                lhs.for_each_subquery(f);
                rhs.for_each_subquery(f);
            }
            Expression::CaseSearched(case) => {
                for when in &case.when {
                    when.predicate.for_each_subquery(f);
                    when.result.for_each_subquery(f);
                }
                if let Some(otherwise) = &case.otherwise {
                    otherwise.for_each_subquery(f);
                }
            }
            Expression::CaseSimple(case) => {
                case.subject.for_each_subquery(f);
                for when in &case.when {
                    when.value.for_each_subquery(f);
                    when.result.for_each_subquery(f);
                }
                if let Some(otherwise) = &case.otherwise {
                    otherwise.for_each_subquery(f);
                }
            }
            Expression::Tuple(items)
            | Expression::Summarization {
                groupings: items, ..
            }
            | Expression::Function { args: items, .. } => {
                for item in items {
                    item.for_each_subquery(f);
                }
            }
            Expression::Aggregate(aggregate) => {
                for arg in &aggregate.args {
                    arg.for_each_subquery(f);
                }
                if let Some(filter) = &aggregate.filter {
                    filter.for_each_subquery(f);
                }
            }
            Expression::Over(over) => {
                over.function.for_each_subquery(f);
                for partition in &over.partitions {
                    partition.for_each_subquery(f);
                }
                for sort in &over.order {
                    sort.expression.for_each_subquery(f);
                }
            }
            Expression::Subquery(query) => f(&**query),
        }
    }
}

impl CaseSearched {
    pub fn new() -> Self {
        Self {
            when: vec![],
            otherwise: None,
        }
    }

    pub fn when(mut self, predicate: Predicate, result: impl Into<Expression>) -> Self {
        self.when.push(SearchedWhen {
            predicate,
            result: result.into(),
        });
        self
    }

    pub fn otherwise(mut self, result: impl Into<Expression>) -> Self {
        self.otherwise = Some(Box::new(result.into()));
        self
    }

    /// Result expressions of the WHEN arms, in order (ELSE excluded).
    pub fn results(&self) -> impl Iterator<Item = &Expression> {
        self.when.iter().map(|w| &w.result)
    }
}

impl Default for CaseSearched {
    fn default() -> Self {
        Self::new()
    }
}

impl CaseSimple {
    pub fn new(subject: impl Into<Expression>) -> Self {
        Self {
            subject: Box::new(subject.into()),
            when: vec![],
            otherwise: None,
        }
    }

    pub fn when(mut self, value: impl Into<Expression>, result: impl Into<Expression>) -> Self {
        self.when.push(SimpleWhen {
            value: value.into(),
            result: result.into(),
        });
        self
    }

    pub fn otherwise(mut self, result: impl Into<Expression>) -> Self {
        self.otherwise = Some(Box::new(result.into()));
        self
    }

    /// Result expressions of the WHEN arms, in order (ELSE excluded).
    pub fn results(&self) -> impl Iterator<Item = &Expression> {
        self.when.iter().map(|w| &w.result)
    }
}

impl Aggregate {
    pub fn new(name: &str, args: Vec<Expression>) -> Self {
        Self {
            name: name.into(),
            args,
            distinct: false,
            filter: None,
            mapping: None,
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filter = Some(Box::new(predicate));
        self
    }

    pub fn with_mapping(mut self, mapping: JdbcMapping) -> Self {
        self.mapping = Some(mapping);
        self
    }
}

impl Over {
    pub fn new(function: impl Into<Expression>) -> Self {
        Self {
            function: Box::new(function.into()),
            partitions: vec![],
            order: vec![],
        }
    }

    pub fn partition_by(mut self, partitions: Vec<Expression>) -> Self {
        self.partitions = partitions;
        self
    }

    pub fn order_by(mut self, order: Vec<SortSpecification>) -> Self {
        self.order = order;
        self
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Untyped column reference.
pub fn col(name: &str) -> Expression {
    Expression::Column {
        qualifier: None,
        name: name.into(),
        mapping: None,
    }
}

/// Qualified, untyped column reference.
pub fn table_col(qualifier: &str, name: &str) -> Expression {
    Expression::Column {
        qualifier: Some(qualifier.into()),
        name: name.into(),
        mapping: None,
    }
}

pub fn lit(value: Value, mapping: JdbcMapping) -> Expression {
    Expression::Literal { value, mapping }
}

pub fn lit_int(n: i32) -> Expression {
    lit(Value::Int(n), JdbcMapping::integer())
}

pub fn lit_long(n: i64) -> Expression {
    lit(Value::Long(n), JdbcMapping::long())
}

pub fn lit_double(f: f64) -> Expression {
    lit(Value::Double(f), JdbcMapping::double())
}

pub fn lit_str(s: &str) -> Expression {
    lit(Value::String(s.into()), JdbcMapping::string())
}

pub fn lit_bool(b: bool) -> Expression {
    lit(Value::Boolean(b), JdbcMapping::boolean())
}

pub fn param(name: &str, mapping: JdbcMapping) -> Expression {
    Expression::Parameter {
        name: name.into(),
        mapping,
        multi_valued: false,
    }
}

/// Parameter bound to a list of values of `element` type.
pub fn list_param(name: &str, element: JdbcMapping) -> Expression {
    Expression::Parameter {
        name: name.into(),
        mapping: element,
        multi_valued: true,
    }
}

pub fn tuple(items: Vec<Expression>) -> Expression {
    Expression::Tuple(items)
}

pub fn func(name: &str, args: Vec<Expression>) -> Expression {
    Expression::Function {
        name: name.into(),
        args,
        mapping: None,
    }
}

pub fn count_star() -> Aggregate {
    Aggregate::new("count", vec![])
}

pub fn rollup(groupings: Vec<Expression>) -> Expression {
    Expression::Summarization {
        kind: SummarizationKind::Rollup,
        groupings,
    }
}

pub fn cube(groupings: Vec<Expression>) -> Expression {
    Expression::Summarization {
        kind: SummarizationKind::Cube,
        groupings,
    }
}

pub fn arith(op: BinaryArithmeticOperator, lhs: Expression, rhs: Expression) -> Expression {
    Expression::BinaryArithmetic {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    }
}

pub fn subquery(query: impl Into<QueryPart>) -> Expression {
    Expression::Subquery(Box::new(query.into()))
}

// =============================================================================
// Expression Builder Trait
// =============================================================================

/// Extension trait for building predicates and arithmetic fluently.
pub trait ExpressionExt: Sized {
    fn into_expression(self) -> Expression;

    fn compare(self, op: ComparisonOperator, other: impl Into<Expression>) -> Predicate {
        Predicate::Comparison {
            lhs: self.into_expression(),
            op,
            rhs: other.into(),
        }
    }

    fn eq(self, other: impl Into<Expression>) -> Predicate {
        self.compare(ComparisonOperator::Equal, other)
    }

    fn ne(self, other: impl Into<Expression>) -> Predicate {
        self.compare(ComparisonOperator::NotEqual, other)
    }

    fn lt(self, other: impl Into<Expression>) -> Predicate {
        self.compare(ComparisonOperator::LessThan, other)
    }

    fn lte(self, other: impl Into<Expression>) -> Predicate {
        self.compare(ComparisonOperator::LessThanOrEqual, other)
    }

    fn gt(self, other: impl Into<Expression>) -> Predicate {
        self.compare(ComparisonOperator::GreaterThan, other)
    }

    fn gte(self, other: impl Into<Expression>) -> Predicate {
        self.compare(ComparisonOperator::GreaterThanOrEqual, other)
    }

    fn distinct_from(self, other: impl Into<Expression>) -> Predicate {
        self.compare(ComparisonOperator::DistinctFrom, other)
    }

    fn not_distinct_from(self, other: impl Into<Expression>) -> Predicate {
        self.compare(ComparisonOperator::NotDistinctFrom, other)
    }

    fn in_list(self, list: Vec<Expression>) -> Predicate {
        Predicate::InList {
            test: self.into_expression(),
            list,
            negated: false,
        }
    }

    fn not_in_list(self, list: Vec<Expression>) -> Predicate {
        Predicate::InList {
            test: self.into_expression(),
            list,
            negated: true,
        }
    }

    /// Membership in an array-valued expression.
    fn in_array(self, array: impl Into<Expression>) -> Predicate {
        Predicate::InListArray {
            test: self.into_expression(),
            array: Some(Box::new(array.into())),
            negated: false,
        }
    }

    #[allow(clippy::wrong_self_convention)]
    fn is_null(self) -> Predicate {
        Predicate::NullCheck {
            expression: self.into_expression(),
            negated: false,
        }
    }

    #[allow(clippy::wrong_self_convention)]
    fn is_not_null(self) -> Predicate {
        Predicate::NullCheck {
            expression: self.into_expression(),
            negated: true,
        }
    }

    fn add(self, other: impl Into<Expression>) -> Expression {
        arith(BinaryArithmeticOperator::Add, self.into_expression(), other.into())
    }

    fn sub(self, other: impl Into<Expression>) -> Expression {
        arith(BinaryArithmeticOperator::Subtract, self.into_expression(), other.into())
    }

    fn mul(self, other: impl Into<Expression>) -> Expression {
        arith(BinaryArithmeticOperator::Multiply, self.into_expression(), other.into())
    }

    fn div(self, other: impl Into<Expression>) -> Expression {
        arith(BinaryArithmeticOperator::Divide, self.into_expression(), other.into())
    }

    fn modulo(self, other: impl Into<Expression>) -> Expression {
        arith(BinaryArithmeticOperator::Modulo, self.into_expression(), other.into())
    }

    /// Alias this expression (for SELECT list).
    fn alias(self, name: &str) -> SelectItem {
        SelectItem::new(self.into_expression()).with_alias(name)
    }
}

impl ExpressionExt for Expression {
    fn into_expression(self) -> Expression {
        self
    }
}

// =============================================================================
// Conversions
// =============================================================================

impl From<i32> for Expression {
    fn from(n: i32) -> Self {
        lit_int(n)
    }
}

impl From<i64> for Expression {
    fn from(n: i64) -> Self {
        lit_long(n)
    }
}

impl From<f64> for Expression {
    fn from(f: f64) -> Self {
        lit_double(f)
    }
}

impl From<&str> for Expression {
    fn from(s: &str) -> Self {
        lit_str(s)
    }
}

impl From<bool> for Expression {
    fn from(b: bool) -> Self {
        lit_bool(b)
    }
}

impl From<CaseSearched> for Expression {
    fn from(case: CaseSearched) -> Self {
        Expression::CaseSearched(case)
    }
}

impl From<CaseSimple> for Expression {
    fn from(case: CaseSimple) -> Self {
        Expression::CaseSimple(case)
    }
}

impl From<Aggregate> for Expression {
    fn from(aggregate: Aggregate) -> Self {
        Expression::Aggregate(aggregate)
    }
}

impl From<Over> for Expression {
    fn from(over: Over) -> Self {
        Expression::Over(over)
    }
}
