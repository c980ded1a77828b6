//! Predicate nodes.

use serde::{Deserialize, Serialize};

use super::expr::Expression;
use super::operator::{ComparisonOperator, JunctionKind};
use super::query::QueryPart;

/// A boolean-valued condition.
///
/// `negated` flags only change how a node is rendered; no node is rewritten
/// to apply them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// A boolean-typed expression used as a predicate.
    BooleanExpression {
        expression: Expression,
        #[serde(default)]
        negated: bool,
    },

    Comparison {
        lhs: Expression,
        op: ComparisonOperator,
        rhs: Expression,
    },

    /// `test IN (list...)`
    InList {
        test: Expression,
        list: Vec<Expression>,
        #[serde(default)]
        negated: bool,
    },

    /// Membership in an array-valued expression. A missing array stands for
    /// an empty list.
    InListArray {
        test: Expression,
        #[serde(default)]
        array: Option<Box<Expression>>,
        #[serde(default)]
        negated: bool,
    },

    /// `(a, b) <op> (SELECT x, y ...)`
    TupleSubqueryComparison {
        tuple: Vec<Expression>,
        op: ComparisonOperator,
        subquery: Box<QueryPart>,
    },

    NullCheck {
        expression: Expression,
        #[serde(default)]
        negated: bool,
    },

    Junction {
        kind: JunctionKind,
        predicates: Vec<Predicate>,
    },

    Negated(Box<Predicate>),
}

impl Predicate {
    /// Wrap in a logical NOT.
    #[must_use]
    pub fn negate(self) -> Predicate {
        Predicate::Negated(Box::new(self))
    }

    /// Visit every subquery directly nested in this predicate.
    pub fn for_each_subquery<'a>(&'a self, f: &mut dyn FnMut(&'a QueryPart)) {
        match self {
            Predicate::BooleanExpression { expression, .. }
            | Predicate::NullCheck { expression, .. } => expression.for_each_subquery(f),
            Predicate::Comparison { lhs, rhs, .. } => {
                lhs.for_each_subquery(f);
                rhs.for_each_subquery(f);
            }
            Predicate::InList { test, list, .. } => {
                test.for_each_subquery(f);
                for item in list {
                    item.for_each_subquery(f);
                }
            }
            Predicate::InListArray { test, array, .. } => {
                test.for_each_subquery(f);
                if let Some(array) = array {
                    array.for_each_subquery(f);
                }
            }
            Predicate::TupleSubqueryComparison { tuple, subquery, .. } => {
                for item in tuple {
                    item.for_each_subquery(f);
                }
                f(&**subquery);
            }
            Predicate::Junction { predicates, .. } => {
                for predicate in predicates {
                    predicate.for_each_subquery(f);
                }
            }
            Predicate::Negated(inner) => inner.for_each_subquery(f),
        }
    }
}

/// Boolean expression used as a predicate.
pub fn boolean(expression: Expression) -> Predicate {
    Predicate::BooleanExpression {
        expression,
        negated: false,
    }
}

/// Negated boolean expression used as a predicate.
pub fn not_boolean(expression: Expression) -> Predicate {
    Predicate::BooleanExpression {
        expression,
        negated: true,
    }
}

pub fn and(predicates: Vec<Predicate>) -> Predicate {
    Predicate::Junction {
        kind: JunctionKind::Conjunction,
        predicates,
    }
}

pub fn or(predicates: Vec<Predicate>) -> Predicate {
    Predicate::Junction {
        kind: JunctionKind::Disjunction,
        predicates,
    }
}

/// `(tuple...) <op> (subquery)`
pub fn tuple_compare(
    tuple: Vec<Expression>,
    op: ComparisonOperator,
    subquery: impl Into<QueryPart>,
) -> Predicate {
    Predicate::TupleSubqueryComparison {
        tuple,
        op,
        subquery: Box::new(subquery.into()),
    }
}
