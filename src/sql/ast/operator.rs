//! Operators and clause kinds shared by the AST nodes.

use serde::{Deserialize, Serialize};

/// Binary arithmetic operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryArithmeticOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// Integer quotient.
    Quot,
    Modulo,
}

impl BinaryArithmeticOperator {
    pub fn sql_text(&self) -> &'static str {
        match self {
            BinaryArithmeticOperator::Add => "+",
            BinaryArithmeticOperator::Subtract => "-",
            BinaryArithmeticOperator::Multiply => "*",
            BinaryArithmeticOperator::Divide | BinaryArithmeticOperator::Quot => "/",
            BinaryArithmeticOperator::Modulo => "%",
        }
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonOperator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    DistinctFrom,
    NotDistinctFrom,
}

impl ComparisonOperator {
    pub fn sql_text(&self) -> &'static str {
        match self {
            ComparisonOperator::Equal => "=",
            ComparisonOperator::NotEqual => "<>",
            ComparisonOperator::LessThan => "<",
            ComparisonOperator::LessThanOrEqual => "<=",
            ComparisonOperator::GreaterThan => ">",
            ComparisonOperator::GreaterThanOrEqual => ">=",
            ComparisonOperator::DistinctFrom => "is distinct from",
            ComparisonOperator::NotDistinctFrom => "is not distinct from",
        }
    }

    /// Logical negation (`=` becomes `<>`, `<` becomes `>=`).
    pub fn negated(&self) -> ComparisonOperator {
        match self {
            ComparisonOperator::Equal => ComparisonOperator::NotEqual,
            ComparisonOperator::NotEqual => ComparisonOperator::Equal,
            ComparisonOperator::LessThan => ComparisonOperator::GreaterThanOrEqual,
            ComparisonOperator::LessThanOrEqual => ComparisonOperator::GreaterThan,
            ComparisonOperator::GreaterThan => ComparisonOperator::LessThanOrEqual,
            ComparisonOperator::GreaterThanOrEqual => ComparisonOperator::LessThan,
            ComparisonOperator::DistinctFrom => ComparisonOperator::NotDistinctFrom,
            ComparisonOperator::NotDistinctFrom => ComparisonOperator::DistinctFrom,
        }
    }

    /// Operator to use when the operands swap sides (`<` becomes `>`).
    pub fn inverted(&self) -> ComparisonOperator {
        match self {
            ComparisonOperator::LessThan => ComparisonOperator::GreaterThan,
            ComparisonOperator::LessThanOrEqual => ComparisonOperator::GreaterThanOrEqual,
            ComparisonOperator::GreaterThan => ComparisonOperator::LessThan,
            ComparisonOperator::GreaterThanOrEqual => ComparisonOperator::LessThanOrEqual,
            other => *other,
        }
    }

    /// Whether this is one of `<`, `<=`, `>`, `>=`.
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            ComparisonOperator::LessThan
                | ComparisonOperator::LessThanOrEqual
                | ComparisonOperator::GreaterThan
                | ComparisonOperator::GreaterThanOrEqual
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JunctionKind {
    Conjunction,
    Disjunction,
}

/// Grouping-set summarization (`ROLLUP`, `CUBE`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummarizationKind {
    Rollup,
    Cube,
}

impl SummarizationKind {
    pub fn sql_text(&self) -> &'static str {
        match self {
            SummarizationKind::Rollup => "rollup",
            SummarizationKind::Cube => "cube",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SetOperator {
    Union,
    UnionAll,
    Intersect,
    IntersectAll,
    Except,
    ExceptAll,
}

/// Row limiting flavour of a `FETCH` clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchClauseType {
    #[default]
    RowsOnly,
    RowsWithTies,
    PercentOnly,
    PercentWithTies,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NullPrecedence {
    First,
    Last,
}
