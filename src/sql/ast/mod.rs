//! Database-agnostic SQL AST.
//!
//! The tree is built once (by hand, through the helper functions, or
//! deserialized from JSON) and then only read by the translator.

pub mod expr;
pub mod operator;
pub mod predicate;
pub mod query;

pub use expr::{
    arith, col, count_star, cube, func, list_param, lit, lit_bool, lit_double, lit_int, lit_long,
    lit_str, param, rollup, subquery, table_col, tuple, Aggregate, CaseSearched, CaseSimple,
    Expression, ExpressionExt, Over, SearchedWhen, SimpleWhen,
};
pub use operator::{
    BinaryArithmeticOperator, ComparisonOperator, FetchClauseType, JunctionKind, NullPrecedence,
    SetOperator, SortDirection, SummarizationKind,
};
pub use predicate::{and, boolean, not_boolean, or, tuple_compare, Predicate};
pub use query::{
    Cte, CteSearchPath, FetchClause, Limit, QueryGroup, QueryPart, QuerySpec, SelectItem,
    SortSpecification, Statement, TableReference,
};
