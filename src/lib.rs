//! # Quill
//!
//! Dialect-aware SQL AST translation with array value marshalling.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 SQL AST (sql::ast)                       │
//! │  (expressions, predicates, query specs, CTEs, limits)    │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [SqlAstTranslator + SqlDialect hooks]
//! ┌─────────────────────────────────────────────────────────┐
//! │        JdbcOperation (SQL text + ordered parameters)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [bind_values + ArrayMarshaller]
//! ┌─────────────────────────────────────────────────────────┐
//! │         Bound values in the driver's representation      │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```
//! use quill::prelude::*;
//!
//! let statement: Statement = QuerySpec::new()
//!     .select(vec![col("id")])
//!     .from(TableReference::new("person"))
//!     .filter(col("id").in_list(vec![lit_int(1), lit_int(2)]))
//!     .into();
//!
//! let op = translate(&statement, Dialect::Postgres).unwrap();
//! assert_eq!(op.sql, r#"SELECT "id" FROM "person" WHERE "id" = ANY(?)"#);
//! assert_eq!(op.parameters.len(), 1);
//! ```

pub mod config;
pub mod sql;
pub mod types;

// Re-export SQL submodules at crate level
pub use sql::ast;
pub use sql::dialect;
pub use sql::token;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::ast::{
        // Constructors
        and,
        arith,
        boolean,
        col,
        count_star,
        func,
        list_param,
        lit,
        lit_bool,
        lit_double,
        lit_int,
        lit_long,
        lit_str,
        not_boolean,
        or,
        param,
        subquery,
        table_col,
        tuple,
        tuple_compare,
        // Types
        BinaryArithmeticOperator,
        ComparisonOperator,
        Cte,
        CteSearchPath,
        Expression,
        ExpressionExt,
        FetchClauseType,
        Predicate,
        QueryGroup,
        QueryPart,
        QuerySpec,
        SelectItem,
        SortSpecification,
        Statement,
        TableReference,
    };
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::sql::{
        translate, JdbcOperation, ParameterBindings, SqlAstTranslator, TranslationError,
        TranslationOptions,
    };
    pub use crate::types::{
        ArrayMarshaller, BasicTypeRegistry, JdbcMapping, PrimitiveArray, Value, WrapperOptions,
    };
}

// Also export at crate root for convenience
pub use dialect::Dialect;
pub use sql::{translate, JdbcOperation, SqlAstTranslator, TranslationError};
pub use types::{ArrayMarshaller, BasicTypeRegistry, MarshalError, Value};
