//! SQL translation module.
//!
//! This module turns a database-agnostic SQL AST into dialect-specific SQL
//! text plus ordered parameter binders. It includes:
//!
//! - [`ast`] - Query, expression and predicate nodes with a builder DSL
//! - [`render`] - The translator and its JDBC operation output
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations and override hooks
//! - [`error`] - Translation errors

pub mod ast;
pub mod dialect;
pub mod error;
pub mod render;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use error::TranslationError;
pub use render::{
    translate, ArrayOperand, BoundValue, CaseResultRendering, JdbcOperation, JdbcParameter,
    ParameterBindings, ParameterSource, RenderingMode, SqlAstTranslator, TranslationOptions,
};
pub use token::{Token, TokenStream};
