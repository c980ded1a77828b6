//! ANSI SQL dialect.
//!
//! Pure ANSI SQL. Every rendering hook keeps its generic behaviour, which
//! makes this the baseline the other dialects are compared against.

use super::helpers;
use super::SqlDialect;

/// ANSI SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Ansi;

impl SqlDialect for Ansi {
    fn name(&self) -> &'static str {
        "ansi"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn supports_filter_clause(&self) -> bool {
        true
    }
}
