//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features:
//! - ANSI identifier quoting (`"`)
//! - Native boolean type (true/false)
//! - Native arrays, `= ANY(?)` for array-bound IN lists
//! - Row value constructors everywhere
//! - FILTER clause for aggregates
//! - OFFSET / FETCH FIRST with ROWS ONLY and WITH TIES (no PERCENT)

use super::helpers;
use super::SqlDialect;
use crate::sql::ast::{FetchClauseType, Limit};
use crate::sql::error::TranslationError;
use crate::sql::render::SqlAstTranslator;
use crate::types::JdbcType;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn cast_type_name(&self, jdbc_type: &JdbcType) -> String {
        helpers::cast_type_name_postgres(jdbc_type)
    }

    fn supports_filter_clause(&self) -> bool {
        true
    }

    fn supports_in_list_array_binding(&self) -> bool {
        true
    }

    fn visit_offset_fetch_clause(
        &self,
        tr: &mut SqlAstTranslator<'_>,
        limit: Limit<'_>,
    ) -> Result<(), TranslationError> {
        if let Some(fetch) = limit.fetch {
            if matches!(
                fetch.kind,
                FetchClauseType::PercentOnly | FetchClauseType::PercentWithTies
            ) {
                return Err(TranslationError::InvalidFetchClause {
                    kind: fetch.kind,
                    dialect: self.name(),
                });
            }
        }
        tr.render_offset_fetch_clause(limit, true)
    }
}
