//! Translation errors.

use super::ast::FetchClauseType;
use crate::types::MarshalError;

/// Error type for SQL translation and parameter binding.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TranslationError {
    /// The AST uses a construct the target database cannot express.
    #[error("{construct} is not supported by {dialect}")]
    UnsupportedConstruct {
        construct: String,
        dialect: &'static str,
    },

    #[error("fetch clause type {kind:?} is not supported by {dialect}, only ROWS ONLY")]
    InvalidFetchClause {
        kind: FetchClauseType,
        dialect: &'static str,
    },

    /// The AST is malformed (arity mismatch, empty CASE, ...).
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    #[error("no value bound for parameter '{0}'")]
    MissingParameterBinding(String),

    #[error(transparent)]
    Marshal(#[from] MarshalError),
}

impl TranslationError {
    pub(crate) fn unsupported(construct: impl Into<String>, dialect: &'static str) -> Self {
        TranslationError::UnsupportedConstruct {
            construct: construct.into(),
            dialect,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_message() {
        let err = TranslationError::unsupported("Summarization", "hsql");
        assert_eq!(err.to_string(), "Summarization is not supported by hsql");
    }

    #[test]
    fn test_marshal_errors_convert() {
        let err: TranslationError = MarshalError::UnknownType("Integer".into()).into();
        assert_eq!(err.to_string(), "unknown type: Integer");
    }
}
