//! Errors raised while marshalling host values to and from database types.

use super::jdbc::SqlTypeCode;

/// Error type for value marshalling.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MarshalError {
    /// The value is neither an array nor a collection.
    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("Unrecognized primitive type class: {0}")]
    UnrecognizedPrimitive(String),

    #[error("element type mismatch: expected {expected}, found {found}")]
    ElementMismatch { expected: String, found: String },

    #[error("value {value} does not fit into {target}")]
    OutOfRange { value: String, target: String },

    #[error("conversion failed for {type_name}: {reason}")]
    ConversionFailed { type_name: String, reason: String },

    #[error("unknown basic type: {0}")]
    UnknownBasicType(String),

    #[error("no JDBC type descriptor registered for {0}")]
    UnknownJdbcType(SqlTypeCode),
}

impl MarshalError {
    /// Whether this error reports a value whose shape does not match the
    /// declared array representation.
    pub fn is_structural_mismatch(&self) -> bool {
        matches!(
            self,
            MarshalError::UnknownType(_)
                | MarshalError::UnrecognizedPrimitive(_)
                | MarshalError::ElementMismatch { .. }
        )
    }

    pub(crate) fn mismatch(expected: impl ToString, found: impl ToString) -> Self {
        MarshalError::ElementMismatch {
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}
