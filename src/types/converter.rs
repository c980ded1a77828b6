//! Per-element value converters.
//!
//! A converter maps a single element between its domain form (what the
//! application holds) and its relational form (what the driver binds). It
//! knows nothing about arrays; the array marshaller applies it element by
//! element.

use std::fmt;

use super::error::MarshalError;
use super::primitive::{HostType, PrimitiveKind};
use super::value::Value;

/// Bidirectional domain <-> relational element conversion.
pub trait ElementConverter: fmt::Debug + Send + Sync {
    /// Host representation of domain values.
    fn domain_type(&self) -> &HostType;

    /// Host representation of relational values.
    fn relational_type(&self) -> &HostType;

    fn to_relational(&self, value: &Value) -> Result<Value, MarshalError>;

    fn to_domain(&self, value: &Value) -> Result<Value, MarshalError>;
}

/// Stores an enumeration as a short text code.
#[derive(Debug, Clone)]
pub struct EnumCodeConverter {
    domain: HostType,
    relational: HostType,
    /// `(variant, code)` pairs.
    codes: Vec<(String, String)>,
}

impl EnumCodeConverter {
    pub fn new<V, C>(type_name: impl Into<String>, codes: impl IntoIterator<Item = (V, C)>) -> Self
    where
        V: Into<String>,
        C: Into<String>,
    {
        Self {
            domain: HostType::Enum(type_name.into()),
            relational: HostType::String,
            codes: codes
                .into_iter()
                .map(|(variant, code)| (variant.into(), code.into()))
                .collect(),
        }
    }

    fn type_name(&self) -> String {
        self.domain.to_string()
    }
}

impl ElementConverter for EnumCodeConverter {
    fn domain_type(&self) -> &HostType {
        &self.domain
    }

    fn relational_type(&self) -> &HostType {
        &self.relational
    }

    fn to_relational(&self, value: &Value) -> Result<Value, MarshalError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Enum { type_name, variant } if self.domain == HostType::Enum(type_name.clone()) => self
                .codes
                .iter()
                .find(|(v, _)| v == variant)
                .map(|(_, code)| Value::String(code.clone()))
                .ok_or_else(|| MarshalError::ConversionFailed {
                    type_name: self.type_name(),
                    reason: format!("no code for variant {}", variant),
                }),
            other => Err(MarshalError::mismatch(&self.domain, other.type_name())),
        }
    }

    fn to_domain(&self, value: &Value) -> Result<Value, MarshalError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::String(code) => self
                .codes
                .iter()
                .find(|(_, c)| c == code)
                .map(|(variant, _)| Value::Enum {
                    type_name: self.type_name(),
                    variant: variant.clone(),
                })
                .ok_or_else(|| MarshalError::ConversionFailed {
                    type_name: self.type_name(),
                    reason: format!("unknown code '{}'", code),
                }),
            other => Err(MarshalError::mismatch(&self.relational, other.type_name())),
        }
    }
}

/// Stores an enumeration as its declaration ordinal.
#[derive(Debug, Clone)]
pub struct EnumOrdinalConverter {
    domain: HostType,
    relational: HostType,
    variants: Vec<String>,
}

impl EnumOrdinalConverter {
    pub fn new<V: Into<String>>(
        type_name: impl Into<String>,
        variants: impl IntoIterator<Item = V>,
    ) -> Self {
        Self {
            domain: HostType::Enum(type_name.into()),
            relational: HostType::Boxed(PrimitiveKind::Int),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }
}

impl ElementConverter for EnumOrdinalConverter {
    fn domain_type(&self) -> &HostType {
        &self.domain
    }

    fn relational_type(&self) -> &HostType {
        &self.relational
    }

    fn to_relational(&self, value: &Value) -> Result<Value, MarshalError> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Enum { type_name, variant } if self.domain == HostType::Enum(type_name.clone()) => {
                let ordinal = self
                    .variants
                    .iter()
                    .position(|v| v == variant)
                    .ok_or_else(|| MarshalError::ConversionFailed {
                        type_name: type_name.clone(),
                        reason: format!("unknown variant {}", variant),
                    })?;
                i32::try_from(ordinal)
                    .map(Value::Int)
                    .map_err(|_| MarshalError::OutOfRange {
                        value: ordinal.to_string(),
                        target: self.relational.to_string(),
                    })
            }
            other => Err(MarshalError::mismatch(&self.domain, other.type_name())),
        }
    }

    fn to_domain(&self, value: &Value) -> Result<Value, MarshalError> {
        if value.is_null() {
            return Ok(Value::Null);
        }
        let ordinal = match value.clone().coerce_to(&self.relational)? {
            Value::Int(n) => usize::try_from(n).ok(),
            _ => None,
        };
        ordinal
            .and_then(|n| self.variants.get(n))
            .map(|variant| Value::Enum {
                type_name: self.domain.to_string(),
                variant: variant.clone(),
            })
            .ok_or_else(|| MarshalError::ConversionFailed {
                type_name: self.domain.to_string(),
                reason: format!("no variant at ordinal {:?}", value),
            })
    }
}
