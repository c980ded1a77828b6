//! Basic (scalar) types: the unit the type registry hands out.

use std::sync::Arc;

use super::converter::ElementConverter;
use super::error::MarshalError;
use super::jdbc::{JdbcMapping, JdbcType};
use super::primitive::HostType;
use super::value::Value;
use crate::sql::dialect::Dialect;
use crate::sql::token::Token;

/// A named scalar type: driver descriptor, domain host representation and
/// an optional element converter.
#[derive(Debug, Clone)]
pub struct BasicType {
    name: String,
    jdbc_type: JdbcType,
    host_type: HostType,
    converter: Option<Arc<dyn ElementConverter>>,
}

impl BasicType {
    pub fn new(name: impl Into<String>, jdbc_type: JdbcType, host_type: HostType) -> Self {
        Self {
            name: name.into(),
            jdbc_type,
            host_type,
            converter: None,
        }
    }

    /// Attach a converter; the converter's domain type becomes this type's
    /// host representation.
    #[must_use]
    pub fn with_converter(mut self, converter: Arc<dyn ElementConverter>) -> Self {
        self.host_type = converter.domain_type().clone();
        self.converter = Some(converter);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn jdbc_type(&self) -> &JdbcType {
        &self.jdbc_type
    }

    pub fn host_type(&self) -> &HostType {
        &self.host_type
    }

    pub fn converter(&self) -> Option<&Arc<dyn ElementConverter>> {
        self.converter.as_ref()
    }

    pub fn jdbc_mapping(&self) -> JdbcMapping {
        JdbcMapping::new(self.name.clone(), self.jdbc_type.clone())
    }

    /// Relational form of a domain value, ready for binding.
    pub fn to_relational(&self, value: &Value) -> Result<Value, MarshalError> {
        match &self.converter {
            Some(converter) => converter.to_relational(value),
            None => Ok(value.clone()),
        }
    }

    /// Literal token for a domain value of this type.
    pub fn literal_token(&self, value: &Value) -> Result<Token, MarshalError> {
        literal_token(&self.to_relational(value)?)
    }

    /// Render a domain value of this type as an inline SQL literal.
    pub fn format_literal(&self, value: &Value, dialect: Dialect) -> Result<String, MarshalError> {
        Ok(self.literal_token(value)?.serialize(dialect))
    }
}

/// Literal token for a relational scalar.
pub fn literal_token(value: &Value) -> Result<Token, MarshalError> {
    match value {
        Value::Null => Ok(Token::LitNull),
        Value::Boolean(b) => Ok(Token::LitBool(*b)),
        Value::Byte(n) => Ok(Token::LitInt(i64::from(*n))),
        Value::Short(n) => Ok(Token::LitInt(i64::from(*n))),
        Value::Int(n) => Ok(Token::LitInt(i64::from(*n))),
        Value::Long(n) => Ok(Token::LitInt(*n)),
        Value::Float(f) => float_token(f64::from(*f), value),
        Value::Double(f) => float_token(*f, value),
        Value::Char(c) => Ok(Token::LitString(c.to_string())),
        Value::String(s) => Ok(Token::LitString(s.clone())),
        Value::Decimal(text) => {
            if is_decimal_literal(text) {
                Ok(Token::Raw(text.clone()))
            } else {
                Err(MarshalError::ConversionFailed {
                    type_name: value.type_name(),
                    reason: format!("'{}' is not a decimal literal", text),
                })
            }
        }
        Value::Enum { type_name, .. } => Err(MarshalError::ConversionFailed {
            type_name: type_name.clone(),
            reason: "enum literals need a converter".into(),
        }),
        plural => Err(MarshalError::mismatch("scalar", plural.type_name())),
    }
}

/// Whether `text` is a plain decimal number: an optional sign, digits with an
/// optional fraction, and an optional exponent that carries digits.
fn is_decimal_literal(text: &str) -> bool {
    fn digits(s: &str) -> usize {
        s.bytes().take_while(u8::is_ascii_digit).count()
    }

    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    let integral = digits(unsigned);
    let mut rest = &unsigned[integral..];
    let mut mantissa = integral;
    if let Some(after_point) = rest.strip_prefix('.') {
        let fraction = digits(after_point);
        mantissa += fraction;
        rest = &after_point[fraction..];
    }
    if mantissa == 0 {
        return false;
    }
    if let Some(after_e) = rest.strip_prefix(['e', 'E']) {
        let exponent = after_e.strip_prefix(['+', '-']).unwrap_or(after_e);
        let count = digits(exponent);
        return count > 0 && count == exponent.len();
    }
    rest.is_empty()
}

fn float_token(f: f64, value: &Value) -> Result<Token, MarshalError> {
    if f.is_finite() {
        Ok(Token::LitFloat(f))
    } else {
        Err(MarshalError::ConversionFailed {
            type_name: value.type_name(),
            reason: format!("{} has no SQL literal", f),
        })
    }
}
