//! Database-side type descriptors.
//!
//! A `JdbcType` describes how a value travels over the driver: its SQL type
//! code, an optional element descriptor for array-capable types and an
//! optional length. `JdbcMapping` pairs it with the name of the basic type
//! that owns the host-side conversion.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use super::error::MarshalError;
use super::primitive::{HostType, PrimitiveKind};

/// SQL type codes understood by the marshalling layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SqlTypeCode {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Numeric,
    Char,
    Varchar,
    Date,
    Timestamp,
    Array,
    Other,
}

impl SqlTypeCode {
    pub fn name(&self) -> &'static str {
        match self {
            SqlTypeCode::Boolean => "BOOLEAN",
            SqlTypeCode::TinyInt => "TINYINT",
            SqlTypeCode::SmallInt => "SMALLINT",
            SqlTypeCode::Integer => "INTEGER",
            SqlTypeCode::BigInt => "BIGINT",
            SqlTypeCode::Real => "REAL",
            SqlTypeCode::Double => "DOUBLE",
            SqlTypeCode::Numeric => "NUMERIC",
            SqlTypeCode::Char => "CHAR",
            SqlTypeCode::Varchar => "VARCHAR",
            SqlTypeCode::Date => "DATE",
            SqlTypeCode::Timestamp => "TIMESTAMP",
            SqlTypeCode::Array => "ARRAY",
            SqlTypeCode::Other => "OTHER",
        }
    }
}

impl fmt::Display for SqlTypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SqlTypeCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "boolean" | "bool" => Ok(SqlTypeCode::Boolean),
            "tinyint" => Ok(SqlTypeCode::TinyInt),
            "smallint" => Ok(SqlTypeCode::SmallInt),
            "integer" | "int" => Ok(SqlTypeCode::Integer),
            "bigint" => Ok(SqlTypeCode::BigInt),
            "real" => Ok(SqlTypeCode::Real),
            "double" => Ok(SqlTypeCode::Double),
            "numeric" | "decimal" => Ok(SqlTypeCode::Numeric),
            "char" => Ok(SqlTypeCode::Char),
            "varchar" => Ok(SqlTypeCode::Varchar),
            "date" => Ok(SqlTypeCode::Date),
            "timestamp" => Ok(SqlTypeCode::Timestamp),
            "array" => Ok(SqlTypeCode::Array),
            "other" => Ok(SqlTypeCode::Other),
            _ => Err(format!("Unknown SQL type code: {}", s)),
        }
    }
}

/// Driver-level type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JdbcType {
    pub code: SqlTypeCode,
    /// Element descriptor; present for every array-capable type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub element: Option<Box<JdbcType>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

impl JdbcType {
    pub fn new(code: SqlTypeCode) -> Self {
        Self {
            code,
            element: None,
            length: None,
        }
    }

    /// Native `ARRAY` of the given element type.
    pub fn array(element: JdbcType) -> Self {
        Self {
            code: SqlTypeCode::Array,
            element: Some(Box::new(element)),
            length: None,
        }
    }

    #[must_use]
    pub fn with_length(mut self, length: u32) -> Self {
        self.length = Some(length);
        self
    }

    /// Whether the type code is `ARRAY`.
    pub fn is_array_code(&self) -> bool {
        self.code == SqlTypeCode::Array
    }

    /// Whether values of this type are bound as arrays, regardless of the
    /// reported type code.
    pub fn is_array_capable(&self) -> bool {
        self.element.is_some()
    }

    pub fn element_type(&self) -> Option<&JdbcType> {
        self.element.as_deref()
    }
}

/// Resolved type of an expression: the basic type name plus its descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JdbcMapping {
    pub type_name: String,
    pub jdbc_type: JdbcType,
}

impl JdbcMapping {
    pub fn new(type_name: impl Into<String>, jdbc_type: JdbcType) -> Self {
        Self {
            type_name: type_name.into(),
            jdbc_type,
        }
    }

    pub fn basic(type_name: impl Into<String>, code: SqlTypeCode) -> Self {
        Self::new(type_name, JdbcType::new(code))
    }

    pub fn boolean() -> Self {
        Self::basic("boolean", SqlTypeCode::Boolean)
    }

    pub fn short() -> Self {
        Self::basic("short", SqlTypeCode::SmallInt)
    }

    pub fn integer() -> Self {
        Self::basic("integer", SqlTypeCode::Integer)
    }

    pub fn long() -> Self {
        Self::basic("long", SqlTypeCode::BigInt)
    }

    pub fn double() -> Self {
        Self::basic("double", SqlTypeCode::Double)
    }

    pub fn string() -> Self {
        Self::basic("string", SqlTypeCode::Varchar)
    }

    /// Array mapping whose elements use `element`.
    pub fn array_of(element: &JdbcMapping) -> Self {
        Self::new(
            format!("{}[]", element.type_name),
            JdbcType::array(element.jdbc_type.clone()),
        )
    }

    /// Element basic type name of an array mapping.
    pub fn element_type_name(&self) -> Option<&str> {
        self.type_name.strip_suffix("[]")
    }
}

/// Connection-scoped driver preferences.
///
/// Drivers may ask for a particular host representation of array elements
/// (for example `Integer` elements for a `SMALLINT` column). Anything not
/// listed falls back to the registry's recommendation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WrapperOptions {
    preferred_array_elements: HashMap<SqlTypeCode, HostType>,
}

impl WrapperOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn prefer(mut self, code: SqlTypeCode, host_type: HostType) -> Self {
        self.preferred_array_elements.insert(code, host_type);
        self
    }

    pub fn preferred_host_type(&self, code: SqlTypeCode) -> Option<&HostType> {
        self.preferred_array_elements.get(&code)
    }
}

/// Recommended host representation per SQL type code.
#[derive(Debug, Clone)]
pub struct JdbcTypeRegistry {
    recommended: HashMap<SqlTypeCode, HostType>,
}

impl Default for JdbcTypeRegistry {
    fn default() -> Self {
        let mut recommended = HashMap::new();
        recommended.insert(SqlTypeCode::Boolean, HostType::Boxed(PrimitiveKind::Boolean));
        recommended.insert(SqlTypeCode::TinyInt, HostType::Boxed(PrimitiveKind::Byte));
        recommended.insert(SqlTypeCode::SmallInt, HostType::Boxed(PrimitiveKind::Short));
        recommended.insert(SqlTypeCode::Integer, HostType::Boxed(PrimitiveKind::Int));
        recommended.insert(SqlTypeCode::BigInt, HostType::Boxed(PrimitiveKind::Long));
        recommended.insert(SqlTypeCode::Real, HostType::Boxed(PrimitiveKind::Float));
        recommended.insert(SqlTypeCode::Double, HostType::Boxed(PrimitiveKind::Double));
        recommended.insert(SqlTypeCode::Numeric, HostType::Decimal);
        recommended.insert(SqlTypeCode::Char, HostType::String);
        recommended.insert(SqlTypeCode::Varchar, HostType::String);
        recommended.insert(SqlTypeCode::Date, HostType::String);
        recommended.insert(SqlTypeCode::Timestamp, HostType::String);
        Self { recommended }
    }
}

impl JdbcTypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the recommended host representation for a type code.
    pub fn register(&mut self, code: SqlTypeCode, host_type: HostType) {
        self.recommended.insert(code, host_type);
    }

    pub fn recommended_host_type(&self, code: SqlTypeCode) -> Option<&HostType> {
        self.recommended.get(&code)
    }

    /// Host representation array elements of `code` are bound with: the
    /// driver's preference when it states one, otherwise the recommendation.
    pub fn element_host_type(
        &self,
        code: SqlTypeCode,
        options: &WrapperOptions,
    ) -> Result<HostType, MarshalError> {
        options
            .preferred_host_type(code)
            .or_else(|| self.recommended_host_type(code))
            .cloned()
            .ok_or(MarshalError::UnknownJdbcType(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_array_mapping() {
        let ints = JdbcMapping::array_of(&JdbcMapping::integer());
        assert_eq!(ints.type_name, "integer[]");
        assert_eq!(ints.element_type_name(), Some("integer"));
        assert!(ints.jdbc_type.is_array_code());
        assert!(ints.jdbc_type.is_array_capable());
        assert_eq!(
            ints.jdbc_type.element_type().map(|e| e.code),
            Some(SqlTypeCode::Integer)
        );
    }

    #[test]
    fn test_array_capable_without_array_code() {
        let jdbc = JdbcType {
            code: SqlTypeCode::Other,
            element: Some(Box::new(JdbcType::new(SqlTypeCode::Integer))),
            length: None,
        };
        assert!(jdbc.is_array_capable());
        assert!(!jdbc.is_array_code());
    }

    #[test]
    fn test_element_host_type_prefers_driver() {
        let registry = JdbcTypeRegistry::new();
        let options = WrapperOptions::new();
        assert_eq!(
            registry.element_host_type(SqlTypeCode::SmallInt, &options),
            Ok(HostType::Boxed(PrimitiveKind::Short))
        );

        let options = options.prefer(SqlTypeCode::SmallInt, HostType::Boxed(PrimitiveKind::Int));
        assert_eq!(
            registry.element_host_type(SqlTypeCode::SmallInt, &options),
            Ok(HostType::Boxed(PrimitiveKind::Int))
        );
    }

    #[test]
    fn test_element_host_type_unknown_code() {
        let registry = JdbcTypeRegistry::new();
        assert_eq!(
            registry.element_host_type(SqlTypeCode::Other, &WrapperOptions::new()),
            Err(MarshalError::UnknownJdbcType(SqlTypeCode::Other))
        );
    }

    #[test]
    fn test_type_code_from_str() {
        assert_eq!("SMALLINT".parse::<SqlTypeCode>(), Ok(SqlTypeCode::SmallInt));
        assert_eq!("int".parse::<SqlTypeCode>(), Ok(SqlTypeCode::Integer));
        assert!("blob".parse::<SqlTypeCode>().is_err());
    }

    #[test]
    fn test_mapping_from_json() {
        let mapping: JdbcMapping = serde_json::from_str(
            r#"{"type_name": "integer[]", "jdbc_type": {"code": "array", "element": {"code": "integer"}}}"#,
        )
        .unwrap();
        assert_eq!(mapping, JdbcMapping::array_of(&JdbcMapping::integer()));
    }
}
