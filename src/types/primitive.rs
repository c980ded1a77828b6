//! Host-side element representations.
//!
//! Array values are either *primitive* (unboxed, non-nullable elements stored
//! in a typed vector) or *reference* (boxed or object elements that may be
//! null). `PrimitiveKind` is the closed set of primitive widths; `HostType`
//! names the representation of a single element.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::MarshalError;

/// Closed enumeration of primitive element widths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveKind {
    Boolean,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl PrimitiveKind {
    /// All primitive kinds, in declaration order.
    pub const ALL: [PrimitiveKind; 8] = [
        PrimitiveKind::Boolean,
        PrimitiveKind::Char,
        PrimitiveKind::Byte,
        PrimitiveKind::Short,
        PrimitiveKind::Int,
        PrimitiveKind::Long,
        PrimitiveKind::Float,
        PrimitiveKind::Double,
    ];

    /// Unboxed spelling (`int`, `long`, ...).
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "boolean",
            PrimitiveKind::Char => "char",
            PrimitiveKind::Byte => "byte",
            PrimitiveKind::Short => "short",
            PrimitiveKind::Int => "int",
            PrimitiveKind::Long => "long",
            PrimitiveKind::Float => "float",
            PrimitiveKind::Double => "double",
        }
    }

    /// Boxed spelling (`Integer`, `Long`, ...).
    pub fn boxed_name(&self) -> &'static str {
        match self {
            PrimitiveKind::Boolean => "Boolean",
            PrimitiveKind::Char => "Character",
            PrimitiveKind::Byte => "Byte",
            PrimitiveKind::Short => "Short",
            PrimitiveKind::Int => "Integer",
            PrimitiveKind::Long => "Long",
            PrimitiveKind::Float => "Float",
            PrimitiveKind::Double => "Double",
        }
    }

    /// Resolve a primitive kind from its unboxed spelling.
    ///
    /// Anything outside the closed set (`void`, `object`, ...) is rejected
    /// with [`MarshalError::UnrecognizedPrimitive`].
    pub fn from_name(name: &str) -> Result<PrimitiveKind, MarshalError> {
        PrimitiveKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| MarshalError::UnrecognizedPrimitive(name.to_string()))
    }

    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            PrimitiveKind::Byte | PrimitiveKind::Short | PrimitiveKind::Int | PrimitiveKind::Long
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, PrimitiveKind::Float | PrimitiveKind::Double)
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Representation of a single array element on the host side.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostType {
    /// Unboxed primitive (`int`); arrays of it are stored as typed vectors.
    Primitive(PrimitiveKind),
    /// Boxed primitive (`Integer`); nullable.
    Boxed(PrimitiveKind),
    String,
    /// Arbitrary precision decimal, carried as its canonical text.
    Decimal,
    /// Named enumeration type.
    Enum(String),
}

impl HostType {
    pub fn is_primitive(&self) -> bool {
        matches!(self, HostType::Primitive(_))
    }

    /// The primitive width behind a primitive or boxed representation.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            HostType::Primitive(kind) | HostType::Boxed(kind) => Some(*kind),
            _ => None,
        }
    }

    /// Reference counterpart of this representation.
    pub fn boxed(&self) -> HostType {
        match self {
            HostType::Primitive(kind) => HostType::Boxed(*kind),
            other => other.clone(),
        }
    }

    /// Parse a host type spelling as used in configuration files.
    ///
    /// Lowercase primitive names resolve to [`HostType::Primitive`], boxed names
    /// to [`HostType::Boxed`]. `String` and `BigDecimal` are accepted as-is and
    /// `enum:<Name>` names an enumeration.
    pub fn parse(spelling: &str) -> Result<HostType, MarshalError> {
        let spelling = spelling.trim();
        match spelling {
            "String" | "string" => return Ok(HostType::String),
            "BigDecimal" | "decimal" => return Ok(HostType::Decimal),
            _ => {}
        }
        if let Some(name) = spelling.strip_prefix("enum:") {
            return Ok(HostType::Enum(name.to_string()));
        }
        if let Some(kind) = PrimitiveKind::ALL
            .into_iter()
            .find(|kind| kind.boxed_name() == spelling)
        {
            return Ok(HostType::Boxed(kind));
        }
        if spelling.chars().next().is_some_and(|c| c.is_ascii_lowercase()) {
            return PrimitiveKind::from_name(spelling).map(HostType::Primitive);
        }
        Err(MarshalError::UnknownType(spelling.to_string()))
    }
}

impl fmt::Display for HostType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HostType::Primitive(kind) => f.write_str(kind.name()),
            HostType::Boxed(kind) => f.write_str(kind.boxed_name()),
            HostType::String => f.write_str("String"),
            HostType::Decimal => f.write_str("BigDecimal"),
            HostType::Enum(name) => f.write_str(name),
        }
    }
}
