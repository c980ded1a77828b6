//! Host values exchanged with the database layer.

use serde::{Deserialize, Serialize};

use super::error::MarshalError;
use super::primitive::{HostType, PrimitiveKind};

/// A host-side value: a scalar, an array in one of its two representations,
/// or a generic ordered collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Value {
    Null,
    Boolean(bool),
    Char(char),
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    /// Decimal carried as canonical text.
    Decimal(String),
    Enum {
        type_name: String,
        variant: String,
    },
    PrimitiveArray(PrimitiveArray),
    ReferenceArray(ReferenceArray),
    /// Ordered, iterable collection of host values.
    Collection(Vec<Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value is an array or collection.
    pub fn is_plural(&self) -> bool {
        matches!(
            self,
            Value::PrimitiveArray(_) | Value::ReferenceArray(_) | Value::Collection(_)
        )
    }

    /// Name of this value's runtime type, used in error messages.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".into(),
            Value::String(_) => "String".into(),
            Value::Decimal(_) => "BigDecimal".into(),
            Value::Enum { type_name, .. } => type_name.clone(),
            Value::PrimitiveArray(array) => format!("{}[]", array.kind().name()),
            Value::ReferenceArray(array) => format!("{}[]", array.element),
            Value::Collection(_) => "Collection".into(),
            scalar => scalar
                .primitive_kind()
                .map(|kind| kind.boxed_name().to_string())
                .unwrap_or_default(),
        }
    }

    /// Primitive width of a scalar primitive value.
    pub fn primitive_kind(&self) -> Option<PrimitiveKind> {
        match self {
            Value::Boolean(_) => Some(PrimitiveKind::Boolean),
            Value::Char(_) => Some(PrimitiveKind::Char),
            Value::Byte(_) => Some(PrimitiveKind::Byte),
            Value::Short(_) => Some(PrimitiveKind::Short),
            Value::Int(_) => Some(PrimitiveKind::Int),
            Value::Long(_) => Some(PrimitiveKind::Long),
            Value::Float(_) => Some(PrimitiveKind::Float),
            Value::Double(_) => Some(PrimitiveKind::Double),
            _ => None,
        }
    }

    /// Reference representation of a scalar value (`None` for null and plural values).
    pub fn host_type(&self) -> Option<HostType> {
        match self {
            Value::String(_) => Some(HostType::String),
            Value::Decimal(_) => Some(HostType::Decimal),
            Value::Enum { type_name, .. } => Some(HostType::Enum(type_name.clone())),
            other => other.primitive_kind().map(HostType::Boxed),
        }
    }

    fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Byte(v) => Some(i64::from(*v)),
            Value::Short(v) => Some(i64::from(*v)),
            Value::Int(v) => Some(i64::from(*v)),
            Value::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Floating view of a numeric scalar.
    ///
    /// Integral values must be exactly representable in the target width and
    /// finite values must stay finite; anything else is `OutOfRange`.
    fn to_floating(&self, kind: PrimitiveKind) -> Option<Result<f64, MarshalError>> {
        let out_of_range = || MarshalError::OutOfRange {
            value: self.to_plain_string(),
            target: kind.boxed_name().to_string(),
        };
        let narrow = |v: f64| match kind {
            PrimitiveKind::Float => f64::from(v as f32),
            _ => v,
        };
        let result = match self {
            Value::Float(v) => Ok(f64::from(*v)),
            Value::Double(v) => {
                let narrowed = narrow(*v);
                if v.is_finite() && !narrowed.is_finite() {
                    Err(out_of_range())
                } else {
                    Ok(narrowed)
                }
            }
            other => {
                let n = other.as_i64()?;
                let narrowed = narrow(n as f64);
                if narrowed as i128 == i128::from(n) {
                    Ok(narrowed)
                } else {
                    Err(out_of_range())
                }
            }
        };
        Some(result)
    }

    fn to_plain_string(&self) -> String {
        match self {
            Value::Float(v) => v.to_string(),
            Value::Double(v) => v.to_string(),
            other => other.as_i64().map(|n| n.to_string()).unwrap_or_default(),
        }
    }

    /// Convert a scalar to the given element representation.
    ///
    /// Integral values widen and narrow with range checks. Floating targets
    /// accept any numeric input that keeps its value: integers must be exactly
    /// representable and finite doubles must not overflow a float. Null passes through untouched; callers that
    /// need a non-null primitive check for it themselves.
    pub fn coerce_to(self, target: &HostType) -> Result<Value, MarshalError> {
        if self.is_null() {
            return Ok(self);
        }
        match target {
            HostType::Primitive(kind) | HostType::Boxed(kind) => self.coerce_primitive(*kind),
            HostType::String => match self {
                Value::String(_) => Ok(self),
                Value::Char(c) => Ok(Value::String(c.to_string())),
                other => Err(MarshalError::mismatch(target, other.type_name())),
            },
            HostType::Decimal => match self {
                Value::Decimal(_) => Ok(self),
                other => match other.as_i64() {
                    Some(n) => Ok(Value::Decimal(n.to_string())),
                    None => Err(MarshalError::mismatch(target, other.type_name())),
                },
            },
            HostType::Enum(name) => {
                if matches!(&self, Value::Enum { type_name, .. } if type_name == name) {
                    Ok(self)
                } else {
                    Err(MarshalError::mismatch(target, self.type_name()))
                }
            }
        }
    }

    fn coerce_primitive(self, kind: PrimitiveKind) -> Result<Value, MarshalError> {
        if self.primitive_kind() == Some(kind) {
            return Ok(self);
        }
        let mismatch = |value: &Value| MarshalError::mismatch(kind.boxed_name(), value.type_name());
        match kind {
            PrimitiveKind::Boolean => Err(mismatch(&self)),
            PrimitiveKind::Char => match &self {
                Value::String(s) if s.chars().count() == 1 => {
                    s.chars().next().map(Value::Char).ok_or_else(|| mismatch(&self))
                }
                _ => Err(mismatch(&self)),
            },
            PrimitiveKind::Byte
            | PrimitiveKind::Short
            | PrimitiveKind::Int
            | PrimitiveKind::Long => {
                let n = self.as_i64().ok_or_else(|| mismatch(&self))?;
                let out_of_range = |_| MarshalError::OutOfRange {
                    value: n.to_string(),
                    target: kind.boxed_name().to_string(),
                };
                match kind {
                    PrimitiveKind::Byte => i8::try_from(n).map(Value::Byte).map_err(out_of_range),
                    PrimitiveKind::Short => {
                        i16::try_from(n).map(Value::Short).map_err(out_of_range)
                    }
                    PrimitiveKind::Int => i32::try_from(n).map(Value::Int).map_err(out_of_range),
                    _ => Ok(Value::Long(n)),
                }
            }
            PrimitiveKind::Float => {
                let v = self.to_floating(kind).ok_or_else(|| mismatch(&self))??;
                Ok(Value::Float(v as f32))
            }
            PrimitiveKind::Double => {
                let v = self.to_floating(kind).ok_or_else(|| mismatch(&self))??;
                Ok(Value::Double(v))
            }
        }
    }
}

/// Rust scalar types that back a [`PrimitiveKind`].
///
/// Lets array conversions be written once and instantiated per width.
pub trait Primitive: Copy + Sized {
    const KIND: PrimitiveKind;

    fn into_value(self) -> Value;

    /// Extract from a value of exactly this width.
    fn from_value(value: &Value) -> Option<Self>;

    fn into_array(values: Vec<Self>) -> PrimitiveArray;
}

macro_rules! impl_primitive {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Primitive for $ty {
                const KIND: PrimitiveKind = PrimitiveKind::$variant;

                fn into_value(self) -> Value {
                    Value::$variant(self)
                }

                fn from_value(value: &Value) -> Option<Self> {
                    match value {
                        Value::$variant(v) => Some(*v),
                        _ => None,
                    }
                }

                fn into_array(values: Vec<Self>) -> PrimitiveArray {
                    PrimitiveArray::$variant(values)
                }
            }
        )*
    };
}

impl_primitive! {
    bool => Boolean,
    char => Char,
    i8 => Byte,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
}

/// Array of unboxed, non-nullable elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimitiveArray {
    Boolean(Vec<bool>),
    Char(Vec<char>),
    Byte(Vec<i8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
}

/// Apply `$body` to the typed vector inside a [`PrimitiveArray`].
macro_rules! with_elements {
    ($array:expr, $values:ident => $body:expr) => {
        match $array {
            PrimitiveArray::Boolean($values) => $body,
            PrimitiveArray::Char($values) => $body,
            PrimitiveArray::Byte($values) => $body,
            PrimitiveArray::Short($values) => $body,
            PrimitiveArray::Int($values) => $body,
            PrimitiveArray::Long($values) => $body,
            PrimitiveArray::Float($values) => $body,
            PrimitiveArray::Double($values) => $body,
        }
    };
}

impl PrimitiveArray {
    pub fn kind(&self) -> PrimitiveKind {
        match self {
            PrimitiveArray::Boolean(_) => PrimitiveKind::Boolean,
            PrimitiveArray::Char(_) => PrimitiveKind::Char,
            PrimitiveArray::Byte(_) => PrimitiveKind::Byte,
            PrimitiveArray::Short(_) => PrimitiveKind::Short,
            PrimitiveArray::Int(_) => PrimitiveKind::Int,
            PrimitiveArray::Long(_) => PrimitiveKind::Long,
            PrimitiveArray::Float(_) => PrimitiveKind::Float,
            PrimitiveArray::Double(_) => PrimitiveKind::Double,
        }
    }

    pub fn len(&self) -> usize {
        with_elements!(self, values => values.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Box the element at `index`.
    pub fn get(&self, index: usize) -> Option<Value> {
        with_elements!(self, values => values.get(index).map(|v| v.into_value()))
    }

    /// Box every element, preserving order.
    pub fn to_values(&self) -> Vec<Value> {
        with_elements!(self, values => values.iter().map(|v| v.into_value()).collect())
    }
}

/// Array of boxed or object elements; elements may be [`Value::Null`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceArray {
    pub element: HostType,
    pub values: Vec<Value>,
}

impl ReferenceArray {
    pub fn new(element: HostType, values: Vec<Value>) -> Self {
        Self { element, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
