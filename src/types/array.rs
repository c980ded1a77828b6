//! Array value marshalling.
//!
//! An [`ArrayMarshaller`] moves whole arrays between the host and the driver:
//! it normalizes the accepted input shapes (primitive arrays, reference
//! arrays, collections) to the declared element representation, applies the
//! element converter when binding and extracting, and formats inline array
//! literals.
//!
//! Primitive element handling is written once over the [`Primitive`] trait
//! and instantiated per [`PrimitiveKind`], so every width goes through the
//! same code path.

use std::sync::Arc;

use tracing::trace;

use super::basic::BasicType;
use super::error::MarshalError;
use super::jdbc::{JdbcMapping, JdbcType, JdbcTypeRegistry, WrapperOptions};
use super::primitive::{HostType, PrimitiveKind};
use super::value::{Primitive, PrimitiveArray, ReferenceArray, Value};
use crate::sql::dialect::{Dialect, SqlDialect};

/// Array basic type over a shared element type.
#[derive(Debug)]
pub struct ArrayMarshaller {
    name: String,
    element: Arc<BasicType>,
    jdbc_type: JdbcType,
}

impl ArrayMarshaller {
    pub fn new(element: Arc<BasicType>) -> Self {
        Self {
            name: format!("{}[]", element.name()),
            jdbc_type: JdbcType::array(element.jdbc_type().clone()),
            element,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn element_type(&self) -> &BasicType {
        &self.element
    }

    /// Declared host representation of the elements.
    pub fn component(&self) -> &HostType {
        self.element.host_type()
    }

    pub fn jdbc_type(&self) -> &JdbcType {
        &self.jdbc_type
    }

    pub fn jdbc_mapping(&self) -> JdbcMapping {
        JdbcMapping::new(self.name.clone(), self.jdbc_type.clone())
    }

    /// Prepare an array value for the driver.
    ///
    /// Without a converter the value is handed over as-is. With one, the
    /// elements are converted to the representation the driver prefers for
    /// the element type (or the registry's recommendation), unless they
    /// already have it.
    pub fn bind(
        &self,
        value: Value,
        types: &JdbcTypeRegistry,
        options: &WrapperOptions,
    ) -> Result<Value, MarshalError> {
        let Some(converter) = self.element.converter() else {
            return Ok(value);
        };
        let target = types.element_host_type(self.element.jdbc_type().code, options)?;
        let elements = match value {
            Value::Null => return Ok(Value::Null),
            Value::PrimitiveArray(array) if HostType::Primitive(array.kind()) == target => {
                return Ok(Value::PrimitiveArray(array))
            }
            Value::ReferenceArray(array) if array.element == target => {
                return Ok(Value::ReferenceArray(array))
            }
            Value::PrimitiveArray(array) => array.to_values(),
            Value::ReferenceArray(array) => array.values,
            other => return Err(MarshalError::UnknownType(other.type_name())),
        };

        trace!(array = %self.name, target = %target, len = elements.len(), "converting array for binding");
        let converted = elements
            .iter()
            .map(|element| converter.to_relational(element)?.coerce_to(&target))
            .collect::<Result<Vec<_>, _>>()?;
        array_value(&target, converted)
    }

    /// Turn a driver array into its domain form.
    ///
    /// Elements already in the converter's domain representation are passed
    /// through without touching the converter.
    pub fn extract(&self, value: Value) -> Result<Value, MarshalError> {
        let Some(converter) = self.element.converter() else {
            return Ok(value);
        };
        let domain = converter.domain_type();
        let elements = match value {
            Value::Null => return Ok(Value::Null),
            Value::ReferenceArray(array) if &array.element == domain => {
                return Ok(Value::ReferenceArray(array))
            }
            Value::PrimitiveArray(array) if &HostType::Primitive(array.kind()) == domain => {
                return Ok(Value::PrimitiveArray(array))
            }
            Value::PrimitiveArray(array) => array.to_values(),
            Value::ReferenceArray(array) => array.values,
            Value::Collection(values) => values,
            other => return Err(MarshalError::UnknownType(other.type_name())),
        };

        trace!(array = %self.name, len = elements.len(), "converting extracted array");
        let converted = elements
            .iter()
            .map(|element| converter.to_domain(element))
            .collect::<Result<Vec<_>, _>>()?;
        array_value(domain, converted)
    }

    /// Normalize any accepted input shape to the declared element
    /// representation.
    ///
    /// - primitive array, primitive component: passed through
    /// - primitive array, reference component: every element boxed
    /// - reference array, primitive component: every element unboxed
    /// - reference array, reference component: elements converted to the component
    /// - collection: primitive or reference array in iteration order
    pub fn consume(&self, value: Value) -> Result<Value, MarshalError> {
        let component = self.component();
        match value {
            Value::Null => Ok(Value::Null),
            Value::PrimitiveArray(array) => match component {
                HostType::Primitive(kind) if *kind == array.kind() => {
                    Ok(Value::PrimitiveArray(array))
                }
                HostType::Primitive(kind) => {
                    to_primitive_array(*kind, &array.to_values()).map(Value::PrimitiveArray)
                }
                _ => primitive_to_wrapper_array(&array, component).map(Value::ReferenceArray),
            },
            Value::ReferenceArray(array) => match component {
                HostType::Primitive(kind) => {
                    wrapper_to_primitive_array(&array, *kind).map(Value::PrimitiveArray)
                }
                _ if &array.element == component => Ok(Value::ReferenceArray(array)),
                _ => to_reference_array(component, array.values).map(Value::ReferenceArray),
            },
            Value::Collection(values) => match component {
                HostType::Primitive(kind) => {
                    to_primitive_array(*kind, &values).map(Value::PrimitiveArray)
                }
                _ => to_reference_array(component, values).map(Value::ReferenceArray),
            },
            other => Err(MarshalError::UnknownType(other.type_name())),
        }
    }

    /// Render an array value as an inline literal, e.g. `ARRAY[1,2,3]`.
    pub fn format_literal(&self, value: &Value, dialect: Dialect) -> Result<String, MarshalError> {
        let elements = match value {
            Value::Null => return Ok(dialect.format_null().to_string()),
            Value::PrimitiveArray(array) => array.to_values(),
            Value::ReferenceArray(array) => array.values.clone(),
            Value::Collection(values) => values.clone(),
            other => return Err(MarshalError::UnknownType(other.type_name())),
        };
        let literals = elements
            .iter()
            .map(|element| self.element.format_literal(element, dialect))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(dialect.format_array_literal(&literals))
    }
}

fn array_value(component: &HostType, values: Vec<Value>) -> Result<Value, MarshalError> {
    match component {
        HostType::Primitive(kind) => to_primitive_array(*kind, &values).map(Value::PrimitiveArray),
        _ => Ok(Value::ReferenceArray(ReferenceArray::new(
            component.clone(),
            values,
        ))),
    }
}

fn unbox_all<T: Primitive>(values: &[Value]) -> Result<PrimitiveArray, MarshalError> {
    let target = HostType::Primitive(T::KIND);
    values
        .iter()
        .map(|value| {
            if value.is_null() {
                return Err(MarshalError::mismatch(T::KIND, "null"));
            }
            let coerced = value.clone().coerce_to(&target)?;
            T::from_value(&coerced).ok_or_else(|| MarshalError::mismatch(T::KIND, coerced.type_name()))
        })
        .collect::<Result<Vec<T>, _>>()
        .map(T::into_array)
}

/// Build a primitive array of `kind` from host values, in order.
pub fn to_primitive_array(
    kind: PrimitiveKind,
    values: &[Value],
) -> Result<PrimitiveArray, MarshalError> {
    match kind {
        PrimitiveKind::Boolean => unbox_all::<bool>(values),
        PrimitiveKind::Char => unbox_all::<char>(values),
        PrimitiveKind::Byte => unbox_all::<i8>(values),
        PrimitiveKind::Short => unbox_all::<i16>(values),
        PrimitiveKind::Int => unbox_all::<i32>(values),
        PrimitiveKind::Long => unbox_all::<i64>(values),
        PrimitiveKind::Float => unbox_all::<f32>(values),
        PrimitiveKind::Double => unbox_all::<f64>(values),
    }
}

/// Unbox a reference array into a primitive array of `kind`.
///
/// Null elements have no primitive form and are rejected.
pub fn wrapper_to_primitive_array(
    array: &ReferenceArray,
    kind: PrimitiveKind,
) -> Result<PrimitiveArray, MarshalError> {
    to_primitive_array(kind, &array.values)
}

/// Box a primitive array into a reference array of `component`.
pub fn primitive_to_wrapper_array(
    array: &PrimitiveArray,
    component: &HostType,
) -> Result<ReferenceArray, MarshalError> {
    to_reference_array(component, array.to_values())
}

/// Convert host values to a reference array of `component`, in order.
pub fn to_reference_array(
    component: &HostType,
    values: Vec<Value>,
) -> Result<ReferenceArray, MarshalError> {
    let values = values
        .into_iter()
        .map(|value| value.coerce_to(component))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ReferenceArray::new(component.clone(), values))
}
