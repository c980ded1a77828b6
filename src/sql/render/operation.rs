//! Translation output: SQL text plus ordered parameter binders.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::sql::error::TranslationError;
use crate::types::{BasicTypeRegistry, JdbcMapping, JdbcType, Value, WrapperOptions};

/// Where the value of a placeholder comes from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterSource {
    /// Named parameter supplied at execution time.
    Named(String),
    /// One element of a multi-valued named parameter.
    Element { name: String, index: usize },
    /// Value fixed at translation time (inlined list bound as an array).
    Fixed(Value),
    /// Array assembled from several sources, in order.
    Elements(Vec<ParameterSource>),
}

impl ParameterSource {
    fn resolve(&self, bindings: &ParameterBindings) -> Result<Value, TranslationError> {
        match self {
            ParameterSource::Named(name) => bindings
                .get(name)
                .cloned()
                .ok_or_else(|| TranslationError::MissingParameterBinding(name.clone())),
            ParameterSource::Element { name, index } => {
                let value = bindings
                    .get(name)
                    .ok_or_else(|| TranslationError::MissingParameterBinding(name.clone()))?;
                let element = match value {
                    Value::Collection(values) => values.get(*index).cloned(),
                    Value::ReferenceArray(array) => array.values.get(*index).cloned(),
                    Value::PrimitiveArray(array) => array.get(*index),
                    scalar if *index == 0 => Some(scalar.clone()),
                    _ => None,
                };
                element.ok_or_else(|| {
                    TranslationError::MissingParameterBinding(format!("{}[{}]", name, index))
                })
            }
            ParameterSource::Fixed(value) => Ok(value.clone()),
            ParameterSource::Elements(sources) => sources
                .iter()
                .map(|source| source.resolve(bindings))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Collection),
        }
    }
}

/// Binder for one `?` placeholder.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JdbcParameter {
    pub source: ParameterSource,
    pub mapping: JdbcMapping,
}

/// A value ready to be handed to the driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BoundValue {
    /// 1-based placeholder position.
    pub position: usize,
    pub value: Value,
    pub jdbc_type: JdbcType,
}

/// Values of named parameters for one execution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
#[must_use = "builders have no effect until used"]
pub struct ParameterBindings {
    values: HashMap<String, Value>,
}

impl ParameterBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: &str, value: Value) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Result of translating a statement.
///
/// `parameters[i]` binds the `i`-th `?` of `sql`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JdbcOperation {
    pub sql: String,
    pub parameters: Vec<JdbcParameter>,
}

impl JdbcOperation {
    /// Resolve every placeholder against `bindings` and convert the values
    /// into their driver representation.
    ///
    /// Array-typed placeholders go through the element type's array
    /// marshaller, which accepts any array or collection shape.
    pub fn bind_values(
        &self,
        bindings: &ParameterBindings,
        types: &BasicTypeRegistry,
        options: &WrapperOptions,
    ) -> Result<Vec<BoundValue>, TranslationError> {
        self.parameters
            .iter()
            .enumerate()
            .map(|(i, parameter)| {
                let value = parameter.source.resolve(bindings)?;
                let value = match (
                    parameter.mapping.jdbc_type.is_array_capable(),
                    parameter.mapping.element_type_name(),
                ) {
                    (true, Some(element)) => {
                        let marshaller = types.array_of(element)?;
                        let array = marshaller.consume(value)?;
                        marshaller.bind(array, types.jdbc_types(), options)?
                    }
                    _ => match types.get(&parameter.mapping.type_name) {
                        Some(basic) => basic.to_relational(&value)?,
                        None => {
                            trace!(type_name = %parameter.mapping.type_name, "binding unregistered type as-is");
                            value
                        }
                    },
                };
                Ok(BoundValue {
                    position: i + 1,
                    value,
                    jdbc_type: parameter.mapping.jdbc_type.clone(),
                })
            })
            .collect()
    }
}
