//! Basic type registry.
//!
//! Owns the scalar [`BasicType`]s (and through them the element converters)
//! and lazily creates one [`ArrayMarshaller`] per element type. Marshallers
//! are immutable once built and shared through `Arc`, so concurrent
//! translations and bindings can use them freely.

use std::sync::Arc;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use tracing::debug;

use super::array::ArrayMarshaller;
use super::basic::BasicType;
use super::error::MarshalError;
use super::jdbc::{JdbcType, JdbcTypeRegistry, SqlTypeCode};
use super::primitive::{HostType, PrimitiveKind};

static STANDARD: Lazy<BasicTypeRegistry> = Lazy::new(BasicTypeRegistry::standard);

/// Registry of basic types and their array marshallers.
#[derive(Debug, Default)]
pub struct BasicTypeRegistry {
    basic: DashMap<String, Arc<BasicType>>,
    arrays: DashMap<String, Arc<ArrayMarshaller>>,
    jdbc_types: JdbcTypeRegistry,
}

impl BasicTypeRegistry {
    /// Empty registry over the given JDBC type descriptors.
    pub fn new(jdbc_types: JdbcTypeRegistry) -> Self {
        Self {
            basic: DashMap::new(),
            arrays: DashMap::new(),
            jdbc_types,
        }
    }

    /// Registry with the built-in scalar types.
    ///
    /// Reference types are named after their SQL counterpart (`integer`,
    /// `long`, `string`, ...); their `primitive_*` twins declare unboxed
    /// elements, so arrays of them are primitive arrays.
    pub fn standard() -> Self {
        let registry = Self::new(JdbcTypeRegistry::new());
        let scalars = [
            ("boolean", SqlTypeCode::Boolean, PrimitiveKind::Boolean),
            ("character", SqlTypeCode::Char, PrimitiveKind::Char),
            ("byte", SqlTypeCode::TinyInt, PrimitiveKind::Byte),
            ("short", SqlTypeCode::SmallInt, PrimitiveKind::Short),
            ("integer", SqlTypeCode::Integer, PrimitiveKind::Int),
            ("long", SqlTypeCode::BigInt, PrimitiveKind::Long),
            ("float", SqlTypeCode::Real, PrimitiveKind::Float),
            ("double", SqlTypeCode::Double, PrimitiveKind::Double),
        ];
        for (name, code, kind) in scalars {
            registry.register(BasicType::new(name, JdbcType::new(code), HostType::Boxed(kind)));
            registry.register(BasicType::new(
                format!("primitive_{}", kind.name()),
                JdbcType::new(code),
                HostType::Primitive(kind),
            ));
        }
        registry.register(BasicType::new(
            "string",
            JdbcType::new(SqlTypeCode::Varchar),
            HostType::String,
        ));
        registry.register(BasicType::new(
            "big_decimal",
            JdbcType::new(SqlTypeCode::Numeric),
            HostType::Decimal,
        ));
        registry
    }

    /// Process-wide registry with the built-in types.
    pub fn shared() -> &'static BasicTypeRegistry {
        &STANDARD
    }

    pub fn jdbc_types(&self) -> &JdbcTypeRegistry {
        &self.jdbc_types
    }

    /// Register (or replace) a scalar type.
    ///
    /// Replacing a type drops its cached array marshaller.
    pub fn register(&self, basic: BasicType) -> Arc<BasicType> {
        let name = basic.name().to_string();
        let basic = Arc::new(basic);
        if self.basic.insert(name.clone(), basic.clone()).is_some() {
            self.arrays.remove(&name);
        }
        basic
    }

    pub fn get(&self, name: &str) -> Option<Arc<BasicType>> {
        self.basic.get(name).map(|entry| entry.value().clone())
    }

    pub fn resolve(&self, name: &str) -> Result<Arc<BasicType>, MarshalError> {
        self.get(name)
            .ok_or_else(|| MarshalError::UnknownBasicType(name.to_string()))
    }

    /// Array marshaller over the named element type, created on first use.
    pub fn array_of(&self, element: &str) -> Result<Arc<ArrayMarshaller>, MarshalError> {
        if let Some(existing) = self.arrays.get(element) {
            return Ok(existing.value().clone());
        }
        let basic = self.resolve(element)?;
        let marshaller = self
            .arrays
            .entry(element.to_string())
            .or_insert_with(|| {
                debug!(element = %element, "creating array marshaller");
                Arc::new(ArrayMarshaller::new(basic))
            })
            .value()
            .clone();
        Ok(marshaller)
    }
}
