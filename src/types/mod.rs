//! Host value model and array marshalling.
//!
//! - [`Value`]: host values, including primitive and reference arrays
//! - [`JdbcType`] / [`JdbcMapping`]: driver-side descriptors
//! - [`ElementConverter`]: per-element domain <-> relational conversion
//! - [`ArrayMarshaller`]: whole-array bind, extract, consume and literal formatting
//! - [`BasicTypeRegistry`]: owns basic types and caches array marshallers

pub mod array;
mod basic;
mod converter;
mod error;
mod jdbc;
mod primitive;
mod registry;
mod value;

pub use array::ArrayMarshaller;
pub use basic::{literal_token, BasicType};
pub use converter::{ElementConverter, EnumCodeConverter, EnumOrdinalConverter};
pub use error::MarshalError;
pub use jdbc::{JdbcMapping, JdbcType, JdbcTypeRegistry, SqlTypeCode, WrapperOptions};
pub use primitive::{HostType, PrimitiveKind};
pub use registry::BasicTypeRegistry;
pub use value::{Primitive, PrimitiveArray, ReferenceArray, Value};
