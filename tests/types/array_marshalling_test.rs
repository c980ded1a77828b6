use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use quill::sql::Dialect;
use quill::types::{
    BasicType, BasicTypeRegistry, ElementConverter, EnumCodeConverter, HostType, JdbcType,
    JdbcTypeRegistry, MarshalError, PrimitiveArray, PrimitiveKind, ReferenceArray, SqlTypeCode,
    Value, WrapperOptions,
};

/// Identity conversion between unboxed domain ints and boxed relational
/// ints that counts its invocations.
#[derive(Debug)]
struct CountingConverter {
    domain: HostType,
    relational: HostType,
    calls: Arc<AtomicUsize>,
}

impl CountingConverter {
    fn new(calls: Arc<AtomicUsize>) -> Self {
        Self {
            domain: HostType::Primitive(PrimitiveKind::Int),
            relational: HostType::Boxed(PrimitiveKind::Int),
            calls,
        }
    }
}

impl ElementConverter for CountingConverter {
    fn domain_type(&self) -> &HostType {
        &self.domain
    }

    fn relational_type(&self) -> &HostType {
        &self.relational
    }

    fn to_relational(&self, value: &Value) -> Result<Value, MarshalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        value.clone().coerce_to(&self.relational)
    }

    fn to_domain(&self, value: &Value) -> Result<Value, MarshalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        value.clone().coerce_to(&self.domain)
    }
}

fn counted_registry() -> (BasicTypeRegistry, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = BasicTypeRegistry::standard();
    registry.register(
        BasicType::new(
            "counted_int",
            JdbcType::new(SqlTypeCode::Integer),
            HostType::Boxed(PrimitiveKind::Int),
        )
        .with_converter(Arc::new(CountingConverter::new(calls.clone()))),
    );
    (registry, calls)
}

fn boxed_ints(values: &[i32]) -> Value {
    Value::ReferenceArray(ReferenceArray::new(
        HostType::Boxed(PrimitiveKind::Int),
        values.iter().copied().map(Value::Int).collect(),
    ))
}

// =============================================================================
// Collections into primitive arrays
// =============================================================================

#[test]
fn test_collection_to_primitive_array_for_every_width() {
    let registry = BasicTypeRegistry::standard();
    let cases: Vec<(&str, Vec<Value>, PrimitiveArray)> = vec![
        (
            "primitive_boolean",
            vec![Value::Boolean(true), Value::Boolean(false), Value::Boolean(true)],
            PrimitiveArray::Boolean(vec![true, false, true]),
        ),
        (
            "primitive_char",
            vec![Value::Char('a'), Value::Char('b'), Value::String("c".into())],
            PrimitiveArray::Char(vec!['a', 'b', 'c']),
        ),
        (
            "primitive_byte",
            vec![Value::Byte(1), Value::Byte(-2), Value::Int(3)],
            PrimitiveArray::Byte(vec![1, -2, 3]),
        ),
        (
            "primitive_short",
            vec![Value::Short(300), Value::Short(-1), Value::Byte(7)],
            PrimitiveArray::Short(vec![300, -1, 7]),
        ),
        (
            "primitive_int",
            vec![Value::Int(70_000), Value::Int(2), Value::Short(3)],
            PrimitiveArray::Int(vec![70_000, 2, 3]),
        ),
        (
            "primitive_long",
            vec![Value::Long(1 << 40), Value::Int(2), Value::Long(-3)],
            PrimitiveArray::Long(vec![1 << 40, 2, -3]),
        ),
        (
            "primitive_float",
            vec![Value::Float(1.5), Value::Float(-0.25), Value::Int(2)],
            PrimitiveArray::Float(vec![1.5, -0.25, 2.0]),
        ),
        (
            "primitive_double",
            vec![Value::Double(0.5), Value::Float(1.5), Value::Long(3)],
            PrimitiveArray::Double(vec![0.5, 1.5, 3.0]),
        ),
    ];

    for (element, values, expected) in cases {
        let marshaller = registry.array_of(element).unwrap();
        let consumed = marshaller.consume(Value::Collection(values)).unwrap();
        let Value::PrimitiveArray(array) = consumed else {
            panic!("{} did not produce a primitive array", element);
        };
        assert_eq!(array.len(), 3, "{}", element);
        assert_eq!(array, expected, "{}", element);
    }
}

#[test]
fn test_int_collection_keeps_int_width() {
    let registry = BasicTypeRegistry::standard();
    let consumed = registry
        .array_of("primitive_int")
        .unwrap()
        .consume(Value::Collection(vec![Value::Int(100_000), Value::Int(-100_000)]))
        .unwrap();
    assert_eq!(
        consumed,
        Value::PrimitiveArray(PrimitiveArray::Int(vec![100_000, -100_000]))
    );
}

#[test]
fn test_collection_to_reference_array_keeps_nulls() {
    let registry = BasicTypeRegistry::standard();
    let consumed = registry
        .array_of("long")
        .unwrap()
        .consume(Value::Collection(vec![Value::Int(1), Value::Null, Value::Long(3)]))
        .unwrap();
    assert_eq!(
        consumed,
        Value::ReferenceArray(ReferenceArray::new(
            HostType::Boxed(PrimitiveKind::Long),
            vec![Value::Long(1), Value::Null, Value::Long(3)]
        ))
    );
}

// =============================================================================
// Structural mismatches
// =============================================================================

#[test]
fn test_scalar_is_not_an_array() {
    let registry = BasicTypeRegistry::standard();
    let err = registry
        .array_of("integer")
        .unwrap()
        .consume(Value::Long(5))
        .unwrap_err();
    assert_eq!(err, MarshalError::UnknownType("Long".into()));
    assert!(err.is_structural_mismatch());
    assert_eq!(err.to_string(), "unknown type: Long");
}

#[test]
fn test_incompatible_elements_are_rejected() {
    let registry = BasicTypeRegistry::standard();
    let err = registry
        .array_of("primitive_int")
        .unwrap()
        .consume(Value::Collection(vec![Value::Int(1), Value::String("x".into())]))
        .unwrap_err();
    assert!(err.is_structural_mismatch());

    let err = registry
        .array_of("primitive_byte")
        .unwrap()
        .consume(Value::Collection(vec![Value::Int(1_000)]))
        .unwrap_err();
    assert!(matches!(err, MarshalError::OutOfRange { .. }));
}

#[test]
fn test_unrecognized_primitive_spelling() {
    let err = PrimitiveKind::from_name("void").unwrap_err();
    assert_eq!(err, MarshalError::UnrecognizedPrimitive("void".into()));
    assert!(err.is_structural_mismatch());
    assert!(HostType::parse("void").is_err());
}

#[test]
fn test_unknown_element_type() {
    let err = BasicTypeRegistry::standard().array_of("widget").unwrap_err();
    assert_eq!(err, MarshalError::UnknownBasicType("widget".into()));
}

// =============================================================================
// Binding and extraction
// =============================================================================

#[test]
fn test_bind_boxes_primitive_elements_in_order() {
    let (registry, calls) = counted_registry();
    let marshaller = registry.array_of("counted_int").unwrap();

    let bound = marshaller
        .bind(
            Value::PrimitiveArray(PrimitiveArray::Int(vec![3, 1, 2])),
            registry.jdbc_types(),
            &WrapperOptions::new(),
        )
        .unwrap();
    assert_eq!(bound, boxed_ints(&[3, 1, 2]));
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_bind_passes_through_preferred_representation() {
    let (registry, calls) = counted_registry();
    let marshaller = registry.array_of("counted_int").unwrap();
    let options =
        WrapperOptions::new().prefer(SqlTypeCode::Integer, HostType::Primitive(PrimitiveKind::Int));

    let value = Value::PrimitiveArray(PrimitiveArray::Int(vec![3, 1, 2]));
    let bound = marshaller
        .bind(value.clone(), registry.jdbc_types(), &options)
        .unwrap();
    assert_eq!(bound, value);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_bind_without_descriptor_fails() {
    let calls = Arc::new(AtomicUsize::new(0));
    let registry = BasicTypeRegistry::new(JdbcTypeRegistry::new());
    let basic = BasicType::new(
        "opaque",
        JdbcType::new(SqlTypeCode::Other),
        HostType::Boxed(PrimitiveKind::Int),
    )
    .with_converter(Arc::new(CountingConverter::new(calls)));
    registry.register(basic);

    let err = registry
        .array_of("opaque")
        .unwrap()
        .bind(boxed_ints(&[1]), registry.jdbc_types(), &WrapperOptions::new())
        .unwrap_err();
    assert_eq!(err, MarshalError::UnknownJdbcType(SqlTypeCode::Other));
}

#[test]
fn test_extract_identity_skips_converter() {
    let (registry, calls) = counted_registry();
    let marshaller = registry.array_of("counted_int").unwrap();

    let value = Value::PrimitiveArray(PrimitiveArray::Int(vec![5, 6]));
    assert_eq!(marshaller.extract(value.clone()).unwrap(), value);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_extract_converts_each_element_once() {
    let (registry, calls) = counted_registry();
    let marshaller = registry.array_of("counted_int").unwrap();

    let extracted = marshaller.extract(boxed_ints(&[7, 8, 9, 10])).unwrap();
    assert_eq!(
        extracted,
        Value::PrimitiveArray(PrimitiveArray::Int(vec![7, 8, 9, 10]))
    );
    assert_eq!(calls.load(Ordering::SeqCst), 4);
}

// =============================================================================
// Converted element types
// =============================================================================

fn color_registry() -> BasicTypeRegistry {
    let registry = BasicTypeRegistry::standard();
    registry.register(
        BasicType::new("color", JdbcType::new(SqlTypeCode::Varchar), HostType::String)
            .with_converter(Arc::new(EnumCodeConverter::new(
                "Color",
                [("RED", "R"), ("GREEN", "G")],
            ))),
    );
    registry
}

fn color(variant: &str) -> Value {
    Value::Enum {
        type_name: "Color".into(),
        variant: variant.into(),
    }
}

#[test]
fn test_enum_array_round_trip() {
    let registry = color_registry();
    let marshaller = registry.array_of("color").unwrap();
    assert_eq!(marshaller.component(), &HostType::Enum("Color".into()));

    let consumed = marshaller
        .consume(Value::Collection(vec![color("GREEN"), color("RED")]))
        .unwrap();
    let bound = marshaller
        .bind(consumed.clone(), registry.jdbc_types(), &WrapperOptions::new())
        .unwrap();
    assert_eq!(
        bound,
        Value::ReferenceArray(ReferenceArray::new(
            HostType::String,
            vec![Value::String("G".into()), Value::String("R".into())]
        ))
    );

    assert_eq!(marshaller.extract(bound).unwrap(), consumed);
}

#[test]
fn test_enum_array_literal() {
    let registry = color_registry();
    let marshaller = registry.array_of("color").unwrap();
    let literal = marshaller
        .format_literal(
            &Value::Collection(vec![color("RED"), Value::Null, color("GREEN")]),
            Dialect::Postgres,
        )
        .unwrap();
    assert_eq!(literal, "ARRAY['R',NULL,'G']");
}

#[test]
fn test_unknown_code_fails_extraction() {
    let registry = color_registry();
    let err = registry
        .array_of("color")
        .unwrap()
        .extract(Value::Collection(vec![Value::String("B".into())]))
        .unwrap_err();
    assert!(matches!(err, MarshalError::ConversionFailed { .. }));
}

// =============================================================================
// Sharing
// =============================================================================

#[test]
fn test_marshaller_is_shared_across_threads() {
    let registry = BasicTypeRegistry::standard();
    let marshallers: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| registry.array_of("integer").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    for marshaller in &marshallers[1..] {
        assert!(Arc::ptr_eq(&marshallers[0], marshaller));
    }
}
