use quill::sql::ast::*;
use quill::sql::{
    translate, Dialect, JdbcOperation, ParameterBindings, ParameterSource, SqlAstTranslator,
    TranslationError, TranslationOptions,
};
use quill::types::{
    BasicTypeRegistry, HostType, JdbcMapping, PrimitiveKind, ReferenceArray, Value,
    WrapperOptions,
};

fn five_ints() -> Vec<Expression> {
    (1..=5).map(lit_int).collect()
}

fn select_id_where(predicate: Predicate) -> Statement {
    QuerySpec::new()
        .select(vec![col("id")])
        .from(TableReference::new("t"))
        .filter(predicate)
        .into()
}

fn in_five(dialect: Dialect) -> JdbcOperation {
    translate(&select_id_where(col("id").in_list(five_ints())), dialect).unwrap()
}

fn boxed_ints(values: &[i32]) -> Value {
    Value::ReferenceArray(ReferenceArray::new(
        HostType::Boxed(PrimitiveKind::Int),
        values.iter().copied().map(Value::Int).collect(),
    ))
}

// =============================================================================
// Literal lists
// =============================================================================

#[test]
fn test_postgres_binds_literal_list_as_any() {
    let op = in_five(Dialect::Postgres);
    assert_eq!(op.sql, r#"SELECT "id" FROM "t" WHERE "id" = ANY(?)"#);
    assert_eq!(op.parameters.len(), 1);
    assert_eq!(
        op.parameters[0].mapping,
        JdbcMapping::array_of(&JdbcMapping::integer())
    );

    let bound = op
        .bind_values(
            &ParameterBindings::new(),
            BasicTypeRegistry::shared(),
            &WrapperOptions::default(),
        )
        .unwrap();
    assert_eq!(bound.len(), 1);
    assert_eq!(bound[0].value, boxed_ints(&[1, 2, 3, 4, 5]));
}

#[test]
fn test_hsql_binds_literal_list_through_unnest() {
    let op = in_five(Dialect::Hsql);
    assert_eq!(op.sql, r#"SELECT "id" FROM "t" WHERE "id" IN(UNNEST(?))"#);
    assert_eq!(op.parameters.len(), 1);
    assert_eq!(
        op.parameters[0].source,
        ParameterSource::Fixed(Value::Collection((1..=5).map(Value::Int).collect()))
    );
}

#[test]
fn test_mysql_inlines_literal_list() {
    let op = in_five(Dialect::MySql);
    assert_eq!(op.sql, "SELECT `id` FROM `t` WHERE `id` in(1, 2, 3, 4, 5)");
    assert!(op.parameters.is_empty());

    let op = in_five(Dialect::Ansi);
    assert_eq!(op.sql, r#"SELECT "id" FROM "t" WHERE "id" in(1, 2, 3, 4, 5)"#);
}

#[test]
fn test_negated_lists() {
    let statement = select_id_where(col("id").not_in_list(five_ints()));
    assert_eq!(
        translate(&statement, Dialect::Postgres).unwrap().sql,
        r#"SELECT "id" FROM "t" WHERE "id" <> ALL(?)"#
    );
    assert_eq!(
        translate(&statement, Dialect::Hsql).unwrap().sql,
        r#"SELECT "id" FROM "t" WHERE "id" NOT IN(UNNEST(?))"#
    );
    assert_eq!(
        translate(&statement, Dialect::MySql).unwrap().sql,
        "SELECT `id` FROM `t` WHERE `id` not in(1, 2, 3, 4, 5)"
    );
}

#[test]
fn test_array_binding_can_be_disabled() {
    let op = SqlAstTranslator::new(Dialect::Postgres)
        .with_options(TranslationOptions {
            in_list_array_binding: false,
        })
        .translate(&select_id_where(col("id").in_list(five_ints())))
        .unwrap();
    assert_eq!(op.sql, r#"SELECT "id" FROM "t" WHERE "id" in(1, 2, 3, 4, 5)"#);
    assert!(op.parameters.is_empty());
}

#[test]
fn test_heterogeneous_list_is_inlined() {
    let statement = select_id_where(col("id").in_list(vec![lit_int(1), lit_str("two")]));
    let op = translate(&statement, Dialect::Postgres).unwrap();
    assert_eq!(op.sql, r#"SELECT "id" FROM "t" WHERE "id" in(1, 'two')"#);
}

#[test]
fn test_mixed_literals_and_parameters_bind_one_array() {
    let statement = select_id_where(
        col("id").in_list(vec![lit_int(1), param("p", JdbcMapping::integer())]),
    );
    let op = translate(&statement, Dialect::Postgres).unwrap();
    assert_eq!(op.sql, r#"SELECT "id" FROM "t" WHERE "id" = ANY(?)"#);

    let bindings = ParameterBindings::new().bind("p", Value::Int(9));
    let bound = op
        .bind_values(&bindings, BasicTypeRegistry::shared(), &WrapperOptions::default())
        .unwrap();
    assert_eq!(bound[0].value, boxed_ints(&[1, 9]));
}

#[test]
fn test_empty_lists() {
    let empty = select_id_where(col("id").in_list(vec![]));
    let not_empty = select_id_where(col("id").not_in_list(vec![]));
    for dialect in Dialect::ALL {
        let sql = translate(&empty, dialect).unwrap().sql;
        assert!(sql.ends_with("WHERE 1=0"), "{}: {}", dialect, sql);
        let sql = translate(&not_empty, dialect).unwrap().sql;
        assert!(sql.ends_with("WHERE 1=1"), "{}: {}", dialect, sql);
    }
}

// =============================================================================
// Array-valued operands
// =============================================================================

#[test]
fn test_membership_in_array_column() {
    let tags = || col("tags").with_mapping(JdbcMapping::array_of(&JdbcMapping::integer()));

    let statement = select_id_where(col("id").in_array(tags()));
    assert_eq!(
        translate(&statement, Dialect::Postgres).unwrap().sql,
        r#"SELECT "id" FROM "t" WHERE "id" = ANY("tags")"#
    );
    assert_eq!(
        translate(&statement, Dialect::Hsql).unwrap().sql,
        r#"SELECT "id" FROM "t" WHERE "id" IN(UNNEST("tags"))"#
    );

    let err = translate(&statement, Dialect::MySql).unwrap_err();
    assert!(matches!(
        err,
        TranslationError::UnsupportedConstruct { dialect: "mysql", .. }
    ));
}

#[test]
fn test_missing_array_is_empty_list() {
    let statement = select_id_where(Predicate::InListArray {
        test: col("id"),
        array: None,
        negated: false,
    });
    assert!(translate(&statement, Dialect::Postgres)
        .unwrap()
        .sql
        .ends_with("WHERE 1=0"));
}

// =============================================================================
// Multi-valued parameters
// =============================================================================

#[test]
fn test_multi_valued_parameter_binds_as_array() {
    let statement = select_id_where(col("id").in_list(vec![list_param("ids", JdbcMapping::integer())]));
    let op = translate(&statement, Dialect::Hsql).unwrap();
    assert_eq!(op.sql, r#"SELECT "id" FROM "t" WHERE "id" IN(UNNEST(?))"#);
    assert_eq!(op.parameters[0].source, ParameterSource::Named("ids".into()));

    let bindings = ParameterBindings::new().bind(
        "ids",
        Value::Collection(vec![Value::Int(3), Value::Short(4)]),
    );
    let bound = op
        .bind_values(&bindings, BasicTypeRegistry::shared(), &WrapperOptions::default())
        .unwrap();
    assert_eq!(bound[0].value, boxed_ints(&[3, 4]));
}

#[test]
fn test_multi_valued_parameter_expands_without_array_binding() {
    let statement = select_id_where(col("id").in_list(vec![list_param("ids", JdbcMapping::integer())]));
    let bindings = ParameterBindings::new().bind(
        "ids",
        Value::Collection(vec![Value::Int(4), Value::Int(5), Value::Int(6)]),
    );
    let op = SqlAstTranslator::new(Dialect::MySql)
        .with_bindings(&bindings)
        .translate(&statement)
        .unwrap();
    assert_eq!(op.sql, "SELECT `id` FROM `t` WHERE `id` in(?, ?, ?)");
    assert_eq!(
        op.parameters[2].source,
        ParameterSource::Element {
            name: "ids".into(),
            index: 2
        }
    );

    let bound = op
        .bind_values(&bindings, BasicTypeRegistry::shared(), &WrapperOptions::default())
        .unwrap();
    let values: Vec<(usize, Value)> = bound.into_iter().map(|b| (b.position, b.value)).collect();
    assert_eq!(
        values,
        vec![(1, Value::Int(4)), (2, Value::Int(5)), (3, Value::Int(6))]
    );
}

#[test]
fn test_multi_valued_parameter_needs_bindings_to_expand() {
    let statement = select_id_where(col("id").in_list(vec![list_param("ids", JdbcMapping::integer())]));
    let err = translate(&statement, Dialect::MySql).unwrap_err();
    assert_eq!(err, TranslationError::MissingParameterBinding("ids".into()));

    let bindings = ParameterBindings::new().bind("ids", Value::Collection(vec![]));
    let op = SqlAstTranslator::new(Dialect::MySql)
        .with_bindings(&bindings)
        .translate(&statement)
        .unwrap();
    assert!(op.sql.ends_with("WHERE 1=0"));
    assert!(op.parameters.is_empty());
}
