use insta::assert_snapshot;
use quill::sql::ast::*;
use quill::sql::{translate, Dialect, TranslationError};
use quill::types::{JdbcMapping, JdbcType, MarshalError, SqlTypeCode, Value};

fn select_from_t(items: Vec<Expression>) -> QuerySpec {
    QuerySpec::new().select(items).from(TableReference::new("t"))
}

fn hsql(statement: impl Into<Statement>) -> String {
    translate(&statement.into(), Dialect::Hsql).unwrap().sql
}

fn int_array() -> JdbcMapping {
    JdbcMapping::array_of(&JdbcMapping::integer())
}

// =============================================================================
// Predicates
// =============================================================================

fn decimal(text: &str) -> Expression {
    lit(
        Value::Decimal(text.into()),
        JdbcMapping::new("big_decimal", JdbcType::new(SqlTypeCode::Numeric)),
    )
}

#[test]
fn test_decimal_literal_is_inlined() {
    let sql = hsql(select_from_t(vec![col("id")]).filter(and(vec![
        col("amount").eq(decimal("-12.50")),
        col("id").eq(param("id", JdbcMapping::integer())),
    ])));
    assert_snapshot!(sql, @r#"SELECT "id" FROM "t" WHERE "amount" = -12.50 AND "id" = ?"#);
}

#[test]
fn test_malformed_decimal_literal_fails_translation() {
    for text in ["1--", "-", "e", "1e"] {
        let statement: Statement = select_from_t(vec![col("id")])
            .filter(and(vec![
                col("amount").eq(decimal(text)),
                col("id").eq(param("id", JdbcMapping::integer())),
            ]))
            .into();
        let err = translate(&statement, Dialect::Hsql).unwrap_err();
        assert!(
            matches!(
                err,
                TranslationError::Marshal(MarshalError::ConversionFailed { .. })
            ),
            "{}: {:?}",
            text,
            err
        );
    }
}

#[test]
fn test_negated_boolean_predicate_is_wrapped() {
    let sql = hsql(select_from_t(vec![col("id")]).filter(not_boolean(col("active"))));
    assert_snapshot!(sql, @r#"SELECT "id" FROM "t" WHERE not("active")"#);

    let sql = hsql(select_from_t(vec![col("id")]).filter(boolean(col("active"))));
    assert_snapshot!(sql, @r#"SELECT "id" FROM "t" WHERE "active""#);
}

#[test]
fn test_array_equality_becomes_membership() {
    let tags = || col("tags").with_mapping(int_array());

    let sql = hsql(select_from_t(vec![col("id")]).filter(tags().eq(param("t", int_array()))));
    assert_snapshot!(sql, @r#"SELECT "id" FROM "t" WHERE "tags" IN(?)"#);

    let sql = hsql(select_from_t(vec![col("id")]).filter(tags().ne(param("t", int_array()))));
    assert_snapshot!(sql, @r#"SELECT "id" FROM "t" WHERE "tags" NOT IN(?)"#);
}

#[test]
fn test_scalar_equality_uses_standard_comparison() {
    let typed = col("a").with_mapping(JdbcMapping::integer());
    let sql = hsql(select_from_t(vec![col("id")]).filter(typed.eq(param("p", JdbcMapping::integer()))));
    assert_eq!(sql, r#"SELECT "id" FROM "t" WHERE "a" = ?"#);
}

#[test]
fn test_distinct_from_on_arrays() {
    let tags = || col("tags").with_mapping(int_array());

    let sql = hsql(select_from_t(vec![col("id")]).filter(tags().distinct_from(param("t", int_array()))));
    assert_eq!(sql, r#"SELECT "id" FROM "t" WHERE "tags"<>?"#);

    let sql =
        hsql(select_from_t(vec![col("id")]).filter(tags().not_distinct_from(param("t", int_array()))));
    assert_eq!(sql, r#"SELECT "id" FROM "t" WHERE "tags"=?"#);
}

#[test]
fn test_distinct_from_casts_scalar_parameters() {
    let typed = col("a").with_mapping(JdbcMapping::integer());
    let op = translate(
        &select_from_t(vec![col("id")])
            .filter(typed.distinct_from(param("p", JdbcMapping::integer())))
            .into(),
        Dialect::Hsql,
    )
    .unwrap();
    assert_eq!(
        op.sql,
        r#"SELECT "id" FROM "t" WHERE "a" is distinct from cast(? as integer)"#
    );
    assert_eq!(op.parameters.len(), 1);
}

#[test]
fn test_untyped_distinct_from_falls_back_to_standard() {
    let sql = hsql(select_from_t(vec![col("id")]).filter(col("a").distinct_from(col("b"))));
    assert_eq!(sql, r#"SELECT "id" FROM "t" WHERE "a" is distinct from "b""#);
}

#[test]
fn test_tuple_comparison_is_expanded() {
    let sql = hsql(
        select_from_t(vec![col("id")])
            .filter(tuple(vec![col("a"), col("b")]).eq(tuple(vec![lit_int(1), lit_int(2)]))),
    );
    assert_snapshot!(sql, @r#"SELECT "id" FROM "t" WHERE ("a" = 1 AND "b" = 2)"#);

    let sql = hsql(
        select_from_t(vec![col("id")])
            .filter(tuple(vec![col("a"), col("b")]).lt(tuple(vec![lit_int(1), lit_int(2)]))),
    );
    assert_snapshot!(sql, @r#"SELECT "id" FROM "t" WHERE ("a" < 1 OR "a" = 1 AND "b" < 2)"#);
}

#[test]
fn test_tuple_subquery_comparison_uses_exists() {
    let sub = QuerySpec::new()
        .select(vec![col("x"), col("y")])
        .from(TableReference::new("s"));
    let sql = hsql(select_from_t(vec![col("id")]).filter(tuple_compare(
        vec![col("a"), col("b")],
        ComparisonOperator::LessThan,
        sub,
    )));
    assert_snapshot!(
        sql,
        @r#"SELECT "id" FROM "t" WHERE EXISTS (SELECT 1 FROM "s" WHERE ("x" >= "a" AND ("x" > "a" OR "y" > "b")))"#
    );
}

#[test]
fn test_tuple_subquery_comparison_keeps_existing_filter() {
    let sub = QuerySpec::new()
        .select(vec![col("x"), col("y")])
        .from(TableReference::new("s"))
        .filter(col("k").eq(lit_int(3)));
    let sql = hsql(select_from_t(vec![col("id")]).filter(tuple_compare(
        vec![col("a"), col("b")],
        ComparisonOperator::Equal,
        sub,
    )));
    assert_eq!(
        sql,
        r#"SELECT "id" FROM "t" WHERE EXISTS (SELECT 1 FROM "s" WHERE ("k" = 3) AND ("x" = "a" AND "y" = "b"))"#
    );
}

#[test]
fn test_tuple_subquery_comparison_rejects_limited_subquery() {
    let limited = || {
        QuerySpec::new()
            .select(vec![col("x"), col("y")])
            .from(TableReference::new("s"))
            .order_by(vec![SortSpecification::desc(col("x"))])
            .fetch(lit_int(1), FetchClauseType::RowsOnly)
    };
    let statement = |sub: QuerySpec| -> Statement {
        select_from_t(vec![col("id")])
            .filter(tuple_compare(
                vec![col("a"), col("b")],
                ComparisonOperator::Equal,
                sub,
            ))
            .into()
    };

    let err = translate(&statement(limited()), Dialect::Hsql).unwrap_err();
    assert!(matches!(
        err,
        TranslationError::UnsupportedConstruct { dialect: "hsql", .. }
    ));

    let err = translate(&statement(limited().offset(lit_int(5))), Dialect::Hsql).unwrap_err();
    assert!(matches!(err, TranslationError::UnsupportedConstruct { .. }));

    // Native row values keep the limit inside the subquery.
    let sql = translate(&statement(limited()), Dialect::Postgres).unwrap().sql;
    assert!(sql.contains(r#"("a", "b") = (SELECT "x", "y" FROM "s""#), "{}", sql);
    assert!(sql.ends_with("FETCH FIRST 1 ROWS ONLY)"), "{}", sql);
}

// =============================================================================
// CASE
// =============================================================================

#[test]
fn test_case_with_only_parameter_results_casts_first_arm() {
    let case = CaseSearched::new()
        .when(col("a").eq(lit_int(1)), param("p", JdbcMapping::integer()))
        .otherwise(param("q", JdbcMapping::integer()));
    let op = translate(&select_from_t(vec![case.into()]).into(), Dialect::Hsql).unwrap();
    assert_snapshot!(
        op.sql,
        @r#"SELECT CASE WHEN "a" = 1 THEN cast(? as integer) ELSE ? END FROM "t""#
    );
    assert_eq!(op.parameters.len(), 2);
}

#[test]
fn test_case_first_arm_cast_depends_on_arm_order() {
    let literal_first = CaseSearched::new()
        .when(col("a").eq(lit_int(1)), lit_int(10))
        .when(col("a").eq(lit_int(2)), param("p", JdbcMapping::integer()));
    assert_eq!(
        hsql(select_from_t(vec![literal_first.into()])),
        r#"SELECT CASE WHEN "a" = 1 THEN cast(10 as integer) WHEN "a" = 2 THEN ? END FROM "t""#
    );

    let parameter_first = CaseSearched::new()
        .when(col("a").eq(lit_int(2)), param("p", JdbcMapping::integer()))
        .when(col("a").eq(lit_int(1)), lit_int(10));
    assert_eq!(
        hsql(select_from_t(vec![parameter_first.into()])),
        r#"SELECT CASE WHEN "a" = 2 THEN cast(? as integer) WHEN "a" = 1 THEN 10 END FROM "t""#
    );
}

#[test]
fn test_case_with_column_result_is_not_cast() {
    let case = CaseSimple::new(col("kind"))
        .when(lit_int(1), col("b"))
        .when(lit_int(2), param("p", JdbcMapping::integer()));
    assert_eq!(
        hsql(select_from_t(vec![case.into()])),
        r#"SELECT CASE "kind" WHEN 1 THEN "b" WHEN 2 THEN ? END FROM "t""#
    );
}

#[test]
fn test_simple_case_with_literal_results() {
    let case = CaseSimple::new(col("kind"))
        .when(lit_int(1), lit_int(100))
        .when(lit_int(2), lit_int(200))
        .otherwise(col("b"));
    assert_eq!(
        hsql(select_from_t(vec![case.into()])),
        r#"SELECT CASE "kind" WHEN 1 THEN cast(100 as integer) WHEN 2 THEN 200 ELSE "b" END FROM "t""#
    );
}

// =============================================================================
// Arithmetic, grouping and select items
// =============================================================================

#[test]
fn test_modulo_uses_mod_function() {
    let sql = hsql(select_from_t(vec![col("a").modulo(lit_int(2))]));
    assert_snapshot!(sql, @r#"SELECT mod("a", 2) FROM "t""#);
}

#[test]
fn test_arithmetic_parameters_are_cast() {
    let op = translate(
        &select_from_t(vec![col("a").add(param("p", JdbcMapping::integer()))]).into(),
        Dialect::Hsql,
    )
    .unwrap();
    assert_eq!(op.sql, r#"SELECT ("a" + cast(? as integer)) FROM "t""#);
    assert_eq!(op.parameters.len(), 1);
}

#[test]
fn test_select_parameter_is_cast() {
    let sql = hsql(select_from_t(vec![param("p", JdbcMapping::long())]));
    assert_eq!(sql, r#"SELECT cast(? as bigint) FROM "t""#);
}

#[test]
fn test_literal_partition_item() {
    let window = Over::new(count_star()).partition_by(vec![lit_int(1)]);
    let sql = hsql(select_from_t(vec![window.into()]));
    assert_snapshot!(sql, @r#"SELECT COUNT(*) OVER (PARTITION BY '0' || '0') FROM "t""#);
}

#[test]
fn test_summarization_is_unsupported() {
    let statement: Statement = select_from_t(vec![col("a"), count_star().into()])
        .group_by(vec![rollup(vec![col("a")])])
        .into();
    let err = translate(&statement, Dialect::Hsql).unwrap_err();
    assert_eq!(
        err,
        TranslationError::UnsupportedConstruct {
            construct: "Summarization".into(),
            dialect: "hsql",
        }
    );
    assert_eq!(err.to_string(), "Summarization is not supported by hsql");

    // other dialects render rollup natively
    let op = translate(&statement, Dialect::Postgres).unwrap();
    assert_eq!(
        op.sql,
        r#"SELECT "a", COUNT(*) FROM "t" GROUP BY rollup("a")"#
    );
}

#[test]
fn test_filter_clause_is_native() {
    let count = count_star().filter(col("active").eq(lit_int(1)));
    let sql = hsql(select_from_t(vec![count.into()]));
    assert_eq!(sql, r#"SELECT COUNT(*) FILTER (WHERE "active" = 1) FROM "t""#);
}

// =============================================================================
// Query structure
// =============================================================================

#[test]
fn test_select_without_from_uses_values() {
    let sql = hsql(QuerySpec::new().select(vec![lit_int(1)]));
    assert_snapshot!(sql, @"SELECT 1 from (values(0))");
}

#[test]
fn test_offset_fetch_is_native() {
    let sql = hsql(
        select_from_t(vec![col("a")])
            .order_by(vec![SortSpecification::asc(col("a")).nulls_first()])
            .offset(lit_int(20))
            .fetch(lit_int(10), FetchClauseType::RowsOnly),
    );
    assert_snapshot!(
        sql,
        @r#"SELECT "a" FROM "t" ORDER BY "a" ASC NULLS FIRST OFFSET 20 ROWS FETCH FIRST 10 ROWS ONLY"#
    );

    let err = translate(
        &select_from_t(vec![col("a")])
            .fetch(lit_int(10), FetchClauseType::PercentOnly)
            .into(),
        Dialect::Hsql,
    )
    .unwrap_err();
    assert!(matches!(err, TranslationError::InvalidFetchClause { .. }));
}

#[test]
fn test_nested_cte_is_hoisted() {
    let inner = QuerySpec::new()
        .with_cte(Cte::new(
            "c",
            QuerySpec::new().select(vec![lit_int(1).alias("x")]),
        ))
        .select(vec![col("x")])
        .from(TableReference::new("c"));
    let sql = hsql(QuerySpec::new().select(vec![subquery(inner)]));
    assert_snapshot!(
        sql,
        @r#"WITH "c" AS (SELECT 1 AS "x" from (values(0))) SELECT (SELECT "x" FROM "c") from (values(0))"#
    );
}

fn tree_query(size_estimate: i32) -> Statement {
    let seed = QuerySpec::new()
        .select(vec![col("id")])
        .from(TableReference::new("node"))
        .filter(col("parent").is_null());
    let step = QuerySpec::new()
        .select(vec![table_col("n", "id")])
        .from(TableReference::new("node").with_alias("n"))
        .from(TableReference::new("tree").with_alias("t"))
        .filter(table_col("n", "parent").eq(table_col("t", "id")));
    let cte = Cte::recursive("tree", QueryGroup::union_all(vec![seed.into(), step.into()]))
        .with_columns(vec!["id"])
        .with_search_path(
            CteSearchPath::new("path", col("id"), table_col("n", "id"))
                .with_size_estimate(size_estimate),
        );
    QuerySpec::new()
        .with_cte(cte)
        .select(vec![col("id")])
        .from(TableReference::new("tree"))
        .into()
}

#[test]
fn test_recursive_path_seed_is_cast_to_estimated_size() {
    let sql = hsql(tree_query(50));
    assert_eq!(
        sql,
        concat!(
            r#"WITH RECURSIVE "tree" ("id", "path") AS ("#,
            r#"SELECT "id", cast("id" as varchar(50)) AS "path" FROM "node" WHERE "parent" IS NULL"#,
            r#" UNION ALL "#,
            r#"SELECT "n"."id", "tree"."path" || ',' || "n"."id" AS "path" FROM "node" AS "n", "tree" AS "t" WHERE "n"."parent" = "t"."id""#,
            r#") SELECT "id" FROM "tree""#
        )
    );
}

#[test]
fn test_recursive_path_without_estimate_is_unchanged() {
    let sql = hsql(tree_query(CteSearchPath::UNKNOWN_SIZE));
    assert!(sql.contains(r#"SELECT "id", "id" AS "path" FROM "node""#));
    assert!(!sql.contains("cast("));
}
