use std::env;
use std::fs;
use std::path::PathBuf;

use quill::config::{Settings, SettingsError};
use quill::sql::ast::*;
use quill::sql::{Dialect, SqlAstTranslator};
use quill::types::{HostType, PrimitiveKind, SqlTypeCode};

fn write_config(name: &str, content: &str) -> PathBuf {
    let path = env::temp_dir().join(format!("quill_{}_{}.toml", name, std::process::id()));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_from_file() {
    let path = write_config(
        "from_file",
        r#"
[translation]
dialect = "mysql"

[driver.preferred_array_elements]
tinyint = "short"
"#,
    );

    let settings = Settings::from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(settings.dialect().unwrap(), Dialect::MySql);
    // unspecified keys keep their defaults
    assert!(settings.translation.in_list_array_binding);
    assert_eq!(
        settings
            .wrapper_options()
            .unwrap()
            .preferred_host_type(SqlTypeCode::TinyInt),
        Some(&HostType::Primitive(PrimitiveKind::Short))
    );
}

#[test]
fn test_missing_file() {
    let err = Settings::from_file("/nonexistent/quill.toml").unwrap_err();
    assert!(matches!(err, SettingsError::FileNotFound(_)));
}

#[test]
fn test_parse_error() {
    let path = write_config("parse_error", "[translation\ndialect = ");
    let err = Settings::from_file(&path).unwrap_err();
    fs::remove_file(&path).unwrap();
    assert!(matches!(err, SettingsError::ParseError(_)));
}

#[test]
fn test_dialect_from_env_var() {
    env::set_var("QUILL_SETTINGS_TEST_DIALECT", "postgresql");
    let settings: Settings =
        toml::from_str("[translation]\ndialect = \"${QUILL_SETTINGS_TEST_DIALECT}\"").unwrap();
    assert_eq!(settings.dialect().unwrap(), Dialect::Postgres);
    env::remove_var("QUILL_SETTINGS_TEST_DIALECT");

    let settings: Settings =
        toml::from_str("[translation]\ndialect = \"${QUILL_SETTINGS_TEST_UNSET}\"").unwrap();
    assert!(matches!(
        settings.dialect(),
        Err(SettingsError::MissingEnvVar(name)) if name == "QUILL_SETTINGS_TEST_UNSET"
    ));
}

#[test]
fn test_translation_options_drive_the_translator() {
    let settings: Settings = toml::from_str(
        r#"
[translation]
dialect = "postgres"
in_list_array_binding = false
"#,
    )
    .unwrap();

    let statement: Statement = QuerySpec::new()
        .select(vec![col("id")])
        .from(TableReference::new("t"))
        .filter(col("id").in_list(vec![lit_int(1), lit_int(2)]))
        .into();
    let op = SqlAstTranslator::new(settings.dialect().unwrap())
        .with_options(settings.translation_options())
        .translate(&statement)
        .unwrap();
    assert_eq!(op.sql, r#"SELECT "id" FROM "t" WHERE "id" in(1, 2)"#);
}
