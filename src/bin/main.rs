//! Quill CLI - Translate JSON SQL ASTs to dialect SQL
//!
//! Usage:
//!   quill translate <statement.json> [--dialect <dialect>] [--config <quill.toml>] [--bindings <bindings.json>]
//!   quill dialects
//!
//! Examples:
//!   quill translate query.json --dialect postgres
//!   quill translate query.json --dialect hsql --bindings values.json --output json
//!   quill dialects

use clap::{Parser, Subcommand, ValueEnum};
use quill::config::Settings;
use quill::sql::ast::Statement;
use quill::sql::{Dialect, JdbcOperation, ParameterBindings, SqlAstTranslator, SqlDialect};
use quill::types::BasicTypeRegistry;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quill")]
#[command(about = "Quill - Dialect-aware SQL AST translation")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Translate a JSON statement to SQL
    Translate {
        /// Path to the statement JSON file
        file: PathBuf,

        /// SQL dialect to generate (defaults to the configured dialect)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Config file (defaults to QUILL_CONFIG, ./quill.toml, then the user config dir)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// JSON object of named parameter values to bind
        #[arg(short, long)]
        bindings: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// List supported dialects and their capabilities
    Dialects,
}

#[derive(Clone, Copy, ValueEnum)]
enum DialectArg {
    Ansi,
    Hsql,
    Postgres,
    Mysql,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Ansi => Dialect::Ansi,
            DialectArg::Hsql => Dialect::Hsql,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::MySql,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// SQL followed by the parameter list
    Sql,
    /// The whole operation as JSON
    Json,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("QUILL_LOG").unwrap_or_else(|_| EnvFilter::from_default_env()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Translate {
            file,
            dialect,
            config,
            bindings,
            output,
        } => cmd_translate(file, dialect, config, bindings, output),
        Commands::Dialects => cmd_dialects(),
    }
}

fn read_file(path: &Path) -> Option<String> {
    match fs::read_to_string(path) {
        Ok(s) => Some(s),
        Err(e) => {
            eprintln!("Error reading file '{}': {}", path.display(), e);
            None
        }
    }
}

fn cmd_translate(
    file: PathBuf,
    dialect: Option<DialectArg>,
    config: Option<PathBuf>,
    bindings: Option<PathBuf>,
    output: OutputFormat,
) -> ExitCode {
    let settings = match config {
        Some(path) => Settings::from_file(path),
        None => Settings::load(),
    };
    let settings = match settings {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let dialect = match dialect {
        Some(arg) => Dialect::from(arg),
        None => match settings.dialect() {
            Ok(d) => d,
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    let Some(source) = read_file(&file) else {
        return ExitCode::FAILURE;
    };
    let statement: Statement = match serde_json::from_str(&source) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Invalid statement '{}': {}", file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let bindings: Option<ParameterBindings> = match bindings {
        Some(path) => {
            let Some(source) = read_file(&path) else {
                return ExitCode::FAILURE;
            };
            match serde_json::from_str(&source) {
                Ok(b) => Some(b),
                Err(e) => {
                    eprintln!("Invalid bindings '{}': {}", path.display(), e);
                    return ExitCode::FAILURE;
                }
            }
        }
        None => None,
    };

    let mut translator =
        SqlAstTranslator::new(dialect).with_options(settings.translation_options());
    if let Some(b) = &bindings {
        translator = translator.with_bindings(b);
    }
    let operation = match translator.translate(&statement) {
        Ok(op) => op,
        Err(e) => {
            eprintln!("Translation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match output {
        OutputFormat::Sql => print_operation(&operation),
        OutputFormat::Json => match serde_json::to_string_pretty(&operation) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Serialization error: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    let Some(bindings) = bindings else {
        return ExitCode::SUCCESS;
    };
    let wrapper_options = match settings.wrapper_options() {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    match operation.bind_values(&bindings, BasicTypeRegistry::shared(), &wrapper_options) {
        Ok(values) => {
            println!();
            println!("-- Bound values");
            for bound in values {
                println!("-- {}: {:?} ({})", bound.position, bound.value, bound.jdbc_type.code);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Binding error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn print_operation(operation: &JdbcOperation) {
    println!("{}", operation.sql);
    if operation.parameters.is_empty() {
        return;
    }
    println!();
    println!("-- Parameters");
    for (i, parameter) in operation.parameters.iter().enumerate() {
        println!(
            "-- {}: {:?} as {}",
            i + 1,
            parameter.source,
            parameter.mapping.type_name
        );
    }
}

fn cmd_dialects() -> ExitCode {
    for dialect in Dialect::ALL {
        println!("{}", dialect);
        let flags = [
            ("array constructor", dialect.supports_array_constructor()),
            ("row value constructor", dialect.supports_row_value_constructor_syntax()),
            ("with clause in subquery", dialect.supports_with_clause_in_subquery()),
            (
                "recursive array/row emulation",
                dialect.supports_recursive_clause_array_and_row_emulation(),
            ),
            ("offset/fetch clause", dialect.supports_offset_fetch_clause()),
            ("filter clause", dialect.supports_filter_clause()),
            ("in-list array binding", dialect.supports_in_list_array_binding()),
        ];
        for (name, supported) in flags {
            println!("  {:<32}{}", name, if supported { "yes" } else { "no" });
        }
        let from_dual = dialect.from_dual().trim();
        println!(
            "  {:<32}{}",
            "from dual",
            if from_dual.is_empty() { "-" } else { from_dual }
        );
    }
    ExitCode::SUCCESS
}
