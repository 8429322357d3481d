//! Schema Form CLI
//!
//! Command-line interface for interpreting JSON Schemas into form fields,
//! default documents and validation results.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use schema_form::{
    interpret, lint_with, load_schema, validate_against_schema, FieldType, FileStatus,
    InterpretOptions, Interpretation, Severity, ValidateError, DEFAULT_MAX_DEPTH,
};
use serde::Serialize;
use serde_json::{Map, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-form")]
#[command(about = "Interpret JSON Schemas into form fields, defaults and validators")]
#[command(version)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Maximum nesting depth before a branch is truncated
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// JSON file mapping field keys to section names
    #[arg(long, global = true)]
    sections: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the form fields extracted from a schema
    Fields {
        /// Schema file
        schema: PathBuf,

        /// Only print fields of this type (e.g., text, select, date)
        #[arg(long = "type", value_name = "TYPE")]
        field_type: Option<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print the default document for a schema
    Defaults {
        /// Schema file
        schema: PathBuf,

        /// Override a value: dotted.key=JSON (bare text is taken as a string)
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Print field keys grouped by section
    Groups {
        /// Schema file
        schema: PathBuf,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
    },

    /// Validate a data document against a schema's form rules
    Validate {
        /// Schema file
        schema: PathBuf,

        /// Data file to validate
        data: PathBuf,

        /// Output results as JSON (for automation)
        #[arg(long)]
        json: bool,

        /// Also run a full JSON Schema conformance check
        #[arg(long)]
        conformance: bool,
    },

    /// Lint schema files for interpretation problems
    Lint {
        /// File or directory to lint
        path: PathBuf,

        /// Output format: text (default) or json
        #[arg(long, default_value = "text")]
        format: String,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Suppress progress output, only show errors
        #[arg(long, short)]
        quiet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let result = build_options(cli.max_depth, cli.sections.as_deref()).and_then(|options| {
        match cli.command {
            Commands::Fields {
                schema,
                field_type,
                output,
                pretty,
            } => run_fields(&schema, &options, field_type.as_deref(), output, pretty),
            Commands::Defaults {
                schema,
                overrides,
                output,
                pretty,
            } => run_defaults(&schema, &options, &overrides, output, pretty),
            Commands::Groups { schema, pretty } => run_groups(&schema, &options, pretty),
            Commands::Validate {
                schema,
                data,
                json,
                conformance,
            } => run_validate(&schema, &data, &options, json, conformance),
            Commands::Lint {
                path,
                format,
                strict,
                quiet,
            } => run_lint(&path, &options, &format, strict, quiet),
        }
    });

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn build_options(max_depth: usize, sections: Option<&Path>) -> Result<InterpretOptions, u8> {
    let options = InterpretOptions::new().max_depth(max_depth);
    let Some(path) = sections else {
        return Ok(options);
    };

    let table = load_schema(path).map_err(|e| {
        eprintln!("Error loading sections: {}", e);
        e.exit_code() as u8
    })?;
    let Value::Object(table) = table else {
        eprintln!("Error: sections file must be a JSON object of key to section name");
        return Err(2);
    };

    let mut overrides = Vec::with_capacity(table.len());
    for (key, section) in table {
        let Value::String(section) = section else {
            eprintln!("Error: section for {:?} must be a string", key);
            return Err(2);
        };
        overrides.push((key, section));
    }
    Ok(options.section_overrides(overrides))
}

fn load_interpretation(schema: &Path, options: &InterpretOptions) -> Result<Interpretation, u8> {
    let document = load_schema(schema).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;
    interpret(&document, options).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn run_fields(
    schema: &Path,
    options: &InterpretOptions,
    field_type: Option<&str>,
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let interpretation = load_interpretation(schema, options)?;
    match field_type {
        None => emit(&interpretation.form_fields(), pretty, output),
        Some(name) => {
            let Some(field_type) = FieldType::parse(name) else {
                eprintln!("Error: unknown field type: {}", name);
                return Err(2);
            };
            emit(&interpretation.fields_of_type(field_type), pretty, output)
        }
    }
}

fn run_defaults(
    schema: &Path,
    options: &InterpretOptions,
    overrides: &[String],
    output: Option<PathBuf>,
    pretty: bool,
) -> Result<(), u8> {
    let interpretation = load_interpretation(schema, options)?;

    let mut parsed = Map::new();
    for entry in overrides {
        let Some((key, raw)) = entry.split_once('=') else {
            eprintln!("Error: --set expects KEY=VALUE, got {:?}", entry);
            return Err(2);
        };
        let value =
            serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        parsed.insert(key.to_string(), value);
    }

    let document = interpretation.create_default(Some(&parsed));
    emit(&document, pretty, output)
}

fn run_groups(schema: &Path, options: &InterpretOptions, pretty: bool) -> Result<(), u8> {
    let interpretation = load_interpretation(schema, options)?;

    let mut groups = Map::new();
    for group in interpretation.field_groups() {
        let keys = group
            .fields
            .iter()
            .map(|f| Value::String(f.key.clone()))
            .collect();
        groups.insert(group.section.to_string(), Value::Array(keys));
    }
    emit(&groups, pretty, None)
}

fn run_validate(
    schema_path: &Path,
    data_path: &Path,
    options: &InterpretOptions,
    json_output: bool,
    conformance: bool,
) -> Result<(), u8> {
    let schema = load_schema(schema_path).map_err(|e| {
        report_error(json_output, &format!("loading schema: {}", e));
        e.exit_code() as u8
    })?;
    let data = load_schema(data_path).map_err(|e| {
        report_error(json_output, &format!("loading data: {}", e));
        e.exit_code() as u8
    })?;
    let interpretation = interpret(&schema, options).map_err(|e| {
        report_error(json_output, &e.to_string());
        e.exit_code() as u8
    })?;

    let mut errors = interpretation.validate(&data).errors;

    if conformance {
        match validate_against_schema(&schema, &data) {
            Ok(()) => {}
            Err(ValidateError::Invalid { errors: found }) => errors.extend(found),
            Err(ValidateError::Interpret(e)) => {
                report_error(json_output, &e.to_string());
                return Err(e.exit_code() as u8);
            }
        }
    }

    if errors.is_empty() {
        if json_output {
            println!(r#"{{"valid":true}}"#);
        } else {
            println!("Valid");
        }
        return Ok(());
    }

    if json_output {
        let output = serde_json::json!({
            "valid": false,
            "errors": errors
        });
        println!("{}", output);
    } else {
        eprintln!("Validation failed:");
        for error in &errors {
            eprintln!("  {}", error);
        }
    }
    Err(1)
}

/// Output an error message in plain text or JSON format.
fn report_error(json_output: bool, msg: &str) {
    if json_output {
        println!("{}", serde_json::json!({ "valid": false, "error": msg }));
    } else {
        eprintln!("Error: {}", msg);
    }
}

fn emit<T: Serialize + ?Sized>(value: &T, pretty: bool, output: Option<PathBuf>) -> Result<(), u8> {
    let json_output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })?;

    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    Ok(())
}

fn run_lint(
    path: &Path,
    options: &InterpretOptions,
    format: &str,
    strict: bool,
    quiet: bool,
) -> Result<(), u8> {
    if !path.exists() {
        eprintln!("Error: path not found: {}", path.display());
        return Err(2);
    }

    let result = lint_with(path, options, strict);

    if format == "json" {
        let rendered = serde_json::to_string_pretty(&result).map_err(|e| {
            eprintln!("Error serializing output: {}", e);
            2u8
        })?;
        println!("{}", rendered);
    } else {
        if !quiet {
            println!("Linting {} ...\n", path.display());
        }

        for file_result in &result.results {
            let status_icon = match file_result.status {
                FileStatus::Ok => "\x1b[32m✓\x1b[0m",
                FileStatus::Warning => "\x1b[33m⚠\x1b[0m",
                FileStatus::Error => "\x1b[31m✗\x1b[0m",
            };

            if !quiet || file_result.status != FileStatus::Ok {
                println!(
                    "  {} {} ({} fields)",
                    status_icon,
                    file_result.file.display(),
                    file_result.fields
                );
            }

            for diag in &file_result.diagnostics {
                let (color, label) = match diag.severity {
                    Severity::Error => ("\x1b[31m", "error"),
                    Severity::Warning => ("\x1b[33m", "warning"),
                };
                if !quiet || diag.severity == Severity::Error {
                    println!(
                        "    {}{}[{}]\x1b[0m: {} - {}",
                        color, label, diag.code, diag.path, diag.message
                    );
                }
            }
        }

        println!();
        if result.failed == 0 {
            println!(
                "\x1b[32m✓ {} files checked, all passed\x1b[0m",
                result.files_checked
            );
        } else {
            println!(
                "\x1b[31m✗ {} files checked: {} passed, {} failed ({} errors, {} warnings)\x1b[0m",
                result.files_checked, result.passed, result.failed, result.errors, result.warnings
            );
        }
    }

    if result.failed == 0 {
        Ok(())
    } else {
        Err(1)
    }
}
