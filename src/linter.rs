//! Schema linting - interprets schema files and reports what degraded.
//!
//! Errors stop a schema from producing a form at all:
//! - `E001` unreadable file or invalid JSON
//! - `E002` invalid root or nothing to extract
//!
//! Warnings mark branches that were dropped or simplified:
//! - `W001` unresolved `$ref`, `W002` external `$ref`, `W003` cyclic `$ref`
//! - `W004` nesting depth exceeded
//! - `W005` invalid `pattern`
//! - `W006` ignored `oneOf`/`anyOf` variants

use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::InterpretError;
use crate::interpreter::interpret;
use crate::loader::load_schema;
use crate::types::{Degradation, DegradationKind, InterpretOptions};

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// A single diagnostic message from linting.
#[derive(Debug, Clone, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: String,
    pub file: PathBuf,
    /// Schema pointer or field key of the issue (e.g., "#/properties/id/$ref")
    pub path: String,
    pub message: String,
}

/// Result of linting a single file.
#[derive(Debug, Clone, Serialize)]
pub struct FileResult {
    pub file: PathBuf,
    pub status: FileStatus,
    /// Number of form fields the schema produced.
    pub fields: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Status of a linted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Ok,
    Error,
    Warning,
}

/// Result of linting a directory or set of files.
#[derive(Debug, Clone, Serialize)]
pub struct LintResult {
    pub path: PathBuf,
    pub files_checked: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub warnings: usize,
    pub results: Vec<FileResult>,
}

impl LintResult {
    /// Returns true if all files passed (no errors).
    pub fn is_ok(&self) -> bool {
        self.errors == 0
    }
}

/// Lint a file or directory with default interpretation options.
///
/// If path is a directory, recursively finds all .json files.
/// If `strict` is true, warnings are treated as errors.
pub fn lint(path: &Path, strict: bool) -> LintResult {
    lint_with(path, &InterpretOptions::default(), strict)
}

/// Lint a file or directory with explicit interpretation options.
pub fn lint_with(path: &Path, options: &InterpretOptions, strict: bool) -> LintResult {
    let files = collect_schema_files(path);
    let mut results = Vec::new();
    let mut total_errors = 0;
    let mut total_warnings = 0;

    for file in &files {
        let file_result = lint_file(file, path, options);
        total_errors += file_result.count(Severity::Error);
        total_warnings += file_result.count(Severity::Warning);
        results.push(file_result);
    }

    let failed = results
        .iter()
        .filter(|r| {
            if strict {
                r.status != FileStatus::Ok
            } else {
                r.status == FileStatus::Error
            }
        })
        .count();

    tracing::info!(
        files = files.len(),
        failed,
        errors = total_errors,
        warnings = total_warnings,
        "lint finished"
    );

    LintResult {
        path: path.to_path_buf(),
        files_checked: files.len(),
        passed: files.len() - failed,
        failed,
        errors: total_errors,
        warnings: total_warnings,
        results,
    }
}

/// Lint a single schema file.
pub fn lint_file(file: &Path, base_path: &Path, options: &InterpretOptions) -> FileResult {
    let display = file.strip_prefix(base_path).unwrap_or(file).to_path_buf();
    let display = if display.as_os_str().is_empty() {
        file.to_path_buf()
    } else {
        display
    };

    let outcome = load_schema(file).and_then(|schema| interpret(&schema, options));
    let (fields, diagnostics) = match outcome {
        Ok(interpretation) => (
            interpretation.form_fields().len(),
            interpretation
                .degradations()
                .iter()
                .map(|d| degradation_diagnostic(d, file))
                .collect(),
        ),
        Err(e) => (0, vec![error_diagnostic(&e, file)]),
    };

    let has_errors = diagnostics.iter().any(|d| d.severity == Severity::Error);
    let status = if has_errors {
        FileStatus::Error
    } else if diagnostics.is_empty() {
        FileStatus::Ok
    } else {
        FileStatus::Warning
    };

    FileResult {
        file: display,
        status,
        fields,
        diagnostics,
    }
}

impl FileResult {
    fn count(&self, severity: Severity) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == severity)
            .count()
    }
}

fn error_diagnostic(error: &InterpretError, file: &Path) -> Diagnostic {
    let code = match error {
        InterpretError::FileNotFound { .. }
        | InterpretError::ReadError { .. }
        | InterpretError::InvalidJson { .. } => "E001",
        InterpretError::InvalidSchema { .. } | InterpretError::NoExtractableAttributes => "E002",
    };
    Diagnostic {
        severity: Severity::Error,
        code: code.to_string(),
        file: file.to_path_buf(),
        path: "#".to_string(),
        message: error.to_string(),
    }
}

fn degradation_diagnostic(degradation: &Degradation, file: &Path) -> Diagnostic {
    let code = match degradation.kind {
        DegradationKind::UnresolvedRef => "W001",
        DegradationKind::ExternalRef => "W002",
        DegradationKind::CyclicRef => "W003",
        DegradationKind::DepthExceeded => "W004",
        DegradationKind::InvalidPattern => "W005",
        DegradationKind::IgnoredVariants => "W006",
    };
    Diagnostic {
        severity: Severity::Warning,
        code: code.to_string(),
        file: file.to_path_buf(),
        path: degradation.path.clone(),
        message: degradation.message.clone(),
    }
}

/// Collect all .json files in a path (file or directory).
fn collect_schema_files(path: &Path) -> Vec<PathBuf> {
    if path.is_file() {
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            return vec![path.to_path_buf()];
        }
        return vec![];
    }

    let mut files = Vec::new();
    collect_files_recursive(path, &mut files);
    files.sort();
    files
}

fn collect_files_recursive(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_files_recursive(&path, files);
        } else if path.extension().map(|e| e == "json").unwrap_or(false) {
            files.push(path);
        }
    }
}
