//! Schema Form
//!
//! Interprets JSON Schemas into flat, sectioned form field descriptors, and
//! derives default documents and data validators from the same fields.
//!
//! # Example
//!
//! ```
//! use schema_form::{interpret, FieldType, InterpretOptions};
//! use serde_json::json;
//!
//! let schema = json!({
//!     "type": "object",
//!     "required": ["name"],
//!     "properties": {
//!         "name": { "type": "string", "minLength": 1 },
//!         "age": { "type": "integer", "minimum": 0 }
//!     }
//! });
//!
//! let form = interpret(&schema, &InterpretOptions::default()).unwrap();
//! assert_eq!(form.form_fields().len(), 2);
//! assert_eq!(form.form_fields()[1].field_type, FieldType::Integer);
//!
//! let result = form.validate(&json!({ "name": "", "age": -1 }));
//! assert!(!result.is_valid);
//! assert_eq!(result.errors.len(), 2);
//! ```
//!
//! # Field Keys
//!
//! | Schema position | Key |
//! |-----------------|-----|
//! | top-level property `name` | `name` |
//! | nested object property | `metadata.status` |
//! | property of an array item | `materials[].name` |
//! | array element in a validation error | `materials[0].name` |
//!
//! Nested objects are flattened into dotted keys. Objects inside array items
//! stay composite: they become one `object` field carrying `objectFields`.
//!
//! # Degradations
//!
//! Broken, external or cyclic `$ref`s, excessive nesting, invalid patterns
//! and ignored `oneOf`/`anyOf` branches never fail interpretation. The
//! affected branch is dropped or simplified and recorded as a
//! [`Degradation`] on the [`Interpretation`].

mod defaults;
mod error;
mod extractor;
mod interpreter;
mod linter;
mod loader;
mod query;
mod resolver;
mod schema;
mod sections;
mod types;
mod validator;

pub use defaults::{create_default, create_default_at, default_value, get_path, set_path};
pub use error::{FieldError, InterpretError, ValidateError};
pub use extractor::{extract_fields, Extraction};
pub use interpreter::{interpret, Interpretation};
pub use linter::{lint, lint_file, lint_with, Diagnostic, FileResult, FileStatus, LintResult, Severity};
pub use loader::{is_local_ref, load_schema, load_schema_str, navigate_fragment};
pub use query::{
    field_by_key, field_groups, fields_of_type, optional_fields, required_fields, FieldGroup,
};
pub use resolver::{merge, ResolvedProperty, Resolver};
pub use schema::{PrimitiveKind, SchemaNode};
pub use sections::humanize;
pub use types::{
    Degradation, DegradationKind, FieldType, FieldValidation, FormField, InterpretOptions,
    RequiredParent, SelectOption, ARRAY_ITEM_MARKER, DEFAULT_MAX_DEPTH, DEFAULT_SECTION,
};
pub use validator::{validate_against_schema, ValidationResult, Validator};
