//! One-shot schema interpretation.
//!
//! [`interpret`] runs extraction once and bundles the field list with its
//! synthesized validator, so queries, defaults and validation all work off
//! the same fields.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::defaults;
use crate::error::InterpretError;
use crate::extractor::extract_fields;
use crate::query::{self, FieldGroup};
use crate::types::{Degradation, FieldType, FormField, InterpretOptions};
use crate::validator::{ValidationResult, Validator};

/// Everything derived from one schema.
#[derive(Debug, Clone)]
pub struct Interpretation {
    fields: Vec<FormField>,
    validator: Validator,
    degradations: Vec<Degradation>,
}

/// Interpret a parsed schema document.
///
/// # Errors
///
/// Returns `InterpretError::InvalidSchema` for a non-object root and
/// `InterpretError::NoExtractableAttributes` when nothing can be extracted.
/// Everything else (broken refs, cycles, excessive depth, bad patterns)
/// degrades and is reported through [`Interpretation::degradations`].
pub fn interpret(
    schema: &Value,
    options: &InterpretOptions,
) -> Result<Interpretation, InterpretError> {
    let extraction = extract_fields(schema, options)?;
    let validator = Validator::synthesize(&extraction.fields);

    tracing::info!(
        fields = extraction.fields.len(),
        degradations = extraction.degradations.len(),
        "schema interpreted"
    );

    Ok(Interpretation {
        fields: extraction.fields,
        validator,
        degradations: extraction.degradations,
    })
}

impl Interpretation {
    /// Flat field list in schema order.
    pub fn form_fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn validate(&self, data: &Value) -> ValidationResult {
        self.validator.validate(data)
    }

    pub fn create_default(&self, overrides: Option<&Map<String, Value>>) -> Value {
        defaults::create_default(&self.fields, overrides)
    }

    /// Same as [`Interpretation::create_default`] with a fixed clock.
    pub fn create_default_at(
        &self,
        now: DateTime<Utc>,
        overrides: Option<&Map<String, Value>>,
    ) -> Value {
        defaults::create_default_at(&self.fields, now, overrides)
    }

    pub fn field_groups(&self) -> Vec<FieldGroup<'_>> {
        query::field_groups(&self.fields)
    }

    pub fn field_by_key(&self, key: &str) -> Option<&FormField> {
        query::field_by_key(&self.fields, key)
    }

    pub fn required_fields(&self) -> Vec<&FormField> {
        query::required_fields(&self.fields)
    }

    pub fn optional_fields(&self) -> Vec<&FormField> {
        query::optional_fields(&self.fields)
    }

    pub fn fields_of_type(&self, field_type: FieldType) -> Vec<&FormField> {
        query::fields_of_type(&self.fields, field_type)
    }

    /// Problems that were worked around while interpreting.
    pub fn degradations(&self) -> &[Degradation] {
        &self.degradations
    }
}
