//! Data validation against a field list.
//!
//! [`Validator::synthesize`] compiles every form field into a rule once
//! (regexes included); [`Validator::validate`] then checks data documents
//! and collects every violation instead of stopping at the first one.
//!
//! [`validate_against_schema`] is the full JSON Schema check, for callers
//! who need draft semantics beyond what the form rules cover.

use std::collections::HashSet;
use std::net::{Ipv4Addr, Ipv6Addr};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::defaults::get_path;
use crate::error::{FieldError, InterpretError, ValidateError};
use crate::types::{FieldType, FieldValidation, FormField, RequiredParent, SelectOption};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

/// Outcome of validating one data document.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<FieldError>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Errors reported for one field key.
    pub fn errors_for<'r>(&'r self, field: &'r str) -> impl Iterator<Item = &'r FieldError> + 'r {
        self.errors.iter().filter(move |e| e.field == field)
    }
}

/// JSON type a present value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueKind {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl ValueKind {
    fn for_field(field_type: FieldType) -> Option<Self> {
        if field_type.is_textual() {
            return Some(ValueKind::String);
        }
        match field_type {
            FieldType::Number => Some(ValueKind::Number),
            FieldType::Integer => Some(ValueKind::Integer),
            FieldType::Checkbox => Some(ValueKind::Boolean),
            FieldType::Array => Some(ValueKind::Array),
            FieldType::Object => Some(ValueKind::Object),
            // select membership is checked against the options instead
            _ => None,
        }
    }

    fn matches(&self, value: &Value) -> bool {
        match self {
            ValueKind::String => value.is_string(),
            ValueKind::Number => value.is_number(),
            ValueKind::Integer => {
                value.is_i64() || value.is_u64() || value.as_f64().is_some_and(|n| n.fract() == 0.0)
            }
            ValueKind::Boolean => value.is_boolean(),
            ValueKind::Array => value.is_array(),
            ValueKind::Object => value.is_object(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            ValueKind::String => "text",
            ValueKind::Number => "a number",
            ValueKind::Integer => "a whole number",
            ValueKind::Boolean => "true or false",
            ValueKind::Array => "a list",
            ValueKind::Object => "an object",
        }
    }
}

/// String formats with a dedicated check.
#[derive(Debug, Clone)]
enum Format {
    Email(Regex),
    Url,
    Date,
    DateTime,
    Time,
    Ipv4,
    Ipv6,
    Uuid,
}

impl Format {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "email" | "idn-email" => Regex::new(EMAIL_PATTERN).ok().map(Format::Email),
            "uri" | "url" | "iri" => Some(Format::Url),
            "date" => Some(Format::Date),
            "date-time" => Some(Format::DateTime),
            "time" => Some(Format::Time),
            "ipv4" => Some(Format::Ipv4),
            "ipv6" => Some(Format::Ipv6),
            "uuid" => Some(Format::Uuid),
            _ => None,
        }
    }

    fn accepts(&self, s: &str) -> bool {
        match self {
            Format::Email(re) => re.is_match(s),
            Format::Url => url::Url::parse(s).is_ok(),
            Format::Date => NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok(),
            Format::DateTime => {
                DateTime::parse_from_rfc3339(s).is_ok()
                    || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M").is_ok()
                    || NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").is_ok()
            }
            Format::Time => {
                NaiveTime::parse_from_str(s, "%H:%M:%S").is_ok()
                    || NaiveTime::parse_from_str(s, "%H:%M").is_ok()
            }
            Format::Ipv4 => s.parse::<Ipv4Addr>().is_ok(),
            Format::Ipv6 => s.parse::<Ipv6Addr>().is_ok(),
            Format::Uuid => uuid::Uuid::try_parse(s).is_ok(),
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Format::Email(_) => "email address",
            Format::Url => "URL",
            Format::Date => "date (YYYY-MM-DD)",
            Format::DateTime => "date and time",
            Format::Time => "time (HH:MM)",
            Format::Ipv4 => "IPv4 address",
            Format::Ipv6 => "IPv6 address",
            Format::Uuid => "UUID",
        }
    }
}

/// One compiled constraint on a present value.
#[derive(Debug, Clone)]
enum Check {
    Kind(ValueKind),
    Minimum(f64),
    ExclusiveMinimum(f64),
    Maximum(f64),
    ExclusiveMaximum(f64),
    MultipleOf(f64),
    MinLength(u64),
    MaxLength(u64),
    Pattern(Regex),
    Format(Format),
    MinItems(u64),
    MaxItems(u64),
    UniqueItems,
    OneOf(Vec<Value>),
    Const(Value),
}

impl Check {
    /// Error message when `value` violates the check.
    fn violation(&self, label: &str, value: &Value) -> Option<String> {
        match self {
            Check::Kind(kind) => {
                (!kind.matches(value)).then(|| format!("{} must be {}", label, kind.describe()))
            }
            Check::Minimum(min) => value
                .as_f64()
                .filter(|n| n < min)
                .map(|_| format!("{} must be at least {}", label, min)),
            Check::ExclusiveMinimum(min) => value
                .as_f64()
                .filter(|n| n <= min)
                .map(|_| format!("{} must be greater than {}", label, min)),
            Check::Maximum(max) => value
                .as_f64()
                .filter(|n| n > max)
                .map(|_| format!("{} must be at most {}", label, max)),
            Check::ExclusiveMaximum(max) => value
                .as_f64()
                .filter(|n| n >= max)
                .map(|_| format!("{} must be less than {}", label, max)),
            Check::MultipleOf(step) => value
                .as_f64()
                .filter(|n| {
                    let quotient = n / step;
                    (quotient - quotient.round()).abs() > 1e-9
                })
                .map(|_| format!("{} must be a multiple of {}", label, step)),
            Check::MinLength(min) => value
                .as_str()
                .filter(|s| (s.chars().count() as u64) < *min)
                .map(|_| format!("{} must be at least {} characters", label, min)),
            Check::MaxLength(max) => value
                .as_str()
                .filter(|s| (s.chars().count() as u64) > *max)
                .map(|_| format!("{} must be at most {} characters", label, max)),
            Check::Pattern(re) => value
                .as_str()
                .filter(|s| !re.is_match(s))
                .map(|_| format!("{} does not match the required pattern", label)),
            Check::Format(format) => value
                .as_str()
                .filter(|s| !format.accepts(s))
                .map(|_| format!("{} must be a valid {}", label, format.describe())),
            Check::MinItems(min) => value
                .as_array()
                .filter(|items| (items.len() as u64) < *min)
                .map(|_| format!("{} must have at least {} item(s)", label, min)),
            Check::MaxItems(max) => value
                .as_array()
                .filter(|items| (items.len() as u64) > *max)
                .map(|_| format!("{} must have at most {} item(s)", label, max)),
            Check::UniqueItems => value
                .as_array()
                .filter(|items| {
                    let distinct: HashSet<String> = items.iter().map(Value::to_string).collect();
                    distinct.len() != items.len()
                })
                .map(|_| format!("{} must not contain duplicate items", label)),
            Check::OneOf(allowed) => (!allowed.contains(value)).then(|| {
                let names: Vec<String> = allowed.iter().map(display_value).collect();
                format!("{} must be one of: {}", label, names.join(", "))
            }),
            Check::Const(expected) => (value != expected)
                .then(|| format!("{} must be {}", label, display_value(expected))),
        }
    }
}

/// How the elements of an array field are checked.
#[derive(Debug, Clone)]
enum ItemRules {
    None,
    /// Object elements, checked field by field.
    Fields(Vec<FieldRule>),
    /// Array elements (array of arrays).
    Element(Box<FieldRule>),
    /// Scalar elements.
    Scalar(Vec<Check>),
}

/// Compiled checks for one form field.
#[derive(Debug, Clone)]
struct FieldRule {
    key: String,
    name: String,
    label: String,
    parent_key: Option<String>,
    required_parents: Vec<RequiredParent>,
    required: bool,
    /// Objects count as present only when non-empty.
    container: bool,
    checks: Vec<Check>,
    items: ItemRules,
    object_fields: Vec<FieldRule>,
}

impl FieldRule {
    fn compile(field: &FormField) -> Self {
        Self {
            key: field.key.clone(),
            name: field.name.clone(),
            label: field.label.clone(),
            parent_key: field.parent_key.clone(),
            required_parents: field.required_parents.clone(),
            required: field.required,
            container: field.field_type == FieldType::Object,
            checks: compile_checks(field.field_type, &field.constraints(), &field.options),
            items: Self::compile_items(field),
            object_fields: field.object_fields.iter().map(Self::compile).collect(),
        }
    }

    fn compile_items(field: &FormField) -> ItemRules {
        if field.field_type != FieldType::Array {
            return ItemRules::None;
        }
        match field.item_type {
            Some(FieldType::Object) if !field.item_fields.is_empty() => {
                ItemRules::Fields(field.item_fields.iter().map(Self::compile).collect())
            }
            Some(FieldType::Array) => match field.item_fields.first() {
                Some(inner) => ItemRules::Element(Box::new(Self::compile(inner))),
                None => ItemRules::Scalar(vec![Check::Kind(ValueKind::Array)]),
            },
            Some(item_type) => {
                let validation = field.item_validation.clone().unwrap_or_default();
                ItemRules::Scalar(compile_checks(item_type, &validation, &field.options))
            }
            None => ItemRules::None,
        }
    }

    /// Check one value; `at` is the key reported in errors.
    fn check(&self, value: Option<&Value>, at: &str, errors: &mut Vec<FieldError>) {
        let present = |v: &&Value| {
            if self.container {
                is_populated(Some(*v))
            } else {
                is_present(v)
            }
        };
        let Some(value) = value.filter(present) else {
            if self.required {
                errors.push(FieldError {
                    field: at.to_string(),
                    message: format!("{} is required", self.label),
                });
            }
            return;
        };

        for check in &self.checks {
            if let Some(message) = check.violation(&self.label, value) {
                errors.push(FieldError {
                    field: at.to_string(),
                    message,
                });
            }
        }

        if let Value::Array(elements) = value {
            for (i, element) in elements.iter().enumerate() {
                let element_at = format!("{}[{}]", at, i);
                match &self.items {
                    ItemRules::None => {}
                    ItemRules::Fields(rules) => {
                        if !element.is_object() {
                            errors.push(FieldError {
                                field: element_at,
                                message: format!("{} items must be objects", self.label),
                            });
                            continue;
                        }
                        for rule in rules {
                            let child_at = format!("{}.{}", element_at, rule.name);
                            rule.check(element.get(&rule.name), &child_at, errors);
                        }
                    }
                    ItemRules::Element(rule) => rule.check(Some(element), &element_at, errors),
                    ItemRules::Scalar(checks) => {
                        for check in checks {
                            if let Some(message) = check.violation(&self.label, element) {
                                errors.push(FieldError {
                                    field: element_at.clone(),
                                    message,
                                });
                            }
                        }
                    }
                }
            }
        }

        if let Some(map) = value.as_object().filter(|map| !map.is_empty()) {
            for rule in &self.object_fields {
                let child_at = format!("{}.{}", at, rule.name);
                rule.check(map.get(&rule.name), &child_at, errors);
            }
        }
    }
}

/// Validation function synthesized from a field list.
#[derive(Debug, Clone)]
pub struct Validator {
    rules: Vec<FieldRule>,
}

impl Validator {
    /// Compile the checks for every field once.
    pub fn synthesize(fields: &[FormField]) -> Self {
        Self {
            rules: fields.iter().map(FieldRule::compile).collect(),
        }
    }

    /// Validate a data document. Never fails; violations are collected.
    ///
    /// A field nested under an absent or empty parent is skipped: required
    /// children are only reported once their parent has been filled in.
    /// When the outermost empty ancestor is itself required, that ancestor
    /// is reported once instead.
    pub fn validate(&self, data: &Value) -> ValidationResult {
        let mut errors = Vec::new();
        let mut reported: HashSet<&str> = HashSet::new();

        for rule in &self.rules {
            if let Some(parent) = &rule.parent_key {
                if let Some(empty) = first_empty_ancestor(data, parent) {
                    tracing::trace!(field = %rule.key, parent = %empty, "parent empty; skipped");
                    let required = rule.required_parents.iter().find(|p| p.key == empty);
                    if let Some(container) = required {
                        if reported.insert(container.key.as_str()) {
                            errors.push(FieldError {
                                field: container.key.clone(),
                                message: format!("{} is required", container.label),
                            });
                        }
                    }
                    continue;
                }
            }
            rule.check(get_path(data, &rule.key), &rule.key, &mut errors);
        }

        ValidationResult::from_errors(errors)
    }
}

/// Checks a present value of `field_type` must pass.
fn compile_checks(
    field_type: FieldType,
    validation: &FieldValidation,
    options: &[SelectOption],
) -> Vec<Check> {
    let mut checks = Vec::new();
    if let Some(kind) = ValueKind::for_field(field_type) {
        checks.push(Check::Kind(kind));
    }

    checks.extend(validation.min.map(Check::Minimum));
    checks.extend(validation.exclusive_min.map(Check::ExclusiveMinimum));
    checks.extend(validation.max.map(Check::Maximum));
    checks.extend(validation.exclusive_max.map(Check::ExclusiveMaximum));
    checks.extend(validation.multiple_of.map(Check::MultipleOf));
    checks.extend(validation.min_length.map(Check::MinLength));
    checks.extend(validation.max_length.map(Check::MaxLength));
    checks.extend(
        validation
            .pattern
            .as_deref()
            .and_then(|p| Regex::new(p).ok())
            .map(Check::Pattern),
    );
    checks.extend(
        validation
            .format
            .as_deref()
            .and_then(Format::parse)
            .map(Check::Format),
    );
    checks.extend(validation.min_items.map(Check::MinItems));
    checks.extend(validation.max_items.map(Check::MaxItems));
    if validation.unique_items {
        checks.push(Check::UniqueItems);
    }

    match &validation.enum_values {
        Some(allowed) if field_type != FieldType::Array => {
            checks.push(Check::OneOf(allowed.clone()));
        }
        None if field_type == FieldType::Select && !options.is_empty() => {
            checks.push(Check::OneOf(options.iter().map(|o| o.value.clone()).collect()));
        }
        _ => {}
    }
    checks.extend(validation.constant.clone().map(Check::Const));
    checks
}

/// Shortest dotted prefix of `path` (itself included) that is not filled in.
fn first_empty_ancestor<'p>(data: &Value, path: &'p str) -> Option<&'p str> {
    path.match_indices('.')
        .map(|(i, _)| &path[..i])
        .chain(std::iter::once(path))
        .find(|prefix| !is_populated(get_path(data, prefix)))
}

/// Present: not null, not blank text, not an empty list.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => !items.is_empty(),
        _ => true,
    }
}

/// A parent counts as filled in when present and, for objects, non-empty.
fn is_populated(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Object(map)) => !map.is_empty(),
        Some(other) => is_present(other),
        None => false,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Validate a data document against the full JSON Schema.
///
/// # Errors
///
/// Returns `ValidateError::Interpret` if the schema itself is invalid, or
/// `ValidateError::Invalid` if the data doesn't conform.
pub fn validate_against_schema(schema: &Value, data: &Value) -> Result<(), ValidateError> {
    let validator = jsonschema::validator_for(schema).map_err(|e| {
        ValidateError::Interpret(InterpretError::InvalidSchema {
            message: e.to_string(),
        })
    })?;

    let errors: Vec<FieldError> = validator
        .iter_errors(data)
        .map(|e| FieldError {
            field: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ValidateError::Invalid { errors })
    }
}
