//! Default-value object construction from a field list.

use chrono::{DateTime, Utc};
use serde_json::{Map, Number, Value};

use crate::types::{FieldType, FormField};

/// Build the default document for `fields`, dated now.
///
/// `overrides` maps dotted keys to values written after the defaults.
pub fn create_default(fields: &[FormField], overrides: Option<&Map<String, Value>>) -> Value {
    create_default_at(fields, Utc::now(), overrides)
}

/// Build the default document with an explicit clock for temporal fields.
pub fn create_default_at(
    fields: &[FormField],
    now: DateTime<Utc>,
    overrides: Option<&Map<String, Value>>,
) -> Value {
    let mut document = Value::Object(Map::new());

    for field in fields {
        set_path(&mut document, &field.key, default_value(field, now));
    }

    if let Some(overrides) = overrides {
        for (key, value) in overrides {
            set_path(&mut document, key, value.clone());
        }
    }

    document
}

/// Default for one field: schema `default`/`const` first, then by type.
pub fn default_value(field: &FormField, now: DateTime<Utc>) -> Value {
    if let Some(declared) = &field.default {
        return declared.clone();
    }

    match field.field_type {
        FieldType::Date => Value::String(now.format("%Y-%m-%d").to_string()),
        FieldType::Datetime => Value::String(now.format("%Y-%m-%dT%H:%M:%SZ").to_string()),
        FieldType::Time => Value::String(now.format("%H:%M").to_string()),
        t if t.is_textual() => Value::String(String::new()),
        t if t.is_numeric() => numeric_default(field),
        FieldType::Checkbox => Value::Bool(false),
        FieldType::Array => Value::Array(Vec::new()),
        FieldType::Object => Value::Object(Map::new()),
        FieldType::Select => field
            .options
            .first()
            .map(|option| option.value.clone())
            .unwrap_or_else(|| Value::String(String::new())),
        _ => Value::String(String::new()),
    }
}

/// The declared minimum (rounded up for integers), else zero.
fn numeric_default(field: &FormField) -> Value {
    let mut min = field.validation.as_ref().and_then(|v| v.min).unwrap_or(0.0);
    if field.field_type == FieldType::Integer {
        min = min.ceil();
        // i64::MAX is not exactly representable; the bound is exclusive
        if min >= i64::MIN as f64 && min < i64::MAX as f64 {
            return Value::Number(Number::from(min as i64));
        }
    }
    Number::from_f64(min)
        .map(Value::Number)
        .unwrap_or_else(|| Value::Number(Number::from(0)))
}

/// Write `value` at a dotted path, creating intermediate objects.
///
/// A non-object value in the way is replaced by an object.
pub fn set_path(document: &mut Value, path: &str, value: Value) {
    let mut segments = path.split('.').peekable();
    let mut current = document;

    while let Some(segment) = segments.next() {
        if !current.is_object() {
            *current = Value::Object(Map::new());
        }
        let Some(map) = current.as_object_mut() else {
            return;
        };

        if segments.peek().is_none() {
            map.insert(segment.to_string(), value);
            return;
        }
        current = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
    }
}

/// Read the value at a dotted path, if present.
pub fn get_path<'v>(document: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.')
        .try_fold(document, |current, segment| current.get(segment))
}
