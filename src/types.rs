//! Core types: the form field model, degradations, and interpretation options.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Section used when nothing more specific can be inferred.
pub const DEFAULT_SECTION: &str = "General Information";

/// Default bound on nesting depth (objects, arrays, and `$ref` chains).
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Marker segment appended to an array key for its item template fields.
pub const ARRAY_ITEM_MARKER: &str = "[]";

/// Composition keywords eliminated by the resolver.
pub const COMPOSITION_KEYWORDS: &[&str] = &["$ref", "allOf", "anyOf", "oneOf"];

/// Returns the JSON type name for error messages.
pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Input widget kind derived from a schema node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Integer,
    Date,
    Datetime,
    Time,
    Email,
    Url,
    Select,
    Checkbox,
    Array,
    Object,
}

impl FieldType {
    /// Parse a field type from its serialized name.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "text" => Some(FieldType::Text),
            "textarea" => Some(FieldType::Textarea),
            "number" => Some(FieldType::Number),
            "integer" => Some(FieldType::Integer),
            "date" => Some(FieldType::Date),
            "datetime" => Some(FieldType::Datetime),
            "time" => Some(FieldType::Time),
            "email" => Some(FieldType::Email),
            "url" => Some(FieldType::Url),
            "select" => Some(FieldType::Select),
            "checkbox" => Some(FieldType::Checkbox),
            "array" => Some(FieldType::Array),
            "object" => Some(FieldType::Object),
            _ => None,
        }
    }

    /// True for types whose empty value is a string.
    pub fn is_textual(&self) -> bool {
        matches!(
            self,
            FieldType::Text
                | FieldType::Textarea
                | FieldType::Date
                | FieldType::Datetime
                | FieldType::Time
                | FieldType::Email
                | FieldType::Url
        )
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Integer)
    }
}

/// One choice of a `select` field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub value: Value,
    pub label: String,
}

/// Constraints carried over from the schema node.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldValidation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_min: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclusive_max: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub multiple_of: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub unique_items: bool,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub constant: Option<Value>,
}

impl FieldValidation {
    pub fn is_empty(&self) -> bool {
        *self == FieldValidation::default()
    }
}

/// Descriptor of one schema attribute.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    /// Full dotted path from the document root.
    pub key: String,
    /// Property name within its parent.
    pub name: String,
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    pub section: String,
    pub required: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<SelectOption>,
    /// Schema-declared `default`, else `const`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<FieldValidation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_type: Option<FieldType>,
    /// Constraints on each element of a scalar array.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item_validation: Option<FieldValidation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub item_fields: Vec<FormField>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub object_fields: Vec<FormField>,
    pub depth: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_key: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_array_item: bool,
    /// Flattened ancestor objects listed as required by their own parent,
    /// outermost first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_parents: Vec<RequiredParent>,
}

/// A flattened object that must be filled in, though it has no field of its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequiredParent {
    pub key: String,
    pub label: String,
}

impl FormField {
    /// Declared constraints, or an empty bag.
    pub fn constraints(&self) -> FieldValidation {
        self.validation.clone().unwrap_or_default()
    }
}

/// Kind of non-fatal anomaly met while interpreting a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DegradationKind {
    /// Local `$ref` pointing nowhere.
    UnresolvedRef,
    /// `$ref` to another document; never fetched.
    ExternalRef,
    /// `$ref` already on the active resolution chain.
    CyclicRef,
    /// Branch deeper than the configured bound; truncated.
    DepthExceeded,
    /// `pattern` that does not compile; dropped from validation.
    InvalidPattern,
    /// `oneOf`/`anyOf` branches after the first; ignored.
    IgnoredVariants,
}

/// A recoverable anomaly: the branch was dropped or simplified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Degradation {
    pub kind: DegradationKind,
    /// Schema location (JSON pointer) or field key.
    pub path: String,
    pub message: String,
}

impl std::fmt::Display for Degradation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// Options for schema interpretation.
#[derive(Debug, Clone)]
pub struct InterpretOptions {
    /// Maximum nesting depth before a branch is truncated.
    pub max_depth: usize,
    /// Section for fields nothing else classifies.
    pub default_section: String,
    /// Field key → section, taking priority over inference.
    pub section_overrides: BTreeMap<String, String>,
}

impl Default for InterpretOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            default_section: DEFAULT_SECTION.to_string(),
            section_overrides: BTreeMap::new(),
        }
    }
}

impl InterpretOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum nesting depth.
    pub fn max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Set the fallback section name.
    pub fn default_section(mut self, section: impl Into<String>) -> Self {
        self.default_section = section.into();
        self
    }

    /// Pin a field key (or top-level property) to a section.
    pub fn section_override(mut self, key: impl Into<String>, section: impl Into<String>) -> Self {
        self.section_overrides.insert(key.into(), section.into());
        self
    }

    /// Add several key → section overrides.
    pub fn section_overrides<I, K, S>(mut self, overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, S)>,
        K: Into<String>,
        S: Into<String>,
    {
        self.section_overrides
            .extend(overrides.into_iter().map(|(k, s)| (k.into(), s.into())));
        self
    }
}
