//! Field extraction - walks resolved schema properties into form fields.
//!
//! The walk is depth-first and keeps schema property order. Every level gets
//! its own [`RequiredContext`] built from the enclosing schema's `required`
//! array, so same-named properties under different parents never share a
//! required flag.

use std::collections::HashSet;

use serde_json::{Map, Value};

use crate::error::InterpretError;
use crate::resolver::{ResolvedProperty, Resolver};
use crate::schema::{PrimitiveKind, SchemaNode};
use crate::sections::{field_label, nested_section, top_level_section};
use crate::types::{
    json_type_name, Degradation, DegradationKind, FieldType, FieldValidation, FormField,
    InterpretOptions, RequiredParent, SelectOption, ARRAY_ITEM_MARKER, COMPOSITION_KEYWORDS,
};

/// Strings longer than this are edited in a textarea.
const TEXTAREA_MIN_LENGTH: u64 = 255;

/// Output of a full extraction walk.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub fields: Vec<FormField>,
    pub degradations: Vec<Degradation>,
}

/// Extract the flat field list from a root schema.
///
/// # Errors
///
/// Returns `InterpretError::InvalidSchema` if the root is not a JSON object,
/// and `InterpretError::NoExtractableAttributes` if it has neither
/// properties nor a composition keyword that resolves to properties.
pub fn extract_fields(
    schema: &Value,
    options: &InterpretOptions,
) -> Result<Extraction, InterpretError> {
    let Value::Object(root) = schema else {
        return Err(InterpretError::InvalidSchema {
            message: format!(
                "root schema must be an object, got {}",
                json_type_name(schema)
            ),
        });
    };

    let has_properties = root
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|p| !p.is_empty());
    let has_composition = COMPOSITION_KEYWORDS.iter().any(|k| root.contains_key(*k));
    if !has_properties && !has_composition {
        return Err(InterpretError::NoExtractableAttributes);
    }

    let mut extractor = Extractor {
        resolver: Resolver::new(schema, options),
        options,
    };
    let resolved = extractor.resolver.resolve(schema, "#");
    let fields = match resolved.node() {
        SchemaNode::Object {
            properties,
            required,
        } => {
            let context = RequiredContext::from_values(required);
            extractor.extract_level(properties, &context, Level::root())
        }
        _ => return Err(InterpretError::NoExtractableAttributes),
    };

    Ok(Extraction {
        fields,
        degradations: extractor.resolver.finish(),
    })
}

/// Required names declared by one enclosing schema.
#[derive(Debug, Default)]
struct RequiredContext<'a> {
    names: HashSet<&'a str>,
}

impl<'a> RequiredContext<'a> {
    fn from_values(required: &'a [Value]) -> Self {
        Self {
            names: required.iter().filter_map(Value::as_str).collect(),
        }
    }

    fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Position of a properties map in the walk.
#[derive(Debug, Clone, Copy)]
struct Level<'p> {
    /// Key of the enclosing field; `None` at the document root.
    prefix: Option<&'p str>,
    /// Section inherited from the enclosing field; `None` at the root.
    section: Option<&'p str>,
    depth: usize,
    in_array_item: bool,
    /// JSON pointer of the schema owning the properties.
    pointer: &'p str,
    /// Required flattened objects enclosing this level.
    required_parents: &'p [RequiredParent],
}

impl Level<'static> {
    fn root() -> Self {
        Level {
            prefix: None,
            section: None,
            depth: 0,
            in_array_item: false,
            pointer: "#",
            required_parents: &[],
        }
    }
}

/// Per-property data shared by every field constructor.
struct Site<'s> {
    name: &'s str,
    key: String,
    required: bool,
    section: String,
    pointer: String,
}

struct Extractor<'a> {
    resolver: Resolver<'a>,
    options: &'a InterpretOptions,
}

impl<'a> Extractor<'a> {
    fn extract_level(
        &mut self,
        properties: &Map<String, Value>,
        context: &RequiredContext<'_>,
        level: Level<'_>,
    ) -> Vec<FormField> {
        if level.depth > self.options.max_depth {
            let path = level.prefix.unwrap_or(level.pointer);
            self.resolver.degrade(
                DegradationKind::DepthExceeded,
                path,
                format!(
                    "nesting deeper than {}; {} propert{} dropped",
                    self.options.max_depth,
                    properties.len(),
                    if properties.len() == 1 { "y" } else { "ies" }
                ),
            );
            return Vec::new();
        }

        tracing::debug!(
            parent = level.prefix.unwrap_or("<root>"),
            depth = level.depth,
            count = properties.len(),
            "extracting properties"
        );

        let mut fields = Vec::new();
        for (name, raw) in properties {
            let key = match level.prefix {
                Some(prefix) => format!("{}.{}", prefix, name),
                None => name.clone(),
            };
            let pointer = format!("{}/properties/{}", level.pointer, escape_pointer(name));
            let resolved = self.resolver.resolve(raw, &pointer);
            let section = match level.section {
                None => top_level_section(name, &resolved, self.options),
                Some(inherited) => nested_section(&key, &resolved, inherited, self.options),
            };
            let site = Site {
                name,
                key,
                required: context.contains(name),
                section,
                pointer,
            };
            self.extract_property(site, &resolved, level, &mut fields);
        }
        fields
    }

    fn extract_property(
        &mut self,
        site: Site<'_>,
        resolved: &ResolvedProperty,
        level: Level<'_>,
        fields: &mut Vec<FormField>,
    ) {
        match resolved.node() {
            SchemaNode::Object {
                properties,
                required,
            } => {
                let context = RequiredContext::from_values(required);
                let mut required_parents = level.required_parents.to_vec();
                if site.required && !level.in_array_item {
                    required_parents.push(RequiredParent {
                        key: site.key.clone(),
                        label: field_label(site.name, resolved),
                    });
                }
                let children = self.extract_level(
                    properties,
                    &context,
                    Level {
                        prefix: Some(&site.key),
                        section: Some(&site.section),
                        depth: level.depth + 1,
                        in_array_item: level.in_array_item,
                        pointer: &site.pointer,
                        required_parents: &required_parents,
                    },
                );
                if level.in_array_item {
                    let mut field = self.base_field(&site, resolved, FieldType::Object, level);
                    field.object_fields = children;
                    fields.push(field);
                } else {
                    fields.extend(children);
                }
            }
            SchemaNode::FreeformObject => {
                fields.push(self.base_field(&site, resolved, FieldType::Object, level));
            }
            SchemaNode::Array { items } => {
                let field = self.array_field(&site, resolved, items, level);
                fields.push(field);
            }
            SchemaNode::Choice { options } => {
                let mut field = self.base_field(&site, resolved, FieldType::Select, level);
                field.options = select_options(options);
                fields.push(field);
            }
            SchemaNode::Constant { value } => {
                let field_type = value_type(value);
                fields.push(self.base_field(&site, resolved, field_type, level));
            }
            SchemaNode::Primitive { kind, format } => {
                let field_type = primitive_type(kind, format, resolved);
                fields.push(self.base_field(&site, resolved, field_type, level));
            }
            SchemaNode::Empty | SchemaNode::Composed => {
                fields.push(self.base_field(&site, resolved, FieldType::Text, level));
            }
        }
    }

    fn array_field(
        &mut self,
        site: &Site<'_>,
        resolved: &ResolvedProperty,
        items: Option<&Value>,
        level: Level<'_>,
    ) -> FormField {
        let mut field = self.base_field(site, resolved, FieldType::Array, level);
        let Some(items) = items else {
            return field;
        };

        let item_key = format!("{}{}", site.key, ARRAY_ITEM_MARKER);
        let item_pointer = format!("{}/items", site.pointer);
        let item_level = Level {
            prefix: Some(&item_key),
            section: Some(&site.section),
            depth: level.depth + 1,
            in_array_item: true,
            pointer: &item_pointer,
            required_parents: &[],
        };
        let item = self.resolver.resolve(items, &item_pointer);

        match item.node() {
            SchemaNode::Object {
                properties,
                required,
            } => {
                let context = RequiredContext::from_values(required);
                field.item_type = Some(FieldType::Object);
                field.item_fields = self.extract_level(properties, &context, item_level);
            }
            SchemaNode::FreeformObject => field.item_type = Some(FieldType::Object),
            SchemaNode::Array { items: inner } => {
                field.item_type = Some(FieldType::Array);
                if item_level.depth > self.options.max_depth {
                    self.resolver.degrade(
                        DegradationKind::DepthExceeded,
                        &item_key,
                        format!("nested arrays deeper than {}", self.options.max_depth),
                    );
                } else {
                    let nested = Site {
                        name: site.name,
                        key: item_key.clone(),
                        required: false,
                        section: site.section.clone(),
                        pointer: item_pointer.clone(),
                    };
                    field.item_fields = vec![self.array_field(&nested, &item, inner, item_level)];
                }
            }
            SchemaNode::Choice { options } => {
                field.item_type = Some(FieldType::Select);
                field.options = select_options(options);
                field.item_validation = self.constraints(&item, &item_key);
            }
            SchemaNode::Constant { value } => {
                field.item_type = Some(value_type(value));
                field.item_validation = self.constraints(&item, &item_key);
            }
            SchemaNode::Primitive { kind, format } => {
                field.item_type = Some(primitive_type(kind, format, &item));
                field.item_validation = self.constraints(&item, &item_key);
            }
            SchemaNode::Empty | SchemaNode::Composed => field.item_type = Some(FieldType::Text),
        }

        field
    }

    fn base_field(
        &mut self,
        site: &Site<'_>,
        resolved: &ResolvedProperty,
        field_type: FieldType,
        level: Level<'_>,
    ) -> FormField {
        FormField {
            key: site.key.clone(),
            name: site.name.to_string(),
            label: field_label(site.name, resolved),
            field_type,
            section: site.section.clone(),
            required: site.required,
            description: resolved.get_str("description").map(String::from),
            placeholder: resolved
                .get("examples")
                .and_then(Value::as_array)
                .and_then(|examples| examples.first())
                .and_then(Value::as_str)
                .map(String::from),
            options: Vec::new(),
            default: resolved
                .get("default")
                .or_else(|| resolved.get("const"))
                .cloned(),
            validation: self.constraints(resolved, &site.key),
            item_type: None,
            item_validation: None,
            item_fields: Vec::new(),
            object_fields: Vec::new(),
            depth: level.depth,
            parent_key: level.prefix.map(String::from),
            is_array_item: level.in_array_item,
            required_parents: level.required_parents.to_vec(),
        }
    }

    fn constraints(&mut self, resolved: &ResolvedProperty, key: &str) -> Option<FieldValidation> {
        let number = |k: &str| resolved.get(k).and_then(Value::as_f64);
        let count = |k: &str| resolved.get(k).and_then(Value::as_u64);

        let mut validation = FieldValidation {
            min: number("minimum"),
            max: number("maximum"),
            exclusive_min: number("exclusiveMinimum"),
            exclusive_max: number("exclusiveMaximum"),
            multiple_of: number("multipleOf").filter(|m| *m > 0.0),
            min_length: count("minLength"),
            max_length: count("maxLength"),
            pattern: None,
            format: resolved.get_str("format").map(String::from),
            min_items: count("minItems"),
            max_items: count("maxItems"),
            unique_items: resolved
                .get("uniqueItems")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            enum_values: resolved.get("enum").and_then(Value::as_array).cloned(),
            constant: resolved.get("const").cloned(),
        };

        // draft-04 boolean exclusive bounds apply to minimum/maximum
        if resolved.get("exclusiveMinimum") == Some(&Value::Bool(true)) {
            validation.exclusive_min = validation.min.take();
        }
        if resolved.get("exclusiveMaximum") == Some(&Value::Bool(true)) {
            validation.exclusive_max = validation.max.take();
        }

        if let Some(pattern) = resolved.get_str("pattern") {
            match regex::Regex::new(pattern) {
                Ok(_) => validation.pattern = Some(pattern.to_string()),
                Err(e) => self.resolver.degrade(
                    DegradationKind::InvalidPattern,
                    key,
                    format!("pattern {:?} dropped: {}", pattern, e),
                ),
            }
        }

        (!validation.is_empty()).then_some(validation)
    }
}

fn primitive_type(
    kind: PrimitiveKind,
    format: Option<&str>,
    resolved: &ResolvedProperty,
) -> FieldType {
    match kind {
        PrimitiveKind::Boolean => FieldType::Checkbox,
        PrimitiveKind::Integer => FieldType::Integer,
        PrimitiveKind::Number => FieldType::Number,
        PrimitiveKind::String => string_type(format, resolved),
    }
}

fn string_type(format: Option<&str>, resolved: &ResolvedProperty) -> FieldType {
    match format {
        Some("date") => return FieldType::Date,
        Some("date-time") => return FieldType::Datetime,
        Some("time") => return FieldType::Time,
        Some("email" | "idn-email") => return FieldType::Email,
        Some("uri" | "url" | "iri" | "uri-reference") => return FieldType::Url,
        Some("textarea") => return FieldType::Textarea,
        _ => {}
    }

    if let Some(field_type) = resolved.get_str("pattern").and_then(sniff_pattern) {
        return field_type;
    }

    match resolved.get("maxLength").and_then(Value::as_u64) {
        Some(max) if max > TEXTAREA_MIN_LENGTH => FieldType::Textarea,
        _ => FieldType::Text,
    }
}

/// Recognize date, date-time and URL shaped patterns.
fn sniff_pattern(pattern: &str) -> Option<FieldType> {
    let dated = pattern.contains(r"\d{4}-\d{2}-\d{2}");
    if dated && pattern.contains('T') {
        return Some(FieldType::Datetime);
    }
    if dated {
        return Some(FieldType::Date);
    }
    if pattern.starts_with("^https?") || pattern.starts_with("^(https?") {
        return Some(FieldType::Url);
    }
    None
}

fn value_type(value: &Value) -> FieldType {
    match value {
        Value::Bool(_) => FieldType::Checkbox,
        Value::Number(n) if n.is_i64() || n.is_u64() => FieldType::Integer,
        Value::Number(_) => FieldType::Number,
        Value::Array(_) => FieldType::Array,
        Value::Object(_) => FieldType::Object,
        Value::String(_) | Value::Null => FieldType::Text,
    }
}

fn select_options(options: &[Value]) -> Vec<SelectOption> {
    options
        .iter()
        .map(|value| SelectOption {
            value: value.clone(),
            label: match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            },
        })
        .collect()
}

fn escape_pointer(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract(schema: Value) -> Extraction {
        extract_fields(&schema, &InterpretOptions::default()).unwrap()
    }

    fn field<'f>(fields: &'f [FormField], key: &str) -> &'f FormField {
        fields
            .iter()
            .find(|f| f.key == key)
            .unwrap_or_else(|| panic!("no field {}", key))
    }

    // === Root Handling ===

    #[test]
    fn root_without_properties_is_fatal() {
        let result = extract_fields(&json!({ "type": "object" }), &InterpretOptions::default());
        assert!(matches!(
            result,
            Err(InterpretError::NoExtractableAttributes)
        ));
    }

    #[test]
    fn non_object_root_is_fatal() {
        let result = extract_fields(&json!([1, 2]), &InterpretOptions::default());
        assert!(matches!(result, Err(InterpretError::InvalidSchema { .. })));
    }

    #[test]
    fn root_composition_is_enough() {
        let extraction = extract(json!({
            "definitions": {
                "Part": {
                    "type": "object",
                    "required": ["id"],
                    "properties": { "id": { "type": "string" } }
                }
            },
            "$ref": "#/definitions/Part"
        }));
        assert_eq!(extraction.fields.len(), 1);
        assert!(extraction.fields[0].required);
    }

    #[test]
    fn root_composition_resolving_to_nothing_is_fatal() {
        let result = extract_fields(
            &json!({ "$ref": "#/definitions/Missing" }),
            &InterpretOptions::default(),
        );
        assert!(matches!(
            result,
            Err(InterpretError::NoExtractableAttributes)
        ));
    }

    // === Required Context ===

    #[test]
    fn required_is_scoped_to_immediate_parent() {
        let extraction = extract(json!({
            "type": "object",
            "properties": {
                "metadata": {
                    "type": "object",
                    "required": ["status"],
                    "properties": { "status": { "type": "string" } }
                },
                "sustainability": {
                    "type": "object",
                    "properties": { "status": { "type": "string" } }
                }
            }
        }));
        assert!(field(&extraction.fields, "metadata.status").required);
        assert!(!field(&extraction.fields, "sustainability.status").required);
    }

    #[test]
    fn ancestor_required_does_not_leak_down() {
        let extraction = extract(json!({
            "type": "object",
            "required": ["name", "details"],
            "properties": {
                "name": { "type": "string" },
                "details": {
                    "type": "object",
                    "properties": { "name": { "type": "string" } }
                }
            }
        }));
        assert!(field(&extraction.fields, "name").required);
        assert!(!field(&extraction.fields, "details.name").required);
    }

    #[test]
    fn required_flattened_objects_are_recorded_on_descendants() {
        let extraction = extract(json!({
            "type": "object",
            "required": ["metadata"],
            "properties": {
                "metadata": {
                    "type": "object",
                    "title": "Part Metadata",
                    "required": ["lifecycle"],
                    "properties": {
                        "lifecycle": {
                            "type": "object",
                            "properties": { "status": { "type": "string" } }
                        },
                        "note": { "type": "string" }
                    }
                },
                "extra": {
                    "type": "object",
                    "properties": { "tag": { "type": "string" } }
                }
            }
        }));
        let status = field(&extraction.fields, "metadata.lifecycle.status");
        assert_eq!(
            status.required_parents,
            vec![
                RequiredParent {
                    key: "metadata".into(),
                    label: "Part Metadata".into()
                },
                RequiredParent {
                    key: "metadata.lifecycle".into(),
                    label: "Lifecycle".into()
                },
            ]
        );
        assert_eq!(
            field(&extraction.fields, "metadata.note").required_parents.len(),
            1
        );
        assert!(field(&extraction.fields, "extra.tag")
            .required_parents
            .is_empty());
    }

    // === Objects ===

    #[test]
    fn nested_objects_are_flattened() {
        let extraction = extract(json!({
            "type": "object",
            "properties": {
                "metadata": {
                    "type": "object",
                    "properties": {
                        "sustainability": {
                            "type": "object",
                            "properties": { "status": { "type": "string" } }
                        }
                    }
                }
            }
        }));
        assert_eq!(extraction.fields.len(), 1);
        let status = &extraction.fields[0];
        assert_eq!(status.key, "metadata.sustainability.status");
        assert_eq!(status.depth, 2);
        assert_eq!(status.parent_key.as_deref(), Some("metadata.sustainability"));
        assert_eq!(status.section, "Metadata");
    }

    #[test]
    fn freeform_object_emits_object_field() {
        let extraction = extract(json!({
            "properties": { "extra": { "type": "object" } }
        }));
        assert_eq!(extraction.fields[0].field_type, FieldType::Object);
    }

    #[test]
    fn property_order_is_preserved() {
        let extraction = extract(json!({
            "properties": {
                "zeta": { "type": "string" },
                "alpha": { "type": "string" },
                "mid": { "type": "string" }
            }
        }));
        let keys: Vec<&str> = extraction.fields.iter().map(|f| f.key.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    // === Arrays ===

    #[test]
    fn array_of_objects_populates_item_fields() {
        let extraction = extract(json!({
            "properties": {
                "materials": {
                    "type": "array",
                    "minItems": 1,
                    "items": {
                        "type": "object",
                        "required": ["name"],
                        "properties": {
                            "name": { "type": "string" },
                            "share": { "type": "number", "maximum": 100 }
                        }
                    }
                }
            }
        }));
        let materials = field(&extraction.fields, "materials");
        assert_eq!(materials.field_type, FieldType::Array);
        assert_eq!(materials.item_type, Some(FieldType::Object));
        assert_eq!(materials.constraints().min_items, Some(1));

        let name = field(&materials.item_fields, "materials[].name");
        assert!(name.required);
        assert!(name.is_array_item);
        assert_eq!(name.depth, 1);
        assert_eq!(name.parent_key.as_deref(), Some("materials[]"));
        assert!(!field(&materials.item_fields, "materials[].share").required);
    }

    #[test]
    fn objects_inside_array_items_stay_composite() {
        let extraction = extract(json!({
            "properties": {
                "sources": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "location": {
                                "type": "object",
                                "required": ["city"],
                                "properties": { "city": { "type": "string" } }
                            }
                        }
                    }
                }
            }
        }));
        let sources = field(&extraction.fields, "sources");
        let location = field(&sources.item_fields, "sources[].location");
        assert_eq!(location.field_type, FieldType::Object);
        let city = field(&location.object_fields, "sources[].location.city");
        assert!(city.required);
        assert_eq!(city.depth, 2);
    }

    #[test]
    fn array_of_arrays_nests_item_field() {
        let extraction = extract(json!({
            "properties": {
                "matrix": {
                    "type": "array",
                    "items": { "type": "array", "items": { "type": "integer" } }
                }
            }
        }));
        let matrix = field(&extraction.fields, "matrix");
        assert_eq!(matrix.item_type, Some(FieldType::Array));
        let inner = field(&matrix.item_fields, "matrix[]");
        assert_eq!(inner.field_type, FieldType::Array);
        assert_eq!(inner.item_type, Some(FieldType::Integer));
    }

    #[test]
    fn array_of_scalars_records_item_type() {
        let extraction = extract(json!({
            "properties": {
                "tags": { "type": "array", "items": { "type": "string", "format": "email" } },
                "kinds": { "type": "array", "items": { "enum": ["x", "y"] } }
            }
        }));
        assert_eq!(
            field(&extraction.fields, "tags").item_type,
            Some(FieldType::Email)
        );
        let kinds = field(&extraction.fields, "kinds");
        assert_eq!(kinds.item_type, Some(FieldType::Select));
        assert_eq!(kinds.options.len(), 2);
    }

    #[test]
    fn scalar_item_constraints_are_kept() {
        let extraction = extract(json!({
            "properties": {
                "scores": {
                    "type": "array",
                    "items": { "type": "integer", "minimum": 0, "maximum": 10 }
                },
                "codes": { "type": "array", "items": { "type": "string", "pattern": "^[A-Z]{3}$" } },
                "plain": { "type": "array", "items": { "type": "string" } }
            }
        }));
        let scores = field(&extraction.fields, "scores");
        assert!(scores.validation.is_none());
        let items = scores.item_validation.clone().unwrap();
        assert_eq!((items.min, items.max), (Some(0.0), Some(10.0)));
        assert_eq!(
            field(&extraction.fields, "codes")
                .item_validation
                .as_ref()
                .and_then(|v| v.pattern.as_deref()),
            Some("^[A-Z]{3}$")
        );
        assert!(field(&extraction.fields, "plain").item_validation.is_none());
    }

    // === Primitive Types ===

    #[test]
    fn primitive_type_mapping() {
        let extraction = extract(json!({
            "properties": {
                "flag": { "type": "boolean" },
                "count": { "type": "integer" },
                "ratio": { "type": "number" },
                "born": { "type": "string", "format": "date" },
                "seen": { "type": "string", "format": "date-time" },
                "at": { "type": "string", "format": "time" },
                "mail": { "type": "string", "format": "email" },
                "site": { "type": "string", "format": "uri" },
                "notes": { "type": "string", "maxLength": 2000 },
                "plain": { "type": "string" },
                "fixed": { "const": 3 },
                "kind": { "type": "string", "enum": ["a", "b"] }
            }
        }));
        let expected = [
            ("flag", FieldType::Checkbox),
            ("count", FieldType::Integer),
            ("ratio", FieldType::Number),
            ("born", FieldType::Date),
            ("seen", FieldType::Datetime),
            ("at", FieldType::Time),
            ("mail", FieldType::Email),
            ("site", FieldType::Url),
            ("notes", FieldType::Textarea),
            ("plain", FieldType::Text),
            ("fixed", FieldType::Integer),
            ("kind", FieldType::Select),
        ];
        for (key, field_type) in expected {
            assert_eq!(field(&extraction.fields, key).field_type, field_type, "{}", key);
        }
    }

    #[test]
    fn pattern_sniffing() {
        assert_eq!(sniff_pattern(r"^\d{4}-\d{2}-\d{2}$"), Some(FieldType::Date));
        assert_eq!(
            sniff_pattern(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}Z$"),
            Some(FieldType::Datetime)
        );
        assert_eq!(sniff_pattern(r"^https?://.+$"), Some(FieldType::Url));
        assert_eq!(sniff_pattern(r"^[A-Z]{3}$"), None);
    }

    #[test]
    fn validation_bag_collects_constraints() {
        let extraction = extract(json!({
            "properties": {
                "code": {
                    "type": "string",
                    "minLength": 2,
                    "maxLength": 8,
                    "pattern": "^[A-Z]+$"
                },
                "weight": {
                    "type": "number",
                    "minimum": 0,
                    "exclusiveMaximum": 500,
                    "multipleOf": 0.5
                },
                "plain": { "type": "string" }
            }
        }));
        let code = field(&extraction.fields, "code").constraints();
        assert_eq!(code.min_length, Some(2));
        assert_eq!(code.max_length, Some(8));
        assert_eq!(code.pattern.as_deref(), Some("^[A-Z]+$"));

        let weight = field(&extraction.fields, "weight").constraints();
        assert_eq!(weight.min, Some(0.0));
        assert_eq!(weight.exclusive_max, Some(500.0));
        assert_eq!(weight.multiple_of, Some(0.5));

        assert!(field(&extraction.fields, "plain").validation.is_none());
    }

    #[test]
    fn draft4_boolean_exclusive_bounds() {
        let extraction = extract(json!({
            "properties": {
                "level": { "type": "integer", "minimum": 1, "exclusiveMinimum": true }
            }
        }));
        let level = field(&extraction.fields, "level").constraints();
        assert_eq!(level.min, None);
        assert_eq!(level.exclusive_min, Some(1.0));
    }

    #[test]
    fn invalid_pattern_is_dropped() {
        let extraction = extract(json!({
            "properties": { "code": { "type": "string", "pattern": "([a-z" } }
        }));
        assert!(field(&extraction.fields, "code").validation.is_none());
        assert_eq!(
            extraction.degradations[0].kind,
            DegradationKind::InvalidPattern
        );
    }

    // === Metadata ===

    #[test]
    fn labels_descriptions_placeholders_defaults() {
        let extraction = extract(json!({
            "properties": {
                "manufacturerPartId": {
                    "type": "string",
                    "description": "Part number",
                    "examples": ["MPI-001"],
                    "default": "MPI-000"
                },
                "name": { "type": "string", "title": "Part Name" }
            }
        }));
        let id = field(&extraction.fields, "manufacturerPartId");
        assert_eq!(id.label, "Manufacturer Part Id");
        assert_eq!(id.description.as_deref(), Some("Part number"));
        assert_eq!(id.placeholder.as_deref(), Some("MPI-001"));
        assert_eq!(id.default, Some(json!("MPI-000")));
        assert_eq!(field(&extraction.fields, "name").label, "Part Name");
    }

    #[test]
    fn sections_inherit_and_specialize() {
        let extraction = extract(json!({
            "properties": {
                "sustainability": {
                    "type": "object",
                    "properties": {
                        "status": { "type": "string" },
                        "recycling": {
                            "type": "object",
                            "title": "Recycling",
                            "properties": { "rate": { "type": "number" } }
                        }
                    }
                },
                "notes": { "type": "string" }
            }
        }));
        assert_eq!(
            field(&extraction.fields, "sustainability.status").section,
            "Sustainability"
        );
        assert_eq!(
            field(&extraction.fields, "sustainability.recycling.rate").section,
            "Recycling"
        );
        assert_eq!(field(&extraction.fields, "notes").section, "General Information");
    }

    // === Degradations ===

    #[test]
    fn unresolved_property_ref_degrades() {
        let extraction = extract(json!({
            "properties": {
                "ok": { "type": "string" },
                "broken": { "$ref": "#/definitions/Nope" }
            }
        }));
        assert_eq!(extraction.fields.len(), 2);
        assert_eq!(field(&extraction.fields, "broken").field_type, FieldType::Text);
        assert_eq!(
            extraction.degradations[0].kind,
            DegradationKind::UnresolvedRef
        );
        assert_eq!(extraction.degradations[0].path, "#/properties/broken/$ref");
    }

    #[test]
    fn self_referencing_schema_is_truncated() {
        let schema = json!({
            "type": "object",
            "properties": {
                "name": { "type": "string" },
                "child": { "$ref": "#" }
            }
        });
        let options = InterpretOptions::new().max_depth(3);
        let extraction = extract_fields(&schema, &options).unwrap();

        assert!(extraction
            .fields
            .iter()
            .any(|f| f.key == "child.child.child.name"));
        assert!(!extraction
            .fields
            .iter()
            .any(|f| f.key.starts_with("child.child.child.child")));
        assert!(extraction
            .degradations
            .iter()
            .any(|d| d.kind == DegradationKind::DepthExceeded));
    }
}
