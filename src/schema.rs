//! Typed views over JSON Schema nodes.
//!
//! Raw schema nodes are `serde_json::Value`s. [`SchemaNode::classify`] turns a
//! keyword map into a tagged view so the resolver and extractor can match on
//! the node shape instead of probing for keywords ad hoc.

use serde_json::{Map, Value};

use crate::types::COMPOSITION_KEYWORDS;

/// Scalar JSON Schema types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Number,
    Integer,
    Boolean,
}

/// Shape of a single schema node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SchemaNode<'a> {
    /// Still carries `$ref`, `allOf`, `anyOf` or `oneOf`.
    Composed,
    /// Object with declared properties.
    Object {
        properties: &'a Map<String, Value>,
        required: &'a [Value],
    },
    /// Object without declared properties.
    FreeformObject,
    Array {
        items: Option<&'a Value>,
    },
    /// `enum` node.
    Choice {
        options: &'a [Value],
    },
    /// `const` node.
    Constant {
        value: &'a Value,
    },
    Primitive {
        kind: PrimitiveKind,
        format: Option<&'a str>,
    },
    /// Nothing extractable (`{}`, `true`, a bare `null` type).
    Empty,
}

impl<'a> SchemaNode<'a> {
    /// Classify a keyword map.
    ///
    /// Enumerations win over the declared type so `{"type": "string",
    /// "enum": [...]}` becomes a choice. A missing `type` is inferred from
    /// `properties` or `items`.
    pub fn classify(map: &'a Map<String, Value>) -> Self {
        if COMPOSITION_KEYWORDS.iter().any(|k| map.contains_key(*k)) {
            return SchemaNode::Composed;
        }

        if let Some(Value::Array(options)) = map.get("enum") {
            return SchemaNode::Choice { options };
        }
        if let Some(value) = map.get("const") {
            return SchemaNode::Constant { value };
        }

        let format = map.get("format").and_then(Value::as_str);
        match declared_type(map) {
            Some("object") => object_node(map),
            Some("array") => SchemaNode::Array {
                items: map.get("items"),
            },
            Some("string") => SchemaNode::Primitive {
                kind: PrimitiveKind::String,
                format,
            },
            Some("number") => SchemaNode::Primitive {
                kind: PrimitiveKind::Number,
                format,
            },
            Some("integer") => SchemaNode::Primitive {
                kind: PrimitiveKind::Integer,
                format,
            },
            Some("boolean") => SchemaNode::Primitive {
                kind: PrimitiveKind::Boolean,
                format,
            },
            Some(_) => SchemaNode::Empty,
            None => {
                if map.contains_key("properties") {
                    object_node(map)
                } else if map.contains_key("items") {
                    SchemaNode::Array {
                        items: map.get("items"),
                    }
                } else if format.is_some() || map.contains_key("pattern") {
                    SchemaNode::Primitive {
                        kind: PrimitiveKind::String,
                        format,
                    }
                } else {
                    SchemaNode::Empty
                }
            }
        }
    }

    /// Classify any value; non-object schemas (`true`, `false`) are empty.
    pub fn of(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Self::classify(map),
            _ => SchemaNode::Empty,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(
            self,
            SchemaNode::Object { .. } | SchemaNode::FreeformObject | SchemaNode::Array { .. }
        )
    }
}

fn object_node(map: &Map<String, Value>) -> SchemaNode<'_> {
    match map.get("properties").and_then(Value::as_object) {
        Some(properties) if !properties.is_empty() => SchemaNode::Object {
            properties,
            required: map
                .get("required")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        },
        _ => SchemaNode::FreeformObject,
    }
}

/// The node's `type`; for a type list, the first non-null entry.
pub fn declared_type(map: &Map<String, Value>) -> Option<&str> {
    match map.get("type")? {
        Value::String(t) => Some(t.as_str()),
        Value::Array(types) => types
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

/// The `required` names declared on a node.
pub fn required_names(map: &Map<String, Value>) -> Vec<String> {
    map.get("required")
        .and_then(Value::as_array)
        .map(|arr| {
            arr.iter()
                .filter_map(|v| v.as_str().map(String::from))
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn classify(value: &Value) -> SchemaNode<'_> {
        SchemaNode::of(value)
    }

    #[test]
    fn composed_nodes_detected() {
        let node = json!({ "$ref": "#/definitions/Part" });
        assert_eq!(classify(&node), SchemaNode::Composed);

        let node = json!({ "type": "object", "allOf": [] });
        assert_eq!(classify(&node), SchemaNode::Composed);
    }

    #[test]
    fn enum_wins_over_type() {
        let node = json!({ "type": "string", "enum": ["a", "b"] });
        assert!(matches!(classify(&node), SchemaNode::Choice { options } if options.len() == 2));
    }

    #[test]
    fn object_with_properties() {
        let node = json!({
            "type": "object",
            "required": ["id"],
            "properties": { "id": { "type": "string" } }
        });
        match classify(&node) {
            SchemaNode::Object {
                properties,
                required,
            } => {
                assert!(properties.contains_key("id"));
                assert_eq!(required, &[json!("id")]);
            }
            other => panic!("expected object, got {:?}", other),
        }
    }

    #[test]
    fn object_type_inferred_from_properties() {
        let node = json!({ "properties": { "id": { "type": "string" } } });
        assert!(matches!(classify(&node), SchemaNode::Object { .. }));
    }

    #[test]
    fn empty_object_is_freeform() {
        let node = json!({ "type": "object" });
        assert_eq!(classify(&node), SchemaNode::FreeformObject);
        let node = json!({ "type": "object", "properties": {} });
        assert_eq!(classify(&node), SchemaNode::FreeformObject);
    }

    #[test]
    fn nullable_type_list_uses_first_non_null() {
        let node = json!({ "type": ["null", "integer"] });
        assert_eq!(
            classify(&node),
            SchemaNode::Primitive {
                kind: PrimitiveKind::Integer,
                format: None
            }
        );
    }

    #[test]
    fn primitive_carries_format() {
        let node = json!({ "type": "string", "format": "date" });
        assert_eq!(
            classify(&node),
            SchemaNode::Primitive {
                kind: PrimitiveKind::String,
                format: Some("date")
            }
        );
    }

    #[test]
    fn boolean_schema_is_empty() {
        assert_eq!(classify(&json!(true)), SchemaNode::Empty);
        assert_eq!(classify(&json!({})), SchemaNode::Empty);
    }

    #[test]
    fn required_names_skips_non_strings() {
        let node = json!({ "required": ["a", 1, "b"] });
        assert_eq!(required_names(node.as_object().unwrap()), vec!["a", "b"]);
    }
}
