//! Schema and data document loading.
//!
//! Handles loading JSON documents from files and strings, and navigating
//! local JSON Pointer fragments inside a loaded document.

use std::path::Path;

use serde_json::Value;

use crate::error::InterpretError;

/// Load a JSON document from a file path.
///
/// # Errors
///
/// Returns `InterpretError::FileNotFound` if the file doesn't exist,
/// or `InterpretError::InvalidJson` if the file isn't valid JSON.
pub fn load_schema(path: &Path) -> Result<Value, InterpretError> {
    if !path.exists() {
        return Err(InterpretError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = std::fs::read_to_string(path).map_err(|source| InterpretError::ReadError {
        path: path.to_path_buf(),
        source,
    })?;

    load_schema_str(&content)
}

/// Load a JSON document from a string.
///
/// # Errors
///
/// Returns `InterpretError::InvalidJson` if the string isn't valid JSON.
pub fn load_schema_str(content: &str) -> Result<Value, InterpretError> {
    serde_json::from_str(content).map_err(|source| InterpretError::InvalidJson { source })
}

/// True for `$ref` values that point inside the current document.
pub fn is_local_ref(reference: &str) -> bool {
    reference.starts_with('#')
}

/// Navigate a JSON Pointer fragment (e.g. `#/definitions/Part`).
///
/// `#` alone addresses the document root. Array segments are indexed by
/// position. Returns `None` when any segment is missing.
pub fn navigate_fragment<'a>(root: &'a Value, fragment: &str) -> Option<&'a Value> {
    let path = fragment.trim_start_matches('#').trim_start_matches('/');
    if path.is_empty() {
        return Some(root);
    }

    let mut current = root;
    for part in path.split('/') {
        // Unescape JSON Pointer encoding (~1 = /, ~0 = ~)
        let key = part.replace("~1", "/").replace("~0", "~");
        current = match current {
            Value::Object(map) => map.get(&key)?,
            Value::Array(arr) => arr.get(key.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn load_schema_valid_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"{{"type": "object"}}"#).unwrap();

        let schema = load_schema(file.path()).unwrap();
        assert_eq!(schema["type"], "object");
    }

    #[test]
    fn load_schema_file_not_found() {
        let result = load_schema(Path::new("/nonexistent/path.json"));
        assert!(matches!(result, Err(InterpretError::FileNotFound { .. })));
    }

    #[test]
    fn load_schema_invalid_json() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid json").unwrap();

        let result = load_schema(file.path());
        assert!(matches!(result, Err(InterpretError::InvalidJson { .. })));
    }

    #[test]
    fn load_schema_str_invalid() {
        let result = load_schema_str("not json");
        assert!(matches!(result, Err(InterpretError::InvalidJson { .. })));
    }

    #[test]
    fn local_refs() {
        assert!(is_local_ref("#/definitions/Part"));
        assert!(is_local_ref("#"));
        assert!(!is_local_ref("common.json#/definitions/Part"));
        assert!(!is_local_ref("https://example.com/schema.json"));
    }

    #[test]
    fn navigate_definitions_and_components() {
        let doc = json!({
            "definitions": { "Part": { "type": "object" } },
            "components": { "schemas": { "Item": { "type": "string" } } }
        });
        assert_eq!(
            navigate_fragment(&doc, "#/definitions/Part"),
            Some(&json!({ "type": "object" }))
        );
        assert_eq!(
            navigate_fragment(&doc, "#/components/schemas/Item"),
            Some(&json!({ "type": "string" }))
        );
        assert_eq!(navigate_fragment(&doc, "#"), Some(&doc));
        assert_eq!(navigate_fragment(&doc, "#/definitions/Missing"), None);
    }

    #[test]
    fn navigate_escaped_and_indexed_segments() {
        let doc = json!({
            "a/b": { "c~d": 1 },
            "list": [{ "x": true }]
        });
        assert_eq!(navigate_fragment(&doc, "#/a~1b/c~0d"), Some(&json!(1)));
        assert_eq!(navigate_fragment(&doc, "#/list/0/x"), Some(&json!(true)));
        assert_eq!(navigate_fragment(&doc, "#/list/5"), None);
    }
}
