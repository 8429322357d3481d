//! Label and section inference.
//!
//! A top-level property picks its section once; descendants inherit it.
//! Only a container (object or array) `title` names a section, at the top
//! level or below. A leaf's `title` is its label and never moves the leaf
//! out of the inherited section.

use heck::ToTitleCase;

use crate::resolver::ResolvedProperty;
use crate::types::InterpretOptions;

/// Well-known top-level keys and the section they belong to.
const KEY_SECTIONS: &[(&str, &str)] = &[
    ("metadata", "Metadata"),
    ("identification", "Identification"),
    ("manufacturerPartId", "Identification"),
    ("customerPartId", "Identification"),
    ("partTypeInformation", "Part Type Information"),
    ("sustainability", "Sustainability"),
    ("materials", "Materials"),
    ("physicalDimension", "Physical Dimensions"),
    ("physicalDimensions", "Physical Dimensions"),
    ("operation", "Operation"),
    ("handling", "Handling"),
    ("characteristics", "Characteristics"),
    ("commercial", "Commercial"),
    ("sources", "Sources"),
    ("additionalData", "Additional Data"),
];

/// Description fragments (lowercase) and the section they suggest.
const DESCRIPTION_KEYWORDS: &[(&str, &str)] = &[
    ("sustainab", "Sustainability"),
    ("carbon footprint", "Sustainability"),
    ("material", "Materials"),
    ("dimension", "Physical Dimensions"),
    ("weight", "Physical Dimensions"),
    ("manufactur", "Manufacturing"),
    ("identif", "Identification"),
];

/// Expand a camelCase or snake_case key into Title Case words.
pub fn humanize(key: &str) -> String {
    key.to_title_case()
}

/// Label for a field: schema `title`, else the humanized property name.
pub fn field_label(name: &str, resolved: &ResolvedProperty) -> String {
    match resolved.get_str("title").map(str::trim) {
        Some(title) if !title.is_empty() => title.to_string(),
        _ => humanize(name),
    }
}

/// Section of a top-level property.
///
/// Priority: configured override, the title of a container node, the static
/// key table, description keywords, then the configured default.
pub fn top_level_section(
    name: &str,
    resolved: &ResolvedProperty,
    options: &InterpretOptions,
) -> String {
    if let Some(section) = options.section_overrides.get(name) {
        return section.clone();
    }
    if let Some(title) = container_title(resolved) {
        return title;
    }
    if let Some(section) = table_section(name) {
        return section.to_string();
    }
    if let Some(section) = resolved.get_str("description").and_then(description_section) {
        return section.to_string();
    }
    options.default_section.clone()
}

/// Section of a nested property, inherited unless its own node says otherwise.
pub fn nested_section(
    key: &str,
    resolved: &ResolvedProperty,
    inherited: &str,
    options: &InterpretOptions,
) -> String {
    if let Some(section) = options.section_overrides.get(key) {
        return section.clone();
    }
    container_title(resolved).unwrap_or_else(|| inherited.to_string())
}

fn container_title(resolved: &ResolvedProperty) -> Option<String> {
    if !resolved.node().is_container() {
        return None;
    }
    resolved
        .get_str("title")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}

fn table_section(name: &str) -> Option<&'static str> {
    KEY_SECTIONS
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, section)| *section)
}

fn description_section(description: &str) -> Option<&'static str> {
    let description = description.to_lowercase();
    DESCRIPTION_KEYWORDS
        .iter()
        .find(|(keyword, _)| description.contains(keyword))
        .map(|(_, section)| *section)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn resolved(value: Value) -> ResolvedProperty {
        ResolvedProperty::from(value.as_object().unwrap().clone())
    }

    #[test]
    fn humanize_camel_and_snake_case() {
        assert_eq!(humanize("manufacturerPartId"), "Manufacturer Part Id");
        assert_eq!(humanize("part_type_information"), "Part Type Information");
        assert_eq!(humanize("name"), "Name");
    }

    #[test]
    fn label_prefers_title() {
        let node = resolved(json!({ "type": "string", "title": "Part Name" }));
        assert_eq!(field_label("nameAtManufacturer", &node), "Part Name");

        let node = resolved(json!({ "type": "string", "title": "  " }));
        assert_eq!(field_label("nameAtManufacturer", &node), "Name At Manufacturer");
    }

    #[test]
    fn container_title_names_section() {
        let node = resolved(json!({
            "type": "object",
            "title": "Carbon Data",
            "properties": { "co2": { "type": "number" } }
        }));
        let opts = InterpretOptions::default();
        assert_eq!(top_level_section("sustainability", &node, &opts), "Carbon Data");
    }

    #[test]
    fn primitive_title_does_not_name_section() {
        let node = resolved(json!({ "type": "string", "title": "Part Id" }));
        let opts = InterpretOptions::default();
        assert_eq!(
            top_level_section("manufacturerPartId", &node, &opts),
            "Identification"
        );
    }

    #[test]
    fn description_keywords_classify() {
        let node = resolved(json!({
            "type": "number",
            "description": "Total weight of the part in kg"
        }));
        let opts = InterpretOptions::default();
        assert_eq!(top_level_section("mass", &node, &opts), "Physical Dimensions");
    }

    #[test]
    fn falls_back_to_default_section() {
        let node = resolved(json!({ "type": "string" }));
        let opts = InterpretOptions::default();
        assert_eq!(top_level_section("notes", &node, &opts), "General Information");

        let opts = InterpretOptions::new().default_section("Other");
        assert_eq!(top_level_section("notes", &node, &opts), "Other");
    }

    #[test]
    fn overrides_win() {
        let node = resolved(json!({ "type": "object", "title": "Meta", "properties": { "a": {} } }));
        let opts = InterpretOptions::new()
            .section_override("metadata", "Header")
            .section_override("metadata.status", "Lifecycle");
        assert_eq!(top_level_section("metadata", &node, &opts), "Header");

        let leaf = resolved(json!({ "type": "string" }));
        assert_eq!(
            nested_section("metadata.status", &leaf, "Header", &opts),
            "Lifecycle"
        );
        assert_eq!(nested_section("metadata.other", &leaf, "Header", &opts), "Header");
    }

    #[test]
    fn nested_leaf_title_keeps_inherited_section() {
        let leaf = resolved(json!({ "type": "number", "title": "Recycled Share" }));
        let opts = InterpretOptions::default();
        assert_eq!(
            nested_section("sustainability.share", &leaf, "Sustainability", &opts),
            "Sustainability"
        );
        assert_eq!(field_label("share", &leaf), "Recycled Share");
    }

    #[test]
    fn nested_container_title_overrides_inherited() {
        let node = resolved(json!({
            "type": "object",
            "title": "Recycling",
            "properties": { "rate": { "type": "number" } }
        }));
        let opts = InterpretOptions::default();
        assert_eq!(
            nested_section("sustainability.recycling", &node, "Sustainability", &opts),
            "Recycling"
        );
    }
}
