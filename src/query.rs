//! Read-only queries over an extracted field list.

use serde::Serialize;

use crate::types::{FieldType, FormField};

/// Fields sharing one section, in first-seen order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldGroup<'f> {
    pub section: &'f str,
    pub fields: Vec<&'f FormField>,
}

/// Group fields by section. Sections appear in the order their first field
/// was extracted; fields keep extraction order within a section.
pub fn field_groups(fields: &[FormField]) -> Vec<FieldGroup<'_>> {
    let mut groups: Vec<FieldGroup<'_>> = Vec::new();
    for field in fields {
        match groups.iter_mut().find(|g| g.section == field.section) {
            Some(group) => group.fields.push(field),
            None => groups.push(FieldGroup {
                section: &field.section,
                fields: vec![field],
            }),
        }
    }
    groups
}

pub fn required_fields(fields: &[FormField]) -> Vec<&FormField> {
    fields.iter().filter(|f| f.required).collect()
}

pub fn optional_fields(fields: &[FormField]) -> Vec<&FormField> {
    fields.iter().filter(|f| !f.required).collect()
}

/// Look a field up by its dotted key.
///
/// Keys containing the array item marker (`materials[].name`) are searched
/// among item and composite object fields too.
pub fn field_by_key<'f>(fields: &'f [FormField], key: &str) -> Option<&'f FormField> {
    fields.iter().find_map(|field| {
        if field.key == key {
            return Some(field);
        }
        if key.starts_with(&field.key) {
            field_by_key(&field.item_fields, key)
                .or_else(|| field_by_key(&field.object_fields, key))
        } else {
            None
        }
    })
}

pub fn fields_of_type(fields: &[FormField], field_type: FieldType) -> Vec<&FormField> {
    fields.iter().filter(|f| f.field_type == field_type).collect()
}
