//! Diff extraction for schema metadata change events.
//!
//! Compares the previous and current editable-schema aspect payloads and
//! isolates the single changed field. The comparison ignores element order
//! and classifies the change as one of:
//!
//! 1. an added list item (description added to a field, other fields already
//!    had descriptions),
//! 2. a changed value (an existing description was edited),
//! 3. a type change (first field description ever written to the schema).
//!
//! The first qualifying record wins; at most one diff is produced per event.

use crate::error::Result;
use crate::event::ChangeEvent;
use serde_json::Value;

const FIELD_INFO_KEY: &str = "editableSchemaFieldInfo";
const FIELD_PATH_KEY: &str = "fieldPath";
const DESCRIPTION_KEY: &str = "description";

/// The changed field isolated from a schema metadata diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDiff {
    pub field_path: String,
    pub description: String,
}

impl FieldDiff {
    /// Build a diff from a raw field-info record. Returns `None` unless both
    /// `fieldPath` and `description` are present: a record missing either is
    /// a non-description change (e.g. a tag edit) and must not propagate.
    pub fn from_record(record: &Value) -> Option<FieldDiff> {
        let field_path = record.get(FIELD_PATH_KEY)?.as_str()?;
        let description = record.get(DESCRIPTION_KEY)?.as_str()?;
        Some(FieldDiff {
            field_path: field_path.to_string(),
            description: description.to_string(),
        })
    }
}

/// Extract the changed field-info record from a change event.
///
/// An absent previous aspect is treated as empty (the type-change branch
/// still applies); malformed JSON in either payload is a hard failure for
/// this event only.
pub fn extract_field_diff(event: &ChangeEvent) -> Result<Option<Value>> {
    let Some(current) = event.aspect_json()? else {
        return Ok(None);
    };
    let previous = event.previous_aspect_json()?.unwrap_or(Value::Null);
    Ok(aspect_value_diff(&previous, &current))
}

/// Structural difference between two aspect values, ignoring element order.
///
/// Returns the current-side field-info record behind the first qualifying
/// classification, or `None` when nothing changed in a way that carries a
/// `fieldPath`.
pub fn aspect_value_diff(previous: &Value, current: &Value) -> Option<Value> {
    let current_fields = field_info_list(current);
    let previous_fields = field_info_list(previous);

    if let (Some(previous_fields), Some(current_fields)) = (previous_fields, current_fields) {
        // Added list item: a record whose fieldPath has no counterpart in the
        // previous list.
        for record in current_fields {
            if let Some(path) = record_field_path(record) {
                let existed = previous_fields
                    .iter()
                    .any(|prev| record_field_path(prev) == Some(path));
                if !existed {
                    return Some(record.clone());
                }
            }
        }

        // Changed value: a record that differs from its previous counterpart.
        for record in current_fields {
            if let Some(path) = record_field_path(record) {
                let counterpart = previous_fields
                    .iter()
                    .find(|prev| record_field_path(prev) == Some(path));
                if let Some(previous_record) = counterpart {
                    if previous_record != record {
                        return Some(record.clone());
                    }
                }
            }
        }

        return None;
    }

    // Type change: the previous value had no field-info list at all and the
    // current one does. First record wins.
    if previous_fields.is_none() {
        if let Some(current_fields) = current_fields {
            return current_fields.first().cloned();
        }
    }

    None
}

fn field_info_list(value: &Value) -> Option<&Vec<Value>> {
    value.get(FIELD_INFO_KEY)?.as_array()
}

fn record_field_path(record: &Value) -> Option<&str> {
    record.get(FIELD_PATH_KEY)?.as_str()
}
