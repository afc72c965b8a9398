//! Agent-facing record shapes.
//!
//! Upstream documents are loosely shaped: most descriptive fields are either
//! plain strings or small objects (`{"has_raw_value": ..}`, `{"term": {..}}`).
//! The normalisers here pick out the fields the tools promise and keep the
//! remainder verbatim under `metadata`.

pub mod biosample;
pub mod bounded;
pub mod data_object;
pub mod study;

pub use biosample::Biosample;
pub use bounded::{Bounded, RecordLimit};
pub use data_object::DataObject;
pub use study::Study;

use crate::error::{NmdcError, Result};
use serde_json::{Map, Value};

/// Split an upstream record into its object map, requiring a string `id`.
pub(crate) fn into_object(record: Value, entity: &str) -> Result<(String, Map<String, Value>)> {
    let Value::Object(mut object) = record else {
        return Err(NmdcError::upstream_malformed(
            entity,
            "record is not a JSON object",
        ));
    };
    match object.remove("id") {
        Some(Value::String(id)) => Ok((id, object)),
        _ => Err(NmdcError::upstream_malformed(
            entity,
            "record has no string 'id'",
        )),
    }
}

/// Read the identifier of a raw record without consuming it.
pub(crate) fn record_id(record: &Value, entity: &str) -> Result<String> {
    record
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| NmdcError::upstream_malformed(entity, "record has no string 'id'"))
}

/// Plain text form of a scalar or a `has_raw_value` wrapper.
pub(crate) fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(object) => object.get("has_raw_value").and_then(text),
        _ => None,
    }
}

/// Label of an ontology-term slot: term name, else term id, else raw value.
pub(crate) fn term_label(value: &Value) -> Option<String> {
    let term = value.get("term");
    term.and_then(|t| t.get("name"))
        .and_then(text)
        .or_else(|| term.and_then(|t| t.get("id")).and_then(text))
        .or_else(|| text(value))
}

pub(crate) fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(object) => object
            .get("has_numeric_value")
            .or_else(|| object.get("has_raw_value"))
            .and_then(number),
        _ => None,
    }
}

pub(crate) fn string_list(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text).collect(),
        other => text(other).into_iter().collect(),
    }
}

pub(crate) fn take_with<T>(
    object: &mut Map<String, Value>,
    key: &str,
    convert: impl Fn(&Value) -> Option<T>,
) -> Option<T> {
    object.remove(key).as_ref().and_then(convert)
}
