//! Rendering of untyped runner payloads into log text

use serde_json::Value;

/// Name of a JSON value's shape, for diagnostics
#[must_use]
pub fn value_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Text of a scalar; strings unquoted, null empty, everything else as JSON
#[must_use]
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// Text of a command's main result: the `data` field of a record, the
/// payload itself otherwise
pub(crate) fn result_text(payload: &Value) -> String {
    match payload {
        Value::Object(record) => match record.get("data") {
            Some(data) => value_text(data),
            None => payload.to_string(),
        },
        other => value_text(other),
    }
}

/// One row of a record list: its values joined with " / " in field order
pub(crate) fn row_text(row: &Value) -> String {
    match row {
        Value::Object(record) => record
            .values()
            .map(value_text)
            .collect::<Vec<_>>()
            .join(" / "),
        Value::Array(items) => items.iter().map(value_text).collect::<Vec<_>>().join(" / "),
        other => value_text(other),
    }
}

/// Log lines for a payload of any shape, without interpreting its content
#[must_use]
pub fn render_payload_lines(payload: &Value) -> Vec<String> {
    match payload {
        Value::Null => Vec::new(),
        Value::Object(record) => {
            if let Some(headline) = record.get("headline") {
                let mut lines = vec![format!("!!!{}!!!", value_text(headline))];
                lines.extend(nested_data_lines(record.get("data")));
                lines
            } else {
                vec![result_text(payload)]
            }
        }
        Value::Array(rows) => rows.iter().map(row_text).collect(),
        other => vec![value_text(other)],
    }
}

/// Lines for the nested `data` of a headline record
pub(crate) fn nested_data_lines(data: Option<&Value>) -> Vec<String> {
    match data {
        Some(Value::Array(rows)) => rows.iter().map(row_text).collect(),
        Some(Value::String(text)) => vec![text.clone()],
        other => vec![format!(
            "unhandled payload shape: {}",
            other.map_or("null", value_type)
        )],
    }
}
