//! Shape validation helpers for parsed model output.

use serde_json::{Map, Value};

use crate::generation::GenerationError;
use crate::llm_client::normalize::{normalize, Shape};
use crate::llm_client::parse::parse;

/// Normalize + parse in one step.
pub fn parse_reply(raw: &str, shape: Shape) -> Result<Value, GenerationError> {
    Ok(parse(&normalize(raw, shape))?)
}

/// Accepts an object, or takes the first element when the model wrapped it in a list.
pub fn first_object(value: Value) -> Result<Map<String, Value>, GenerationError> {
    match value {
        Value::Object(map) => Ok(map),
        Value::Array(items) => match items.into_iter().next() {
            Some(Value::Object(map)) => Ok(map),
            Some(_) => Err(GenerationError::ShapeInvalid(
                "list did not start with an object".to_string(),
            )),
            None => Err(GenerationError::ShapeInvalid("empty list".to_string())),
        },
        other => Err(GenerationError::ShapeInvalid(format!(
            "expected an object, got {}",
            kind_of(&other)
        ))),
    }
}

pub fn require_keys(map: &Map<String, Value>, keys: &[&str]) -> Result<(), GenerationError> {
    match keys.iter().find(|key| !map.contains_key(**key)) {
        Some(missing) => Err(GenerationError::ShapeInvalid(format!(
            "missing key '{missing}'"
        ))),
        None => Ok(()),
    }
}

/// A non-empty string field.
pub fn require_text(map: &Map<String, Value>, key: &str) -> Result<String, GenerationError> {
    match map.get(key) {
        Some(Value::String(s)) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        Some(_) => Err(GenerationError::ShapeInvalid(format!(
            "'{key}' must be non-empty text"
        ))),
        None => Err(GenerationError::ShapeInvalid(format!("missing key '{key}'"))),
    }
}

/// Strings pass through; any other value is rendered as compact JSON text.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
