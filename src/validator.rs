use serde_json::Value;
use thiserror::Error;
use tracing::error;

use crate::schema::ResponseSchema;

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Invalid JSON response from API: {raw}")]
    Parse { raw: String },
    #[error("API response is missing one or more required top-level fields.")]
    MissingFields,
    #[error("API response does not match the expected shape: {0}")]
    Shape(String),
}

/// JavaScript-style truthiness, which is what the required-field check keys on.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Parses `raw` and checks the schema's required top-level keys.
///
/// The check is shallow: a required key nested inside a present top-level
/// object is not looked at. On success the parsed value is returned as is.
pub fn validate(raw: &str, schema: &ResponseSchema) -> Result<Value, ValidationError> {
    let parsed: Value = serde_json::from_str(raw).map_err(|e| {
        error!("❌ Failed to parse JSON response ({}): {}", e, raw);
        ValidationError::Parse { raw: raw.to_string() }
    })?;

    let complete = schema
        .required_top_level()
        .iter()
        .all(|key| parsed.get(key).is_some_and(is_truthy));

    if !complete {
        return Err(ValidationError::MissingFields);
    }
    Ok(parsed)
}
