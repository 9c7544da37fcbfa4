//! Inbound payload checks, in order, stopping at the first failure.

use contract::ImagePayload;
use serde_json::Value;

use crate::error::ApiError;

/// Run the validation pipeline over a raw request body.
///
/// 1. the body must be JSON (and not `null`), else a processing fault;
/// 2. `imageData` must be present and truthy, else `MissingImage`;
/// 3. it must be a string starting with `data:image/`.
pub fn image_payload(body: &[u8]) -> Result<ImagePayload, ApiError> {
    let json: Value = serde_json::from_slice(body)?;
    if json.is_null() {
        return Err(ApiError::internal("request body is null"));
    }
    match json.get("imageData") {
        Some(value) if is_truthy(value) => match value {
            Value::String(data) => Ok(ImagePayload::new(data.as_str())?),
            other => Err(ApiError::internal(format!(
                "imageData is not a string: {}",
                kind(other)
            ))),
        },
        _ => Err(ApiError::MissingImage),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
