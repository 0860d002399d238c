//! JSON decoding helpers for transport implementations.
//!
//! The service reports settable variables as a flat JSON object of plain
//! scalars (`{"extern_int": 2, "extern_text": "world"}`) and detect replies
//! as a JSON document of object states.  These helpers turn both into the
//! typed records the client consumes.

use aidk_types::{AidkError, TypedValue, VariableSet};
use serde_json::{Map, Number, Value};

use crate::transport::DetectReply;

/// Decode a flat JSON object of scalars into a [`VariableSet`].
///
/// Integers that fit in `i32` become `Int`, other numbers `Double`; `null`
/// becomes an empty value (a variable without a declared kind).
///
/// # Errors
///
/// [`AidkError::Transport`] for malformed JSON, a non-object document, or an
/// array/object value.
pub fn decode_variables(raw: &str) -> Result<VariableSet, AidkError> {
    let doc: Value = serde_json::from_str(raw)
        .map_err(|e| AidkError::Transport(format!("malformed variables payload: {e}")))?;
    let Value::Object(map) = doc else {
        return Err(AidkError::Transport(
            "variables payload must be a JSON object".to_string(),
        ));
    };
    map.into_iter()
        .map(|(name, value)| decode_scalar(&name, value).map(|v| (name, v)))
        .collect()
}

/// Encode a [`VariableSet`] as a flat JSON object of scalars.  Empty values
/// encode as `null`.
pub fn encode_variables(vars: &VariableSet) -> String {
    let map: Map<String, Value> = vars
        .iter()
        .map(|(name, value)| (name.to_string(), encode_scalar(value)))
        .collect();
    Value::Object(map).to_string()
}

/// Decode a detect reply document.
///
/// # Errors
///
/// [`AidkError::Transport`] when the document does not match
/// [`DetectReply`] (including coordinate ids other than `0`/`1`).
pub fn decode_detect_reply(raw: &str) -> Result<DetectReply, AidkError> {
    serde_json::from_str(raw)
        .map_err(|e| AidkError::Transport(format!("malformed detect reply: {e}")))
}

fn decode_scalar(name: &str, value: Value) -> Result<TypedValue, AidkError> {
    match value {
        Value::Null => Ok(TypedValue::empty()),
        Value::Bool(b) => Ok(TypedValue::of(b)),
        Value::String(s) => Ok(TypedValue::of(s)),
        Value::Number(n) => Ok(decode_number(&n)),
        Value::Array(_) | Value::Object(_) => Err(AidkError::Transport(format!(
            "variable '{name}' has a non-scalar value"
        ))),
    }
}

fn decode_number(n: &Number) -> TypedValue {
    match n.as_i64().and_then(|i| i32::try_from(i).ok()) {
        Some(i) => TypedValue::of(i),
        None => TypedValue::of(n.as_f64().unwrap_or_default()),
    }
}

fn encode_scalar(value: &TypedValue) -> Value {
    match value {
        TypedValue::Empty => Value::Null,
        TypedValue::Int(v) => Value::from(*v),
        TypedValue::Double(v) => Value::from(*v),
        TypedValue::Float(v) => Value::from(f64::from(*v)),
        TypedValue::Bool(v) => Value::Bool(*v),
        TypedValue::Text(v) => Value::String(v.clone()),
    }
}
