//! `aidk-types` – shared data model of the AIDK client.
//!
//! # Modules
//!
//! - [`value`] – [`TypedValue`]: closed tagged union over `i32`, `f64`,
//!   `f32`, `bool` and `String`, with generic typed access.
//! - [`variables`] – [`VariableSet`], [`SettableVariables`] and
//!   [`Response`]: settable variables and their schema validation.
//! - [`detection`] – [`DetectionInstance`] and [`ObjectState`]: decoded
//!   detection records.
//! - [`status`] – [`AiStatus`], [`AiState`], [`CameraIntrinsic`] and
//!   [`RuntimeInfo`].

pub mod detection;
pub mod status;
pub mod value;
pub mod variables;

pub use detection::{CoordinateFrame, DetectionInstance, ObjectState};
pub use status::{AiState, AiStatus, CameraIntrinsic, RuntimeInfo};
pub use value::{Primitive, TypedValue, ValueKind};
pub use variables::{Response, SettableVariables, VariableSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Global error type spanning typed-value access, variable validation,
/// result extraction and the transport boundary.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AidkError {
    #[error("Type mismatch: expected {expected}, found {}", kind_name(.found))]
    TypeMismatch {
        expected: ValueKind,
        found: Option<ValueKind>,
    },

    #[error(
        "Type mismatch for variable '{name}': declared {}, submitted {}",
        kind_name(.declared),
        kind_name(.submitted)
    )]
    VariableTypeMismatch {
        name: String,
        declared: Option<ValueKind>,
        submitted: Option<ValueKind>,
    },

    #[error("Value {value} does not fit {declared} variable '{name}'")]
    VariableOutOfRange {
        name: String,
        declared: ValueKind,
        value: String,
    },

    #[error("Unknown variable: '{0}'")]
    UnknownVariable(String),

    #[error("Unsupported result key: '{0}'")]
    UnknownKey(String),

    #[error("Object not detected: '{0}'")]
    ObjectNotFound(String),

    #[error("Instance index {index} out of range for {len} instance(s)")]
    IndexOutOfRange { index: i64, len: usize },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0} s")]
    Timeout(f32),

    #[error("AI service is not ready")]
    NotReady,
}

impl AidkError {
    /// Machine-readable code carried in a [`Response`].  Never `0`.
    pub fn code(&self) -> i32 {
        match self {
            AidkError::Transport(_) | AidkError::Timeout(_) | AidkError::NotReady => 1,
            AidkError::UnknownVariable(_) => 2,
            AidkError::TypeMismatch { .. }
            | AidkError::VariableTypeMismatch { .. }
            | AidkError::VariableOutOfRange { .. } => 3,
            AidkError::UnknownKey(_) => 4,
            AidkError::ObjectNotFound(_) => 5,
            AidkError::IndexOutOfRange { .. } => 6,
        }
    }
}

fn kind_name(kind: &Option<ValueKind>) -> String {
    match kind {
        Some(k) => k.to_string(),
        None => "empty".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_codes_are_nonzero_and_distinct() {
        let errs = [
            AidkError::Transport("x".into()),
            AidkError::UnknownVariable("x".into()),
            AidkError::TypeMismatch {
                expected: ValueKind::Int,
                found: None,
            },
            AidkError::UnknownKey("x".into()),
            AidkError::ObjectNotFound("x".into()),
            AidkError::IndexOutOfRange { index: 5, len: 3 },
        ];
        let mut codes: Vec<i32> = errs.iter().map(AidkError::code).collect();
        assert!(codes.iter().all(|c| *c != 0));
        codes.dedup();
        assert_eq!(codes.len(), errs.len());
    }

    #[test]
    fn variable_mismatch_message_names_variable_and_kinds() {
        let err = AidkError::VariableTypeMismatch {
            name: "extern_scalar".into(),
            declared: Some(ValueKind::Float),
            submitted: Some(ValueKind::Text),
        };
        let msg = err.to_string();
        assert!(msg.contains("extern_scalar"));
        assert!(msg.contains("float"));
        assert!(msg.contains("text"));
    }

    #[test]
    fn out_of_range_message_names_variable_and_value() {
        let err = AidkError::VariableOutOfRange {
            name: "extern_int".into(),
            declared: ValueKind::Int,
            value: "100000000000000000000".into(),
        };
        assert_eq!(err.code(), 3);
        let msg = err.to_string();
        assert!(msg.contains("extern_int"));
        assert!(msg.contains("int"));
    }

    #[test]
    fn type_mismatch_on_empty_reads_empty() {
        let err = AidkError::TypeMismatch {
            expected: ValueKind::Bool,
            found: None,
        };
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn error_serialization_roundtrip() {
        let err = AidkError::IndexOutOfRange { index: 5, len: 3 };
        let json = serde_json::to_string(&err).unwrap();
        let back: AidkError = serde_json::from_str(&json).unwrap();
        assert_eq!(err, back);
    }

    #[test]
    fn response_from_error_carries_code_and_message() {
        let res: Response = AidkError::UnknownVariable("extern_invalid".into()).into();
        assert_eq!(res.error_code, 2);
        assert!(res.error_msg.contains("extern_invalid"));
    }
}
