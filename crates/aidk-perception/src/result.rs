//! Projection output: one [`DetectionResult`] per selected instance.

use serde::{Deserialize, Serialize};

use crate::keys::ResultKey;

/// The projected field value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum ResultValue {
    /// `bbox`, `keypoints`, `positions`, `obj_pose`.
    Vectors(Vec<Vec<f64>>),
    Bool(bool),
    Int(i32),
    Double(f64),
    Text(String),
}

/// A field extracted from one detection instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Key that produced this result.
    pub key: ResultKey,
    /// Copied from the source instance's `is_valid`.
    pub valid: bool,
    pub value: ResultValue,
}

impl DetectionResult {
    pub fn as_vectors(&self) -> Option<&[Vec<f64>]> {
        match &self.value {
            ResultValue::Vectors(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.value {
            ResultValue::Bool(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self.value {
            ResultValue::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self.value {
            ResultValue::Double(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match &self.value {
            ResultValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(key: ResultKey, value: ResultValue) -> DetectionResult {
        DetectionResult {
            key,
            valid: true,
            value,
        }
    }

    #[test]
    fn accessors_return_none_for_other_variants() {
        let bbox = result(ResultKey::Bbox, ResultValue::Vectors(vec![vec![1.0, 2.0]]));
        assert!(bbox.as_vectors().is_some());
        assert_eq!(bbox.as_bool(), None);
        assert_eq!(bbox.as_int(), None);
        assert_eq!(bbox.as_double(), None);
        assert_eq!(bbox.as_text(), None);

        let name = result(ResultKey::Name, ResultValue::Text("box_0".into()));
        assert_eq!(name.as_text(), Some("box_0"));
        assert!(name.as_vectors().is_none());
        assert_eq!(name.as_int(), None);

        let valid = result(ResultKey::Valid, ResultValue::Bool(false));
        assert_eq!(valid.as_bool(), Some(false));
        assert_eq!(valid.as_double(), None);
        assert!(valid.as_text().is_none());
    }

    #[test]
    fn serializes_with_type_tag() {
        let r = result(ResultKey::IntValue, ResultValue::Int(7));
        let json = serde_json::to_string(&r).unwrap();
        assert_eq!(json, r#"{"key":"int_value","valid":true,"value":{"type":"int","data":7}}"#);
    }
}
