//! [`ResultExtractor`] – projects one field out of detection records.
//!
//! Given an object name, a key string and an instance index, the extractor:
//!
//! 1. finds the latest [`ObjectState`] with that name in the frame;
//! 2. resolves the key through its [`ResultKeyTable`];
//! 3. selects every instance (`-1`) or exactly one (`i >= 0`);
//! 4. builds one [`DetectionResult`] per selected instance, in order.
//!
//! Instances flagged invalid are still projected.  Filtering on the `valid`
//! key is the caller's decision.
//!
//! # Example
//!
//! ```
//! use aidk_perception::{DetectionFrame, ResultExtractor, ResultKeyTable};
//! use aidk_types::{DetectionInstance, ObjectState};
//!
//! let inst = DetectionInstance { bbox_min: [10, 20], bbox_max: [30, 40], ..Default::default() };
//! let frame = DetectionFrame::new(vec![ObjectState::new("box1", vec![inst])]);
//!
//! let extractor = ResultExtractor::new(ResultKeyTable::default());
//! let (ok, results) = extractor.parse_result(&frame, "box1", "bbox", -1);
//! assert!(ok);
//! assert_eq!(results[0].as_vectors().unwrap(), &[vec![10.0, 20.0], vec![30.0, 40.0]]);
//!
//! let (ok, results) = extractor.parse_result(&frame, "box1", "bbox", 5);
//! assert!(!ok && results.is_empty());
//! ```

use aidk_types::{AidkError, DetectionInstance, ObjectState};
use tracing::debug;

use crate::frame::DetectionFrame;
use crate::keys::{ResultKey, ResultKeyTable};
use crate::result::{DetectionResult, ResultValue};

/// Which instances of an object to project.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceSelector {
    All,
    At(usize),
}

impl InstanceSelector {
    /// Map the wire index: `-1` selects all instances, `i >= 0` exactly one.
    ///
    /// # Errors
    ///
    /// [`AidkError::IndexOutOfRange`] for any other negative index.
    pub fn from_index(index: i64) -> Result<Self, AidkError> {
        match index {
            -1 => Ok(InstanceSelector::All),
            i if i >= 0 => usize::try_from(i)
                .map(InstanceSelector::At)
                .map_err(|_| AidkError::IndexOutOfRange { index, len: 0 }),
            _ => Err(AidkError::IndexOutOfRange { index, len: 0 }),
        }
    }
}

/// Extracts typed results from a [`DetectionFrame`].
#[derive(Debug, Clone, Default)]
pub struct ResultExtractor {
    keys: ResultKeyTable,
}

impl ResultExtractor {
    pub fn new(keys: ResultKeyTable) -> Self {
        Self { keys }
    }

    pub fn keys(&self) -> &ResultKeyTable {
        &self.keys
    }

    /// Project `key` out of the selected instances of `object_name`.
    ///
    /// # Errors
    ///
    /// - [`AidkError::ObjectNotFound`] – no state named `object_name`.
    /// - [`AidkError::UnknownKey`] – `key` is not in the table.
    /// - [`AidkError::IndexOutOfRange`] – `selector` points past the last
    ///   instance.
    pub fn extract(
        &self,
        frame: &DetectionFrame,
        object_name: &str,
        key: &str,
        selector: InstanceSelector,
    ) -> Result<Vec<DetectionResult>, AidkError> {
        let (state, key) = self.locate(frame, object_name, key)?;
        Ok(project_all(select(state, selector)?, key))
    }

    /// [`ResultExtractor::extract`] taking the wire index (`-1` for all).
    ///
    /// The index is only checked once the object and key are known, so the
    /// error precedence matches [`ResultExtractor::extract`].
    pub fn extract_at(
        &self,
        frame: &DetectionFrame,
        object_name: &str,
        key: &str,
        index: i64,
    ) -> Result<Vec<DetectionResult>, AidkError> {
        let (state, key) = self.locate(frame, object_name, key)?;
        let selector = InstanceSelector::from_index(index).map_err(|_| {
            AidkError::IndexOutOfRange {
                index,
                len: state.instances.len(),
            }
        })?;
        Ok(project_all(select(state, selector)?, key))
    }

    /// Recoverable form of [`ResultExtractor::extract_at`].
    ///
    /// Returns `(true, results)` on success and `(false, [])` on any failure.
    pub fn parse_result(
        &self,
        frame: &DetectionFrame,
        object_name: &str,
        key: &str,
        index: i64,
    ) -> (bool, Vec<DetectionResult>) {
        match self.extract_at(frame, object_name, key, index) {
            Ok(results) => (true, results),
            Err(e) => {
                debug!(object = object_name, key, index, error = %e, "parse_result failed");
                (false, Vec::new())
            }
        }
    }

    fn locate<'f>(
        &self,
        frame: &'f DetectionFrame,
        object_name: &str,
        key: &str,
    ) -> Result<(&'f ObjectState, ResultKey), AidkError> {
        let state = frame
            .object(object_name)
            .ok_or_else(|| AidkError::ObjectNotFound(object_name.to_string()))?;
        let key = self
            .keys
            .resolve(key)
            .ok_or_else(|| AidkError::UnknownKey(key.to_string()))?;
        Ok((state, key))
    }
}

fn project_all(instances: &[DetectionInstance], key: ResultKey) -> Vec<DetectionResult> {
    instances.iter().map(|inst| project(inst, key)).collect()
}

fn select(
    state: &ObjectState,
    selector: InstanceSelector,
) -> Result<&[DetectionInstance], AidkError> {
    match selector {
        InstanceSelector::All => Ok(&state.instances),
        InstanceSelector::At(i) => state
            .instances
            .get(i..=i)
            .ok_or(AidkError::IndexOutOfRange {
                index: i as i64,
                len: state.instances.len(),
            }),
    }
}

fn project(inst: &DetectionInstance, key: ResultKey) -> DetectionResult {
    let value = match key {
        ResultKey::Bbox => ResultValue::Vectors(vec![
            inst.bbox_min.iter().map(|&v| f64::from(v)).collect(),
            inst.bbox_max.iter().map(|&v| f64::from(v)).collect(),
        ]),
        ResultKey::Keypoints => {
            ResultValue::Vectors(inst.keypoints.iter().map(|p| p.to_vec()).collect())
        }
        ResultKey::Positions => {
            ResultValue::Vectors(inst.positions.iter().map(|p| p.to_vec()).collect())
        }
        ResultKey::ObjPose => ResultValue::Vectors(vec![inst.obj_pose.clone()]),
        ResultKey::Valid => ResultValue::Bool(inst.is_valid),
        ResultKey::DoubleValue => ResultValue::Double(inst.double_value),
        ResultKey::IntValue => ResultValue::Int(inst.int_value),
        ResultKey::Name => ResultValue::Text(inst.name.clone()),
    };
    DetectionResult {
        key,
        valid: inst.is_valid,
        value,
    }
}
