//! Detection records handed over by the client facade.
//!
//! A detect call yields one [`ObjectState`] per requested object; each state
//! carries zero or more [`DetectionInstance`]s in detection order.  Both are
//! plain data and are never mutated after decoding.

use serde::{Deserialize, Serialize};

/// Reference frame of the spatial fields of a [`DetectionInstance`].
///
/// Encoded on the wire as the integer id (`0` world, `1` camera).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum CoordinateFrame {
    /// World (global) coordinates.
    #[default]
    World,
    /// Camera (local) coordinates.
    Camera,
}

impl CoordinateFrame {
    pub fn id(self) -> i32 {
        match self {
            CoordinateFrame::World => 0,
            CoordinateFrame::Camera => 1,
        }
    }
}

impl TryFrom<i32> for CoordinateFrame {
    type Error = String;

    fn try_from(id: i32) -> Result<Self, Self::Error> {
        match id {
            0 => Ok(CoordinateFrame::World),
            1 => Ok(CoordinateFrame::Camera),
            other => Err(format!("invalid coordinate id {other}, expected 0 or 1")),
        }
    }
}

impl From<CoordinateFrame> for i32 {
    fn from(frame: CoordinateFrame) -> Self {
        frame.id()
    }
}

/// One detected instance of an object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionInstance {
    /// Top-left bbox corner `[xmin, ymin]` (pixels).
    pub bbox_min: [i32; 2],
    /// Bottom-right bbox corner `[xmax, ymax]` (pixels).
    pub bbox_max: [i32; 2],
    /// Image keypoints `[u, v]` (pixels).
    pub keypoints: Vec<[f64; 2]>,
    /// Keypoint positions `[x, y, z]` in the camera frame (metres).
    pub positions: Vec<[f64; 3]>,
    /// Object pose in the frame selected by `coordinate`.
    pub obj_pose: Vec<f64>,
    /// Grasp pose candidates in the frame selected by `coordinate`.
    pub grasp_poses: Vec<Vec<f64>>,
    /// Pose uncertainty `[x, y, z, θx, θy, θz]`, each in `[0, 1]`.
    pub uncertainty: [f64; 6],
    pub coordinate: CoordinateFrame,
    /// Consumers should only act on instances where this is `true`.
    pub is_valid: bool,
    pub double_value: f64,
    pub int_value: i32,
    pub name: String,
}

impl Default for DetectionInstance {
    fn default() -> Self {
        Self {
            bbox_min: [0, 0],
            bbox_max: [0, 0],
            keypoints: Vec::new(),
            positions: Vec::new(),
            obj_pose: Vec::new(),
            grasp_poses: Vec::new(),
            uncertainty: [0.0; 6],
            coordinate: CoordinateFrame::World,
            is_valid: true,
            double_value: 0.0,
            int_value: 0,
            name: String::new(),
        }
    }
}

/// One named object's detection state as of a single detect response.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ObjectState {
    pub obj_name: String,
    /// Perception-side index, monotonically increasing.
    #[serde(default)]
    pub ai_index: u32,
    /// Synchronized timestamp (seconds).
    #[serde(default)]
    pub synced_timestamp: f64,
    /// Instances in detection order.
    #[serde(default)]
    pub instances: Vec<DetectionInstance>,
}

impl ObjectState {
    pub fn new(obj_name: impl Into<String>, instances: Vec<DetectionInstance>) -> Self {
        Self {
            obj_name: obj_name.into(),
            instances,
            ..Self::default()
        }
    }

    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_defaults_match_service_defaults() {
        let inst = DetectionInstance::default();
        assert_eq!(inst.coordinate, CoordinateFrame::World);
        assert!(inst.is_valid);
        assert_eq!(inst.int_value, 0);
    }

    #[test]
    fn coordinate_frame_decodes_from_id() {
        let inst: DetectionInstance =
            serde_json::from_str(r#"{"coordinate": 1, "name": "box"}"#).unwrap();
        assert_eq!(inst.coordinate, CoordinateFrame::Camera);
        assert!(inst.is_valid);
        assert_eq!(inst.name, "box");
    }

    #[test]
    fn coordinate_id_outside_range_is_rejected() {
        let res: Result<DetectionInstance, _> = serde_json::from_str(r#"{"coordinate": 2}"#);
        assert!(res.is_err());
    }

    #[test]
    fn object_state_decodes_without_optional_fields() {
        let state: ObjectState = serde_json::from_str(
            r#"{"obj_name": "box1", "instances": [{"bbox_min": [1, 2], "bbox_max": [3, 4]}]}"#,
        )
        .unwrap();
        assert_eq!(state.obj_name, "box1");
        assert_eq!(state.ai_index, 0);
        assert_eq!(state.instance_count(), 1);
        assert_eq!(state.instances[0].bbox_max, [3, 4]);
    }
}
