//! The transport boundary.
//!
//! [`AidkClient`][crate::AidkClient] never speaks to the network itself.  It
//! drives a [`Transport`], which owns the connection to the AI service and
//! hands back already-decoded records.
//!
//! # Overview
//!
//! - [`Transport`] – the trait every transport must implement.
//! - [`DetectRequest`] / [`DetectReply`] – detect call shapes.
//! - [`SimTransport`][crate::sim::SimTransport] – in-memory loopback used
//!   by tests.

use aidk_types::{
    AidkError, AiStatus, CameraIntrinsic, CoordinateFrame, ObjectState, Response, RuntimeInfo,
    VariableSet,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Identity pose `[x, y, z, qw, qx, qy, qz]`.
pub const IDENTITY_POSE: [f64; 7] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0];

/// Parameters of a detect call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectRequest {
    /// Command name; `"CUSTOM"` unless a direct command is issued.  Aliases
    /// are resolved by the client before the request is sent.
    pub command: String,
    pub obj_name: String,
    pub camera_id: String,
    /// Frame the results should be expressed in.
    pub coordinate: CoordinateFrame,
    /// Camera pose, 7D `[x, y, z, qw, qx, qy, qz]` or a flattened 4x4.
    pub camera_pose: Vec<f64>,
    /// Robot TCP pose `[x, y, z, qw, qx, qy, qz]`.
    pub tcp_pose: Vec<f64>,
    /// Robot TCP wrench `[fx, fy, fz, mx, my, mz]`.
    pub tcp_force: Vec<f64>,
    pub custom: String,
    /// Unique per request; used by the service for debugging.
    pub instruction_id: Option<u32>,
}

impl Default for DetectRequest {
    fn default() -> Self {
        Self {
            command: "CUSTOM".to_string(),
            obj_name: String::new(),
            camera_id: String::new(),
            coordinate: CoordinateFrame::Camera,
            camera_pose: IDENTITY_POSE.to_vec(),
            tcp_pose: IDENTITY_POSE.to_vec(),
            tcp_force: vec![0.0; 6],
            custom: String::new(),
            instruction_id: None,
        }
    }
}

impl DetectRequest {
    /// Detect `obj_name` with `camera_id`, all other parameters defaulted.
    pub fn new(obj_name: impl Into<String>, camera_id: impl Into<String>) -> Self {
        Self {
            obj_name: obj_name.into(),
            camera_id: camera_id.into(),
            ..Self::default()
        }
    }

    /// A direct (v1x) command request.  The command carries everything the
    /// service needs; object and camera are left empty.
    pub fn v1x(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Self::default()
        }
    }

    pub fn with_coordinate(mut self, coordinate: CoordinateFrame) -> Self {
        self.coordinate = coordinate;
        self
    }

    pub fn with_camera_pose(mut self, pose: Vec<f64>) -> Self {
        self.camera_pose = pose;
        self
    }

    pub fn with_tcp(mut self, pose: Vec<f64>, force: Vec<f64>) -> Self {
        self.tcp_pose = pose;
        self.tcp_force = force;
        self
    }

    pub fn with_custom(mut self, custom: impl Into<String>) -> Self {
        self.custom = custom.into();
        self
    }

    pub fn with_instruction_id(mut self, id: u32) -> Self {
        self.instruction_id = Some(id);
        self
    }
}

/// Decoded reply of a detect call.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectReply {
    pub success: bool,
    #[serde(default)]
    pub objects: Vec<ObjectState>,
}

/// Every transport to the AI service must implement this trait.
///
/// Implementations decode wire data into the `aidk-types` records; the
/// client only ever sees those.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Current service status.
    async fn fetch_status(&self) -> Result<AiStatus, AidkError>;

    /// Issue a detect call.
    async fn detect(&self, request: &DetectRequest) -> Result<DetectReply, AidkError>;

    /// Settable variables with their current values.
    async fn fetch_variables(&self) -> Result<VariableSet, AidkError>;

    /// Submit variable changes.  Only called with batches that already passed
    /// client-side validation.
    async fn submit_variables(&self, vars: &VariableSet) -> Result<Response, AidkError>;

    async fn fetch_camera_intrinsic(&self) -> Result<CameraIntrinsic, AidkError>;

    /// Working directory, binary path and file-operation directories of the
    /// service.
    async fn fetch_runtime_info(&self) -> Result<RuntimeInfo, AidkError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_request_matches_service_defaults() {
        let req = DetectRequest::new("box1", "cam0");
        assert_eq!(req.command, "CUSTOM");
        assert_eq!(req.coordinate, CoordinateFrame::Camera);
        assert_eq!(req.camera_pose, IDENTITY_POSE.to_vec());
        assert_eq!(req.tcp_force.len(), 6);
        assert_eq!(req.instruction_id, None);
    }

    #[test]
    fn v1x_request_carries_only_the_command() {
        let req = DetectRequest::v1x("DETECT_BOX");
        assert_eq!(req.command, "DETECT_BOX");
        assert!(req.obj_name.is_empty());
    }

    #[test]
    fn builders_override_fields() {
        let req = DetectRequest::new("box1", "cam0")
            .with_coordinate(CoordinateFrame::World)
            .with_custom("{}")
            .with_instruction_id(7);
        assert_eq!(req.coordinate, CoordinateFrame::World);
        assert_eq!(req.custom, "{}");
        assert_eq!(req.instruction_id, Some(7));
    }
}
