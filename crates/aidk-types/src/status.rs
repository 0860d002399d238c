//! Service status and camera metadata reported by the AI service.

use serde::{Deserialize, Serialize};

/// Working state of the AI service, as encoded in
/// [`AiStatus::status_code`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AiState {
    Unknown,
    Error,
    Idle,
    Pos3d,
    Pose6d,
    GraspPose,
    Keypoint,
    Bbox,
    Multiview,
    Classify,
    Scene,
    GetIntValue,
    GetDoubleValue,
    Keypoint3d,
    Custom,
}

impl AiState {
    const ALL: [AiState; 15] = [
        AiState::Unknown,
        AiState::Error,
        AiState::Idle,
        AiState::Pos3d,
        AiState::Pose6d,
        AiState::GraspPose,
        AiState::Keypoint,
        AiState::Bbox,
        AiState::Multiview,
        AiState::Classify,
        AiState::Scene,
        AiState::GetIntValue,
        AiState::GetDoubleValue,
        AiState::Keypoint3d,
        AiState::Custom,
    ];

    /// Map a wire status code to a state.  Codes outside the table are
    /// `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code).ok().and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn code(self) -> i32 {
        self as i32
    }

    /// Upper-case wire name, e.g. `GRASP_POSE`.
    pub fn name(self) -> &'static str {
        match self {
            AiState::Unknown => "UNKNOWN",
            AiState::Error => "ERROR",
            AiState::Idle => "IDLE",
            AiState::Pos3d => "POS3D",
            AiState::Pose6d => "POSE6D",
            AiState::GraspPose => "GRASP_POSE",
            AiState::Keypoint => "KEYPOINT",
            AiState::Bbox => "BBOX",
            AiState::Multiview => "MULTIVIEW",
            AiState::Classify => "CLASSIFY",
            AiState::Scene => "SCENE",
            AiState::GetIntValue => "GET_INT_VALUE",
            AiState::GetDoubleValue => "GET_DOUBLE_VALUE",
            AiState::Keypoint3d => "KEYPOINT3D",
            AiState::Custom => "CUSTOM",
        }
    }

    /// Every state, in code order.
    pub fn all() -> &'static [AiState] {
        &Self::ALL
    }
}

/// Latest status reported by the AI service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiStatus {
    pub status_code: i32,
    pub status_name: String,
    pub status_message: String,
}

impl Default for AiStatus {
    /// Status before the first successful poll.
    fn default() -> Self {
        Self {
            status_code: -1,
            status_name: String::new(),
            status_message: String::new(),
        }
    }
}

impl AiStatus {
    pub fn new(state: AiState, message: impl Into<String>) -> Self {
        Self {
            status_code: state.code(),
            status_name: state.name().to_string(),
            status_message: message.into(),
        }
    }

    /// Status published when the service could not be reached.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(AiState::Error, message)
    }

    pub fn state(&self) -> Option<AiState> {
        AiState::from_code(self.status_code)
    }

    /// The service accepts requests once it reports any known state other
    /// than `Unknown` or `Error`.
    pub fn is_ready(&self) -> bool {
        matches!(self.state(), Some(s) if s != AiState::Unknown && s != AiState::Error)
    }
}

/// Intrinsics of the camera the service detects with.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraIntrinsic {
    /// Focal length along x (pixels).
    pub fx: f32,
    /// Focal length along y (pixels).
    pub fy: f32,
    /// Optical centre x (pixels).
    pub cx: f32,
    /// Optical centre y (pixels).
    pub cy: f32,
    pub depth_scale: f32,
}

/// Where the service runs and which directories it exposes.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RuntimeInfo {
    pub working_dir: String,
    /// Path of the service binary.
    pub program_path: String,
    /// Remote directories the service accepts file operations in.
    #[serde(default)]
    pub supported_paths: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_codes_follow_declaration_order() {
        assert_eq!(AiState::from_code(0), Some(AiState::Unknown));
        assert_eq!(AiState::from_code(2), Some(AiState::Idle));
        assert_eq!(AiState::from_code(14), Some(AiState::Custom));
        assert_eq!(AiState::from_code(15), None);
        assert_eq!(AiState::from_code(-1), None);
        assert_eq!(AiState::Keypoint3d.code(), 13);
    }

    #[test]
    fn default_status_is_not_ready() {
        let status = AiStatus::default();
        assert_eq!(status.status_code, -1);
        assert!(!status.is_ready());
    }

    #[test]
    fn idle_is_ready_error_is_not() {
        assert!(AiStatus::new(AiState::Idle, "").is_ready());
        assert!(AiStatus::new(AiState::Bbox, "busy").is_ready());
        assert!(!AiStatus::new(AiState::Error, "").is_ready());
        assert!(!AiStatus::new(AiState::Unknown, "").is_ready());
    }

    #[test]
    fn status_name_is_uppercase_state() {
        assert_eq!(AiStatus::new(AiState::Idle, "").status_name, "IDLE");
        assert_eq!(AiStatus::unreachable("down").status_name, "ERROR");
    }

    #[test]
    fn multi_word_states_keep_underscores() {
        assert_eq!(AiStatus::new(AiState::GraspPose, "").status_name, "GRASP_POSE");
        assert_eq!(AiState::GetIntValue.name(), "GET_INT_VALUE");
        assert_eq!(AiState::GetDoubleValue.name(), "GET_DOUBLE_VALUE");
        assert_eq!(AiState::Keypoint3d.name(), "KEYPOINT3D");
    }

    #[test]
    fn runtime_info_tolerates_missing_paths() {
        let info: RuntimeInfo =
            serde_json::from_str(r#"{"working_dir": "/opt/ai", "program_path": "/opt/ai/bin"}"#)
                .unwrap();
        assert_eq!(info.working_dir, "/opt/ai");
        assert!(info.supported_paths.is_empty());
    }
}
