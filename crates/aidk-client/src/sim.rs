//! [`SimTransport`] – in-memory stand-in for the AI service.
//!
//! Holds a scripted status, detect reply, variable table and camera
//! intrinsic.  Accepted variable submissions are applied to the table, so a
//! subsequent fetch reports the new values.  Used by the client tests and as
//! a loopback when no service is available.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use aidk_types::{
    AidkError, AiStatus, CameraIntrinsic, ObjectState, Response, RuntimeInfo, SettableVariables,
    VariableSet,
};
use async_trait::async_trait;

use crate::transport::{DetectReply, DetectRequest, Transport};

#[derive(Default)]
struct SimState {
    status: AiStatus,
    reply: DetectReply,
    variables: VariableSet,
    intrinsic: CameraIntrinsic,
    runtime: RuntimeInfo,
    detect_delay: Option<Duration>,
    offline: bool,
    last_request: Option<DetectRequest>,
}

#[derive(Default)]
pub struct SimTransport {
    state: Mutex<SimState>,
    submissions: AtomicUsize,
}

impl SimTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_status(self, status: AiStatus) -> Self {
        self.set_status(status);
        self
    }

    pub fn with_variables(self, variables: VariableSet) -> Self {
        self.lock().variables = variables;
        self
    }

    pub fn with_intrinsic(self, intrinsic: CameraIntrinsic) -> Self {
        self.lock().intrinsic = intrinsic;
        self
    }

    pub fn with_runtime_info(self, runtime: RuntimeInfo) -> Self {
        self.lock().runtime = runtime;
        self
    }

    /// Script a successful detect reply carrying `objects`.
    pub fn with_objects(self, objects: Vec<ObjectState>) -> Self {
        self.set_objects(objects);
        self
    }

    /// Make every detect call sleep for `delay` before replying.
    pub fn with_detect_delay(self, delay: Duration) -> Self {
        self.lock().detect_delay = Some(delay);
        self
    }

    pub fn set_status(&self, status: AiStatus) {
        self.lock().status = status;
    }

    pub fn set_objects(&self, objects: Vec<ObjectState>) {
        self.lock().reply = DetectReply {
            success: true,
            objects,
        };
    }

    /// While offline every call fails with [`AidkError::Transport`].
    pub fn set_offline(&self, offline: bool) {
        self.lock().offline = offline;
    }

    /// Number of variable batches that reached the transport.
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<DetectRequest> {
        self.lock().last_request.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SimState> {
        // Every write is a single assignment, so a poisoned state is still consistent.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn check_online(&self) -> Result<(), AidkError> {
        if self.lock().offline {
            Err(AidkError::Transport("simulated service is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Transport for SimTransport {
    async fn fetch_status(&self) -> Result<AiStatus, AidkError> {
        self.check_online()?;
        Ok(self.lock().status.clone())
    }

    async fn detect(&self, request: &DetectRequest) -> Result<DetectReply, AidkError> {
        self.check_online()?;
        let delay = {
            let mut state = self.lock();
            state.last_request = Some(request.clone());
            state.detect_delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.lock().reply.clone())
    }

    async fn fetch_variables(&self) -> Result<VariableSet, AidkError> {
        self.check_online()?;
        Ok(self.lock().variables.clone())
    }

    async fn submit_variables(&self, vars: &VariableSet) -> Result<Response, AidkError> {
        self.check_online()?;
        self.submissions.fetch_add(1, Ordering::SeqCst);
        let mut state = self.lock();
        let mut table = SettableVariables::new(state.variables.clone());
        let outcome = table.apply(vars);
        if outcome.is_ok() {
            state.variables = table.into_current();
        }
        Ok(outcome.into())
    }

    async fn fetch_camera_intrinsic(&self) -> Result<CameraIntrinsic, AidkError> {
        self.check_online()?;
        Ok(self.lock().intrinsic)
    }

    async fn fetch_runtime_info(&self) -> Result<RuntimeInfo, AidkError> {
        self.check_online()?;
        Ok(self.lock().runtime.clone())
    }
}
