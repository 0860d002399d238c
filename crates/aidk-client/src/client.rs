//! [`AidkClient`] – facade over a [`Transport`] to the AI service.
//!
//! The client owns three pieces of state:
//!
//! * the latest service status, kept fresh by a background poller
//!   ([`spawn_status_poller`]);
//! * the latest [`DetectionFrame`], replaced wholesale after every
//!   successful detect call;
//! * the last fetched [`SettableVariables`], used to validate variable
//!   batches before they are submitted.
//!
//! Frames are published through a [`watch`] channel as `Arc`s.  Result
//! extraction clones the `Arc` first, so a detect call that lands while a
//! caller is parsing results never tears the snapshot being read.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use aidk_client::{AidkClient, ClientConfig, DetectRequest, SimTransport};
//!
//! # async fn run() -> Result<(), aidk_types::AidkError> {
//! let client = AidkClient::new(ClientConfig::default(), Arc::new(SimTransport::new()));
//! client.wait_until_ready().await?;
//!
//! if client.detect(DetectRequest::new("box1", "cam0")).await? {
//!     let (ok, boxes) = client.parse_result("box1", "bbox", -1);
//!     if ok {
//!         println!("{} box(es)", boxes.len());
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use aidk_perception::{DetectionFrame, DetectionResult, ResultExtractor};
use aidk_types::{
    AidkError, AiStatus, CameraIntrinsic, Response, RuntimeInfo, SettableVariables, VariableSet,
};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

use crate::commands::DirectCommandTable;
use crate::config::ClientConfig;
use crate::status::{StatusCell, spawn_status_poller};
use crate::transport::{DetectRequest, Transport};

pub struct AidkClient {
    config: ClientConfig,
    transport: Arc<dyn Transport>,
    status: StatusCell,
    poller: JoinHandle<()>,
    extractor: ResultExtractor,
    commands: DirectCommandTable,
    frame: watch::Sender<Option<Arc<DetectionFrame>>>,
    variables: Mutex<Option<SettableVariables>>,
    next_instruction_id: AtomicU32,
}

impl AidkClient {
    /// Build a client and start the readiness poller.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        let status = StatusCell::new();
        let poller =
            spawn_status_poller(Arc::clone(&transport), status.clone(), config.poll_interval());
        let extractor = ResultExtractor::new(config.key_table());
        let commands = config.command_table();
        let (frame, _) = watch::channel(None);
        info!(ip = %config.ip, "AIDK client started");
        Self {
            config,
            transport,
            status,
            poller,
            extractor,
            commands,
            frame,
            variables: Mutex::new(None),
            next_instruction_id: AtomicU32::new(0),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    pub fn is_ready(&self) -> bool {
        self.status.is_ready()
    }

    pub fn current_state(&self) -> AiStatus {
        self.status.current()
    }

    /// Wait for the service to report ready, at most `ready_timeout`.
    ///
    /// # Errors
    ///
    /// [`AidkError::NotReady`] when the deadline passes first.
    pub async fn wait_until_ready(&self) -> Result<AiStatus, AidkError> {
        tokio::time::timeout(self.config.ready_timeout(), self.status.wait_ready())
            .await
            .map_err(|_| AidkError::NotReady)
    }

    // -----------------------------------------------------------------------
    // Detection
    // -----------------------------------------------------------------------

    /// Issue a detect call and, on success, make its objects the current
    /// frame.
    ///
    /// A command that names a direct command, or an alias of one, is sent in
    /// its canonical spelling; any other command is sent unchanged.  Requests
    /// without an instruction id get the next one from a per-client counter.
    /// Returns the service's success flag; a failed detect leaves the
    /// previous frame in place.
    ///
    /// # Errors
    ///
    /// - [`AidkError::Timeout`] – no reply within `request_timeout`.
    /// - Any error surfaced by the transport.
    #[instrument(
        skip(self, request),
        fields(obj = %request.obj_name, command = %request.command)
    )]
    pub async fn detect(&self, mut request: DetectRequest) -> Result<bool, AidkError> {
        if let Some(canonical) = self.commands.canonical(&request.command)
            && canonical != request.command
        {
            debug!(alias = %request.command, command = canonical, "resolved command alias");
            request.command = canonical.to_string();
        }
        if request.instruction_id.is_none() {
            let id = self.next_instruction_id.fetch_add(1, Ordering::Relaxed);
            request.instruction_id = Some(id);
        }
        let timeout = self.config.request_timeout();
        let reply = tokio::time::timeout(timeout, self.transport.detect(&request))
            .await
            .map_err(|_| AidkError::Timeout(timeout.as_secs_f32()))??;

        if !reply.success {
            warn!("detect reported failure");
            return Ok(false);
        }
        let frame = DetectionFrame::new(reply.objects);
        info!(objects = frame.objects().len(), "detect succeeded");
        self.frame.send_replace(Some(Arc::new(frame)));
        Ok(true)
    }

    /// The current frame, if any detect call has succeeded yet.
    pub fn latest_frame(&self) -> Option<Arc<DetectionFrame>> {
        self.frame.borrow().clone()
    }

    /// Time the current frame was received.
    pub fn detected_time(&self) -> Option<DateTime<Utc>> {
        self.latest_frame().map(|f| f.detected_at())
    }

    pub fn detected_obj_names(&self) -> Vec<String> {
        self.latest_frame()
            .map(|f| f.object_names().into_iter().map(str::to_string).collect())
            .unwrap_or_default()
    }

    pub fn detected_obj_nums(&self) -> Vec<usize> {
        self.latest_frame()
            .map(|f| f.object_counts())
            .unwrap_or_default()
    }

    pub fn detected_obj_num(&self, obj_name: &str) -> usize {
        self.latest_frame().map_or(0, |f| f.object_count(obj_name))
    }

    /// Project `key` out of the current frame.  See
    /// [`ResultExtractor::parse_result`].
    pub fn parse_result(
        &self,
        obj_name: &str,
        key: &str,
        index: i64,
    ) -> (bool, Vec<DetectionResult>) {
        match self.latest_frame() {
            Some(frame) => self.extractor.parse_result(&frame, obj_name, key, index),
            None => {
                debug!(object = obj_name, key, "parse_result before any detection");
                (false, Vec::new())
            }
        }
    }

    pub fn supported_keys(&self) -> Vec<&'static str> {
        self.extractor.keys().supported_keys()
    }

    /// Canonical names of every direct command.
    pub fn all_direct_command(&self) -> Vec<&'static str> {
        self.commands.all_direct_command()
    }

    // -----------------------------------------------------------------------
    // Settable variables
    // -----------------------------------------------------------------------

    /// Fetch the settable variables and cache them as the validation schema.
    #[instrument(skip(self))]
    pub async fn get_direct_setting_variables(&self) -> Result<VariableSet, AidkError> {
        let current = self.transport.fetch_variables().await?;
        debug!(count = current.len(), "fetched settable variables");
        *self.lock_variables() = Some(SettableVariables::new(current.clone()));
        Ok(current)
    }

    /// Validate `request` against the cached schema and submit it.
    ///
    /// The schema is fetched first if it has not been yet.  An invalid batch
    /// is rejected as a whole and never reaches the transport.  Transport
    /// failures are reported in the returned [`Response`].
    #[instrument(skip(self, request), fields(count = request.len()))]
    pub async fn set_direct_setting_variables(&self, request: &VariableSet) -> Response {
        match self.submit_variables(request).await {
            Ok(response) => {
                info!(code = response.error_code, "variables submitted");
                response
            }
            Err(e) => {
                warn!(error = %e, "variable batch rejected");
                e.into()
            }
        }
    }

    async fn submit_variables(&self, request: &VariableSet) -> Result<Response, AidkError> {
        let cached = self.lock_variables().clone();
        let mut schema = match cached {
            Some(schema) => schema,
            None => SettableVariables::new(self.get_direct_setting_variables().await?),
        };
        schema.validate(request)?;

        let response = self.transport.submit_variables(request).await?;
        if response.is_ok() {
            schema.apply(request)?;
            *self.lock_variables() = Some(schema);
        }
        Ok(response)
    }

    /// The cached variables from the last fetch, if any.
    pub fn cached_variables(&self) -> Option<VariableSet> {
        self.lock_variables()
            .as_ref()
            .map(|v| v.current_values().clone())
    }

    fn lock_variables(&self) -> MutexGuard<'_, Option<SettableVariables>> {
        self.variables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // -----------------------------------------------------------------------
    // Camera
    // -----------------------------------------------------------------------

    pub async fn camera_intrinsic(&self) -> Result<CameraIntrinsic, AidkError> {
        self.transport.fetch_camera_intrinsic().await
    }

    // -----------------------------------------------------------------------
    // Runtime
    // -----------------------------------------------------------------------

    pub async fn get_runtime_info(&self) -> Result<RuntimeInfo, AidkError> {
        self.transport.fetch_runtime_info().await
    }
}

impl Drop for AidkClient {
    fn drop(&mut self) {
        self.poller.abort();
    }
}
