//! Service readiness tracking.
//!
//! A background task polls [`Transport::fetch_status`] and publishes each
//! result into a [`StatusCell`].  The cell wraps a [`tokio::sync::watch`]
//! channel: the poller is the single writer, any number of callers read the
//! latest [`AiStatus`] without blocking it.

use std::sync::Arc;
use std::time::Duration;

use aidk_types::AiStatus;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::transport::Transport;

/// Single-writer / multi-reader cell holding the latest [`AiStatus`].
///
/// Clone it cheaply – all clones observe the same value.
#[derive(Clone, Debug)]
pub struct StatusCell {
    sender: Arc<watch::Sender<AiStatus>>,
}

impl Default for StatusCell {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCell {
    /// A cell holding [`AiStatus::default`] (not ready).
    pub fn new() -> Self {
        let (sender, _) = watch::channel(AiStatus::default());
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Replace the current status.  Readers waiting in
    /// [`StatusCell::wait_ready`] are woken.
    pub fn publish(&self, status: AiStatus) {
        self.sender.send_replace(status);
    }

    pub fn current(&self) -> AiStatus {
        self.sender.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.sender.borrow().is_ready()
    }

    /// Resolve once the published status reports ready.
    pub async fn wait_ready(&self) -> AiStatus {
        let mut rx = self.sender.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        match rx.wait_for(AiStatus::is_ready).await {
            Ok(status) => status.clone(),
            Err(_) => self.current(),
        }
    }
}

/// Spawn the readiness poller.
///
/// Every `interval` the task fetches the status from `transport` and
/// publishes it into `cell`.  A failed fetch publishes
/// [`AiStatus::unreachable`].  Abort the returned handle to stop polling.
pub fn spawn_status_poller(
    transport: Arc<dyn Transport>,
    cell: StatusCell,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let status = match transport.fetch_status().await {
                Ok(status) => {
                    debug!(code = status.status_code, name = %status.status_name, "status polled");
                    status
                }
                Err(e) => {
                    warn!(error = %e, "status poll failed");
                    AiStatus::unreachable(e.to_string())
                }
            };
            cell.publish(status);
        }
    })
}
