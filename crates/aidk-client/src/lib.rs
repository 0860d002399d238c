//! `aidk-client` – client facade for the AIDK vision service.
//!
//! Wraps a [`Transport`] to the AI service and exposes a small API: wait
//! until the service is ready, issue detect calls, project fields out of the
//! latest detections, and read or write the service's settable variables
//! with local type validation.
//!
//! # Modules
//!
//! - [`client`] – [`AidkClient`]: the facade.  Holds the latest detection
//!   frame, the cached variable schema and the readiness poller.
//! - [`commands`] – [`DirectCommandTable`]: direct command names and their
//!   configured aliases.
//! - [`transport`] – the [`Transport`] trait plus [`DetectRequest`] and
//!   [`DetectReply`].
//! - [`codec`] – JSON encoding of variable tables and detect replies.
//! - [`sim`] – [`SimTransport`]: scripted in-memory service for tests and
//!   offline use.
//! - [`status`] – [`StatusCell`] and the background status poller.
//! - [`config`] – [`ClientConfig`]: persisted settings in
//!   `~/.aidk/config.toml` with `AIDK_*` environment overrides.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: installs the
//!   `tracing` subscriber with optional OTLP span export.

pub mod client;
pub mod codec;
pub mod commands;
pub mod config;
pub mod sim;
pub mod status;
pub mod telemetry;
pub mod transport;

pub use client::AidkClient;
pub use commands::DirectCommandTable;
pub use config::{ClientConfig, ConfigError};
pub use sim::SimTransport;
pub use status::{StatusCell, spawn_status_poller};
pub use telemetry::{TracerProviderGuard, init_tracing};
pub use transport::{DetectReply, DetectRequest, Transport};
