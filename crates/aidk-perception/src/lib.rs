//! `aidk-perception` – result projection over detection records.
//!
//! Turns the decoded [`ObjectState`][aidk_types::ObjectState]s of a detect
//! response into uniform, typed results that a robot program can act on.
//!
//! # Modules
//!
//! - [`frame`] – [`DetectionFrame`]: immutable snapshot of one detect
//!   response, with per-name lookup and instance counts.
//! - [`keys`] – [`ResultKey`] and [`ResultKeyTable`]: the supported field
//!   keys and any configured aliases.
//! - [`extractor`] – [`ResultExtractor`]: selects instances by index and
//!   projects the requested field into [`DetectionResult`]s.
//! - [`result`] – [`DetectionResult`] and [`ResultValue`].

pub mod extractor;
pub mod frame;
pub mod keys;
pub mod result;

pub use extractor::{InstanceSelector, ResultExtractor};
pub use frame::DetectionFrame;
pub use keys::{ResultKey, ResultKeyTable};
pub use result::{DetectionResult, ResultValue};
