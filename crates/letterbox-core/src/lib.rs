#![forbid(unsafe_code)]

//! Core primitives for viewport letterboxing.
//!
//! Letterboxing quantizes the visible content viewport to one of a small
//! set of size buckets so that window dimensions cannot be used to
//! fingerprint a specific user or device. This crate holds the pure half
//! of the engine:
//!
//! - [`quantize`] / [`stepped_size`] / [`DimensionTable`] - the bucketing
//!   algorithms
//! - [`SurfaceMetadata::is_exempt`] - which documents are never quantized
//! - [`LetterboxPolicy`] / [`SharedPolicy`] - the observed configuration
//!   snapshot and its single-writer sharing cell
//! - [`ChromeEvent`] / [`PolicyKey`] - the typed event vocabulary the
//!   reactive engine consumes
//!
//! Nothing here touches the host: geometry reads, style writes, and event
//! delivery live behind the `letterbox-chrome` trait boundary, and the
//! reactive machinery lives in `letterbox-runtime`.

pub mod event;
pub mod exemption;
pub mod geometry;
pub mod policy;
pub mod quantize;

pub use event::{ChromeEvent, PolicyKey, keys};
pub use exemption::{DOCUMENT_VIEWER_ORIGIN, PrincipalKind, SurfaceMetadata};
pub use geometry::{Dimension, SurfaceId, WindowId};
#[cfg(feature = "policy-config")]
pub use policy::PolicyConfigError;
pub use policy::{LetterboxPolicy, SharedPolicy};
pub use quantize::{DimensionTable, quantize, stepped_size};
