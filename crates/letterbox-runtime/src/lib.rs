#![forbid(unsafe_code)]

//! Letterbox Runtime
//!
//! The reactive half of the letterboxing engine: it consumes typed chrome
//! events, keeps window attachment in lock-step with the enabled flag, and
//! turns geometry changes into batched, delta-only style mutations.
//!
//! # Key components
//!
//! - [`PolicyCoordinator`] - owns the chrome and everything below; the
//!   host's single entry point
//! - [`WindowAttachmentManager`] - idempotent Detached/Attached state
//!   machine per top-level window
//! - [`SurfaceSizeController`] - the per-surface rounding pass
//! - [`UpdateQueue`] / [`PaintBatch`] / [`StyleLedger`] - coalescing and
//!   delta application
//! - [`peers`] - the spoof-English and revocation-filter toggles sharing
//!   the coordinator's observer pattern
//!
//! # Scheduling model
//!
//! Single-threaded and cooperative. Host events only enqueue work; the
//! host then drives [`PolicyCoordinator::run_layout_pass`] once layout is
//! stable and [`PolicyCoordinator::run_paint_pass`] at the next paint
//! tick. One scheduled update runs exactly once per checkpoint pair, and
//! overlapping triggers for the same surface coalesce.

pub mod attachment;
pub mod controller;
pub mod coordinator;
pub mod peers;
pub mod scheduler;

pub use attachment::WindowAttachmentManager;
pub use controller::{SurfaceSizeController, UpdateOutcome};
pub use coordinator::PolicyCoordinator;
pub use letterbox_chrome::{
    Chrome, ConfigStore, EventSource, StyleChange, StyleSlot, SurfaceMeasurements,
    WindowStyleClasses,
};
pub use peers::{
    RevocationFilterPolicy, SPOOFED_ACCEPT_LANGUAGES, SpoofEnglishMode,
    resolve_spoof_english_prompt, sync_spoof_english,
};
pub use scheduler::{PaintBatch, StyleLedger, UpdateQueue, UpdateRequest, commit_batch};
