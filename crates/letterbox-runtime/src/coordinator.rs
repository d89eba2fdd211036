#![forbid(unsafe_code)]

//! Policy coordinator: the engine's single entry point.
//!
//! [`PolicyCoordinator`] owns the host chrome, the policy snapshot cell
//! (it is the cell's only writer), the window attachment manager, and the
//! update/paint machinery. The host glue feeds it
//! [`ChromeEvent`]s and drives the two checkpoints:
//!
//! 1. [`run_layout_pass`](PolicyCoordinator::run_layout_pass) once the
//!    host's layout is stable: drains the coalesced update queue, reads
//!    geometry, and queues style deltas;
//! 2. [`run_paint_pass`](PolicyCoordinator::run_paint_pass) at the next
//!    paint tick: applies the queued deltas in one batch.
//!
//! Each scheduled update runs exactly once per checkpoint pair; a resize
//! overlapping a navigation coalesces rather than racing, and the last
//! applied update wins.
//!
//! Every public method is a failure boundary: errors are logged and
//! contained, nothing propagates to the host event loop, and a failed
//! pass is simply retried on the next triggering event.

use std::collections::BTreeSet;
use std::sync::Arc;

use letterbox_chrome::{Chrome, ConfigStore, StyleChange, StyleSlot, WindowStyleClasses};
use letterbox_core::{
    ChromeEvent, DimensionTable, LetterboxPolicy, PolicyKey, SharedPolicy, SurfaceId, WindowId,
    keys, stepped_size,
};

use crate::attachment::WindowAttachmentManager;
use crate::controller::{SurfaceSizeController, UpdateOutcome};
use crate::peers::{self, RevocationFilterPolicy};
use crate::scheduler::{PaintBatch, UpdateQueue};

/// Coordinates letterboxing across all windows of one browser process.
pub struct PolicyCoordinator<C: Chrome> {
    chrome: C,
    policy: SharedPolicy,
    attachments: WindowAttachmentManager,
    controller: SurfaceSizeController,
    queue: UpdateQueue,
    batch: PaintBatch,
    /// Windows awaiting their late `ready` class (applied after the first
    /// paint pass so fresh windows are not visibly resized mid-open).
    pending_ready: BTreeSet<WindowId>,
    revocation_filters: RevocationFilterPolicy,
    initialized: bool,
}

fn window_classes(policy: &LetterboxPolicy, ready: bool) -> WindowStyleClasses {
    WindowStyleClasses {
        letterboxing: true,
        vcenter: policy.vcenter,
        gradient: policy.gradient,
        ready,
    }
}

impl<C: Chrome> PolicyCoordinator<C> {
    /// Create a coordinator over the given chrome. Call
    /// [`init`](Self::init) before delivering events.
    #[must_use]
    pub fn new(chrome: C) -> Self {
        Self::with_policy(chrome, LetterboxPolicy::default())
    }

    /// Create a coordinator seeded with a startup policy snapshot (e.g.
    /// loaded from a policy file). Keys present in the configuration
    /// store still win when [`init`](Self::init) runs.
    #[must_use]
    pub fn with_policy(chrome: C, policy: LetterboxPolicy) -> Self {
        Self {
            chrome,
            policy: SharedPolicy::new(policy),
            attachments: WindowAttachmentManager::new(),
            controller: SurfaceSizeController::new(),
            queue: UpdateQueue::new(),
            batch: PaintBatch::new(),
            pending_ready: BTreeSet::new(),
            revocation_filters: RevocationFilterPolicy::default(),
            initialized: false,
        }
    }

    /// Read the configuration, sync the peer toggles, and attach every
    /// open window if the feature is enabled. Idempotent.
    pub fn init(&mut self) {
        if self.initialized {
            tracing::debug!("init: already initialized");
            return;
        }
        self.initialized = true;
        self.reload_policy();
        self.revocation_filters.reload(self.chrome.config());
        let enabled = self.policy.load().enabled;
        peers::sync_spoof_english(self.chrome.config_mut(), enabled);
        self.apply_enablement();
        tracing::debug!(enabled, "initialized");
    }

    /// Detach every window, flush the style resets, and stop processing
    /// events. Idempotent.
    pub fn shutdown(&mut self) {
        if !self.initialized {
            return;
        }
        for window in self.attachments.attached_windows() {
            self.attachments.detach(&mut self.chrome, window);
            self.queue_window_resets(window);
        }
        self.queue.clear();
        self.pending_ready.clear();
        // Teardown cannot rely on further host ticks; flush immediately.
        self.controller.commit(&mut self.chrome, &mut self.batch);
        self.initialized = false;
        tracing::debug!("shut down");
    }

    // ── Event intake ─────────────────────────────────────────────────────

    /// Consume one host notification.
    pub fn handle_event(&mut self, event: ChromeEvent) {
        if !self.initialized {
            tracing::warn!(?event, "event before init; ignoring");
            return;
        }
        match event {
            ChromeEvent::WindowOpened(window) => {
                if self.policy.load().enabled {
                    self.attach_window(window);
                }
            }
            ChromeEvent::WindowClosed(window) => {
                self.attachments.detach(&mut self.chrome, window);
                self.pending_ready.remove(&window);
                let chrome = &self.chrome;
                self.controller.prune(|slot| match slot {
                    StyleSlot::DefaultSize(w) | StyleSlot::WindowClasses(w) => w == window,
                    StyleSlot::SurfaceSize(s)
                    | StyleSlot::Excluded(s)
                    | StyleSlot::CornerFlattened(s) => !chrome.is_connected(s),
                });
            }
            ChromeEvent::TabOpened { window, surface } => {
                if self.attachments.is_attached(window) {
                    self.attachments
                        .observe_surface(&mut self.chrome, window, surface);
                    self.queue.request(surface, true);
                }
            }
            ChromeEvent::LocationChanged { surface }
            | ChromeEvent::ContainerResized { surface } => {
                self.schedule_update(surface);
            }
            ChromeEvent::ConfigChanged(key) => self.handle_config_change(key),
        }
    }

    /// Navigation hook for the host's progress listener. Equivalent to a
    /// [`ChromeEvent::LocationChanged`] delivery.
    pub fn on_location_change(&mut self, surface: SurfaceId) {
        self.handle_event(ChromeEvent::LocationChanged { surface });
    }

    // ── Checkpoints ──────────────────────────────────────────────────────

    /// Drain the update queue: read geometry and queue style deltas. Call
    /// once the host's pending layout work has completed.
    pub fn run_layout_pass(&mut self) {
        let policy = self.policy.load();
        for request in self.queue.drain() {
            if !self.chrome.is_connected(request.surface) {
                tracing::trace!(surface = %request.surface, "update target gone; dropping");
                let gone = request.surface;
                self.controller.prune(|slot| {
                    matches!(
                        slot,
                        StyleSlot::SurfaceSize(s)
                            | StyleSlot::Excluded(s)
                            | StyleSlot::CornerFlattened(s)
                            if s == gone
                    )
                });
                continue;
            }
            let outcome = self.controller.update(
                &self.chrome,
                &policy,
                &mut self.batch,
                request.surface,
                request.is_new,
            );
            if policy.testing && outcome == (UpdateOutcome::Rounded { changed: false }) {
                self.chrome.notify_quiescent(request.surface);
            }
        }
    }

    /// Apply the queued style deltas. Call at the host's next paint tick.
    pub fn run_paint_pass(&mut self) {
        self.controller.commit(&mut self.chrome, &mut self.batch);
        if self.pending_ready.is_empty() {
            return;
        }
        let policy = self.policy.load();
        for window in std::mem::take(&mut self.pending_ready) {
            if self.attachments.is_attached(window) {
                self.controller.apply_direct(
                    &mut self.chrome,
                    StyleChange::WindowClasses {
                        window,
                        classes: window_classes(&policy, true),
                    },
                );
            }
        }
    }

    /// Run both checkpoints back to back. Test convenience; real hosts
    /// interleave the passes with layout and paint.
    pub fn pump(&mut self) {
        self.run_layout_pass();
        self.run_paint_pass();
    }

    // ── Read-only queries ────────────────────────────────────────────────

    /// Snapshot of the current policy.
    #[must_use]
    pub fn policy(&self) -> Arc<LetterboxPolicy> {
        self.policy.load()
    }

    /// A reader handle onto the policy cell.
    #[must_use]
    pub fn shared_policy(&self) -> SharedPolicy {
        self.policy.clone()
    }

    /// The currently effective dimension table.
    #[must_use]
    pub fn quantization_table(&self) -> DimensionTable {
        self.policy.load().dimensions.clone()
    }

    /// The default stepping applied to one axis (diagnostics).
    #[must_use]
    pub fn default_step(dimension: u32, is_width: bool) -> u32 {
        stepped_size(dimension, is_width)
    }

    #[must_use]
    pub fn is_attached(&self, window: WindowId) -> bool {
        self.attachments.is_attached(window)
    }

    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.attachments.attached_count()
    }

    #[must_use]
    pub fn revocation_filters_enabled(&self) -> bool {
        self.revocation_filters.enabled()
    }

    /// Whether any update or style work is still queued.
    #[must_use]
    pub fn has_pending_work(&self) -> bool {
        !self.queue.is_empty() || !self.batch.is_empty() || !self.pending_ready.is_empty()
    }

    #[must_use]
    pub fn chrome(&self) -> &C {
        &self.chrome
    }

    pub fn chrome_mut(&mut self) -> &mut C {
        &mut self.chrome
    }

    // ── Internals ────────────────────────────────────────────────────────

    fn reload_policy(&mut self) {
        let current = (*self.policy.load()).clone();
        let config = self.chrome.config();
        let dimensions = if config.has_user_value(keys::DIMENSIONS) {
            DimensionTable::parse(&config.string_value(keys::DIMENSIONS, ""))
        } else {
            current.dimensions
        };
        let next = LetterboxPolicy {
            enabled: config.bool_value(keys::ENABLED, current.enabled),
            vcenter: config.bool_value(keys::VCENTER, current.vcenter),
            gradient: config.bool_value(keys::GRADIENT, current.gradient),
            dimensions,
            testing: config.bool_value(keys::TESTING, current.testing),
        };
        self.policy.store(next);
    }

    fn handle_config_change(&mut self, key: PolicyKey) {
        let mut next = (*self.policy.load()).clone();
        match key {
            PolicyKey::Enabled => {
                next.enabled = self.chrome.config().bool_value(keys::ENABLED, false);
                tracing::debug!(enabled = next.enabled, "enabled flag changed");
                let enabled = next.enabled;
                self.policy.store(next);
                self.apply_enablement();
                peers::sync_spoof_english(self.chrome.config_mut(), enabled);
            }
            PolicyKey::Vcenter => {
                next.vcenter = self.chrome.config().bool_value(keys::VCENTER, false);
                self.policy.store(next);
                self.refresh_attached();
            }
            PolicyKey::Gradient => {
                next.gradient = self.chrome.config().bool_value(keys::GRADIENT, false);
                self.policy.store(next);
                self.refresh_attached();
            }
            PolicyKey::Dimensions => {
                let raw = self.chrome.config().string_value(keys::DIMENSIONS, "");
                next.dimensions = DimensionTable::parse(&raw);
                tracing::debug!(table = %next.dimensions, "dimension table changed");
                self.policy.store(next);
                self.refresh_attached();
            }
            PolicyKey::Testing => {
                next.testing = self.chrome.config().bool_value(keys::TESTING, false);
                self.policy.store(next);
            }
            PolicyKey::SpoofEnglish | PolicyKey::AcceptLanguages => {
                let active = next.enabled;
                peers::sync_spoof_english(self.chrome.config_mut(), active);
            }
            PolicyKey::RevocationFilters => {
                self.revocation_filters.reload(self.chrome.config());
            }
        }
    }

    /// Bring every window's attachment state in line with the enabled
    /// flag. Idempotent attach/detach make re-application safe.
    fn apply_enablement(&mut self) {
        if self.policy.load().enabled {
            for window in self.chrome.windows() {
                self.attach_window(window);
            }
        } else {
            for window in self.attachments.attached_windows() {
                self.attachments.detach(&mut self.chrome, window);
                self.queue_window_resets(window);
            }
            self.queue.clear();
            self.pending_ready.clear();
        }
    }

    fn attach_window(&mut self, window: WindowId) {
        if !self.attachments.attach(&mut self.chrome, window) {
            return;
        }
        let policy = self.policy.load();
        self.controller.queue(
            &mut self.batch,
            StyleChange::WindowClasses {
                window,
                classes: window_classes(&policy, false),
            },
        );
        for surface in self.chrome.surfaces(window) {
            self.queue.request(surface, false);
        }
        self.pending_ready.insert(window);
    }

    fn schedule_update(&mut self, surface: SurfaceId) {
        let Some(window) = self.chrome.window_of(surface) else {
            return;
        };
        if self.attachments.is_attached(window) {
            self.queue.request(surface, false);
        }
    }

    /// Re-sync classes and re-round every surface of attached windows
    /// after an alignment/decoration/table change. No reattachment.
    fn refresh_attached(&mut self) {
        let policy = self.policy.load();
        for window in self.attachments.attached_windows() {
            let ready = self.current_ready(window);
            self.controller.queue(
                &mut self.batch,
                StyleChange::WindowClasses {
                    window,
                    classes: window_classes(&policy, ready),
                },
            );
            for surface in self.chrome.surfaces(window) {
                self.queue.request(surface, false);
            }
        }
    }

    fn current_ready(&self, window: WindowId) -> bool {
        matches!(
            self.controller.applied(StyleSlot::WindowClasses(window)),
            Some(StyleChange::WindowClasses { classes, .. }) if classes.ready
        )
    }

    fn queue_window_resets(&mut self, window: WindowId) {
        self.controller.queue_window_reset(&mut self.batch, window);
        for surface in self.chrome.surfaces(window) {
            self.controller.queue_surface_reset(&mut self.batch, surface);
        }
    }
}
