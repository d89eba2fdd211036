#![forbid(unsafe_code)]

//! Window attachment lifecycle.
//!
//! Each eligible top-level window is either **detached** (the engine holds
//! no subscriptions for it) or **attached** (tab-open, navigation, and
//! per-surface resize subscriptions are live). The manager keeps the set
//! of attached windows and makes both transitions idempotent, so the
//! central invariant can hold through any event ordering: a window is
//! attached exactly while the feature is globally enabled and the window
//! is open.
//!
//! Style work is not done here; the coordinator schedules the initial
//! update sweep on attach and queues the reset sweep on detach.

use std::collections::BTreeSet;

use letterbox_chrome::{Chrome, EventSource};
use letterbox_core::{SurfaceId, WindowId};

/// Tracks which windows currently hold live subscriptions.
#[derive(Debug, Default)]
pub struct WindowAttachmentManager {
    attached: BTreeSet<WindowId>,
}

impl WindowAttachmentManager {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_attached(&self, window: WindowId) -> bool {
        self.attached.contains(&window)
    }

    /// The attached windows, in id order.
    #[must_use]
    pub fn attached_windows(&self) -> Vec<WindowId> {
        self.attached.iter().copied().collect()
    }

    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.attached.len()
    }

    /// Attach a window: subscribe tab-open, navigation, and container
    /// resize for each existing surface. Returns `false` (no-op) when the
    /// window is already attached or is not a browser window.
    pub fn attach<C: Chrome>(&mut self, chrome: &mut C, window: WindowId) -> bool {
        if self.attached.contains(&window) {
            tracing::debug!(%window, "attach: already attached");
            return false;
        }
        if !chrome.is_browser_window(window) {
            tracing::debug!(%window, "attach: not a browser window");
            return false;
        }
        self.attached.insert(window);
        chrome.subscribe(window, EventSource::TabOpen);
        chrome.subscribe(window, EventSource::Navigation);
        for surface in chrome.surfaces(window) {
            chrome.subscribe(window, EventSource::ContainerResize(surface));
        }
        tracing::debug!(%window, "attached");
        true
    }

    /// Start resize observation for a surface created after attach.
    /// No-op when the window is not attached.
    pub fn observe_surface<C: Chrome>(
        &self,
        chrome: &mut C,
        window: WindowId,
        surface: SurfaceId,
    ) {
        if self.attached.contains(&window) {
            chrome.subscribe(window, EventSource::ContainerResize(surface));
        }
    }

    /// Detach a window: drop every subscription. Returns `false` (no-op)
    /// when the window was not attached.
    pub fn detach<C: Chrome>(&mut self, chrome: &mut C, window: WindowId) -> bool {
        if !self.attached.remove(&window) {
            tracing::debug!(%window, "detach: not attached");
            return false;
        }
        chrome.unsubscribe_window(window);
        tracing::debug!(%window, "detached");
        true
    }
}
