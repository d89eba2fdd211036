#![forbid(unsafe_code)]

//! Host-chrome traits for the letterboxing engine: the boundary between
//! the reactive rounding machinery and the surrounding browser.
//!
//! The engine never touches the host directly. It enumerates windows and
//! surfaces, samples geometry and principal metadata, and emits typed
//! style mutations exclusively through [`Chrome`]; configuration reads and
//! writes go through [`ConfigStore`]. Event delivery flows the other way:
//! the host glue translates its notifications into
//! [`ChromeEvent`](letterbox_core::ChromeEvent)s and hands them to the
//! coordinator.
//!
//! Two contracts matter for correctness:
//!
//! - [`Chrome::measure`] returns every metric of one surface from a single
//!   layout snapshot. The host must not interleave the reads with layout
//!   mutations; callers rely on the triple being tear-free.
//! - [`Chrome::apply`] is a plain setter. Batching, diffing against
//!   previously applied values, and paint-tick deferral are the engine's
//!   job, not the host's.

use core::fmt;

use letterbox_core::{Dimension, SurfaceId, SurfaceMetadata, WindowId};

#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;

#[cfg(any(test, feature = "test-helpers"))]
pub use mock::{MemoryConfig, MockChrome};

/// Style classes toggled on a window's tab-panel container.
///
/// `ready` is applied late, after the first full update pass, so freshly
/// opened windows are not visibly resized before rounding is in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WindowStyleClasses {
    /// Letterboxing layout rules are active in this window.
    pub letterboxing: bool,
    /// Rounded content is vertically centered in the leftover space.
    pub vcenter: bool,
    /// The margin area is painted with a decorative gradient.
    pub gradient: bool,
    /// First update pass has completed; margins may be shown.
    pub ready: bool,
}

/// One batched, tear-free read of the geometry relevant to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceMeasurements {
    /// The content viewport itself.
    pub content: Dimension,
    /// The surface's immediate parent (shrinks when a notification bar,
    /// find bar, or devtools pane is open).
    pub parent: Dimension,
    /// The outer browser container for the surface's tab stack.
    pub container: Dimension,
}

/// A typed style mutation on the host chrome.
///
/// `None` sizes clear the corresponding rule so the surface falls back to
/// whatever the next-less-specific rule provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleChange {
    /// The window-shared default letterboxing size rule.
    DefaultSize {
        window: WindowId,
        size: Option<Dimension>,
    },
    /// A surface-specific override of the default rule.
    SurfaceSize {
        surface: SurfaceId,
        size: Option<Dimension>,
    },
    /// Exclude a surface from letterboxing entirely (exempt documents).
    Excluded { surface: SurfaceId, excluded: bool },
    /// Flatten (or restore) the decorative rounded corner of a surface.
    CornerFlattened { surface: SurfaceId, flattened: bool },
    /// The window-level style classes.
    WindowClasses {
        window: WindowId,
        classes: WindowStyleClasses,
    },
}

/// Identity of the style slot a [`StyleChange`] writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StyleSlot {
    DefaultSize(WindowId),
    SurfaceSize(SurfaceId),
    Excluded(SurfaceId),
    CornerFlattened(SurfaceId),
    WindowClasses(WindowId),
}

impl StyleChange {
    /// The slot this change writes to.
    #[must_use]
    pub fn slot(&self) -> StyleSlot {
        match *self {
            StyleChange::DefaultSize { window, .. } => StyleSlot::DefaultSize(window),
            StyleChange::SurfaceSize { surface, .. } => StyleSlot::SurfaceSize(surface),
            StyleChange::Excluded { surface, .. } => StyleSlot::Excluded(surface),
            StyleChange::CornerFlattened { surface, .. } => StyleSlot::CornerFlattened(surface),
            StyleChange::WindowClasses { window, .. } => StyleSlot::WindowClasses(window),
        }
    }

    /// Whether this change writes the slot's default (pristine) value.
    ///
    /// Applying a default value to a slot that was never written is a
    /// no-op; the delta ledger uses this to skip redundant clears.
    #[must_use]
    pub fn is_default(&self) -> bool {
        match *self {
            StyleChange::DefaultSize { size, .. } => size.is_none(),
            StyleChange::SurfaceSize { size, .. } => size.is_none(),
            StyleChange::Excluded { excluded, .. } => !excluded,
            StyleChange::CornerFlattened { flattened, .. } => !flattened,
            StyleChange::WindowClasses { classes, .. } => classes == WindowStyleClasses::default(),
        }
    }
}

/// Event sources a window attachment subscribes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EventSource {
    /// New-tab notifications for the window.
    TabOpen,
    /// Top-level navigation (location change) notifications.
    Navigation,
    /// Resize observation of one surface's container subtree.
    ContainerResize(SurfaceId),
}

/// Configuration store with typed accessors.
///
/// Missing keys (and keys holding a different type) yield the caller's
/// default. Change notifications are not part of this trait: the host
/// forwards them as `ChromeEvent::ConfigChanged`.
pub trait ConfigStore {
    fn bool_value(&self, key: &str, default: bool) -> bool;
    fn set_bool(&mut self, key: &str, value: bool);

    fn int_value(&self, key: &str, default: i64) -> i64;
    fn set_int(&mut self, key: &str, value: i64);

    fn string_value(&self, key: &str, default: &str) -> String;
    fn set_string(&mut self, key: &str, value: &str);

    /// Whether the key holds an explicit (user-set) value.
    fn has_user_value(&self, key: &str) -> bool;

    /// Remove the key's explicit value, restoring its default.
    fn clear(&mut self, key: &str);
}

/// The host browser chrome, as seen by the letterboxing engine.
///
/// Enumeration and metadata reads are infallible (a missing surface reads
/// as `None`/disconnected); geometry and style operations carry the host's
/// error type, which the engine logs and contains rather than propagates.
pub trait Chrome {
    /// Host-specific error type for geometry and style operations.
    type Error: fmt::Debug + fmt::Display;

    /// Configuration store implementation.
    type Config: ConfigStore;

    fn config(&self) -> &Self::Config;
    fn config_mut(&mut self) -> &mut Self::Config;

    /// All currently open top-level windows.
    fn windows(&self) -> Vec<WindowId>;

    /// Whether a window hosts browser tabs (as opposed to a dialog or
    /// helper window); only browser windows are eligible for attachment.
    fn is_browser_window(&self, window: WindowId) -> bool;

    /// The surfaces (tab viewports) of a window, in tab order.
    fn surfaces(&self, window: WindowId) -> Vec<SurfaceId>;

    /// The window owning a surface, if the surface still exists.
    fn window_of(&self, surface: SurfaceId) -> Option<WindowId>;

    /// Whether the surface is still connected to a document. Surfaces
    /// mid-teardown report `false`; pending updates for them are dropped.
    fn is_connected(&self, surface: SurfaceId) -> bool;

    /// Principal and URI metadata for the surface's current document.
    fn metadata(&self, surface: SurfaceId) -> Option<SurfaceMetadata>;

    /// One tear-free snapshot of the surface's geometry. Must be called
    /// only after the host's pending layout work has completed.
    fn measure(&self, surface: SurfaceId) -> Result<SurfaceMeasurements, Self::Error>;

    /// The configured corner radius of the window's letterboxing
    /// decoration, in pixels; `0` when the decoration is disabled.
    fn corner_radius(&self, window: WindowId) -> u32;

    /// Apply one style mutation.
    fn apply(&mut self, change: &StyleChange) -> Result<(), Self::Error>;

    /// Subscribe the window to an event source. Subscribing an already
    /// subscribed source is a no-op.
    fn subscribe(&mut self, window: WindowId, source: EventSource);

    /// Drop every subscription held for the window.
    fn unsubscribe_window(&mut self, window: WindowId);

    /// Announce that an update pass for the surface completed without any
    /// style change (quiescence; consumed by automated tests).
    fn notify_quiescent(&mut self, surface: SurfaceId);
}
