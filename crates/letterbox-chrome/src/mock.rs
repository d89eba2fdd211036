#![forbid(unsafe_code)]

//! In-memory chrome double for deterministic tests.
//!
//! [`MockChrome`] models windows, surfaces, geometry, and a configuration
//! store entirely in memory, and records every style application,
//! subscription, and quiescence notification so tests can assert on the
//! exact sequence of host interactions.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use letterbox_core::{SurfaceId, SurfaceMetadata, WindowId};

use crate::{
    Chrome, ConfigStore, EventSource, StyleChange, StyleSlot, SurfaceMeasurements,
};

/// Error type reported by the mock's fallible operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockChromeError(pub String);

impl core::fmt::Display for MockChromeError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "mock chrome: {}", self.0)
    }
}

#[derive(Debug, Clone)]
enum ConfigValue {
    Bool(bool),
    Int(i64),
    Str(String),
}

/// In-memory [`ConfigStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryConfig {
    values: HashMap<String, ConfigValue>,
}

impl ConfigStore for MemoryConfig {
    fn bool_value(&self, key: &str, default: bool) -> bool {
        match self.values.get(key) {
            Some(ConfigValue::Bool(v)) => *v,
            _ => default,
        }
    }

    fn set_bool(&mut self, key: &str, value: bool) {
        self.values.insert(key.to_owned(), ConfigValue::Bool(value));
    }

    fn int_value(&self, key: &str, default: i64) -> i64 {
        match self.values.get(key) {
            Some(ConfigValue::Int(v)) => *v,
            _ => default,
        }
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.values.insert(key.to_owned(), ConfigValue::Int(value));
    }

    fn string_value(&self, key: &str, default: &str) -> String {
        match self.values.get(key) {
            Some(ConfigValue::Str(v)) => v.clone(),
            _ => default.to_owned(),
        }
    }

    fn set_string(&mut self, key: &str, value: &str) {
        self.values
            .insert(key.to_owned(), ConfigValue::Str(value.to_owned()));
    }

    fn has_user_value(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    fn clear(&mut self, key: &str) {
        self.values.remove(key);
    }
}

#[derive(Debug, Clone)]
struct MockWindow {
    browser: bool,
    corner_radius: u32,
    subscriptions: BTreeSet<EventSource>,
}

#[derive(Debug, Clone)]
struct MockSurface {
    window: WindowId,
    connected: bool,
    metadata: SurfaceMetadata,
    measurements: SurfaceMeasurements,
}

/// Deterministic in-memory host chrome.
#[derive(Debug, Default)]
pub struct MockChrome {
    config: MemoryConfig,
    windows: BTreeMap<WindowId, MockWindow>,
    surfaces: BTreeMap<SurfaceId, MockSurface>,
    /// Current effective value per style slot (only non-default values).
    styles: HashMap<StyleSlot, StyleChange>,
    /// Every `apply` call in order, including redundant ones.
    applied: Vec<StyleChange>,
    /// Every quiescence notification in order.
    quiescent: Vec<SurfaceId>,
    /// When set, `measure` fails for these surfaces.
    broken_measure: BTreeSet<SurfaceId>,
    /// When set, `apply` fails for these slots.
    broken_slots: BTreeSet<SurfaceId>,
}

impl MockChrome {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a browser window with the given decoration corner radius.
    pub fn add_window(&mut self, window: WindowId, corner_radius: u32) {
        self.windows.insert(
            window,
            MockWindow {
                browser: true,
                corner_radius,
                subscriptions: BTreeSet::new(),
            },
        );
    }

    /// Add a non-browser (dialog/helper) window.
    pub fn add_helper_window(&mut self, window: WindowId) {
        self.windows.insert(
            window,
            MockWindow {
                browser: false,
                corner_radius: 0,
                subscriptions: BTreeSet::new(),
            },
        );
    }

    /// Remove a window and all its surfaces (window closed).
    pub fn remove_window(&mut self, window: WindowId) {
        self.windows.remove(&window);
        self.surfaces.retain(|_, s| s.window != window);
    }

    /// Add a connected surface to a window.
    pub fn add_surface(
        &mut self,
        surface: SurfaceId,
        window: WindowId,
        metadata: SurfaceMetadata,
        measurements: SurfaceMeasurements,
    ) {
        self.surfaces.insert(
            surface,
            MockSurface {
                window,
                connected: true,
                metadata,
                measurements,
            },
        );
    }

    /// Replace a surface's geometry (host layout changed).
    pub fn set_measurements(&mut self, surface: SurfaceId, measurements: SurfaceMeasurements) {
        if let Some(s) = self.surfaces.get_mut(&surface) {
            s.measurements = measurements;
        }
    }

    /// Replace a surface's document metadata (navigation).
    pub fn set_metadata(&mut self, surface: SurfaceId, metadata: SurfaceMetadata) {
        if let Some(s) = self.surfaces.get_mut(&surface) {
            s.metadata = metadata;
        }
    }

    /// Mark a surface as disconnected (tab closing, document torn down).
    pub fn disconnect_surface(&mut self, surface: SurfaceId) {
        if let Some(s) = self.surfaces.get_mut(&surface) {
            s.connected = false;
        }
    }

    /// Make `measure` fail for a surface.
    pub fn break_measure(&mut self, surface: SurfaceId) {
        self.broken_measure.insert(surface);
    }

    /// Make `apply` fail for any per-surface slot of `surface`.
    pub fn break_styles(&mut self, surface: SurfaceId) {
        self.broken_slots.insert(surface);
    }

    /// The recorded `apply` calls, in order.
    #[must_use]
    pub fn applied(&self) -> &[StyleChange] {
        &self.applied
    }

    /// Drop the recorded `apply` calls (keep effective styles).
    pub fn clear_applied(&mut self) {
        self.applied.clear();
    }

    /// The current effective value of a style slot, if it differs from
    /// the slot's default.
    #[must_use]
    pub fn style(&self, slot: StyleSlot) -> Option<&StyleChange> {
        self.styles.get(&slot)
    }

    /// Number of style slots currently holding a non-default value.
    #[must_use]
    pub fn overridden_slot_count(&self) -> usize {
        self.styles.len()
    }

    /// The recorded quiescence notifications, in order.
    #[must_use]
    pub fn quiescent(&self) -> &[SurfaceId] {
        &self.quiescent
    }

    /// The event sources a window is currently subscribed to.
    #[must_use]
    pub fn subscriptions(&self, window: WindowId) -> Vec<EventSource> {
        self.windows
            .get(&window)
            .map(|w| w.subscriptions.iter().copied().collect())
            .unwrap_or_default()
    }

    fn slot_surface(slot: &StyleSlot) -> Option<SurfaceId> {
        match slot {
            StyleSlot::SurfaceSize(s)
            | StyleSlot::Excluded(s)
            | StyleSlot::CornerFlattened(s) => Some(*s),
            _ => None,
        }
    }
}

impl Chrome for MockChrome {
    type Error = MockChromeError;
    type Config = MemoryConfig;

    fn config(&self) -> &MemoryConfig {
        &self.config
    }

    fn config_mut(&mut self) -> &mut MemoryConfig {
        &mut self.config
    }

    fn windows(&self) -> Vec<WindowId> {
        self.windows.keys().copied().collect()
    }

    fn is_browser_window(&self, window: WindowId) -> bool {
        self.windows.get(&window).is_some_and(|w| w.browser)
    }

    fn surfaces(&self, window: WindowId) -> Vec<SurfaceId> {
        self.surfaces
            .iter()
            .filter(|(_, s)| s.window == window)
            .map(|(id, _)| *id)
            .collect()
    }

    fn window_of(&self, surface: SurfaceId) -> Option<WindowId> {
        self.surfaces.get(&surface).map(|s| s.window)
    }

    fn is_connected(&self, surface: SurfaceId) -> bool {
        self.surfaces.get(&surface).is_some_and(|s| s.connected)
    }

    fn metadata(&self, surface: SurfaceId) -> Option<SurfaceMetadata> {
        self.surfaces.get(&surface).map(|s| s.metadata.clone())
    }

    fn measure(&self, surface: SurfaceId) -> Result<SurfaceMeasurements, MockChromeError> {
        if self.broken_measure.contains(&surface) {
            return Err(MockChromeError(format!("geometry read failed for {surface}")));
        }
        self.surfaces
            .get(&surface)
            .map(|s| s.measurements)
            .ok_or_else(|| MockChromeError(format!("{surface} does not exist")))
    }

    fn corner_radius(&self, window: WindowId) -> u32 {
        self.windows.get(&window).map_or(0, |w| w.corner_radius)
    }

    fn apply(&mut self, change: &StyleChange) -> Result<(), MockChromeError> {
        let slot = change.slot();
        if let Some(surface) = Self::slot_surface(&slot) {
            if self.broken_slots.contains(&surface) {
                return Err(MockChromeError(format!("style write failed for {surface}")));
            }
        }
        self.applied.push(*change);
        if change.is_default() {
            self.styles.remove(&slot);
        } else {
            self.styles.insert(slot, *change);
        }
        Ok(())
    }

    fn subscribe(&mut self, window: WindowId, source: EventSource) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.subscriptions.insert(source);
        }
    }

    fn unsubscribe_window(&mut self, window: WindowId) {
        if let Some(w) = self.windows.get_mut(&window) {
            w.subscriptions.clear();
        }
    }

    fn notify_quiescent(&mut self, surface: SurfaceId) {
        self.quiescent.push(surface);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letterbox_core::Dimension;

    fn meta() -> SurfaceMetadata {
        SurfaceMetadata::content("https", "/")
    }

    fn measurements(size: Dimension) -> SurfaceMeasurements {
        SurfaceMeasurements {
            content: size,
            parent: size,
            container: size,
        }
    }

    #[test]
    fn windows_and_surfaces_enumerate() {
        let mut chrome = MockChrome::new();
        chrome.add_window(WindowId(1), 8);
        chrome.add_surface(
            SurfaceId(10),
            WindowId(1),
            meta(),
            measurements(Dimension::new(1000, 700)),
        );
        chrome.add_surface(
            SurfaceId(11),
            WindowId(1),
            meta(),
            measurements(Dimension::new(1000, 700)),
        );

        assert_eq!(chrome.windows(), vec![WindowId(1)]);
        assert_eq!(chrome.surfaces(WindowId(1)), vec![SurfaceId(10), SurfaceId(11)]);
        assert_eq!(chrome.window_of(SurfaceId(10)), Some(WindowId(1)));
        assert!(chrome.is_connected(SurfaceId(10)));
    }

    #[test]
    fn helper_windows_are_not_browser_windows() {
        let mut chrome = MockChrome::new();
        chrome.add_helper_window(WindowId(2));
        assert!(!chrome.is_browser_window(WindowId(2)));
        assert!(!chrome.is_browser_window(WindowId(99)));
    }

    #[test]
    fn remove_window_drops_its_surfaces() {
        let mut chrome = MockChrome::new();
        chrome.add_window(WindowId(1), 0);
        chrome.add_surface(
            SurfaceId(10),
            WindowId(1),
            meta(),
            measurements(Dimension::new(100, 100)),
        );
        chrome.remove_window(WindowId(1));
        assert!(chrome.window_of(SurfaceId(10)).is_none());
        assert!(!chrome.is_connected(SurfaceId(10)));
    }

    #[test]
    fn apply_tracks_effective_styles() {
        let mut chrome = MockChrome::new();
        let s = SurfaceId(1);
        let set = StyleChange::SurfaceSize {
            surface: s,
            size: Some(Dimension::new(800, 600)),
        };
        chrome.apply(&set).unwrap();
        assert_eq!(chrome.style(StyleSlot::SurfaceSize(s)), Some(&set));
        assert_eq!(chrome.overridden_slot_count(), 1);

        chrome
            .apply(&StyleChange::SurfaceSize {
                surface: s,
                size: None,
            })
            .unwrap();
        assert_eq!(chrome.style(StyleSlot::SurfaceSize(s)), None);
        assert_eq!(chrome.overridden_slot_count(), 0);
        assert_eq!(chrome.applied().len(), 2);
    }

    #[test]
    fn broken_style_slot_reports_error() {
        let mut chrome = MockChrome::new();
        let s = SurfaceId(1);
        chrome.break_styles(s);
        let err = chrome
            .apply(&StyleChange::Excluded {
                surface: s,
                excluded: true,
            })
            .unwrap_err();
        assert!(err.to_string().contains("style write failed"));
        // Window-level slots are unaffected.
        chrome
            .apply(&StyleChange::DefaultSize {
                window: WindowId(1),
                size: None,
            })
            .unwrap();
    }

    #[test]
    fn broken_measure_reports_error() {
        let mut chrome = MockChrome::new();
        chrome.add_window(WindowId(1), 0);
        chrome.add_surface(
            SurfaceId(10),
            WindowId(1),
            meta(),
            measurements(Dimension::new(100, 100)),
        );
        chrome.break_measure(SurfaceId(10));
        assert!(chrome.measure(SurfaceId(10)).is_err());
    }

    #[test]
    fn subscriptions_are_deduplicated_and_cleared() {
        let mut chrome = MockChrome::new();
        chrome.add_window(WindowId(1), 0);
        chrome.subscribe(WindowId(1), EventSource::TabOpen);
        chrome.subscribe(WindowId(1), EventSource::TabOpen);
        chrome.subscribe(WindowId(1), EventSource::ContainerResize(SurfaceId(10)));
        assert_eq!(chrome.subscriptions(WindowId(1)).len(), 2);

        chrome.unsubscribe_window(WindowId(1));
        assert!(chrome.subscriptions(WindowId(1)).is_empty());
    }

    #[test]
    fn memory_config_types_do_not_bleed() {
        let mut config = MemoryConfig::default();
        config.set_int("key", 3);
        assert!(!config.bool_value("key", false));
        assert_eq!(config.int_value("key", 0), 3);
        assert_eq!(config.string_value("key", "fallback"), "fallback");

        assert!(config.has_user_value("key"));
        config.clear("key");
        assert!(!config.has_user_value("key"));
        assert_eq!(config.int_value("key", 7), 7);
    }

    #[test]
    fn quiescent_notifications_record_in_order() {
        let mut chrome = MockChrome::new();
        chrome.notify_quiescent(SurfaceId(2));
        chrome.notify_quiescent(SurfaceId(1));
        assert_eq!(chrome.quiescent(), &[SurfaceId(2), SurfaceId(1)]);
    }
}
