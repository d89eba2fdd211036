#![forbid(unsafe_code)]

//! Per-surface size controller.
//!
//! One update pass decides everything a single surface needs: whether the
//! document is exempt, which bucket the window's container rounds to,
//! whether extra UI chrome forces a surface-specific override, and whether
//! the decorative corner must be flattened. The pass only *reads* host
//! state; every resulting mutation goes through the
//! [`StyleLedger`](crate::scheduler::StyleLedger) into the paint batch, so
//! a pass that computes the already-applied values queues nothing.
//!
//! Failure semantics: a pass is best-effort. Geometry that cannot be read
//! (surface mid-teardown, zero-size container) aborts the pass silently;
//! the next triggering event retries.

use letterbox_chrome::{Chrome, StyleChange, StyleSlot};
use letterbox_core::{LetterboxPolicy, SurfaceId, WindowId, quantize};

use crate::scheduler::{PaintBatch, StyleLedger, commit_batch};

/// Result of one update pass over a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// The surface is gone or its geometry was unreadable; nothing queued.
    Aborted,
    /// The document is exempt; the surface was marked excluded.
    Exempt,
    /// The surface was rounded; `changed` is whether any style delta was
    /// actually queued.
    Rounded { changed: bool },
}

/// Computes and applies rounded sizes for surfaces.
///
/// Owns the style ledger; the coordinator shares one controller across
/// every surface so deltas are diffed against the same applied state.
#[derive(Debug, Default)]
pub struct SurfaceSizeController {
    ledger: StyleLedger,
}

impl SurfaceSizeController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Run one update pass for `surface`, queueing style deltas into
    /// `batch`. Read-only with respect to the chrome.
    pub fn update<C: Chrome>(
        &self,
        chrome: &C,
        policy: &LetterboxPolicy,
        batch: &mut PaintBatch,
        surface: SurfaceId,
        is_new: bool,
    ) -> UpdateOutcome {
        let Some(window) = chrome.window_of(surface) else {
            return UpdateOutcome::Aborted;
        };
        let Some(metadata) = chrome.metadata(surface) else {
            return UpdateOutcome::Aborted;
        };

        if metadata.is_exempt() {
            self.ledger.queue(
                batch,
                StyleChange::Excluded {
                    surface,
                    excluded: true,
                },
            );
            // A previous document on this surface may have left an override.
            self.ledger.queue(
                batch,
                StyleChange::SurfaceSize {
                    surface,
                    size: None,
                },
            );
            return UpdateOutcome::Exempt;
        }

        let mut changed = self.ledger.queue(
            batch,
            StyleChange::Excluded {
                surface,
                excluded: false,
            },
        );

        let m = match chrome.measure(surface) {
            Ok(m) => m,
            Err(error) => {
                tracing::debug!(%surface, %error, "geometry unavailable; skipping pass");
                return UpdateOutcome::Aborted;
            }
        };
        if m.container.width == 0 {
            // Tab already closing; retried on the next event.
            tracing::trace!(%surface, "zero-width container; skipping pass");
            return UpdateOutcome::Aborted;
        }

        tracing::trace!(
            %surface,
            content = %m.content,
            parent = %m.parent,
            container = %m.container,
            is_new,
            "rounding surface"
        );

        let rounded_default = quantize(m.container, &policy.dimensions);
        changed |= self.ledger.queue(
            batch,
            StyleChange::DefaultSize {
                window,
                size: Some(rounded_default),
            },
        );
        let mut last_rounded = rounded_default;

        // Optional UI chrome (notification box, find bar, devtools) shrinks
        // the parent below the container; such surfaces need their own
        // override. Fresh tabs cannot carry extra chrome yet.
        let constrained =
            m.container.height > m.parent.height || m.container.width > m.parent.width;
        if !is_new && constrained {
            last_rounded = quantize(m.parent, &policy.dimensions);
            changed |= self.ledger.queue(
                batch,
                StyleChange::SurfaceSize {
                    surface,
                    size: Some(last_rounded),
                },
            );
        } else {
            changed |= self.ledger.queue(
                batch,
                StyleChange::SurfaceSize {
                    surface,
                    size: None,
                },
            );
        }

        // When the letterboxing margin is thinner than the corner radius,
        // the rounded corner would be visibly clipped; flatten it.
        let radius = chrome.corner_radius(window);
        if radius > 0 {
            let gap_w = i64::from(m.parent.width) - i64::from(last_rounded.width);
            let gap_h = i64::from(m.parent.height) - i64::from(last_rounded.height);
            let flattened = gap_w < i64::from(radius) && gap_h < i64::from(radius);
            changed |= self.ledger.queue(
                batch,
                StyleChange::CornerFlattened { surface, flattened },
            );
        }

        UpdateOutcome::Rounded { changed }
    }

    /// Queue resets returning every managed style of `surface` to its
    /// default, so no stale rounding persists.
    pub fn queue_surface_reset(&self, batch: &mut PaintBatch, surface: SurfaceId) {
        self.ledger.queue(
            batch,
            StyleChange::SurfaceSize {
                surface,
                size: None,
            },
        );
        self.ledger.queue(
            batch,
            StyleChange::Excluded {
                surface,
                excluded: false,
            },
        );
        self.ledger.queue(
            batch,
            StyleChange::CornerFlattened {
                surface,
                flattened: false,
            },
        );
    }

    /// Queue resets for a window's shared rules.
    pub fn queue_window_reset(&self, batch: &mut PaintBatch, window: WindowId) {
        self.ledger.queue(
            batch,
            StyleChange::DefaultSize { window, size: None },
        );
        self.ledger.queue(
            batch,
            StyleChange::WindowClasses {
                window,
                classes: Default::default(),
            },
        );
    }

    /// Queue an arbitrary change through the ledger diff.
    pub fn queue(&self, batch: &mut PaintBatch, change: StyleChange) -> bool {
        self.ledger.queue(batch, change)
    }

    /// Apply one change immediately (outside the batch), diffing against
    /// the ledger first. Failures are logged and swallowed.
    pub fn apply_direct<C: Chrome>(&mut self, chrome: &mut C, change: StyleChange) {
        if self.ledger.applied(change.slot()) == Some(&change) {
            return;
        }
        if self.ledger.applied(change.slot()).is_none() && change.is_default() {
            return;
        }
        match chrome.apply(&change) {
            Ok(()) => self.ledger.record(change),
            Err(error) => {
                tracing::error!(?change, %error, "direct style mutation failed");
            }
        }
    }

    /// Apply a paint batch through the chrome, recording what landed.
    pub fn commit<C: Chrome>(&mut self, chrome: &mut C, batch: &mut PaintBatch) {
        commit_batch(chrome, &mut self.ledger, batch);
    }

    /// The recorded value for a slot, if any.
    #[must_use]
    pub fn applied(&self, slot: StyleSlot) -> Option<&StyleChange> {
        self.ledger.applied(slot)
    }

    /// Number of slots currently holding a non-default value.
    #[must_use]
    pub fn overridden_slots(&self) -> usize {
        self.ledger.overridden_slots()
    }

    /// Drop ledger entries for slots matching the predicate.
    pub fn prune(&mut self, dead: impl FnMut(StyleSlot) -> bool) {
        self.ledger.prune(dead);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letterbox_chrome::{MockChrome, SurfaceMeasurements};
    use letterbox_core::{Dimension, DimensionTable, PrincipalKind, SurfaceMetadata};

    const W: WindowId = WindowId(1);
    const S: SurfaceId = SurfaceId(10);

    fn uniform(size: Dimension) -> SurfaceMeasurements {
        SurfaceMeasurements {
            content: size,
            parent: size,
            container: size,
        }
    }

    fn chrome_with_surface(radius: u32, m: SurfaceMeasurements) -> MockChrome {
        let mut chrome = MockChrome::new();
        chrome.add_window(W, radius);
        chrome.add_surface(S, W, SurfaceMetadata::content("https", "/"), m);
        chrome
    }

    fn run(
        controller: &mut SurfaceSizeController,
        chrome: &mut MockChrome,
        policy: &LetterboxPolicy,
        is_new: bool,
    ) -> UpdateOutcome {
        let mut batch = PaintBatch::new();
        let outcome = controller.update(chrome, policy, &mut batch, S, is_new);
        controller.commit(chrome, &mut batch);
        outcome
    }

    #[test]
    fn rounds_container_to_default_rule() {
        let mut chrome = chrome_with_surface(0, uniform(Dimension::new(1234, 789)));
        let mut controller = SurfaceSizeController::new();
        let outcome = run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);

        assert_eq!(outcome, UpdateOutcome::Rounded { changed: true });
        assert_eq!(
            controller.applied(StyleSlot::DefaultSize(W)),
            Some(&StyleChange::DefaultSize {
                window: W,
                size: Some(Dimension::new(1200, 700)),
            })
        );
        // No extra chrome: the surface falls back to the shared rule.
        assert!(controller.applied(StyleSlot::SurfaceSize(S)).is_none());
    }

    #[test]
    fn second_pass_with_same_geometry_queues_nothing() {
        let mut chrome = chrome_with_surface(0, uniform(Dimension::new(1234, 789)));
        let mut controller = SurfaceSizeController::new();
        run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        chrome.clear_applied();

        let outcome = run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        assert_eq!(outcome, UpdateOutcome::Rounded { changed: false });
        assert!(chrome.applied().is_empty());
    }

    #[test]
    fn exempt_surface_is_excluded() {
        let mut chrome = chrome_with_surface(0, uniform(Dimension::new(1000, 700)));
        chrome.set_metadata(S, SurfaceMetadata::content("about", "preferences"));
        let mut controller = SurfaceSizeController::new();
        let outcome = run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);

        assert_eq!(outcome, UpdateOutcome::Exempt);
        assert_eq!(
            controller.applied(StyleSlot::Excluded(S)),
            Some(&StyleChange::Excluded {
                surface: S,
                excluded: true,
            })
        );
        assert!(controller.applied(StyleSlot::DefaultSize(W)).is_none());
    }

    #[test]
    fn navigation_away_from_exempt_page_clears_exclusion() {
        let mut chrome = chrome_with_surface(0, uniform(Dimension::new(1000, 700)));
        chrome.set_metadata(S, SurfaceMetadata::content("about", "preferences"));
        let mut controller = SurfaceSizeController::new();
        run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);

        chrome.set_metadata(S, SurfaceMetadata::content("https", "/page"));
        run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        assert!(controller.applied(StyleSlot::Excluded(S)).is_none());
        assert!(controller.applied(StyleSlot::DefaultSize(W)).is_some());
    }

    #[test]
    fn system_principal_is_excluded() {
        let mut chrome = chrome_with_surface(0, uniform(Dimension::new(1000, 700)));
        chrome.set_metadata(
            S,
            SurfaceMetadata::content("chrome", "browser.xhtml")
                .with_principal(PrincipalKind::System),
        );
        let mut controller = SurfaceSizeController::new();
        assert_eq!(
            run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false),
            UpdateOutcome::Exempt
        );
    }

    #[test]
    fn constrained_parent_gets_inline_override() {
        // A notification bar shrank the parent below the container.
        let mut chrome = chrome_with_surface(
            0,
            SurfaceMeasurements {
                content: Dimension::new(1200, 660),
                parent: Dimension::new(1234, 660),
                container: Dimension::new(1234, 789),
            },
        );
        let mut controller = SurfaceSizeController::new();
        run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);

        assert_eq!(
            controller.applied(StyleSlot::SurfaceSize(S)),
            Some(&StyleChange::SurfaceSize {
                surface: S,
                size: Some(Dimension::new(1200, 600)),
            })
        );
    }

    #[test]
    fn new_tab_never_gets_inline_override() {
        let mut chrome = chrome_with_surface(
            0,
            SurfaceMeasurements {
                content: Dimension::new(1200, 660),
                parent: Dimension::new(1234, 660),
                container: Dimension::new(1234, 789),
            },
        );
        let mut controller = SurfaceSizeController::new();
        run(&mut controller, &mut chrome, &LetterboxPolicy::default(), true);
        assert!(controller.applied(StyleSlot::SurfaceSize(S)).is_none());
    }

    #[test]
    fn override_clears_when_chrome_goes_away() {
        let constrained = SurfaceMeasurements {
            content: Dimension::new(1200, 660),
            parent: Dimension::new(1234, 660),
            container: Dimension::new(1234, 789),
        };
        let mut chrome = chrome_with_surface(0, constrained);
        let mut controller = SurfaceSizeController::new();
        run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        assert!(controller.applied(StyleSlot::SurfaceSize(S)).is_some());

        chrome.set_measurements(S, uniform(Dimension::new(1234, 789)));
        run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        assert!(controller.applied(StyleSlot::SurfaceSize(S)).is_none());
    }

    #[test]
    fn uses_dimension_table_when_configured() {
        let mut chrome = chrome_with_surface(0, uniform(Dimension::new(1234, 789)));
        let mut controller = SurfaceSizeController::new();
        let policy = LetterboxPolicy {
            dimensions: DimensionTable::from(vec![
                Dimension::new(1000, 700),
                Dimension::new(800, 600),
            ]),
            ..LetterboxPolicy::default()
        };
        run(&mut controller, &mut chrome, &policy, false);
        assert_eq!(
            controller.applied(StyleSlot::DefaultSize(W)),
            Some(&StyleChange::DefaultSize {
                window: W,
                size: Some(Dimension::new(1000, 700)),
            })
        );
    }

    #[test]
    fn thin_margin_flattens_corner() {
        // 1234x789 rounds to 1200x700: gaps 34 and 89. Radius 40 flattens
        // only if BOTH gaps are under it, so use radius 100 here.
        let mut chrome = chrome_with_surface(100, uniform(Dimension::new(1234, 789)));
        let mut controller = SurfaceSizeController::new();
        run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        assert_eq!(
            controller.applied(StyleSlot::CornerFlattened(S)),
            Some(&StyleChange::CornerFlattened {
                surface: S,
                flattened: true,
            })
        );
    }

    #[test]
    fn wide_margin_keeps_corner() {
        let mut chrome = chrome_with_surface(8, uniform(Dimension::new(1234, 789)));
        let mut controller = SurfaceSizeController::new();
        run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        // Gap 34x89 >= radius 8 on both axes: default (unflattened) stays
        // unqueued because the slot was never overridden.
        assert!(controller.applied(StyleSlot::CornerFlattened(S)).is_none());
    }

    #[test]
    fn corner_restores_after_margin_grows() {
        let mut chrome = chrome_with_surface(100, uniform(Dimension::new(1234, 789)));
        let mut controller = SurfaceSizeController::new();
        run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        assert!(controller.applied(StyleSlot::CornerFlattened(S)).is_some());

        chrome.set_measurements(S, uniform(Dimension::new(1250, 950)));
        run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        // 1250x950 rounds to 1200x900: gaps 50 and 50, both under the
        // radius, so the corner stays flat.
        assert!(controller.applied(StyleSlot::CornerFlattened(S)).is_some());

        chrome.set_measurements(S, uniform(Dimension::new(1500, 1101)));
        run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        // 1500x1101 rounds to 1400x1100: gaps 100x1. The width gap reaches the
        // radius, corner restored.
        assert!(controller.applied(StyleSlot::CornerFlattened(S)).is_none());
    }

    #[test]
    fn zero_width_container_aborts() {
        let mut chrome = chrome_with_surface(
            0,
            SurfaceMeasurements {
                content: Dimension::ZERO,
                parent: Dimension::ZERO,
                container: Dimension::new(0, 500),
            },
        );
        let mut controller = SurfaceSizeController::new();
        let outcome = run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        assert_eq!(outcome, UpdateOutcome::Aborted);
        assert!(controller.applied(StyleSlot::DefaultSize(W)).is_none());
    }

    #[test]
    fn measure_failure_aborts_without_panicking() {
        let mut chrome = chrome_with_surface(0, uniform(Dimension::new(1000, 700)));
        chrome.break_measure(S);
        let mut controller = SurfaceSizeController::new();
        let outcome = run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        assert_eq!(outcome, UpdateOutcome::Aborted);
    }

    #[test]
    fn missing_surface_aborts() {
        let mut chrome = MockChrome::new();
        chrome.add_window(W, 0);
        let mut controller = SurfaceSizeController::new();
        let outcome = run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        assert_eq!(outcome, UpdateOutcome::Aborted);
    }

    #[test]
    fn resets_clear_every_override() {
        let mut chrome = chrome_with_surface(
            100,
            SurfaceMeasurements {
                content: Dimension::new(1200, 660),
                parent: Dimension::new(1234, 660),
                container: Dimension::new(1234, 789),
            },
        );
        let mut controller = SurfaceSizeController::new();
        run(&mut controller, &mut chrome, &LetterboxPolicy::default(), false);
        assert!(controller.overridden_slots() > 0);

        let mut batch = PaintBatch::new();
        controller.queue_surface_reset(&mut batch, S);
        controller.queue_window_reset(&mut batch, W);
        controller.commit(&mut chrome, &mut batch);
        assert_eq!(controller.overridden_slots(), 0);
        assert_eq!(chrome.overridden_slot_count(), 0);
    }
}
