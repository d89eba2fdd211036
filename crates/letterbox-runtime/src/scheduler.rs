#![forbid(unsafe_code)]

//! Coalescing update queue and delta-only style application.
//!
//! The host delivers resize, navigation, and tab-open notifications far
//! faster than the engine wants to touch layout. Two structures absorb the
//! flood:
//!
//! - [`UpdateQueue`] holds at most one pending update per surface. A burst
//!   of events for the same surface coalesces into a single entry; the
//!   queue is drained once per layout pass.
//! - [`StyleLedger`] + [`PaintBatch`] implement the read-then-write
//!   discipline: the layout pass computes desired style values and queues
//!   only those that differ from what was last applied (or is already
//!   pending); the paint pass applies the batch in one go.
//!
//! Both are plain single-threaded value types; the coordinator owns them.

use std::collections::HashMap;

use letterbox_chrome::{Chrome, StyleChange, StyleSlot};
use letterbox_core::SurfaceId;

/// One coalesced update request for a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRequest {
    pub surface: SurfaceId,
    /// Whether any coalesced trigger was a tab-open. New surfaces cannot
    /// carry extra UI chrome yet, so the controller skips the inline
    /// override for them.
    pub is_new: bool,
}

/// At most one pending update per surface; requests coalesce.
#[derive(Debug, Clone, Default)]
pub struct UpdateQueue {
    pending: Vec<UpdateRequest>,
}

impl UpdateQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request an update for a surface. A request for an already-pending
    /// surface coalesces into the existing entry (`is_new` ORs in).
    pub fn request(&mut self, surface: SurfaceId, is_new: bool) {
        if let Some(existing) = self.pending.iter_mut().find(|r| r.surface == surface) {
            existing.is_new |= is_new;
        } else {
            self.pending.push(UpdateRequest { surface, is_new });
        }
    }

    /// Take all pending requests, in first-requested order.
    #[must_use]
    pub fn drain(&mut self) -> Vec<UpdateRequest> {
        std::mem::take(&mut self.pending)
    }

    /// Drop every pending request (feature disabled mid-flight).
    pub fn clear(&mut self) {
        self.pending.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn contains(&self, surface: SurfaceId) -> bool {
        self.pending.iter().any(|r| r.surface == surface)
    }
}

/// Style mutations queued for the next paint pass, one slot each.
///
/// Queueing a second change for a slot replaces the pending value in
/// place; application order is first-queued order.
#[derive(Debug, Clone, Default)]
pub struct PaintBatch {
    changes: Vec<StyleChange>,
}

impl PaintBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, slot: StyleSlot) -> Option<usize> {
        self.changes.iter().position(|c| c.slot() == slot)
    }

    /// The pending change for a slot, if any.
    #[must_use]
    pub fn pending(&self, slot: StyleSlot) -> Option<&StyleChange> {
        self.position(slot).map(|i| &self.changes[i])
    }

    fn put(&mut self, change: StyleChange) {
        match self.position(change.slot()) {
            Some(i) => self.changes[i] = change,
            None => self.changes.push(change),
        }
    }

    fn remove(&mut self, slot: StyleSlot) {
        if let Some(i) = self.position(slot) {
            self.changes.remove(i);
        }
    }

    /// Take all pending changes, in first-queued order.
    #[must_use]
    pub fn drain(&mut self) -> Vec<StyleChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn clear(&mut self) {
        self.changes.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.changes.len()
    }
}

/// Last-applied style values, used to queue only real deltas.
///
/// Slots holding their default value have no entry; queueing a default
/// value for an untouched slot is skipped entirely.
#[derive(Debug, Clone, Default)]
pub struct StyleLedger {
    applied: HashMap<StyleSlot, StyleChange>,
}

impl StyleLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue `change` into `batch` if it differs from the last-applied
    /// value; a stale pending entry for the slot is replaced (or removed,
    /// when the desired value is what is already in effect) so the last
    /// update wins. Returns whether the slot needs a write.
    pub fn queue(&self, batch: &mut PaintBatch, change: StyleChange) -> bool {
        let slot = change.slot();
        let needed = match self.applied.get(&slot) {
            Some(current) => *current != change,
            None => !change.is_default(),
        };
        if needed {
            batch.put(change);
        } else {
            batch.remove(slot);
        }
        needed
    }

    /// Record a change as applied.
    pub fn record(&mut self, change: StyleChange) {
        let slot = change.slot();
        if change.is_default() {
            self.applied.remove(&slot);
        } else {
            self.applied.insert(slot, change);
        }
    }

    /// The recorded value for a slot, if it differs from the default.
    #[must_use]
    pub fn applied(&self, slot: StyleSlot) -> Option<&StyleChange> {
        self.applied.get(&slot)
    }

    /// Number of slots holding a non-default value.
    #[must_use]
    pub fn overridden_slots(&self) -> usize {
        self.applied.len()
    }

    /// Drop recorded entries whose slot matches the predicate (surfaces or
    /// windows that no longer exist).
    pub fn prune(&mut self, mut dead: impl FnMut(StyleSlot) -> bool) {
        self.applied.retain(|slot, _| !dead(*slot));
    }
}

/// Apply a batch through the chrome, recording successes in the ledger.
///
/// A failing style write is logged and skipped; the rest of the batch
/// still lands. Nothing propagates to the caller.
pub fn commit_batch<C: Chrome>(chrome: &mut C, ledger: &mut StyleLedger, batch: &mut PaintBatch) {
    for change in batch.drain() {
        match chrome.apply(&change) {
            Ok(()) => ledger.record(change),
            Err(error) => {
                tracing::error!(?change, %error, "style mutation failed; continuing batch");
            }
        }
    }
}
