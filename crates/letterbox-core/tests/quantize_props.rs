//! Property-based invariant tests for the quantization algorithms.
//!
//! ## Invariants
//!
//! 1. Monotonicity: quantized sizes never exceed the input componentwise
//! 2. Stepped values are exact multiples of their step
//! 3. Idempotence: quantizing a quantized size is a fixed point
//! 4. Table fit: a selected entry always fits the input
//! 5. Table fit is waste-optimal against a brute-force scan
//! 6. Parsing never panics and keeps only positive entries

use letterbox_core::{Dimension, DimensionTable, quantize, stepped_size};
use proptest::prelude::*;

fn arb_size() -> impl Strategy<Value = u32> {
    0u32..8000
}

fn arb_dimension() -> impl Strategy<Value = Dimension> {
    (1u32..4000, 1u32..4000).prop_map(|(w, h)| Dimension::new(w, h))
}

fn arb_table() -> impl Strategy<Value = DimensionTable> {
    prop::collection::vec(arb_dimension(), 0..12).prop_map(DimensionTable::from)
}

fn step_for(size: u32, is_width: bool) -> Option<u32> {
    if size <= 50 {
        None
    } else if size <= 500 {
        Some(50)
    } else if size <= 1600 {
        Some(if is_width { 200 } else { 100 })
    } else {
        Some(200)
    }
}

// ── 1. Monotonicity ───────────────────────────────────────────────────────

proptest! {
    #[test]
    fn quantize_never_rounds_up(w in arb_size(), h in arb_size(), table in arb_table()) {
        let q = quantize(Dimension::new(w, h), &table);
        prop_assert!(q.width <= w);
        prop_assert!(q.height <= h);
    }
}

// ── 2. Step alignment ─────────────────────────────────────────────────────

proptest! {
    #[test]
    fn stepped_size_is_step_aligned(size in arb_size(), is_width in any::<bool>()) {
        let rounded = stepped_size(size, is_width);
        match step_for(size, is_width) {
            None => prop_assert_eq!(rounded, 0),
            Some(step) => {
                prop_assert_eq!(rounded % step, 0);
                // Rounding down never loses a full step.
                prop_assert!(size - rounded < step);
            }
        }
    }
}

// ── 3. Idempotence ────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn default_stepping_is_a_fixed_point(w in arb_size(), h in arb_size()) {
        let empty = DimensionTable::new();
        let once = quantize(Dimension::new(w, h), &empty);
        prop_assert_eq!(quantize(once, &empty), once);
    }
}

// ── 4 & 5. Table fit correctness and optimality ───────────────────────────

proptest! {
    #[test]
    fn best_fit_entry_fits_and_is_optimal(avail in arb_dimension(), table in arb_table()) {
        let best = table.best_fit(avail);
        let brute: Option<u64> = table
            .entries()
            .iter()
            .filter(|d| d.fits_within(avail))
            .map(|d| avail.area() - d.area())
            .min();

        match (best, brute) {
            (None, None) => {}
            (Some(chosen), Some(min_waste)) => {
                prop_assert!(chosen.fits_within(avail));
                prop_assert_eq!(avail.area() - chosen.area(), min_waste);
            }
            (got, want) => prop_assert!(false, "fit mismatch: {:?} vs waste {:?}", got, want),
        }
    }
}

// ── 6. Parsing robustness ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn parse_never_panics(raw in "[0-9a-zA-Z x,]*") {
        let table = DimensionTable::parse(&raw);
        for dim in table.entries() {
            prop_assert!(dim.width > 0);
            prop_assert!(dim.height > 0);
        }
    }

    #[test]
    fn parse_accepts_generated_tables(table in arb_table()) {
        let reparsed = DimensionTable::parse(&table.to_string());
        prop_assert_eq!(reparsed, table);
    }
}
