#![forbid(unsafe_code)]

//! Size quantization: stepped rounding and dimension-table fitting.
//!
//! Maps an arbitrary content-area size to one of a small set of buckets so
//! that viewport dimensions cannot identify a specific user. Two strategies:
//!
//! - **Dimension table**: an explicit, configured list of `WxH` buckets.
//!   [`quantize`] picks the fitting entry that wastes the least content
//!   area; when nothing fits it returns the input unchanged (never a size
//!   larger than what is available).
//! - **Default stepping**: with an empty table, each axis is rounded down
//!   to a step that grows with the size, so small viewports land on fine
//!   buckets and large viewports on coarse ones.
//!
//! Everything here is pure: no configuration reads, no host state.

use crate::geometry::Dimension;

/// Round a single axis down with the default stepping.
///
/// Width and height use different steps in the mid range, reflecting
/// typical display aspect ratios. Sizes at or below the minimum bucket
/// collapse to `0`.
#[must_use]
pub const fn stepped_size(size: u32, is_width: bool) -> u32 {
    if size <= 50 {
        return 0;
    }
    let stepping = if size <= 500 {
        50
    } else if size <= 1600 {
        if is_width { 200 } else { 100 }
    } else {
        200
    };
    size - size % stepping
}

/// An ordered set of allowed letterboxing sizes.
///
/// Parsed from the `"W1xH1, W2xH2, ..."` configuration string. An empty
/// table is valid and selects the default stepping.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DimensionTable {
    entries: Vec<Dimension>,
}

impl DimensionTable {
    /// The empty table (default stepping).
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Parse a `"W1xH1, W2xH2, ..."` configuration string.
    ///
    /// Malformed entries (missing `x`, non-numeric, zero axes) are dropped
    /// with a warning; parsing itself never fails. An entirely malformed
    /// string yields the empty table.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut entries = Vec::new();
        for item in raw.split(',') {
            let item = item.trim();
            if item.is_empty() {
                continue;
            }
            match parse_entry(item) {
                Some(dim) => entries.push(dim),
                None => {
                    tracing::warn!(entry = item, "ignoring malformed dimension entry");
                }
            }
        }
        Self { entries }
    }

    /// The entries in their original configuration order.
    #[must_use]
    pub fn entries(&self) -> &[Dimension] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Find the entry that fits within `avail` and wastes the least area.
    ///
    /// Ties are broken by table order: the first entry with the minimal
    /// non-negative waste wins. Returns `None` when no entry fits.
    #[must_use]
    pub fn best_fit(&self, avail: Dimension) -> Option<Dimension> {
        let avail_area = avail.area();
        let mut min_waste = u64::MAX;
        let mut target = None;
        for &dim in &self.entries {
            if !dim.fits_within(avail) {
                continue;
            }
            let waste = avail_area - dim.area();
            if waste < min_waste {
                target = Some(dim);
                min_waste = waste;
            }
        }
        target
    }
}

impl From<Vec<Dimension>> for DimensionTable {
    fn from(entries: Vec<Dimension>) -> Self {
        Self { entries }
    }
}

impl core::fmt::Display for DimensionTable {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        for (i, dim) in self.entries.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{dim}")?;
        }
        Ok(())
    }
}

fn parse_entry(item: &str) -> Option<Dimension> {
    let (w, h) = item.split_once('x')?;
    let width: u32 = w.trim().parse().ok()?;
    let height: u32 = h.trim().parse().ok()?;
    if width == 0 || height == 0 {
        return None;
    }
    Some(Dimension::new(width, height))
}

/// Quantize a raw size against a dimension table.
///
/// With a non-empty table, picks the best-fitting entry; if the available
/// area is smaller than every entry, the raw size is returned unchanged.
/// With an empty table, applies [`stepped_size`] per axis.
#[must_use]
pub fn quantize(size: Dimension, table: &DimensionTable) -> Dimension {
    if table.is_empty() {
        return Dimension::new(
            stepped_size(size.width, true),
            stepped_size(size.height, false),
        );
    }
    table.best_fit(size).unwrap_or(size)
}
