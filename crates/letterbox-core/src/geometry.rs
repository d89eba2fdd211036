#![forbid(unsafe_code)]

//! Geometric primitives for content-surface sizing.

/// A content-surface size in CSS pixels.
///
/// The zero dimension is meaningful: the default stepping collapses any
/// axis at or below the minimum bucket to `0` ("nothing to show").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "policy-config", derive(serde::Serialize, serde::Deserialize))]
pub struct Dimension {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimension {
    /// The empty size.
    pub const ZERO: Dimension = Dimension::new(0, 0);

    /// Create a new dimension.
    #[inline]
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Area in square pixels.
    #[inline]
    #[must_use]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Check whether either axis is zero.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Check whether this size fits inside `outer` on both axes.
    #[inline]
    #[must_use]
    pub const fn fits_within(&self, outer: Dimension) -> bool {
        self.width <= outer.width && self.height <= outer.height
    }
}

impl core::fmt::Display for Dimension {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Opaque handle to a top-level browser window owned by the host chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WindowId(pub u64);

/// Opaque handle to one content surface (a tab's viewport) within a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(pub u64);

impl core::fmt::Display for WindowId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "window#{}", self.0)
    }
}

impl core::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}
