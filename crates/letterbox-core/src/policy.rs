#![forbid(unsafe_code)]

//! Global letterboxing policy state.
//!
//! [`LetterboxPolicy`] is the process-wide snapshot of every observed
//! configuration key. It has exactly one writer (the coordinator, driven by
//! configuration-change notifications) and many readers (every surface
//! update pass), so it is shared through [`SharedPolicy`], a lock-free
//! swap cell: readers get a consistent `Arc` snapshot, the writer replaces
//! the whole snapshot atomically.
//!
//! With the `policy-config` feature a startup snapshot can also be loaded
//! from TOML or JSON:
//!
//! ```toml
//! # letterbox-policy.toml
//! enabled = true
//! vcenter = false
//! dimensions = "800x600, 1000x1000"
//! ```
//!
//! Every field defaults to the disabled/empty value, so
//! `LetterboxPolicy::default()` matches a fresh profile.

use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::quantize::DimensionTable;

#[cfg(feature = "policy-config")]
use std::path::Path;

/// Snapshot of the letterboxing configuration.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "policy-config", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "policy-config", serde(default))]
pub struct LetterboxPolicy {
    /// Master switch; drives attach/detach of all windows.
    pub enabled: bool,
    /// Vertically center rounded content in the leftover space.
    pub vcenter: bool,
    /// Paint a decorative gradient in the margin area.
    pub gradient: bool,
    /// Explicit size buckets; empty selects the default stepping.
    #[cfg_attr(
        feature = "policy-config",
        serde(
            serialize_with = "serde_support::table_to_string",
            deserialize_with = "serde_support::table_from_string"
        )
    )]
    pub dimensions: DimensionTable,
    /// Emit deterministic quiescence notifications for automated tests.
    pub testing: bool,
}

impl LetterboxPolicy {
    /// Load from a TOML string.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, PolicyConfigError> {
        toml::from_str(s).map_err(PolicyConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PolicyConfigError::Io)?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "policy-config")]
    pub fn from_json_str(s: &str) -> Result<Self, PolicyConfigError> {
        serde_json::from_str(s).map_err(PolicyConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "policy-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PolicyConfigError> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(PolicyConfigError::Io)?;
        Self::from_json_str(&content)
    }
}

/// Error loading a policy snapshot from a file.
#[cfg(feature = "policy-config")]
#[derive(Debug)]
pub enum PolicyConfigError {
    Io(std::io::Error),
    Toml(toml::de::Error),
    Json(serde_json::Error),
}

#[cfg(feature = "policy-config")]
impl core::fmt::Display for PolicyConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PolicyConfigError::Io(e) => write!(f, "failed to read policy file: {e}"),
            PolicyConfigError::Toml(e) => write!(f, "invalid policy TOML: {e}"),
            PolicyConfigError::Json(e) => write!(f, "invalid policy JSON: {e}"),
        }
    }
}

#[cfg(feature = "policy-config")]
impl std::error::Error for PolicyConfigError {}

#[cfg(feature = "policy-config")]
mod serde_support {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::quantize::DimensionTable;

    pub fn table_to_string<S: Serializer>(
        table: &DimensionTable,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&table.to_string())
    }

    pub fn table_from_string<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DimensionTable, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(DimensionTable::parse(&raw))
    }
}

/// Single-writer, many-reader cell holding the current policy snapshot.
///
/// Clones share the same underlying cell.
#[derive(Debug, Clone)]
pub struct SharedPolicy {
    inner: Arc<ArcSwap<LetterboxPolicy>>,
}

impl Default for SharedPolicy {
    fn default() -> Self {
        Self::new(LetterboxPolicy::default())
    }
}

impl SharedPolicy {
    #[must_use]
    pub fn new(policy: LetterboxPolicy) -> Self {
        Self {
            inner: Arc::new(ArcSwap::from_pointee(policy)),
        }
    }

    /// A consistent snapshot of the current policy.
    #[must_use]
    pub fn load(&self) -> Arc<LetterboxPolicy> {
        self.inner.load_full()
    }

    /// Replace the snapshot. The coordinator is the only caller.
    pub fn store(&self, policy: LetterboxPolicy) {
        self.inner.store(Arc::new(policy));
    }
}
