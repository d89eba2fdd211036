#![forbid(unsafe_code)]

//! Typed chrome events consumed by the letterboxing engine.
//!
//! The host glue translates its ad hoc notifications (window watcher,
//! tab-open DOM events, progress listeners, configuration observers) into
//! these payloads and feeds them to the coordinator. Each event kind
//! carries exactly the handles the engine needs; no string topics.

use crate::geometry::{SurfaceId, WindowId};

/// A configuration key observed by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKey {
    /// Master letterboxing switch; drives window attach/detach.
    Enabled,
    /// Vertical centering of rounded content in the leftover space.
    Vcenter,
    /// Decorative gradient fill in the margin area.
    Gradient,
    /// Explicit dimension table (`"W1xH1, W2xH2, ..."`).
    Dimensions,
    /// Deterministic quiescence notifications for automated tests.
    Testing,
    /// Spoof-English tri-state (prompt / off / on).
    SpoofEnglish,
    /// The accept-languages value spoof-English pins.
    AcceptLanguages,
    /// Certificate revocation filter downloads.
    RevocationFilters,
}

impl PolicyKey {
    /// The configuration-store name for this key.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            PolicyKey::Enabled => keys::ENABLED,
            PolicyKey::Vcenter => keys::VCENTER,
            PolicyKey::Gradient => keys::GRADIENT,
            PolicyKey::Dimensions => keys::DIMENSIONS,
            PolicyKey::Testing => keys::TESTING,
            PolicyKey::SpoofEnglish => keys::SPOOF_ENGLISH,
            PolicyKey::AcceptLanguages => keys::ACCEPT_LANGUAGES,
            PolicyKey::RevocationFilters => keys::REVOCATION_FILTERS,
        }
    }

    /// Map a configuration-store name back to its key.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            keys::ENABLED => Some(PolicyKey::Enabled),
            keys::VCENTER => Some(PolicyKey::Vcenter),
            keys::GRADIENT => Some(PolicyKey::Gradient),
            keys::DIMENSIONS => Some(PolicyKey::Dimensions),
            keys::TESTING => Some(PolicyKey::Testing),
            keys::SPOOF_ENGLISH => Some(PolicyKey::SpoofEnglish),
            keys::ACCEPT_LANGUAGES => Some(PolicyKey::AcceptLanguages),
            keys::REVOCATION_FILTERS => Some(PolicyKey::RevocationFilters),
            _ => None,
        }
    }
}

/// Configuration-store key names.
pub mod keys {
    pub const ENABLED: &str = "privacy.letterboxing";
    pub const VCENTER: &str = "privacy.letterboxing.vcenter";
    pub const GRADIENT: &str = "privacy.letterboxing.gradient";
    pub const DIMENSIONS: &str = "privacy.letterboxing.dimensions";
    pub const TESTING: &str = "privacy.letterboxing.testing";
    pub const SPOOF_ENGLISH: &str = "privacy.spoof-english";
    pub const ACCEPT_LANGUAGES: &str = "intl.accept-languages";
    pub const US_ENGLISH_LOCALE: &str = "intl.use-us-english-locale";
    pub const REVOCATION_FILTERS: &str = "security.revocation-filters";
}

/// A discrete host notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChromeEvent {
    /// A top-level window finished opening.
    WindowOpened(WindowId),
    /// A top-level window closed.
    WindowClosed(WindowId),
    /// A new tab surface was created in an open window.
    TabOpened {
        window: WindowId,
        surface: SurfaceId,
    },
    /// A surface navigated (top-level location change).
    LocationChanged { surface: SurfaceId },
    /// A surface's container was resized.
    ContainerResized { surface: SurfaceId },
    /// An observed configuration key changed.
    ConfigChanged(PolicyKey),
}
