#![forbid(unsafe_code)]

//! Peer policy toggles owned by the coordinator.
//!
//! These share the letterboxing observer pattern but are much simpler:
//! each is a pure function of a handful of configuration keys, re-run
//! whenever one of its keys changes. The surrounding UI (the language
//! prompt dialog, the filter download scheduler) is host glue; only the
//! configuration transitions live here.

use letterbox_chrome::ConfigStore;
use letterbox_core::keys;

/// The accept-languages value pinned while English spoofing is on.
pub const SPOOFED_ACCEPT_LANGUAGES: &str = "en-US, en";

/// Tri-state of the spoof-English setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpoofEnglishMode {
    /// Not decided yet; the host may prompt on the first content load.
    Prompt,
    /// User declined; languages are not spoofed.
    Disabled,
    /// Requests and locale report US English.
    Enabled,
}

impl SpoofEnglishMode {
    /// Read the current mode. Unknown values behave like `Prompt`.
    #[must_use]
    pub fn from_config(config: &impl ConfigStore) -> Self {
        match config.int_value(keys::SPOOF_ENGLISH, 0) {
            1 => SpoofEnglishMode::Disabled,
            2 => SpoofEnglishMode::Enabled,
            _ => SpoofEnglishMode::Prompt,
        }
    }
}

/// Re-assert the language configuration for the current mode.
///
/// - `Enabled`: pin accept-languages to [`SPOOFED_ACCEPT_LANGUAGES`] and
///   set the US-English locale flag.
/// - `Disabled`/`Prompt`: drop the locale flag, and while letterboxing's
///   fingerprinting protection is active also pin accept-languages back to
///   its default (an externally modified value would reintroduce a
///   language fingerprint).
///
/// Idempotent; safe to call on every related key change.
pub fn sync_spoof_english(config: &mut impl ConfigStore, protection_active: bool) {
    match SpoofEnglishMode::from_config(config) {
        SpoofEnglishMode::Prompt | SpoofEnglishMode::Disabled => {
            if config.has_user_value(keys::US_ENGLISH_LOCALE) {
                config.clear(keys::US_ENGLISH_LOCALE);
            }
            if protection_active {
                config.clear(keys::ACCEPT_LANGUAGES);
            }
        }
        SpoofEnglishMode::Enabled => {
            config.set_string(keys::ACCEPT_LANGUAGES, SPOOFED_ACCEPT_LANGUAGES);
            config.set_bool(keys::US_ENGLISH_LOCALE, true);
        }
    }
}

/// Record the user's answer to the language prompt, so it is never shown
/// again.
pub fn resolve_spoof_english_prompt(config: &mut impl ConfigStore, accepted: bool) {
    config.set_int(keys::SPOOF_ENGLISH, if accepted { 2 } else { 1 });
    sync_spoof_english(config, true);
}

/// Gate for certificate-revocation filter downloads.
///
/// Mirrors its configuration key; the host's remote-settings scheduler
/// polls [`enabled`](Self::enabled) before fetching filters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RevocationFilterPolicy {
    enabled: bool,
}

impl RevocationFilterPolicy {
    /// Read the initial state from the configuration store.
    #[must_use]
    pub fn from_config(config: &impl ConfigStore) -> Self {
        Self {
            enabled: config.bool_value(keys::REVOCATION_FILTERS, false),
        }
    }

    /// Re-read the key after a change notification.
    pub fn reload(&mut self, config: &impl ConfigStore) {
        self.enabled = config.bool_value(keys::REVOCATION_FILTERS, false);
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }
}
