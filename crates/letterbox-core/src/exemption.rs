#![forbid(unsafe_code)]

//! Exemption policy: which surfaces must never be quantized.
//!
//! Internal documents (preference pages, the document viewer, source
//! listings, extension pages) are not web content and letterboxing them
//! would only degrade the chrome. The predicate is pure and synchronous,
//! and callers re-derive it on every navigation: a surface's principal can
//! change under it, so exemption is never cached across location changes.

/// The security principal kind attached to a surface's current document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrincipalKind {
    /// The privileged system principal (browser chrome documents).
    System,
    /// An ordinary web content principal.
    Content,
    /// The null principal (sandboxed / opaque origins).
    Null,
}

/// Origin prefix of the built-in document viewer.
pub const DOCUMENT_VIEWER_ORIGIN: &str = "resource://pdf.js";

/// Principal and URI metadata for one content surface, as sampled by the
/// host chrome at update time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceMetadata {
    /// Kind of the document's principal.
    pub principal: PrincipalKind,
    /// URI scheme (`"https"`, `"about"`, `"view-source"`, ...).
    pub scheme: String,
    /// URI path component (for `about:` documents this is the page name).
    pub path: String,
    /// Serialized principal origin.
    pub origin: String,
    /// Extension id when the principal belongs to a browser extension.
    pub addon_id: Option<String>,
}

impl SurfaceMetadata {
    /// Metadata for an ordinary content document at `scheme://.../path`.
    #[must_use]
    pub fn content(scheme: &str, path: &str) -> Self {
        Self {
            principal: PrincipalKind::Content,
            scheme: scheme.to_owned(),
            path: path.to_owned(),
            origin: String::new(),
            addon_id: None,
        }
    }

    #[must_use]
    pub fn with_principal(mut self, principal: PrincipalKind) -> Self {
        self.principal = principal;
        self
    }

    #[must_use]
    pub fn with_origin(mut self, origin: &str) -> Self {
        self.origin = origin.to_owned();
        self
    }

    #[must_use]
    pub fn with_addon(mut self, addon_id: &str) -> Self {
        self.addon_id = Some(addon_id.to_owned());
        self
    }

    /// Whether this surface is exempt from size quantization.
    ///
    /// Exempt when any of the following holds:
    /// - the principal is the system principal;
    /// - the origin belongs to the built-in document viewer;
    /// - the document is an `about:` page other than `about:blank`
    ///   (`about:blank` hosts arbitrary web content and stays quantized);
    /// - the document is a `view-source:` listing;
    /// - the principal belongs to a browser extension.
    #[must_use]
    pub fn is_exempt(&self) -> bool {
        matches!(self.principal, PrincipalKind::System)
            || self.origin.starts_with(DOCUMENT_VIEWER_ORIGIN)
            || (self.scheme == "about" && self.path != "blank")
            || self.scheme == "view-source"
            || self.addon_id.is_some()
    }
}
