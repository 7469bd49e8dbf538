//! Preview isolation boundary.
//!
//! Composed documents run in the browser inside a sandboxed browsing
//! context, enforced twice:
//!
//! - the host page embeds the preview in `<iframe sandbox="allow-scripts">`;
//! - the preview response itself carries
//!   `Content-Security-Policy: sandbox allow-scripts`, so the document is
//!   sandboxed even when opened outside the frame.
//!
//! Either way the document gets an opaque origin: no host cookies, no host
//! storage, no host DOM, no top-level navigation. Script execution is the
//! only capability granted. [`SandboxPolicy`] has no way to express any
//! other capability (in particular `allow-same-origin`, which combined with
//! scripts would let the preview lift its own sandbox).
//!
//! When isolation is unavailable the boundary switches to scripts-disabled
//! mode instead of downgrading: documents are composed without their
//! script region and the CSP forbids script outright.

use core::fmt;
use core::str::FromStr;

use penbox_types::{ComposedDocument, Fragments, Revision};
use serde::Deserialize;

use crate::compose::{ScriptMode, compose_with};

/// How the preview is isolated from the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IsolationMode {
    /// Sandboxed browsing context with script execution allowed.
    #[default]
    Sandbox,
    /// No usable sandbox: the preview renders without user script.
    Disabled,
}

impl fmt::Display for IsolationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sandbox => f.write_str("sandbox"),
            Self::Disabled => f.write_str("disabled"),
        }
    }
}

impl FromStr for IsolationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sandbox" => Ok(Self::Sandbox),
            "disabled" => Ok(Self::Disabled),
            other => Err(format!("unknown isolation mode: {other}")),
        }
    }
}

/// Capabilities granted to the sandboxed preview.
///
/// The only expressible grant is script execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SandboxPolicy {
    allow_scripts: bool,
}

impl SandboxPolicy {
    /// Sandbox granting script execution and nothing else.
    pub const SCRIPTS_ONLY: Self = Self {
        allow_scripts: true,
    };

    /// Sandbox granting nothing.
    pub const LOCKED: Self = Self {
        allow_scripts: false,
    };

    /// Whether script execution is granted.
    pub const fn allows_scripts(self) -> bool {
        self.allow_scripts
    }

    /// Value for the host page's `<iframe sandbox="...">` attribute.
    pub const fn iframe_sandbox(self) -> &'static str {
        if self.allow_scripts { "allow-scripts" } else { "" }
    }

    /// `Content-Security-Policy` value for the preview response.
    pub const fn content_security_policy(self) -> &'static str {
        if self.allow_scripts {
            "sandbox allow-scripts"
        } else {
            "sandbox; script-src 'none'"
        }
    }
}

/// Number of headers attached to every preview response.
pub const PREVIEW_HEADER_COUNT: usize = 5;

/// The isolation boundary every composed document passes through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IsolationBoundary {
    mode: IsolationMode,
}

impl IsolationBoundary {
    /// Boundary for a sandboxed preview that runs user script.
    pub const fn sandboxed() -> Self {
        Self {
            mode: IsolationMode::Sandbox,
        }
    }

    /// Boundary that refuses user script.
    pub const fn scripts_disabled() -> Self {
        Self {
            mode: IsolationMode::Disabled,
        }
    }

    /// Boundary for the configured isolation mode.
    pub const fn from_mode(mode: IsolationMode) -> Self {
        Self { mode }
    }

    /// The isolation mode in force.
    pub const fn mode(self) -> IsolationMode {
        self.mode
    }

    /// Whether composed documents carry user script.
    pub const fn scripts_enabled(self) -> bool {
        matches!(self.mode, IsolationMode::Sandbox)
    }

    /// Sandbox capabilities for this boundary.
    pub const fn policy(self) -> SandboxPolicy {
        if self.scripts_enabled() {
            SandboxPolicy::SCRIPTS_ONLY
        } else {
            SandboxPolicy::LOCKED
        }
    }

    /// Compose `fragments` for this boundary.
    ///
    /// The script region is present only when scripts are enabled.
    pub fn compose(self, fragments: &Fragments) -> ComposedDocument {
        let mode = if self.scripts_enabled() {
            ScriptMode::Guarded
        } else {
            ScriptMode::Omitted
        };
        compose_with(fragments, mode)
    }

    /// Response headers that enforce the boundary on a served preview.
    pub const fn response_headers(self) -> [(&'static str, &'static str); PREVIEW_HEADER_COUNT] {
        [
            (
                "content-security-policy",
                self.policy().content_security_policy(),
            ),
            ("cache-control", "no-store"),
            ("referrer-policy", "no-referrer"),
            ("x-content-type-options", "nosniff"),
            ("cross-origin-resource-policy", "same-origin"),
        ]
    }

    /// Package a published document for serving.
    pub fn render(self, revision: Revision, document: ComposedDocument) -> RenderedPreview {
        RenderedPreview {
            revision,
            document,
            headers: self.response_headers(),
        }
    }
}

impl Default for IsolationBoundary {
    fn default() -> Self {
        Self::sandboxed()
    }
}

/// A composed document ready to be served behind the boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPreview {
    /// Revision the document was published as.
    pub revision: Revision,
    /// The composed document.
    pub document: ComposedDocument,
    /// Headers that must accompany the document.
    pub headers: [(&'static str, &'static str); PREVIEW_HEADER_COUNT],
}
