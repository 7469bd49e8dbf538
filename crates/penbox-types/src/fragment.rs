//! Source fragments and the live fragment triple.
//!
//! A user edits three independent texts: markup, style and script. None of
//! them is validated; any string is a valid fragment. The serialized names
//! (`html`, `css`, `js`) are shared by the HTTP API, the host page and the
//! snapshot table columns.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// FragmentKind
// ---------------------------------------------------------------------------

/// Which of the three source fragments a value belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum FragmentKind {
    /// Document body markup (HTML).
    #[serde(rename = "html")]
    Markup,
    /// Stylesheet text (CSS), placed in the document head.
    #[serde(rename = "css")]
    Style,
    /// Script text (JS), run inside the fault-containing shim.
    #[serde(rename = "js")]
    Script,
}

impl FragmentKind {
    /// All fragment kinds in document order.
    pub const ALL: [Self; 3] = [Self::Markup, Self::Style, Self::Script];

    /// Short wire name used in URLs and JSON (`html`, `css`, `js`).
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Markup => "html",
            Self::Style => "css",
            Self::Script => "js",
        }
    }
}

impl fmt::Display for FragmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string names no fragment kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown fragment kind: {0} (expected html, css or js)")]
pub struct UnknownFragmentKind(pub String);

impl FromStr for FragmentKind {
    type Err = UnknownFragmentKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "html" => Ok(Self::Markup),
            "css" => Ok(Self::Style),
            "js" => Ok(Self::Script),
            other => Err(UnknownFragmentKind(other.to_owned())),
        }
    }
}

// ---------------------------------------------------------------------------
// Fragments
// ---------------------------------------------------------------------------

/// The three source fragments read or written as one unit.
///
/// Composition always takes a whole `Fragments` value, never three separate
/// reads, so a rendered document can never mix old and new fragments.
/// Missing fields deserialize as empty text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Fragments {
    /// Markup fragment.
    #[serde(default)]
    pub html: String,
    /// Style fragment.
    #[serde(default)]
    pub css: String,
    /// Script fragment.
    #[serde(default)]
    pub js: String,
}

impl Fragments {
    /// Build a triple from its three texts.
    pub fn new(html: impl Into<String>, css: impl Into<String>, js: impl Into<String>) -> Self {
        Self {
            html: html.into(),
            css: css.into(),
            js: js.into(),
        }
    }

    /// Borrow the text of one fragment.
    pub fn get(&self, kind: FragmentKind) -> &str {
        match kind {
            FragmentKind::Markup => &self.html,
            FragmentKind::Style => &self.css,
            FragmentKind::Script => &self.js,
        }
    }

    /// Replace the text of one fragment.
    ///
    /// Returns `true` if the stored text changed.
    pub fn set(&mut self, kind: FragmentKind, text: String) -> bool {
        let slot = match kind {
            FragmentKind::Markup => &mut self.html,
            FragmentKind::Style => &mut self.css,
            FragmentKind::Script => &mut self.js,
        };
        if *slot == text {
            return false;
        }
        *slot = text;
        true
    }

    /// Whether all three fragments are empty.
    pub const fn is_empty(&self) -> bool {
        self.html.is_empty() && self.css.is_empty() && self.js.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_parses_wire_names() {
        for kind in FragmentKind::ALL {
            assert_eq!(kind.as_str().parse::<FragmentKind>(), Ok(kind));
        }
        assert!("markup".parse::<FragmentKind>().is_err());
    }

    #[test]
    fn kind_serializes_as_wire_name() {
        let json = serde_json::to_string(&FragmentKind::Script).unwrap_or_default();
        assert_eq!(json, "\"js\"");
    }

    #[test]
    fn set_reports_whether_text_changed() {
        let mut fragments = Fragments::default();
        assert!(fragments.set(FragmentKind::Markup, "<p>hi</p>".to_owned()));
        assert!(!fragments.set(FragmentKind::Markup, "<p>hi</p>".to_owned()));
        assert_eq!(fragments.get(FragmentKind::Markup), "<p>hi</p>");
        assert_eq!(fragments.get(FragmentKind::Style), "");
    }

    #[test]
    fn missing_fields_deserialize_empty() {
        let parsed: Fragments =
            serde_json::from_str(r#"{"html":"<b>x</b>"}"#).unwrap_or_default();
        assert_eq!(parsed, Fragments::new("<b>x</b>", "", ""));
    }
}
