//! Document composition.
//!
//! Turns a fragment triple into one self-contained HTML document:
//!
//! ```text
//! <!DOCTYPE html>
//! <html>
//! <head>  meta charset + <style>{css}</style>
//! <body>  {html}
//!         <script>{guarded js}</script>
//! ```
//!
//! Composition is total and pure. Any three strings are valid input,
//! nothing is sanitized or escaped, and the same input always yields the
//! same bytes. The preview sandbox (see [`crate::isolation`]) is the
//! safety boundary; this module trusts it.

use penbox_types::{ComposedDocument, Fragments};

use crate::shim::guard_script;

/// Whether the composed document carries the script region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptMode {
    /// Include the script fragment, wrapped by the fault-containing shim.
    Guarded,
    /// Leave the script region out entirely.
    Omitted,
}

const HEAD_OPEN: &str = "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\" />\n<style>";
const HEAD_CLOSE: &str = "</style>\n</head>\n<body>\n";
const SCRIPT_OPEN: &str = "\n<script>\n";
const SCRIPT_CLOSE: &str = "\n</script>";
const SCRIPT_OMITTED: &str = "\n<!-- script disabled: preview isolation unavailable -->";
const BODY_CLOSE: &str = "\n</body>\n</html>\n";

/// Compose a document with a guarded script region.
pub fn compose(fragments: &Fragments) -> ComposedDocument {
    compose_with(fragments, ScriptMode::Guarded)
}

/// Compose a document from three loose fragment texts.
pub fn compose_parts(markup: &str, style: &str, script: &str) -> ComposedDocument {
    ComposedDocument::new(render(markup, style, script, ScriptMode::Guarded))
}

/// Compose a document, choosing whether the script region is present.
pub fn compose_with(fragments: &Fragments, mode: ScriptMode) -> ComposedDocument {
    ComposedDocument::new(render(&fragments.html, &fragments.css, &fragments.js, mode))
}

fn render(markup: &str, style: &str, script: &str, mode: ScriptMode) -> String {
    let mut doc = String::with_capacity(
        HEAD_OPEN
            .len()
            .saturating_add(HEAD_CLOSE.len())
            .saturating_add(BODY_CLOSE.len())
            .saturating_add(markup.len())
            .saturating_add(style.len())
            .saturating_add(script.len())
            .saturating_add(512),
    );
    doc.push_str(HEAD_OPEN);
    doc.push_str(style);
    doc.push_str(HEAD_CLOSE);
    doc.push_str(markup);
    match mode {
        ScriptMode::Guarded => {
            doc.push_str(SCRIPT_OPEN);
            doc.push_str(&guard_script(script));
            doc.push_str(SCRIPT_CLOSE);
        }
        ScriptMode::Omitted => doc.push_str(SCRIPT_OMITTED),
    }
    doc.push_str(BODY_CLOSE);
    doc
}
