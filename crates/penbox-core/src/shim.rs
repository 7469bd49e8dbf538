//! Fault-containing execution shim for user script.
//!
//! [`guard_script`] wraps the script fragment in a guarded block. A fault
//! thrown synchronously while the block runs is caught inside the preview
//! document, logged to the preview's own console, and rendered as a red
//! `<pre data-penbox-error>` element appended to the preview body. The
//! document keeps loading and nothing reaches the host page.
//!
//! # Scope
//!
//! Only faults raised while the guarded block itself executes are caught.
//! The shim does **not** catch:
//!
//! - faults in callbacks the script schedules (timers, event listeners,
//!   promise continuations). They surface in the preview console only;
//! - syntax errors. A script that fails to parse never enters the block.
//!
//! The user text is placed inside the block unchanged. Top-level `var`
//! and function declarations still create globals; top-level `let`,
//! `const` and `class` bindings are scoped to the block. The handler only
//! declares block-scoped names, so a non-faulting script sees exactly the
//! globals it would see unwrapped.

// Literal forms of the marker and prefix, shared by the public constants
// and the handler text assembled with `concat!`.
macro_rules! error_marker {
    () => {
        "data-penbox-error"
    };
}

macro_rules! error_prefix {
    () => {
        "Runtime error: "
    };
}

/// Attribute that marks the error element rendered by the shim.
pub const ERROR_MARKER: &str = error_marker!();

/// Prefix of the visible error text.
pub const ERROR_PREFIX: &str = error_prefix!();

/// Opening of the guarded block. The user script follows on its own line.
const GUARD_OPEN: &str = "try {\n";

/// Closing of the guarded block and the fault handler.
///
/// `e` may be any thrown value, not only an `Error`, so the message falls
/// back to its string form.
const GUARD_CLOSE: &str = concat!(
    "\n} catch (e) {\n",
    "  console.error(e);\n",
    "  const penboxError = document.createElement('pre');\n",
    "  penboxError.setAttribute('",
    error_marker!(),
    "', '');\n",
    "  penboxError.style.color = 'red';\n",
    "  penboxError.textContent = '",
    error_prefix!(),
    "' + (e && e.message !== undefined ? e.message : String(e));\n",
    "  document.body.appendChild(penboxError);\n",
    "}",
);

/// Wrap `script` in the fault-containing guarded block.
///
/// An empty script yields an empty guarded block.
pub fn guard_script(script: &str) -> String {
    let capacity = GUARD_OPEN
        .len()
        .saturating_add(script.len())
        .saturating_add(GUARD_CLOSE.len());
    let mut guarded = String::with_capacity(capacity);
    guarded.push_str(GUARD_OPEN);
    guarded.push_str(script);
    guarded.push_str(GUARD_CLOSE);
    guarded
}
