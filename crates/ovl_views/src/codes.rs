//! Diagnostic codes raised while materializing views.

use ovl_diagnostics::{Category, Diagnostic, DiagnosticCode};

/// An interrupt controller has no interrupt input pin.
pub const T101: DiagnosticCode = DiagnosticCode {
    category: Category::Topology,
    number: 101,
};

/// Creates the warning for a controller without an input pin.
pub fn warn_controller_without_input(controller: &str, pin: &str) -> Diagnostic {
    Diagnostic::warning(
        T101,
        format!("interrupt controller `{controller}` has no `{pin}` pin"),
    )
    .with_subject(controller)
    .with_note("no interrupt pins are listed for this controller")
}
