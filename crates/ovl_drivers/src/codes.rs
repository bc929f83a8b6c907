//! Diagnostic codes and helper functions for driver binding.
//!
//! `W301` is the ambiguous-version warning. `B101` flags catalog keys that are
//! not type identifiers and can therefore never match.

use ovl_diagnostics::{Category, Diagnostic, DiagnosticCode};

/// The catalog only has drivers for other versions of an IP.
pub const W301: DiagnosticCode = DiagnosticCode {
    category: Category::Warning,
    number: 301,
};

/// A catalog key is neither `vendor:library:name` nor
/// `vendor:library:name:version`.
pub const B101: DiagnosticCode = DiagnosticCode {
    category: Category::Binding,
    number: 101,
};

/// Creates the warning for a version-mismatched catalog lookup.
pub fn warn_ambiguous_version(subject: &str, type_id: &str, candidates: &[String]) -> Diagnostic {
    Diagnostic::warning(
        W301,
        format!("IP `{subject}` is of type `{type_id}`, a driver has been found for {candidates:?}"),
    )
    .with_subject(subject)
    .with_note("the default driver has been bound instead")
    .with_help("set `session.ignore_version = true` or pass `--ignore-version` to use it")
}

/// Creates the warning for a malformed catalog key.
pub fn warn_malformed_catalog_key(key: &str) -> Diagnostic {
    Diagnostic::warning(
        B101,
        format!("driver catalog key `{key}` is not a type identifier"),
    )
    .with_help("use `vendor:library:name` or `vendor:library:name:version`")
}
