//! Non-fatal diagnostics raised while deriving design metadata.
//!
//! Fatal conditions abort a view with an `ovl_common::MetadataError`.
//! Everything else (ambiguous driver versions, suspicious topology) is a
//! [`Diagnostic`] accumulated in a [`DiagnosticSink`] and rendered by a
//! [`DiagnosticRenderer`] for the terminal or as JSON.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
