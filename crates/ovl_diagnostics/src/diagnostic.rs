//! The diagnostic record.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A structured diagnostic about a node in the design graph.
///
/// Instead of a source span, a diagnostic names its subject by hierarchy path
/// (for example `ps7_0/S_AXI_GP0` or `audio/codec`), when there is one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// How serious it is.
    pub severity: Severity,
    /// What kind of diagnostic it is.
    pub code: DiagnosticCode,
    /// One-line summary.
    pub message: String,
    /// Hierarchy path of the node the diagnostic is about.
    pub subject: Option<String>,
    /// Extra context, one line each.
    pub notes: Vec<String>,
    /// Suggested fixes, one line each.
    pub help: Vec<String>,
}

impl Diagnostic {
    /// An error.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Error, code, message)
    }

    /// A warning.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Warning, code, message)
    }

    /// A note.
    pub fn note(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::with_severity(Severity::Note, code, message)
    }

    fn with_severity(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            subject: None,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Names the node by hierarchy path.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Appends a note line.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Appends a help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::code::Category;

    #[test]
    fn constructors_set_severity() {
        let code = DiagnosticCode::new(Category::Topology, 101);
        assert_eq!(Diagnostic::error(code, "x").severity, Severity::Error);
        assert_eq!(Diagnostic::warning(code, "x").severity, Severity::Warning);
        let note = Diagnostic::note(code, "controller has no input");
        assert_eq!(note.severity, Severity::Note);
        assert_eq!(note.message, "controller has no input");
        assert!(note.subject.is_none() && note.notes.is_empty() && note.help.is_empty());
    }

    #[test]
    fn chained_builders_accumulate() {
        let diag = Diagnostic::warning(DiagnosticCode::new(Category::Warning, 301), "ambiguous version")
            .with_subject("video/axi_dma_0/S_AXI_LITE")
            .with_note("candidates: xilinx.com:ip:axi_dma:7.0")
            .with_note("bound: DefaultIP")
            .with_help("set ignore_version = true");
        assert_eq!(diag.subject.as_deref(), Some("video/axi_dma_0/S_AXI_LITE"));
        assert_eq!(diag.notes, ["candidates: xilinx.com:ip:axi_dma:7.0", "bound: DefaultIP"]);
        assert_eq!(diag.help, ["set ignore_version = true"]);
    }
}
