//! Shared accumulator for binding and topology diagnostics.

use crate::code::DiagnosticCode;
use crate::diagnostic::Diagnostic;
use crate::severity::Severity;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

/// Where a session's warnings end up.
///
/// Views borrow the sink immutably, so emission goes through interior
/// mutability. The per-severity tallies and the keys remembered by
/// [`DiagnosticSink::emit_once`] survive [`DiagnosticSink::take_all`].
pub struct DiagnosticSink {
    entries: Mutex<Vec<Diagnostic>>,
    reported: Mutex<HashSet<(DiagnosticCode, Option<String>)>>,
    errors: AtomicUsize,
    warnings: AtomicUsize,
}

impl DiagnosticSink {
    /// An empty sink.
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            reported: Mutex::new(HashSet::new()),
            errors: AtomicUsize::new(0),
            warnings: AtomicUsize::new(0),
        }
    }

    fn entries(&self) -> MutexGuard<'_, Vec<Diagnostic>> {
        // A panicking emitter cannot leave the vector half-written.
        self.entries.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn tally(&self, severity: Severity) -> Option<&AtomicUsize> {
        match severity {
            Severity::Error => Some(&self.errors),
            Severity::Warning => Some(&self.warnings),
            Severity::Note | Severity::Help => None,
        }
    }

    /// Records `diag`.
    pub fn emit(&self, diag: Diagnostic) {
        if let Some(counter) = self.tally(diag.severity) {
            counter.fetch_add(1, Ordering::Relaxed);
        }
        self.entries().push(diag);
    }

    /// Records `diag` unless a diagnostic with the same code and subject went
    /// through this method before. Returns whether it was recorded.
    pub fn emit_once(&self, diag: Diagnostic) -> bool {
        let key = (diag.code, diag.subject.clone());
        let fresh = self
            .reported
            .lock()
            .unwrap_or_else(|p| p.into_inner())
            .insert(key);
        if fresh {
            self.emit(diag);
        }
        fresh
    }

    /// Whether anything of error severity was recorded.
    pub fn has_errors(&self) -> bool {
        self.error_count() != 0
    }

    /// Errors recorded since construction.
    pub fn error_count(&self) -> usize {
        self.errors.load(Ordering::Relaxed)
    }

    /// Warnings recorded since construction.
    pub fn warning_count(&self) -> usize {
        self.warnings.load(Ordering::Relaxed)
    }

    /// Drains the recorded diagnostics. Counts are kept.
    pub fn take_all(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries())
    }

    /// A copy of the recorded diagnostics, in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.entries().clone()
    }
}

impl Default for DiagnosticSink {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for DiagnosticSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "DiagnosticSink({} errors, {} warnings)",
            self.error_count(),
            self.warning_count()
        )
    }
}
