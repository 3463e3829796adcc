//! Collection point for diagnostics produced by a pass.

use lumen_ir::Span;

use crate::{Diagnostic, ErrorCode, ErrorGuaranteed, Label, Severity};

/// Ordered list of diagnostics produced while analysing one program.
///
/// Diagnostics stay in the order they were reported. Notes attach to the
/// diagnostic reported just before them.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticSink {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
}

impl DiagnosticSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push a diagnostic. Returns a guarantee if it was an error.
    pub fn emit(&mut self, diagnostic: Diagnostic) -> Option<ErrorGuaranteed> {
        let is_error = diagnostic.is_error();
        self.diagnostics.push(diagnostic);
        if is_error {
            self.error_count += 1;
            Some(ErrorGuaranteed::new())
        } else {
            None
        }
    }

    /// Report an error at `span`.
    pub fn add_error(
        &mut self,
        code: ErrorCode,
        message: impl Into<String>,
        span: Span,
    ) -> ErrorGuaranteed {
        self.diagnostics.push(
            Diagnostic::error(code)
                .with_message(message)
                .with_label(span, ""),
        );
        self.error_count += 1;
        ErrorGuaranteed::new()
    }

    /// Report a warning at `span`.
    pub fn add_warning(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) {
        self.diagnostics.push(
            Diagnostic::warning(code)
                .with_message(message)
                .with_label(span, ""),
        );
    }

    /// Attach a located note to the most recent diagnostic.
    ///
    /// With nothing reported yet the note is kept as a standalone diagnostic.
    pub fn add_note(&mut self, message: impl Into<String>, span: Span) {
        if let Some(last) = self.diagnostics.last_mut() {
            last.labels.push(Label::secondary(span, message));
        } else {
            self.diagnostics.push(
                Diagnostic::note(ErrorCode::E9001)
                    .with_message(message)
                    .with_label(span, ""),
            );
        }
    }

    /// Attach an unlocated note to the most recent diagnostic.
    pub fn add_detail(&mut self, message: impl Into<String>) {
        if let Some(last) = self.diagnostics.last_mut() {
            last.notes.push(message.into());
        }
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    /// Proof that errors were reported, if any were.
    pub fn guarantee(&self) -> Option<ErrorGuaranteed> {
        ErrorGuaranteed::from_error_count(self.error_count)
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Iterator over diagnostics with the given severity.
    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(move |d| d.severity == severity)
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}
