//! Resolver failure types.
//!
//! Two tiers, kept apart all the way to the public API:
//! - user errors live in the [`DiagnosticSink`](lumen_diagnostic::DiagnosticSink)
//!   and are represented in control flow by an [`ErrorGuaranteed`];
//! - internal errors are resolver defects and stop the pass at once.

use lumen_diagnostic::{Diagnostic, ErrorGuaranteed};
use lumen_ir::Span;
use thiserror::Error;

/// A defect in the resolver rather than in the program being resolved.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum InternalError {
    #[error("AST node '{kind}' was encountered twice in the same AST of a Program")]
    NodeVisitedTwice { kind: &'static str, span: Span },
    #[error("AST node '{kind}' was not reached by the resolver")]
    NodeNotReached { kind: &'static str, span: Span },
    #[error("tried to materialize an expression without a constant value")]
    MaterializeNonConstant { span: Span },
    #[error("conversion from '{from}' to '{to}' produced no value")]
    ConversionWithoutValue { from: String, to: String, span: Span },
    #[error("unhandled call target '{name}'")]
    UnhandledCallTarget { name: String, span: Span },
    #[error("no semantic {what} for a node the resolver already visited")]
    MissingSemantic { what: &'static str, span: Span },
    #[error("function declared inside another function")]
    NestedFunction { span: Span },
    #[error("resolving failed, but no error was raised")]
    FailedWithoutError,
}

impl InternalError {
    pub fn span(&self) -> Span {
        match self {
            InternalError::NodeVisitedTwice { span, .. }
            | InternalError::NodeNotReached { span, .. }
            | InternalError::MaterializeNonConstant { span }
            | InternalError::ConversionWithoutValue { span, .. }
            | InternalError::UnhandledCallTarget { span, .. }
            | InternalError::MissingSemantic { span, .. }
            | InternalError::NestedFunction { span } => *span,
            InternalError::FailedWithoutError => Span::DUMMY,
        }
    }
}

/// Why resolving a program failed.
#[derive(Clone, Debug, Error)]
pub enum ResolveError {
    /// The program has errors; all diagnostics, warnings included.
    #[error("resolution failed with {} error(s)", count_errors(.diagnostics))]
    Diagnostics {
        diagnostics: Vec<Diagnostic>,
        guarantee: ErrorGuaranteed,
    },
    /// The resolver hit a defect of its own.
    #[error("internal resolver error: {error}")]
    Internal {
        error: InternalError,
        diagnostics: Vec<Diagnostic>,
    },
}

fn count_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}

impl ResolveError {
    pub fn diagnostics(&self) -> &[Diagnostic] {
        match self {
            ResolveError::Diagnostics { diagnostics, .. }
            | ResolveError::Internal { diagnostics, .. } => diagnostics,
        }
    }

    pub fn is_internal(&self) -> bool {
        matches!(self, ResolveError::Internal { .. })
    }

    /// Messages of all error diagnostics, in report order.
    pub fn error_messages(&self) -> Vec<&str> {
        self.diagnostics()
            .iter()
            .filter(|d| d.is_error())
            .map(|d| d.message.as_str())
            .collect()
    }
}

/// Why a resolution step stopped.
#[derive(Clone, Debug)]
pub(crate) enum Halt {
    /// A user error is in the sink; dependants stop without reporting more.
    Reported(ErrorGuaranteed),
    Internal(InternalError),
}

impl From<ErrorGuaranteed> for Halt {
    fn from(guarantee: ErrorGuaranteed) -> Self {
        Halt::Reported(guarantee)
    }
}

impl From<InternalError> for Halt {
    fn from(error: InternalError) -> Self {
        Halt::Internal(error)
    }
}

pub(crate) type ResolveResult<T = ()> = Result<T, Halt>;
