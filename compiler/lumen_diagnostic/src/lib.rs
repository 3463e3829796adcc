//! Diagnostic system for semantic analysis.
//!
//! Every diagnostic carries:
//! - an error code for searchability
//! - a message saying what went wrong
//! - a primary span saying where
//! - secondary labels for related locations ("declared here")
//!
//! # Error Guarantees
//!
//! `ErrorGuaranteed` is proof that at least one error was reported. The only
//! way to obtain one is to push an error into a [`DiagnosticSink`], so a pass
//! that returns `Err(ErrorGuaranteed)` cannot fail silently.
//!
//! ```text
//! let guarantee = sink.add_error(ErrorCode::E2001, "type mismatch", span);
//! return Err(guarantee);
//! ```

mod diagnostic;
mod error_code;
mod guarantee;
mod sink;

pub use diagnostic::{Diagnostic, Label, Severity};
pub use error_code::ErrorCode;
pub use guarantee::ErrorGuaranteed;
pub use sink::DiagnosticSink;
