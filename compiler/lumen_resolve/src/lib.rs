//! Semantic resolver for the Lumen shading language.
//!
//! Takes a parsed [`Module`] and attaches a semantic entity to every node:
//! types, evaluation stages, constant values, call targets, statement
//! behaviors and memory layout. A program that resolves is valid.
//!
//! # Pipeline
//!
//! 1. [`dependency`]: bind identifiers to declarations and order the
//!    module-scope declarations so each comes after what it uses.
//! 2. `resolver`: walk the ordered declarations once, building the
//!    [`SemGraph`](lumen_sem::SemGraph) and checking each node with the
//!    `validator` as soon as it is built.
//! 3. Whole-program checks: override ids, pipeline stages and uniformity.
//!
//! # Debug Environment Variables
//!
//! - `RUST_LOG=lumen_resolve=debug`: one event per pass.
//! - `RUST_LOG=lumen_resolve=trace`: one event per declaration and call.

mod const_eval;
pub mod dependency;
mod error;
mod intrinsic;
mod options;
mod program;
mod resolver;
mod uniformity;
mod validator;

use std::sync::Once;

use lumen_diagnostic::DiagnosticSink;
use lumen_ir::{Module, StringInterner};

pub use dependency::DependencyGraph;
pub use error::{InternalError, ResolveError};
pub use options::{ResolverOptions, UniformityPolicy};
pub use program::ResolvedProgram;
pub use uniformity::analyze_uniformity;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing subscriber for debug output.
///
/// Safe to call more than once. Does nothing unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

/// Resolve `module`.
///
/// On success every node of `module` has a semantic entity and the program
/// is valid; warnings are available from [`ResolvedProgram::warnings`].
///
/// # Errors
///
/// [`ResolveError::Diagnostics`] when the program is invalid, carrying every
/// diagnostic reported. [`ResolveError::Internal`] when the resolver itself
/// failed.
#[tracing::instrument(level = "debug", skip_all, fields(nodes = module.node_count()))]
pub fn resolve(
    module: &Module,
    interner: &StringInterner,
    options: &ResolverOptions,
) -> Result<ResolvedProgram, ResolveError> {
    let mut sink = DiagnosticSink::new();
    let deps = match DependencyGraph::build(module, interner, &mut sink) {
        Ok(deps) => deps,
        Err(guarantee) => {
            tracing::debug!(errors = sink.error_count(), "dependency analysis failed");
            return Err(ResolveError::Diagnostics {
                diagnostics: sink.into_diagnostics(),
                guarantee,
            });
        }
    };

    let program = resolver::Resolver::new(module, interner, options, &deps, sink).run()?;
    tracing::debug!(
        globals = program.ordered_globals().len(),
        entry_points = program.entry_points().count(),
        warnings = program.warnings().len(),
        "resolved program"
    );
    Ok(program)
}
