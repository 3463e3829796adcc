//! Semantic resolution.
//!
//! Walks the syntax graph once, in dependency order, and attaches a semantic
//! entity to every declaration, statement and expression: types, evaluation
//! stages, constant values, control-flow behaviors and call graph facts.
//! Rule checks are delegated to the [`Validator`].
//!
//! # Architecture
//!
//! ```text
//! DependencyGraph::ordered_globals()
//!         │
//!         ▼
//! Pass 1: declarations (a failed declaration does not stop the others)
//!   enable · alias · struct · const · override · var · fn · static_assert
//!         │
//!         ▼
//! Pass 2: whole program (only when pass 1 reported nothing)
//!   override ids → shadows → pipeline stages → uniformity → coverage
//! ```
//!
//! Every syntax node is marked exactly once. Visiting a node twice, or
//! finishing with an unmarked node, is a resolver defect and surfaces as an
//! [`InternalError`].

mod calls;
mod decls;
mod exprs;
mod layout;
mod materialize;
mod stmts;
mod types;

use lumen_diagnostic::{DiagnosticSink, ErrorCode};
use lumen_ir::{
    EnableId, ExprId, Extension, GlobalDecl, Module, Name, NodeId, Span, StmtId, StmtKind,
    StringInterner,
};
use lumen_sem::{Idx, Pool, SemExprId, SemFnId, SemGraph, SemStmtId, SemVarId, ShadowTarget};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::dependency::{Decl, DependencyGraph};
use crate::error::{Halt, InternalError, ResolveError, ResolveResult};
use crate::intrinsic::IntrinsicTable;
use crate::options::ResolverOptions;
use crate::program::ResolvedProgram;
use crate::uniformity;
use crate::validator::Validator;

// ============================================================================
// Node Visitation
// ============================================================================

/// Bitset over [`NodeId`]s.
#[derive(Clone, Debug, Default)]
struct NodeSet {
    words: Vec<u64>,
    count: usize,
}

impl NodeSet {
    fn with_capacity(nodes: usize) -> Self {
        NodeSet {
            words: vec![0; nodes.div_ceil(64)],
            count: 0,
        }
    }

    /// Returns `false` if `node` was already present.
    fn insert(&mut self, node: NodeId) -> bool {
        let index = node.index();
        let (word, bit) = (index / 64, index % 64);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let mask = 1u64 << bit;
        if self.words[word] & mask != 0 {
            return false;
        }
        self.words[word] |= mask;
        self.count += 1;
        true
    }

    fn contains(&self, node: NodeId) -> bool {
        let index = node.index();
        self.words
            .get(index / 64)
            .is_some_and(|word| word & (1u64 << (index % 64)) != 0)
    }
}

// ============================================================================
// Resolver
// ============================================================================

/// Resolver for one module.
///
/// # Component Structure
///
/// ```text
/// Resolver
/// ├── module, interner, options, deps   (read-only inputs)
/// ├── intrinsics                        (operator/builtin/constructor overloads)
/// ├── graph: SemGraph                   (output: entities + type pool)
/// ├── sink: DiagnosticSink              (output: errors and warnings)
/// ├── visited: NodeSet                  (exactly-once bookkeeping)
/// └── current_*                         (function / statement context)
/// ```
pub(crate) struct Resolver<'a> {
    // === Immutable Context ===
    module: &'a Module,
    interner: &'a StringInterner,
    options: &'a ResolverOptions,
    deps: &'a DependencyGraph,
    intrinsics: IntrinsicTable<'a>,

    // === Output ===
    graph: SemGraph,
    sink: DiagnosticSink,
    entry_points: Vec<SemFnId>,
    enabled: FxHashSet<Extension>,

    // === Bookkeeping ===
    visited: NodeSet,
    /// Explicit `@id` values seen so far.
    override_ids: FxHashMap<u16, SemVarId>,

    // === Current Context ===
    current_function: Option<SemFnId>,
    current_stmt: Option<SemStmtId>,
    current_compound: Option<SemStmtId>,
    current_block: Option<SemStmtId>,
    /// Last statement of the case body being resolved, and whether the case
    /// is the last clause of its switch.
    case_tail: Option<(StmtId, bool)>,
    /// `break` statements that form a break-if at the end of the continuing
    /// block being resolved.
    continuing_breaks: FxHashSet<StmtId>,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(
        module: &'a Module,
        interner: &'a StringInterner,
        options: &'a ResolverOptions,
        deps: &'a DependencyGraph,
        sink: DiagnosticSink,
    ) -> Self {
        Resolver {
            module,
            interner,
            options,
            deps,
            intrinsics: IntrinsicTable::new(interner),
            graph: SemGraph::new(),
            sink,
            entry_points: Vec::new(),
            enabled: FxHashSet::default(),
            visited: NodeSet::with_capacity(module.node_count()),
            override_ids: FxHashMap::default(),
            current_function: None,
            current_stmt: None,
            current_compound: None,
            current_block: None,
            case_tail: None,
            continuing_breaks: FxHashSet::default(),
        }
    }

    /// Resolve the whole module.
    pub(crate) fn run(mut self) -> Result<ResolvedProgram, ResolveError> {
        if let Err(Halt::Internal(error)) = self.resolve_program() {
            tracing::error!(%error, "internal resolver error");
            self.sink
                .add_error(ErrorCode::E9001, error.to_string(), error.span());
            return Err(ResolveError::Internal {
                error,
                diagnostics: self.sink.into_diagnostics(),
            });
        }
        if let Some(guarantee) = self.sink.guarantee() {
            tracing::debug!(errors = self.sink.error_count(), "resolution failed");
            return Err(ResolveError::Diagnostics {
                diagnostics: self.sink.into_diagnostics(),
                guarantee,
            });
        }

        tracing::debug!(
            functions = self.graph.functions().count(),
            expressions = self.graph.expr_count(),
            entry_points = self.entry_points.len(),
            "resolution finished"
        );
        let mut extensions: Vec<Extension> = self.enabled.into_iter().collect();
        extensions.sort_unstable();
        Ok(ResolvedProgram::new(
            self.graph,
            self.deps.ordered_globals().to_vec(),
            self.entry_points,
            extensions,
            self.sink.into_diagnostics(),
            self.visited.count,
        ))
    }

    fn resolve_program(&mut self) -> ResolveResult {
        // An empty module has no root node.
        if self.module.node_count() > 0 {
            self.mark(self.module.root())?;
        }

        let deps = self.deps;
        for &decl in deps.ordered_globals() {
            tracing::trace!(?decl, "resolving global");
            match self.global(decl) {
                Ok(()) | Err(Halt::Reported(_)) => {}
                Err(halt @ Halt::Internal(_)) => return Err(halt),
            }
        }
        if self.sink.has_errors() {
            return Ok(());
        }

        self.allocate_override_ids()?;
        self.link_shadows();
        let entry_points = self.entry_points.clone();
        self.validator().pipeline_stages(&entry_points)?;
        self.uniformity()?;
        self.check_coverage()
    }

    fn global(&mut self, decl: GlobalDecl) -> ResolveResult {
        match decl {
            GlobalDecl::Enable(id) => self.enable(id),
            GlobalDecl::Alias(id) => self.alias(id),
            GlobalDecl::Struct(id) => self.structure(id),
            GlobalDecl::Function(id) => self.function(id),
            GlobalDecl::Variable(id) => self.global_variable(id).map(|_| ()),
            GlobalDecl::StaticAssert(id) => self.global_static_assert(id),
        }
    }

    fn enable(&mut self, id: EnableId) -> ResolveResult {
        let enable = self.module.enable(id);
        self.mark(enable.id)?;
        self.enabled.insert(enable.extension);
        Ok(())
    }

    fn global_static_assert(&mut self, id: StmtId) -> ResolveResult {
        let stmt = self.module.stmt(id);
        self.mark(stmt.id)?;
        let StmtKind::StaticAssert(cond) = stmt.kind else {
            return Err(InternalError::MissingSemantic {
                what: "static assertion",
                span: stmt.span,
            }
            .into());
        };
        let expr = self.expression(cond)?;
        let ty = self.loaded(expr);
        let constant = self.graph.expr(expr).constant.clone();
        self.validator()
            .static_assert(ty, constant.as_ref(), stmt.span)?;
        Ok(())
    }

    // ========================================================================
    // Whole-Program Passes
    // ========================================================================

    /// Link each local and parameter to the declaration it shadows.
    fn link_shadows(&mut self) {
        let deps = self.deps;
        for &(shadowing, shadowed) in deps.shadows() {
            let Some(var) = self.variable_of(shadowing) else {
                continue;
            };
            let target = match shadowed {
                Decl::Variable(_) | Decl::Param(_) => {
                    self.variable_of(shadowed).map(ShadowTarget::Variable)
                }
                Decl::Function(id) => self.graph.function_for(id).map(ShadowTarget::Function),
                Decl::Struct(id) => self.graph.struct_for(id).map(ShadowTarget::Type),
                Decl::Alias(id) => self.graph.alias_for(id).map(ShadowTarget::Type),
            };
            self.graph.variable_mut(var).shadows = target;
        }
    }

    fn variable_of(&self, decl: Decl) -> Option<SemVarId> {
        match decl {
            Decl::Variable(id) => self.graph.variable_for(id),
            Decl::Param(id) => self.graph.param_for(id),
            Decl::Function(_) | Decl::Struct(_) | Decl::Alias(_) => None,
        }
    }

    fn uniformity(&mut self) -> ResolveResult {
        if self
            .enabled
            .contains(&Extension::ChromiumDisableUniformityAnalysis)
        {
            return Ok(());
        }
        let findings = uniformity::analyze_uniformity(
            self.module,
            &self.graph,
            self.interner,
            self.options.uniformity,
            &mut self.sink,
        )?;
        tracing::debug!(findings, "uniformity analysis finished");
        Ok(())
    }

    /// Every syntax node must have been visited.
    fn check_coverage(&self) -> ResolveResult {
        for (id, info) in self.module.nodes() {
            if !self.visited.contains(id) {
                return Err(InternalError::NodeNotReached {
                    kind: info.kind.as_str(),
                    span: info.span,
                }
                .into());
            }
        }
        Ok(())
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    fn mark(&mut self, node: NodeId) -> ResolveResult {
        if self.visited.insert(node) {
            return Ok(());
        }
        let info = self.module.node(node);
        Err(InternalError::NodeVisitedTwice {
            kind: info.kind.as_str(),
            span: info.span,
        }
        .into())
    }

    fn validator(&mut self) -> Validator<'_> {
        Validator::new(
            self.module,
            self.interner,
            &self.graph,
            &mut self.sink,
            &self.enabled,
        )
    }

    fn error(&mut self, code: ErrorCode, message: impl Into<String>, span: Span) -> Halt {
        Halt::Reported(self.sink.add_error(code, message, span))
    }

    fn note(&mut self, message: impl Into<String>, span: Span) {
        self.sink.add_note(message, span);
    }

    /// Stop because something this node depends on already failed.
    fn prior_failure(&self) -> Halt {
        match self.sink.guarantee() {
            Some(guarantee) => Halt::Reported(guarantee),
            None => Halt::Internal(InternalError::FailedWithoutError),
        }
    }

    fn pool(&self) -> &Pool {
        &self.graph.types
    }

    fn type_name(&self, ty: Idx) -> String {
        self.graph.types.display(ty, self.interner)
    }

    fn name(&self, name: Name) -> &'static str {
        self.interner.lookup(name)
    }

    /// Semantic expression of an already resolved syntax expression.
    fn sem_expr(&self, id: ExprId) -> ResolveResult<SemExprId> {
        self.graph.expr_for(id).ok_or_else(|| {
            InternalError::MissingSemantic {
                what: "expression",
                span: self.module.expr(id).span,
            }
            .into()
        })
    }

    /// Type of `expr` after loading through a reference.
    fn loaded(&self, expr: SemExprId) -> Idx {
        self.graph.types.unwrap_ref(self.graph.expr(expr).ty)
    }

    fn expr_span(&self, expr: SemExprId) -> Span {
        self.module.expr(self.graph.expr(expr).decl).span
    }
}
