//! Uniformity analysis.
//!
//! A forward dataflow approximation over each function body. A value is
//! non-uniform when it derives from a per-invocation input: a non-uniform
//! builtin or `@location` entry point parameter, mutable shared memory
//! (`var<storage, read_write>` and `var<workgroup>`), or a function
//! variable written under non-uniform control flow.
//!
//! Control flow becomes non-uniform inside a branch or loop whose condition
//! is non-uniform, and stays non-uniform after a `return`, `discard`,
//! `break` or `continue` taken under such a condition. Calls to builtins that
//! need all invocations to arrive together are reported there.
//!
//! Functions are summarized in resolution order, which places every callee
//! before its callers. A function that calls a uniformity-sensitive builtin
//! from its own uniform control flow passes that requirement on to its call
//! sites. Parameters of non-entry-point functions are assumed uniform.

use lumen_diagnostic::{DiagnosticSink, ErrorCode, ErrorGuaranteed};
use lumen_ir::{
    AttrId, AttributeKind, ExprId, ExprKind, Module, Span, StmtId, StmtKind, StorageClass,
    StringInterner,
};
use lumen_sem::{
    CallTargetKind, SemExprKind, SemFnId, SemFunction, SemGraph, SemVarId, SemVarKind,
    VariableDecl,
};
use lumen_stack::ensure_sufficient_stack;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::options::UniformityPolicy;

#[cfg(test)]
mod tests;

/// Loops are walked this many times so values written late in an iteration
/// reach uses early in the next one.
const LOOP_PASSES: usize = 2;

/// Why a function must be called from uniform control flow.
#[derive(Copy, Clone, Debug)]
struct Requirement {
    /// The builtin at the bottom of the call chain.
    builtin: &'static str,
    /// The call in this function that leads to it.
    span: Span,
}

#[derive(Copy, Clone, Debug, Default)]
struct Summary {
    requires: Option<Requirement>,
    returns_non_uniform: bool,
}

/// A call made under non-uniform control flow.
#[derive(Clone, Debug)]
struct Finding {
    callee: String,
    span: Span,
    condition: Span,
    /// Set when the callee is a user function.
    via: Option<Requirement>,
}

/// Analyze every function in `graph`, reporting violations per `policy`.
///
/// Returns the number of violations found. Under
/// [`UniformityPolicy::Reject`] any violation is an error.
#[tracing::instrument(level = "debug", skip_all)]
pub fn analyze_uniformity(
    module: &Module,
    graph: &SemGraph,
    interner: &StringInterner,
    policy: UniformityPolicy,
    sink: &mut DiagnosticSink,
) -> Result<usize, ErrorGuaranteed> {
    if policy == UniformityPolicy::Off {
        return Ok(0);
    }

    let mut summaries: FxHashMap<SemFnId, Summary> = FxHashMap::default();
    let mut findings = Vec::new();
    for (id, func) in graph.functions() {
        let summary = FunctionAnalysis::new(module, graph, interner, &summaries, func)
            .run(&mut findings);
        tracing::trace!(
            function = interner.lookup(func.name),
            requires = summary.requires.is_some(),
            "summarized function"
        );
        summaries.insert(id, summary);
    }

    let mut guarantee = None;
    for finding in &findings {
        let message = format!(
            "'{}' must only be called from uniform control flow",
            finding.callee
        );
        match policy {
            UniformityPolicy::Reject => {
                guarantee = Some(sink.add_error(ErrorCode::E2019, message, finding.span));
            }
            UniformityPolicy::Warn | UniformityPolicy::Off => {
                sink.add_warning(ErrorCode::E2019, message, finding.span);
            }
        }
        sink.add_note(
            "control flow depends on a non-uniform value",
            finding.condition,
        );
        if let Some(via) = finding.via {
            sink.add_note(
                format!(
                    "'{}' requires uniformity because it calls '{}'",
                    finding.callee, via.builtin
                ),
                via.span,
            );
        }
    }

    match guarantee {
        Some(guarantee) => Err(guarantee),
        None => Ok(findings.len()),
    }
}

// ============================================================================
// Per-function Walk
// ============================================================================

struct FunctionAnalysis<'a> {
    module: &'a Module,
    graph: &'a SemGraph,
    interner: &'a StringInterner,
    summaries: &'a FxHashMap<SemFnId, Summary>,
    func: &'a SemFunction,

    non_uniform: FxHashSet<SemVarId>,
    /// Condition of the innermost non-uniform branch or loop.
    condition: Option<Span>,
    /// Set by a `return` or `discard` under non-uniform control flow.
    fn_divergence: Option<Span>,
    /// Set by a `break` or `continue` under non-uniform control flow.
    loop_divergence: Option<Span>,
    summary: Summary,
}

impl<'a> FunctionAnalysis<'a> {
    fn new(
        module: &'a Module,
        graph: &'a SemGraph,
        interner: &'a StringInterner,
        summaries: &'a FxHashMap<SemFnId, Summary>,
        func: &'a SemFunction,
    ) -> Self {
        let mut analysis = FunctionAnalysis {
            module,
            graph,
            interner,
            summaries,
            func,
            non_uniform: FxHashSet::default(),
            condition: None,
            fn_divergence: None,
            loop_divergence: None,
            summary: Summary::default(),
        };
        if func.is_entry_point() {
            for &param in &func.params {
                if analysis.is_non_uniform_input(param) {
                    analysis.non_uniform.insert(param);
                }
            }
        }
        analysis
    }

    /// Walk the body until no further variable turns non-uniform.
    fn run(mut self, findings: &mut Vec<Finding>) -> Summary {
        let body = self.module.function(self.func.decl).body;
        loop {
            let before = (self.non_uniform.len(), self.summary.returns_non_uniform);
            self.condition = None;
            self.fn_divergence = None;
            self.loop_divergence = None;
            self.stmt(body, findings);
            if before == (self.non_uniform.len(), self.summary.returns_non_uniform) {
                break;
            }
        }
        self.summary
    }

    /// Non-uniform control flow in effect, if any.
    fn control(&self) -> Option<Span> {
        self.condition
            .or(self.fn_divergence)
            .or(self.loop_divergence)
    }

    fn is_non_uniform_input(&self, param: SemVarId) -> bool {
        let var = self.graph.variable(param);
        let VariableDecl::Param(decl) = var.decl else {
            return false;
        };
        if self.has_non_uniform_io(&self.module.param(decl).attrs) {
            return true;
        }
        let Some(strukt) = self.graph.types.struct_id(var.ty) else {
            return false;
        };
        let decl = self.graph.types.struct_type(strukt).decl;
        self.module
            .struct_decl(decl)
            .members
            .iter()
            .any(|&m| self.has_non_uniform_io(&self.module.member(m).attrs))
    }

    fn has_non_uniform_io(&self, attrs: &[AttrId]) -> bool {
        attrs
            .iter()
            .any(|&a| match self.module.attr(a).kind {
                AttributeKind::Location(_) => true,
                AttributeKind::Builtin(builtin) => !builtin.is_uniform(),
                _ => false,
            })
    }

    fn is_non_uniform_var(&self, id: SemVarId) -> bool {
        let var = self.graph.variable(id);
        match var.kind {
            SemVarKind::Global => match var.storage_class {
                StorageClass::Storage => var.access.can_write(),
                StorageClass::Workgroup => true,
                _ => false,
            },
            SemVarKind::Local | SemVarKind::Parameter { .. } => self.non_uniform.contains(&id),
        }
    }

    /// Record that the memory named by `target` may now hold a non-uniform
    /// value.
    fn taint_target(&mut self, target: ExprId) {
        let Some(expr) = self.graph.expr_for(target) else {
            return;
        };
        let Some(var) = self.graph.expr(expr).source_variable else {
            return;
        };
        if self.graph.variable(var).kind != SemVarKind::Global {
            self.non_uniform.insert(var);
        }
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn stmt(&mut self, id: StmtId, findings: &mut Vec<Finding>) {
        ensure_sufficient_stack(|| self.stmt_inner(id, findings));
    }

    fn stmt_inner(&mut self, id: StmtId, findings: &mut Vec<Finding>) {
        let module = self.module;
        let stmt = module.stmt(id);
        match &stmt.kind {
            StmtKind::Block(stmts) => {
                for &s in stmts {
                    self.stmt(s, findings);
                }
            }
            StmtKind::Assign { lhs, rhs } => {
                let lhs_nu = self.expr(*lhs, findings);
                let rhs_nu = self.expr(*rhs, findings);
                if lhs_nu || rhs_nu || self.control().is_some() {
                    self.taint_target(*lhs);
                }
            }
            StmtKind::CompoundAssign { lhs, rhs, .. } => {
                let lhs_nu = self.expr(*lhs, findings);
                let rhs_nu = self.expr(*rhs, findings);
                if lhs_nu || rhs_nu || self.control().is_some() {
                    self.taint_target(*lhs);
                }
            }
            StmtKind::IncDec { lhs, .. } => {
                if self.expr(*lhs, findings) || self.control().is_some() {
                    self.taint_target(*lhs);
                }
            }
            StmtKind::Call(call) => {
                self.expr(*call, findings);
            }
            StmtKind::VarDecl(decl) => {
                let init = module.variable(*decl).init;
                let init_nu = init.is_some_and(|e| self.expr(e, findings));
                if init_nu {
                    if let Some(var) = self.graph.variable_for(*decl) {
                        self.non_uniform.insert(var);
                    }
                }
            }
            StmtKind::Return(value) => {
                if value.is_some_and(|e| self.expr(e, findings)) {
                    self.summary.returns_non_uniform = true;
                }
                self.fn_divergence = self.fn_divergence.or(self.control());
            }
            StmtKind::Discard => {
                self.fn_divergence = self.fn_divergence.or(self.control());
            }
            StmtKind::Break | StmtKind::Continue => {
                self.loop_divergence = self.loop_divergence.or(self.control());
            }
            StmtKind::If {
                cond,
                body,
                else_stmt,
            } => {
                let saved = self.enter_branch(*cond, findings);
                self.stmt(*body, findings);
                if let Some(else_stmt) = else_stmt {
                    self.stmt(*else_stmt, findings);
                }
                self.condition = saved;
            }
            StmtKind::Switch { cond, cases } => {
                let saved = self.enter_branch(*cond, findings);
                for &case in cases {
                    let body = module.case(case).body;
                    self.stmt(body, findings);
                }
                self.condition = saved;
            }
            StmtKind::Loop { body, continuing } => {
                let saved = self.loop_divergence;
                for _ in 0..LOOP_PASSES {
                    self.stmt(*body, findings);
                    if let Some(continuing) = continuing {
                        self.stmt(*continuing, findings);
                    }
                }
                self.loop_divergence = saved;
            }
            StmtKind::For {
                init,
                cond,
                continuing,
                body,
            } => {
                if let Some(init) = init {
                    self.stmt(*init, findings);
                }
                let saved = self.loop_divergence;
                for _ in 0..LOOP_PASSES {
                    if let Some(cond) = cond {
                        self.loop_condition(*cond, findings);
                    }
                    self.stmt(*body, findings);
                    if let Some(continuing) = continuing {
                        self.stmt(*continuing, findings);
                    }
                }
                self.loop_divergence = saved;
            }
            StmtKind::While { cond, body } => {
                let saved = self.loop_divergence;
                for _ in 0..LOOP_PASSES {
                    self.loop_condition(*cond, findings);
                    self.stmt(*body, findings);
                }
                self.loop_divergence = saved;
            }
            StmtKind::StaticAssert(_) | StmtKind::Fallthrough => {}
        }
    }

    /// Evaluate a branch condition; returns the condition to restore after
    /// the branch.
    fn enter_branch(&mut self, cond: ExprId, findings: &mut Vec<Finding>) -> Option<Span> {
        let saved = self.condition;
        if self.expr(cond, findings) {
            self.condition = saved.or(Some(self.module.expr(cond).span));
        }
        saved
    }

    /// A non-uniform loop condition makes invocations leave the loop on
    /// different iterations.
    fn loop_condition(&mut self, cond: ExprId, findings: &mut Vec<Finding>) {
        if self.expr(cond, findings) {
            let span = self.module.expr(cond).span;
            self.loop_divergence = self.loop_divergence.or(Some(span));
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    /// Walk `id`, reporting calls, and return whether its value is
    /// non-uniform.
    fn expr(&mut self, id: ExprId, findings: &mut Vec<Finding>) -> bool {
        ensure_sufficient_stack(|| self.expr_inner(id, findings))
    }

    fn expr_inner(&mut self, id: ExprId, findings: &mut Vec<Finding>) -> bool {
        let graph = self.graph;
        let expr = self.module.expr(id);
        let sem = graph
            .expr_for(id)
            .map(|e| graph.expr(graph.unwrap_materialize(e)));
        if sem.is_some_and(|s| s.constant.is_some()) {
            return false;
        }

        // Every child is walked so that nested calls are checked.
        let mut non_uniform = false;
        for child in expr.kind.children() {
            non_uniform |= self.expr(child, findings);
        }

        let Some(sem) = sem else {
            return non_uniform;
        };
        match (&expr.kind, &sem.kind) {
            (ExprKind::Ident(_), SemExprKind::VariableUser(var)) => self.is_non_uniform_var(*var),
            (_, SemExprKind::Call { target, .. }) => {
                match graph.call_target(*target).kind {
                    CallTargetKind::Builtin(builtin) => {
                        if builtin.requires_uniformity() {
                            let name = builtin.name();
                            self.uniform_call(name.to_owned(), None, name, expr.span, findings);
                        }
                        non_uniform
                    }
                    CallTargetKind::Function(callee) => {
                        let summary = self.summaries.get(&callee).copied().unwrap_or_default();
                        if let Some(requirement) = summary.requires {
                            let name = self.interner.lookup(graph.function(callee).name);
                            self.uniform_call(
                                name.to_owned(),
                                Some(requirement),
                                requirement.builtin,
                                expr.span,
                                findings,
                            );
                        }
                        non_uniform || summary.returns_non_uniform
                    }
                    _ => non_uniform,
                }
            }
            _ => non_uniform,
        }
    }

    /// A call that needs uniform control flow.
    fn uniform_call(
        &mut self,
        callee: String,
        via: Option<Requirement>,
        builtin: &'static str,
        span: Span,
        findings: &mut Vec<Finding>,
    ) {
        match self.control() {
            Some(condition) => {
                if !findings.iter().any(|f| f.span == span) {
                    findings.push(Finding {
                        callee,
                        span,
                        condition,
                        via,
                    });
                }
            }
            None => {
                self.summary.requires = self
                    .summary
                    .requires
                    .or(Some(Requirement { builtin, span }));
            }
        }
    }
}
