//! Statements, control-flow behaviors and reachability.
//!
//! A statement's behavior set says how control leaves it. A statement list
//! sequences them (`B1 - {Next} + B2`) for as long as control can still
//! reach the next statement; the first statement it cannot reach gets a
//! warning.

use lumen_diagnostic::ErrorCode;
use lumen_ir::{CaseClause, CaseId, ExprId, ExprKind, NodeId, Span, StmtId, StmtKind};
use lumen_sem::{
    Behaviors, Constant, EvaluationStage, FirstContinue, Idx, SemExprId, SemStmt, SemStmtId,
    SemStmtKind,
};
use lumen_stack::ensure_sufficient_stack;

use super::Resolver;
use crate::error::{InternalError, ResolveResult};
use crate::validator::SwitchCase;

/// Behaviors of a loop statement from those of its parts. A loop falls
/// through only when it can exit: it has a condition or a `break`.
fn loop_behaviors(parts: Behaviors, has_condition: bool) -> Behaviors {
    let exits = has_condition || parts.contains(Behaviors::BREAK);
    let parts = if exits {
        parts | Behaviors::NEXT
    } else {
        parts.difference(Behaviors::NEXT)
    };
    parts.difference(Behaviors::BREAK | Behaviors::CONTINUE)
}

impl<'a> Resolver<'a> {
    // ========================================================================
    // Scopes
    // ========================================================================

    /// Create a statement of `kind` for `node` and resolve its contents with
    /// it as the current statement. `resolve` returns the statement's
    /// behaviors.
    fn scoped(
        &mut self,
        node: NodeId,
        kind: SemStmtKind,
        resolve: impl FnOnce(&mut Self, SemStmtId) -> ResolveResult<Behaviors>,
    ) -> ResolveResult<SemStmtId> {
        let sem = self.graph.add_stmt(SemStmt {
            decl: node,
            kind,
            parent: self.current_compound,
            function: self.current_function,
            reachable: true,
            behaviors: Behaviors::NEXT,
            decls: Vec::new(),
            first_continue: None,
        });

        let saved = (self.current_stmt, self.current_compound, self.current_block);
        self.current_stmt = Some(sem);
        if kind != SemStmtKind::Plain {
            self.current_compound = Some(sem);
        }
        if kind.is_block() {
            self.current_block = Some(sem);
        }
        let result = resolve(self, sem);
        (self.current_stmt, self.current_compound, self.current_block) = saved;

        self.graph.stmt_mut(sem).behaviors = result?;
        Ok(sem)
    }

    /// Statements of a block statement.
    fn block_contents(&self, id: StmtId) -> ResolveResult<&'a [StmtId]> {
        let module = self.module;
        let stmt = module.stmt(id);
        match &stmt.kind {
            StmtKind::Block(stmts) => Ok(stmts),
            _ => Err(InternalError::MissingSemantic {
                what: "block statement",
                span: stmt.span,
            }
            .into()),
        }
    }

    /// Resolve a block statement as a compound statement of `kind`.
    pub(super) fn block(&mut self, id: StmtId, kind: SemStmtKind) -> ResolveResult<SemStmtId> {
        let stmts = self.block_contents(id)?;
        let node = self.module.stmt(id).id;
        self.mark(node)?;
        self.scoped(node, kind, |this, _| this.statements(stmts))
    }

    fn statements(&mut self, stmts: &[StmtId]) -> ResolveResult<Behaviors> {
        let mut behaviors = Behaviors::NEXT;
        let mut reachable = true;
        let mut first_unreachable = None;
        for &id in stmts {
            let sem = self.statement(id)?;
            let stmt = self.graph.stmt_mut(sem);
            stmt.reachable = reachable;
            if reachable {
                behaviors = behaviors.then(stmt.behaviors);
            } else if first_unreachable.is_none() {
                first_unreachable = Some(id);
            }
            reachable = reachable && stmt.behaviors.contains(Behaviors::NEXT);
        }
        if let Some(id) = first_unreachable {
            if self.options.allow_unreachable_warnings {
                let span = self.module.stmt(id).span;
                self.validator().unreachable(span);
            }
        }
        Ok(behaviors)
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn statement(&mut self, id: StmtId) -> ResolveResult<SemStmtId> {
        ensure_sufficient_stack(|| self.statement_inner(id))
    }

    fn statement_inner(&mut self, id: StmtId) -> ResolveResult<SemStmtId> {
        use SemStmtKind::Plain;

        let module = self.module;
        let stmt = module.stmt(id);
        self.mark(stmt.id)?;
        let (node, span) = (stmt.id, stmt.span);

        match &stmt.kind {
            StmtKind::Block(stmts) => {
                self.scoped(node, SemStmtKind::Block, |this, _| this.statements(stmts))
            }
            StmtKind::Assign { lhs, rhs } => {
                self.scoped(node, Plain, |this, _| this.assignment(*lhs, *rhs))
            }
            StmtKind::Break => self.scoped(node, Plain, |this, sem| {
                let break_if = this.continuing_breaks.contains(&id);
                this.validator().break_stmt(sem, break_if, span)?;
                Ok(Behaviors::BREAK)
            }),
            StmtKind::Call(expr) => self.scoped(node, Plain, |this, _| {
                let expr = this.expression(*expr)?;
                Ok(this.graph.expr(expr).behaviors)
            }),
            StmtKind::CompoundAssign { op, lhs, rhs } => self.scoped(node, Plain, |this, _| {
                let lhs_span = module.expr(*lhs).span;
                let rhs_span = module.expr(*rhs).span;
                let lhs = this.expression(*lhs)?;
                let rhs = this.expression(*rhs)?;
                let (lhs_ty, rhs_ty) = (this.loaded(lhs), this.loaded(rhs));
                let overload = this
                    .intrinsics
                    .binary(&mut this.graph.types, *op, lhs_ty, rhs_ty, true)
                    .map_err(|no_match| this.no_match(no_match, span))?;
                let rhs = this.materialize(rhs, Some(overload.rhs))?;
                let lhs_ty = this.graph.expr(lhs).ty;
                this.validator()
                    .assignment(lhs_ty, overload.result, lhs_span, rhs_span)?;
                Ok(this.graph.expr(rhs).behaviors | this.graph.expr(lhs).behaviors)
            }),
            StmtKind::Continue => self.scoped(node, Plain, |this, sem| {
                if let Some(body) = this
                    .graph
                    .find_first_parent(sem, |k| k == SemStmtKind::LoopBlock)
                {
                    let body = this.graph.stmt_mut(body);
                    if body.first_continue.is_none() {
                        body.first_continue = Some(FirstContinue {
                            span,
                            decl_count: body.decls.len(),
                        });
                    }
                }
                this.validator().continue_stmt(sem, span)?;
                Ok(Behaviors::CONTINUE)
            }),
            StmtKind::Discard => self.scoped(node, Plain, |this, sem| {
                if let Some(func) = this.current_function {
                    let func = this.graph.function_mut(func);
                    if func.discard.is_none() {
                        func.discard = Some(span);
                    }
                }
                this.validator().discard_stmt(sem, span)?;
                Ok(Behaviors::DISCARD)
            }),
            StmtKind::Fallthrough => self.scoped(node, Plain, |this, _| {
                let (is_tail, last_case) = match this.case_tail {
                    Some((tail, last_case)) => (tail == id, last_case),
                    None => (false, false),
                };
                this.validator()
                    .fallthrough_stmt(is_tail, last_case, span)?;
                Ok(Behaviors::FALLTHROUGH)
            }),
            StmtKind::IncDec { lhs, .. } => self.scoped(node, Plain, |this, _| {
                let lhs = this.expression(*lhs)?;
                let ty = this.graph.expr(lhs).ty;
                this.validator().increment(ty, span)?;
                Ok(this.graph.expr(lhs).behaviors)
            }),
            StmtKind::Return(value) => {
                self.scoped(node, Plain, |this, sem| this.return_stmt(sem, *value, span))
            }
            StmtKind::VarDecl(var) => self.scoped(node, Plain, |this, _| {
                let var = this.variable(*var, false)?;
                if let Some(block) = this.current_block {
                    this.graph.stmt_mut(block).decls.push(var);
                }
                let behaviors = this
                    .graph
                    .variable(var)
                    .initializer
                    .map_or(Behaviors::NEXT, |init| this.graph.expr(init).behaviors);
                Ok(behaviors)
            }),
            StmtKind::StaticAssert(cond) => self.scoped(node, Plain, |this, _| {
                let expr = this.expression(*cond)?;
                let ty = this.loaded(expr);
                let constant = this.graph.expr(expr).constant.clone();
                this.validator().static_assert(ty, constant.as_ref(), span)?;
                Ok(Behaviors::NEXT)
            }),
            StmtKind::If {
                cond,
                body,
                else_stmt,
            } => self.scoped(node, SemStmtKind::If, |this, _| {
                let cond_span = module.expr(*cond).span;
                let cond = this.expression(*cond)?;
                let ty = this.loaded(cond);
                this.validator().condition("if statement", ty, cond_span)?;
                let mut behaviors = this.graph.expr(cond).behaviors.difference(Behaviors::NEXT);

                let body = this.block(*body, SemStmtKind::Block)?;
                behaviors |= this.graph.stmt(body).behaviors;
                match else_stmt {
                    Some(else_stmt) => {
                        let else_stmt = this.statement(*else_stmt)?;
                        behaviors |= this.graph.stmt(else_stmt).behaviors;
                    }
                    // A missing else branch behaves like an empty one.
                    None => behaviors |= Behaviors::NEXT,
                }
                Ok(behaviors)
            }),
            StmtKind::Loop { body, continuing } => self.scoped(node, SemStmtKind::Loop, |this, _| {
                this.loop_stmt(*body, *continuing)
            }),
            StmtKind::For {
                init,
                cond,
                continuing,
                body,
            } => self.scoped(node, SemStmtKind::For, |this, _| {
                this.for_stmt(*init, *cond, *continuing, *body)
            }),
            StmtKind::While { cond, body } => self.scoped(node, SemStmtKind::While, |this, _| {
                let cond_span = module.expr(*cond).span;
                let cond = this.expression(*cond)?;
                let ty = this.loaded(cond);
                this.validator().condition("while statement", ty, cond_span)?;
                let mut behaviors = Behaviors::NEXT | this.graph.expr(cond).behaviors;
                let body = this.block(*body, SemStmtKind::LoopBlock)?;
                behaviors |= this.graph.stmt(body).behaviors;
                Ok(loop_behaviors(behaviors, true))
            }),
            StmtKind::Switch { cond, cases } => self.scoped(node, SemStmtKind::Switch, |this, _| {
                this.switch_stmt(*cond, cases, span)
            }),
        }
    }

    // ========================================================================
    // Assignments and Returns
    // ========================================================================

    fn assignment(&mut self, lhs: ExprId, rhs: ExprId) -> ResolveResult<Behaviors> {
        let module = self.module;
        let lhs_span = module.expr(lhs).span;
        let rhs_span = module.expr(rhs).span;
        let is_phony = matches!(module.expr(lhs).kind, ExprKind::Phony);

        let lhs = self.expression(lhs)?;
        let rhs = self.expression(rhs)?;
        if is_phony {
            let rhs = self.materialize(rhs, None)?;
            let ty = self.loaded(rhs);
            self.validator().phony_assignment(ty, rhs_span)?;
            return Ok(self.graph.expr(rhs).behaviors);
        }

        let lhs_ty = self.graph.expr(lhs).ty;
        let rhs = self.materialize(rhs, Some(self.loaded(lhs)))?;
        let rhs_ty = self.loaded(rhs);
        self.validator()
            .assignment(lhs_ty, rhs_ty, lhs_span, rhs_span)?;
        Ok(self.graph.expr(rhs).behaviors | self.graph.expr(lhs).behaviors)
    }

    fn return_stmt(
        &mut self,
        sem: SemStmtId,
        value: Option<ExprId>,
        span: Span,
    ) -> ResolveResult<Behaviors> {
        let Some(func) = self.current_function else {
            return Err(InternalError::MissingSemantic {
                what: "enclosing function",
                span,
            }
            .into());
        };
        let expected = self.graph.function(func).return_type;

        let mut behaviors = Behaviors::RETURN;
        let value_ty = match value {
            Some(value) => {
                let mut expr = self.expression(value)?;
                if expected != Idx::VOID {
                    expr = self.materialize(expr, Some(expected))?;
                }
                behaviors |= self.graph.expr(expr).behaviors.difference(Behaviors::NEXT);
                self.loaded(expr)
            }
            None => Idx::VOID,
        };
        self.validator()
            .return_stmt(sem, expected, value_ty, span)?;
        Ok(behaviors)
    }

    // ========================================================================
    // Loops
    // ========================================================================

    /// `loop { body continuing { ... } }`. The continuing block is nested in
    /// the body so it sees the body's declarations.
    fn loop_stmt(&mut self, body: StmtId, continuing: Option<StmtId>) -> ResolveResult<Behaviors> {
        let stmts = self.block_contents(body)?;
        let body_node = self.module.stmt(body).id;
        self.mark(body_node)?;

        let mut behaviors = Behaviors::empty();
        self.scoped(body_node, SemStmtKind::LoopBlock, |this, _| {
            let body_behaviors = this.statements(stmts)?;
            behaviors = body_behaviors;
            if let Some(continuing) = continuing {
                this.collect_break_ifs(continuing);
                let continuing = this.block(continuing, SemStmtKind::LoopContinuingBlock)?;
                behaviors |= this.graph.stmt(continuing).behaviors;
            }
            Ok(body_behaviors)
        })?;
        Ok(loop_behaviors(behaviors, false))
    }

    /// Remember the `break`s that make up a break-if: the whole branch of an
    /// `if` that is the last statement of a continuing block.
    fn collect_break_ifs(&mut self, continuing: StmtId) {
        let module = self.module;
        let StmtKind::Block(stmts) = &module.stmt(continuing).kind else {
            return;
        };
        let Some(&last) = stmts.last() else {
            return;
        };
        let StmtKind::If {
            body, else_stmt, ..
        } = &module.stmt(last).kind
        else {
            return;
        };
        for branch in std::iter::once(*body).chain(*else_stmt) {
            if let StmtKind::Block(inner) = &module.stmt(branch).kind {
                if let [only] = inner.as_slice() {
                    if matches!(module.stmt(*only).kind, StmtKind::Break) {
                        self.continuing_breaks.insert(*only);
                    }
                }
            }
        }
    }

    fn for_stmt(
        &mut self,
        init: Option<StmtId>,
        cond: Option<ExprId>,
        continuing: Option<StmtId>,
        body: StmtId,
    ) -> ResolveResult<Behaviors> {
        let mut behaviors = Behaviors::NEXT;
        if let Some(init) = init {
            let init = self.statement(init)?;
            behaviors |= self.graph.stmt(init).behaviors;
        }
        if let Some(cond) = cond {
            let cond_span = self.module.expr(cond).span;
            let cond = self.expression(cond)?;
            let ty = self.loaded(cond);
            self.validator().condition("for-loop", ty, cond_span)?;
            behaviors |= self.graph.expr(cond).behaviors;
        }
        if let Some(continuing) = continuing {
            let continuing = self.statement(continuing)?;
            behaviors |= self.graph.stmt(continuing).behaviors;
        }
        let body = self.block(body, SemStmtKind::LoopBlock)?;
        behaviors |= self.graph.stmt(body).behaviors;
        Ok(loop_behaviors(behaviors, cond.is_some()))
    }

    // ========================================================================
    // Switch
    // ========================================================================

    fn switch_stmt(&mut self, cond: ExprId, cases: &[CaseId], span: Span) -> ResolveResult<Behaviors> {
        let module = self.module;
        let cond_span = module.expr(cond).span;
        let cond = self.expression(cond)?;
        let mut behaviors = self.graph.expr(cond).behaviors.difference(Behaviors::NEXT);
        let mut types = vec![self.loaded(cond)];

        let saved_tail = self.case_tail;
        let mut clauses: Vec<(&CaseClause, Vec<SemExprId>)> = Vec::with_capacity(cases.len());
        for (i, &case_id) in cases.iter().enumerate() {
            let clause = module.case(case_id);
            self.mark(clause.id)?;
            let is_last = i + 1 == cases.len();

            let mut selectors = Vec::with_capacity(clause.selectors.len());
            let case = self.scoped(clause.id, SemStmtKind::Case, |this, _| {
                for &selector in &clause.selectors {
                    selectors.push(this.expression(selector)?);
                }
                this.case_tail = this
                    .block_contents(clause.body)?
                    .last()
                    .map(|&tail| (tail, is_last));
                let body = this.block(clause.body, SemStmtKind::CaseBlock)?;
                Ok(this.graph.stmt(body).behaviors)
            });
            self.case_tail = saved_tail;
            let case = case?;

            types.extend(selectors.iter().map(|&s| self.loaded(s)));
            behaviors |= self.graph.stmt(case).behaviors;
            clauses.push((clause, selectors));
        }

        // Selectors and condition share one concrete integer type.
        let common = match self.pool().common(&types) {
            Some(ty) if self.pool().is_integer_scalar(ty) && !self.pool().is_abstract(ty) => ty,
            _ => Idx::I32,
        };
        let cond = self.materialize(cond, Some(common))?;
        let cond_ty = self.loaded(cond);

        let mut switch_cases = Vec::with_capacity(clauses.len());
        for (clause, selectors) in clauses {
            let mut values = Vec::with_capacity(selectors.len());
            for (selector, &decl) in selectors.into_iter().zip(&clause.selectors) {
                let selector_span = module.expr(decl).span;
                let selector = self.materialize(selector, Some(common))?;
                let e = self.graph.expr(selector);
                let value = if e.stage == EvaluationStage::Constant {
                    e.constant.as_ref().and_then(Constant::as_i64)
                } else {
                    None
                };
                let Some(value) = value else {
                    return Err(self.error(
                        ErrorCode::E2006,
                        "case selector must be a constant expression",
                        selector_span,
                    ));
                };
                if self.loaded(selector) != cond_ty {
                    return Err(self.error(
                        ErrorCode::E2001,
                        "the case selector values must have the same type as the selector \
                         expression.",
                        selector_span,
                    ));
                }
                values.push((value, selector_span));
            }
            switch_cases.push(SwitchCase {
                selectors: values,
                is_default: clause.is_default(),
                span: clause.span,
            });
        }
        self.validator()
            .switch(cond_ty, cond_span, &switch_cases, span)?;

        if behaviors.contains(Behaviors::BREAK) {
            behaviors |= Behaviors::NEXT;
        }
        Ok(behaviors.difference(Behaviors::BREAK | Behaviors::FALLTHROUGH))
    }
}
