//! Expressions.
//!
//! Expression trees are walked iteratively: a pre-order pass collects the
//! nodes, then they are resolved in reverse so every operand is resolved
//! before the expression that uses it. Nesting depth is bounded by
//! [`ResolverOptions::max_expression_depth`](crate::ResolverOptions).

use lumen_diagnostic::ErrorCode;
use lumen_ir::{BinaryOp, ExprId, ExprKind, Extension, Literal, Name, NodeId, Span, UnaryOp};
use lumen_sem::{
    Behaviors, BuiltinFn, Constant, DeclKind, EvaluationStage, Idx, SemExpr, SemExprId,
    SemExprKind, SemStmtKind, SemVarId, SemVarKind, TypeKind,
};
use smallvec::SmallVec;

use super::Resolver;
use crate::const_eval::{self, check_index, ConstEval};
use crate::dependency::Decl;
use crate::error::{Halt, InternalError, ResolveResult};
use crate::intrinsic::NoMatch;

impl Resolver<'_> {
    /// Resolve an expression tree and return the semantic entity of its
    /// root.
    pub(super) fn expression(&mut self, root: ExprId) -> ResolveResult<SemExprId> {
        let module = self.module;
        let max_depth = self.options.max_expression_depth;

        let mut pending = vec![(root, 0usize)];
        let mut order = Vec::new();
        while let Some((id, depth)) = pending.pop() {
            let expr = module.expr(id);
            if depth > max_depth {
                return Err(self.error(
                    ErrorCode::E2021,
                    format!("reached max expression depth of {max_depth}"),
                    expr.span,
                ));
            }
            order.push(id);
            pending.extend(expr.kind.children().into_iter().map(|c| (c, depth + 1)));
        }

        for &id in order.iter().rev() {
            self.expression_node(id)?;
        }
        self.sem_expr(root)
    }

    fn expression_node(&mut self, id: ExprId) -> ResolveResult<SemExprId> {
        let module = self.module;
        let expr = module.expr(id);
        self.mark(expr.id)?;
        let span = expr.span;

        match &expr.kind {
            ExprKind::Literal(literal) => self.literal(id, *literal, span),
            ExprKind::Ident(name) => self.identifier(id, expr.id, *name, span),
            ExprKind::Index { object, index } => self.index_access(id, *object, *index, span),
            ExprKind::Member { object, member } => self.member_access(id, *object, *member, span),
            ExprKind::Binary { op, lhs, rhs } => self.binary(id, *op, *lhs, *rhs, span),
            ExprKind::Unary { op, operand } => self.unary(id, *op, *operand, span),
            ExprKind::Bitcast { ty, expr: operand } => {
                let ty = self.resolve_type(*ty)?;
                let operand = self.sem_expr(*operand)?;
                let operand = self.materialize(operand, None)?;
                let from = self.loaded(operand);
                self.validator().bitcast(from, ty, span)?;
                let sem = self.new_expr(id, ty, &[operand]);
                Ok(self.push_expr(sem))
            }
            ExprKind::Call { target, args } => self.call(id, *target, args, span),
            ExprKind::Phony => {
                let mut sem = self.new_expr(id, Idx::VOID, &[]);
                sem.stage = EvaluationStage::Runtime;
                Ok(self.push_expr(sem))
            }
        }
    }

    // ========================================================================
    // Construction Helpers
    // ========================================================================

    /// A plain expression whose stage, behaviors and side effects combine
    /// those of `operands`.
    pub(super) fn new_expr(&self, decl: ExprId, ty: Idx, operands: &[SemExprId]) -> SemExpr {
        let mut stage = EvaluationStage::Constant;
        let mut behaviors = Behaviors::NEXT;
        let mut has_side_effects = false;
        for &operand in operands {
            let e = self.graph.expr(operand);
            stage = stage.max(e.stage);
            behaviors |= e.behaviors;
            has_side_effects |= e.has_side_effects;
        }
        SemExpr {
            decl,
            kind: SemExprKind::Plain,
            ty,
            stage,
            constant: None,
            stmt: self.current_stmt,
            has_side_effects,
            behaviors,
            source_variable: None,
        }
    }

    /// Add `expr` to the graph. A constant-stage expression without a value
    /// is evaluated at runtime; only constant-stage expressions keep one.
    pub(super) fn push_expr(&mut self, mut expr: SemExpr) -> SemExprId {
        match (expr.stage, expr.constant.is_some()) {
            (EvaluationStage::Constant, false) => expr.stage = EvaluationStage::Runtime,
            (EvaluationStage::Override | EvaluationStage::Runtime, true) => expr.constant = None,
            _ => {}
        }
        self.graph.add_expr(expr)
    }

    /// Constant values of `operands`, when every one has one.
    pub(super) fn constants_of(&self, operands: &[SemExprId]) -> Option<Vec<Constant>> {
        operands
            .iter()
            .map(|&op| {
                let e = self.graph.expr(op);
                (e.stage == EvaluationStage::Constant)
                    .then(|| e.constant.clone())
                    .flatten()
            })
            .collect()
    }

    /// Report a failed overload lookup.
    pub(super) fn no_match(&mut self, no_match: NoMatch, span: Span) -> Halt {
        let halt = self.error(ErrorCode::E2008, no_match.message.clone(), span);
        self.sink.add_detail(no_match.detail());
        halt
    }

    // ========================================================================
    // Literals and Identifiers
    // ========================================================================

    fn literal(&mut self, id: ExprId, literal: Literal, span: Span) -> ResolveResult<SemExprId> {
        let (ty, value) = const_eval::literal(literal)
            .map_err(|err| self.error(ErrorCode::E2018, err.to_string(), span))?;
        if ty == Idx::F16 {
            self.validator()
                .require_extension(Extension::F16, "f16 literal", span)?;
        }
        let mut sem = self.new_expr(id, ty, &[]);
        sem.constant = Some(value);
        Ok(self.push_expr(sem))
    }

    fn identifier(
        &mut self,
        id: ExprId,
        node: NodeId,
        name: Name,
        span: Span,
    ) -> ResolveResult<SemExprId> {
        let text = self.name(name);
        let missing_paren = match self.deps.resolved(node) {
            Some(Decl::Variable(decl)) => {
                let var = self.graph.variable_for(decl).ok_or_else(|| self.prior_failure())?;
                return self.variable_user(id, var, span);
            }
            Some(Decl::Param(decl)) => {
                let var = self.graph.param_for(decl).ok_or_else(|| self.prior_failure())?;
                return self.variable_user(id, var, span);
            }
            Some(Decl::Function(_)) => "function call",
            Some(Decl::Struct(_) | Decl::Alias(_)) => "type constructor or cast",
            None if BuiltinFn::from_name(text).is_some() => "builtin call",
            None => {
                return Err(InternalError::MissingSemantic {
                    what: "identifier declaration",
                    span,
                }
                .into());
            }
        };
        Err(self.error(
            ErrorCode::E2009,
            format!("missing '(' for {missing_paren}"),
            span.end_point(),
        ))
    }

    /// An expression naming a variable: a reference for `var`, the value
    /// otherwise.
    fn variable_user(&mut self, id: ExprId, var: SemVarId, span: Span) -> ResolveResult<SemExprId> {
        self.check_continue_bypass(var, span)?;

        let v = self.graph.variable(var);
        let (decl_kind, kind, store, storage_class, access) =
            (v.decl_kind, v.kind, v.ty, v.storage_class, v.access);
        let stage = v.stage;
        let constant = v.constant.clone();

        let ty = if decl_kind == DeclKind::Var {
            self.graph.types.reference(store, storage_class, access)
        } else {
            store
        };
        let mut sem = self.new_expr(id, ty, &[]);
        sem.kind = SemExprKind::VariableUser(var);
        sem.stage = stage;
        sem.constant = constant;
        sem.source_variable = Some(var);
        let sem = self.push_expr(sem);

        self.graph.variable_mut(var).users.push(sem);
        if kind == SemVarKind::Global {
            if let Some(func) = self.current_function {
                let func = self.graph.function_mut(func);
                func.directly_referenced_globals.add(var);
                func.transitively_referenced_globals.add(var);
            }
        }
        Ok(sem)
    }

    /// A `continuing` block must not use a body declaration that a
    /// `continue` skips over.
    fn check_continue_bypass(&mut self, var: SemVarId, span: Span) -> ResolveResult {
        let Some(block) = self.current_block else {
            return Ok(());
        };
        let Some(continuing) = self
            .graph
            .find_first_parent(block, |k| k == SemStmtKind::LoopContinuingBlock)
        else {
            return Ok(());
        };
        let Some(body) = self
            .graph
            .find_first_parent(continuing, |k| k == SemStmtKind::LoopBlock)
        else {
            return Ok(());
        };
        let body = self.graph.stmt(body);
        let Some(first_continue) = body.first_continue else {
            return Ok(());
        };
        let Some(position) = body.decls.iter().position(|&d| d == var) else {
            return Ok(());
        };
        if position < first_continue.decl_count {
            return Ok(());
        }

        let v = self.graph.variable(var);
        let (name, declared) = (self.name(v.name), v.span);
        let halt = self.error(
            ErrorCode::E2014,
            format!("continue statement bypasses declaration of '{name}'"),
            first_continue.span,
        );
        self.note(format!("identifier '{name}' declared here"), declared);
        self.note(
            format!("identifier '{name}' referenced in continuing block here"),
            span,
        );
        Err(halt)
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    fn index_access(
        &mut self,
        id: ExprId,
        object: ExprId,
        index: ExprId,
        span: Span,
    ) -> ResolveResult<SemExprId> {
        let mut object = self.sem_expr(object)?;
        let index = self.sem_expr(index)?;

        let index_ty = self.loaded(index);
        if !matches!(index_ty, Idx::I32 | Idx::U32 | Idx::ABSTRACT_INT) {
            return Err(self.error(
                ErrorCode::E2007,
                format!(
                    "index must be of type 'i32' or 'u32', found: '{}'",
                    self.type_name(index_ty)
                ),
                self.expr_span(index),
            ));
        }
        let index = self.materialize(index, None)?;

        // A runtime index into a constant composite needs a concrete value.
        if self.graph.expr(index).stage != EvaluationStage::Constant {
            object = self.materialize(object, None)?;
        }

        let object_ty = self.graph.expr(object).ty;
        let (storage_ty, reference) = match self.pool().kind(object_ty) {
            TypeKind::Reference {
                store,
                storage_class,
                access,
            } => (store, Some((storage_class, access))),
            _ => (object_ty, None),
        };
        let elem = match self.pool().kind(storage_ty) {
            TypeKind::Array { elem, .. } | TypeKind::Vector { elem, .. } => elem,
            TypeKind::Matrix { column, .. } => column,
            _ => {
                return Err(self.error(
                    ErrorCode::E2007,
                    format!("cannot index type '{}'", self.type_name(storage_ty)),
                    self.expr_span(object),
                ));
            }
        };

        let index_value = self.constants_of(&[index]).and_then(|c| c[0].as_i64());
        if let (Some(value), Some(count)) = (index_value, self.pool().element_count(storage_ty)) {
            check_index(count, value).map_err(|err| {
                self.error(ErrorCode::E2007, err.to_string(), self.expr_span(index))
            })?;
        }

        let ty = match reference {
            Some((storage_class, access)) => {
                self.graph.types.reference(elem, storage_class, access)
            }
            None => elem,
        };
        let mut sem = self.new_expr(id, ty, &[object, index]);
        sem.source_variable = self.graph.expr(object).source_variable;
        if let (Some(value), Some(constants)) = (index_value, self.constants_of(&[object])) {
            let eval = ConstEval::new(self.pool(), self.interner);
            let value = eval
                .index(&constants[0], value)
                .map_err(|err| self.error(ErrorCode::E2018, err.to_string(), span))?;
            sem.constant = Some(value);
        }
        Ok(self.push_expr(sem))
    }

    fn member_access(
        &mut self,
        id: ExprId,
        object: ExprId,
        member: Name,
        span: Span,
    ) -> ResolveResult<SemExprId> {
        let object = self.sem_expr(object)?;
        let object_ty = self.graph.expr(object).ty;
        let (storage_ty, reference) = match self.pool().kind(object_ty) {
            TypeKind::Reference {
                store,
                storage_class,
                access,
            } => (store, Some((storage_class, access))),
            _ => (object_ty, None),
        };
        let member_text = self.name(member);

        match self.pool().kind(storage_ty) {
            TypeKind::Struct(strukt) => {
                let Some(found) = self.pool().struct_type(strukt).find_member(member) else {
                    return Err(self.error(
                        ErrorCode::E2007,
                        format!("struct member {member_text} not found"),
                        span,
                    ));
                };
                let (member_ty, index) = (found.ty, found.index);
                let ty = match reference {
                    Some((storage_class, access)) => {
                        self.graph.types.reference(member_ty, storage_class, access)
                    }
                    None => member_ty,
                };
                let mut sem = self.new_expr(id, ty, &[object]);
                sem.kind = SemExprKind::Member {
                    object,
                    strukt,
                    index,
                };
                sem.source_variable = self.graph.expr(object).source_variable;
                if let Some(constants) = self.constants_of(&[object]) {
                    sem.constant = ConstEval::new(self.pool(), self.interner)
                        .member(&constants[0], index);
                }
                Ok(self.push_expr(sem))
            }
            TypeKind::Vector { elem, width } => {
                let indices = self.swizzle_indices(member_text, width, span)?;
                #[expect(
                    clippy::cast_possible_truncation,
                    reason = "swizzles have at most four components"
                )]
                let ty = match (indices.len(), reference) {
                    (1, Some((storage_class, access))) => {
                        self.graph.types.reference(elem, storage_class, access)
                    }
                    (1, None) => elem,
                    (n, _) => self.graph.types.vector(elem, n as u32),
                };
                let mut sem = self.new_expr(id, ty, &[object]);
                if indices.len() == 1 {
                    sem.source_variable = self.graph.expr(object).source_variable;
                }
                if let Some(constants) = self.constants_of(&[object]) {
                    sem.constant = ConstEval::new(self.pool(), self.interner).swizzle(
                        ty,
                        &constants[0],
                        &indices,
                    );
                }
                sem.kind = SemExprKind::Swizzle { object, indices };
                Ok(self.push_expr(sem))
            }
            _ => Err(self.error(
                ErrorCode::E2007,
                format!(
                    "invalid member accessor expression. Expected vector or struct, got '{}'",
                    self.type_name(storage_ty)
                ),
                span,
            )),
        }
    }

    /// Component indices of a swizzle such as `xzy` or `rgba`.
    fn swizzle_indices(
        &mut self,
        text: &str,
        width: u32,
        span: Span,
    ) -> ResolveResult<SmallVec<[u32; 4]>> {
        let mut indices = SmallVec::new();
        let (mut xyzw, mut rgba) = (false, false);
        for c in text.chars() {
            let index = match c {
                'x' | 'r' => 0,
                'y' | 'g' => 1,
                'z' | 'b' => 2,
                'w' | 'a' => 3,
                _ => {
                    return Err(self.error(
                        ErrorCode::E2007,
                        "invalid vector swizzle character",
                        span,
                    ));
                }
            };
            if "xyzw".contains(c) {
                xyzw = true;
            } else {
                rgba = true;
            }
            indices.push(index);
        }
        if indices.is_empty() || indices.len() > 4 {
            return Err(self.error(ErrorCode::E2007, "invalid vector swizzle size", span));
        }
        if xyzw && rgba {
            return Err(self.error(
                ErrorCode::E2007,
                "invalid mixing of vector swizzle characters rgba with xyzw",
                span,
            ));
        }
        if indices.iter().any(|&i| i >= width) {
            return Err(self.error(ErrorCode::E2007, "invalid vector swizzle member", span));
        }
        Ok(indices)
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn binary(
        &mut self,
        id: ExprId,
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
        span: Span,
    ) -> ResolveResult<SemExprId> {
        let lhs = self.sem_expr(lhs)?;
        let rhs = self.sem_expr(rhs)?;
        let (lhs_ty, rhs_ty) = (self.loaded(lhs), self.loaded(rhs));

        let overload = self
            .intrinsics
            .binary(&mut self.graph.types, op, lhs_ty, rhs_ty, false)
            .map_err(|no_match| self.no_match(no_match, span))?;
        let lhs = self.materialize(lhs, Some(overload.lhs))?;
        let rhs = self.materialize(rhs, Some(overload.rhs))?;

        let mut sem = self.new_expr(id, overload.result, &[lhs, rhs]);
        if let Some(constants) = self.constants_of(&[lhs, rhs]) {
            let value = ConstEval::new(self.pool(), self.interner)
                .binary(op, overload.result, &constants[0], &constants[1])
                .map_err(|err| self.error(ErrorCode::E2018, err.to_string(), span))?;
            sem.constant = Some(value);
        }
        Ok(self.push_expr(sem))
    }

    fn unary(
        &mut self,
        id: ExprId,
        op: UnaryOp,
        operand: ExprId,
        span: Span,
    ) -> ResolveResult<SemExprId> {
        let operand = self.sem_expr(operand)?;
        let operand_ty = self.graph.expr(operand).ty;

        match op {
            UnaryOp::AddressOf => {
                let TypeKind::Reference {
                    store,
                    storage_class,
                    access,
                } = self.pool().kind(operand_ty)
                else {
                    return Err(self.error(
                        ErrorCode::E2001,
                        "cannot take the address of expression",
                        span,
                    ));
                };
                if matches!(self.graph.expr(operand).kind, SemExprKind::Swizzle { .. }) {
                    return Err(self.error(
                        ErrorCode::E2001,
                        "cannot take the address of a vector component",
                        span,
                    ));
                }
                if storage_class == lumen_ir::StorageClass::Handle {
                    return Err(self.error(
                        ErrorCode::E2001,
                        "cannot take the address of expression in handle storage class",
                        span,
                    ));
                }
                let ty = self.graph.types.pointer(store, storage_class, access);
                let mut sem = self.new_expr(id, ty, &[operand]);
                sem.stage = self.graph.expr(operand).stage;
                sem.source_variable = self.graph.expr(operand).source_variable;
                Ok(self.push_expr(sem))
            }
            UnaryOp::Indirection => {
                let loaded = self.pool().unwrap_ref(operand_ty);
                let TypeKind::Pointer {
                    store,
                    storage_class,
                    access,
                } = self.pool().kind(loaded)
                else {
                    return Err(self.error(
                        ErrorCode::E2001,
                        format!(
                            "cannot dereference expression of type '{}'",
                            self.type_name(loaded)
                        ),
                        span,
                    ));
                };
                let ty = self.graph.types.reference(store, storage_class, access);
                let mut sem = self.new_expr(id, ty, &[operand]);
                sem.source_variable = self.graph.expr(operand).source_variable;
                Ok(self.push_expr(sem))
            }
            UnaryOp::Negation | UnaryOp::Complement | UnaryOp::Not => {
                let loaded = self.pool().unwrap_ref(operand_ty);
                let overload = self
                    .intrinsics
                    .unary(&mut self.graph.types, op, loaded)
                    .map_err(|no_match| self.no_match(no_match, span))?;
                let operand = self.materialize(operand, Some(overload.operand))?;
                let mut sem = self.new_expr(id, overload.result, &[operand]);
                if let Some(constants) = self.constants_of(&[operand]) {
                    let value = ConstEval::new(self.pool(), self.interner)
                        .unary(op, overload.result, &constants[0])
                        .map_err(|err| self.error(ErrorCode::E2018, err.to_string(), span))?;
                    sem.constant = Some(value);
                }
                Ok(self.push_expr(sem))
            }
        }
    }
}
