//! Calls: user functions, builtins, and type constructors and conversions.

use lumen_diagnostic::ErrorCode;
use lumen_ir::{AttrId, CallTarget as SyntaxTarget, ExprId, FunctionId, Span, TypeExprId, TypeExprKind};
use lumen_sem::{
    ArrayCount, BuiltinFn, CallParam, CallTarget, CallTargetKind, Constant,
    EvaluationStage, Idx, ParamUsage, SemExprId, SemExprKind, SemVarKind, TypeKind,
};
use smallvec::SmallVec;

use super::Resolver;
use crate::const_eval::{ConstEval, CtorEval};
use crate::dependency::Decl;
use crate::error::{InternalError, ResolveResult};
use crate::intrinsic::{CtorKind, CtorTarget};

impl Resolver<'_> {
    pub(super) fn call(
        &mut self,
        id: ExprId,
        target: SyntaxTarget,
        args: &[ExprId],
        span: Span,
    ) -> ResolveResult<SemExprId> {
        let module = self.module;
        let args = args
            .iter()
            .map(|&arg| self.sem_expr(arg))
            .collect::<ResolveResult<Vec<_>>>()?;

        match target {
            SyntaxTarget::Ident(ident) => {
                let ident = module.ident(ident);
                self.mark(ident.id)?;
                let text = self.name(ident.name);
                let declared = match self.deps.resolved(ident.id) {
                    Some(Decl::Function(callee)) => {
                        return self.function_call(id, callee, args, span);
                    }
                    Some(Decl::Struct(decl)) => {
                        let ty = self.graph.struct_for(decl).ok_or_else(|| self.prior_failure())?;
                        return self.type_ctor(id, ty, args, span);
                    }
                    Some(Decl::Alias(decl)) => {
                        let ty = self.graph.alias_for(decl).ok_or_else(|| self.prior_failure())?;
                        return self.type_ctor(id, ty, args, span);
                    }
                    Some(Decl::Variable(decl)) => module.variable(decl).span,
                    Some(Decl::Param(decl)) => module.param(decl).span,
                    None => {
                        return match BuiltinFn::from_name(text) {
                            Some(builtin) => self.builtin_call(id, builtin, args, span),
                            None => Err(InternalError::UnhandledCallTarget {
                                name: text.to_owned(),
                                span,
                            }
                            .into()),
                        };
                    }
                };
                let halt = self.error(
                    ErrorCode::E2009,
                    format!("cannot call variable '{text}'"),
                    ident.span,
                );
                self.note(format!("'{text}' declared here"), declared);
                Err(halt)
            }
            SyntaxTarget::Type(ty) => {
                let te = module.type_expr(ty);
                match &te.kind {
                    TypeExprKind::Vector { width, elem: None } => {
                        self.mark(te.id)?;
                        let target = CtorTarget::Vector {
                            width: *width,
                            elem: None,
                        };
                        self.value_ctor(id, Some(ty), target, args, span)
                    }
                    TypeExprKind::Matrix {
                        columns,
                        rows,
                        elem: None,
                    } => {
                        self.mark(te.id)?;
                        let target = CtorTarget::Matrix {
                            columns: *columns,
                            rows: *rows,
                            elem: None,
                        };
                        self.value_ctor(id, Some(ty), target, args, span)
                    }
                    TypeExprKind::Array {
                        elem: None,
                        count,
                        attrs,
                    } => {
                        self.mark(te.id)?;
                        self.inferred_array_ctor(id, ty, *count, attrs, args, span)
                    }
                    _ => {
                        let ty = self.resolve_type(ty)?;
                        self.type_ctor(id, ty, args, span)
                    }
                }
            }
        }
    }

    /// Record a call expression.
    fn finish_call(
        &mut self,
        id: ExprId,
        target: CallTarget,
        args: Vec<SemExprId>,
        constant: Option<Constant>,
    ) -> SemExprId {
        let (ty, target_stage) = (target.return_type, target.stage);
        let target = self.graph.intern_call_target(target);
        let mut sem = self.new_expr(id, ty, &args);
        sem.stage = sem.stage.max(target_stage);
        sem.constant = constant;
        sem.kind = SemExprKind::Call { target, args };
        self.push_expr(sem)
    }

    /// Constant value of a constructor whose arguments are all constant.
    fn construct_constant(
        &mut self,
        how: CtorEval,
        ty: Idx,
        args: &[SemExprId],
        span: Span,
    ) -> ResolveResult<Option<Constant>> {
        let Some(constants) = self.constants_of(args) else {
            return Ok(None);
        };
        ConstEval::new(self.pool(), self.interner)
            .construct(how, ty, &constants)
            .map(Some)
            .map_err(|err| self.error(ErrorCode::E2018, err.to_string(), span))
    }

    // ========================================================================
    // Type Constructors
    // ========================================================================

    fn type_ctor(
        &mut self,
        id: ExprId,
        ty: Idx,
        args: Vec<SemExprId>,
        span: Span,
    ) -> ResolveResult<SemExprId> {
        match self.pool().kind(ty) {
            TypeKind::Bool | TypeKind::I32 | TypeKind::U32 | TypeKind::F32 | TypeKind::F16 => {
                self.value_ctor(id, None, CtorTarget::Scalar(ty), args, span)
            }
            TypeKind::Vector { elem, width } => {
                let target = CtorTarget::Vector {
                    width,
                    elem: Some(elem),
                };
                self.value_ctor(id, None, target, args, span)
            }
            TypeKind::Matrix {
                elem,
                columns,
                rows,
                ..
            } => {
                let target = CtorTarget::Matrix {
                    columns,
                    rows,
                    elem: Some(elem),
                };
                self.value_ctor(id, None, target, args, span)
            }
            TypeKind::Array { elem, count, .. } => self.array_ctor(id, ty, elem, count, args, span),
            TypeKind::Struct(_) => self.struct_ctor(id, ty, args, span),
            _ => Err(self.error(
                ErrorCode::E2009,
                format!("type '{}' is not constructible", self.type_name(ty)),
                span,
            )),
        }
    }

    /// Scalar, vector and matrix constructors and conversions. `inferred`
    /// is the type expression whose element type is inferred, if any.
    fn value_ctor(
        &mut self,
        id: ExprId,
        inferred: Option<TypeExprId>,
        target: CtorTarget,
        args: Vec<SemExprId>,
        span: Span,
    ) -> ResolveResult<SemExprId> {
        let arg_types: Vec<Idx> = args.iter().map(|&arg| self.loaded(arg)).collect();
        let overload = self
            .intrinsics
            .ctor_or_conv(&mut self.graph.types, target, &arg_types)
            .map_err(|no_match| self.no_match(no_match, span))?;
        if let Some(te) = inferred {
            self.graph.set_type_for(te, overload.ty);
        }
        let args = self.materialize_args(&args, &overload.params)?;

        let kind = match overload.kind {
            CtorKind::Construct => CallTargetKind::ValueConstructor(overload.ty),
            CtorKind::Convert { from } => CallTargetKind::ValueConversion {
                from,
                to: overload.ty,
            },
        };
        let constant = self.construct_constant(overload.eval, overload.ty, &args, span)?;
        let target = CallTarget {
            kind,
            params: value_params(&overload.params),
            return_type: overload.ty,
            stage: EvaluationStage::Constant,
        };
        Ok(self.finish_call(id, target, args, constant))
    }

    fn array_ctor(
        &mut self,
        id: ExprId,
        ty: Idx,
        elem: Idx,
        count: ArrayCount,
        args: Vec<SemExprId>,
        span: Span,
    ) -> ResolveResult<SemExprId> {
        let ArrayCount::Constant(count) = count else {
            return Err(self.error(
                ErrorCode::E2009,
                "cannot construct a runtime-sized array",
                span,
            ));
        };
        if !self.pool().is_constructible(ty) {
            return Err(self.error(
                ErrorCode::E2009,
                "array constructor has non-constructible element type",
                span,
            ));
        }
        if !args.is_empty() && args.len() != count as usize {
            let amount = if args.len() < count as usize {
                "few"
            } else {
                "many"
            };
            return Err(self.error(
                ErrorCode::E2009,
                format!(
                    "array constructor has too {amount} elements: expected {count}, found {}",
                    args.len()
                ),
                span,
            ));
        }

        let mut materialized = Vec::with_capacity(args.len());
        for arg in args {
            let arg = self.materialize(arg, Some(elem))?;
            let arg_ty = self.loaded(arg);
            if arg_ty != elem {
                return Err(self.error(
                    ErrorCode::E2001,
                    format!(
                        "type in array constructor does not match array type: expected '{}', \
                         found '{}'",
                        self.type_name(elem),
                        self.type_name(arg_ty)
                    ),
                    self.expr_span(arg),
                ));
            }
            materialized.push(arg);
        }

        let how = if materialized.is_empty() {
            CtorEval::Zero
        } else {
            CtorEval::Compose
        };
        let constant = self.construct_constant(how, ty, &materialized, span)?;
        let params = vec![elem; materialized.len()];
        let target = CallTarget {
            kind: CallTargetKind::ArrayConstructor(ty),
            params: value_params(&params),
            return_type: ty,
            stage: EvaluationStage::Constant,
        };
        Ok(self.finish_call(id, target, materialized, constant))
    }

    /// `array(a, b, c)`: the element type is the common type of the
    /// arguments.
    fn inferred_array_ctor(
        &mut self,
        id: ExprId,
        te: TypeExprId,
        count: Option<ExprId>,
        attrs: &[AttrId],
        args: Vec<SemExprId>,
        span: Span,
    ) -> ResolveResult<SemExprId> {
        let arg_types: Vec<Idx> = args.iter().map(|&arg| self.loaded(arg)).collect();
        let Some(elem) = self.pool().common(&arg_types).filter(|_| !args.is_empty()) else {
            let halt = self.error(
                ErrorCode::E2008,
                "cannot infer common array element type from constructor arguments",
                span,
            );
            for (i, &arg) in args.iter().enumerate() {
                let note = format!(
                    "argument {i} is of type '{}'",
                    self.type_name(arg_types[i])
                );
                self.note(note, self.expr_span(arg));
            }
            return Err(halt);
        };

        let count = match count {
            Some(expr) => self.array_count(expr)?,
            None => u32::try_from(args.len()).unwrap_or(u32::MAX),
        };
        let ty = if self.pool().is_abstract(elem) {
            // Abstract arrays are not storable; they only exist until
            // materialized.
            for &attr in attrs {
                self.mark(self.module.attr(attr).id)?;
            }
            self.graph.types.array_of(elem, ArrayCount::Constant(count))
        } else {
            self.array_with_count(elem, ArrayCount::Constant(count), attrs, span)?
        };
        self.graph.set_type_for(te, ty);
        self.array_ctor(id, ty, elem, ArrayCount::Constant(count), args, span)
    }

    fn struct_ctor(
        &mut self,
        id: ExprId,
        ty: Idx,
        args: Vec<SemExprId>,
        span: Span,
    ) -> ResolveResult<SemExprId> {
        let Some(strukt) = self.pool().struct_id(ty) else {
            return Err(InternalError::MissingSemantic {
                what: "struct type",
                span,
            }
            .into());
        };
        if !self.pool().is_constructible(ty) {
            return Err(self.error(
                ErrorCode::E2009,
                format!("struct '{}' is not constructible", self.type_name(ty)),
                span,
            ));
        }
        let members: Vec<Idx> = self
            .pool()
            .struct_type(strukt)
            .members
            .iter()
            .map(|m| m.ty)
            .collect();
        if !args.is_empty() && args.len() != members.len() {
            let amount = if args.len() < members.len() {
                "few"
            } else {
                "many"
            };
            return Err(self.error(
                ErrorCode::E2009,
                format!(
                    "struct constructor has too {amount} inputs: expected {}, found {}",
                    members.len(),
                    args.len()
                ),
                span,
            ));
        }

        let mut materialized = Vec::with_capacity(args.len());
        for (arg, &member) in args.into_iter().zip(&members) {
            let arg = self.materialize(arg, Some(member))?;
            let arg_ty = self.loaded(arg);
            if arg_ty != member {
                return Err(self.error(
                    ErrorCode::E2001,
                    format!(
                        "type in struct constructor does not match struct member type: \
                         expected '{}', found '{}'",
                        self.type_name(member),
                        self.type_name(arg_ty)
                    ),
                    self.expr_span(arg),
                ));
            }
            materialized.push(arg);
        }

        let (how, params) = if materialized.is_empty() {
            (CtorEval::Zero, Vec::new())
        } else {
            (CtorEval::Compose, members)
        };
        let constant = self.construct_constant(how, ty, &materialized, span)?;
        let target = CallTarget {
            kind: CallTargetKind::StructConstructor(ty),
            params: value_params(&params),
            return_type: ty,
            stage: EvaluationStage::Constant,
        };
        Ok(self.finish_call(id, target, materialized, constant))
    }

    // ========================================================================
    // Function Calls
    // ========================================================================

    fn function_call(
        &mut self,
        id: ExprId,
        decl: FunctionId,
        args: Vec<SemExprId>,
        span: Span,
    ) -> ResolveResult<SemExprId> {
        let callee = self
            .graph
            .function_for(decl)
            .ok_or_else(|| self.prior_failure())?;
        let f = self.graph.function(callee);
        let name = self.name(f.name);
        let is_entry_point = f.is_entry_point();
        let params: Vec<Idx> = f.params.iter().map(|&p| self.graph.variable(p).ty).collect();
        let return_type = f.return_type;
        let callee_behaviors = f.behaviors;
        if is_entry_point {
            return Err(self.error(
                ErrorCode::E2009,
                "entry point functions cannot be the target of a function call",
                span,
            ));
        }

        if args.len() != params.len() {
            let amount = if args.len() < params.len() {
                "few"
            } else {
                "many"
            };
            return Err(self.error(
                ErrorCode::E2009,
                format!(
                    "too {amount} arguments in call to '{name}', expected {}, got {}",
                    params.len(),
                    args.len()
                ),
                span,
            ));
        }
        let args = self.materialize_args(&args, &params)?;
        for (i, (&arg, &param)) in args.iter().zip(&params).enumerate() {
            let arg_ty = self.loaded(arg);
            if arg_ty != param {
                return Err(self.error(
                    ErrorCode::E2001,
                    format!(
                        "type mismatch for argument {} in call to '{name}', expected '{}', got '{}'",
                        i + 1,
                        self.type_name(param),
                        self.type_name(arg_ty)
                    ),
                    self.expr_span(arg),
                ));
            }
        }

        let target = CallTarget {
            kind: CallTargetKind::Function(callee),
            params: value_params(&params),
            return_type,
            stage: EvaluationStage::Runtime,
        };
        let arg_sources: Vec<_> = args
            .iter()
            .map(|&arg| self.graph.expr(arg).source_variable)
            .collect();
        let sem = self.finish_call(id, target, args, None);
        {
            let e = self.graph.expr_mut(sem);
            e.has_side_effects = true;
            // Arguments run first; the call only falls through if the callee can.
            e.behaviors = e.behaviors.then(callee_behaviors);
        }

        self.graph.function_mut(callee).call_sites.push(sem);
        let Some(caller) = self.current_function else {
            return Ok(sem);
        };
        let callee_fn = self.graph.function(callee);
        let transitively_called: Vec<_> = callee_fn.transitively_called.iter().copied().collect();
        let globals: Vec<_> = callee_fn
            .transitively_referenced_globals
            .iter()
            .copied()
            .collect();
        // Parameters of the callee stand for the variables passed to them.
        let pairs: Vec<_> = callee_fn
            .texture_sampler_pairs
            .iter()
            .map(|&(texture, sampler)| {
                let map = |var| match self.graph.variable(var).kind {
                    SemVarKind::Parameter { index } => {
                        arg_sources.get(index as usize).copied().flatten()
                    }
                    SemVarKind::Global | SemVarKind::Local => Some(var),
                };
                (map(texture), sampler.and_then(map))
            })
            .collect();

        let caller = self.graph.function_mut(caller);
        caller.directly_called.add(callee);
        caller.transitively_called.add(callee);
        for f in transitively_called {
            caller.transitively_called.add(f);
        }
        for g in globals {
            caller.transitively_referenced_globals.add(g);
        }
        for (texture, sampler) in pairs {
            if let Some(texture) = texture {
                caller.texture_sampler_pairs.add((texture, sampler));
            }
        }
        caller.direct_calls.push(sem);
        Ok(sem)
    }

    // ========================================================================
    // Builtin Calls
    // ========================================================================

    fn builtin_call(
        &mut self,
        id: ExprId,
        builtin: BuiltinFn,
        args: Vec<SemExprId>,
        span: Span,
    ) -> ResolveResult<SemExprId> {
        if builtin.is_deprecated() {
            self.sink.add_warning(
                ErrorCode::E2020,
                format!("use of deprecated builtin '{}'", builtin.name()),
                span,
            );
        }
        let arg_types: Vec<Idx> = args.iter().map(|&arg| self.loaded(arg)).collect();
        let overload = self
            .intrinsics
            .builtin(&mut self.graph.types, builtin, &arg_types)
            .map_err(|no_match| self.no_match(no_match, span))?;
        let param_types: Vec<Idx> = overload.params.iter().map(|p| p.ty).collect();
        let args = self.materialize_args(&args, &param_types)?;

        let constant = match self.constants_of(&args) {
            Some(constants) if overload.is_const => ConstEval::new(self.pool(), self.interner)
                .builtin(builtin, overload.return_type, &constants)
                .map_err(|err| self.error(ErrorCode::E2018, err.to_string(), span))?,
            _ => None,
        };
        let target = CallTarget {
            kind: CallTargetKind::Builtin(builtin),
            params: overload.params.clone(),
            return_type: overload.return_type,
            stage: if overload.is_const {
                EvaluationStage::Constant
            } else {
                EvaluationStage::Runtime
            },
        };
        let source_of = |usage| {
            target
                .param_usage(usage)
                .and_then(|i| args.get(i))
                .and_then(|&arg| self.graph.expr(arg).source_variable)
        };
        let texture = source_of(ParamUsage::Texture);
        let sampler = source_of(ParamUsage::Sampler);

        let sem = self.finish_call(id, target, args, constant);
        if builtin.has_side_effects() {
            self.graph.expr_mut(sem).has_side_effects = true;
        }
        if let Some(func) = self.current_function {
            let func = self.graph.function_mut(func);
            func.called_builtins.add(builtin);
            func.direct_calls.push(sem);
            if let Some(texture) = texture {
                func.texture_sampler_pairs.add((texture, sampler));
            }
        }
        Ok(sem)
    }
}

fn value_params(types: &[Idx]) -> SmallVec<[CallParam; 4]> {
    types
        .iter()
        .map(|&ty| CallParam {
            ty,
            usage: ParamUsage::None,
        })
        .collect()
}
