//! Functions, variables and pipeline-override ids.

use lumen_diagnostic::ErrorCode;
use lumen_ir::{
    Access, AttrId, AttributeKind, DisabledValidation, ExprId, Extension, FunctionId, GlobalDecl,
    Name, ParamId, PipelineStage, Span, StorageClass, VariableId, VariableKind,
};
use lumen_sem::{
    BindingPoint, Behaviors, Constant, DeclKind, EvaluationStage, Idx, PipelineStageUsage,
    SemExprId, SemExprKind, SemFnId, SemFunction, SemStmtKind, SemVarId, SemVarKind, SemVariable,
    UniqueVec, VariableDecl, WorkgroupDim,
};
use rustc_hash::FxHashMap;

use super::Resolver;
use crate::error::{InternalError, ResolveResult};
use crate::validator::VarSyntax;

/// Override ids are 16 bits wide.
const MAX_OVERRIDE_ID: u16 = u16::MAX;

impl Resolver<'_> {
    // ========================================================================
    // Functions
    // ========================================================================

    #[tracing::instrument(level = "trace", skip(self))]
    pub(super) fn function(&mut self, id: FunctionId) -> ResolveResult {
        let decl = self.module.function(id);
        if self.current_function.is_some() {
            return Err(InternalError::NestedFunction { span: decl.span }.into());
        }
        let result = self.function_inner(id);
        self.current_function = None;
        self.current_stmt = None;
        self.current_compound = None;
        self.current_block = None;
        self.case_tail = None;
        result
    }

    fn function_inner(&mut self, id: FunctionId) -> ResolveResult {
        let module = self.module;
        let decl = module.function(id);
        self.mark(decl.id)?;
        let stage = decl.stage;
        let is_entry_point = decl.is_entry_point();

        self.validator().attributes(&decl.attrs, "functions", |kind| {
            matches!(
                kind,
                AttributeKind::Stage(_) | AttributeKind::WorkgroupSize { .. }
            )
        })?;
        for &attr in &decl.attrs {
            self.mark(module.attr(attr).id)?;
        }

        let mut names: FxHashMap<Name, Span> = FxHashMap::default();
        let mut params = Vec::with_capacity(decl.params.len());
        for (index, &param) in decl.params.iter().enumerate() {
            let p = module.param(param);
            if let Some(&previous) = names.get(&p.name) {
                let name = self.name(p.name);
                self.validator()
                    .duplicate_name("parameter", name, p.span, previous)?;
            }
            names.insert(p.name, p.span);
            params.push(self.parameter(param, index, stage)?);
        }

        let return_type = match decl.return_type {
            Some(ty) => self.resolve_type(ty)?,
            None => Idx::VOID,
        };
        let return_span = decl
            .return_type
            .map_or(decl.span, |ty| module.type_expr(ty).span);
        self.validator().return_type(return_type, return_span)?;
        let return_context = if is_entry_point {
            "entry point return types"
        } else {
            "non-entry point function return types"
        };
        self.validator()
            .attributes(&decl.return_attrs, return_context, |kind| {
                is_entry_point
                    && matches!(
                        kind,
                        AttributeKind::Builtin(_)
                            | AttributeKind::Location(_)
                            | AttributeKind::Invariant
                    )
            })?;
        for &attr in &decl.return_attrs {
            self.mark(module.attr(attr).id)?;
        }
        if let Some(struct_id) = self.pool().struct_id(return_type) {
            if let Err(halt) =
                self.apply_storage_class_usage(StorageClass::None, return_type, return_span)
            {
                let note = format!("while instantiating return type for {}", self.name(decl.name));
                self.note(note, decl.span);
                return Err(halt);
            }
            if let Some(stage) = stage {
                self.graph
                    .types
                    .struct_type_mut(struct_id)
                    .add_pipeline_stage_use(PipelineStageUsage::output(stage));
            }
        }

        let func = self.graph.add_function(SemFunction {
            decl: id,
            name: decl.name,
            params,
            return_type,
            stage,
            workgroup_size: [WorkgroupDim::default(); 3],
            behaviors: Behaviors::NEXT,
            directly_called: UniqueVec::new(),
            transitively_called: UniqueVec::new(),
            directly_referenced_globals: UniqueVec::new(),
            transitively_referenced_globals: UniqueVec::new(),
            called_builtins: UniqueVec::new(),
            texture_sampler_pairs: UniqueVec::new(),
            ancestor_entry_points: UniqueVec::new(),
            discard: None,
            direct_calls: Vec::new(),
            call_sites: Vec::new(),
            span: decl.span,
        });
        self.current_function = Some(func);
        tracing::trace!(name = self.name(decl.name), ?stage, "resolving function");

        self.workgroup_size(func, &decl.attrs, stage)?;
        if is_entry_point {
            self.entry_points.push(func);
        }

        let body = self.block(decl.body, SemStmtKind::FunctionBlock)?;
        let body_behaviors = self.graph.stmt(body).behaviors;
        self.validator()
            .function_end(return_type, body_behaviors, decl.span)?;
        // A function's behavior is its body's, with Return meaning Next to the
        // caller.
        let behaviors = if body_behaviors.contains(Behaviors::RETURN) {
            body_behaviors.replace(Behaviors::RETURN, Behaviors::NEXT)
        } else {
            body_behaviors
        };
        self.graph.function_mut(func).behaviors = behaviors;

        if is_entry_point {
            self.validator().entry_point(func)?;
            let called: Vec<SemFnId> = self
                .graph
                .function(func)
                .transitively_called
                .iter()
                .copied()
                .collect();
            for callee in called {
                self.graph
                    .function_mut(callee)
                    .ancestor_entry_points
                    .add(func);
            }
        }
        Ok(())
    }

    fn parameter(
        &mut self,
        id: ParamId,
        index: usize,
        stage: Option<PipelineStage>,
    ) -> ResolveResult<SemVarId> {
        let module = self.module;
        let param = module.param(id);
        self.mark(param.id)?;

        let ty = self.resolve_type(param.ty)?;
        self.validator().param_type(ty, param.span)?;
        let context = if stage.is_some() {
            "entry point parameters"
        } else {
            "non-entry point function parameters"
        };
        self.validator().attributes(&param.attrs, context, |kind| {
            stage.is_some()
                && matches!(
                    kind,
                    AttributeKind::Builtin(_)
                        | AttributeKind::Location(_)
                        | AttributeKind::Invariant
                )
        })?;
        for &attr in &param.attrs {
            self.mark(module.attr(attr).id)?;
        }

        if let Err(halt) = self.apply_storage_class_usage(StorageClass::None, ty, param.span) {
            let note = format!("while instantiating parameter {}", self.name(param.name));
            self.note(note, param.span);
            return Err(halt);
        }
        if let (Some(struct_id), Some(stage)) = (self.pool().struct_id(ty), stage) {
            self.graph
                .types
                .struct_type_mut(struct_id)
                .add_pipeline_stage_use(PipelineStageUsage::input(stage));
        }

        #[expect(
            clippy::cast_possible_truncation,
            reason = "parameter count is bounded by the node id space"
        )]
        let index = index as u32;
        Ok(self.graph.add_variable(SemVariable {
            decl: VariableDecl::Param(id),
            name: param.name,
            kind: SemVarKind::Parameter { index },
            decl_kind: DeclKind::Param,
            ty,
            storage_class: StorageClass::None,
            access: Access::Undefined,
            stage: EvaluationStage::Runtime,
            constant: None,
            initializer: None,
            override_id: None,
            binding_point: None,
            shadows: None,
            users: Vec::new(),
            span: param.span,
        }))
    }

    // ========================================================================
    // Workgroup Size
    // ========================================================================

    /// Resolve `@workgroup_size`. Each dimension is a constant, or names an
    /// override whose value is known only when the pipeline is created.
    fn workgroup_size(
        &mut self,
        func: SemFnId,
        attrs: &[AttrId],
        stage: Option<PipelineStage>,
    ) -> ResolveResult {
        let module = self.module;
        let Some(attr) = attrs
            .iter()
            .map(|&a| module.attr(a))
            .find(|a| matches!(a.kind, AttributeKind::WorkgroupSize { .. }))
        else {
            return Ok(());
        };
        let AttributeKind::WorkgroupSize { x, y, z } = attr.kind else {
            return Ok(());
        };
        self.validator()
            .workgroup_size_placement(stage, attr.span)?;

        let values: Vec<ExprId> = [Some(x), y, z].into_iter().flatten().collect();
        let mut args = Vec::with_capacity(values.len());
        let mut types = Vec::with_capacity(values.len());
        for &value in &values {
            let expr = self.expression(value)?;
            let ty = self.loaded(expr);
            self.validator()
                .workgroup_size_arg(ty, module.expr(value).span)?;
            args.push(expr);
            types.push(ty);
        }

        let common = match self.pool().common(&types) {
            Some(Idx::ABSTRACT_INT) => Idx::I32,
            Some(ty) => ty,
            None => {
                self.validator().workgroup_size_types(attr.span)?;
                return Ok(());
            }
        };

        let mut dims = [WorkgroupDim::default(); 3];
        for (i, (&arg, &value)) in args.iter().zip(&values).enumerate() {
            let span = module.expr(value).span;
            let arg = self.materialize(arg, Some(common))?;
            let e = self.graph.expr(arg);
            let dim = match e.stage {
                EvaluationStage::Constant => {
                    let v = e.constant.as_ref().and_then(Constant::as_i64);
                    self.validator().workgroup_size_value(v, span)?;
                    WorkgroupDim {
                        value: v.and_then(|v| u32::try_from(v).ok()),
                        override_var: None,
                    }
                }
                EvaluationStage::Override => self.override_dimension(arg, span)?,
                EvaluationStage::Runtime => {
                    return Err(self.error(
                        ErrorCode::E2005,
                        "workgroup_size argument must be a constant or override-expression",
                        span,
                    ));
                }
            };
            dims[i] = dim;
        }
        self.graph.function_mut(func).workgroup_size = dims;
        Ok(())
    }

    /// A dimension naming an override takes the override's default value, if
    /// it has one.
    fn override_dimension(
        &mut self,
        arg: SemExprId,
        span: Span,
    ) -> ResolveResult<WorkgroupDim> {
        let inner = self.graph.unwrap_materialize(arg);
        let SemExprKind::VariableUser(var) = self.graph.expr(inner).kind else {
            return Ok(WorkgroupDim {
                value: None,
                override_var: None,
            });
        };
        let value = self
            .graph
            .variable(var)
            .initializer
            .and_then(|init| self.graph.expr(init).constant.as_ref())
            .and_then(Constant::as_i64);
        self.validator().workgroup_size_value(value, span)?;
        Ok(WorkgroupDim {
            value: value.and_then(|v| u32::try_from(v).ok()),
            override_var: Some(var),
        })
    }

    // ========================================================================
    // Variables
    // ========================================================================

    #[tracing::instrument(level = "trace", skip(self))]
    pub(super) fn global_variable(&mut self, id: VariableId) -> ResolveResult<SemVarId> {
        self.variable(id, true)
    }

    /// Resolve a `var`, `let`, `const` or `override` declaration.
    pub(super) fn variable(&mut self, id: VariableId, is_global: bool) -> ResolveResult<SemVarId> {
        let module = self.module;
        let decl = module.variable(id);
        self.mark(decl.id)?;
        let keyword = decl.kind.keyword();
        let span = decl.span;

        match decl.kind {
            VariableKind::Let if is_global => {
                return Err(self.error(
                    ErrorCode::E2004,
                    "module-scope 'let' is invalid, use 'const'",
                    span,
                ));
            }
            VariableKind::Override if !is_global => {
                return Err(self.error(
                    ErrorCode::E2004,
                    "override declarations are only valid at module scope",
                    span,
                ));
            }
            VariableKind::Const | VariableKind::Let if decl.init.is_none() => {
                return Err(self.error(
                    ErrorCode::E2004,
                    format!("'{keyword}' declaration must have an initializer"),
                    span,
                ));
            }
            VariableKind::Override | VariableKind::Var { .. }
                if decl.ty.is_none() && decl.init.is_none() =>
            {
                let what = if decl.kind == VariableKind::Override {
                    "override declaration"
                } else {
                    "var declaration"
                };
                return Err(self.error(
                    ErrorCode::E2004,
                    format!("{what} requires a type or initializer"),
                    span,
                ));
            }
            _ => {}
        }

        self.validator().attributes(&decl.attrs, "this declaration", |kind| {
            match decl.kind {
                VariableKind::Var { .. } if is_global => matches!(
                    kind,
                    AttributeKind::Binding(_) | AttributeKind::Group(_) | AttributeKind::Internal(_)
                ),
                VariableKind::Var { .. } => matches!(kind, AttributeKind::Internal(_)),
                VariableKind::Override => matches!(kind, AttributeKind::Id(_)),
                VariableKind::Let | VariableKind::Const => false,
            }
        })?;
        let mut group = None;
        let mut binding = None;
        let mut explicit_id = None;
        let mut ignore_storage_class = false;
        for &attr_id in &decl.attrs {
            let attr = module.attr(attr_id);
            self.mark(attr.id)?;
            match attr.kind {
                AttributeKind::Group(g) => group = Some(g),
                AttributeKind::Binding(b) => binding = Some(b),
                AttributeKind::Id(value) => explicit_id = Some((value, attr.span)),
                AttributeKind::Internal(DisabledValidation::IgnoreStorageClass) => {
                    ignore_storage_class = true;
                }
                _ => {}
            }
        }

        let declared = match decl.ty {
            Some(ty) => Some(self.resolve_type(ty)?),
            None => None,
        };

        let mut initializer = None;
        let mut init_ty = None;
        if let Some(init) = decl.init {
            let expr = self.expression(init)?;
            // A `const` without a declared type keeps its abstract type.
            let expr = match (decl.kind, declared) {
                (VariableKind::Const, None) => expr,
                (_, target) => self.materialize(expr, target)?,
            };
            let e = self.graph.expr(expr);
            let stage = e.stage;
            let init_span = module.expr(init).span;
            if decl.kind == VariableKind::Const && stage != EvaluationStage::Constant {
                return Err(self.error(
                    ErrorCode::E2006,
                    "'const' initializer must be constant expression",
                    init_span,
                ));
            }
            if is_global && stage == EvaluationStage::Runtime {
                self.validator()
                    .global_initializer_stage(keyword, init_span)?;
            }
            let ty = self.loaded(expr);
            if let Some(declared) = declared {
                self.validator()
                    .initializer(keyword, declared, ty, init_span)?;
            }
            initializer = Some(expr);
            init_ty = Some(ty);
        }
        let Some(ty) = declared.or(init_ty) else {
            return Err(self.prior_failure());
        };

        let (decl_kind, storage_class, access, access_spelled) = match decl.kind {
            VariableKind::Var {
                storage_class,
                access,
            } => {
                let storage_class = match storage_class {
                    Some(sc) => sc,
                    None if !is_global => StorageClass::Function,
                    None if self.pool().is_handle(ty) => StorageClass::Handle,
                    None => {
                        return Err(self.error(
                            ErrorCode::E2012,
                            "module-scope 'var' declaration must have a storage class",
                            span,
                        ));
                    }
                };
                if storage_class == StorageClass::PushConstant {
                    self.validator().require_extension(
                        Extension::ChromiumExperimentalPushConstant,
                        "'push_constant' storage class",
                        span,
                    )?;
                }
                let spelled = access.is_some();
                let access = access.unwrap_or(storage_class.default_access());
                (DeclKind::Var, storage_class, access, spelled)
            }
            VariableKind::Let => (DeclKind::Let, StorageClass::None, Access::Undefined, false),
            VariableKind::Const => (DeclKind::Const, StorageClass::None, Access::Undefined, false),
            VariableKind::Override => {
                (DeclKind::Override, StorageClass::None, Access::Undefined, false)
            }
        };

        let is_resource = matches!(
            storage_class,
            StorageClass::Uniform | StorageClass::Storage | StorageClass::Handle
        );
        let binding_point = match (group, binding) {
            (Some(group), Some(binding)) => Some(BindingPoint { group, binding }),
            (None, None) => None,
            // Half a binding point is reported as missing on resources and
            // as present everywhere else.
            (group, binding) if !is_resource => Some(BindingPoint {
                group: group.unwrap_or(0),
                binding: binding.unwrap_or(0),
            }),
            _ => None,
        };

        let (stage, constant) = match decl_kind {
            DeclKind::Const => {
                let constant = initializer.and_then(|init| self.graph.expr(init).constant.clone());
                (EvaluationStage::Constant, constant)
            }
            DeclKind::Override => (EvaluationStage::Override, None),
            DeclKind::Var | DeclKind::Let | DeclKind::Param => (EvaluationStage::Runtime, None),
        };

        let override_id = match explicit_id {
            Some((value, attr_span)) => {
                self.validator().override_id(value, attr_span)?;
                let value = u16::try_from(value).unwrap_or(MAX_OVERRIDE_ID);
                if let Some(&previous) = self.override_ids.get(&value) {
                    let previous = self.graph.variable(previous).span;
                    self.validator()
                        .duplicate_override_id(value, attr_span, previous)?;
                }
                Some(value)
            }
            None => None,
        };

        let var = SemVariable {
            decl: VariableDecl::Variable(id),
            name: decl.name,
            kind: if is_global {
                SemVarKind::Global
            } else {
                SemVarKind::Local
            },
            decl_kind,
            ty,
            storage_class,
            access,
            stage,
            constant,
            initializer,
            override_id,
            binding_point,
            shadows: None,
            users: Vec::new(),
            span,
        };

        if decl_kind == DeclKind::Var {
            self.validator().var(
                &var,
                VarSyntax {
                    is_global,
                    has_initializer: initializer.is_some(),
                    access_spelled,
                    ignore_storage_class,
                },
            )?;
            self.apply_storage_class_usage(storage_class, ty, span)?;
        } else {
            self.validator().value_decl(&var)?;
        }

        let var = self.graph.add_variable(var);
        if let Some(value) = override_id {
            self.override_ids.insert(value, var);
        }
        tracing::trace!(
            name = self.name(decl.name),
            keyword,
            ty = %self.type_name(ty),
            "variable resolved"
        );
        Ok(var)
    }

    // ========================================================================
    // Override Ids
    // ========================================================================

    /// Give every `override` without an `@id` the next id not already taken,
    /// in declaration order.
    pub(super) fn allocate_override_ids(&mut self) -> ResolveResult {
        let module = self.module;
        let mut next: u32 = 0;
        for &decl in module.globals() {
            let GlobalDecl::Variable(id) = decl else {
                continue;
            };
            let Some(var) = self.graph.variable_for(id) else {
                continue;
            };
            let v = self.graph.variable(var);
            if v.decl_kind != DeclKind::Override || v.override_id.is_some() {
                continue;
            }
            let span = v.span;
            while u16::try_from(next).is_ok_and(|n| self.override_ids.contains_key(&n)) {
                next += 1;
            }
            let Ok(value) = u16::try_from(next) else {
                return Err(self.error(
                    ErrorCode::E2016,
                    format!("number of 'override' variables exceeded limit of {MAX_OVERRIDE_ID}"),
                    span,
                ));
            };
            self.override_ids.insert(value, var);
            self.graph.variable_mut(var).override_id = Some(value);
            next += 1;
        }
        Ok(())
    }
}
