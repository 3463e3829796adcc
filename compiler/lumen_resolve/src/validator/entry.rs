//! Entry point interface rules and whole-program pipeline stage checks.

use lumen_diagnostic::ErrorCode;
use lumen_ir::{AttrId, AttributeKind, BuiltinValue, PipelineStage, Span, StorageClass};
use lumen_sem::{BindingPoint, BuiltinFn, CallTargetKind, Idx, SemExprKind, SemFnId, SemVarId, TypeKind};
use rustc_hash::FxHashMap;

use super::{Valid, Validator};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Direction {
    Input,
    Output,
}

impl Direction {
    fn as_str(self) -> &'static str {
        match self {
            Direction::Input => "input",
            Direction::Output => "output",
        }
    }
}

/// Builtins and locations seen so far on one side of an entry point.
struct Interface {
    stage: PipelineStage,
    direction: Direction,
    builtins: FxHashMap<BuiltinValue, Span>,
    locations: FxHashMap<u32, Span>,
}

impl Interface {
    fn new(stage: PipelineStage, direction: Direction) -> Self {
        Interface {
            stage,
            direction,
            builtins: FxHashMap::default(),
            locations: FxHashMap::default(),
        }
    }
}

/// Required store type of a builtin value.
#[derive(Copy, Clone)]
enum BuiltinType {
    Bool,
    U32,
    F32,
    Vec3U32,
    Vec4F32,
}

impl BuiltinType {
    fn of(value: BuiltinValue) -> Self {
        match value {
            BuiltinValue::Position => BuiltinType::Vec4F32,
            BuiltinValue::FrontFacing => BuiltinType::Bool,
            BuiltinValue::FragDepth => BuiltinType::F32,
            BuiltinValue::LocalInvocationId
            | BuiltinValue::GlobalInvocationId
            | BuiltinValue::WorkgroupId
            | BuiltinValue::NumWorkgroups => BuiltinType::Vec3U32,
            BuiltinValue::VertexIndex
            | BuiltinValue::InstanceIndex
            | BuiltinValue::LocalInvocationIndex
            | BuiltinValue::SampleIndex
            | BuiltinValue::SampleMask => BuiltinType::U32,
        }
    }

    fn name(self) -> &'static str {
        match self {
            BuiltinType::Bool => "bool",
            BuiltinType::U32 => "u32",
            BuiltinType::F32 => "f32",
            BuiltinType::Vec3U32 => "vec3<u32>",
            BuiltinType::Vec4F32 => "vec4<f32>",
        }
    }

    fn matches(self, kind: TypeKind) -> bool {
        match self {
            BuiltinType::Bool => kind == TypeKind::Bool,
            BuiltinType::U32 => kind == TypeKind::U32,
            BuiltinType::F32 => kind == TypeKind::F32,
            BuiltinType::Vec3U32 => kind == TypeKind::Vector { elem: Idx::U32, width: 3 },
            BuiltinType::Vec4F32 => kind == TypeKind::Vector { elem: Idx::F32, width: 4 },
        }
    }
}

/// Stages and directions a builtin value may appear in.
fn builtin_allowed(value: BuiltinValue, stage: PipelineStage, direction: Direction) -> bool {
    use Direction::{Input, Output};
    use PipelineStage::{Compute, Fragment, Vertex};
    match value {
        BuiltinValue::Position => matches!(
            (stage, direction),
            (Vertex, Output) | (Fragment, Input)
        ),
        BuiltinValue::VertexIndex | BuiltinValue::InstanceIndex => {
            (stage, direction) == (Vertex, Input)
        }
        BuiltinValue::FrontFacing | BuiltinValue::SampleIndex => {
            (stage, direction) == (Fragment, Input)
        }
        BuiltinValue::FragDepth => (stage, direction) == (Fragment, Output),
        BuiltinValue::SampleMask => stage == Fragment,
        BuiltinValue::LocalInvocationId
        | BuiltinValue::LocalInvocationIndex
        | BuiltinValue::GlobalInvocationId
        | BuiltinValue::WorkgroupId
        | BuiltinValue::NumWorkgroups => (stage, direction) == (Compute, Input),
    }
}

/// Builtin functions restricted to a single stage.
fn builtin_fn_allowed(builtin: BuiltinFn, stage: PipelineStage) -> bool {
    match builtin {
        BuiltinFn::WorkgroupBarrier | BuiltinFn::StorageBarrier => stage == PipelineStage::Compute,
        BuiltinFn::TextureSample | BuiltinFn::Dpdx => stage == PipelineStage::Fragment,
        _ => true,
    }
}

impl Validator<'_> {
    // ========================================================================
    // Function Attributes
    // ========================================================================

    pub(crate) fn workgroup_size_placement(&mut self, stage: Option<PipelineStage>, span: Span) -> Valid {
        if stage == Some(PipelineStage::Compute) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2005,
            "the workgroup_size attribute is only valid for compute stages",
            span,
        ))
    }

    pub(crate) fn workgroup_size_value(&mut self, value: Option<i64>, span: Span) -> Valid {
        match value {
            Some(v) if v < 1 => Err(self.error(
                ErrorCode::E2005,
                "workgroup_size argument must be at least 1",
                span,
            )),
            _ => Ok(()),
        }
    }

    pub(crate) fn workgroup_size_arg(&mut self, ty: Idx, span: Span) -> Valid {
        if matches!(ty, Idx::I32 | Idx::U32 | Idx::ABSTRACT_INT) {
            return Ok(());
        }
        Err(self.error(
            ErrorCode::E2005,
            "workgroup_size argument must be either a literal, constant, or overridable of type \
             abstract-integer, i32 or u32",
            span,
        ))
    }

    pub(crate) fn workgroup_size_types(&mut self, span: Span) -> Valid {
        Err(self.error(
            ErrorCode::E2005,
            "workgroup_size arguments must be of the same type, either i32 or u32",
            span,
        ))
    }

    // ========================================================================
    // Entry Point Interface
    // ========================================================================

    /// Check the interface of one entry point.
    pub(crate) fn entry_point(&mut self, id: SemFnId) -> Valid {
        let graph = self.graph;
        let module = self.module;
        let sem = graph.function(id);
        let Some(stage) = sem.stage else {
            return Ok(());
        };
        let decl = module.function(sem.decl);

        let mut inputs = Interface::new(stage, Direction::Input);
        for (&param, &var) in decl.params.iter().zip(&sem.params) {
            let param = module.param(param);
            let ty = graph.variable(var).ty;
            self.io_item(&mut inputs, ty, &param.attrs, param.span, false)?;
        }

        let mut outputs = Interface::new(stage, Direction::Output);
        if sem.return_type != Idx::VOID {
            let span = decl
                .return_type
                .map_or(decl.span, |ty| module.type_expr(ty).span);
            self.io_item(&mut outputs, sem.return_type, &decl.return_attrs, span, false)?;
        }

        match stage {
            PipelineStage::Vertex if !outputs.builtins.contains_key(&BuiltinValue::Position) => {
                Err(self.error(
                    ErrorCode::E2017,
                    "a vertex shader must include the 'position' builtin in its return type",
                    decl.span,
                ))
            }
            PipelineStage::Compute
                if !decl
                    .attrs
                    .iter()
                    .any(|&a| matches!(module.attr(a).kind, AttributeKind::WorkgroupSize { .. })) =>
            {
                Err(self.error(
                    ErrorCode::E2017,
                    "a compute shader must include 'workgroup_size' in its attributes",
                    decl.span,
                ))
            }
            _ => Ok(()),
        }
    }

    fn io_item(
        &mut self,
        interface: &mut Interface,
        ty: Idx,
        attrs: &[AttrId],
        span: Span,
        in_struct: bool,
    ) -> Valid {
        let graph = self.graph;
        let module = self.module;

        if let Some(id) = graph.types.struct_id(ty) {
            if in_struct {
                return Err(self.error(
                    ErrorCode::E2017,
                    "entry point IO types cannot contain nested structures",
                    span,
                ));
            }
            if let Some(&attr) = attrs.iter().find(|&&a| {
                matches!(
                    module.attr(a).kind,
                    AttributeKind::Builtin(_) | AttributeKind::Location(_)
                )
            }) {
                return Err(self.error(
                    ErrorCode::E2017,
                    "entry point IO attributes must not be used on structure types",
                    module.attr(attr).span,
                ));
            }
            for member in &graph.types.struct_type(id).members {
                let member_attrs = &module.member(member.decl).attrs;
                self.io_item(interface, member.ty, member_attrs, member.span, true)?;
            }
            return Ok(());
        }

        let mut io: Option<(&AttributeKind, Span)> = None;
        let mut invariant: Option<Span> = None;
        for &a in attrs {
            let attr = module.attr(a);
            match attr.kind {
                AttributeKind::Builtin(_) | AttributeKind::Location(_) => {
                    if io.is_some() {
                        return Err(self.error(
                            ErrorCode::E2017,
                            "multiple entry point IO attributes",
                            attr.span,
                        ));
                    }
                    io = Some((&attr.kind, attr.span));
                }
                AttributeKind::Invariant => invariant = Some(attr.span),
                _ => {}
            }
        }

        let builtin = match io {
            None => {
                return Err(self.error(
                    ErrorCode::E2017,
                    "missing entry point IO attribute",
                    span,
                ));
            }
            Some((&AttributeKind::Builtin(value), attr_span)) => {
                self.builtin_io(interface, value, ty, attr_span)?;
                Some(value)
            }
            Some((&AttributeKind::Location(location), attr_span)) => {
                self.location_io(interface, location, ty, attr_span)?;
                None
            }
            Some(_) => None,
        };

        if let Some(invariant) = invariant {
            if builtin != Some(BuiltinValue::Position) {
                return Err(self.error(
                    ErrorCode::E2005,
                    "invariant attribute must only be applied to a position builtin",
                    invariant,
                ));
            }
        }
        Ok(())
    }

    fn builtin_io(
        &mut self,
        interface: &mut Interface,
        value: BuiltinValue,
        ty: Idx,
        span: Span,
    ) -> Valid {
        if !builtin_allowed(value, interface.stage, interface.direction) {
            return Err(self.error(
                ErrorCode::E2017,
                format!(
                    "builtin({value}) cannot be used in {} of {} pipeline stage",
                    interface.direction.as_str(),
                    interface.stage
                ),
                span,
            ));
        }
        let expected = BuiltinType::of(value);
        if !expected.matches(self.pool().kind(ty)) {
            return Err(self.error(
                ErrorCode::E2017,
                format!("store type of builtin({value}) must be '{}'", expected.name()),
                span,
            ));
        }
        if let Some(&first) = interface.builtins.get(&value) {
            let guarantee = self.error(
                ErrorCode::E2017,
                format!(
                    "builtin({value}) attribute appears multiple times as pipeline {}",
                    interface.direction.as_str()
                ),
                span,
            );
            self.note("first use is here", first);
            return Err(guarantee);
        }
        interface.builtins.insert(value, span);
        Ok(())
    }

    fn location_io(&mut self, interface: &mut Interface, location: u32, ty: Idx, span: Span) -> Valid {
        if interface.stage == PipelineStage::Compute {
            return Err(self.error(
                ErrorCode::E2017,
                format!(
                    "attribute is not valid for compute shader {}s",
                    interface.direction.as_str()
                ),
                span,
            ));
        }
        let pool = self.pool();
        let numeric = pool.is_scalar_or_vector_of(ty, |el| {
            matches!(el, Idx::I32 | Idx::U32 | Idx::F32 | Idx::F16)
        });
        if !numeric {
            let guarantee = self.error(
                ErrorCode::E2017,
                format!(
                    "cannot apply 'location' attribute to declaration of type '{}'",
                    self.type_name(ty)
                ),
                span,
            );
            self.sink.add_detail(
                "'location' attribute must only be applied to declarations of numeric scalar or \
                 numeric vector type",
            );
            return Err(guarantee);
        }
        if let Some(&first) = interface.locations.get(&location) {
            let guarantee = self.error(
                ErrorCode::E2017,
                format!("location({location}) attribute appears multiple times"),
                span,
            );
            self.note("first use is here", first);
            return Err(guarantee);
        }
        interface.locations.insert(location, span);
        Ok(())
    }

    // ========================================================================
    // Whole Program
    // ========================================================================

    /// Checks that need every function resolved: builtin stage
    /// restrictions, push constants and resource binding collisions.
    pub(crate) fn pipeline_stages(&mut self, entry_points: &[SemFnId]) -> Valid {
        let graph = self.graph;
        let module = self.module;
        let mut result = Ok(());

        for &ep in entry_points {
            let entry = graph.function(ep);
            let Some(stage) = entry.stage else {
                continue;
            };

            'functions: for &func in std::iter::once(&ep).chain(entry.transitively_called.iter()) {
                let sem = graph.function(func);
                for &call in &sem.direct_calls {
                    let SemExprKind::Call { target, .. } = graph.expr(call).kind else {
                        continue;
                    };
                    let CallTargetKind::Builtin(builtin) = graph.call_target(target).kind else {
                        continue;
                    };
                    if builtin_fn_allowed(builtin, stage) {
                        continue;
                    }
                    let span = module.expr(graph.expr(call).decl).span;
                    let guarantee = self.error(
                        ErrorCode::E2017,
                        format!("built-in cannot be used by {stage} pipeline stage"),
                        span,
                    );
                    if func != ep {
                        self.note(format!("called by function '{}'", self.name(sem.name)), sem.span);
                    }
                    self.note(
                        format!("called by entry point '{}'", self.name(entry.name)),
                        entry.span,
                    );
                    result = Err(guarantee);
                    break 'functions;
                }
            }

            let mut push_constant: Option<SemVarId> = None;
            let mut bindings: FxHashMap<BindingPoint, SemVarId> = FxHashMap::default();
            for &var in &entry.transitively_referenced_globals {
                let v = graph.variable(var);
                if v.storage_class == StorageClass::PushConstant {
                    if let Some(first) = push_constant {
                        let guarantee = self.error(
                            ErrorCode::E2017,
                            format!(
                                "entry point '{}' uses two push_constant variables.",
                                self.name(entry.name)
                            ),
                            entry.span,
                        );
                        self.note(
                            "first 'push_constant' variable declaration is here",
                            graph.variable(first).span,
                        );
                        self.note("second 'push_constant' variable declaration is here", v.span);
                        result = Err(guarantee);
                        break;
                    }
                    push_constant = Some(var);
                }
                let Some(bp) = v.binding_point else {
                    continue;
                };
                if let Some(&first) = bindings.get(&bp) {
                    let guarantee = self.error(
                        ErrorCode::E2017,
                        format!(
                            "entry point '{}' references multiple variables that use the same \
                             resource binding @group({}), @binding({})",
                            self.name(entry.name),
                            bp.group,
                            bp.binding
                        ),
                        v.span,
                    );
                    self.note(
                        "first resource binding usage declared here",
                        graph.variable(first).span,
                    );
                    result = Err(guarantee);
                    break;
                }
                bindings.insert(bp, var);
            }
        }
        result
    }
}
