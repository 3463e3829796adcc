//! Type expressions and aliases.

use lumen_diagnostic::ErrorCode;
use lumen_ir::{
    AliasId, AttrId, AttributeKind, ExprId, Extension, Name, NodeId, Span, StorageClass,
    TypeExprId, TypeExprKind,
};
use lumen_sem::{ArrayCount, BuiltinFn, Constant, EvaluationStage, Idx};
use lumen_stack::ensure_sufficient_stack;

use super::Resolver;
use crate::dependency::Decl;
use crate::error::{InternalError, ResolveResult};

/// Names of predeclared types; an alias may not reuse them.
const PREDECLARED_TYPES: &[&str] = &[
    "bool", "i32", "u32", "f32", "f16", "vec2", "vec3", "vec4", "mat2x2", "mat2x3", "mat2x4",
    "mat3x2", "mat3x3", "mat3x4", "mat4x2", "mat4x3", "mat4x4", "array", "atomic", "ptr",
    "sampler", "sampler_comparison", "texture_external",
];

impl Resolver<'_> {
    pub(super) fn alias(&mut self, id: AliasId) -> ResolveResult {
        let alias = self.module.alias(id);
        self.mark(alias.id)?;
        let name = self.name(alias.name);
        if PREDECLARED_TYPES.contains(&name) {
            return Err(self.error(
                ErrorCode::E2004,
                format!("'{name}' is a builtin and cannot be redeclared as an alias"),
                alias.span,
            ));
        }
        let ty = self.resolve_type(alias.ty)?;
        self.graph.set_alias_for(id, ty);
        Ok(())
    }

    /// Resolve a type expression and record its type.
    pub(super) fn resolve_type(&mut self, id: TypeExprId) -> ResolveResult<Idx> {
        ensure_sufficient_stack(|| self.resolve_type_inner(id))
    }

    fn resolve_type_inner(&mut self, id: TypeExprId) -> ResolveResult<Idx> {
        let module = self.module;
        let te = module.type_expr(id);
        self.mark(te.id)?;
        let span = te.span;

        let ty = match &te.kind {
            TypeExprKind::Void => Idx::VOID,
            TypeExprKind::Bool => Idx::BOOL,
            TypeExprKind::I32 => Idx::I32,
            TypeExprKind::U32 => Idx::U32,
            TypeExprKind::F32 => Idx::F32,
            TypeExprKind::F16 => {
                self.validator()
                    .require_extension(Extension::F16, "f16 type", span)?;
                Idx::F16
            }
            TypeExprKind::Vector { width, elem } => {
                let elem = self.element_type(*elem, "vector", span)?;
                self.validator().vector_elem(elem, span)?;
                self.graph.types.vector(elem, *width)
            }
            TypeExprKind::Matrix {
                columns,
                rows,
                elem,
            } => {
                let elem = self.element_type(*elem, "matrix", span)?;
                self.validator().matrix_elem(elem, span)?;
                self.graph.types.matrix(elem, *columns, *rows)
            }
            TypeExprKind::Array { elem, count, attrs } => {
                let elem = self.element_type(*elem, "array", span)?;
                self.array_type(elem, *count, attrs, span)?
            }
            TypeExprKind::Atomic { elem } => {
                let elem = self.resolve_type(*elem)?;
                self.validator().atomic_elem(elem, span)?;
                self.graph.types.atomic(elem)
            }
            TypeExprKind::Pointer {
                store,
                storage_class,
                access,
            } => {
                let store = self.resolve_type(*store)?;
                self.validator().pointer_store(store, span)?;
                if access.is_some() && *storage_class != StorageClass::Storage {
                    return Err(self.error(
                        ErrorCode::E2012,
                        "only pointers in <storage> storage class may declare an access mode",
                        span,
                    ));
                }
                let access = access.unwrap_or(storage_class.default_access());
                self.graph.types.pointer(store, *storage_class, access)
            }
            TypeExprKind::Sampler(kind) => self.graph.types.sampler(*kind),
            TypeExprKind::SampledTexture { dim, elem } => {
                let elem = self.resolve_type(*elem)?;
                self.validator().sampled_texture_elem(elem, span)?;
                self.graph.types.sampled_texture(*dim, elem)
            }
            TypeExprKind::MultisampledTexture { dim, elem } => {
                let elem = self.resolve_type(*elem)?;
                self.validator().sampled_texture_elem(elem, span)?;
                self.validator().multisampled_texture_dim(*dim, span)?;
                self.graph.types.multisampled_texture(*dim, elem)
            }
            TypeExprKind::DepthTexture { dim } => self.graph.types.depth_texture(*dim),
            TypeExprKind::DepthMultisampledTexture { dim } => {
                self.validator().multisampled_texture_dim(*dim, span)?;
                self.graph.types.depth_multisampled_texture(*dim)
            }
            TypeExprKind::StorageTexture {
                dim,
                format,
                access,
            } => {
                self.validator().storage_texture_access(*access, span)?;
                self.graph.types.storage_texture(*dim, *format, *access)
            }
            TypeExprKind::ExternalTexture => Idx::EXTERNAL_TEXTURE,
            TypeExprKind::Named(name) => self.named_type(te.id, *name, span)?,
        };

        self.graph.set_type_for(id, ty);
        Ok(ty)
    }

    /// Element type of a vector, matrix or array spelled outside a
    /// constructor, where it cannot be inferred.
    fn element_type(
        &mut self,
        elem: Option<TypeExprId>,
        what: &str,
        span: Span,
    ) -> ResolveResult<Idx> {
        match elem {
            Some(elem) => self.resolve_type(elem),
            None => Err(self.error(
                ErrorCode::E2002,
                format!("missing {what} element type"),
                span,
            )),
        }
    }

    // ========================================================================
    // Arrays
    // ========================================================================

    /// `array<elem, count>` with optional `@stride`.
    fn array_type(
        &mut self,
        elem: Idx,
        count: Option<ExprId>,
        attrs: &[AttrId],
        span: Span,
    ) -> ResolveResult<Idx> {
        let count = match count {
            Some(expr) => ArrayCount::Constant(self.array_count(expr)?),
            None => ArrayCount::Runtime,
        };
        self.array_with_count(elem, count, attrs, span)
    }

    /// Array type whose count is already known.
    pub(super) fn array_with_count(
        &mut self,
        elem: Idx,
        count: ArrayCount,
        attrs: &[AttrId],
        span: Span,
    ) -> ResolveResult<Idx> {
        let module = self.module;
        self.validator().array_elem(elem, span)?;
        self.validator().attributes(attrs, "array types", |kind| {
            matches!(kind, AttributeKind::Stride(_))
        })?;

        let mut explicit_stride = None;
        for &attr_id in attrs {
            let attr = module.attr(attr_id);
            self.mark(attr.id)?;
            if let AttributeKind::Stride(stride) = attr.kind {
                self.validator().array_stride(elem, stride, attr.span)?;
                explicit_stride = Some(stride);
            }
        }

        let layout = self.graph.types.array_layout(elem, count, explicit_stride);
        self.validator()
            .byte_limit("array byte size", layout.size, span)?;
        Ok(self.graph.types.array(elem, count, layout))
    }

    /// Array counts are positive constant integers.
    pub(super) fn array_count(&mut self, expr: ExprId) -> ResolveResult<u32> {
        let span = self.module.expr(expr).span;
        let sem = self.expression(expr)?;
        let ty = self.loaded(sem);
        if !matches!(ty, Idx::I32 | Idx::U32 | Idx::ABSTRACT_INT) {
            return Err(self.error(
                ErrorCode::E2002,
                format!(
                    "array count must evaluate to a constant integer expression, but is type '{}'",
                    self.type_name(ty)
                ),
                span,
            ));
        }
        let e = self.graph.expr(sem);
        let value = if e.stage == EvaluationStage::Constant {
            e.constant.as_ref().and_then(Constant::as_i64)
        } else {
            None
        };
        let Some(value) = value else {
            return Err(self.error(
                ErrorCode::E2006,
                "array count must evaluate to a constant integer expression",
                span,
            ));
        };
        if value < 1 {
            return Err(self.error(
                ErrorCode::E2002,
                format!("array count ({value}) must be greater than 0"),
                span,
            ));
        }
        u32::try_from(value).map_err(|_| {
            self.error(
                ErrorCode::E2010,
                format!("array count ({value}) must be less than 2^32"),
                span,
            )
        })
    }

    // ========================================================================
    // Named Types
    // ========================================================================

    fn named_type(&mut self, node: NodeId, name: Name, span: Span) -> ResolveResult<Idx> {
        let module = self.module;
        let text = self.name(name);
        let (what, declared) = match self.deps.resolved(node) {
            Some(Decl::Struct(id)) => {
                return self.graph.struct_for(id).ok_or_else(|| self.prior_failure());
            }
            Some(Decl::Alias(id)) => {
                return self.graph.alias_for(id).ok_or_else(|| self.prior_failure());
            }
            Some(Decl::Variable(id)) => ("variable", Some(module.variable(id).span)),
            Some(Decl::Param(id)) => ("parameter", Some(module.param(id).span)),
            Some(Decl::Function(id)) => ("function", Some(module.function(id).span)),
            None if BuiltinFn::from_name(text).is_some() => ("builtin", None),
            None => {
                return Err(InternalError::MissingSemantic {
                    what: "type declaration",
                    span,
                }
                .into());
            }
        };
        let halt = self.error(
            ErrorCode::E2002,
            format!("cannot use {what} '{text}' as type"),
            span,
        );
        if let Some(declared) = declared {
            self.note(format!("'{text}' declared here"), declared);
        }
        Err(halt)
    }
}
