//! Type expressions: the syntactic spelling of a type.

use crate::{
    Access, AttrId, ExprId, Name, NodeId, SamplerKind, Span, StorageClass, TexelFormat,
    TextureDimension, TypeExprId,
};

/// Type expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeExpr {
    pub id: NodeId,
    pub kind: TypeExprKind,
    pub span: Span,
}

/// Type expression kinds.
///
/// Vector, matrix and array element types are optional because constructor
/// calls such as `vec3(1, 2, 3)` or `array(a, b)` infer them.
#[derive(Clone, Debug, PartialEq)]
pub enum TypeExprKind {
    Void,
    Bool,
    I32,
    U32,
    F32,
    F16,
    Vector {
        width: u32,
        elem: Option<TypeExprId>,
    },
    Matrix {
        columns: u32,
        rows: u32,
        elem: Option<TypeExprId>,
    },
    /// `array<T, N>`; `count` is `None` for runtime-sized arrays.
    Array {
        elem: Option<TypeExprId>,
        count: Option<ExprId>,
        attrs: Vec<AttrId>,
    },
    Atomic {
        elem: TypeExprId,
    },
    Pointer {
        store: TypeExprId,
        storage_class: StorageClass,
        access: Option<Access>,
    },
    Sampler(SamplerKind),
    SampledTexture {
        dim: TextureDimension,
        elem: TypeExprId,
    },
    MultisampledTexture {
        dim: TextureDimension,
        elem: TypeExprId,
    },
    DepthTexture {
        dim: TextureDimension,
    },
    DepthMultisampledTexture {
        dim: TextureDimension,
    },
    StorageTexture {
        dim: TextureDimension,
        format: TexelFormat,
        access: Access,
    },
    ExternalTexture,
    /// A user-declared struct or alias, resolved through the symbol table.
    Named(Name),
}
