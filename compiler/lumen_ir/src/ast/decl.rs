//! Declarations and attributes.

use crate::{
    Access, AttrId, BuiltinValue, ExprId, Extension, MemberId, Name, NodeId, ParamId,
    PipelineStage, Span, StmtId, StorageClass, TypeExprId,
};

/// `enable <extension>;`
#[derive(Clone, Debug, PartialEq)]
pub struct Enable {
    pub id: NodeId,
    pub extension: Extension,
    pub span: Span,
}

/// `alias name = type;`
#[derive(Clone, Debug, PartialEq)]
pub struct Alias {
    pub id: NodeId,
    pub name: Name,
    pub ty: TypeExprId,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructDecl {
    pub id: NodeId,
    pub name: Name,
    pub members: Vec<MemberId>,
    pub attrs: Vec<AttrId>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructMember {
    pub id: NodeId,
    pub name: Name,
    pub ty: TypeExprId,
    pub attrs: Vec<AttrId>,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Function {
    pub id: NodeId,
    pub name: Name,
    pub params: Vec<ParamId>,
    pub return_type: Option<TypeExprId>,
    pub return_attrs: Vec<AttrId>,
    /// Always a `StmtKind::Block`.
    pub body: StmtId,
    pub attrs: Vec<AttrId>,
    /// Pipeline stage from the `@stage` attribute, recorded by the builder.
    pub stage: Option<PipelineStage>,
    pub span: Span,
}

impl Function {
    pub fn is_entry_point(&self) -> bool {
        self.stage.is_some()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Param {
    pub id: NodeId,
    pub name: Name,
    pub ty: TypeExprId,
    pub attrs: Vec<AttrId>,
    pub span: Span,
}

/// The four variable declaration forms.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VariableKind {
    Var {
        storage_class: Option<StorageClass>,
        access: Option<Access>,
    },
    Let,
    Const,
    Override,
}

impl VariableKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            VariableKind::Var { .. } => "var",
            VariableKind::Let => "let",
            VariableKind::Const => "const",
            VariableKind::Override => "override",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Variable {
    pub id: NodeId,
    pub name: Name,
    pub kind: VariableKind,
    pub ty: Option<TypeExprId>,
    pub init: Option<ExprId>,
    pub attrs: Vec<AttrId>,
    pub span: Span,
}

/// Validation rules an internal attribute switches off.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum DisabledValidation {
    /// Allows function-scope variables outside the `function` storage class.
    IgnoreStorageClass,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub id: NodeId,
    pub kind: AttributeKind,
    pub span: Span,
}

#[derive(Clone, Debug, PartialEq)]
pub enum AttributeKind {
    Stage(PipelineStage),
    WorkgroupSize {
        x: ExprId,
        y: Option<ExprId>,
        z: Option<ExprId>,
    },
    Id(u32),
    Binding(u32),
    Group(u32),
    Builtin(BuiltinValue),
    Location(u32),
    Stride(u32),
    Offset(u32),
    Align(u32),
    Size(u32),
    Invariant,
    Internal(DisabledValidation),
}

impl AttributeKind {
    /// Attribute spelling, used for duplicate-attribute diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            AttributeKind::Stage(_) => "stage",
            AttributeKind::WorkgroupSize { .. } => "workgroup_size",
            AttributeKind::Id(_) => "id",
            AttributeKind::Binding(_) => "binding",
            AttributeKind::Group(_) => "group",
            AttributeKind::Builtin(_) => "builtin",
            AttributeKind::Location(_) => "location",
            AttributeKind::Stride(_) => "stride",
            AttributeKind::Offset(_) => "offset",
            AttributeKind::Align(_) => "align",
            AttributeKind::Size(_) => "size",
            AttributeKind::Invariant => "invariant",
            AttributeKind::Internal(_) => "internal",
        }
    }
}
