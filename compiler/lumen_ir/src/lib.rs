//! Syntax graph for the Lumen shading-language compiler.
//!
//! Core design:
//! - **Flatten Everything**: no `Box<Expr>`, nodes live in arenas and are
//!   referenced by `u32` indices (`ExprId`, `StmtId`, ...).
//! - **One Identity Per Node**: every node also gets a program-wide `NodeId`
//!   so later passes can track visitation with a single bitset.
//! - **Intern Everything**: identifiers are `Name(u32)` from a `StringInterner`.
//!
//! There is no parser in this workspace; programs are assembled with
//! [`AstBuilder`].

pub mod ast;
mod builder;
mod extension;
mod ids;
mod interner;
mod name;
mod pipeline;
mod span;
mod storage;
mod texture;

pub use ast::{
    Alias, Attribute, AttributeKind, BinaryOp, CallTarget, CaseClause, DisabledValidation, Enable,
    Expr, ExprKind, FloatSuffix, Function, GlobalDecl, Ident, IntSuffix, Literal, Module, NodeInfo,
    NodeKind, Param, Stmt, StmtKind, StructDecl, StructMember, TypeExpr, TypeExprKind, UnaryOp,
    Variable, VariableKind,
};
pub use builder::AstBuilder;
pub use extension::Extension;
pub use ids::{
    AliasId, AttrId, CaseId, EnableId, ExprId, FunctionId, IdentId, MemberId, NodeId, ParamId,
    StmtId, StructDeclId, TypeExprId, VariableId,
};
pub use interner::{InternError, StringInterner};
pub use name::Name;
pub use pipeline::{BuiltinValue, PipelineStage};
pub use span::Span;
pub use storage::{Access, StorageClass};
pub use texture::{SamplerKind, TexelFormat, TexelKind, TextureDimension};
