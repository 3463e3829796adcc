//! Semantic model for the Lumen shading-language compiler.
//!
//! - [`Number`] and [`Scalar`]: range-checked numeric values for the six
//!   scalar kinds, including the two abstract kinds.
//! - [`Pool`]: interned semantic types with memory layout and conversion
//!   ranks.
//! - [`SemGraph`]: the semantic entities the resolver attaches to syntax
//!   nodes.

mod behavior;
mod builtin;
mod constant;
mod flags;
mod graph;
mod idx;
mod number;
mod pool;
mod stage;

pub use behavior::Behaviors;
pub use builtin::BuiltinFn;
pub use constant::{ConstValue, Constant};
pub use flags::TypeFlags;
pub use graph::{
    BindingPoint, CallParam, CallTarget, CallTargetId, CallTargetKind, DeclKind, FirstContinue,
    ParamUsage, SemExpr, SemExprId, SemExprKind, SemFnId, SemFunction, SemGraph, SemStmt,
    SemStmtId, SemStmtKind, SemVarId, SemVarKind, SemVariable, ShadowTarget, UniqueVec,
    VariableDecl, WorkgroupDim,
};
pub use idx::Idx;
pub use number::{
    checked_convert, AFloat, AInt, ConversionFailure, Number, NumberKind, Scalar, F16, F32, I32,
    U32,
};
pub use pool::{
    round_up, round_up_u64, ArrayCount, ArrayLayout, PipelineStageUsage, Pool, StructId,
    StructMember, StructType, TypeKind,
};
pub use stage::EvaluationStage;
