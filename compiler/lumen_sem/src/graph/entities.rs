//! Semantic entities attached to syntax nodes.

use lumen_ir::{
    Access, ExprId, FunctionId, Name, NodeId, ParamId, PipelineStage, Span, StorageClass,
    VariableId,
};
use smallvec::SmallVec;

use super::{CallTargetId, SemExprId, SemFnId, SemStmtId, SemVarId, UniqueVec};
use crate::{Behaviors, BuiltinFn, Constant, EvaluationStage, Idx, StructId};

// ============================================================================
// Variables
// ============================================================================

/// Syntax node a semantic variable was built from.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum VariableDecl {
    Variable(VariableId),
    Param(ParamId),
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SemVarKind {
    Global,
    Local,
    Parameter { index: u32 },
}

/// Declaration keyword, or `Param` for function parameters.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum DeclKind {
    Var,
    Let,
    Const,
    Override,
    Param,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BindingPoint {
    pub group: u32,
    pub binding: u32,
}

/// What a declaration shadows.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ShadowTarget {
    Variable(SemVarId),
    Function(SemFnId),
    Type(Idx),
}

#[derive(Clone, Debug)]
pub struct SemVariable {
    pub decl: VariableDecl,
    pub name: Name,
    pub kind: SemVarKind,
    pub decl_kind: DeclKind,
    /// Store type. Expressions naming a `var` see a reference to it.
    pub ty: Idx,
    pub storage_class: StorageClass,
    pub access: Access,
    pub stage: EvaluationStage,
    pub constant: Option<Constant>,
    pub initializer: Option<SemExprId>,
    pub override_id: Option<u16>,
    pub binding_point: Option<BindingPoint>,
    pub shadows: Option<ShadowTarget>,
    pub users: Vec<SemExprId>,
    pub span: Span,
}

// ============================================================================
// Functions
// ============================================================================

/// One dimension of an entry point's workgroup size.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct WorkgroupDim {
    /// Constant value; `None` when it depends on an override.
    pub value: Option<u32>,
    pub override_var: Option<SemVarId>,
}

impl Default for WorkgroupDim {
    fn default() -> Self {
        WorkgroupDim {
            value: Some(1),
            override_var: None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct SemFunction {
    pub decl: FunctionId,
    pub name: Name,
    pub params: Vec<SemVarId>,
    pub return_type: Idx,
    pub stage: Option<PipelineStage>,
    pub workgroup_size: [WorkgroupDim; 3],
    pub behaviors: Behaviors,
    pub directly_called: UniqueVec<SemFnId>,
    pub transitively_called: UniqueVec<SemFnId>,
    pub directly_referenced_globals: UniqueVec<SemVarId>,
    pub transitively_referenced_globals: UniqueVec<SemVarId>,
    pub called_builtins: UniqueVec<BuiltinFn>,
    /// `(texture, sampler)` pairs used together in builtin calls. A texture
    /// used without a sampler pairs with `None`.
    pub texture_sampler_pairs: UniqueVec<(SemVarId, Option<SemVarId>)>,
    pub ancestor_entry_points: UniqueVec<SemFnId>,
    /// First `discard` statement in the body.
    pub discard: Option<Span>,
    /// Calls made directly by this function, in resolution order.
    pub direct_calls: Vec<SemExprId>,
    /// Calls to this function.
    pub call_sites: Vec<SemExprId>,
    pub span: Span,
}

impl SemFunction {
    pub fn is_entry_point(&self) -> bool {
        self.stage.is_some()
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Clone, Debug, PartialEq)]
pub enum SemExprKind {
    Plain,
    Call {
        target: CallTargetId,
        args: Vec<SemExprId>,
    },
    VariableUser(SemVarId),
    /// Struct member access.
    Member {
        object: SemExprId,
        strukt: StructId,
        index: u32,
    },
    /// Vector swizzle.
    Swizzle {
        object: SemExprId,
        indices: SmallVec<[u32; 4]>,
    },
    /// Abstract value converted to a concrete type. Replaces the entry of
    /// `inner` for the same syntax node.
    Materialize {
        inner: SemExprId,
    },
}

#[derive(Clone, Debug)]
pub struct SemExpr {
    pub decl: ExprId,
    pub kind: SemExprKind,
    pub ty: Idx,
    pub stage: EvaluationStage,
    pub constant: Option<Constant>,
    pub stmt: Option<SemStmtId>,
    pub has_side_effects: bool,
    pub behaviors: Behaviors,
    /// The variable whose memory this expression names, if any.
    pub source_variable: Option<SemVarId>,
}

// ============================================================================
// Call Targets
// ============================================================================

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CallTargetKind {
    Function(SemFnId),
    Builtin(BuiltinFn),
    /// Scalar, vector or matrix constructor.
    ValueConstructor(Idx),
    ValueConversion { from: Idx, to: Idx },
    ArrayConstructor(Idx),
    StructConstructor(Idx),
}

impl CallTargetKind {
    pub fn is_constructor_or_conversion(self) -> bool {
        !matches!(self, CallTargetKind::Function(_) | CallTargetKind::Builtin(_))
    }
}

/// Role of a call parameter, used for texture and sampler tracking.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ParamUsage {
    None,
    Texture,
    Sampler,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct CallParam {
    pub ty: Idx,
    pub usage: ParamUsage,
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct CallTarget {
    pub kind: CallTargetKind,
    pub params: SmallVec<[CallParam; 4]>,
    pub return_type: Idx,
    pub stage: EvaluationStage,
}

impl CallTarget {
    pub fn param_usage(&self, usage: ParamUsage) -> Option<usize> {
        self.params.iter().position(|p| p.usage == usage)
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SemStmtKind {
    FunctionBlock,
    Block,
    /// Body of a `loop`.
    LoopBlock,
    /// `continuing` block of a `loop`; its parent is the loop body.
    LoopContinuingBlock,
    /// Body of a `case` clause.
    CaseBlock,
    Loop,
    For,
    While,
    If,
    Switch,
    Case,
    Plain,
}

impl SemStmtKind {
    pub const fn is_block(self) -> bool {
        matches!(
            self,
            SemStmtKind::FunctionBlock
                | SemStmtKind::Block
                | SemStmtKind::LoopBlock
                | SemStmtKind::LoopContinuingBlock
                | SemStmtKind::CaseBlock
        )
    }

    /// Statements a `continue` can target.
    pub const fn is_loop(self) -> bool {
        matches!(self, SemStmtKind::Loop | SemStmtKind::For | SemStmtKind::While)
    }
}

/// First `continue` in a loop body, and the number of declarations made
/// before it.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct FirstContinue {
    pub span: Span,
    pub decl_count: usize,
}

#[derive(Clone, Debug)]
pub struct SemStmt {
    /// Statement or case-clause node.
    pub decl: NodeId,
    pub kind: SemStmtKind,
    pub parent: Option<SemStmtId>,
    pub function: Option<SemFnId>,
    pub reachable: bool,
    pub behaviors: Behaviors,
    /// Variables declared directly in this block, in order.
    pub decls: Vec<SemVarId>,
    pub first_continue: Option<FirstContinue>,
}
