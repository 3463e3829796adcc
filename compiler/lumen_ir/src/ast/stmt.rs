//! Statement nodes.

use crate::{BinaryOp, CaseId, ExprId, NodeId, Span, StmtId, VariableId};

/// Statement node.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub id: NodeId,
    pub kind: StmtKind,
    pub span: Span,
}

/// Statement kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    Block(Vec<StmtId>),
    Assign {
        lhs: ExprId,
        rhs: ExprId,
    },
    Break,
    /// A call evaluated for its side effects.
    Call(ExprId),
    CompoundAssign {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    Continue,
    Discard,
    Fallthrough,
    IncDec {
        lhs: ExprId,
        increment: bool,
    },
    Return(Option<ExprId>),
    VarDecl(VariableId),
    StaticAssert(ExprId),
    If {
        cond: ExprId,
        body: StmtId,
        else_stmt: Option<StmtId>,
    },
    Loop {
        body: StmtId,
        continuing: Option<StmtId>,
    },
    For {
        init: Option<StmtId>,
        cond: Option<ExprId>,
        continuing: Option<StmtId>,
        body: StmtId,
    },
    While {
        cond: ExprId,
        body: StmtId,
    },
    Switch {
        cond: ExprId,
        cases: Vec<CaseId>,
    },
}

/// A `case` or `default` clause of a switch statement.
#[derive(Clone, Debug, PartialEq)]
pub struct CaseClause {
    pub id: NodeId,
    /// Empty for the `default` clause.
    pub selectors: Vec<ExprId>,
    pub body: StmtId,
    pub span: Span,
}

impl CaseClause {
    pub fn is_default(&self) -> bool {
        self.selectors.is_empty()
    }
}
