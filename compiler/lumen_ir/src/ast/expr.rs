//! Expression nodes.

use crate::{BinaryOp, ExprId, IdentId, Name, NodeId, Span, TypeExprId, UnaryOp};

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub id: NodeId,
    pub kind: ExprKind,
    pub span: Span,
}

/// Expression kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// `object[index]`
    Index { object: ExprId, index: ExprId },
    Binary {
        op: BinaryOp,
        lhs: ExprId,
        rhs: ExprId,
    },
    /// `bitcast<T>(expr)`
    Bitcast { ty: TypeExprId, expr: ExprId },
    Call { target: CallTarget, args: Vec<ExprId> },
    Ident(Name),
    Literal(Literal),
    /// `object.member`, also used for vector swizzles.
    Member { object: ExprId, member: Name },
    Unary { op: UnaryOp, operand: ExprId },
    /// `_`, only valid as an assignment target.
    Phony,
}

impl ExprKind {
    /// Child expressions, left to right.
    pub fn children(&self) -> Vec<ExprId> {
        match self {
            ExprKind::Index { object, index } => vec![*object, *index],
            ExprKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            ExprKind::Bitcast { expr, .. } => vec![*expr],
            ExprKind::Call { args, .. } => args.clone(),
            ExprKind::Member { object, .. } => vec![*object],
            ExprKind::Unary { operand, .. } => vec![*operand],
            ExprKind::Ident(_) | ExprKind::Literal(_) | ExprKind::Phony => Vec::new(),
        }
    }
}

/// The callee of a call expression.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CallTarget {
    /// A spelled-out type: `vec3<f32>(...)`, `array(...)`.
    Type(TypeExprId),
    /// A function, builtin, struct or alias name.
    Ident(IdentId),
}

/// Identifier used as a call target.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Ident {
    pub id: NodeId,
    pub name: Name,
    pub span: Span,
}

/// Integer literal suffix.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum IntSuffix {
    /// No suffix: abstract integer.
    None,
    /// `i`: i32.
    I,
    /// `u`: u32.
    U,
}

/// Float literal suffix.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FloatSuffix {
    /// No suffix: abstract float.
    None,
    /// `f`: f32.
    F,
    /// `h`: f16.
    H,
}

/// Literal values.
///
/// Floats are stored as bits so the literal is `Eq` and `Hash`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Literal {
    Bool(bool),
    Int { value: i64, suffix: IntSuffix },
    Float { bits: u64, suffix: FloatSuffix },
}

impl Literal {
    pub fn float(value: f64, suffix: FloatSuffix) -> Self {
        Literal::Float {
            bits: value.to_bits(),
            suffix,
        }
    }
}
