//! Overload resolution for operators, builtin functions and value
//! constructors.
//!
//! Overloads are patterns over a template element type `T`, drawn from a
//! family of scalar types, and a vector width `N` taken from the arguments.
//! Every instantiation is scored by the summed conversion rank of its
//! arguments (see [`Pool::conversion_rank`]). The lowest score wins; ties go
//! to the earlier overload.
//!
//! The table is stateless apart from the interner used to spell types in
//! failure messages.

mod builtins;
mod ctor;

use lumen_ir::{BinaryOp, StringInterner, UnaryOp};
use lumen_sem::{Idx, Pool, TypeKind};
use smallvec::SmallVec;

pub use ctor::{CtorKind, CtorTarget};

// ============================================================================
// Families and Patterns
// ============================================================================

const NUMERIC: &[Idx] = &[
    Idx::ABSTRACT_INT,
    Idx::ABSTRACT_FLOAT,
    Idx::I32,
    Idx::U32,
    Idx::F32,
    Idx::F16,
];
const SIGNED: &[Idx] = &[
    Idx::ABSTRACT_INT,
    Idx::ABSTRACT_FLOAT,
    Idx::I32,
    Idx::F32,
    Idx::F16,
];
const INTEGER: &[Idx] = &[Idx::ABSTRACT_INT, Idx::I32, Idx::U32];
const FLOAT: &[Idx] = &[Idx::ABSTRACT_FLOAT, Idx::F32, Idx::F16];
const SCALAR: &[Idx] = &[
    Idx::BOOL,
    Idx::ABSTRACT_INT,
    Idx::ABSTRACT_FLOAT,
    Idx::I32,
    Idx::U32,
    Idx::F32,
    Idx::F16,
];
const F32_ONLY: &[Idx] = &[Idx::F32];
/// For overloads that never mention `T`.
const NO_TEMPLATE: &[Idx] = &[Idx::VOID];

/// Parameter or return type pattern.
#[derive(Copy, Clone, Debug)]
enum Pat {
    T,
    VecT,
    Bool,
    VecBool,
    U32,
    VecU32,
    Void,
}

impl Pat {
    fn instantiate(self, pool: &mut Pool, t: Idx, width: Option<u32>) -> Option<Idx> {
        Some(match self {
            Pat::T => t,
            Pat::Bool => Idx::BOOL,
            Pat::U32 => Idx::U32,
            Pat::Void => Idx::VOID,
            Pat::VecT => pool.vector(t, width?),
            Pat::VecBool => pool.vector(Idx::BOOL, width?),
            Pat::VecU32 => pool.vector(Idx::U32, width?),
        })
    }
}

struct Overload {
    family: &'static [Idx],
    params: &'static [Pat],
    ret: Pat,
}

const fn ov(family: &'static [Idx], params: &'static [Pat], ret: Pat) -> Overload {
    Overload {
        family,
        params,
        ret,
    }
}

/// An instantiated overload.
struct Matched {
    params: SmallVec<[Idx; 4]>,
    ret: Idx,
    rank: u32,
}

fn vector_width(pool: &Pool, args: &[Idx]) -> Option<u32> {
    args.iter().find_map(|&arg| match pool.kind(arg) {
        TypeKind::Vector { width, .. } => Some(width),
        _ => None,
    })
}

fn best_match(pool: &mut Pool, overloads: &[Overload], args: &[Idx]) -> Option<Matched> {
    let width = vector_width(pool, args);
    let mut best: Option<Matched> = None;
    for overload in overloads {
        if overload.params.len() != args.len() {
            continue;
        }
        for &t in overload.family {
            let Some(candidate) = instantiate(pool, overload, t, width, args) else {
                continue;
            };
            if best.as_ref().map_or(true, |b| candidate.rank < b.rank) {
                best = Some(candidate);
            }
        }
    }
    best
}

fn instantiate(
    pool: &mut Pool,
    overload: &Overload,
    t: Idx,
    width: Option<u32>,
    args: &[Idx],
) -> Option<Matched> {
    let mut params = SmallVec::new();
    let mut rank = 0;
    for (&pat, &arg) in overload.params.iter().zip(args) {
        let param = pat.instantiate(pool, t, width)?;
        rank += pool.conversion_rank(arg, param)?;
        params.push(param);
    }
    let ret = overload.ret.instantiate(pool, t, width)?;
    Some(Matched { params, ret, rank })
}

// ============================================================================
// Operator Tables
// ============================================================================

const ARITHMETIC: &[Overload] = &[
    ov(NUMERIC, &[Pat::T, Pat::T], Pat::T),
    ov(NUMERIC, &[Pat::VecT, Pat::VecT], Pat::VecT),
    ov(NUMERIC, &[Pat::VecT, Pat::T], Pat::VecT),
    ov(NUMERIC, &[Pat::T, Pat::VecT], Pat::VecT),
];

const EQUALITY: &[Overload] = &[
    ov(SCALAR, &[Pat::T, Pat::T], Pat::Bool),
    ov(SCALAR, &[Pat::VecT, Pat::VecT], Pat::VecBool),
];

const ORDERING: &[Overload] = &[
    ov(NUMERIC, &[Pat::T, Pat::T], Pat::Bool),
    ov(NUMERIC, &[Pat::VecT, Pat::VecT], Pat::VecBool),
];

const BITWISE_OR_AND: &[Overload] = &[
    ov(&[Idx::BOOL], &[Pat::T, Pat::T], Pat::T),
    ov(&[Idx::BOOL], &[Pat::VecT, Pat::VecT], Pat::VecT),
    ov(INTEGER, &[Pat::T, Pat::T], Pat::T),
    ov(INTEGER, &[Pat::VecT, Pat::VecT], Pat::VecT),
];

const BITWISE_XOR: &[Overload] = &[
    ov(INTEGER, &[Pat::T, Pat::T], Pat::T),
    ov(INTEGER, &[Pat::VecT, Pat::VecT], Pat::VecT),
];

const LOGICAL: &[Overload] = &[ov(NO_TEMPLATE, &[Pat::Bool, Pat::Bool], Pat::Bool)];

const SHIFT: &[Overload] = &[
    ov(INTEGER, &[Pat::T, Pat::U32], Pat::T),
    ov(INTEGER, &[Pat::VecT, Pat::VecU32], Pat::VecT),
];

const NEGATION: &[Overload] = &[
    ov(SIGNED, &[Pat::T], Pat::T),
    ov(SIGNED, &[Pat::VecT], Pat::VecT),
];

const COMPLEMENT: &[Overload] = &[
    ov(INTEGER, &[Pat::T], Pat::T),
    ov(INTEGER, &[Pat::VecT], Pat::VecT),
];

const NOT: &[Overload] = &[
    ov(NO_TEMPLATE, &[Pat::Bool], Pat::Bool),
    ov(NO_TEMPLATE, &[Pat::VecBool], Pat::VecBool),
];

fn binary_table(op: BinaryOp) -> &'static [Overload] {
    match op {
        BinaryOp::Add
        | BinaryOp::Subtract
        | BinaryOp::Multiply
        | BinaryOp::Divide
        | BinaryOp::Modulo => ARITHMETIC,
        BinaryOp::Equal | BinaryOp::NotEqual => EQUALITY,
        BinaryOp::LessThan
        | BinaryOp::GreaterThan
        | BinaryOp::LessThanEqual
        | BinaryOp::GreaterThanEqual => ORDERING,
        BinaryOp::And | BinaryOp::Or => BITWISE_OR_AND,
        BinaryOp::Xor => BITWISE_XOR,
        BinaryOp::LogicalAnd | BinaryOp::LogicalOr => LOGICAL,
        BinaryOp::ShiftLeft | BinaryOp::ShiftRight => SHIFT,
    }
}

/// Matrix overloads that do not fit the `T`/`vecN<T>` patterns.
fn matrix_candidate_count(op: BinaryOp) -> usize {
    match op {
        BinaryOp::Add | BinaryOp::Subtract => 1,
        BinaryOp::Multiply => 5,
        _ => 0,
    }
}

/// Parameter and result types of a matrix operator instantiated at `t`.
fn matrix_shapes(
    pool: &mut Pool,
    op: BinaryOp,
    t: Idx,
    lhs: Idx,
    rhs: Idx,
) -> Option<(Idx, Idx, Idx)> {
    let lhs_scalar = pool.is_scalar(lhs);
    let rhs_scalar = pool.is_scalar(rhs);
    match (op, pool.kind(lhs), pool.kind(rhs)) {
        (
            BinaryOp::Add | BinaryOp::Subtract,
            TypeKind::Matrix { columns, rows, .. },
            TypeKind::Matrix {
                columns: rc,
                rows: rr,
                ..
            },
        ) if columns == rc && rows == rr => {
            let m = pool.matrix(t, columns, rows);
            Some((m, m, m))
        }
        (BinaryOp::Multiply, TypeKind::Matrix { columns, rows, .. }, _) if rhs_scalar => {
            let m = pool.matrix(t, columns, rows);
            Some((m, t, m))
        }
        (BinaryOp::Multiply, _, TypeKind::Matrix { columns, rows, .. }) if lhs_scalar => {
            let m = pool.matrix(t, columns, rows);
            Some((t, m, m))
        }
        // mat<C, R> * vec<C> -> vec<R>
        (BinaryOp::Multiply, TypeKind::Matrix { columns, rows, .. }, TypeKind::Vector { width, .. })
            if width == columns =>
        {
            let m = pool.matrix(t, columns, rows);
            let v = pool.vector(t, columns);
            let r = pool.vector(t, rows);
            Some((m, v, r))
        }
        // vec<R> * mat<C, R> -> vec<C>
        (BinaryOp::Multiply, TypeKind::Vector { width, .. }, TypeKind::Matrix { columns, rows, .. })
            if width == rows =>
        {
            let m = pool.matrix(t, columns, rows);
            let v = pool.vector(t, rows);
            let r = pool.vector(t, columns);
            Some((v, m, r))
        }
        // mat<K, R> * mat<C, K> -> mat<C, R>
        (
            BinaryOp::Multiply,
            TypeKind::Matrix {
                columns: k,
                rows,
                ..
            },
            TypeKind::Matrix {
                columns,
                rows: k2,
                ..
            },
        ) if k == k2 => {
            let l = pool.matrix(t, k, rows);
            let r = pool.matrix(t, columns, k);
            let out = pool.matrix(t, columns, rows);
            Some((l, r, out))
        }
        _ => None,
    }
}

// ============================================================================
// Results
// ============================================================================

/// Why no overload matched.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoMatch {
    pub message: String,
    pub candidates: usize,
    /// `functions`, `operators` or `constructors`.
    pub noun: &'static str,
}

impl NoMatch {
    /// Note listing the number of candidates considered.
    pub fn detail(&self) -> String {
        format!("{} candidate {}", self.candidates, self.noun)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BinaryOverload {
    pub lhs: Idx,
    pub rhs: Idx,
    pub result: Idx,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct UnaryOverload {
    pub operand: Idx,
    pub result: Idx,
}

// ============================================================================
// Table
// ============================================================================

/// Overload lookup. Argument types must already be loaded (no references).
pub struct IntrinsicTable<'a> {
    interner: &'a StringInterner,
}

impl<'a> IntrinsicTable<'a> {
    pub fn new(interner: &'a StringInterner) -> Self {
        IntrinsicTable { interner }
    }

    fn type_list(&self, pool: &Pool, types: &[Idx]) -> String {
        types
            .iter()
            .map(|&ty| pool.display(ty, self.interner))
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// `lhs op rhs`, or `lhs op= rhs` when `compound`.
    pub fn binary(
        &self,
        pool: &mut Pool,
        op: BinaryOp,
        lhs: Idx,
        rhs: Idx,
        compound: bool,
    ) -> Result<BinaryOverload, NoMatch> {
        if pool.is_matrix(lhs) || pool.is_matrix(rhs) {
            let mut best: Option<(BinaryOverload, u32)> = None;
            for &t in FLOAT {
                let Some((l, r, result)) = matrix_shapes(pool, op, t, lhs, rhs) else {
                    continue;
                };
                let rank = pool
                    .conversion_rank(lhs, l)
                    .zip(pool.conversion_rank(rhs, r))
                    .map(|(a, b)| a + b);
                if let Some(rank) = rank {
                    if best.as_ref().map_or(true, |(_, b)| rank < *b) {
                        best = Some((BinaryOverload { lhs: l, rhs: r, result }, rank));
                    }
                }
            }
            if let Some((overload, _)) = best {
                return Ok(overload);
            }
        } else if let Some(m) = best_match(pool, binary_table(op), &[lhs, rhs]) {
            return Ok(BinaryOverload {
                lhs: m.params[0],
                rhs: m.params[1],
                result: m.ret,
            });
        }

        let symbol = if compound {
            format!("{}=", op.as_symbol())
        } else {
            op.as_symbol().to_string()
        };
        Err(NoMatch {
            message: format!(
                "no matching overload for operator {symbol} ({})",
                self.type_list(pool, &[lhs, rhs])
            ),
            candidates: binary_table(op).len() + matrix_candidate_count(op),
            noun: "operators",
        })
    }

    /// Negation, complement and logical not. Address-of and indirection are
    /// not overloaded.
    pub fn unary(
        &self,
        pool: &mut Pool,
        op: UnaryOp,
        operand: Idx,
    ) -> Result<UnaryOverload, NoMatch> {
        let table: &[Overload] = match op {
            UnaryOp::Negation => NEGATION,
            UnaryOp::Complement => COMPLEMENT,
            UnaryOp::Not => NOT,
            UnaryOp::AddressOf | UnaryOp::Indirection => &[],
        };
        match best_match(pool, table, &[operand]) {
            Some(m) => Ok(UnaryOverload {
                operand: m.params[0],
                result: m.ret,
            }),
            None => Err(NoMatch {
                message: format!(
                    "no matching overload for operator {} ({})",
                    op.as_symbol(),
                    self.type_list(pool, &[operand])
                ),
                candidates: table.len(),
                noun: "operators",
            }),
        }
    }
}

#[cfg(test)]
mod tests;
