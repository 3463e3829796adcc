//! Constant evaluation.
//!
//! Pure functions over [`Constant`] values. The resolver decides when an
//! expression is constant; this module computes its value or explains why
//! the value does not exist (overflow, out-of-range conversion, division by
//! zero, out-of-bounds index).
//!
//! Operands are expected to have been converted to the operator's parameter
//! types already; mixed kinds are reported as [`EvalError::Unsupported`].

mod builtins;
mod ops;

use lumen_ir::{BinaryOp, FloatSuffix, IntSuffix, Literal, StringInterner, UnaryOp};
use lumen_sem::{
    checked_convert, AFloat, AInt, ArrayCount, ConstValue, Constant, Idx, NumberKind, Pool,
    Scalar, TypeKind, F16, F32, I32, U32,
};
use thiserror::Error;

/// Why a constant value could not be computed.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("value {value} cannot be represented as '{ty}'")]
    NotRepresentable { value: String, ty: String },
    #[error("'{lhs} {op} {rhs}' cannot be represented as '{ty}'")]
    Overflow {
        lhs: String,
        op: &'static str,
        rhs: String,
        ty: &'static str,
    },
    #[error("'{expr}' cannot be represented as '{ty}'")]
    UnaryOverflow { expr: String, ty: &'static str },
    #[error("integer division by zero is invalid")]
    DivisionByZero,
    #[error("index {index} out of bounds [0..{max}]")]
    IndexOutOfBounds { index: i64, max: u32 },
    #[error(
        "shift {direction} value must be less than the bit width of the lhs, which is {width}"
    )]
    ShiftTooLarge { direction: &'static str, width: u32 },
    #[error("cannot evaluate {0}")]
    Unsupported(String),
}

pub type EvalResult = Result<Constant, EvalError>;

/// How a constructor or conversion builds its value.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum CtorEval {
    /// No arguments: the zero value.
    Zero,
    /// One argument of the target type.
    Identity,
    /// One argument of another type, converted element-wise.
    Conversion,
    /// One scalar repeated into every vector component.
    Splat,
    /// Components, columns, array elements or struct members in order.
    /// Vector arguments to a vector constructor are flattened.
    Compose,
    /// A matrix from its scalars in column-major order.
    MatrixScalars,
}

/// Number kind of a scalar type.
pub fn number_kind(pool: &Pool, ty: Idx) -> Option<NumberKind> {
    Some(match pool.kind(ty) {
        TypeKind::I32 => NumberKind::I32,
        TypeKind::U32 => NumberKind::U32,
        TypeKind::F32 => NumberKind::F32,
        TypeKind::F16 => NumberKind::F16,
        TypeKind::AbstractInt => NumberKind::AbstractInt,
        TypeKind::AbstractFloat => NumberKind::AbstractFloat,
        _ => return None,
    })
}

/// Bounds check for an index into something with `count` elements.
pub fn check_index(count: u32, index: i64) -> Result<usize, EvalError> {
    match usize::try_from(index) {
        Ok(i) if i64::from(count) > index => Ok(i),
        _ => Err(EvalError::IndexOutOfBounds {
            index,
            max: count.saturating_sub(1),
        }),
    }
}

/// The type and value of a literal.
pub fn literal(literal: Literal) -> Result<(Idx, Constant), EvalError> {
    fn represent<T: lumen_sem::Number>(value: Scalar, ty: Idx) -> Result<Constant, EvalError> {
        checked_convert::<T>(value)
            .map(|v| Constant::scalar(ty, v))
            .map_err(|_| EvalError::NotRepresentable {
                value: value.to_string(),
                ty: T::KIND.name().to_string(),
            })
    }

    Ok(match literal {
        Literal::Bool(v) => (Idx::BOOL, Constant::bool(v)),
        Literal::Int { value, suffix } => {
            let value = Scalar::AInt(AInt(value));
            match suffix {
                IntSuffix::None => (Idx::ABSTRACT_INT, Constant::scalar(Idx::ABSTRACT_INT, value)),
                IntSuffix::I => (Idx::I32, represent::<I32>(value, Idx::I32)?),
                IntSuffix::U => (Idx::U32, represent::<U32>(value, Idx::U32)?),
            }
        }
        Literal::Float { bits, suffix } => {
            let value = Scalar::AFloat(AFloat(f64::from_bits(bits)));
            match suffix {
                FloatSuffix::None => (
                    Idx::ABSTRACT_FLOAT,
                    Constant::scalar(Idx::ABSTRACT_FLOAT, value),
                ),
                FloatSuffix::F => (Idx::F32, represent::<F32>(value, Idx::F32)?),
                FloatSuffix::H => (Idx::F16, represent::<F16>(value, Idx::F16)?),
            }
        }
    })
}

/// Evaluator bound to the type pool of the program being resolved.
pub struct ConstEval<'a> {
    pool: &'a Pool,
    interner: &'a StringInterner,
}

impl<'a> ConstEval<'a> {
    pub fn new(pool: &'a Pool, interner: &'a StringInterner) -> Self {
        ConstEval { pool, interner }
    }

    fn type_name(&self, ty: Idx) -> String {
        self.pool.display(ty, self.interner)
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// The zero value of a constructible type.
    pub fn zero(&self, ty: Idx) -> EvalResult {
        let composite = |count: u32, elem: Idx| -> EvalResult {
            let elements = (0..count)
                .map(|_| self.zero(elem))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Constant::composite(ty, elements))
        };
        match self.pool.kind(ty) {
            TypeKind::Bool => Ok(Constant::bool(false)),
            TypeKind::Vector { elem, width } => composite(width, elem),
            TypeKind::Matrix {
                column, columns, ..
            } => composite(columns, column),
            TypeKind::Array {
                elem,
                count: ArrayCount::Constant(n),
                ..
            } => composite(n, elem),
            TypeKind::Struct(id) => {
                let members = self
                    .pool
                    .struct_type(id)
                    .members
                    .iter()
                    .map(|m| self.zero(m.ty))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Constant::composite(ty, members))
            }
            _ => match number_kind(self.pool, ty) {
                Some(kind) => Ok(Constant::scalar(ty, Scalar::zero(kind))),
                None => Err(EvalError::Unsupported(format!(
                    "zero value of '{}'",
                    self.type_name(ty)
                ))),
            },
        }
    }

    /// Convert `value` to `target`, element-wise for composites.
    pub fn convert(&self, value: &Constant, target: Idx) -> EvalResult {
        if value.ty == target {
            return Ok(value.clone());
        }
        match &value.value {
            ConstValue::Composite(elements) => {
                let elem = self.pool.elem_of(target).unwrap_or(target);
                let converted = elements
                    .iter()
                    .map(|e| self.convert(e, elem))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Constant::composite(target, converted))
            }
            ConstValue::Bool(v) => match number_kind(self.pool, target) {
                Some(kind) => Ok(Constant::scalar(
                    target,
                    if *v {
                        Scalar::one(kind)
                    } else {
                        Scalar::zero(kind)
                    },
                )),
                None if target == Idx::BOOL => Ok(Constant::bool(*v)),
                None => Err(self.not_representable(value, target)),
            },
            ConstValue::Number(v) => {
                if target == Idx::BOOL {
                    return Ok(Constant::bool(!v.is_zero()));
                }
                let kind = number_kind(self.pool, target)
                    .ok_or_else(|| self.not_representable(value, target))?;
                v.convert(kind)
                    .map(|s| Constant::scalar(target, s))
                    .map_err(|_| self.not_representable(value, target))
            }
        }
    }

    fn not_representable(&self, value: &Constant, target: Idx) -> EvalError {
        let value = match &value.value {
            ConstValue::Bool(v) => v.to_string(),
            ConstValue::Number(v) => v.to_string(),
            ConstValue::Composite(_) => self.type_name(value.ty),
        };
        EvalError::NotRepresentable {
            value,
            ty: self.type_name(target),
        }
    }

    /// Element `index` of a vector, matrix or array value.
    pub fn index(&self, object: &Constant, index: i64) -> EvalResult {
        let count = u32::try_from(object.elements().len()).unwrap_or(u32::MAX);
        let i = check_index(count, index)?;
        object
            .element(i)
            .cloned()
            .ok_or_else(|| EvalError::Unsupported("index into a scalar".to_string()))
    }

    /// Member `index` of a struct value.
    pub fn member(&self, object: &Constant, index: u32) -> Option<Constant> {
        object.element(index as usize).cloned()
    }

    /// Swizzle of a vector value. One index yields a scalar.
    pub fn swizzle(&self, ty: Idx, object: &Constant, indices: &[u32]) -> Option<Constant> {
        let picked = indices
            .iter()
            .map(|&i| object.element(i as usize).cloned())
            .collect::<Option<Vec<_>>>()?;
        if indices.len() == 1 {
            picked.into_iter().next()
        } else {
            Some(Constant::composite(ty, picked))
        }
    }

    // ========================================================================
    // Constructors
    // ========================================================================

    pub fn construct(&self, how: CtorEval, ty: Idx, args: &[Constant]) -> EvalResult {
        let missing = || EvalError::Unsupported(format!("construction of '{}'", self.type_name(ty)));
        match how {
            CtorEval::Zero => self.zero(ty),
            CtorEval::Identity => args.first().cloned().ok_or_else(missing),
            CtorEval::Conversion => self.convert(args.first().ok_or_else(missing)?, ty),
            CtorEval::Splat => {
                let value = args.first().ok_or_else(missing)?;
                let width = self.pool.element_count(ty).ok_or_else(missing)?;
                Ok(Constant::composite(
                    ty,
                    (0..width).map(|_| value.clone()).collect(),
                ))
            }
            CtorEval::Compose => {
                if self.pool.is_vector(ty) {
                    let mut components = Vec::new();
                    for arg in args {
                        match &arg.value {
                            ConstValue::Composite(elements) => {
                                components.extend(elements.iter().cloned());
                            }
                            _ => components.push(arg.clone()),
                        }
                    }
                    Ok(Constant::composite(ty, components))
                } else {
                    Ok(Constant::composite(ty, args.to_vec()))
                }
            }
            CtorEval::MatrixScalars => {
                let TypeKind::Matrix { column, rows, .. } = self.pool.kind(ty) else {
                    return Err(missing());
                };
                let columns = args
                    .chunks(rows as usize)
                    .map(|chunk| Constant::composite(column, chunk.to_vec()))
                    .collect();
                Ok(Constant::composite(ty, columns))
            }
        }
    }

    // ========================================================================
    // Operators
    // ========================================================================

    /// `lhs op rhs` with result type `ty`.
    pub fn binary(&self, op: BinaryOp, ty: Idx, lhs: &Constant, rhs: &Constant) -> EvalResult {
        if op == BinaryOp::Multiply
            && (self.pool.is_matrix(lhs.ty) || self.pool.is_matrix(rhs.ty))
            && !self.pool.is_scalar(lhs.ty)
            && !self.pool.is_scalar(rhs.ty)
        {
            return self.matrix_product(ty, lhs, rhs);
        }
        self.zip_map(ty, &[lhs, rhs], &mut |el_ty, parts| {
            self.scalar_binary(op, el_ty, parts[0], parts[1])
        })
    }

    fn scalar_binary(&self, op: BinaryOp, ty: Idx, lhs: &Constant, rhs: &Constant) -> EvalResult {
        match (&lhs.value, &rhs.value) {
            (ConstValue::Bool(a), ConstValue::Bool(b)) => {
                let (a, b) = (*a, *b);
                let v = match op {
                    BinaryOp::And | BinaryOp::LogicalAnd => a && b,
                    BinaryOp::Or | BinaryOp::LogicalOr => a || b,
                    BinaryOp::Xor => a ^ b,
                    BinaryOp::Equal => a == b,
                    BinaryOp::NotEqual => a != b,
                    _ => return Err(EvalError::Unsupported(format!("operator {op} on 'bool'"))),
                };
                Ok(Constant::bool(v))
            }
            (ConstValue::Number(a), ConstValue::Number(b)) => {
                if op.is_comparison() {
                    Ok(Constant::bool(ops::compare(op, *a, *b)))
                } else {
                    Ok(Constant::scalar(ty, ops::arith(op, *a, *b)?))
                }
            }
            _ => Err(EvalError::Unsupported(format!("operator {op}"))),
        }
    }

    /// Matrix-vector, vector-matrix and matrix-matrix products.
    fn matrix_product(&self, ty: Idx, lhs: &Constant, rhs: &Constant) -> EvalResult {
        let unsupported = || EvalError::Unsupported("matrix product".to_string());
        // m[c][r]
        let at = |m: &Constant, c: usize, r: usize| -> Result<Scalar, EvalError> {
            m.element(c)
                .and_then(|col| col.element(r))
                .and_then(Constant::as_scalar)
                .ok_or_else(unsupported)
        };
        let component = |v: &Constant, i: usize| -> Result<Scalar, EvalError> {
            v.element(i)
                .and_then(Constant::as_scalar)
                .ok_or_else(unsupported)
        };
        let elem = self.pool.deepest_element(ty);

        let lhs_mat = self.pool.is_matrix(lhs.ty);
        let rhs_mat = self.pool.is_matrix(rhs.ty);
        match (lhs_mat, rhs_mat) {
            // mat<C, R> * vec<C> -> vec<R>
            (true, false) => {
                let columns = lhs.elements().len();
                let rows = self.pool.element_count(ty).ok_or_else(unsupported)? as usize;
                let mut out = Vec::with_capacity(rows);
                for r in 0..rows {
                    let pairs = (0..columns)
                        .map(|c| Ok((at(lhs, c, r)?, component(rhs, c)?)))
                        .collect::<Result<Vec<_>, EvalError>>()?;
                    out.push(Constant::scalar(elem, dot(&pairs)?));
                }
                Ok(Constant::composite(ty, out))
            }
            // vec<R> * mat<C, R> -> vec<C>
            (false, true) => {
                let rows = lhs.elements().len();
                let columns = rhs.elements().len();
                let mut out = Vec::with_capacity(columns);
                for c in 0..columns {
                    let pairs = (0..rows)
                        .map(|r| Ok((component(lhs, r)?, at(rhs, c, r)?)))
                        .collect::<Result<Vec<_>, EvalError>>()?;
                    out.push(Constant::scalar(elem, dot(&pairs)?));
                }
                Ok(Constant::composite(ty, out))
            }
            // mat<K, R> * mat<C, K> -> mat<C, R>
            (true, true) => {
                let TypeKind::Matrix {
                    column,
                    columns,
                    rows,
                    ..
                } = self.pool.kind(ty)
                else {
                    return Err(unsupported());
                };
                let inner = lhs.elements().len();
                let mut out = Vec::with_capacity(columns as usize);
                for c in 0..columns as usize {
                    let mut col = Vec::with_capacity(rows as usize);
                    for r in 0..rows as usize {
                        let pairs = (0..inner)
                            .map(|k| Ok((at(lhs, k, r)?, at(rhs, c, k)?)))
                            .collect::<Result<Vec<_>, EvalError>>()?;
                        col.push(Constant::scalar(elem, dot(&pairs)?));
                    }
                    out.push(Constant::composite(column, col));
                }
                Ok(Constant::composite(ty, out))
            }
            (false, false) => Err(unsupported()),
        }
    }

    pub fn unary(&self, op: UnaryOp, ty: Idx, operand: &Constant) -> EvalResult {
        self.zip_map(ty, &[operand], &mut |el_ty, parts| {
            let value = parts[0];
            let unsupported = || EvalError::Unsupported(format!("operator {op}"));
            match (op, &value.value) {
                (UnaryOp::Not, ConstValue::Bool(v)) => Ok(Constant::bool(!v)),
                (UnaryOp::Negation, ConstValue::Number(v)) => match ops::negate(*v)? {
                    Some(s) => Ok(Constant::scalar(el_ty, s)),
                    None => Err(unsupported()),
                },
                (UnaryOp::Complement, ConstValue::Number(v)) => ops::complement(*v)
                    .map(|s| Constant::scalar(el_ty, s))
                    .ok_or_else(unsupported),
                _ => Err(unsupported()),
            }
        })
    }

    /// Apply `f` leaf-wise across `args`, broadcasting scalar arguments
    /// against composite ones. `f` receives the leaf result type.
    fn zip_map(
        &self,
        ty: Idx,
        args: &[&Constant],
        f: &mut dyn FnMut(Idx, &[&Constant]) -> EvalResult,
    ) -> EvalResult {
        let width = args.iter().find_map(|arg| match &arg.value {
            ConstValue::Composite(elements) => Some(elements.len()),
            _ => None,
        });
        let Some(width) = width else {
            return f(ty, args);
        };
        let elem = self.pool.elem_of(ty).unwrap_or(ty);
        let mut out = Vec::with_capacity(width);
        for i in 0..width {
            let parts: Vec<&Constant> = args
                .iter()
                .map(|&arg| match &arg.value {
                    ConstValue::Composite(elements) => elements.get(i).unwrap_or(arg),
                    _ => arg,
                })
                .collect();
            out.push(self.zip_map(elem, &parts, f)?);
        }
        Ok(Constant::composite(ty, out))
    }
}

/// Sum of products with overflow checks.
fn dot(pairs: &[(Scalar, Scalar)]) -> Result<Scalar, EvalError> {
    let Some(&(first, _)) = pairs.first() else {
        return Err(EvalError::Unsupported("empty dot product".to_string()));
    };
    let mut acc = Scalar::zero(first.kind());
    for &(a, b) in pairs {
        let product = ops::arith(BinaryOp::Multiply, a, b)?;
        acc = ops::arith(BinaryOp::Add, acc, product)?;
    }
    Ok(acc)
}

#[cfg(test)]
mod tests;
