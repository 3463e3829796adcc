//! Scalar arithmetic for constant evaluation.

use lumen_ir::BinaryOp;
use lumen_sem::{Number, Scalar, AFloat, AInt, F16, F32, I32, U32};

use super::EvalError;

/// Apply `$body` to two scalars of the same kind, re-wrapping the result.
macro_rules! same_kind {
    ($a:expr, $b:expr, |$x:ident, $y:ident| $body:expr) => {
        match ($a, $b) {
            (Scalar::I32($x), Scalar::I32($y)) => $body.map(Scalar::I32),
            (Scalar::U32($x), Scalar::U32($y)) => $body.map(Scalar::U32),
            (Scalar::F32($x), Scalar::F32($y)) => $body.map(Scalar::F32),
            (Scalar::F16($x), Scalar::F16($y)) => $body.map(Scalar::F16),
            (Scalar::AInt($x), Scalar::AInt($y)) => $body.map(Scalar::AInt),
            (Scalar::AFloat($x), Scalar::AFloat($y)) => $body.map(Scalar::AFloat),
            _ => None,
        }
    };
}

/// Integer bitwise operator on two integers of the same kind.
macro_rules! bitwise {
    ($a:expr, $b:expr, $op:tt) => {
        match ($a, $b) {
            (Scalar::I32(x), Scalar::I32(y)) => Some(Scalar::I32(I32(x.0 $op y.0))),
            (Scalar::U32(x), Scalar::U32(y)) => Some(Scalar::U32(U32(x.0 $op y.0))),
            (Scalar::AInt(x), Scalar::AInt(y)) => Some(Scalar::AInt(AInt(x.0 $op y.0))),
            _ => None,
        }
    };
}

fn overflow(op: BinaryOp, a: Scalar, b: Scalar) -> EvalError {
    EvalError::Overflow {
        lhs: a.to_string(),
        op: op.as_symbol(),
        rhs: b.to_string(),
        ty: a.kind().name(),
    }
}

fn unary_overflow(expr: String, a: Scalar) -> EvalError {
    EvalError::UnaryOverflow {
        expr,
        ty: a.kind().name(),
    }
}

fn unsupported(op: BinaryOp, a: Scalar) -> EvalError {
    EvalError::Unsupported(format!("operator {op} on '{}'", a.kind().name()))
}

/// Arithmetic, bitwise and shift operators.
pub(super) fn arith(op: BinaryOp, a: Scalar, b: Scalar) -> Result<Scalar, EvalError> {
    let result = match op {
        BinaryOp::Add => same_kind!(a, b, |x, y| x.checked_add(y)),
        BinaryOp::Subtract => same_kind!(a, b, |x, y| x.checked_sub(y)),
        BinaryOp::Multiply => same_kind!(a, b, |x, y| x.checked_mul(y)),
        BinaryOp::Divide | BinaryOp::Modulo => {
            if b.is_zero() && !a.kind().is_float() {
                return Err(EvalError::DivisionByZero);
            }
            if op == BinaryOp::Divide {
                same_kind!(a, b, |x, y| x.checked_div(y))
            } else {
                same_kind!(a, b, |x, y| x.checked_rem(y))
            }
        }
        BinaryOp::And => bitwise!(a, b, &),
        BinaryOp::Or => bitwise!(a, b, |),
        BinaryOp::Xor => bitwise!(a, b, ^),
        BinaryOp::ShiftLeft | BinaryOp::ShiftRight => return shift(op, a, b),
        _ => return Err(unsupported(op, a)),
    };
    result.ok_or_else(|| overflow(op, a, b))
}

fn shift(op: BinaryOp, a: Scalar, b: Scalar) -> Result<Scalar, EvalError> {
    let left = op == BinaryOp::ShiftLeft;
    let amount = b
        .to_i64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| unsupported(op, b))?;
    let too_large = |width: u32| EvalError::ShiftTooLarge {
        direction: if left { "left" } else { "right" },
        width,
    };
    match a {
        Scalar::I32(x) => {
            if amount >= 32 {
                return Err(too_large(32));
            }
            Ok(Scalar::I32(I32(if left { x.0 << amount } else { x.0 >> amount })))
        }
        Scalar::U32(x) => {
            if amount >= 32 {
                return Err(too_large(32));
            }
            Ok(Scalar::U32(U32(if left { x.0 << amount } else { x.0 >> amount })))
        }
        Scalar::AInt(x) => {
            if amount >= 64 {
                return Err(too_large(64));
            }
            if !left {
                return Ok(Scalar::AInt(AInt(x.0 >> amount)));
            }
            let shifted = x.0 << amount;
            // Bits shifted out of an abstract integer are an overflow.
            if shifted >> amount == x.0 {
                Ok(Scalar::AInt(AInt(shifted)))
            } else {
                Err(overflow(op, a, b))
            }
        }
        _ => Err(unsupported(op, a)),
    }
}

/// Comparison operators. NaN compares unequal to everything.
pub(super) fn compare(op: BinaryOp, a: Scalar, b: Scalar) -> bool {
    use std::cmp::Ordering;

    let ordering = match (a.to_i64(), b.to_i64()) {
        (Some(x), Some(y)) => Some(x.cmp(&y)),
        _ => a.to_f64().partial_cmp(&b.to_f64()),
    };
    match op {
        BinaryOp::Equal => ordering == Some(Ordering::Equal),
        BinaryOp::NotEqual => ordering != Some(Ordering::Equal),
        BinaryOp::LessThan => ordering == Some(Ordering::Less),
        BinaryOp::GreaterThan => ordering == Some(Ordering::Greater),
        BinaryOp::LessThanEqual => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::GreaterThanEqual => {
            matches!(ordering, Some(Ordering::Greater | Ordering::Equal))
        }
        _ => false,
    }
}

/// `-a`. Concrete signed integers wrap: negating the lowest value yields
/// itself. Abstract integers have no wider type to wrap into.
pub(super) fn negate(a: Scalar) -> Result<Option<Scalar>, EvalError> {
    Ok(Some(match a {
        Scalar::I32(x) => Scalar::I32(I32(x.0.wrapping_neg())),
        Scalar::AInt(x) => Scalar::AInt(AInt(
            x.0.checked_neg().ok_or_else(|| unary_overflow(format!("-({a})"), a))?,
        )),
        Scalar::F32(x) => Scalar::F32(F32(-x.0)),
        Scalar::F16(x) => Scalar::F16(F16::new(-x.value())),
        Scalar::AFloat(x) => Scalar::AFloat(AFloat(-x.0)),
        Scalar::U32(_) => return Ok(None),
    }))
}

/// `~a`
pub(super) fn complement(a: Scalar) -> Option<Scalar> {
    match a {
        Scalar::I32(x) => Some(Scalar::I32(I32(!x.0))),
        Scalar::U32(x) => Some(Scalar::U32(U32(!x.0))),
        Scalar::AInt(x) => Some(Scalar::AInt(AInt(!x.0))),
        _ => None,
    }
}

pub(super) fn abs(a: Scalar) -> Result<Scalar, EvalError> {
    Ok(match a {
        Scalar::I32(x) => Scalar::I32(I32(x.0.wrapping_abs())),
        Scalar::AInt(x) => Scalar::AInt(AInt(
            x.0.checked_abs().ok_or_else(|| unary_overflow(format!("abs({a})"), a))?,
        )),
        Scalar::F32(x) => Scalar::F32(F32(x.0.abs())),
        Scalar::F16(x) => Scalar::F16(F16::new(x.value().abs())),
        Scalar::AFloat(x) => Scalar::AFloat(AFloat(x.0.abs())),
        Scalar::U32(_) => a,
    })
}

pub(super) fn min(a: Scalar, b: Scalar) -> Scalar {
    if compare(BinaryOp::LessThan, b, a) {
        b
    } else {
        a
    }
}

pub(super) fn max(a: Scalar, b: Scalar) -> Scalar {
    if compare(BinaryOp::GreaterThan, b, a) {
        b
    } else {
        a
    }
}
