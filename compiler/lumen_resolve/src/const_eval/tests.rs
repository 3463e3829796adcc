#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use lumen_ir::{BinaryOp, FloatSuffix, IntSuffix, Literal, StringInterner, UnaryOp};
use lumen_sem::{AFloat, AInt, BuiltinFn, Constant, Idx, Pool, F32, I32, U32};
use pretty_assertions::assert_eq;

use super::{check_index, literal, ConstEval, CtorEval, EvalError};

fn i32_vec(pool: &mut Pool, values: &[i32]) -> Constant {
    let width = u32::try_from(values.len()).unwrap();
    let ty = pool.vector(Idx::I32, width);
    Constant::composite(
        ty,
        values.iter().map(|&v| Constant::scalar(Idx::I32, I32(v))).collect(),
    )
}

fn f32_vec(pool: &mut Pool, values: &[f32]) -> Constant {
    let width = u32::try_from(values.len()).unwrap();
    let ty = pool.vector(Idx::F32, width);
    Constant::composite(
        ty,
        values.iter().map(|&v| Constant::scalar(Idx::F32, F32(v))).collect(),
    )
}

fn i32_leaves(value: &Constant) -> Vec<i64> {
    value.elements().iter().map(|e| e.as_i64().unwrap()).collect()
}

fn f32_leaves(value: &Constant) -> Vec<f64> {
    value
        .elements()
        .iter()
        .map(|e| e.as_scalar().unwrap().to_f64())
        .collect()
}

// ============================================================================
// Literals and Conversion
// ============================================================================

#[test]
fn test_unsuffixed_literals_are_abstract() {
    let (ty, value) = literal(Literal::Int {
        value: 5_000_000_000,
        suffix: IntSuffix::None,
    })
    .unwrap();
    assert_eq!(ty, Idx::ABSTRACT_INT);
    assert_eq!(value.as_i64(), Some(5_000_000_000));

    let (ty, _) = literal(Literal::float(1.5, FloatSuffix::None)).unwrap();
    assert_eq!(ty, Idx::ABSTRACT_FLOAT);
}

#[test]
fn test_suffixed_literal_out_of_range() {
    let err = literal(Literal::Int {
        value: 3_000_000_000,
        suffix: IntSuffix::I,
    })
    .unwrap_err();
    assert_eq!(
        err.to_string(),
        "value 3000000000 cannot be represented as 'i32'"
    );
}

#[test]
fn test_convert_checks_range() {
    let interner = StringInterner::new();
    let pool = Pool::new();
    let eval = ConstEval::new(&pool, &interner);

    let value = Constant::scalar(Idx::ABSTRACT_INT, AInt(-1));
    let err = eval.convert(&value, Idx::U32).unwrap_err();
    assert_eq!(err.to_string(), "value -1 cannot be represented as 'u32'");

    let value = Constant::scalar(Idx::ABSTRACT_FLOAT, AFloat(2.75));
    assert_eq!(eval.convert(&value, Idx::I32).unwrap().as_i64(), Some(2));

    let value = Constant::scalar(Idx::I32, I32(0));
    assert_eq!(eval.convert(&value, Idx::BOOL).unwrap().as_bool(), Some(false));
}

#[test]
fn test_convert_vector_element_wise() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let abstract_vec = pool.vector(Idx::ABSTRACT_INT, 2);
    let target = pool.vector(Idx::F32, 2);
    let eval = ConstEval::new(&pool, &interner);

    let value = Constant::composite(
        abstract_vec,
        vec![
            Constant::scalar(Idx::ABSTRACT_INT, AInt(1)),
            Constant::scalar(Idx::ABSTRACT_INT, AInt(2)),
        ],
    );
    let converted = eval.convert(&value, target).unwrap();
    assert_eq!(converted.ty, target);
    assert_eq!(f32_leaves(&converted), vec![1.0, 2.0]);
    assert_eq!(converted.elements()[0].ty, Idx::F32);
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_integer_overflow_is_an_error() {
    let interner = StringInterner::new();
    let pool = Pool::new();
    let eval = ConstEval::new(&pool, &interner);

    let lhs = Constant::scalar(Idx::I32, I32(i32::MAX));
    let rhs = Constant::scalar(Idx::I32, I32(1));
    let err = eval.binary(BinaryOp::Add, Idx::I32, &lhs, &rhs).unwrap_err();
    assert_eq!(
        err.to_string(),
        "'2147483647 + 1' cannot be represented as 'i32'"
    );
}

#[test]
fn test_division_by_zero() {
    let interner = StringInterner::new();
    let pool = Pool::new();
    let eval = ConstEval::new(&pool, &interner);

    let lhs = Constant::scalar(Idx::U32, U32(4));
    let rhs = Constant::scalar(Idx::U32, U32(0));
    assert_eq!(
        eval.binary(BinaryOp::Modulo, Idx::U32, &lhs, &rhs),
        Err(EvalError::DivisionByZero)
    );

    let lhs = Constant::scalar(Idx::F32, F32(1.0));
    let rhs = Constant::scalar(Idx::F32, F32(0.0));
    let err = eval.binary(BinaryOp::Divide, Idx::F32, &lhs, &rhs).unwrap_err();
    assert_eq!(err.to_string(), "'1.0 / 0.0' cannot be represented as 'f32'");
}

#[test]
fn test_vector_scalar_broadcast() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let lhs = i32_vec(&mut pool, &[1, 2, 3]);
    let eval = ConstEval::new(&pool, &interner);

    let rhs = Constant::scalar(Idx::I32, I32(2));
    let product = eval.binary(BinaryOp::Multiply, lhs.ty, &lhs, &rhs).unwrap();
    assert_eq!(i32_leaves(&product), vec![2, 4, 6]);
}

#[test]
fn test_vector_comparison() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let lhs = i32_vec(&mut pool, &[1, 5]);
    let rhs = i32_vec(&mut pool, &[3, 3]);
    let bool2 = pool.vector(Idx::BOOL, 2);
    let eval = ConstEval::new(&pool, &interner);

    let result = eval.binary(BinaryOp::LessThan, bool2, &lhs, &rhs).unwrap();
    let leaves: Vec<_> = result.elements().iter().map(|e| e.as_bool().unwrap()).collect();
    assert_eq!(leaves, vec![true, false]);
}

#[test]
fn test_shift_amount_is_checked() {
    let interner = StringInterner::new();
    let pool = Pool::new();
    let eval = ConstEval::new(&pool, &interner);

    let lhs = Constant::scalar(Idx::I32, I32(1));
    let rhs = Constant::scalar(Idx::U32, U32(32));
    let err = eval
        .binary(BinaryOp::ShiftLeft, Idx::I32, &lhs, &rhs)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "shift left value must be less than the bit width of the lhs, which is 32"
    );

    let rhs = Constant::scalar(Idx::U32, U32(4));
    let shifted = eval.binary(BinaryOp::ShiftLeft, Idx::I32, &lhs, &rhs).unwrap();
    assert_eq!(shifted.as_i64(), Some(16));
}

#[test]
fn test_negation_and_complement() {
    let interner = StringInterner::new();
    let pool = Pool::new();
    let eval = ConstEval::new(&pool, &interner);

    let value = Constant::scalar(Idx::ABSTRACT_INT, AInt(7));
    let negated = eval.unary(UnaryOp::Negation, Idx::ABSTRACT_INT, &value).unwrap();
    assert_eq!(negated.as_i64(), Some(-7));

    let value = Constant::scalar(Idx::U32, U32(0));
    let complemented = eval.unary(UnaryOp::Complement, Idx::U32, &value).unwrap();
    assert_eq!(complemented.as_i64(), Some(i64::from(u32::MAX)));

    let value = Constant::bool(true);
    assert_eq!(
        eval.unary(UnaryOp::Not, Idx::BOOL, &value).unwrap().as_bool(),
        Some(false)
    );
}

#[test]
fn test_abstract_int_negation_overflows() {
    let interner = StringInterner::new();
    let pool = Pool::new();
    let eval = ConstEval::new(&pool, &interner);

    let lowest = Constant::scalar(Idx::ABSTRACT_INT, AInt(i64::MIN));
    let err = eval
        .unary(UnaryOp::Negation, Idx::ABSTRACT_INT, &lowest)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "'-(-9223372036854775808)' cannot be represented as 'abstract-int'"
    );

    let err = eval
        .builtin(BuiltinFn::Abs, Idx::ABSTRACT_INT, &[lowest])
        .unwrap_err();
    assert!(matches!(err, EvalError::UnaryOverflow { .. }));

    // Concrete i32 wraps.
    let lowest = Constant::scalar(Idx::I32, I32(i32::MIN));
    let negated = eval.unary(UnaryOp::Negation, Idx::I32, &lowest).unwrap();
    assert_eq!(negated.as_i64(), Some(i64::from(i32::MIN)));
}

#[test]
fn test_matrix_vector_product() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let mat = pool.matrix(Idx::F32, 2, 2);
    let col0 = f32_vec(&mut pool, &[1.0, 2.0]);
    let col1 = f32_vec(&mut pool, &[3.0, 4.0]);
    let m = Constant::composite(mat, vec![col0, col1]);
    let v = f32_vec(&mut pool, &[1.0, 1.0]);
    let eval = ConstEval::new(&pool, &interner);

    // Columns (1, 2) and (3, 4): m * (1, 1) = (4, 6), (1, 1) * m = (3, 7).
    let mv = eval.binary(BinaryOp::Multiply, v.ty, &m, &v).unwrap();
    assert_eq!(f32_leaves(&mv), vec![4.0, 6.0]);
    let vm = eval.binary(BinaryOp::Multiply, v.ty, &v, &m).unwrap();
    assert_eq!(f32_leaves(&vm), vec![3.0, 7.0]);
}

// ============================================================================
// Access and Construction
// ============================================================================

#[test]
fn test_index_bounds() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let v = i32_vec(&mut pool, &[10, 20, 30]);
    let eval = ConstEval::new(&pool, &interner);

    assert_eq!(eval.index(&v, 1).unwrap().as_i64(), Some(20));
    assert_eq!(
        eval.index(&v, 3).unwrap_err().to_string(),
        "index 3 out of bounds [0..2]"
    );
    assert_eq!(
        check_index(4, -1),
        Err(EvalError::IndexOutOfBounds { index: -1, max: 3 })
    );
}

#[test]
fn test_swizzle() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let v = i32_vec(&mut pool, &[10, 20, 30]);
    let ty2 = pool.vector(Idx::I32, 2);
    let eval = ConstEval::new(&pool, &interner);

    let zx = eval.swizzle(ty2, &v, &[2, 0]).unwrap();
    assert_eq!(i32_leaves(&zx), vec![30, 10]);
    let y = eval.swizzle(Idx::I32, &v, &[1]).unwrap();
    assert_eq!(y.as_i64(), Some(20));
}

#[test]
fn test_constructors() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let vec4 = pool.vector(Idx::I32, 4);
    let head = i32_vec(&mut pool, &[1, 2]);
    let mat = pool.matrix(Idx::F32, 2, 2);
    let eval = ConstEval::new(&pool, &interner);

    let splat = eval
        .construct(CtorEval::Splat, vec4, &[Constant::scalar(Idx::I32, I32(7))])
        .unwrap();
    assert_eq!(i32_leaves(&splat), vec![7, 7, 7, 7]);

    let tail = [
        Constant::scalar(Idx::I32, I32(3)),
        Constant::scalar(Idx::I32, I32(4)),
    ];
    let composed = eval
        .construct(CtorEval::Compose, vec4, &[head, tail[0].clone(), tail[1].clone()])
        .unwrap();
    assert_eq!(i32_leaves(&composed), vec![1, 2, 3, 4]);

    let scalars: Vec<_> = [1.0f32, 2.0, 3.0, 4.0]
        .iter()
        .map(|&v| Constant::scalar(Idx::F32, F32(v)))
        .collect();
    let m = eval.construct(CtorEval::MatrixScalars, mat, &scalars).unwrap();
    assert_eq!(f32_leaves(&m.elements()[1]), vec![3.0, 4.0]);

    let zero = eval.construct(CtorEval::Zero, mat, &[]).unwrap();
    assert!(zero.all_zero());
}

// ============================================================================
// Builtins
// ============================================================================

#[test]
fn test_const_builtins() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let a = i32_vec(&mut pool, &[-3, 4]);
    let b = i32_vec(&mut pool, &[2, 2]);
    let eval = ConstEval::new(&pool, &interner);

    let abs = eval.builtin(BuiltinFn::Abs, a.ty, &[a.clone()]).unwrap().unwrap();
    assert_eq!(i32_leaves(&abs), vec![3, 4]);

    let dot = eval
        .builtin(BuiltinFn::Dot, Idx::I32, &[a.clone(), b.clone()])
        .unwrap()
        .unwrap();
    assert_eq!(dot.as_i64(), Some(2));

    let low = Constant::scalar(Idx::I32, I32(0));
    let high = Constant::scalar(Idx::I32, I32(3));
    let clamped = eval
        .builtin(
            BuiltinFn::Clamp,
            Idx::I32,
            &[Constant::scalar(Idx::I32, I32(9)), low, high],
        )
        .unwrap()
        .unwrap();
    assert_eq!(clamped.as_i64(), Some(3));

    let selected = eval
        .builtin(BuiltinFn::Select, a.ty, &[a, b, Constant::bool(true)])
        .unwrap()
        .unwrap();
    assert_eq!(i32_leaves(&selected), vec![2, 2]);
}

#[test]
fn test_runtime_builtins_have_no_value() {
    let interner = StringInterner::new();
    let pool = Pool::new();
    let eval = ConstEval::new(&pool, &interner);
    let arg = Constant::scalar(Idx::F32, F32(1.0));
    assert_eq!(eval.builtin(BuiltinFn::Dpdx, Idx::F32, &[arg]).unwrap(), None);
}
