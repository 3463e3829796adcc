#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use lumen_ir::{
    Access, BinaryOp, SamplerKind, StorageClass, StringInterner, TexelFormat, TextureDimension,
    UnaryOp,
};
use lumen_sem::{ArrayCount, BuiltinFn, Idx, ParamUsage, Pool};
use pretty_assertions::assert_eq;

use super::{CtorKind, CtorTarget, IntrinsicTable};
use crate::const_eval::CtorEval;

// ============================================================================
// Operators
// ============================================================================

#[test]
fn abstract_operands_prefer_the_cheapest_conversion() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();

    let mixed = table
        .binary(&mut pool, BinaryOp::Add, Idx::ABSTRACT_INT, Idx::ABSTRACT_FLOAT, false)
        .unwrap();
    assert_eq!(mixed.result, Idx::ABSTRACT_FLOAT);
    assert_eq!(mixed.lhs, Idx::ABSTRACT_FLOAT);

    let concrete = table
        .binary(&mut pool, BinaryOp::Multiply, Idx::I32, Idx::ABSTRACT_INT, false)
        .unwrap();
    assert_eq!(concrete.rhs, Idx::I32);
    assert_eq!(concrete.result, Idx::I32);
}

#[test]
fn vector_scalar_arithmetic_broadcasts() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();
    let v3f = pool.vector(Idx::F32, 3);

    let overload = table
        .binary(&mut pool, BinaryOp::Divide, v3f, Idx::ABSTRACT_FLOAT, false)
        .unwrap();
    assert_eq!(overload.lhs, v3f);
    assert_eq!(overload.rhs, Idx::F32);
    assert_eq!(overload.result, v3f);
}

#[test]
fn comparisons_yield_bool_vectors() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();
    let v2i = pool.vector(Idx::I32, 2);
    let v2b = pool.vector(Idx::BOOL, 2);

    let overload = table
        .binary(&mut pool, BinaryOp::LessThan, v2i, v2i, false)
        .unwrap();
    assert_eq!(overload.result, v2b);
}

#[test]
fn shift_right_operand_is_unsigned() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();

    let overload = table
        .binary(&mut pool, BinaryOp::ShiftLeft, Idx::I32, Idx::ABSTRACT_INT, false)
        .unwrap();
    assert_eq!(overload.rhs, Idx::U32);
    assert_eq!(overload.result, Idx::I32);

    let err = table
        .binary(&mut pool, BinaryOp::ShiftLeft, Idx::I32, Idx::I32, false)
        .unwrap_err();
    assert_eq!(err.message, "no matching overload for operator << (i32, i32)");
}

#[test]
fn matrix_vector_products() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();
    let m3x2 = pool.matrix(Idx::F32, 3, 2);
    let v3 = pool.vector(Idx::F32, 3);
    let v2 = pool.vector(Idx::F32, 2);

    let mv = table
        .binary(&mut pool, BinaryOp::Multiply, m3x2, v3, false)
        .unwrap();
    assert_eq!(mv.result, v2);

    let vm = table
        .binary(&mut pool, BinaryOp::Multiply, v2, m3x2, false)
        .unwrap();
    assert_eq!(vm.result, v3);

    let m2x3 = pool.matrix(Idx::F32, 2, 3);
    let m2x2 = pool.matrix(Idx::F32, 2, 2);
    let mm = table
        .binary(&mut pool, BinaryOp::Multiply, m3x2, m2x3, false)
        .unwrap();
    assert_eq!(mm.result, m2x2);

    assert!(table
        .binary(&mut pool, BinaryOp::Add, m3x2, m2x3, false)
        .is_err());
}

#[test]
fn failed_operator_lists_candidates() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();

    let err = table
        .binary(&mut pool, BinaryOp::LogicalAnd, Idx::I32, Idx::BOOL, false)
        .unwrap_err();
    assert_eq!(err.message, "no matching overload for operator && (i32, bool)");
    assert_eq!(err.detail(), "1 candidate operators");

    let v4f = pool.vector(Idx::F32, 4);
    let err = table
        .binary(&mut pool, BinaryOp::Add, v4f, Idx::BOOL, true)
        .unwrap_err();
    assert_eq!(err.message, "no matching overload for operator += (vec4<f32>, bool)");
    assert_eq!(err.detail(), "5 candidate operators");
}

#[test]
fn unary_operators() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();

    let neg = table
        .unary(&mut pool, UnaryOp::Negation, Idx::ABSTRACT_INT)
        .unwrap();
    assert_eq!(neg.result, Idx::ABSTRACT_INT);

    let err = table.unary(&mut pool, UnaryOp::Negation, Idx::U32).unwrap_err();
    assert_eq!(err.message, "no matching overload for operator - (u32)");

    let v3b = pool.vector(Idx::BOOL, 3);
    let not = table.unary(&mut pool, UnaryOp::Not, v3b).unwrap();
    assert_eq!(not.result, v3b);

    assert!(table.unary(&mut pool, UnaryOp::Complement, Idx::F32).is_err());
}

// ============================================================================
// Builtins
// ============================================================================

#[test]
fn numeric_builtins() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();

    let abs = table
        .builtin(&mut pool, BuiltinFn::Abs, &[Idx::ABSTRACT_INT])
        .unwrap();
    assert_eq!(abs.return_type, Idx::ABSTRACT_INT);
    assert!(abs.is_const);

    let v3f = pool.vector(Idx::F32, 3);
    let dot = table
        .builtin(&mut pool, BuiltinFn::Dot, &[v3f, v3f])
        .unwrap();
    assert_eq!(dot.return_type, Idx::F32);

    let select = table
        .builtin(&mut pool, BuiltinFn::Select, &[v3f, v3f, Idx::BOOL])
        .unwrap();
    assert_eq!(select.return_type, v3f);

    let dpdx = table
        .builtin(&mut pool, BuiltinFn::Dpdx, &[Idx::ABSTRACT_FLOAT])
        .unwrap();
    assert_eq!(dpdx.params[0].ty, Idx::F32);
    assert!(!dpdx.is_const);
}

#[test]
fn builtin_mismatch_message() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();

    let err = table
        .builtin(&mut pool, BuiltinFn::Length, &[Idx::I32])
        .unwrap_err();
    assert_eq!(err.message, "no matching call to length(i32)");
    assert_eq!(err.detail(), "2 candidate functions");
}

#[test]
fn texture_sample_tags_handle_parameters() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();
    let texture = pool.sampled_texture(TextureDimension::D2, Idx::F32);
    let sampler = pool.sampler(SamplerKind::Sampler);
    let coords = pool.vector(Idx::F32, 2);
    let v4f = pool.vector(Idx::F32, 4);

    let overload = table
        .builtin(&mut pool, BuiltinFn::TextureSample, &[texture, sampler, coords])
        .unwrap();
    assert_eq!(overload.return_type, v4f);
    assert_eq!(overload.params[0].usage, ParamUsage::Texture);
    assert_eq!(overload.params[1].usage, ParamUsage::Sampler);
    assert_eq!(overload.params[2].usage, ParamUsage::None);

    let arrayed = pool.sampled_texture(TextureDimension::D2Array, Idx::F32);
    assert!(table
        .builtin(&mut pool, BuiltinFn::TextureSample, &[arrayed, sampler, coords])
        .is_err());
    let with_layer = table
        .builtin(
            &mut pool,
            BuiltinFn::TextureSample,
            &[arrayed, sampler, coords, Idx::ABSTRACT_INT],
        )
        .unwrap();
    assert_eq!(with_layer.params[3].ty, Idx::I32);
}

#[test]
fn texture_store_requires_write_access() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();
    let coords = pool.vector(Idx::I32, 2);
    let texel = pool.vector(Idx::F32, 4);
    let writable =
        pool.storage_texture(TextureDimension::D2, TexelFormat::Rgba8Unorm, Access::Write);
    let readable =
        pool.storage_texture(TextureDimension::D2, TexelFormat::Rgba8Unorm, Access::Read);

    let store = table
        .builtin(&mut pool, BuiltinFn::TextureStore, &[writable, coords, texel])
        .unwrap();
    assert_eq!(store.return_type, Idx::VOID);
    assert!(table
        .builtin(&mut pool, BuiltinFn::TextureStore, &[readable, coords, texel])
        .is_err());
}

#[test]
fn atomics_and_array_length() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();
    let atomic = pool.atomic(Idx::U32);
    let ptr = pool.pointer(atomic, StorageClass::Workgroup, Access::ReadWrite);

    let add = table
        .builtin(&mut pool, BuiltinFn::AtomicAdd, &[ptr, Idx::ABSTRACT_INT])
        .unwrap();
    assert_eq!(add.return_type, Idx::U32);
    assert_eq!(add.params[1].ty, Idx::U32);

    let read_only = pool.pointer(atomic, StorageClass::Storage, Access::Read);
    assert!(table
        .builtin(&mut pool, BuiltinFn::AtomicLoad, &[read_only])
        .is_err());

    let runtime = pool.array_of(Idx::F32, ArrayCount::Runtime);
    let array_ptr = pool.pointer(runtime, StorageClass::Storage, Access::Read);
    let len = table
        .builtin(&mut pool, BuiltinFn::ArrayLength, &[array_ptr])
        .unwrap();
    assert_eq!(len.return_type, Idx::U32);
}

// ============================================================================
// Constructors
// ============================================================================

#[test]
fn scalar_construction_and_conversion() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();

    let identity = table
        .ctor_or_conv(&mut pool, CtorTarget::Scalar(Idx::F32), &[Idx::ABSTRACT_INT])
        .unwrap();
    assert_eq!(identity.eval, CtorEval::Identity);
    assert_eq!(identity.kind, CtorKind::Construct);

    let conv = table
        .ctor_or_conv(&mut pool, CtorTarget::Scalar(Idx::U32), &[Idx::F32])
        .unwrap();
    assert_eq!(conv.kind, CtorKind::Convert { from: Idx::F32 });
    assert_eq!(conv.eval, CtorEval::Conversion);

    let zero = table
        .ctor_or_conv(&mut pool, CtorTarget::Scalar(Idx::BOOL), &[])
        .unwrap();
    assert_eq!(zero.eval, CtorEval::Zero);
}

#[test]
fn vector_construction_infers_element_type() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();
    let target = CtorTarget::Vector {
        width: 3,
        elem: None,
    };

    let v3ai = pool.vector(Idx::ABSTRACT_INT, 3);
    let zero = table.ctor_or_conv(&mut pool, target, &[]).unwrap();
    assert_eq!(zero.ty, v3ai);

    let v3f = pool.vector(Idx::F32, 3);
    let splat = table
        .ctor_or_conv(&mut pool, target, &[Idx::F32])
        .unwrap();
    assert_eq!(splat.ty, v3f);
    assert_eq!(splat.eval, CtorEval::Splat);

    let v2f = pool.vector(Idx::F32, 2);
    let compose = table
        .ctor_or_conv(&mut pool, target, &[v2f, Idx::ABSTRACT_FLOAT])
        .unwrap();
    assert_eq!(compose.ty, v3f);
    assert_eq!(compose.eval, CtorEval::Compose);
    assert_eq!(compose.params.as_slice(), &[v2f, Idx::F32]);

    let v3i = pool.vector(Idx::I32, 3);
    let conv = table
        .ctor_or_conv(
            &mut pool,
            CtorTarget::Vector {
                width: 3,
                elem: Some(Idx::F32),
            },
            &[v3i],
        )
        .unwrap();
    assert_eq!(conv.kind, CtorKind::Convert { from: v3i });
}

#[test]
fn vector_construction_rejects_wrong_width() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();
    let v2f = pool.vector(Idx::F32, 2);

    let err = table
        .ctor_or_conv(
            &mut pool,
            CtorTarget::Vector {
                width: 4,
                elem: Some(Idx::F32),
            },
            &[v2f, Idx::F32],
        )
        .unwrap_err();
    assert_eq!(err.message, "no matching constructor for vec4<f32>(vec2<f32>, f32)");
    assert_eq!(err.detail(), "5 candidate constructors");

    let err = table
        .ctor_or_conv(
            &mut pool,
            CtorTarget::Vector {
                width: 2,
                elem: None,
            },
            &[Idx::BOOL, Idx::I32],
        )
        .unwrap_err();
    assert_eq!(err.message, "no matching constructor for vec2(bool, i32)");
}

#[test]
fn matrix_construction() {
    let interner = StringInterner::new();
    let table = IntrinsicTable::new(&interner);
    let mut pool = Pool::new();
    let target = CtorTarget::Matrix {
        columns: 2,
        rows: 2,
        elem: None,
    };

    let m2x2af = pool.matrix(Idx::ABSTRACT_FLOAT, 2, 2);
    let scalars = table
        .ctor_or_conv(&mut pool, target, &[Idx::ABSTRACT_INT; 4])
        .unwrap();
    assert_eq!(scalars.ty, m2x2af);
    assert_eq!(scalars.eval, CtorEval::MatrixScalars);

    let v2f = pool.vector(Idx::F32, 2);
    let m2x2f = pool.matrix(Idx::F32, 2, 2);
    let columns = table
        .ctor_or_conv(&mut pool, target, &[v2f, v2f])
        .unwrap();
    assert_eq!(columns.ty, m2x2f);
    assert_eq!(columns.eval, CtorEval::Compose);

    assert!(table
        .ctor_or_conv(&mut pool, target, &[Idx::I32; 4])
        .is_err());
}
