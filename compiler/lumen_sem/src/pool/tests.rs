use lumen_ir::{Access, StorageClass, StringInterner, TextureDimension};
use pretty_assertions::assert_eq;

use super::*;

#[test]
fn primitives_at_fixed_indices() {
    let pool = Pool::new();
    assert_eq!(pool.kind(Idx::VOID), TypeKind::Void);
    assert_eq!(pool.kind(Idx::I32), TypeKind::I32);
    assert_eq!(pool.kind(Idx::ABSTRACT_FLOAT), TypeKind::AbstractFloat);
    assert_eq!(
        pool.kind(Idx::SAMPLER_COMPARISON),
        TypeKind::Sampler(SamplerKind::Comparison)
    );
    assert_eq!(pool.len(), Idx::PRIMITIVE_COUNT as usize);
}

#[test]
fn interning_deduplicates() {
    let mut pool = Pool::new();
    let a = pool.vector(Idx::F32, 3);
    let b = pool.vector(Idx::F32, 3);
    let c = pool.vector(Idx::F32, 4);
    assert_eq!(a, b);
    assert_ne!(a, c);
    let m1 = pool.matrix(Idx::F32, 2, 3);
    let m2 = pool.matrix(Idx::F32, 2, 3);
    assert_eq!(m1, m2);
}

#[test]
fn scalar_and_vector_layout() {
    let mut pool = Pool::new();
    assert_eq!((pool.size(Idx::F32), pool.align(Idx::F32)), (4, 4));
    assert_eq!((pool.size(Idx::F16), pool.align(Idx::F16)), (2, 2));
    let v2 = pool.vector(Idx::F32, 2);
    let v3 = pool.vector(Idx::F32, 3);
    let v4 = pool.vector(Idx::F32, 4);
    assert_eq!((pool.size(v2), pool.align(v2)), (8, 8));
    assert_eq!((pool.size(v3), pool.align(v3)), (12, 16));
    assert_eq!((pool.size(v4), pool.align(v4)), (16, 16));
    let h3 = pool.vector(Idx::F16, 3);
    assert_eq!((pool.size(h3), pool.align(h3)), (6, 8));
}

#[test]
fn matrix_layout_is_array_of_columns() {
    let mut pool = Pool::new();
    let m = pool.matrix(Idx::F32, 2, 3);
    assert_eq!(pool.align(m), 16);
    assert_eq!(pool.size(m), 32);
    let m = pool.matrix(Idx::F32, 4, 2);
    assert_eq!(pool.align(m), 8);
    assert_eq!(pool.size(m), 32);
}

#[test]
fn array_stride_follows_element_layout() {
    let mut pool = Pool::new();
    let layout = pool.array_layout(Idx::F32, ArrayCount::Constant(4), None);
    assert_eq!(layout.stride, 4);
    assert_eq!(layout.size, 16);

    let v3 = pool.vector(Idx::F32, 3);
    let layout = pool.array_layout(v3, ArrayCount::Constant(2), None);
    assert_eq!(layout.implicit_stride, 16);
    assert_eq!(layout.size, 32);
    assert_eq!(layout.align, 16);

    let layout = pool.array_layout(Idx::F32, ArrayCount::Constant(4), Some(16));
    assert_eq!((layout.stride, layout.implicit_stride, layout.size), (16, 4, 64));

    let layout = pool.array_layout(Idx::F32, ArrayCount::Runtime, None);
    assert_eq!(layout.size, 4);
}

#[test]
fn array_flags() {
    let mut pool = Pool::new();
    let fixed = pool.array_of(Idx::F32, ArrayCount::Constant(4));
    let runtime = pool.array_of(Idx::F32, ArrayCount::Runtime);
    assert!(pool.is_constructible(fixed));
    assert!(!pool.is_constructible(runtime));
    assert!(pool.is_runtime_array(runtime));
    assert!(pool.flags(runtime).contains(TypeFlags::HAS_RUNTIME_ARRAY));
    assert!(pool.is_host_shareable(runtime));

    let atomic = pool.atomic(Idx::U32);
    let atomics = pool.array_of(atomic, ArrayCount::Constant(2));
    assert!(!pool.is_constructible(atomics));
    assert!(pool.flags(atomics).contains(TypeFlags::HAS_ATOMIC));
}

#[test]
fn bool_is_not_host_shareable() {
    let mut pool = Pool::new();
    assert!(!pool.is_host_shareable(Idx::BOOL));
    let bv = pool.vector(Idx::BOOL, 2);
    assert!(!pool.is_host_shareable(bv));
    assert!(pool.is_constructible(bv));
}

#[test]
fn struct_flags_and_usage() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let atomic = pool.atomic(Idx::I32);
    let member = |name: &str, ty: Idx, index: u32| StructMember {
        decl: MemberId::new(index),
        name: interner.intern(name),
        ty,
        index,
        offset: 4 * index,
        align: 4,
        size: 4,
        span: Span::DUMMY,
    };
    let st = StructType::new(
        StructDeclId::new(0),
        interner.intern("S"),
        vec![member("a", Idx::F32, 0), member("b", atomic, 1)],
        4,
        8,
        8,
        Span::DUMMY,
    );
    let idx = pool.add_struct(st);
    assert!(!pool.is_constructible(idx));
    assert!(pool.is_host_shareable(idx));
    assert!(pool.flags(idx).contains(TypeFlags::HAS_ATOMIC));
    assert_eq!(pool.size(idx), 8);
    assert_eq!(pool.display(idx, &interner), "S");

    let id = pool.struct_id(idx).unwrap_or_else(|| panic!("not a struct"));
    assert!(pool.struct_type_mut(id).add_usage(StorageClass::Storage));
    assert!(!pool.struct_type_mut(id).add_usage(StorageClass::Storage));
    assert!(pool.struct_type(id).is_used_in(StorageClass::Storage));
    assert_eq!(
        pool.struct_type(id)
            .find_member(interner.intern("b"))
            .map(|m| m.index),
        Some(1)
    );
}

#[test]
fn conversion_ranks() {
    let mut pool = Pool::new();
    assert_eq!(pool.conversion_rank(Idx::F32, Idx::F32), Some(0));
    assert_eq!(pool.conversion_rank(Idx::ABSTRACT_FLOAT, Idx::F32), Some(1));
    assert_eq!(pool.conversion_rank(Idx::ABSTRACT_INT, Idx::I32), Some(3));
    assert_eq!(pool.conversion_rank(Idx::ABSTRACT_INT, Idx::F16), Some(7));
    assert_eq!(pool.conversion_rank(Idx::ABSTRACT_FLOAT, Idx::I32), None);
    assert_eq!(pool.conversion_rank(Idx::I32, Idx::U32), None);

    let av = pool.vector(Idx::ABSTRACT_INT, 3);
    let uv = pool.vector(Idx::U32, 3);
    let uv2 = pool.vector(Idx::U32, 2);
    assert_eq!(pool.conversion_rank(av, uv), Some(4));
    assert_eq!(pool.conversion_rank(av, uv2), None);
}

#[test]
fn common_type() {
    let pool = Pool::new();
    assert_eq!(
        pool.common(&[Idx::ABSTRACT_INT, Idx::ABSTRACT_FLOAT]),
        Some(Idx::ABSTRACT_FLOAT)
    );
    assert_eq!(pool.common(&[Idx::ABSTRACT_INT, Idx::U32]), Some(Idx::U32));
    assert_eq!(pool.common(&[Idx::I32, Idx::U32]), None);
    assert_eq!(pool.common(&[]), None);
}

#[test]
fn concrete_defaults() {
    let mut pool = Pool::new();
    assert_eq!(pool.concrete(Idx::ABSTRACT_INT), Idx::I32);
    assert_eq!(pool.concrete(Idx::ABSTRACT_FLOAT), Idx::F32);
    assert_eq!(pool.concrete(Idx::U32), Idx::U32);
    let av = pool.vector(Idx::ABSTRACT_FLOAT, 2);
    let fv = pool.vector(Idx::F32, 2);
    assert_eq!(pool.concrete(av), fv);
    let arr = pool.array_of(Idx::ABSTRACT_INT, ArrayCount::Constant(3));
    let concrete = pool.concrete(arr);
    assert_eq!(pool.display(concrete, &StringInterner::new()), "array<i32, 3>");
    assert_eq!(pool.size(concrete), 12);
}

#[test]
fn deepest_element_and_rebuild() {
    let mut pool = Pool::new();
    let m = pool.matrix(Idx::F32, 3, 3);
    let arr = pool.array_of(m, ArrayCount::Constant(2));
    assert_eq!(pool.deepest_element(arr), Idx::F32);
    let h = pool.with_deepest_element(arr, Idx::F16);
    let hm = pool.matrix(Idx::F16, 3, 3);
    assert_eq!(pool.elem_of(h), Some(hm));
    assert_eq!(pool.element_count(h), Some(2));
}

#[test]
fn display_names() {
    let interner = StringInterner::new();
    let mut pool = Pool::new();
    let v = pool.vector(Idx::F32, 3);
    let m = pool.matrix(Idx::F16, 2, 4);
    let p = pool.pointer(Idx::I32, StorageClass::Function, Access::ReadWrite);
    let r = pool.reference(v, StorageClass::Storage, Access::Read);
    let t = pool.sampled_texture(TextureDimension::D2, Idx::F32);
    let layout = pool.array_layout(Idx::F32, ArrayCount::Constant(4), Some(16));
    let strided = pool.array(Idx::F32, ArrayCount::Constant(4), layout);
    assert_eq!(pool.display(v, &interner), "vec3<f32>");
    assert_eq!(pool.display(m, &interner), "mat2x4<f16>");
    assert_eq!(pool.display(p, &interner), "ptr<function, i32, read_write>");
    assert_eq!(pool.display(r, &interner), "ref<storage, vec3<f32>, read>");
    assert_eq!(pool.display(t, &interner), "texture_2d<f32>");
    assert_eq!(pool.display(strided, &interner), "@stride(16) array<f32, 4>");
    assert_eq!(pool.display(Idx::ABSTRACT_INT, &interner), "abstract-int");
}

#[test]
fn round_up_values() {
    assert_eq!(round_up(16, 4), 16);
    assert_eq!(round_up(4, 4), 4);
    assert_eq!(round_up(16, 17), 32);
    assert_eq!(round_up(0, 5), 5);
    assert_eq!(round_up_u64(16, 0x1_0000_0001), 0x1_0000_0010);
}
