//! Property-based tests for struct memory layout.

#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use lumen_ir::{AstBuilder, StringInterner, TypeExprId};
use lumen_resolve::{resolve, ResolverOptions};
use proptest::prelude::*;

/// Member types with distinct size and alignment.
#[derive(Copy, Clone, Debug)]
enum Member {
    F32,
    Vec2,
    Vec3,
    Vec4,
    Mat3x3,
    ArrayOfVec3,
}

fn arb_member() -> impl Strategy<Value = Member> {
    prop_oneof![
        Just(Member::F32),
        Just(Member::Vec2),
        Just(Member::Vec3),
        Just(Member::Vec4),
        Just(Member::Mat3x3),
        Just(Member::ArrayOfVec3),
    ]
}

fn build(b: &AstBuilder<'_>, member: Member) -> TypeExprId {
    match member {
        Member::F32 => b.ty_f32(),
        Member::Vec2 => b.ty_vec(2, b.ty_f32()),
        Member::Vec3 => b.ty_vec(3, b.ty_f32()),
        Member::Vec4 => b.ty_vec(4, b.ty_f32()),
        Member::Mat3x3 => b.ty_mat(3, 3, b.ty_f32()),
        Member::ArrayOfVec3 => b.ty_array(b.ty_vec(3, b.ty_f32()), b.lit_int(2)),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn members_are_aligned_and_disjoint(members in prop::collection::vec(arb_member(), 1..8)) {
        let interner = StringInterner::new();
        let b = AstBuilder::new(&interner);
        let decl_members = members
            .iter()
            .enumerate()
            .map(|(i, &m)| b.struct_member(&format!("m{i}"), build(&b, m), vec![]))
            .collect();
        let s = b.structure("S", decl_members);
        let module = b.finish();

        let program = resolve(&module, &interner, &ResolverOptions::default()).unwrap();
        let st = program.struct_type(s).unwrap();

        let mut end = 0;
        for member in &st.members {
            prop_assert_eq!(member.offset % member.align, 0);
            prop_assert!(member.offset >= end);
            end = member.offset + member.size;
        }
        prop_assert_eq!(st.size_no_padding, end);
        prop_assert_eq!(st.align, st.members.iter().map(|m| m.align).max().unwrap());
        prop_assert_eq!(st.size % st.align, 0);
        prop_assert!(st.size >= st.size_no_padding);
        prop_assert!(st.size - st.size_no_padding < st.align);
    }
}
