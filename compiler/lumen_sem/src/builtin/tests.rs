use super::*;

#[test]
fn names_round_trip() {
    for builtin in BuiltinFn::ALL {
        assert_eq!(BuiltinFn::from_name(builtin.name()), Some(builtin));
    }
    assert_eq!(BuiltinFn::from_name("sqrt"), None);
}

#[test]
fn classification() {
    assert!(BuiltinFn::IsNan.is_deprecated());
    assert!(BuiltinFn::TextureSample.requires_uniformity());
    assert!(!BuiltinFn::TextureLoad.requires_uniformity());
    assert!(BuiltinFn::Dot.is_const());
    assert!(!BuiltinFn::Length.is_const());
    assert!(BuiltinFn::AtomicAdd.has_side_effects());
}
