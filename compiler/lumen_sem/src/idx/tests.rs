use super::*;

#[test]
fn primitive_names() {
    assert_eq!(Idx::I32.name(), Some("i32"));
    assert_eq!(Idx::ABSTRACT_FLOAT.name(), Some("abstract-float"));
    assert_eq!(Idx::from_raw(Idx::PRIMITIVE_COUNT).name(), None);
}

#[test]
fn debug_format() {
    assert_eq!(format!("{:?}", Idx::F16), "Idx(f16)");
    assert_eq!(format!("{:?}", Idx::NONE), "Idx(NONE)");
    assert_eq!(format!("{:?}", Idx::from_raw(42)), "Idx(42)");
}

#[test]
fn default_is_none() {
    assert!(Idx::default().is_none());
    assert!(!Idx::VOID.is_none());
}
