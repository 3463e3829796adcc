use super::*;

#[test]
fn propagate_mask_excludes_categories() {
    assert!(TypeFlags::PROPAGATE_MASK.contains(TypeFlags::HAS_ATOMIC));
    assert!(!TypeFlags::PROPAGATE_MASK.contains(TypeFlags::IS_VECTOR));
    assert!(!TypeFlags::PROPAGATE_MASK.contains(TypeFlags::IS_CONSTRUCTIBLE));
}

#[test]
fn queries() {
    let flags = TypeFlags::IS_SCALAR | TypeFlags::HAS_ABSTRACT | TypeFlags::IS_CONSTRUCTIBLE;
    assert!(flags.is_abstract());
    assert!(flags.is_constructible());
    assert!(!flags.is_host_shareable());
}
