use super::*;

#[test]
fn test_intern_deduplicates() {
    let interner = StringInterner::new();
    let a = interner.intern("position");
    let b = interner.intern("position");
    let c = interner.intern("normal");
    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(interner.len(), 3);
}

#[test]
fn test_lookup_round_trips() {
    let interner = StringInterner::new();
    let name = interner.intern("main");
    assert_eq!(interner.lookup(name), "main");
    assert_eq!(interner.lookup(Name::EMPTY), "");
}

#[test]
fn test_get_does_not_insert() {
    let interner = StringInterner::new();
    assert_eq!(interner.get("missing"), None);
    assert_eq!(interner.len(), 1);
    let name = interner.intern("present");
    assert_eq!(interner.get("present"), Some(name));
}
