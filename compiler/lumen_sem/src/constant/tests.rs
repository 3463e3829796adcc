use pretty_assertions::assert_eq;

use super::*;
use crate::{AInt, F32, I32};

#[test]
fn scalar_accessors() {
    let c = Constant::scalar(Idx::I32, I32(7));
    assert_eq!(c.as_i64(), Some(7));
    assert_eq!(c.as_bool(), None);
    assert!(c.elements().is_empty());

    let f = Constant::scalar(Idx::F32, F32(1.5));
    assert_eq!(f.as_i64(), None);
    assert_eq!(Constant::bool(true).as_bool(), Some(true));
}

#[test]
fn composite_accessors() {
    let c = Constant::composite(
        Idx::from_raw(100),
        vec![
            Constant::scalar(Idx::ABSTRACT_INT, AInt(0)),
            Constant::scalar(Idx::ABSTRACT_INT, AInt(2)),
        ],
    );
    assert_eq!(c.element(1).and_then(Constant::as_i64), Some(2));
    assert_eq!(c.element(2), None);
    assert!(c.any_zero());
    assert!(!c.all_zero());
}
